//! Visit Value Agent CLI - clinic visit economics scoring

#![deny(warnings)]

// Global invariants enforced:
// - Reports go to stdout, logs and prompts to stderr
// - Identical input yields byte-for-byte identical output

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use vva_core::config::{self, ResolvedConfig};
use vva_core::{
    evaluate_records, evaluate_with_config, render_json, render_summary, render_text,
    AssessmentInput, AssessmentRecord, Evaluation, FocusArea, Intake, Period, ScenarioKey,
};

#[derive(Parser)]
#[command(name = "vva")]
#[command(about = "Visit Value Agent: score revenue and labor per visit and recommend actions")]
#[command(version = env!("VVA_VERSION"))]
struct Cli {
    /// Enable debug logging (overrides RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one assessment period
    Assess {
        /// Total patient visits in the period
        #[arg(long)]
        visits: u64,

        /// Net revenue collected for the period ($)
        #[arg(long)]
        net_revenue: f64,

        /// Total labor cost for the period ($): W2 + PRN + overtime + contract/locum
        #[arg(long)]
        labor_cost: f64,

        /// Revenue target per visit (overrides config file, default 140.00)
        #[arg(long)]
        revenue_target: Option<f64>,

        /// Labor target per visit (overrides config file, default 85.00)
        #[arg(long)]
        labor_target: Option<f64>,

        /// Time period the figures represent
        #[arg(long, default_value = "month")]
        period: Period,

        /// Focus area for this assessment
        #[arg(long, default_value = "all-areas")]
        focus: FocusArea,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Also write the executive summary to this file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Answer the assessment questions one at a time
    Interview {
        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Also write the executive summary to this file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Compare saved assessments side by side
    Compare {
        /// JSON file holding an array of labeled assessments
        path: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: CompareFormat,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Inspect the scenario catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Validate a configuration file
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Check that a catalog covers all 16 scenarios
    Check {
        /// Catalog file (default: the catalog selected by config, or the built-in one)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// List every scenario with its label
    Show {
        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without running an assessment
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Summary,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum CompareFormat {
    Text,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Assess {
            visits,
            net_revenue,
            labor_cost,
            revenue_target,
            labor_target,
            period,
            focus,
            format,
            output,
            config: config_path,
        } => {
            let resolved = load_config(config_path.as_deref())?;

            // CLI flags override config file values
            let input = AssessmentInput::new(visits, net_revenue, labor_cost)
                .with_targets(
                    revenue_target.unwrap_or(resolved.targets.revenue_per_visit),
                    labor_target.unwrap_or(resolved.targets.labor_per_visit),
                )
                .with_period(period)
                .with_focus(focus);

            let evaluation = evaluate_with_config(&input, Some(&resolved))
                .context("assessment could not be scored")?;
            emit_evaluation(&evaluation, format, output.as_deref())?;
        }
        Commands::Interview {
            format,
            output,
            config: config_path,
        } => {
            let resolved = load_config(config_path.as_deref())?;
            let stdin = std::io::stdin();
            let input = run_interview(stdin.lock(), std::io::stderr(), &resolved)?;

            let evaluation = evaluate_with_config(&input, Some(&resolved))
                .context("assessment could not be scored")?;
            emit_evaluation(&evaluation, format, output.as_deref())?;
        }
        Commands::Compare {
            path,
            format,
            config: config_path,
        } => {
            let resolved = load_config(config_path.as_deref())?;
            let records = read_records(&path)?;
            if records.is_empty() {
                anyhow::bail!("no assessments found in {}", path.display());
            }

            let portfolio = evaluate_records(&records, Some(&resolved))
                .with_context(|| format!("failed to score assessments in {}", path.display()))?;
            info!(count = portfolio.len(), "scored saved assessments");

            match format {
                CompareFormat::Text => print!("{}", portfolio.render_comparison_text()),
                CompareFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&portfolio)
                        .context("failed to serialize comparison")?
                ),
            }
        }
        Commands::Catalog { action } => match action {
            CatalogAction::Check { path } => {
                let result = match path {
                    Some(ref p) => vva_core::catalog::load_catalog_file(p)
                        .map(|c| (p.display().to_string(), c.len()))
                        .map_err(anyhow::Error::from),
                    None => load_config(None).map(|r| {
                        let source = r
                            .catalog_path
                            .as_ref()
                            .map(|p| p.display().to_string())
                            .unwrap_or_else(|| "built-in catalog".to_string());
                        (source, r.catalog.len())
                    }),
                };

                match result {
                    Ok((source, count)) => {
                        println!("Catalog valid: {} ({} scenarios)", source, count);
                    }
                    Err(e) => {
                        eprintln!("Catalog validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                }
            }
            CatalogAction::Show {
                config: config_path,
            } => {
                let resolved = load_config(config_path.as_deref())?;
                println!("{:<44} LABEL", "SCENARIO");
                for key in ScenarioKey::all() {
                    let record = resolved.catalog.get(key)?;
                    println!("{:<44} {}", key.name(), record.label);
                }
            }
        },
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let project_root = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&project_root, path.as_deref());

                match resolved {
                    Ok(config) => {
                        if let Some(ref p) = config.config_path {
                            println!("Config valid: {}", p.display());
                        } else {
                            println!("No config file found. Using defaults.");
                        }
                    }
                    Err(e) => {
                        eprintln!("Config validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                }
            }
            ConfigAction::Show { path } => {
                let resolved = load_config(path.as_deref())?;
                print_config(&resolved);
            }
        },
    }

    Ok(())
}

/// Route logs to stderr; `--verbose` forces debug level
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load configuration from an explicit path or the current directory
fn load_config(config_path: Option<&Path>) -> anyhow::Result<ResolvedConfig> {
    let project_root = std::env::current_dir()?;
    let resolved = config::load_and_resolve(&project_root, config_path)
        .context("failed to load configuration")?;

    if let Some(ref p) = resolved.config_path {
        info!(path = %p.display(), "using config");
    }
    Ok(resolved)
}

/// Print an evaluation and optionally save the executive summary
fn emit_evaluation(
    evaluation: &Evaluation,
    format: OutputFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => print!("{}", render_text(evaluation)),
        OutputFormat::Json => println!("{}", render_json(evaluation)),
        OutputFormat::Summary => print!("{}", render_summary(evaluation)),
    }

    if let Some(path) = output {
        write_report_file(path, &render_summary(evaluation))?;
        eprintln!("Executive summary written to {}", path.display());
    }
    Ok(())
}

/// Ask each intake question until the intake is complete
///
/// Invalid answers are reported and the same question is asked again.
fn run_interview<R: BufRead, W: Write>(
    mut reader: R,
    mut prompts: W,
    resolved: &ResolvedConfig,
) -> anyhow::Result<AssessmentInput> {
    let mut intake = Intake::with_defaults(resolved.targets);
    let mut line = String::new();

    while let Some(prompt) = intake.prompt() {
        let (step, total) = intake.progress();
        write!(prompts, "[{}/{}] {}\n> ", step, total, prompt)?;
        prompts.flush()?;

        line.clear();
        if reader.read_line(&mut line)? == 0 {
            anyhow::bail!("input ended before the assessment was complete");
        }

        if let Err(e) = intake.answer(&line) {
            debug!(error = %e, "rejected intake answer");
            writeln!(prompts, "  {}", e)?;
        }
    }

    Ok(intake.finish()?)
}

/// Read a JSON array of labeled assessments
fn read_records(path: &Path) -> anyhow::Result<Vec<AssessmentRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read assessments file: {}", path.display()))?;
    let records: Vec<AssessmentRecord> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse assessments file: {}", path.display()))?;
    Ok(records)
}

fn print_config(resolved: &ResolvedConfig) {
    println!("Configuration:");
    if let Some(ref p) = resolved.config_path {
        println!("  Source: {}", p.display());
    } else {
        println!("  Source: defaults (no config file found)");
    }
    println!();
    println!("Targets:");
    println!("  revenue_per_visit: {:.2}", resolved.targets.revenue_per_visit);
    println!("  labor_per_visit: {:.2}", resolved.targets.labor_per_visit);
    println!();
    println!("Thresholds:");
    println!("  at_risk: {}", resolved.thresholds.at_risk);
    println!("  stable: {}", resolved.thresholds.stable);
    println!("  excellent: {}", resolved.thresholds.excellent);
    println!();
    println!("POS heuristic:");
    println!("  avg_copay: {:.2}", resolved.pos.avg_copay);
    println!(
        "  copay_eligibility_rate: {}",
        resolved.pos.copay_eligibility_rate
    );
    println!("  leakage_rate: {}", resolved.pos.leakage_rate);
    println!("  lift per visit: {:.2}", resolved.pos.lift());
    println!();
    println!(
        "Insights: {}",
        resolved
            .catalog_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "built-in catalog".to_string())
    );
}

/// Write a report file with atomic write pattern
fn write_report_file(path: &Path, content: &str) -> anyhow::Result<()> {
    use std::fs;

    // Create parent directories if needed
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }

    // Atomic write (temp + rename pattern)
    let temp_path = temp_sibling(path);
    fs::write(&temp_path, content)
        .with_context(|| format!("Failed to write temporary file: {}", temp_path.display()))?;
    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temporary file to: {}", path.display()))?;

    Ok(())
}

/// "summary.txt" -> "summary.txt.tmp", leaving any "summary.tmp" alone
fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> ResolvedConfig {
        ResolvedConfig::defaults().unwrap()
    }

    #[test]
    fn test_interview_collects_all_answers() {
        let answers = "500\n100000\n65000\nquarter\n\n\n\n";
        let mut prompts = Vec::new();
        let input = run_interview(answers.as_bytes(), &mut prompts, &defaults()).unwrap();

        assert_eq!(input.visit_count, 500);
        assert_eq!(input.period, Period::Quarter);
        assert_eq!(input.focus, FocusArea::AllAreas);
        assert_eq!(input.revenue_target_per_visit, 140.0);
        let shown = String::from_utf8(prompts).unwrap();
        assert!(shown.contains("[1/7] How many total patient visits"));
        assert!(shown.contains("[7/7] Labor target per visit"));
    }

    #[test]
    fn test_interview_reasks_after_bad_answer() {
        let answers = "zero\n0\n10\n1400\n850\n\n\n\n\n";
        let mut prompts = Vec::new();
        let input = run_interview(answers.as_bytes(), &mut prompts, &defaults()).unwrap();

        assert_eq!(input.visit_count, 10);
        let shown = String::from_utf8(prompts).unwrap();
        assert_eq!(shown.matches("[1/7]").count(), 3);
        assert!(shown.contains("invalid input for visit_count"));
    }

    #[test]
    fn test_interview_fails_on_early_eof() {
        let mut prompts = Vec::new();
        let err = run_interview("10\n".as_bytes(), &mut prompts, &defaults()).unwrap_err();
        assert!(err.to_string().contains("input ended"));
    }

    #[test]
    fn test_read_records_and_write_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs.json");
        std::fs::write(
            &path,
            r#"[{"label": "Jan", "visit_count": 500, "net_revenue": 100000, "labor_cost": 65000}]"#,
        )
        .unwrap();
        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].label.as_deref(), Some("Jan"));

        let out = dir.path().join("out").join("VVA_Executive_Summary.txt");
        write_report_file(&out, "summary").unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "summary");
    }

    #[test]
    fn test_write_report_leaves_same_stem_tmp_file() {
        let dir = tempfile::tempdir().unwrap();
        let notes = dir.path().join("summary.tmp");
        std::fs::write(&notes, "my notes").unwrap();

        let out = dir.path().join("summary.txt");
        write_report_file(&out, "report").unwrap();

        assert_eq!(std::fs::read_to_string(&out).unwrap(), "report");
        assert_eq!(std::fs::read_to_string(&notes).unwrap(), "my notes");
        assert!(!dir.path().join("summary.txt.tmp").exists());
        assert_eq!(temp_sibling(&out), dir.path().join("summary.txt.tmp"));
    }
}
