//! Configuration file support for the Visit Value Agent
//!
//! Loads benchmark, threshold, and heuristic overrides from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.vvarc.json` in the working directory
//! 3. `vva.config.json` in the working directory
//!
//! All fields are optional. CLI flags take precedence over config file values.

use crate::catalog::{builtin_catalog, load_catalog_file, InsightCatalog};
use crate::input::Targets;
use crate::resolver::PosHeuristic;
use crate::tier::TierThresholds;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Visit Value Agent configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VvaConfig {
    /// Default per-visit benchmarks
    #[serde(default)]
    pub targets: Option<TargetConfig>,

    /// Custom tier boundaries
    #[serde(default)]
    pub thresholds: Option<ThresholdConfig>,

    /// Point-of-service co-pay heuristic constants
    #[serde(default)]
    pub pos: Option<PosConfig>,

    /// Path to a replacement scenario catalog (relative to the config file)
    #[serde(default)]
    pub insights: Option<PathBuf>,
}

/// Default per-visit benchmarks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Revenue target per visit (default: 140.00)
    pub revenue_per_visit: Option<f64>,
    /// Labor target per visit (default: 85.00)
    pub labor_per_visit: Option<f64>,
}

/// Custom tier boundaries
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdConfig {
    /// Lowest score rated At Risk (default: 90)
    pub at_risk: Option<f64>,
    /// Lowest score rated Stable (default: 95)
    pub stable: Option<f64>,
    /// Lowest score rated Excellent (default: 100)
    pub excellent: Option<f64>,
}

/// Point-of-service heuristic constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PosConfig {
    /// Average co-pay in dollars (default: 30.00)
    pub avg_copay: Option<f64>,
    /// Share of visits carrying a co-pay (default: 0.5)
    pub copay_eligibility_rate: Option<f64>,
    /// Share of co-pays not collected at the point of service (default: 0.25)
    pub leakage_rate: Option<f64>,
}

/// Resolved configuration ready for evaluation
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub targets: Targets,
    pub thresholds: TierThresholds,
    pub pos: PosHeuristic,
    pub catalog: Arc<InsightCatalog>,
    /// Where the catalog came from (None if built in)
    pub catalog_path: Option<PathBuf>,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl VvaConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        if let Some(ref t) = self.targets {
            for (name, val) in [
                ("revenue_per_visit", t.revenue_per_visit),
                ("labor_per_visit", t.labor_per_visit),
            ] {
                if let Some(v) = val {
                    if !v.is_finite() || v <= 0.0 {
                        anyhow::bail!("targets.{} must be positive (got {})", name, v);
                    }
                }
            }
        }

        // Validate thresholds are positive and ordered
        if let Some(ref t) = self.thresholds {
            let defaults = TierThresholds::default();
            let at_risk = t.at_risk.unwrap_or(defaults.at_risk);
            let stable = t.stable.unwrap_or(defaults.stable);
            let excellent = t.excellent.unwrap_or(defaults.excellent);

            for (name, v) in [
                ("at_risk", at_risk),
                ("stable", stable),
                ("excellent", excellent),
            ] {
                if !v.is_finite() || v <= 0.0 {
                    anyhow::bail!("thresholds.{} must be positive (got {})", name, v);
                }
            }
            if at_risk >= stable {
                anyhow::bail!(
                    "thresholds.at_risk ({}) must be less than thresholds.stable ({})",
                    at_risk,
                    stable
                );
            }
            if stable >= excellent {
                anyhow::bail!(
                    "thresholds.stable ({}) must be less than thresholds.excellent ({})",
                    stable,
                    excellent
                );
            }
        }

        if let Some(ref p) = self.pos {
            if let Some(copay) = p.avg_copay {
                if !copay.is_finite() || copay < 0.0 {
                    anyhow::bail!("pos.avg_copay must be non-negative (got {})", copay);
                }
            }
            for (name, val) in [
                ("copay_eligibility_rate", p.copay_eligibility_rate),
                ("leakage_rate", p.leakage_rate),
            ] {
                if let Some(v) = val {
                    if !(0.0..=1.0).contains(&v) {
                        anyhow::bail!("pos.{} must be between 0 and 1 (got {})", name, v);
                    }
                }
            }
        }

        Ok(())
    }

    /// Resolve config into the form used for evaluation
    ///
    /// `base_dir` anchors a relative `insights` path.
    pub fn resolve(&self, base_dir: &Path) -> Result<ResolvedConfig> {
        self.validate()?;

        let default_targets = Targets::default();
        let targets = match &self.targets {
            Some(t) => Targets {
                revenue_per_visit: t
                    .revenue_per_visit
                    .unwrap_or(default_targets.revenue_per_visit),
                labor_per_visit: t.labor_per_visit.unwrap_or(default_targets.labor_per_visit),
            },
            None => default_targets,
        };

        let default_thresholds = TierThresholds::default();
        let thresholds = match &self.thresholds {
            Some(t) => TierThresholds {
                at_risk: t.at_risk.unwrap_or(default_thresholds.at_risk),
                stable: t.stable.unwrap_or(default_thresholds.stable),
                excellent: t.excellent.unwrap_or(default_thresholds.excellent),
            },
            None => default_thresholds,
        };

        let default_pos = PosHeuristic::default();
        let pos = match &self.pos {
            Some(p) => PosHeuristic {
                avg_copay: p.avg_copay.unwrap_or(default_pos.avg_copay),
                copay_eligibility_rate: p
                    .copay_eligibility_rate
                    .unwrap_or(default_pos.copay_eligibility_rate),
                leakage_rate: p.leakage_rate.unwrap_or(default_pos.leakage_rate),
            },
            None => default_pos,
        };

        let (catalog, catalog_path) = match &self.insights {
            Some(path) => {
                let full_path = if path.is_relative() {
                    base_dir.join(path)
                } else {
                    path.clone()
                };
                let catalog = load_catalog_file(&full_path).with_context(|| {
                    format!("failed to load scenario catalog: {}", full_path.display())
                })?;
                (Arc::new(catalog), Some(full_path))
            }
            None => (builtin_catalog().context("built-in scenario catalog is invalid")?, None),
        };

        Ok(ResolvedConfig {
            targets,
            thresholds,
            pos,
            catalog,
            catalog_path,
            config_path: None,
        })
    }
}

impl ResolvedConfig {
    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults() -> Result<Self> {
        VvaConfig::default().resolve(Path::new("."))
    }
}

/// Discover and load a config file from the project root
///
/// Search order:
/// 1. `.vvarc.json`
/// 2. `vva.config.json`
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(project_root: &Path) -> Result<Option<(VvaConfig, PathBuf)>> {
    for name in [".vvarc.json", "vva.config.json"] {
        let path = project_root.join(name);
        if path.exists() {
            let config = load_config_file(&path)?;
            return Ok(Some((config, path)));
        }
    }

    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<VvaConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: VvaConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

/// Load and resolve config for a project
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config from the project root.
/// Returns default config if nothing is found.
pub fn load_and_resolve(project_root: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, source_path) = if let Some(path) = config_path {
        let config = load_config_file(path)?;
        (config, Some(path.to_path_buf()))
    } else {
        match discover_config(project_root)? {
            Some((config, path)) => (config, Some(path)),
            None => (VvaConfig::default(), None),
        }
    };

    let base_dir = source_path
        .as_deref()
        .and_then(Path::parent)
        .unwrap_or(project_root)
        .to_path_buf();
    let mut resolved = config.resolve(&base_dir)?;
    resolved.config_path = source_path;
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config_is_valid() {
        let config = VvaConfig::default();
        config.validate().expect("default config should be valid");
        let resolved = config.resolve(Path::new(".")).expect("default config should resolve");
        assert_eq!(resolved.targets.revenue_per_visit, 140.0);
        assert_eq!(resolved.targets.labor_per_visit, 85.0);
        assert_eq!(resolved.thresholds.at_risk, 90.0);
        assert_eq!(resolved.thresholds.stable, 95.0);
        assert_eq!(resolved.thresholds.excellent, 100.0);
        assert_eq!(resolved.pos.avg_copay, 30.0);
        assert!(resolved.catalog_path.is_none());
        assert_eq!(resolved.catalog.len(), 16);
    }

    #[test]
    fn test_parse_minimal_config() {
        let json = r#"{}"#;
        let config: VvaConfig = serde_json::from_str(json).unwrap();
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "targets": {"revenue_per_visit": 200.0, "labor_per_visit": 130.0},
            "thresholds": {"at_risk": 85.0, "stable": 92.0, "excellent": 100.0},
            "pos": {"avg_copay": 40.0, "copay_eligibility_rate": 0.6, "leakage_rate": 0.2}
        }"#;
        let config: VvaConfig = serde_json::from_str(json).unwrap();
        config.validate().unwrap();
        let resolved = config.resolve(Path::new(".")).unwrap();
        assert_eq!(resolved.targets.revenue_per_visit, 200.0);
        assert_eq!(resolved.targets.labor_per_visit, 130.0);
        assert_eq!(resolved.thresholds.at_risk, 85.0);
        assert_eq!(resolved.thresholds.stable, 92.0);
        assert_eq!(resolved.pos.avg_copay, 40.0);
        assert_eq!(resolved.pos.copay_eligibility_rate, 0.6);
        assert_eq!(resolved.pos.leakage_rate, 0.2);
    }

    #[test]
    fn test_reject_unknown_fields() {
        let json = r#"{"unknown_field": true}"#;
        let result: Result<VvaConfig, _> = serde_json::from_str(json);
        assert!(result.is_err(), "unknown fields should be rejected");
    }

    #[test]
    fn test_reject_non_positive_target() {
        let json = r#"{"targets": {"revenue_per_visit": 0.0}}"#;
        let config: VvaConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_negative_threshold() {
        let json = r#"{"thresholds": {"at_risk": -1.0}}"#;
        let config: VvaConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_unordered_thresholds() {
        let json = r#"{"thresholds": {"at_risk": 96.0, "stable": 95.0, "excellent": 100.0}}"#;
        let config: VvaConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());

        let json = r#"{"thresholds": {"stable": 100.0}}"#;
        let config: VvaConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_rate_out_of_range() {
        let json = r#"{"pos": {"leakage_rate": 1.5}}"#;
        let config: VvaConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_negative_copay() {
        let json = r#"{"pos": {"avg_copay": -5.0}}"#;
        let config: VvaConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_sections_use_defaults_for_rest() {
        let json = r#"{"thresholds": {"excellent": 105.0}, "pos": {"avg_copay": 50.0}}"#;
        let config: VvaConfig = serde_json::from_str(json).unwrap();
        let resolved = config.resolve(Path::new(".")).unwrap();
        assert_eq!(resolved.thresholds.at_risk, 90.0); // default
        assert_eq!(resolved.thresholds.stable, 95.0); // default
        assert_eq!(resolved.thresholds.excellent, 105.0);
        assert_eq!(resolved.pos.avg_copay, 50.0);
        assert_eq!(resolved.pos.leakage_rate, 0.25); // default
    }

    #[test]
    fn test_discover_vvarc() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join(".vvarc.json");
        fs::write(&config_path, r#"{"targets": {"revenue_per_visit": 150.0}}"#).unwrap();

        let result = discover_config(dir.path()).unwrap();
        assert!(result.is_some());
        let (config, path) = result.unwrap();
        assert_eq!(
            config.targets.and_then(|t| t.revenue_per_visit),
            Some(150.0)
        );
        assert_eq!(path, config_path);
    }

    #[test]
    fn test_discover_priority_order() {
        let dir = tempfile::tempdir().unwrap();

        // Create both config files - .vvarc.json should win
        fs::write(
            dir.path().join(".vvarc.json"),
            r#"{"targets": {"labor_per_visit": 70.0}}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("vva.config.json"),
            r#"{"targets": {"labor_per_visit": 75.0}}"#,
        )
        .unwrap();

        let (config, _) = discover_config(dir.path()).unwrap().unwrap();
        assert_eq!(
            config.targets.and_then(|t| t.labor_per_visit),
            Some(70.0),
            ".vvarc.json should take priority"
        );
    }

    #[test]
    fn test_no_config_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let result = discover_config(dir.path()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_load_and_resolve_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = load_and_resolve(dir.path(), None).unwrap();
        assert!(resolved.config_path.is_none());
        assert_eq!(resolved.targets.revenue_per_visit, 140.0);
    }

    #[test]
    fn test_load_and_resolve_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("custom.json");
        fs::write(&config_path, r#"{"pos": {"avg_copay": 25.0}}"#).unwrap();

        let resolved = load_and_resolve(dir.path(), Some(&config_path)).unwrap();
        assert_eq!(resolved.pos.avg_copay, 25.0);
        assert_eq!(resolved.config_path, Some(config_path));
    }

    #[test]
    fn test_relative_insights_path_resolves_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("conf");
        fs::create_dir(&nested).unwrap();
        let builtin = include_str!("../data/insights.json");
        fs::write(nested.join("insights.json"), builtin).unwrap();
        let config_path = nested.join("vva.json");
        fs::write(&config_path, r#"{"insights": "insights.json"}"#).unwrap();

        let resolved = load_and_resolve(dir.path(), Some(&config_path)).unwrap();
        assert_eq!(resolved.catalog_path, Some(nested.join("insights.json")));
        assert_eq!(resolved.catalog.len(), 16);
    }

    #[test]
    fn test_incomplete_insights_file_fails_to_resolve() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("partial.json"),
            r#"{"sustain_actions": ["a", "b", "c"], "scenarios": []}"#,
        )
        .unwrap();
        let config_path = dir.path().join(".vvarc.json");
        fs::write(&config_path, r#"{"insights": "partial.json"}"#).unwrap();

        let err = load_and_resolve(dir.path(), None).unwrap_err();
        assert!(format!("{:#}", err).contains("missing 16 of 16"));
    }
}
