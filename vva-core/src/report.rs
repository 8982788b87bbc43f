//! Reporting and output generation
//!
//! Global invariants enforced:
//! - Rendering never changes numbers, tiers, or actions; it only formats them
//! - Byte-for-byte identical output across runs

use crate::input::AssessmentInput;
use crate::metrics::{DerivedMetrics, Scores};
use crate::resolver::ScenarioResult;
use crate::tier::TierSet;
use serde::{Deserialize, Serialize};

const LEGAL_NOTICE: &str = "Legal: This operational analysis is for informational purposes only and does not constitute medical, clinical, legal, or compliance advice. VVA provides operational insights only.";

/// Complete result of one assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub input: AssessmentInput,
    pub metrics: DerivedMetrics,
    pub scores: Scores,
    pub tiers: TierSet,
    pub scenario: ScenarioResult,
}

/// Render the full report: calculation table, scoring table, scenario, actions
pub fn render_text(evaluation: &Evaluation) -> String {
    let input = &evaluation.input;
    let m = &evaluation.metrics;
    let s = &evaluation.scores;
    let t = &evaluation.tiers;
    let scenario = &evaluation.scenario;
    let mut output = String::new();

    output.push_str("Calculation Table\n");
    let rows: [(&str, String); 11] = [
        ("Total visits", format_count(input.visit_count)),
        ("Net revenue collected", format_money(input.net_revenue)),
        ("Total labor cost", format_money(input.labor_cost)),
        ("Revenue per visit (RPV)", format_money(m.revenue_per_visit)),
        ("Labor cost per visit (LPV)", format_money(m.labor_per_visit)),
        (
            "Revenue benchmark target",
            format_money(input.revenue_target_per_visit),
        ),
        (
            "Labor benchmark target",
            format_money(input.labor_target_per_visit),
        ),
        (
            "Labor cost as % of revenue (SWB%)",
            format_percent(m.labor_share_of_revenue),
        ),
        (
            "Revenue score",
            format!("{:.2} ({})", s.revenue_factor_score, t.revenue),
        ),
        (
            "Labor score",
            format!("{:.2} ({})", s.labor_factor_score, t.labor),
        ),
        ("VVI interpretation", scenario.name.clone()),
    ];
    for (label, value) in rows {
        output.push_str(&format!("  {:<36} {}\n", label, value));
    }
    output.push('\n');

    output.push_str("VVI / RF / LF Scoring Table\n");
    output.push_str(&format!(
        "  {:<26} {:<22} {:>9} {:>9}  {}\n",
        "INDEX", "FORMULA", "RAW", "SCORE", "TIER"
    ));
    let score_rows = [
        (
            "Revenue Factor (RF)",
            "RPV / Revenue Target",
            m.revenue_factor_raw,
            s.revenue_factor_score,
            t.revenue,
        ),
        (
            "Labor Factor (LF)",
            "Labor Target / LPV",
            m.labor_factor_raw,
            s.labor_factor_score,
            t.labor,
        ),
        (
            "Visit Value Index (VVI)",
            "RPV / LPV",
            m.composite_raw,
            s.composite_score,
            t.composite,
        ),
    ];
    for (index, formula, raw, score, tier) in score_rows {
        output.push_str(&format!(
            "  {:<26} {:<22} {:>9.2} {:>9.2}  {}\n",
            index, formula, raw, score, tier
        ));
    }
    output.push('\n');

    output.push_str("Scenario\n");
    output.push_str(&format!("  {}\n", scenario.diagnosis_text));
    output.push_str(&format!(
        "  Period: {}. Focus: {}.\n\n",
        input.period, input.focus
    ));

    output.push_str("Top 3 (Immediate)\n");
    for (i, action) in scenario.immediate_actions.iter().enumerate() {
        output.push_str(&format!("  {}. {}\n", i + 1, action));
    }
    output.push('\n');

    output.push_str("Extended Actions\n");
    push_bullets(&mut output, &scenario.extended_actions);
    output.push('\n');

    output.push_str("Action Plan\n");
    for (phase, items) in scenario.insight.action_plan.phases() {
        if items.is_empty() {
            continue;
        }
        output.push_str(&format!("  {}:\n", phase));
        for item in items {
            output.push_str(&format!("    - {}\n", item));
        }
    }
    output.push('\n');

    let sections = [
        ("Likely Root Causes", &scenario.insight.root_causes),
        ("Risks", &scenario.insight.risks),
        ("Expected Impact", &scenario.insight.expected_impact),
    ];
    for (heading, items) in sections {
        if items.is_empty() {
            continue;
        }
        output.push_str(heading);
        output.push('\n');
        push_bullets(&mut output, items);
        output.push('\n');
    }

    output
}

/// Render the print-ready executive summary
pub fn render_summary(evaluation: &Evaluation) -> String {
    let input = &evaluation.input;
    let m = &evaluation.metrics;
    let s = &evaluation.scores;
    let t = &evaluation.tiers;
    let scenario = &evaluation.scenario;
    let mut output = String::new();

    output.push_str("Visit Value Agent - Executive Summary\n\n");
    output.push_str(&format!("Period: {}\n", input.period));
    output.push_str(&format!("Focus: {}\n\n", input.focus));
    output.push_str(&format!("VVI Scenario: {}\n", scenario.name));
    output.push_str(&format!("Diagnosis: {}\n", scenario.insight.label));
    output.push_str(&format!(
        "Revenue Factor (RF): {:.2} ({})\n",
        s.revenue_factor_score, t.revenue
    ));
    output.push_str(&format!(
        "Labor Factor (LF): {:.2} ({})\n",
        s.labor_factor_score, t.labor
    ));
    output.push_str(&format!(
        "Visit Value Index (VVI): {:.2} ({})\n",
        s.composite_score, t.composite
    ));
    output.push_str(&format!(
        "RPV: {}  |  LPV: {}  |  SWB%: {}\n\n",
        format_money(m.revenue_per_visit),
        format_money(m.labor_per_visit),
        format_percent(m.labor_share_of_revenue)
    ));

    output.push_str("Top 3 Actions:\n");
    for (i, action) in scenario.immediate_actions.iter().enumerate() {
        output.push_str(&format!("{}) {}\n", i + 1, action));
    }
    output.push('\n');

    output.push_str("Extended Actions:\n");
    for action in &scenario.extended_actions {
        output.push_str(&format!("- {}\n", action));
    }
    output.push('\n');

    output.push_str(LEGAL_NOTICE);
    output.push('\n');
    output
}

/// Render the evaluation as JSON output
pub fn render_json(evaluation: &Evaluation) -> String {
    serde_json::to_string_pretty(evaluation).unwrap_or_else(|_| "{}".to_string())
}

fn push_bullets(output: &mut String, items: &[String]) {
    for item in items {
        output.push_str(&format!("  - {}\n", item));
    }
}

/// Format dollars with thousands separators: 1234567.891 -> "$1,234,567.89"
pub fn format_money(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}${}.{}", sign, group_thousands(whole), cents)
}

/// Format a whole count with thousands separators
pub fn format_count(count: u64) -> String {
    group_thousands(&count.to_string())
}

/// Format a ratio as a percentage with one decimal: 0.65 -> "65.0%"
pub fn format_percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
