//! Visit Value Agent core library - visit economics scoring and prescriptive scenarios

#![deny(warnings)]

// Global invariants enforced in this crate:
// - Evaluation is a pure function of the input and resolved configuration
// - No global mutable state (the built-in catalog is parsed once and never mutated)
// - No randomness, clocks, threads, or I/O during evaluation
// - Invalid input is rejected before any division
// - Identical input yields byte-for-byte identical output

pub mod catalog;
pub mod config;
pub mod error;
pub mod input;
pub mod intake;
pub mod metrics;
pub mod portfolio;
pub mod report;
pub mod resolver;
pub mod tier;

pub use catalog::{InsightCatalog, InsightRecord, ScenarioKey};
pub use config::ResolvedConfig;
pub use error::{VvaError, VvaResult};
pub use input::{AssessmentInput, AssessmentRecord, FocusArea, Period, Targets};
pub use intake::{Intake, Question};
pub use metrics::{compute_metrics, DerivedMetrics, Scores};
pub use portfolio::{Portfolio, PortfolioEntry};
pub use report::{render_json, render_summary, render_text, Evaluation};
pub use resolver::{resolve_scenario, PosHeuristic, ScenarioResult};
pub use tier::{classify, classify_with_thresholds, Tier, TierSet, TierThresholds};

use tracing::debug;

/// Evaluate an assessment with default thresholds, heuristic, and the built-in catalog
pub fn evaluate(input: &AssessmentInput) -> VvaResult<Evaluation> {
    evaluate_with_config(input, None)
}

/// Evaluate an assessment with optional resolved configuration
///
/// Stages: metrics -> tiers -> scenario. An invalid input stops before
/// classification; a catalog without an entry for the tier pair is a
/// configuration error.
pub fn evaluate_with_config(
    input: &AssessmentInput,
    resolved_config: Option<&ResolvedConfig>,
) -> VvaResult<Evaluation> {
    let metrics = compute_metrics(input)?;
    let scores = metrics.scores();

    let thresholds = resolved_config
        .map(|c| c.thresholds)
        .unwrap_or_default();
    let pos = resolved_config.map(|c| c.pos).unwrap_or_default();
    let tiers = tier::classify_scores(&scores, &thresholds);

    let key = ScenarioKey::new(tiers.revenue, tiers.labor);
    debug!(
        revenue = tiers.revenue.as_str(),
        labor = tiers.labor.as_str(),
        composite = tiers.composite.as_str(),
        "classified assessment"
    );

    let scenario = match resolved_config {
        Some(config) => resolve_scenario(
            &config.catalog,
            key,
            &metrics,
            input.revenue_target_per_visit,
            &pos,
        )?,
        None => {
            let catalog = catalog::builtin_catalog()?;
            resolve_scenario(&catalog, key, &metrics, input.revenue_target_per_visit, &pos)?
        }
    };

    Ok(Evaluation {
        input: input.clone(),
        metrics,
        scores,
        tiers,
        scenario,
    })
}

/// Evaluate a batch of labeled records into a portfolio, in file order
///
/// Stops at the first invalid record.
pub fn evaluate_records(
    records: &[AssessmentRecord],
    resolved_config: Option<&ResolvedConfig>,
) -> VvaResult<Portfolio> {
    let defaults = resolved_config.map(|c| c.targets).unwrap_or_default();
    let mut portfolio = Portfolio::new();
    for record in records {
        let input = record.to_input(&defaults);
        let evaluation = evaluate_with_config(&input, resolved_config)?;
        portfolio.push(record.label.clone().unwrap_or_default(), evaluation);
    }
    Ok(portfolio)
}
