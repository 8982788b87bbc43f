//! Per-visit unit economics
//!
//! Global invariants enforced:
//! - Inputs are validated before any division
//! - No rounding; display formatting belongs to the report layer
//! - Deterministic metric calculation

use crate::error::VvaResult;
use crate::input::AssessmentInput;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Ratios derived from one assessment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// RPV: net revenue / visits
    pub revenue_per_visit: f64,
    /// LPV: labor cost / visits
    pub labor_per_visit: f64,
    /// SWB%: labor cost / net revenue. Context only, never scored.
    pub labor_share_of_revenue: f64,
    /// RF: RPV / revenue target
    pub revenue_factor_raw: f64,
    /// LF: labor target / LPV (inverted, lower labor cost scores higher)
    pub labor_factor_raw: f64,
    /// VVI: RPV / LPV
    pub composite_raw: f64,
    /// 100 x RF x LF, i.e. VVI normalized by the benchmark ratio
    pub composite_score: f64,
}

/// Scores on the 0-100+ scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub revenue_factor_score: f64,
    pub labor_factor_score: f64,
    pub composite_score: f64,
}

/// Compute derived metrics for an assessment
///
/// Fails with `InvalidInput` if any precondition is violated; no ratio is
/// ever computed from a zero or non-finite operand.
pub fn compute_metrics(input: &AssessmentInput) -> VvaResult<DerivedMetrics> {
    input.validate()?;

    let visits = input.visit_count as f64;
    let revenue_per_visit = input.net_revenue / visits;
    let labor_per_visit = input.labor_cost / visits;
    let labor_share_of_revenue = input.labor_cost / input.net_revenue;
    let revenue_factor_raw = revenue_per_visit / input.revenue_target_per_visit;
    let labor_factor_raw = input.labor_target_per_visit / labor_per_visit;
    let composite_raw = revenue_per_visit / labor_per_visit;
    let composite_score = 100.0 * revenue_factor_raw * labor_factor_raw;

    debug!(
        visits = input.visit_count,
        rpv = revenue_per_visit,
        lpv = labor_per_visit,
        rf = revenue_factor_raw,
        lf = labor_factor_raw,
        vvi = composite_raw,
        "computed visit metrics"
    );

    Ok(DerivedMetrics {
        revenue_per_visit,
        labor_per_visit,
        labor_share_of_revenue,
        revenue_factor_raw,
        labor_factor_raw,
        composite_raw,
        composite_score,
    })
}

impl DerivedMetrics {
    pub fn scores(&self) -> Scores {
        Scores {
            revenue_factor_score: self.revenue_factor_raw * 100.0,
            labor_factor_score: self.labor_factor_raw * 100.0,
            composite_score: self.composite_score,
        }
    }

    /// Dollars per visit still missing against the revenue target (never negative)
    pub fn revenue_per_visit_gap(&self, revenue_target_per_visit: f64) -> f64 {
        (revenue_target_per_visit - self.revenue_per_visit).max(0.0)
    }
}
