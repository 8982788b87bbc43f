//! Tier classification
//!
//! Global invariants enforced:
//! - Classification is total: every score (including NaN) maps to exactly one tier
//! - Bands are half-open: [excellent, inf), [stable, excellent), [at_risk, stable), (-inf, at_risk)
//! - A score within `SCORE_TOLERANCE` below a bound counts as reaching it

use crate::metrics::Scores;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Performance tier, ordered worst to best
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Critical,  // < 90
    AtRisk,    // 90-95
    Stable,    // 95-100
    Excellent, // >= 100
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Critical, Tier::AtRisk, Tier::Stable, Tier::Excellent];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Critical => "critical",
            Tier::AtRisk => "at_risk",
            Tier::Stable => "stable",
            Tier::Excellent => "excellent",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Critical => "Critical",
            Tier::AtRisk => "At Risk",
            Tier::Stable => "Stable",
            Tier::Excellent => "Excellent",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Slack for float error in `ratio * 100`: a $46.80 RPV on a $52.00 target
/// scores 89.99999999999999
pub const SCORE_TOLERANCE: f64 = 1e-9;

/// Lower bounds of each non-critical tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierThresholds {
    pub at_risk: f64,
    pub stable: f64,
    pub excellent: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        TierThresholds {
            at_risk: 90.0,
            stable: 95.0,
            excellent: 100.0,
        }
    }
}

/// Tiers for the three scored dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSet {
    pub revenue: Tier,
    pub labor: Tier,
    pub composite: Tier,
}

/// Classify a score with the default thresholds
pub fn classify(score: f64) -> Tier {
    classify_with_thresholds(score, &TierThresholds::default())
}

/// Classify a score with custom thresholds
pub fn classify_with_thresholds(score: f64, thresholds: &TierThresholds) -> Tier {
    // NaN fails every comparison and falls through to Critical
    if reaches(score, thresholds.excellent) {
        Tier::Excellent
    } else if reaches(score, thresholds.stable) {
        Tier::Stable
    } else if reaches(score, thresholds.at_risk) {
        Tier::AtRisk
    } else {
        Tier::Critical
    }
}

fn reaches(score: f64, bound: f64) -> bool {
    score >= bound - SCORE_TOLERANCE
}

/// Classify revenue, labor, and composite scores independently
pub fn classify_scores(scores: &Scores, thresholds: &TierThresholds) -> TierSet {
    TierSet {
        revenue: classify_with_thresholds(scores.revenue_factor_score, thresholds),
        labor: classify_with_thresholds(scores.labor_factor_score, thresholds),
        composite: classify_with_thresholds(scores.composite_score, thresholds),
    }
}
