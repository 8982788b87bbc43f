//! Assessment inputs
//!
//! The raw facts an operator supplies for one evaluation period, plus the
//! context labels (period, focus area) that travel with a report but never
//! influence scoring.

use crate::error::{VvaError, VvaResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_REVENUE_TARGET: f64 = 140.0;
pub const DEFAULT_LABOR_TARGET: f64 = 85.0;

/// Per-visit benchmarks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Targets {
    pub revenue_per_visit: f64,
    pub labor_per_visit: f64,
}

impl Default for Targets {
    fn default() -> Self {
        Targets {
            revenue_per_visit: DEFAULT_REVENUE_TARGET,
            labor_per_visit: DEFAULT_LABOR_TARGET,
        }
    }
}

/// Reporting period the figures cover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Week,
    #[default]
    Month,
    Quarter,
    Year,
}

impl Period {
    pub const ALL: [Period; 4] = [Period::Week, Period::Month, Period::Quarter, Period::Year];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Week => "Week",
            Period::Month => "Month",
            Period::Quarter => "Quarter",
            Period::Year => "Year",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = VvaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_choice(s).as_str() {
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "quarter" => Ok(Period::Quarter),
            "year" => Ok(Period::Year),
            _ => Err(VvaError::invalid(
                "period",
                format!("expected week, month, quarter, or year (got {:?})", s),
            )),
        }
    }
}

/// Optional emphasis the operator asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusArea {
    #[default]
    AllAreas,
    RevenueImprovement,
    StaffingEfficiency,
    PatientFlow,
    Burnout,
    None,
}

impl FocusArea {
    pub const ALL: [FocusArea; 6] = [
        FocusArea::AllAreas,
        FocusArea::RevenueImprovement,
        FocusArea::StaffingEfficiency,
        FocusArea::PatientFlow,
        FocusArea::Burnout,
        FocusArea::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FocusArea::AllAreas => "All areas",
            FocusArea::RevenueImprovement => "Revenue improvement",
            FocusArea::StaffingEfficiency => "Staffing efficiency",
            FocusArea::PatientFlow => "Patient flow",
            FocusArea::Burnout => "Burnout",
            FocusArea::None => "None",
        }
    }
}

impl fmt::Display for FocusArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FocusArea {
    type Err = VvaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_choice(s).as_str() {
            "all" | "all areas" => Ok(FocusArea::AllAreas),
            "revenue" | "revenue improvement" => Ok(FocusArea::RevenueImprovement),
            "staffing" | "staffing efficiency" => Ok(FocusArea::StaffingEfficiency),
            "patient flow" | "flow" => Ok(FocusArea::PatientFlow),
            "burnout" => Ok(FocusArea::Burnout),
            "none" => Ok(FocusArea::None),
            _ => Err(VvaError::invalid(
                "focus",
                format!(
                    "expected all-areas, revenue-improvement, staffing-efficiency, patient-flow, burnout, or none (got {:?})",
                    s
                ),
            )),
        }
    }
}

/// Lowercase and fold `-`/`_` separators into spaces
fn normalize_choice(s: &str) -> String {
    s.trim()
        .to_ascii_lowercase()
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// One period's raw figures plus benchmarks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentInput {
    pub visit_count: u64,
    pub net_revenue: f64,
    pub labor_cost: f64,
    #[serde(default = "default_revenue_target")]
    pub revenue_target_per_visit: f64,
    #[serde(default = "default_labor_target")]
    pub labor_target_per_visit: f64,
    #[serde(default)]
    pub period: Period,
    #[serde(default)]
    pub focus: FocusArea,
}

fn default_revenue_target() -> f64 {
    DEFAULT_REVENUE_TARGET
}

fn default_labor_target() -> f64 {
    DEFAULT_LABOR_TARGET
}

impl AssessmentInput {
    /// Build an input with default benchmarks (140.00 / 85.00), monthly period, all focus areas
    pub fn new(visit_count: u64, net_revenue: f64, labor_cost: f64) -> Self {
        AssessmentInput {
            visit_count,
            net_revenue,
            labor_cost,
            revenue_target_per_visit: DEFAULT_REVENUE_TARGET,
            labor_target_per_visit: DEFAULT_LABOR_TARGET,
            period: Period::default(),
            focus: FocusArea::default(),
        }
    }

    pub fn with_targets(mut self, revenue_per_visit: f64, labor_per_visit: f64) -> Self {
        self.revenue_target_per_visit = revenue_per_visit;
        self.labor_target_per_visit = labor_per_visit;
        self
    }

    pub fn with_period(mut self, period: Period) -> Self {
        self.period = period;
        self
    }

    pub fn with_focus(mut self, focus: FocusArea) -> Self {
        self.focus = focus;
        self
    }

    pub fn targets(&self) -> Targets {
        Targets {
            revenue_per_visit: self.revenue_target_per_visit,
            labor_per_visit: self.labor_target_per_visit,
        }
    }

    /// Check every precondition of the metrics stage
    ///
    /// Zero revenue or zero labor is an incomplete assessment, not a zero ratio.
    pub fn validate(&self) -> VvaResult<()> {
        if self.visit_count == 0 {
            return Err(VvaError::invalid(
                "visit_count",
                "must be at least 1 (per-visit ratios are undefined for zero visits)",
            ));
        }
        require_positive("net_revenue", self.net_revenue)?;
        require_positive("labor_cost", self.labor_cost)?;
        require_positive("revenue_target_per_visit", self.revenue_target_per_visit)?;
        require_positive("labor_target_per_visit", self.labor_target_per_visit)?;
        Ok(())
    }
}

pub(crate) fn require_positive(field: &'static str, value: f64) -> VvaResult<()> {
    if !value.is_finite() {
        return Err(VvaError::invalid(
            field,
            format!("must be a finite amount (got {})", value),
        ));
    }
    if value <= 0.0 {
        return Err(VvaError::invalid(
            field,
            format!("must be greater than zero (got {})", value),
        ));
    }
    Ok(())
}

/// A labeled assessment as stored in a JSON batch file
///
/// Targets, period, and focus are optional; absent targets come from configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssessmentRecord {
    #[serde(default)]
    pub label: Option<String>,
    pub visit_count: u64,
    pub net_revenue: f64,
    pub labor_cost: f64,
    #[serde(default)]
    pub revenue_target_per_visit: Option<f64>,
    #[serde(default)]
    pub labor_target_per_visit: Option<f64>,
    #[serde(default)]
    pub period: Option<Period>,
    #[serde(default)]
    pub focus: Option<FocusArea>,
}

impl AssessmentRecord {
    /// Convert to an input, filling absent benchmarks from `defaults`
    pub fn to_input(&self, defaults: &Targets) -> AssessmentInput {
        AssessmentInput {
            visit_count: self.visit_count,
            net_revenue: self.net_revenue,
            labor_cost: self.labor_cost,
            revenue_target_per_visit: self
                .revenue_target_per_visit
                .unwrap_or(defaults.revenue_per_visit),
            labor_target_per_visit: self
                .labor_target_per_visit
                .unwrap_or(defaults.labor_per_visit),
            period: self.period.unwrap_or_default(),
            focus: self.focus.unwrap_or_default(),
        }
    }
}
