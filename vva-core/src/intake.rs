//! Step-by-step intake state
//!
//! Collects one answer at a time and yields an [`AssessmentInput`] once every
//! question has been answered. The caller owns the `Intake` value; nothing
//! here is global.

use crate::error::{VvaError, VvaResult};
use crate::input::{require_positive, AssessmentInput, FocusArea, Period, Targets};

/// Intake questions, in the order they are asked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Question {
    VisitCount,
    NetRevenue,
    LaborCost,
    Period,
    Focus,
    RevenueTarget,
    LaborTarget,
}

impl Question {
    pub const ORDER: [Question; 7] = [
        Question::VisitCount,
        Question::NetRevenue,
        Question::LaborCost,
        Question::Period,
        Question::Focus,
        Question::RevenueTarget,
        Question::LaborTarget,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|q| *q == self).unwrap_or(0)
    }

    pub fn field(&self) -> &'static str {
        match self {
            Question::VisitCount => "visit_count",
            Question::NetRevenue => "net_revenue",
            Question::LaborCost => "labor_cost",
            Question::Period => "period",
            Question::Focus => "focus",
            Question::RevenueTarget => "revenue_target_per_visit",
            Question::LaborTarget => "labor_target_per_visit",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Answers {
    visit_count: Option<u64>,
    net_revenue: Option<f64>,
    labor_cost: Option<f64>,
    period: Option<Period>,
    focus: Option<FocusArea>,
    revenue_target: Option<f64>,
    labor_target: Option<f64>,
}

/// In-progress assessment answers
#[derive(Debug, Clone, PartialEq)]
pub struct Intake {
    step: usize,
    answers: Answers,
    defaults: Targets,
}

impl Default for Intake {
    fn default() -> Self {
        Intake::new()
    }
}

impl Intake {
    pub fn new() -> Self {
        Intake::with_defaults(Targets::default())
    }

    /// Start an intake whose benchmark questions default to `defaults`
    pub fn with_defaults(defaults: Targets) -> Self {
        Intake {
            step: 0,
            answers: Answers::default(),
            defaults,
        }
    }

    /// The question awaiting an answer, or `None` once complete
    pub fn current(&self) -> Option<Question> {
        Question::ORDER.get(self.step).copied()
    }

    pub fn is_complete(&self) -> bool {
        self.current().is_none()
    }

    /// 1-based step number and total, for "Question 3 of 7" style prompts
    pub fn progress(&self) -> (usize, usize) {
        let total = Question::ORDER.len();
        ((self.step + 1).min(total), total)
    }

    /// Prompt text for the current question
    pub fn prompt(&self) -> Option<String> {
        let question = self.current()?;
        let text = match question {
            Question::VisitCount => {
                "How many total patient visits occurred during this time period?".to_string()
            }
            Question::NetRevenue => {
                "What was the total amount of net revenue collected for these visits? ($)"
                    .to_string()
            }
            Question::LaborCost => {
                "What was the total labor cost for this period? ($) (W2 + PRN + overtime + contract/locum)"
                    .to_string()
            }
            Question::Period => {
                "What time period does this represent? [week, month, quarter, year] (default: month)"
                    .to_string()
            }
            Question::Focus => {
                "Optional: focus area for this assessment [all-areas, revenue-improvement, staffing-efficiency, patient-flow, burnout, none] (default: all-areas)"
                    .to_string()
            }
            Question::RevenueTarget => format!(
                "Revenue target per visit (default ${:.2})",
                self.defaults.revenue_per_visit
            ),
            Question::LaborTarget => format!(
                "Labor target per visit (default ${:.2})",
                self.defaults.labor_per_visit
            ),
        };
        Some(text)
    }

    /// Record an answer for the current question and advance
    ///
    /// On error the intake stays on the same question.
    pub fn answer(&mut self, raw: &str) -> VvaResult<()> {
        let question = self
            .current()
            .ok_or_else(|| VvaError::invalid("intake", "all questions are already answered"))?;
        let raw = raw.trim();

        match question {
            Question::VisitCount => {
                let visits = parse_count(question.field(), raw)?;
                self.answers.visit_count = Some(visits);
            }
            Question::NetRevenue => {
                self.answers.net_revenue = Some(parse_amount(question.field(), raw)?);
            }
            Question::LaborCost => {
                self.answers.labor_cost = Some(parse_amount(question.field(), raw)?);
            }
            Question::Period => {
                let period = if raw.is_empty() {
                    Period::default()
                } else {
                    raw.parse()?
                };
                self.answers.period = Some(period);
            }
            Question::Focus => {
                let focus = if raw.is_empty() {
                    FocusArea::default()
                } else {
                    raw.parse()?
                };
                self.answers.focus = Some(focus);
            }
            Question::RevenueTarget => {
                let target = if raw.is_empty() {
                    self.defaults.revenue_per_visit
                } else {
                    parse_amount(question.field(), raw)?
                };
                self.answers.revenue_target = Some(target);
            }
            Question::LaborTarget => {
                let target = if raw.is_empty() {
                    self.defaults.labor_per_visit
                } else {
                    parse_amount(question.field(), raw)?
                };
                self.answers.labor_target = Some(target);
            }
        }

        self.step = question.index() + 1;
        Ok(())
    }

    /// Build the assessment input from the collected answers
    pub fn finish(&self) -> VvaResult<AssessmentInput> {
        let visit_count = self
            .answers
            .visit_count
            .ok_or_else(|| missing(Question::VisitCount))?;
        let net_revenue = self
            .answers
            .net_revenue
            .ok_or_else(|| missing(Question::NetRevenue))?;
        let labor_cost = self
            .answers
            .labor_cost
            .ok_or_else(|| missing(Question::LaborCost))?;

        let input = AssessmentInput {
            visit_count,
            net_revenue,
            labor_cost,
            revenue_target_per_visit: self
                .answers
                .revenue_target
                .unwrap_or(self.defaults.revenue_per_visit),
            labor_target_per_visit: self
                .answers
                .labor_target
                .unwrap_or(self.defaults.labor_per_visit),
            period: self.answers.period.unwrap_or_default(),
            focus: self.answers.focus.unwrap_or_default(),
        };
        input.validate()?;
        Ok(input)
    }

    /// Discard all answers and return to the first question
    pub fn reset(&mut self) {
        self.step = 0;
        self.answers = Answers::default();
    }
}

fn missing(question: Question) -> VvaError {
    VvaError::invalid(question.field(), "no answer was given")
}

fn parse_count(field: &'static str, raw: &str) -> VvaResult<u64> {
    let cleaned = raw.replace(',', "");
    let visits: u64 = cleaned
        .parse()
        .map_err(|_| VvaError::invalid(field, format!("expected a whole number (got {:?})", raw)))?;
    if visits == 0 {
        return Err(VvaError::invalid(field, "must be at least 1"));
    }
    Ok(visits)
}

/// Parse a dollar amount, tolerating a leading `$` and thousands separators
fn parse_amount(field: &'static str, raw: &str) -> VvaResult<f64> {
    let cleaned: String = raw
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    let value: f64 = cleaned
        .parse()
        .map_err(|_| VvaError::invalid(field, format!("expected an amount (got {:?})", raw)))?;
    require_positive(field, value)?;
    Ok(value)
}
