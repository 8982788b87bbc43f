//! Saved-run comparison
//!
//! A caller-owned, append-only list of labeled evaluations. Entries are never
//! edited or removed, and nothing here feeds back into scoring.

use crate::report::{format_money, Evaluation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioEntry {
    pub label: String,
    pub evaluation: Evaluation,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    entries: Vec<PortfolioEntry>,
}

impl Portfolio {
    pub fn new() -> Self {
        Portfolio::default()
    }

    /// Append an evaluation; a blank label becomes "Run N"
    pub fn push(&mut self, label: impl Into<String>, evaluation: Evaluation) {
        let label = label.into();
        let label = if label.trim().is_empty() {
            format!("Run {}", self.entries.len() + 1)
        } else {
            label
        };
        self.entries.push(PortfolioEntry { label, evaluation });
    }

    pub fn entries(&self) -> &[PortfolioEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry with the highest composite score; earliest wins ties
    pub fn best_by_composite(&self) -> Option<&PortfolioEntry> {
        self.entries.iter().fold(None, |best: Option<&PortfolioEntry>, entry| match best {
            Some(b)
                if b.evaluation.scores.composite_score
                    >= entry.evaluation.scores.composite_score =>
            {
                Some(b)
            }
            _ => Some(entry),
        })
    }

    /// Side-by-side table of every saved run, in insertion order
    pub fn render_comparison_text(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{:<20} {:>12} {:>12} {:>8} {:>8} {:>8}  {}\n",
            "LABEL", "RPV", "LPV", "RF", "LF", "VVI", "SCENARIO"
        ));

        for entry in &self.entries {
            let e = &entry.evaluation;
            output.push_str(&format!(
                "{:<20} {:>12} {:>12} {:>8.2} {:>8.2} {:>8.2}  {}\n",
                truncate_or_pad(&entry.label, 20),
                format_money(e.metrics.revenue_per_visit),
                format_money(e.metrics.labor_per_visit),
                e.scores.revenue_factor_score,
                e.scores.labor_factor_score,
                e.scores.composite_score,
                e.scenario.name,
            ));
        }

        if let Some(best) = self.best_by_composite() {
            output.push_str(&format!(
                "\nHighest VVI: {} ({:.2}, {})\n",
                best.label, best.evaluation.scores.composite_score, best.evaluation.tiers.composite
            ));
        }

        output
    }
}

/// Truncate or pad string to fixed width
fn truncate_or_pad(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        format!("{:<width$}", s, width = width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluate;
    use crate::input::AssessmentInput;

    fn eval(visits: u64, revenue: f64, labor: f64) -> Evaluation {
        evaluate(&AssessmentInput::new(visits, revenue, labor)).unwrap()
    }

    #[test]
    fn test_push_keeps_insertion_order() {
        let mut portfolio = Portfolio::new();
        assert!(portfolio.is_empty());
        portfolio.push("January", eval(500, 70_000.0, 42_500.0));
        portfolio.push("February", eval(500, 60_000.0, 50_000.0));
        assert_eq!(portfolio.len(), 2);
        assert_eq!(portfolio.entries()[0].label, "January");
        assert_eq!(portfolio.entries()[1].label, "February");
    }

    #[test]
    fn test_blank_label_gets_run_number() {
        let mut portfolio = Portfolio::new();
        portfolio.push("  ", eval(100, 14_000.0, 8_500.0));
        portfolio.push("", eval(100, 14_000.0, 8_500.0));
        assert_eq!(portfolio.entries()[0].label, "Run 1");
        assert_eq!(portfolio.entries()[1].label, "Run 2");
    }

    #[test]
    fn test_best_by_composite() {
        let mut portfolio = Portfolio::new();
        assert!(portfolio.best_by_composite().is_none());
        portfolio.push("weak", eval(500, 60_000.0, 50_000.0));
        portfolio.push("strong", eval(500, 100_000.0, 40_000.0));
        portfolio.push("strong again", eval(500, 100_000.0, 40_000.0));
        assert_eq!(portfolio.best_by_composite().unwrap().label, "strong");
    }

    #[test]
    fn test_comparison_lists_every_entry() {
        let mut portfolio = Portfolio::new();
        portfolio.push("North clinic", eval(500, 100_000.0, 65_000.0));
        portfolio.push("South clinic", eval(2400, 336_000.0, 204_000.0));
        let text = portfolio.render_comparison_text();
        assert!(text.contains("North clinic"));
        assert!(text.contains("South clinic"));
        assert!(text.contains("High Revenue / Critical Labor"));
        assert!(text.contains("Highest VVI: South clinic"));
    }
}
