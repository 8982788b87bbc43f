//! Invariant Tests
//!
//! These tests explicitly validate properties that must always hold.
//! Run in CI to prevent regressions.

use vva_core::catalog::builtin_catalog;
use vva_core::metrics::compute_metrics;
use vva_core::resolver::{resolve_scenario, PosHeuristic, POS_CAPTURE_PUSH, POS_QUICK_AUDIT};
use vva_core::{classify, evaluate, render_text, AssessmentInput, ScenarioKey, Tier};

/// Relative float comparison
fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

#[test]
fn test_per_visit_division_roundtrips() {
    let cases = [
        (1u64, 0.01, 0.01),
        (7, 1_000.0, 333.33),
        (500, 100_000.0, 65_000.0),
        (2400, 480_000.0, 312_000.0),
        (9_999, 1_234_567.89, 765_432.1),
        (1_000_000, 98_765_432.1, 55_555_555.5),
    ];
    for (visits, revenue, labor) in cases {
        let m = compute_metrics(&AssessmentInput::new(visits, revenue, labor)).unwrap();
        assert!(
            close(m.revenue_per_visit * visits as f64, revenue),
            "RPV x visits != revenue for {:?}",
            (visits, revenue, labor)
        );
        assert!(
            close(m.labor_per_visit * visits as f64, labor),
            "LPV x visits != labor for {:?}",
            (visits, revenue, labor)
        );
        assert!(m.revenue_factor_raw.is_finite());
        assert!(m.labor_factor_raw.is_finite());
        assert!(m.composite_score.is_finite());
    }
}

#[test]
fn test_classify_pins_boundaries() {
    let expected = [
        (89.99, Tier::Critical),
        (89.999, Tier::Critical),
        (90.00, Tier::AtRisk),
        (94.99, Tier::AtRisk),
        (94.999, Tier::AtRisk),
        (95.00, Tier::Stable),
        (99.99, Tier::Stable),
        (99.999, Tier::Stable),
        (100.00, Tier::Excellent),
    ];
    for (score, tier) in expected {
        assert_eq!(classify(score), tier, "score {}", score);
    }
}

#[test]
fn test_every_scenario_pair_resolves() {
    let catalog = builtin_catalog().unwrap();
    let metrics = compute_metrics(&AssessmentInput::new(100, 13_000.0, 9_000.0)).unwrap();
    let mut count = 0;
    for revenue in Tier::ALL {
        for labor in Tier::ALL {
            let key = ScenarioKey::new(revenue, labor);
            let result =
                resolve_scenario(&catalog, key, &metrics, 140.0, &PosHeuristic::default())
                    .unwrap_or_else(|e| panic!("{} failed: {}", key.name(), e));
            assert!(!result.insight.label.is_empty());
            assert!(!result.diagnosis_text.is_empty());
            assert_eq!(result.immediate_actions.len(), 3, "{}", key.name());
            assert!(result.extended_actions.len() >= 2);
            count += 1;
        }
    }
    assert_eq!(count, 16);
}

#[test]
fn test_evaluation_is_deterministic() {
    let input = AssessmentInput::new(812, 104_300.0, 73_900.0);
    let first = evaluate(&input).unwrap();
    let second = evaluate(&input).unwrap();
    assert_eq!(first, second);
    assert_eq!(render_text(&first), render_text(&second));
}

#[test]
fn test_pos_branch_flips_once_as_gap_grows() {
    let catalog = builtin_catalog().unwrap();
    let pos = PosHeuristic::default();
    let target = 140.0;
    let mut seen_audit = false;
    let mut flips = 0;
    let mut previous_in_immediate = true;

    // Walk RPV down from just under target: the gap grows by $0.25 each step
    for step in 1..=80 {
        let rpv = target - step as f64 * 0.25;
        let metrics = compute_metrics(&AssessmentInput::new(100, rpv * 100.0, 8_000.0)).unwrap();
        let key = ScenarioKey::new(Tier::Stable, Tier::Excellent);
        let result = resolve_scenario(&catalog, key, &metrics, target, &pos).unwrap();

        let in_immediate = result.immediate_actions.iter().any(|a| a == POS_CAPTURE_PUSH);
        let in_extended = result.extended_actions.iter().any(|a| a == POS_QUICK_AUDIT);
        assert_ne!(in_immediate, in_extended, "exactly one POS action at rpv {}", rpv);
        assert_eq!(in_immediate, result.pos_in_immediate);

        if in_immediate {
            assert!(!seen_audit, "POS returned to immediate list at rpv {}", rpv);
        } else {
            seen_audit = true;
        }
        if in_immediate != previous_in_immediate {
            flips += 1;
        }
        previous_in_immediate = in_immediate;
    }

    assert!(seen_audit, "large gaps must demote the POS action");
    assert_eq!(flips, 1);
}

#[test]
fn test_excellent_revenue_never_emits_pos_actions() {
    for labor_cost in [5_000.0, 8_500.0, 9_000.0, 20_000.0] {
        let e = evaluate(&AssessmentInput::new(100, 20_000.0, labor_cost)).unwrap();
        assert_eq!(e.tiers.revenue, Tier::Excellent);
        assert!(!e.scenario.immediate_actions.iter().any(|a| a == POS_CAPTURE_PUSH));
        assert!(!e.scenario.extended_actions.iter().any(|a| a == POS_QUICK_AUDIT));
    }
}

#[test]
fn test_universal_extended_actions_always_last() {
    for (revenue, labor) in [(20_000.0, 5_000.0), (13_000.0, 9_000.0), (9_000.0, 12_000.0)] {
        let e = evaluate(&AssessmentInput::new(100, revenue, labor)).unwrap();
        let n = e.scenario.extended_actions.len();
        assert!(e.scenario.extended_actions[n - 2].starts_with("Daily 5-minute morning huddle"));
        assert!(e.scenario.extended_actions[n - 1].starts_with("Treat SWB% as context only"));
    }
}
