//! Property tests for aggregation invariants.

use proptest::prelude::*;

use qaswarm::domain::models::{Finding, Recommendation, Severity, coverage_pct};
use qaswarm::services::aggregator;

fn severity_strategy() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Critical),
        Just(Severity::Moderate),
        Just(Severity::Minor),
    ]
}

fn finding_strategy() -> impl Strategy<Value = Finding> {
    (
        severity_strategy(),
        "/api/[a-z]{1,8}",
        "[a-z ]{1,20}",
        proptest::option::of(0u32..1000),
    )
        .prop_map(|(severity, endpoint, title, actual)| {
            let mut finding = Finding::new(severity, "behavioral", endpoint, "behavioral", title);
            finding.actual = actual.map(|status| serde_json::json!({ "status": status }));
            finding
        })
}

proptest! {
    /// Recommendation severity is monotone in the finding counts: adding a
    /// critical finding never softens the verdict, adding a moderate one
    /// never turns a WARN into a PASS.
    #[test]
    fn prop_recommendation_is_monotone(critical in 0usize..5, moderate in 0usize..5) {
        let base = Recommendation::derive(critical, moderate);
        let more_critical = Recommendation::derive(critical + 1, moderate);
        let more_moderate = Recommendation::derive(critical, moderate + 1);

        prop_assert_eq!(more_critical, Recommendation::Block);
        if base == Recommendation::Block {
            prop_assert_eq!(more_moderate, Recommendation::Block);
        } else {
            prop_assert_ne!(more_moderate, Recommendation::Pass);
        }
    }

    /// Deduplication is idempotent: a second pass removes nothing further.
    #[test]
    fn prop_dedup_is_idempotent(findings in proptest::collection::vec(finding_strategy(), 0..30)) {
        let once = aggregator::dedup(findings);
        let twice = aggregator::dedup(once.clone());
        prop_assert_eq!(once, twice);
    }

    /// Dedup never increases the finding count and keeps every key distinct.
    #[test]
    fn prop_dedup_keys_are_unique(findings in proptest::collection::vec(finding_strategy(), 0..30)) {
        let before = findings.len();
        let deduped = aggregator::dedup(findings);
        prop_assert!(deduped.len() <= before);

        let keys: std::collections::HashSet<_> =
            deduped.iter().map(Finding::dedup_key).collect();
        prop_assert_eq!(keys.len(), deduped.len());
    }

    /// Coverage percentage stays within [0, 100] whenever tested <= discovered.
    #[test]
    fn prop_coverage_pct_bounded(discovered in 0usize..500, tested_frac in 0.0f64..=1.0) {
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let tested = (discovered as f64 * tested_frac) as usize;
        let pct = coverage_pct(discovered, tested);
        prop_assert!((0.0..=100.0).contains(&pct));
        if discovered == 0 {
            prop_assert_eq!(pct, 0.0);
        }
    }
}
