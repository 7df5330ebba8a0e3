//! Depth-selection policy.
//!
//! Pure function of (trigger, context, risk, budgets) -> [`Depth`]. Never
//! errors: budgets that cannot be satisfied even at `shallow` simply yield
//! `shallow`.

use tracing::debug;

use crate::domain::models::{Depth, QaContext, SelectorConfig, Trigger};

/// Policy engine for choosing test intensity.
///
/// Selection runs in four ordered steps: base depth from trigger (or
/// explicit override), risk computation, escalation, and budget downgrade.
#[derive(Debug, Clone, Default)]
pub struct DepthSelector {
    config: SelectorConfig,
}

impl DepthSelector {
    /// Create a selector with the given policy knobs.
    pub fn new(config: SelectorConfig) -> Self {
        Self { config }
    }

    /// Select the depth for a session.
    ///
    /// `risk_hint` is the caller's own risk estimate in `[0.0, 1.0]`; the
    /// effective risk is the max of the hint and the locally computed score.
    pub fn select_depth(
        &self,
        trigger: Trigger,
        context: &QaContext,
        risk_hint: f64,
        time_budget_minutes: Option<u64>,
        cost_budget_usd: Option<f64>,
        override_depth: Option<Depth>,
    ) -> Depth {
        let base = override_depth.unwrap_or_else(|| Self::base_depth(trigger));

        let high_risk_target = self.has_high_risk_target(context);
        let computed = self.compute_risk(context, high_risk_target);
        let effective = risk_hint.max(computed);

        // High-risk targets force deep regardless of base depth; otherwise
        // high effective risk escalates the base by exactly one level.
        let mut depth = if high_risk_target {
            Depth::Deep
        } else if effective >= self.config.high_risk_threshold {
            base.escalated()
        } else {
            base
        };

        depth = self.apply_budgets(depth, time_budget_minutes, cost_budget_usd);

        debug!(
            %trigger,
            %depth,
            risk_hint,
            computed_risk = computed,
            high_risk_target,
            "depth selected"
        );
        depth
    }

    /// Base depth implied by the trigger alone.
    pub fn base_depth(trigger: Trigger) -> Depth {
        match trigger {
            Trigger::PostVerification | Trigger::UserCommand => Depth::Standard,
            Trigger::BugReproduction => Depth::Deep,
            Trigger::PreMerge => Depth::Regression,
        }
    }

    /// True when any target file or endpoint path contains a high-risk
    /// keyword.
    fn has_high_risk_target(&self, context: &QaContext) -> bool {
        let matches = |s: &str| {
            let lower = s.to_ascii_lowercase();
            self.config
                .high_risk_keywords
                .iter()
                .any(|kw| lower.contains(kw.as_str()))
        };
        context.target_files.iter().any(|f| matches(f))
            || context
                .target_endpoints
                .iter()
                .any(|ep| matches(&ep.path))
    }

    /// Locally computed risk score in `[0.0, 1.0]`.
    fn compute_risk(&self, context: &QaContext, high_risk_target: bool) -> f64 {
        let mut risk: f64 = 0.0;

        if high_risk_target {
            risk = risk.max(0.9);
        }

        // Endpoint count above 3 grows risk linearly from 0.5.
        let endpoint_count = context.target_endpoints.len();
        if endpoint_count > 3 {
            #[allow(clippy::cast_precision_loss)]
            let scaled = 0.05f64.mul_add((endpoint_count - 3) as f64, 0.5);
            risk = risk.max(scaled.min(0.85));
        }

        // Diff size thresholds.
        let diff_lines = context.diff_line_count();
        if diff_lines > 100 {
            risk = risk.max(0.7);
        } else if diff_lines > 50 {
            risk = risk.max(0.6);
        }

        risk
    }

    /// Downgrade until the selected depth fits the supplied budgets.
    ///
    /// Time and cost downgrades run independently from the same starting
    /// depth; whichever lands on the cheaper depth wins.
    fn apply_budgets(
        &self,
        depth: Depth,
        time_budget_minutes: Option<u64>,
        cost_budget_usd: Option<f64>,
    ) -> Depth {
        let estimates = &self.config.estimates;

        let by_cost = cost_budget_usd.map(|budget| {
            Self::downgrade_until(depth, |d| estimates.for_depth(d).cost_usd <= budget)
        });
        #[allow(clippy::cast_precision_loss)]
        let by_time = time_budget_minutes.map(|budget| {
            Self::downgrade_until(depth, |d| estimates.for_depth(d).minutes <= budget)
        });

        match (by_cost, by_time) {
            (Some(c), Some(t)) => {
                if estimates.for_depth(c).cost_usd <= estimates.for_depth(t).cost_usd {
                    c
                } else {
                    t
                }
            }
            (Some(d), None) | (None, Some(d)) => d,
            (None, None) => depth,
        }
    }

    /// Walk down the downgrade ladder until `fits` holds or the floor is hit.
    fn downgrade_until(mut depth: Depth, fits: impl Fn(Depth) -> bool) -> Depth {
        loop {
            if fits(depth) {
                return depth;
            }
            let lower = depth.downgraded();
            if lower == depth {
                return depth;
            }
            depth = lower;
        }
    }
}
