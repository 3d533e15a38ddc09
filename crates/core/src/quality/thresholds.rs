//! Safety thresholds and the status classification engine.
//!
//! Pure logic: no stores, no clock. The caller passes a [`MetricVector`] and
//! gets back a [`Status`].

use crate::alert::{AlertLevel, ThresholdValue};
use crate::error::CoreError;
use crate::metric_names::{
    METRIC_DISSOLVED_OXYGEN, METRIC_PH, METRIC_TDS, METRIC_TEMP, METRIC_TURBIDITY,
};
use crate::metrics::{MetricVector, Status};
use crate::threshold_validation::validate_margin;

/// Default proximity to a hard limit that counts as "near" (10%).
pub const DEFAULT_CAUTION_MARGIN: f64 = 0.1;

pub const PH_MIN: f64 = 6.5;
pub const PH_MAX: f64 = 8.5;
pub const TURBIDITY_MAX: f64 = 6.0;
pub const TDS_MAX: f64 = 500.0;
pub const TEMP_MAX: f64 = 35.0;
pub const DISSOLVED_OXYGEN_MIN: f64 = 5.0;

/// Acceptable band for one metric plus the alert severity of leaving it.
#[derive(Debug, Clone, Copy)]
pub struct MetricRule {
    pub metric: &'static str,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub level: AlertLevel,
    extract: fn(&MetricVector) -> f64,
}

impl MetricRule {
    /// The value this rule inspects.
    pub fn value(&self, m: &MetricVector) -> f64 {
        (self.extract)(m)
    }

    /// Whether `value` is outside the hard band (limits themselves are acceptable).
    pub fn is_violated(&self, value: f64) -> bool {
        self.min.is_some_and(|min| value < min) || self.max.is_some_and(|max| value > max)
    }

    /// Whether `value` lies within `margin` of either limit, measured
    /// multiplicatively against the limit.
    pub fn is_near(&self, value: f64, margin: f64) -> bool {
        self.min.is_some_and(|min| value < min * (1.0 + margin))
            || self.max.is_some_and(|max| value > max * (1.0 - margin))
    }

    /// The limit reported on an alert: a number for one-sided rules, the
    /// `"min-max"` band for two-sided ones.
    pub fn threshold(&self) -> ThresholdValue {
        match (self.min, self.max) {
            (Some(min), Some(max)) => ThresholdValue::Range(format!("{min}-{max}")),
            (Some(limit), None) | (None, Some(limit)) => ThresholdValue::Limit(limit),
            (None, None) => ThresholdValue::Range(String::new()),
        }
    }
}

/// The five water-quality rules in alert emission order.
pub const RULES: [MetricRule; 5] = [
    MetricRule {
        metric: METRIC_TURBIDITY,
        min: None,
        max: Some(TURBIDITY_MAX),
        level: AlertLevel::High,
        extract: |m| m.turbidity,
    },
    MetricRule {
        metric: METRIC_TDS,
        min: None,
        max: Some(TDS_MAX),
        level: AlertLevel::Medium,
        extract: |m| m.tds,
    },
    MetricRule {
        metric: METRIC_TEMP,
        min: None,
        max: Some(TEMP_MAX),
        level: AlertLevel::Medium,
        extract: |m| m.temp,
    },
    MetricRule {
        metric: METRIC_PH,
        min: Some(PH_MIN),
        max: Some(PH_MAX),
        level: AlertLevel::Medium,
        extract: |m| m.ph,
    },
    MetricRule {
        metric: METRIC_DISSOLVED_OXYGEN,
        min: Some(DISSOLVED_OXYGEN_MIN),
        max: None,
        level: AlertLevel::High,
        extract: |m| m.dissolved_oxygen,
    },
];

/// Classifies metric vectors into [`Status`] levels.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdEvaluator {
    margin: f64,
}

impl ThresholdEvaluator {
    /// Build an evaluator with a custom caution margin in `[0.0, 1.0)`.
    pub fn new(margin: f64) -> Result<Self, CoreError> {
        validate_margin(margin, "caution margin")?;
        Ok(Self { margin })
    }

    pub fn margin(&self) -> f64 {
        self.margin
    }

    /// Classify a vector: any hard violation is `Unsafe`, otherwise any
    /// near-limit value is `Caution`, otherwise `Safe`.
    pub fn classify(&self, m: &MetricVector) -> Status {
        RULES
            .iter()
            .map(|rule| self.rule_status(rule, rule.value(m)))
            .max()
            .unwrap_or(Status::Safe)
    }

    fn rule_status(&self, rule: &MetricRule, value: f64) -> Status {
        if rule.is_violated(value) {
            Status::Unsafe
        } else if rule.is_near(value, self.margin) {
            Status::Caution
        } else {
            Status::Safe
        }
    }
}

impl Default for ThresholdEvaluator {
    fn default() -> Self {
        Self {
            margin: DEFAULT_CAUTION_MARGIN,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    use super::*;

    fn baseline() -> MetricVector {
        MetricVector {
            ph: 7.2,
            turbidity: 3.2,
            tds: 210.0,
            temp: 28.0,
            dissolved_oxygen: 6.1,
        }
    }

    #[test]
    fn baseline_is_safe() {
        assert_eq!(ThresholdEvaluator::default().classify(&baseline()), Status::Safe);
    }

    #[test]
    fn single_hard_violation_is_unsafe() {
        let eval = ThresholdEvaluator::default();
        let cases = [
            MetricVector { turbidity: 6.5, ..baseline() },
            MetricVector { tds: 501.0, ..baseline() },
            MetricVector { temp: 35.1, ..baseline() },
            MetricVector { ph: 6.4, ..baseline() },
            MetricVector { ph: 8.6, ..baseline() },
            MetricVector { dissolved_oxygen: 4.9, ..baseline() },
        ];
        for m in cases {
            assert_eq!(eval.classify(&m), Status::Unsafe, "{m:?}");
        }
    }

    #[test]
    fn limits_themselves_are_not_violations() {
        let eval = ThresholdEvaluator::default();
        let m = MetricVector { turbidity: 6.0, ..baseline() };
        assert_eq!(eval.classify(&m), Status::Caution);
    }

    #[test]
    fn near_limit_is_caution() {
        let eval = ThresholdEvaluator::default();
        // 5.5 > 6 * 0.9
        assert_eq!(eval.classify(&MetricVector { turbidity: 5.5, ..baseline() }), Status::Caution);
        // 5.4 < 5 * 1.1
        assert_eq!(
            eval.classify(&MetricVector { dissolved_oxygen: 5.4, ..baseline() }),
            Status::Caution
        );
        // 7.7 > 8.5 * 0.9
        assert_eq!(eval.classify(&MetricVector { ph: 7.7, ..baseline() }), Status::Caution);
        // 7.1 < 6.5 * 1.1
        assert_eq!(eval.classify(&MetricVector { ph: 7.1, ..baseline() }), Status::Caution);
    }

    #[test]
    fn violation_dominates_nearness() {
        let eval = ThresholdEvaluator::default();
        let m = MetricVector {
            turbidity: 5.9,
            tds: 600.0,
            ..baseline()
        };
        assert_eq!(eval.classify(&m), Status::Unsafe);
    }

    #[test]
    fn zero_margin_disables_caution() {
        let eval = ThresholdEvaluator::new(0.0).unwrap();
        assert_eq!(eval.classify(&MetricVector { turbidity: 5.99, ..baseline() }), Status::Safe);
    }

    #[test]
    fn wider_margin_flags_earlier() {
        let eval = ThresholdEvaluator::new(0.5).unwrap();
        assert_eq!(eval.margin(), 0.5);
        assert_eq!(eval.classify(&MetricVector { turbidity: 3.2, ..baseline() }), Status::Caution);
    }

    #[test]
    fn invalid_margin_is_rejected() {
        assert_matches!(ThresholdEvaluator::new(1.5), Err(CoreError::Validation(_)));
        assert_matches!(ThresholdEvaluator::new(-0.1), Err(CoreError::Validation(_)));
    }

    #[test]
    fn rule_thresholds_render_for_alerts() {
        assert_eq!(RULES[0].threshold(), ThresholdValue::Limit(6.0));
        assert_eq!(RULES[3].threshold(), ThresholdValue::Range("6.5-8.5".into()));
        assert_eq!(RULES[4].threshold(), ThresholdValue::Limit(5.0));
    }

    fn any_vector() -> impl Strategy<Value = MetricVector> {
        (
            4.0f64..11.0,
            0.0f64..12.0,
            0.0f64..1000.0,
            0.0f64..50.0,
            0.0f64..12.0,
        )
            .prop_map(|(ph, turbidity, tds, temp, dissolved_oxygen)| MetricVector {
                ph,
                turbidity,
                tds,
                temp,
                dissolved_oxygen,
            })
    }

    proptest! {
        #[test]
        fn classification_is_idempotent(m in any_vector()) {
            let eval = ThresholdEvaluator::default();
            prop_assert_eq!(eval.classify(&m), eval.classify(&m));
        }

        #[test]
        fn adding_a_violation_keeps_unsafe(m in any_vector(), extra_tds in 500.01f64..2000.0) {
            let eval = ThresholdEvaluator::default();
            if eval.classify(&m) == Status::Unsafe {
                let worse = MetricVector { tds: extra_tds, ..m };
                prop_assert_eq!(eval.classify(&worse), Status::Unsafe);
            }
        }

        #[test]
        fn safe_means_every_metric_clear(m in any_vector()) {
            let eval = ThresholdEvaluator::default();
            let all_clear = RULES.iter().all(|rule| {
                let v = rule.value(&m);
                !rule.is_violated(v) && !rule.is_near(v, DEFAULT_CAUTION_MARGIN)
            });
            prop_assert_eq!(eval.classify(&m) == Status::Safe, all_clear);
        }
    }
}
