use crate::error::ValidationError;
use crate::models::{MetricInputs, SimulationResult};

/// 自动化处理每张发票的成本
pub const AUTOMATED_COST_PER_INVOICE: f64 = 0.20;
/// 自动化处理的假定错误率 (0.1%)
pub const ERROR_RATE_AUTO: f64 = 0.001;
/// 月节省金额的乐观系数，产品策略，保持 1.10 不变
pub const SAVINGS_MULTIPLIER: f64 = 1.10;

/// ROI 计算策略参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoiPolicy {
    pub automated_cost_per_invoice: f64,
    pub automated_error_rate: f64,
    pub savings_multiplier: f64,
}

impl Default for RoiPolicy {
    fn default() -> Self {
        Self {
            automated_cost_per_invoice: AUTOMATED_COST_PER_INVOICE,
            automated_error_rate: ERROR_RATE_AUTO,
            savings_multiplier: SAVINGS_MULTIPLIER,
        }
    }
}

/// ROI 计算引擎：纯函数，无内部状态
#[derive(Debug, Clone, Default)]
pub struct RoiEngine {
    policy: RoiPolicy,
}

impl RoiEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: RoiPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RoiPolicy {
        &self.policy
    }

    /// 计算 ROI 结果
    ///
    /// 输入不合法时返回 ValidationError，不做截断。
    /// 月节省为 0 时回本月数为 `None`；实施成本为 0 时 ROI 为 `None`。
    pub fn calculate(&self, input: &MetricInputs) -> Result<SimulationResult, ValidationError> {
        input.validate()?;
        let p = &self.policy;

        // 1. 人工成本
        let labor_cost_manual = input.num_ap_staff
            * input.hourly_wage
            * input.avg_hours_per_invoice
            * input.monthly_invoice_volume;

        // 2. 自动化成本
        let auto_cost = input.monthly_invoice_volume * p.automated_cost_per_invoice;

        // 3. 错误节省 (人工错误率低于自动化时为负)
        let error_savings = (input.error_rate_manual / 100.0 - p.automated_error_rate)
            * input.monthly_invoice_volume
            * input.error_cost;

        // 4. 月节省 (含乐观系数)
        let monthly_savings = (labor_cost_manual + error_savings - auto_cost) * p.savings_multiplier;

        // 5-6. 累计与净节省
        let cumulative_savings = monthly_savings * input.time_horizon_months;
        let net_savings = cumulative_savings - input.one_time_implementation_cost;

        // 7-8. 回本月数与 ROI
        let payback_months = ratio(input.one_time_implementation_cost, monthly_savings);
        let roi_percentage = ratio(net_savings, input.one_time_implementation_cost).map(|r| r * 100.0);

        let result = SimulationResult {
            monthly_savings: round_to(monthly_savings, 2),
            payback_months: payback_months.map(|v| round_to(v, 1)),
            roi_percentage: roi_percentage.map(|v| round_to(v, 1)),
            labor_cost_manual: round_to(labor_cost_manual, 2),
            auto_cost: round_to(auto_cost, 2),
            error_savings: round_to(error_savings, 2),
            cumulative_savings: round_to(cumulative_savings, 2),
            net_savings: round_to(net_savings, 2),
        };
        // 输入极大时乘积可能溢出
        result.validate()?;

        tracing::debug!(
            "ROI computed: monthly_savings={}, payback={:?}, roi={:?}",
            result.monthly_savings,
            result.payback_months,
            result.roi_percentage
        );
        Ok(result)
    }
}

/// 除数为 0 时无定义
fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        None
    } else {
        Some(numerator / denominator)
    }
}

/// 四舍五入 (远离零) 到 `places` 位小数，-0.0 归一为 0.0
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor + 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn reference() -> MetricInputs {
        MetricInputs {
            monthly_invoice_volume: 2000.0,
            num_ap_staff: 3.0,
            avg_hours_per_invoice: 0.17,
            hourly_wage: 30.0,
            error_rate_manual: 0.5,
            error_cost: 100.0,
            time_horizon_months: 36.0,
            one_time_implementation_cost: 50000.0,
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_reference_scenario() {
        let r = RoiEngine::new().calculate(&reference()).unwrap();
        assert_close(r.labor_cost_manual, 30600.0);
        assert_close(r.auto_cost, 400.0);
        assert_close(r.error_savings, 800.0);
        assert_close(r.monthly_savings, 34100.0);
        assert_close(r.cumulative_savings, 1227600.0);
        assert_close(r.net_savings, 1177600.0);
        assert_close(r.payback_months.unwrap(), 1.5);
        assert_close(r.roi_percentage.unwrap(), 2355.2);
    }

    #[test]
    fn test_calculation_is_idempotent() {
        let engine = RoiEngine::new();
        let first = engine.calculate(&reference()).unwrap();
        let second = engine.calculate(&reference()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_smallest_labor_cost_is_defined() {
        let input = MetricInputs {
            monthly_invoice_volume: 1.0,
            num_ap_staff: 1.0,
            avg_hours_per_invoice: 0.01,
            hourly_wage: 1.0,
            error_rate_manual: 0.0,
            error_cost: 0.0,
            time_horizon_months: 1.0,
            one_time_implementation_cost: 100.0,
        };
        let r = RoiEngine::new().calculate(&input).unwrap();
        assert_close(r.labor_cost_manual, 0.01);
        // (0.01 - 0.20) * 1.1 = -0.209
        assert_close(r.monthly_savings, -0.21);
        assert!(r.payback_months.unwrap() < 0.0);
    }

    #[test]
    fn test_low_manual_error_rate_gives_negative_error_savings() {
        let input = MetricInputs {
            error_rate_manual: 0.05,
            ..reference()
        };
        let r = RoiEngine::new().calculate(&input).unwrap();
        // (0.0005 - 0.001) * 2000 * 100 = -100
        assert_close(r.error_savings, -100.0);
    }

    #[test]
    fn test_zero_implementation_cost_has_no_roi() {
        let input = MetricInputs {
            one_time_implementation_cost: 0.0,
            ..reference()
        };
        let r = RoiEngine::new().calculate(&input).unwrap();
        assert_eq!(r.roi_percentage, None);
        assert_eq!(r.payback_months, Some(0.0));
        assert_close(r.net_savings, 1227600.0);
    }

    #[test]
    fn test_zero_monthly_savings_has_no_payback() {
        // 人工成本恰好等于自动化成本，且无错误节省
        let input = MetricInputs {
            monthly_invoice_volume: 1.0,
            num_ap_staff: 1.0,
            avg_hours_per_invoice: 0.2,
            hourly_wage: 1.0,
            error_rate_manual: 0.1,
            error_cost: 0.0,
            time_horizon_months: 12.0,
            one_time_implementation_cost: 1000.0,
        };
        let r = RoiEngine::new().calculate(&input).unwrap();
        assert_eq!(r.monthly_savings, 0.0);
        assert_eq!(r.payback_months, None);
        assert_close(r.roi_percentage.unwrap(), -100.0);
    }

    #[test]
    fn test_policy_override() {
        let policy = RoiPolicy {
            savings_multiplier: 1.0,
            ..RoiPolicy::default()
        };
        let r = RoiEngine::with_policy(policy).calculate(&reference()).unwrap();
        assert_close(r.monthly_savings, 31000.0);
    }

    #[test]
    fn test_invalid_input_is_rejected_not_clamped() {
        let input = MetricInputs {
            error_rate_manual: -1.0,
            ..reference()
        };
        let err = RoiEngine::new().calculate(&input).unwrap_err();
        assert_eq!(err.field(), Some("error_rate_manual"));
    }

    #[test]
    fn test_overflow_reported_as_validation_error() {
        let input = MetricInputs {
            monthly_invoice_volume: 1e200,
            num_ap_staff: 1e200,
            ..reference()
        };
        let err = RoiEngine::new().calculate(&input).unwrap_err();
        assert!(matches!(err, ValidationError::NonFiniteResult { .. }));
    }

    #[test]
    fn test_round_to_half_away_from_zero() {
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(-2.5, 0), -3.0);
        assert_eq!(round_to(1.25, 1), 1.3);
        assert_eq!(round_to(-0.001, 2).to_string(), "0");
    }

    fn valid_inputs() -> impl Strategy<Value = MetricInputs> {
        (
            1.0f64..100_000.0,
            1.0f64..50.0,
            0.01f64..5.0,
            1.0f64..200.0,
            0.0f64..100.0,
            0.0f64..1_000.0,
            1.0f64..120.0,
            1.0f64..1_000_000.0,
        )
            .prop_map(|(volume, staff, hours, wage, rate, cost, horizon, impl_cost)| MetricInputs {
                monthly_invoice_volume: volume,
                num_ap_staff: staff,
                avg_hours_per_invoice: hours,
                hourly_wage: wage,
                error_rate_manual: rate,
                error_cost: cost,
                time_horizon_months: horizon,
                one_time_implementation_cost: impl_cost,
            })
    }

    proptest! {
        #[test]
        fn prop_roi_and_net_savings_share_sign(input in valid_inputs()) {
            let r = RoiEngine::new().calculate(&input).unwrap();
            let roi = r.roi_percentage.unwrap();
            prop_assert!(!(r.net_savings > 0.0 && roi < 0.0));
            prop_assert!(!(r.net_savings < 0.0 && roi > 0.0));
        }

        #[test]
        fn prop_cumulative_is_monthly_times_horizon(input in valid_inputs()) {
            let r = RoiEngine::new().calculate(&input).unwrap();
            let expected = r.monthly_savings * input.time_horizon_months;
            let tolerance = 0.005 * (input.time_horizon_months + 1.0) + expected.abs() * 1e-12;
            prop_assert!((r.cumulative_savings - expected).abs() <= tolerance);
        }
    }
}
