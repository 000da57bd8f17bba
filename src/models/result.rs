use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// ROI 计算结果 (不落库，每次按输入重新计算)
///
/// `payback_months` / `roi_percentage` 在除数为 0 时为 `None`，JSON 中为 `null`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub monthly_savings: f64,
    pub payback_months: Option<f64>,
    pub roi_percentage: Option<f64>,
    pub labor_cost_manual: f64,
    pub auto_cost: f64,
    pub error_savings: f64,
    pub cumulative_savings: f64,
    pub net_savings: f64,
}

impl SimulationResult {
    /// 所有字段必须是有限数值
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("monthly_savings", Some(self.monthly_savings)),
            ("payback_months", self.payback_months),
            ("roi_percentage", self.roi_percentage),
            ("labor_cost_manual", Some(self.labor_cost_manual)),
            ("auto_cost", Some(self.auto_cost)),
            ("error_savings", Some(self.error_savings)),
            ("cumulative_savings", Some(self.cumulative_savings)),
            ("net_savings", Some(self.net_savings)),
        ];
        for (field, value) in fields {
            if matches!(value, Some(v) if !v.is_finite()) {
                return Err(ValidationError::NonFiniteResult { field });
            }
        }
        Ok(())
    }
}
