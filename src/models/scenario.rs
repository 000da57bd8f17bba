use crate::error::{Constraint, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use uuid::Uuid;

/// 发票流程指标 (八个数值输入)
#[derive(Debug, Clone, Copy, PartialEq, FromRow, Serialize, Deserialize)]
pub struct MetricInputs {
    pub monthly_invoice_volume: f64,
    pub num_ap_staff: f64,
    pub avg_hours_per_invoice: f64,
    pub hourly_wage: f64,
    pub error_rate_manual: f64, // 百分比, 0.5 表示 0.5%
    pub error_cost: f64,
    pub time_horizon_months: f64,
    pub one_time_implementation_cost: f64,
}

impl MetricInputs {
    /// 从 JSON 对象解析并校验，缺失/非数值/越界均返回 ValidationError
    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        let obj = value.as_object().ok_or(ValidationError::NotAnObject)?;

        let metrics = Self {
            monthly_invoice_volume: number_field(obj, "monthly_invoice_volume")?,
            num_ap_staff: number_field(obj, "num_ap_staff")?,
            avg_hours_per_invoice: number_field(obj, "avg_hours_per_invoice")?,
            hourly_wage: number_field(obj, "hourly_wage")?,
            error_rate_manual: number_field(obj, "error_rate_manual")?,
            error_cost: number_field(obj, "error_cost")?,
            time_horizon_months: number_field(obj, "time_horizon_months")?,
            one_time_implementation_cost: number_field(obj, "one_time_implementation_cost")?,
        };
        metrics.validate()?;
        Ok(metrics)
    }

    /// 按字段顺序校验，返回第一个违反的约束
    pub fn validate(&self) -> Result<(), ValidationError> {
        check("monthly_invoice_volume", self.monthly_invoice_volume, Constraint::AtLeast(1.0))?;
        check("num_ap_staff", self.num_ap_staff, Constraint::AtLeast(1.0))?;
        check("avg_hours_per_invoice", self.avg_hours_per_invoice, Constraint::GreaterThan(0.0))?;
        check("hourly_wage", self.hourly_wage, Constraint::AtLeast(1.0))?;
        check("error_rate_manual", self.error_rate_manual, Constraint::Between(0.0, 100.0))?;
        check("error_cost", self.error_cost, Constraint::AtLeast(0.0))?;
        check("time_horizon_months", self.time_horizon_months, Constraint::AtLeast(1.0))?;
        check(
            "one_time_implementation_cost",
            self.one_time_implementation_cost,
            Constraint::AtLeast(0.0),
        )?;
        Ok(())
    }
}

/// 命名场景输入
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ScenarioInput {
    pub scenario_name: String,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub metrics: MetricInputs,
}

impl ScenarioInput {
    pub fn new(scenario_name: impl Into<String>, metrics: MetricInputs) -> Result<Self, ValidationError> {
        let input = Self {
            scenario_name: scenario_name.into().trim().to_string(),
            metrics,
        };
        input.validate()?;
        Ok(input)
    }

    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        let obj = value.as_object().ok_or(ValidationError::NotAnObject)?;
        let name = match obj.get("scenario_name") {
            None | Some(Value::Null) => {
                return Err(ValidationError::Missing { field: "scenario_name" })
            }
            Some(Value::String(s)) => s.clone(),
            Some(_) => return Err(ValidationError::NotText { field: "scenario_name" }),
        };
        Self::new(name, MetricInputs::from_json(value)?)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.scenario_name.trim().is_empty() {
            return Err(ValidationError::OutOfRange {
                field: "scenario_name",
                constraint: Constraint::NonEmpty,
            });
        }
        self.metrics.validate()
    }
}

/// 已保存场景 (scenarios 表)
/// 不保存计算结果，读取时重新计算
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Scenario {
    pub id: Uuid,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub input: ScenarioInput,
    pub created_at: DateTime<Utc>,
}

fn check(field: &'static str, value: f64, constraint: Constraint) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::OutOfRange {
            field,
            constraint: Constraint::Finite,
        });
    }
    if constraint.admits(value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange { field, constraint })
    }
}

/// 读取数值字段，数字字符串同样接受
fn number_field(obj: &Map<String, Value>, field: &'static str) -> Result<f64, ValidationError> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(ValidationError::Missing { field }),
        Some(Value::Number(n)) => n.as_f64().ok_or(ValidationError::NotNumeric { field }),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or(ValidationError::NotNumeric { field }),
        Some(_) => Err(ValidationError::NotNumeric { field }),
    }
}
