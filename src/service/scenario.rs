use crate::db::ScenarioStore;
use crate::error::AppError;
use crate::models::{Scenario, ScenarioInput, SimulationResult};
use crate::service::RoiEngine;
use std::sync::Arc;
use uuid::Uuid;

/// 场景服务：保存/列表/加载/删除，结果始终由引擎重新计算
pub struct ScenarioService {
    store: Arc<dyn ScenarioStore>,
    engine: Arc<RoiEngine>,
}

impl ScenarioService {
    pub fn new(store: Arc<dyn ScenarioStore>, engine: Arc<RoiEngine>) -> Self {
        Self { store, engine }
    }

    /// 保存场景，返回保存时展示的结果
    pub async fn save(&self, input: ScenarioInput) -> Result<(Scenario, SimulationResult), AppError> {
        // 先计算，非法输入不落库
        let result = self.engine.calculate(&input.metrics)?;
        let scenario = self.store.insert(&input).await?;
        tracing::info!("Scenario {} saved: {}", scenario.id, scenario.input.scenario_name);
        Ok((scenario, result))
    }

    pub async fn list(&self) -> Result<Vec<Scenario>, AppError> {
        let scenarios = self.store.list().await?;
        tracing::debug!("Listed {} scenarios", scenarios.len());
        Ok(scenarios)
    }

    /// 加载场景并重新计算
    pub async fn load(&self, id: Uuid) -> Result<(Scenario, SimulationResult), AppError> {
        let Some(scenario) = self.store.get(id).await? else {
            return Err(AppError::NotFound(id));
        };
        let result = self.engine.calculate(&scenario.input.metrics)?;
        Ok((scenario, result))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.store.delete(id).await? {
            tracing::warn!("Scenario {} not found, nothing deleted", id);
            return Err(AppError::NotFound(id));
        }
        tracing::info!("Scenario {} deleted", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryScenarioStore;
    use crate::models::MetricInputs;
    use pretty_assertions::assert_eq;

    fn service() -> ScenarioService {
        ScenarioService::new(Arc::new(MemoryScenarioStore::new()), Arc::new(RoiEngine::new()))
    }

    fn input() -> ScenarioInput {
        ScenarioInput::new(
            "Reference",
            MetricInputs {
                monthly_invoice_volume: 2000.0,
                num_ap_staff: 3.0,
                avg_hours_per_invoice: 0.17,
                hourly_wage: 30.0,
                error_rate_manual: 0.5,
                error_cost: 100.0,
                time_horizon_months: 36.0,
                one_time_implementation_cost: 50000.0,
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_load_reproduces_result_shown_at_save() {
        let svc = service();
        let (saved, shown) = svc.save(input()).await.unwrap();
        let (loaded, recomputed) = svc.load(saved.id).await.unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(recomputed, shown);
    }

    #[tokio::test]
    async fn test_invalid_input_is_not_persisted() {
        let svc = service();
        let mut bad = input();
        bad.metrics.num_ap_staff = 0.0;
        let err = svc.save(bad).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(svc.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_scenario_is_not_found() {
        let svc = service();
        let id = Uuid::new_v4();
        assert!(matches!(svc.load(id).await, Err(AppError::NotFound(missing)) if missing == id));
        assert!(matches!(svc.delete(id).await, Err(AppError::NotFound(_))));
    }
}
