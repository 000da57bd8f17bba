pub mod handlers;

pub use handlers::*;

use crate::db::ScenarioStore;
use crate::service::{ReportRenderer, RoiEngine, ScenarioService};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// 共享状态：计算引擎、报告渲染器、场景服务
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RoiEngine>,
    pub renderer: Arc<ReportRenderer>,
    pub scenarios: Arc<ScenarioService>,
}

impl AppState {
    pub fn new(store: Arc<dyn ScenarioStore>) -> Self {
        Self::with_engine(store, RoiEngine::new())
    }

    pub fn with_engine(store: Arc<dyn ScenarioStore>, engine: RoiEngine) -> Self {
        let engine = Arc::new(engine);
        Self {
            scenarios: Arc::new(ScenarioService::new(store, engine.clone())),
            renderer: Arc::new(ReportRenderer::new()),
            engine,
        }
    }
}

/// 构建路由
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/simulate", post(simulate))
        .route("/api/report", post(generate_report))
        .route("/api/report/download", post(download_report))
        .route("/api/scenarios", get(list_scenarios).post(create_scenario))
        .route("/api/scenarios/:id", get(load_scenario).delete(delete_scenario))
        .with_state(state)
}
