use super::AppState;
use crate::error::AppError;
use crate::models::{MetricInputs, Scenario, ScenarioInput, SimulationResult};
use crate::service::report::{report_file_name, validate_recipient};
use crate::service::ReportMetadata;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Json, Path, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// 报告请求体
#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub scenario_name: String,
    pub inputs: Value,
    pub results: SimulationResult,
}

impl ReportRequest {
    /// 顶层 scenario_name 为空时取 inputs.scenario_name
    pub fn resolved_name(&self) -> String {
        if !self.scenario_name.trim().is_empty() {
            return self.scenario_name.clone();
        }
        self.inputs
            .get("scenario_name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }
}

/// 报告响应体
#[derive(Debug, Serialize, Deserialize)]
pub struct ReportResponse {
    pub success: bool,
    pub html: String,
    pub message: String,
}

/// 场景 + 重新计算的结果
#[derive(Debug, Serialize, Deserialize)]
pub struct ScenarioWithResults {
    pub scenario: Scenario,
    pub results: SimulationResult,
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// ROI 计算接口 (忽略 scenario_name)
pub async fn simulate(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SimulationResult>, AppError> {
    let Json(body) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    tracing::info!("Simulation request received: {}", body);

    let metrics = MetricInputs::from_json(&body)?;
    let result = state.engine.calculate(&metrics)?;

    tracing::info!("Simulation result: {:?}", result);
    Ok(Json(result))
}

/// 生成 HTML 报告 (JSON 包装)
pub async fn generate_report(
    State(state): State<AppState>,
    payload: Result<Json<ReportRequest>, JsonRejection>,
) -> Result<Json<ReportResponse>, AppError> {
    let Json(req) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let html = render_report(&state, &req)?;

    Ok(Json(ReportResponse {
        success: true,
        html,
        message: "Report generated successfully".to_string(),
    }))
}

/// 下载 HTML 报告
pub async fn download_report(
    State(state): State<AppState>,
    payload: Result<Json<ReportRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(req) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let html = render_report(&state, &req)?;
    // 响应头只允许可见 ASCII
    let file_name: String = report_file_name(&req.resolved_name())
        .chars()
        .filter(|c| c.is_ascii_graphic() && *c != '"' && *c != '\\')
        .collect();
    let disposition = format!("attachment; filename=\"{}\"", file_name);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        html,
    )
        .into_response())
}

fn render_report(state: &AppState, req: &ReportRequest) -> Result<String, AppError> {
    tracing::info!("Report generation request for: {}", req.email);
    validate_recipient(&req.email)?;

    let input = ScenarioInput::new(req.resolved_name(), MetricInputs::from_json(&req.inputs)?)?;
    let meta = ReportMetadata {
        recipient: req.email.clone(),
        generated_at: Utc::now(),
    };
    let html = state.renderer.render(&input, &req.results, &meta)?;

    tracing::info!("Report generated for scenario '{}' ({} bytes)", input.scenario_name, html.len());
    Ok(html)
}

/// 保存场景
pub async fn create_scenario(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let input = ScenarioInput::from_json(&body)?;
    let (scenario, results) = state.scenarios.save(input).await?;

    Ok((StatusCode::CREATED, Json(ScenarioWithResults { scenario, results })).into_response())
}

/// 场景列表 (按创建时间倒序)
pub async fn list_scenarios(State(state): State<AppState>) -> Result<Json<Vec<Scenario>>, AppError> {
    Ok(Json(state.scenarios.list().await?))
}

/// 加载场景并重新计算结果
pub async fn load_scenario(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ScenarioWithResults>, AppError> {
    let Path(id) = id.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let (scenario, results) = state.scenarios.load(id).await?;
    Ok(Json(ScenarioWithResults { scenario, results }))
}

/// 删除场景
pub async fn delete_scenario(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id.map_err(|e| AppError::BadRequest(e.body_text()))?;
    state.scenarios.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
