use invoice_roi_sim::{create_pool, db::queries, router, AppConfig, AppState, PgScenarioStore};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::from_env()?;
    info!("Starting server with config: {:?}", config);

    // 创建数据库连接池
    let pool = create_pool(&config.database.url, config.database.max_connections).await?;
    queries::ensure_schema(&pool).await?;
    info!("Database pool created, scenarios table ready");

    let state = AppState::new(Arc::new(PgScenarioStore::new(pool)));
    let app = router(state);

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST   /api/simulate           - ROI calculation");
    info!("  POST   /api/report             - HTML report (JSON)");
    info!("  POST   /api/report/download    - HTML report (attachment)");
    info!("  GET    /api/scenarios          - list saved scenarios");
    info!("  POST   /api/scenarios          - save scenario");
    info!("  GET    /api/scenarios/:id      - load scenario");
    info!("  DELETE /api/scenarios/:id      - delete scenario");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
