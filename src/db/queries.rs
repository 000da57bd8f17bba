use crate::models::{Scenario, ScenarioInput};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

/// 建表 (启动时执行，已存在则跳过)
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS scenarios (
            id                           UUID PRIMARY KEY,
            scenario_name                TEXT NOT NULL,
            monthly_invoice_volume       DOUBLE PRECISION NOT NULL,
            num_ap_staff                 DOUBLE PRECISION NOT NULL,
            avg_hours_per_invoice        DOUBLE PRECISION NOT NULL,
            hourly_wage                  DOUBLE PRECISION NOT NULL,
            error_rate_manual            DOUBLE PRECISION NOT NULL,
            error_cost                   DOUBLE PRECISION NOT NULL,
            time_horizon_months          DOUBLE PRECISION NOT NULL,
            one_time_implementation_cost DOUBLE PRECISION NOT NULL,
            created_at                   TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_scenarios_created_at ON scenarios (created_at DESC)")
        .execute(pool)
        .await?;
    Ok(())
}

/// 插入场景，返回落库后的行
pub async fn insert_scenario(pool: &PgPool, input: &ScenarioInput) -> Result<Scenario, sqlx::Error> {
    let m = &input.metrics;
    sqlx::query_as::<_, Scenario>(
        r#"
        INSERT INTO scenarios (
            id, scenario_name,
            monthly_invoice_volume, num_ap_staff, avg_hours_per_invoice, hourly_wage,
            error_rate_manual, error_cost, time_horizon_months, one_time_implementation_cost,
            created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING id, scenario_name,
                  monthly_invoice_volume, num_ap_staff, avg_hours_per_invoice, hourly_wage,
                  error_rate_manual, error_cost, time_horizon_months, one_time_implementation_cost,
                  created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&input.scenario_name)
    .bind(m.monthly_invoice_volume)
    .bind(m.num_ap_staff)
    .bind(m.avg_hours_per_invoice)
    .bind(m.hourly_wage)
    .bind(m.error_rate_manual)
    .bind(m.error_cost)
    .bind(m.time_horizon_months)
    .bind(m.one_time_implementation_cost)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
}

/// 按创建时间倒序列出全部场景
pub async fn list_scenarios(pool: &PgPool) -> Result<Vec<Scenario>, sqlx::Error> {
    sqlx::query_as::<_, Scenario>(
        r#"
        SELECT id, scenario_name,
               monthly_invoice_volume, num_ap_staff, avg_hours_per_invoice, hourly_wage,
               error_rate_manual, error_cost, time_horizon_months, one_time_implementation_cost,
               created_at
        FROM scenarios
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await
}

/// 按主键查询场景
pub async fn get_scenario(pool: &PgPool, id: Uuid) -> Result<Option<Scenario>, sqlx::Error> {
    sqlx::query_as::<_, Scenario>(
        r#"
        SELECT id, scenario_name,
               monthly_invoice_volume, num_ap_staff, avg_hours_per_invoice, hourly_wage,
               error_rate_manual, error_cost, time_horizon_months, one_time_implementation_cost,
               created_at
        FROM scenarios
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// 删除场景，返回是否有行被删除
pub async fn delete_scenario(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM scenarios WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    tracing::debug!("DELETE scenarios id={} affected {} rows", id, result.rows_affected());
    Ok(result.rows_affected() > 0)
}
