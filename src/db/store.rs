//! 场景存储抽象：生产使用 PostgreSQL，测试使用内存实现

use super::queries;
use crate::models::{Scenario, ScenarioInput};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::sync::RwLock;
use uuid::Uuid;

/// 场景行存储：插入、倒序列表、按 id 查询、按 id 删除
#[async_trait]
pub trait ScenarioStore: Send + Sync {
    async fn insert(&self, input: &ScenarioInput) -> Result<Scenario, sqlx::Error>;

    /// 按 created_at 倒序
    async fn list(&self) -> Result<Vec<Scenario>, sqlx::Error>;

    async fn get(&self, id: Uuid) -> Result<Option<Scenario>, sqlx::Error>;

    /// 返回 false 表示 id 不存在
    async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error>;
}

/// PostgreSQL 存储
pub struct PgScenarioStore {
    pool: PgPool,
}

impl PgScenarioStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScenarioStore for PgScenarioStore {
    async fn insert(&self, input: &ScenarioInput) -> Result<Scenario, sqlx::Error> {
        queries::insert_scenario(&self.pool, input).await
    }

    async fn list(&self) -> Result<Vec<Scenario>, sqlx::Error> {
        queries::list_scenarios(&self.pool).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Scenario>, sqlx::Error> {
        queries::get_scenario(&self.pool, id).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        queries::delete_scenario(&self.pool, id).await
    }
}

/// 内存存储 (测试与本地演示)
#[derive(Default)]
pub struct MemoryScenarioStore {
    rows: RwLock<Vec<Scenario>>,
}

impl MemoryScenarioStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> sqlx::Error {
        sqlx::Error::Protocol("scenario store lock poisoned".to_string())
    }
}

#[async_trait]
impl ScenarioStore for MemoryScenarioStore {
    async fn insert(&self, input: &ScenarioInput) -> Result<Scenario, sqlx::Error> {
        let scenario = Scenario {
            id: Uuid::new_v4(),
            input: input.clone(),
            created_at: Utc::now(),
        };
        self.rows
            .write()
            .map_err(|_| Self::poisoned())?
            .push(scenario.clone());
        Ok(scenario)
    }

    async fn list(&self) -> Result<Vec<Scenario>, sqlx::Error> {
        let mut rows: Vec<Scenario> = self
            .rows
            .read()
            .map_err(|_| Self::poisoned())?
            .iter()
            .rev()
            .cloned()
            .collect();
        // 稳定排序：同一时间戳时后插入的在前
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Scenario>, sqlx::Error> {
        Ok(self
            .rows
            .read()
            .map_err(|_| Self::poisoned())?
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut rows = self.rows.write().map_err(|_| Self::poisoned())?;
        let before = rows.len();
        rows.retain(|s| s.id != id);
        Ok(rows.len() < before)
    }
}
