//! 수집 실행 결과 저장소 (PostgreSQL).
//!
//! 한 번의 파이프라인 실행 결과(스냅샷 목록) 전체를 하나의 JSONB
//! 레코드로 저장합니다. 조회/삭제 API는 실행 레코드 단위로
//! 동작합니다.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::postgres::PgPool;
use sqlx::FromRow;
use tracing::{debug, info};
use uuid::Uuid;

use b3scan_core::StockSnapshot;

use crate::error::{DataError, Result};

/// 저장된 수집 실행 레코드.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RunRecord {
    pub id: Uuid,
    /// 실행의 스냅샷 목록 (JSONB)
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl RunRecord {
    /// 저장된 JSON을 스냅샷 목록으로 역직렬화.
    pub fn snapshots(&self) -> Result<Vec<StockSnapshot>> {
        serde_json::from_value(self.data.clone()).map_err(DataError::from)
    }
}

/// 수집 실행 저장소.
#[derive(Clone)]
pub struct SnapshotRepository {
    pool: PgPool,
}

impl SnapshotRepository {
    /// 새로운 저장소 생성.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 테이블이 없으면 생성합니다.
    ///
    /// 서버/수집기 시작 시 한 번 호출합니다.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS stock_snapshot_run (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                data JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        debug!("stock_snapshot_run 테이블 확인 완료");
        Ok(())
    }

    /// 한 번의 실행 결과 전체를 하나의 레코드로 저장.
    pub async fn save_run(&self, snapshots: &[StockSnapshot]) -> Result<Uuid> {
        let data = serde_json::to_value(snapshots)?;

        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO stock_snapshot_run (data)
            VALUES ($1)
            RETURNING id
            "#,
        )
        .bind(&data)
        .fetch_one(&self.pool)
        .await?;

        info!(run_id = %id, count = snapshots.len(), "수집 실행 저장 완료");
        Ok(id)
    }

    /// 저장된 실행 목록 조회 (최신순).
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<RunRecord>> {
        let records: Vec<RunRecord> = sqlx::query_as(
            r#"
            SELECT id, data, created_at
            FROM stock_snapshot_run
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// 가장 최근 실행 조회.
    pub async fn latest(&self) -> Result<Option<RunRecord>> {
        let record: Option<RunRecord> = sqlx::query_as(
            r#"
            SELECT id, data, created_at
            FROM stock_snapshot_run
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// ID로 실행 조회.
    pub async fn get(&self, id: Uuid) -> Result<Option<RunRecord>> {
        let record: Option<RunRecord> = sqlx::query_as(
            r#"
            SELECT id, data, created_at
            FROM stock_snapshot_run
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// ID로 실행 삭제.
    ///
    /// 삭제된 레코드가 있으면 true를 반환합니다.
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM stock_snapshot_run
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
