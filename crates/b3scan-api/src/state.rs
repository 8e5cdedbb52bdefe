//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 Arc로 래핑되어 여러 요청 간에 안전하게 공유됩니다.
//! Axum의 State extractor를 통해 핸들러에 주입됩니다.

use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

use b3scan_core::ScrapeConfig;
use b3scan_data::{ScrapePipeline, SnapshotRepository};

use crate::error::ApiErrorResponse;

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 데이터베이스 연결 풀 (PostgreSQL). 미설정 시 영속 기능 비활성
    pub db_pool: Option<sqlx::PgPool>,

    /// 수집 실행 저장소 (db_pool이 있을 때만 존재)
    pub repository: Option<SnapshotRepository>,

    /// 수집 파이프라인 - fetch/extract 팬아웃 실행
    pub pipeline: Arc<ScrapePipeline>,

    /// 수집 설정 (종목 레지스트리, 동시성 상한 등)
    pub scrape: ScrapeConfig,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    pub fn new(pipeline: Arc<ScrapePipeline>, scrape: ScrapeConfig) -> Self {
        Self {
            db_pool: None,
            repository: None,
            pipeline,
            scrape,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// DB 연결 풀과 저장소 설정.
    #[must_use]
    pub fn with_db_pool(mut self, pool: sqlx::PgPool) -> Self {
        self.repository = Some(SnapshotRepository::new(pool.clone()));
        self.db_pool = Some(pool);
        self
    }

    /// 저장소 접근 (미설정 시 503 에러 응답).
    pub fn require_repository(
        &self,
    ) -> Result<&SnapshotRepository, (StatusCode, Json<ApiErrorResponse>)> {
        self.repository.as_ref().ok_or_else(|| {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiErrorResponse::new(
                    "DB_UNAVAILABLE",
                    "데이터베이스가 연결되지 않았습니다",
                )),
            )
        })
    }

    /// DB 연결 상태 확인.
    pub async fn is_db_healthy(&self) -> bool {
        match &self.db_pool {
            Some(pool) => sqlx::query("SELECT 1").fetch_one(pool).await.is_ok(),
            None => false,
        }
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }
}

/// 테스트용 상태 생성 (DB 미연결).
#[cfg(test)]
pub fn create_test_state() -> AppState {
    let scrape = ScrapeConfig::default();
    AppState::new(Arc::new(ScrapePipeline::from_config(&scrape)), scrape)
}
