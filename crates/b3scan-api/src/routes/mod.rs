//! API 라우트.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/api/v1/scrape` - 수집 실행 트리거
//! - `/api/v1/stocks` - 저장된 수집 결과 조회/삭제

pub mod health;
pub mod scrape;
pub mod stocks;

pub use health::{health_router, ComponentStatus, HealthResponse};
pub use scrape::{scrape_router, ScrapeRunResponse};
pub use stocks::{stocks_router, DeleteRunResponse, RunsListResponse};

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// 모든 서브 라우터를 조합하여 하나의 라우터로 반환합니다.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        // 헬스 체크 엔드포인트
        .nest("/health", health_router())
        // API v1 엔드포인트
        .nest("/api/v1/scrape", scrape_router())
        .nest("/api/v1/stocks", stocks_router())
}
