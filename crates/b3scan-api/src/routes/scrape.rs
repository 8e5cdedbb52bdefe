//! 수집 실행 API.
//!
//! 설정된 종목 레지스트리 전체에 대해 파이프라인을 실행하고,
//! DB가 연결되어 있으면 결과를 저장한 뒤 스냅샷을 그대로 반환합니다.
//!
//! # 엔드포인트
//!
//! - `POST /api/v1/scrape/run` - 수집 실행

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use b3scan_core::StockSnapshot;

use crate::error::{ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// 수집 실행 응답.
#[derive(Debug, Serialize)]
pub struct ScrapeRunResponse {
    /// 저장된 실행 ID (DB 미설정 시 None)
    pub run_id: Option<Uuid>,
    /// 전체 종목 수
    pub total: usize,
    /// 실패한 종목 수
    pub failed: usize,
    /// 종목별 스냅샷 (입력 레지스트리 순서)
    pub snapshots: Vec<StockSnapshot>,
}

/// 수집 실행.
///
/// `POST /api/v1/scrape/run`
///
/// 개별 종목의 실패는 실행을 중단시키지 않으며, 실패 스냅샷으로
/// 응답에 포함됩니다. 저장 실패만 5xx로 처리합니다.
pub async fn run_scrape(State(state): State<Arc<AppState>>) -> ApiResult<Json<ScrapeRunResponse>> {
    info!(
        symbols = state.scrape.symbols.len(),
        concurrency = state.pipeline.concurrent_limit(),
        "수집 실행 요청"
    );

    let snapshots = state.pipeline.run(&state.scrape.symbols).await;
    let failed = snapshots.iter().filter(|s| s.failed).count();

    let run_id = match &state.repository {
        Some(repository) => match repository.save_run(&snapshots).await {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(error = %e, "수집 결과 저장 실패");
                return Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiErrorResponse::new(
                        "DB_ERROR",
                        format!("수집 결과 저장 실패: {}", e),
                    )),
                ));
            }
        },
        None => None,
    };

    info!(
        total = snapshots.len(),
        failed = failed,
        run_id = ?run_id,
        "수집 실행 완료"
    );

    Ok(Json(ScrapeRunResponse {
        run_id,
        total: snapshots.len(),
        failed,
        snapshots,
    }))
}

/// 수집 라우터 생성.
pub fn scrape_router() -> Router<Arc<AppState>> {
    Router::new().route("/run", post(run_scrape))
}
