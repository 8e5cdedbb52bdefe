//! 저장된 수집 결과 조회/삭제 API.
//!
//! # 엔드포인트
//!
//! - `GET /api/v1/stocks` - 저장된 실행 목록 조회 (최신순)
//! - `GET /api/v1/stocks/latest` - 가장 최근 실행 조회
//! - `GET /api/v1/stocks/{id}` - 단일 실행 조회
//! - `DELETE /api/v1/stocks/{id}` - 실행 삭제
//!
//! DB가 설정되지 않은 경우 모든 엔드포인트가 503을 반환합니다.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use b3scan_data::RunRecord;

use crate::error::{ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// 목록 조회 쿼리 파라미터.
#[derive(Debug, Deserialize)]
pub struct ListRunsQuery {
    /// 결과 수 제한
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// 오프셋
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// 실행 목록 응답.
#[derive(Debug, Serialize)]
pub struct RunsListResponse {
    pub runs: Vec<RunRecord>,
    pub count: usize,
}

/// 삭제 응답.
#[derive(Debug, Serialize)]
pub struct DeleteRunResponse {
    pub id: Uuid,
    pub deleted: bool,
}

/// 경로 파라미터의 UUID 파싱 (실패 시 400).
fn parse_run_id(id: &str) -> Result<Uuid, (StatusCode, Json<ApiErrorResponse>)> {
    Uuid::parse_str(id).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiErrorResponse::with_details(
                "INVALID_ID",
                "실행 ID가 UUID 형식이 아닙니다",
                serde_json::json!({ "id": id }),
            )),
        )
    })
}

fn db_error(e: b3scan_data::DataError) -> (StatusCode, Json<ApiErrorResponse>) {
    warn!(error = %e, "저장소 조회 실패");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiErrorResponse::new("DB_ERROR", e.to_string())),
    )
}

fn run_not_found(id: Option<Uuid>) -> (StatusCode, Json<ApiErrorResponse>) {
    let message = match id {
        Some(id) => format!("수집 결과를 찾을 수 없습니다: {}", id),
        None => "저장된 수집 결과가 없습니다".to_string(),
    };
    (
        StatusCode::NOT_FOUND,
        Json(ApiErrorResponse::new("RUN_NOT_FOUND", message)),
    )
}

/// 저장된 실행 목록 조회.
///
/// `GET /api/v1/stocks`
pub async fn list_runs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListRunsQuery>,
) -> ApiResult<Json<RunsListResponse>> {
    debug!(limit = query.limit, offset = query.offset, "실행 목록 조회");

    let repository = state.require_repository()?;
    let runs = repository
        .list(query.limit, query.offset)
        .await
        .map_err(db_error)?;

    Ok(Json(RunsListResponse {
        count: runs.len(),
        runs,
    }))
}

/// 가장 최근 실행 조회.
///
/// `GET /api/v1/stocks/latest`
pub async fn latest_run(State(state): State<Arc<AppState>>) -> ApiResult<Json<RunRecord>> {
    let repository = state.require_repository()?;
    let record = repository
        .latest()
        .await
        .map_err(db_error)?
        .ok_or_else(|| run_not_found(None))?;

    Ok(Json(record))
}

/// 단일 실행 조회.
///
/// `GET /api/v1/stocks/{id}`
pub async fn get_run(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<RunRecord>> {
    let id = parse_run_id(&id)?;

    let repository = state.require_repository()?;
    let record = repository
        .get(id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| run_not_found(Some(id)))?;

    Ok(Json(record))
}

/// 실행 삭제.
///
/// `DELETE /api/v1/stocks/{id}`
pub async fn delete_run(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteRunResponse>> {
    let id = parse_run_id(&id)?;

    let repository = state.require_repository()?;
    let deleted = repository.delete(id).await.map_err(db_error)?;

    if !deleted {
        return Err(run_not_found(Some(id)));
    }

    info!(run_id = %id, "수집 결과 삭제 완료");
    Ok(Json(DeleteRunResponse { id, deleted }))
}

/// 수집 결과 라우터 생성.
pub fn stocks_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_runs))
        .route("/latest", get(latest_run))
        .route("/{id}", get(get_run).delete(delete_run))
}
