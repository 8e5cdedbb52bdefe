//! B3 수집기 REST API.
//!
//! 수집 파이프라인 실행을 트리거하고, 저장된 실행 결과를 조회/삭제하는
//! 얇은 HTTP 계층입니다. 핵심 수집 로직은 `b3scan-data`에 있습니다.

pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiErrorResponse, ApiResult};
pub use state::AppState;
