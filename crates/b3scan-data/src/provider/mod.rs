//! 외부 데이터 소스 Provider.
//!
//! 파이프라인은 `PageFetcher` trait을 통해서만 네트워크에 접근하므로
//! 테스트에서는 스텁 구현으로 대체할 수 있습니다.

pub mod investidor10;

pub use investidor10::Investidor10Fetcher;

use async_trait::async_trait;
use thiserror::Error;

/// 종목 페이지 조회 실패 사유.
///
/// 모든 변종은 해당 종목에 국한된 실패이며 실행 전체를 중단시키지
/// 않습니다. 복구는 파이프라인이 실패 스냅샷으로 처리합니다.
#[derive(Debug, Error)]
pub enum FetchError {
    /// 네트워크/전송 오류
    #[error("HTTP 요청 실패: {0}")]
    Transport(#[from] reqwest::Error),

    /// 200이 아닌 응답 상태
    #[error("Unexpected status code: {status}")]
    Status {
        /// 응답 상태 코드
        status: u16,
    },

    /// 빈 응답 본문
    #[error("Empty response body")]
    EmptyBody,

    /// 텍스트로 해석할 수 없는 응답 본문
    #[error("Response body is not valid UTF-8 text")]
    NonTextBody,
}

/// 종목 페이지 조회 추상화.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// 한 종목의 원본 HTML 문서를 조회합니다.
    ///
    /// 호출당 정확히 한 번의 HTTP 요청을 보냅니다. 재시도는 하지
    /// 않습니다.
    async fn fetch_page(&self, ticker: &str) -> std::result::Result<String, FetchError>;
}
