//! investidor10.com.br 종목 페이지 크롤러.
//!
//! B3 상장 종목의 페이지를 `<base_url>/<ticker>` 형태로 조회합니다.
//! 사이트가 기본 HTTP 클라이언트 식별자를 거부하므로 브라우저
//! User-Agent를 반드시 전송해야 합니다.
//!
//! ## 사용 예시
//! ```rust,ignore
//! let fetcher = Investidor10Fetcher::new(&config.scrape);
//! let html = fetcher.fetch_page("PETR3").await?;
//! ```

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use b3scan_core::ScrapeConfig;

use super::{FetchError, PageFetcher};

/// investidor10 종목 페이지 fetcher.
pub struct Investidor10Fetcher {
    client: Client,
    base_url: String,
}

impl Investidor10Fetcher {
    /// 수집 설정으로 생성.
    pub fn new(config: &ScrapeConfig) -> Self {
        Self::with_options(
            &config.base_url,
            &config.user_agent,
            config.request_timeout(),
        )
    }

    /// 개별 옵션으로 생성.
    pub fn with_options(base_url: &str, user_agent: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .expect("HTTP 클라이언트 생성 실패");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// 종목 페이지 URL.
    pub fn page_url(&self, ticker: &str) -> String {
        format!("{}/{}", self.base_url, ticker)
    }
}

#[async_trait]
impl PageFetcher for Investidor10Fetcher {
    async fn fetch_page(&self, ticker: &str) -> Result<String, FetchError> {
        let url = self.page_url(ticker);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        let html = String::from_utf8(bytes.to_vec()).map_err(|_| FetchError::NonTextBody)?;

        if html.trim().is_empty() {
            return Err(FetchError::EmptyBody);
        }

        debug!(ticker = ticker, bytes = html.len(), "종목 페이지 조회 완료");
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_fetcher(server_url: &str) -> Investidor10Fetcher {
        Investidor10Fetcher::with_options(
            &format!("{}/acoes", server_url),
            "test-agent/1.0",
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_page_url_strips_trailing_slash() {
        let fetcher = Investidor10Fetcher::with_options(
            "https://investidor10.com.br/acoes/",
            "test-agent/1.0",
            Duration::from_secs(5),
        );

        assert_eq!(
            fetcher.page_url("PETR3"),
            "https://investidor10.com.br/acoes/PETR3"
        );
    }

    #[tokio::test]
    async fn test_fetch_page_returns_body_on_200() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/acoes/PETR3")
            .match_header("user-agent", "test-agent/1.0")
            .with_status(200)
            .with_body("<html><body>ok</body></html>")
            .create_async()
            .await;

        let fetcher = test_fetcher(&server.url());
        let html = fetcher.fetch_page("PETR3").await.unwrap();

        assert!(html.contains("ok"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_page_fails_on_non_200() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/acoes/BBB4")
            .with_status(500)
            .with_body("internal error")
            .create_async()
            .await;

        let fetcher = test_fetcher(&server.url());
        let err = fetcher.fetch_page("BBB4").await.unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 500 }));
    }

    #[tokio::test]
    async fn test_fetch_page_fails_on_empty_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/acoes/VALE3")
            .with_status(200)
            .with_body("   \n  ")
            .create_async()
            .await;

        let fetcher = test_fetcher(&server.url());
        let err = fetcher.fetch_page("VALE3").await.unwrap_err();

        assert!(matches!(err, FetchError::EmptyBody));
    }

    #[tokio::test]
    async fn test_fetch_page_fails_on_non_utf8_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/acoes/ITUB3")
            .with_status(200)
            .with_body(vec![0xff, 0xfe, 0x00, 0x80])
            .create_async()
            .await;

        let fetcher = test_fetcher(&server.url());
        let err = fetcher.fetch_page("ITUB3").await.unwrap_err();

        assert!(matches!(err, FetchError::NonTextBody));
    }

    #[tokio::test]
    #[ignore] // 실제 네트워크 테스트는 ignore
    async fn test_fetch_live_page() {
        let fetcher = Investidor10Fetcher::new(&ScrapeConfig::default());
        let result = fetcher.fetch_page("PETR3").await;

        match result {
            Ok(html) => assert!(html.contains("cotacao")),
            Err(e) => eprintln!("조회 실패: {}", e),
        }
    }
}
