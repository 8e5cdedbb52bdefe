//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//! 기본값 → 설정 파일(선택) → `B3SCAN__` 접두사 환경 변수 순으로 적용됩니다.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::domain::symbols::default_watchlist;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 데이터베이스 설정
    #[serde(default)]
    pub database: DatabaseConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 수집 설정
    #[serde(default)]
    pub scrape: ScrapeConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3333,
        }
    }
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// 최대 연결 수
    pub max_connections: u32,
    /// 연결 타임아웃 (초)
    pub connection_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            connection_timeout_secs: 10,
        }
    }
}

impl DatabaseConfig {
    /// 연결 타임아웃을 Duration으로 반환.
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 수집 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScrapeConfig {
    /// 종목 페이지 기본 URL (`<base_url>/<ticker>` 형태로 조회)
    pub base_url: String,
    /// 요청에 사용할 User-Agent
    ///
    /// 기본 클라이언트 식별자는 원본 사이트가 거부하거나 축약된
    /// 응답을 내려주므로 브라우저 UA가 필요합니다.
    pub user_agent: String,
    /// 동시 요청 상한 (최소 1)
    ///
    /// 기본값 1은 원본 사이트의 차단을 피하기 위한 보수적인 값이며,
    /// 알고리즘상의 제약이 아닙니다.
    pub concurrent_requests: usize,
    /// 요청당 타임아웃 (초)
    pub request_timeout_secs: u64,
    /// 수집 대상 종목 목록
    pub symbols: Vec<String>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://investidor10.com.br/acoes".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            concurrent_requests: 1,
            request_timeout_secs: 30,
            symbols: default_watchlist(),
        }
    }
}

impl ScrapeConfig {
    /// 요청 타임아웃을 Duration으로 반환.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// 동시 요청 상한 (1 미만은 1로 보정).
    pub fn concurrency(&self) -> usize {
        self.concurrent_requests.max(1)
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값 위에 환경 변수만 적용됩니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 기본값으로 시작
            .add_source(config::Config::try_from(&Self::default())?)
            // 파일에서 로드 (선택)
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드 (예: B3SCAN_SCRAPE__CONCURRENT_REQUESTS=4)
            .add_source(
                config::Environment::with_prefix("B3SCAN")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }
}
