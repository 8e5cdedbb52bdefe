//! 에러 타입 정의.

use thiserror::Error;

/// Collector 에러 타입.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// 데이터베이스 에러
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// 저장소 에러
    #[error("Storage error: {0}")]
    Storage(#[from] b3scan_data::DataError),

    /// 설정 에러
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, CollectorError>;
