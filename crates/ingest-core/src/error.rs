//! 파이프라인 핵심 에러 타입.

use thiserror::Error;

/// 핵심 파이프라인 에러.
#[derive(Debug, Error)]
pub enum IngestError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 테이블 구조 에러 (열 개수 불일치 등)
    #[error("테이블 에러: {0}")]
    InvalidTable(String),

    /// 값 파싱 에러
    #[error("파싱 에러: {0}")]
    Parse(String),
}

/// 핵심 작업을 위한 Result 타입.
pub type IngestResult<T> = Result<T, IngestError>;

impl From<config::ConfigError> for IngestError {
    fn from(err: config::ConfigError) -> Self {
        IngestError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for IngestError {
    fn from(err: serde_json::Error) -> Self {
        IngestError::Parse(err.to_string())
    }
}
