//! 데이터 모듈 오류 타입.

use std::path::PathBuf;
use thiserror::Error;

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 저장소 연결 오류
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// 쿼리 실행 오류
    #[error("Query error: {0}")]
    QueryError(String),

    /// 문서 저장소 오류
    #[error("Document store error: {0}")]
    DocumentStoreError(String),

    /// 데이터 가져오기 오류 (전송 계층)
    #[error("Fetch error: {0}")]
    FetchError(String),

    /// HTTP 상태 코드 오류
    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    /// 파싱 오류 (예상하지 못한 응답/파일 구조)
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 기대한 로컬 파일 없음
    #[error("Missing file: {}", .0.display())]
    MissingFile(PathBuf),

    /// 파일 입출력 오류
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// 설정 오류
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// 잘못된 데이터 형식
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<sqlx::Error> for DataError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => DataError::ConnectionError("Pool timed out".to_string()),
            sqlx::Error::Io(e) => DataError::ConnectionError(e.to_string()),
            sqlx::Error::Database(db_err) => DataError::QueryError(db_err.message().to_string()),
            _ => DataError::QueryError(err.to_string()),
        }
    }
}

impl From<mongodb::error::Error> for DataError {
    fn from(err: mongodb::error::Error) -> Self {
        DataError::DocumentStoreError(err.to_string())
    }
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        match (err.status(), err.url()) {
            (Some(status), Some(url)) => DataError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            },
            _ => DataError::FetchError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::ParseError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for DataError {
    fn from(err: tokio::task::JoinError) -> Self {
        DataError::Io(std::io::Error::other(err))
    }
}

impl From<csv::Error> for DataError {
    fn from(err: csv::Error) -> Self {
        DataError::ParseError(err.to_string())
    }
}

impl From<ingest_core::IngestError> for DataError {
    fn from(err: ingest_core::IngestError) -> Self {
        match err {
            ingest_core::IngestError::Config(msg) => DataError::ConfigError(msg),
            other => DataError::InvalidData(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
