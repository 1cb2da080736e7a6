//! 에러 타입 정의.

use ingest_core::IngestError;
use ingest_data::DataError;
use std::fmt;

/// Collector 에러 타입
#[derive(Debug)]
pub enum CollectorError {
    /// 데이터 소스/저장소 에러
    Data(DataError),
    /// 설정 에러
    Config(String),
    /// 스케줄러 에러
    Scheduler(String),
}

impl fmt::Display for CollectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(e) => write!(f, "Data error: {}", e),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::Scheduler(msg) => write!(f, "Scheduler error: {}", msg),
        }
    }
}

impl std::error::Error for CollectorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Data(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DataError> for CollectorError {
    fn from(err: DataError) -> Self {
        Self::Data(err)
    }
}

impl From<IngestError> for CollectorError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Config(msg) => Self::Config(msg),
            other => Self::Data(DataError::from(other)),
        }
    }
}

impl From<tokio_cron_scheduler::JobSchedulerError> for CollectorError {
    fn from(err: tokio_cron_scheduler::JobSchedulerError) -> Self {
        Self::Scheduler(err.to_string())
    }
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, CollectorError>;
