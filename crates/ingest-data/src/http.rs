//! 공용 HTTP 클라이언트 생성.

use crate::error::{DataError, Result};
use ingest_core::HttpConfig;

/// 설정의 타임아웃과 User-Agent를 적용한 클라이언트를 만듭니다.
pub fn build_client(config: &HttpConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.timeout())
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(|e| DataError::ConfigError(format!("HTTP 클라이언트 생성 실패: {}", e)))
}
