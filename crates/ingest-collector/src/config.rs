//! 설정 로드.

use crate::Result;
use ingest_core::PipelineConfig;
use std::path::Path;

/// `.env`를 먼저 읽은 뒤 파일 + 환경 변수에서 파이프라인 설정을 로드합니다.
pub fn load(path: &Path) -> Result<PipelineConfig> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            tracing::warn!(error = %e, ".env 파일 읽기 실패");
        }
    }

    let config = PipelineConfig::load(path)?;
    tracing::debug!(
        config_path = %path.display(),
        tickers = config.market.tickers.len(),
        indicators = config.macro_indicators.indicators.len(),
        schedule = %config.schedule.cron,
        "설정 로드 완료"
    );
    Ok(config)
}
