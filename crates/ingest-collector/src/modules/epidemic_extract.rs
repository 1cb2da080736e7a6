//! 역학 시계열 추출 모듈.

use crate::error::CollectorError;
use crate::stats::{Measured, TaskStats};
use crate::Result;
use ingest_core::{EpidemicRecord, PipelineConfig, Table};
use ingest_data::{save_snapshot, EpidemicTimeseriesClient};

/// 지역별 시계열을 조회해 (date, cases, deaths, state) 레코드로 펼치고 스냅샷을 남깁니다.
///
/// HTTP/전송 오류는 로그를 남긴 뒤 에러로 반환되며, 이 경우 후속 적재는 실행되지 않습니다.
pub async fn extract_epidemic(
    config: &PipelineConfig,
    http: &reqwest::Client,
) -> Result<Vec<EpidemicRecord>> {
    let epidemic = &config.epidemic;
    let api_key = epidemic.api_key.clone().ok_or_else(|| {
        CollectorError::Config("epidemic.api_key가 설정되지 않았습니다".to_string())
    })?;

    tracing::info!(endpoint = %epidemic.endpoint, "역학 시계열 추출 시작");

    let client = EpidemicTimeseriesClient::new(http.clone(), &epidemic.endpoint, api_key);
    let records = match client.fetch().await {
        Ok(records) => records,
        Err(e) => {
            tracing::error!(endpoint = %epidemic.endpoint, error = %e, "역학 시계열 조회 실패");
            return Err(e.into());
        }
    };

    let table = Table::from_rows(epidemic.table.clone(), &records);
    let (_, path) = save_snapshot(&config.snapshot.dir, &epidemic.snapshot, table).await?;
    tracing::info!(records = records.len(), snapshot = %path.display(), "역학 시계열 추출 완료");

    Ok(records)
}

impl Measured for Vec<EpidemicRecord> {
    fn stats(&self) -> TaskStats {
        TaskStats::new(self.len(), 1)
    }
}
