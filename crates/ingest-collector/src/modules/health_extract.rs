//! 보건 대시보드 데이터셋 추출 모듈.

use crate::stats::{Measured, TaskStats};
use crate::Result;
use ingest_core::{HealthDatasets, PipelineConfig};
use ingest_data::HealthDashboardClient;

/// 대시보드 페이지의 CSV 링크를 모두 내려받고 일별 현황/백신 접종 파일을 테이블로 읽습니다.
pub async fn extract_health(
    config: &PipelineConfig,
    http: &reqwest::Client,
) -> Result<HealthDatasets> {
    let health = &config.health;
    tracing::info!(landing_url = %health.landing_url, "보건 데이터셋 추출 시작");

    let client = HealthDashboardClient::new(http.clone());
    let datasets = client.fetch_datasets(health).await?;

    tracing::info!(
        downloaded = datasets.downloaded_files,
        daily_cases = datasets.daily_cases.len(),
        vaccination = datasets.vaccination.len(),
        "보건 데이터셋 추출 완료"
    );
    Ok(datasets)
}

impl Measured for HealthDatasets {
    fn stats(&self) -> TaskStats {
        TaskStats::new(
            self.daily_cases.len() + self.vaccination.len(),
            self.downloaded_files,
        )
    }
}
