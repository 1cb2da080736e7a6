//! 거시경제 지표 추출 모듈.

use crate::stats::{Measured, TaskStats};
use crate::Result;
use ingest_core::{MacroIndicatorSeries, PipelineConfig};
use ingest_data::{save_snapshot, WorldBankClient};

/// 설정된 지표마다 전체 페이지를 조회해 long 형식으로 변환하고 스냅샷을 남깁니다.
pub async fn extract_macro(
    config: &PipelineConfig,
    http: &reqwest::Client,
) -> Result<Vec<MacroIndicatorSeries>> {
    let macro_config = &config.macro_indicators;
    let client = WorldBankClient::new(http.clone(), &macro_config.base_url, macro_config.per_page);

    let mut series = Vec::with_capacity(macro_config.indicators.len());
    for spec in &macro_config.indicators {
        let s = client.fetch_series(spec).await?;
        let (table, path) = save_snapshot(&config.snapshot.dir, &spec.snapshot, s.to_table()).await?;

        tracing::info!(
            code = %spec.code,
            table = %spec.table,
            rows = table.len(),
            snapshot = %path.display(),
            "지표 추출 완료"
        );
        series.push(s);
    }

    Ok(series)
}

impl Measured for Vec<MacroIndicatorSeries> {
    fn stats(&self) -> TaskStats {
        TaskStats::new(self.iter().map(|s| s.records.len()).sum(), self.len())
    }
}
