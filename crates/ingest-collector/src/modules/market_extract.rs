//! 증권 시세 추출 모듈.

use crate::stats::{Measured, TaskStats};
use crate::Result;
use chrono::{Duration, NaiveDate, Utc};
use ingest_core::{PipelineConfig, Table};
use ingest_data::provider::market::{fetch_security_records, history_start};
use ingest_data::{save_snapshot, MarketDataSource};

/// 설정된 티커 전체의 일봉 이력을 (날짜, 티커) long 테이블로 추출하고 스냅샷을 남깁니다.
pub async fn extract_market(
    config: &PipelineConfig,
    source: &dyn MarketDataSource,
) -> Result<Table> {
    extract_market_until(config, source, Utc::now().date_naive()).await
}

/// 기준일(`today`)까지의 이력을 추출합니다.
pub async fn extract_market_until(
    config: &PipelineConfig,
    source: &dyn MarketDataSource,
    today: NaiveDate,
) -> Result<Table> {
    let market = &config.market;
    let start = history_start(today, market.history_years);
    // 종료일은 배타 구간이므로 하루 뒤까지 조회
    let end = today + Duration::days(1);

    tracing::info!(
        tickers = market.tickers.len(),
        start = %start,
        end = %today,
        "시세 추출 시작"
    );

    let records = fetch_security_records(source, &market.tickers, start, end).await?;
    let table = Table::from_rows(market.table.clone(), &records);

    let (table, path) = save_snapshot(&config.snapshot.dir, &market.snapshot, table).await?;
    tracing::info!(rows = table.len(), snapshot = %path.display(), "시세 추출 완료");

    Ok(table)
}

impl Measured for Table {
    fn stats(&self) -> TaskStats {
        TaskStats::new(self.len(), 1)
    }
}
