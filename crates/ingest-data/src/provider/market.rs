//! 증권 시세 및 회사명 제공자.
//!
//! Yahoo Finance에서 티커별 일봉 이력을 가져온 뒤 티커 검색으로 회사명을 붙여
//! (날짜, 티커) 단위 long 레코드로 만듭니다.
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! use ingest_data::provider::market::{fetch_security_records, YahooMarketSource};
//!
//! let source = YahooMarketSource::new()?;
//! let records = fetch_security_records(&source, &tickers, start, end).await?;
//! ```

use crate::error::{DataError, Result};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, TimeZone, Utc};
use ingest_core::{sort_security_records, SecurityRecord};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use time::OffsetDateTime;
use tracing::{debug, info};
use yahoo_finance_api as yahoo;

/// 일봉 한 개.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyQuote {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: u64,
}

/// 시세 데이터 소스 트레잇.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// [start, end) 구간 일봉 이력 조회.
    async fn fetch_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyQuote>>;

    /// 회사 정식 명칭 조회. 결과가 없으면 None.
    async fn fetch_company_name(&self, ticker: &str) -> Result<Option<String>>;
}

/// Yahoo Finance 기반 시세 소스.
pub struct YahooMarketSource {
    connector: yahoo::YahooConnector,
}

impl YahooMarketSource {
    pub fn new() -> Result<Self> {
        let connector = yahoo::YahooConnector::new()
            .map_err(|e| DataError::ConnectionError(format!("Yahoo Finance 연결 실패: {}", e)))?;
        Ok(Self { connector })
    }
}

#[async_trait]
impl MarketDataSource for YahooMarketSource {
    async fn fetch_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyQuote>> {
        debug!(ticker, start = %start, end = %end, "Yahoo Finance 이력 조회");

        let response = self
            .connector
            .get_quote_history_interval(
                ticker,
                naive_date_to_offset_datetime(start)?,
                naive_date_to_offset_datetime(end)?,
                "1d",
            )
            .await
            .map_err(|e| DataError::FetchError(format!("Yahoo Finance API 오류 ({}): {}", ticker, e)))?;

        let quotes = response
            .quotes()
            .map_err(|e| DataError::ParseError(format!("Quote 파싱 오류 ({}): {}", ticker, e)))?;

        quotes
            .iter()
            .map(|q| {
                let date = Utc
                    .timestamp_opt(q.timestamp as i64, 0)
                    .single()
                    .ok_or_else(|| {
                        DataError::ParseError(format!("잘못된 타임스탬프 ({}): {}", ticker, q.timestamp))
                    })?
                    .date_naive();

                Ok(DailyQuote {
                    date,
                    open: q.open,
                    high: q.high,
                    low: q.low,
                    close: q.close,
                    adj_close: q.adjclose,
                    volume: q.volume as u64,
                })
            })
            .collect()
    }

    async fn fetch_company_name(&self, ticker: &str) -> Result<Option<String>> {
        let result = self
            .connector
            .search_ticker(ticker)
            .await
            .map_err(|e| DataError::FetchError(format!("Yahoo Finance 검색 실패 ({}): {}", ticker, e)))?;

        let name = result
            .quotes
            .iter()
            .find(|q| q.symbol.eq_ignore_ascii_case(ticker))
            .map(|q| q.long_name.clone())
            .filter(|n| !n.trim().is_empty());

        Ok(name)
    }
}

/// 티커 목록의 일봉 이력을 조회해 회사명이 붙은 long 레코드로 만듭니다.
///
/// 결과는 (날짜, 티커) 순으로 정렬됩니다. 같은 (날짜, 티커)가 중복되면 마지막 값을 씁니다.
/// 이력 또는 회사명 조회 실패는 즉시 에러를 반환합니다. 조회는 성공했지만 이름이 없으면 None으로 둡니다.
pub async fn fetch_security_records(
    source: &dyn MarketDataSource,
    tickers: &[String],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<SecurityRecord>> {
    let mut records = Vec::new();

    for ticker in tickers {
        let quotes = source.fetch_history(ticker, start, end).await?;

        let company_name = source.fetch_company_name(ticker).await?;

        info!(
            ticker = %ticker,
            quotes = quotes.len(),
            company = company_name.as_deref().unwrap_or("-"),
            "시세 조회 완료"
        );

        let mut by_date: BTreeMap<NaiveDate, SecurityRecord> = BTreeMap::new();
        for q in quotes {
            let record = SecurityRecord {
                date: q.date,
                ticker: ticker.clone(),
                open: to_decimal(q.open),
                high: to_decimal(q.high),
                low: to_decimal(q.low),
                close: to_decimal(q.close),
                adj_close: to_decimal(q.adj_close),
                volume: i64::try_from(q.volume).unwrap_or(i64::MAX),
                company_name: company_name.clone(),
            };
            by_date.insert(record.date, record);
        }
        records.extend(by_date.into_values());
    }

    sort_security_records(&mut records);
    Ok(records)
}

/// 기준일로부터 `years`년 전 날짜.
pub fn history_start(end: NaiveDate, years: u32) -> NaiveDate {
    let target_year = end.year() - years as i32;
    end.with_year(target_year)
        // 2월 29일 → 2월 28일
        .or_else(|| NaiveDate::from_ymd_opt(target_year, end.month(), 28))
        .unwrap_or(end)
}

fn to_decimal(v: f64) -> Decimal {
    Decimal::from_f64_retain(v).unwrap_or_default().round_dp(6)
}

fn naive_date_to_offset_datetime(date: NaiveDate) -> Result<OffsetDateTime> {
    let month = time::Month::try_from(date.month() as u8)
        .map_err(|e| DataError::InvalidData(format!("잘못된 월: {}", e)))?;
    let date = time::Date::from_calendar_date(date.year(), month, date.day() as u8)
        .map_err(|e| DataError::InvalidData(format!("잘못된 날짜: {}", e)))?;
    Ok(date.midnight().assume_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    struct FakeSource {
        history: HashMap<String, Vec<DailyQuote>>,
        names: HashMap<String, String>,
        name_errors: HashSet<String>,
    }

    #[async_trait]
    impl MarketDataSource for FakeSource {
        async fn fetch_history(&self, ticker: &str, _: NaiveDate, _: NaiveDate) -> Result<Vec<DailyQuote>> {
            self.history
                .get(ticker)
                .cloned()
                .ok_or_else(|| DataError::FetchError(format!("no data for {}", ticker)))
        }

        async fn fetch_company_name(&self, ticker: &str) -> Result<Option<String>> {
            if self.name_errors.contains(ticker) {
                return Err(DataError::FetchError("connection refused".to_string()));
            }
            Ok(self.names.get(ticker).cloned())
        }
    }

    fn quote(date: &str, close: f64) -> DailyQuote {
        DailyQuote {
            date: date.parse().unwrap(),
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            adj_close: close,
            volume: 1000,
        }
    }

    const TICKERS: [&str; 9] = ["PFE", "MRNA", "JNJ", "BNTX", "ABT", "TMO", "UNH", "CVS", "AZN"];

    fn fake_for_all_tickers() -> FakeSource {
        let mut history = HashMap::new();
        let mut names = HashMap::new();
        for t in TICKERS {
            history.insert(
                t.to_string(),
                vec![quote("2024-01-02", 10.0), quote("2024-01-03", 11.0), quote("2024-01-04", 12.0)],
            );
            names.insert(t.to_string(), format!("{} Corp", t));
        }
        FakeSource {
            history,
            names,
            name_errors: HashSet::new(),
        }
    }

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_one_row_per_date_ticker_with_names() {
        let source = fake_for_all_tickers();
        let tickers: Vec<String> = TICKERS.iter().map(|t| t.to_string()).collect();

        let records = fetch_security_records(&source, &tickers, day("2024-01-01"), day("2024-01-05"))
            .await
            .unwrap();

        assert_eq!(records.len(), 9 * 3);
        let mut keys: Vec<_> = records.iter().map(|r| (r.date, r.ticker.clone())).collect();
        keys.dedup();
        assert_eq!(keys.len(), 27);
        assert!(records.iter().all(|r| r.company_name.is_some()));
        assert_eq!(records[0].date, day("2024-01-02"));
        assert_eq!(records[0].ticker, "ABT");
    }

    #[tokio::test]
    async fn test_missing_name_is_null() {
        let mut source = fake_for_all_tickers();
        source.names.remove("BNTX");
        let tickers = vec!["BNTX".to_string(), "PFE".to_string()];

        let records = fetch_security_records(&source, &tickers, day("2024-01-01"), day("2024-01-05"))
            .await
            .unwrap();

        assert!(records.iter().filter(|r| r.ticker == "BNTX").all(|r| r.company_name.is_none()));
        assert!(records.iter().filter(|r| r.ticker == "PFE").all(|r| r.company_name.is_some()));
    }

    #[tokio::test]
    async fn test_history_failure_propagates() {
        let source = fake_for_all_tickers();
        let tickers = vec!["PFE".to_string(), "XXXX".to_string()];

        let result = fetch_security_records(&source, &tickers, day("2024-01-01"), day("2024-01-05")).await;
        assert!(matches!(result, Err(DataError::FetchError(_))));
    }

    #[tokio::test]
    async fn test_name_lookup_failure_propagates() {
        let mut source = fake_for_all_tickers();
        source.name_errors.insert("MRNA".to_string());
        let tickers = vec!["PFE".to_string(), "MRNA".to_string()];

        let result = fetch_security_records(&source, &tickers, day("2024-01-01"), day("2024-01-05")).await;
        assert!(matches!(result, Err(DataError::FetchError(_))));
    }

    #[tokio::test]
    async fn test_duplicate_dates_collapse() {
        let mut source = fake_for_all_tickers();
        source.history.insert(
            "PFE".to_string(),
            vec![quote("2024-01-02", 10.0), quote("2024-01-02", 10.5)],
        );

        let records = fetch_security_records(&source, &["PFE".to_string()], day("2024-01-01"), day("2024-01-05"))
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].close, to_decimal(10.5));
    }

    #[test]
    fn test_history_start() {
        assert_eq!(history_start(day("2024-10-17"), 10), day("2014-10-17"));
        assert_eq!(history_start(day("2024-02-29"), 1), day("2023-02-28"));
    }

    #[tokio::test]
    #[ignore] // 실제 API 호출 필요
    async fn test_yahoo_integration() {
        let source = YahooMarketSource::new().expect("Yahoo 연결 실패");
        let quotes = source
            .fetch_history("PFE", day("2024-01-01"), day("2024-02-01"))
            .await
            .expect("이력 조회 실패");
        assert!(!quotes.is_empty());

        let name = source.fetch_company_name("PFE").await.expect("검색 실패");
        println!("PFE: {:?}", name);
    }
}
