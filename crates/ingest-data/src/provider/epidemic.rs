//! 지역별 역학 시계열 JSON 클라이언트.
//!
//! 응답은 지역 객체 배열이며 각 객체에 일별 지표 배열(`actualsTimeseries`)이 들어 있습니다.
//! 이를 (지역, 날짜) 단위 한 행으로 펼쳐 (date, cases, deaths, state)로 투영합니다.

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use ingest_core::EpidemicRecord;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::info;

/// 지역 한 곳의 시계열.
#[derive(Debug, Deserialize)]
pub struct RegionTimeseries {
    pub state: String,
    #[serde(rename = "actualsTimeseries", default)]
    pub actuals_timeseries: Vec<DailyActuals>,
}

/// 하루치 지표. 사용하지 않는 필드는 무시합니다.
#[derive(Debug, Deserialize)]
pub struct DailyActuals {
    pub date: String,
    #[serde(default)]
    pub cases: Option<i64>,
    #[serde(default)]
    pub deaths: Option<i64>,
}

/// 역학 시계열 API 클라이언트.
pub struct EpidemicTimeseriesClient {
    client: Client,
    endpoint: String,
    api_key: SecretString,
}

impl EpidemicTimeseriesClient {
    pub fn new(client: Client, endpoint: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        }
    }

    /// 전체 지역 시계열을 조회해 펼친 레코드를 반환합니다.
    ///
    /// 전송 오류와 비정상 HTTP 상태는 모두 에러로 반환됩니다.
    pub async fn fetch(&self) -> Result<Vec<EpidemicRecord>> {
        // 요청 URL에 API 키가 들어가므로 에러 메시지에는 URL을 남기지 않음
        let regions: Vec<RegionTimeseries> = self
            .client
            .get(&self.endpoint)
            .query(&[("apiKey", self.api_key.expose_secret())])
            .send()
            .await
            .map_err(|e| DataError::FetchError(e.without_url().to_string()))?
            .error_for_status()
            .map_err(|e| DataError::HttpStatus {
                url: self.endpoint.clone(),
                status: e.status().map(|s| s.as_u16()).unwrap_or_default(),
            })?
            .json()
            .await
            .map_err(|e| DataError::ParseError(e.without_url().to_string()))?;

        let records = flatten_regions(regions)?;
        info!(records = records.len(), "역학 시계열 조회 완료");
        Ok(records)
    }
}

/// 지역별 시계열을 (지역, 날짜) 단위 레코드로 펼칩니다. 입력 순서를 유지합니다.
pub fn flatten_regions(regions: Vec<RegionTimeseries>) -> Result<Vec<EpidemicRecord>> {
    let total = regions.iter().map(|r| r.actuals_timeseries.len()).sum();
    let mut records = Vec::with_capacity(total);

    for region in regions {
        for day in region.actuals_timeseries {
            let date = parse_date(&day.date).ok_or_else(|| {
                DataError::ParseError(format!("{}: 잘못된 날짜 '{}'", region.state, day.date))
            })?;
            records.push(EpidemicRecord {
                date,
                cases: day.cases,
                deaths: day.deaths,
                state: region.state.clone(),
            });
        }
    }

    Ok(records)
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.date_naive())
        })
}
