//! 세계은행 지표 API 클라이언트.
//!
//! `/v2/country/all/indicator/{code}?format=json` 응답은 `[페이지 메타, 관측치 배열]`
//! 형태입니다. 모든 페이지를 모아 경제권 × 연도 wide 테이블을 만들고,
//! 호출자가 이를 long 형식으로 변환합니다.

use crate::error::{DataError, Result};
use ingest_core::{IndicatorSpec, MacroIndicatorSeries, WideIndicatorTable};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

/// 세계은행 API 클라이언트.
pub struct WorldBankClient {
    client: Client,
    base_url: String,
    per_page: u32,
}

#[derive(Debug, Deserialize)]
struct WbRef {
    #[serde(default)]
    id: String,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct WbObservation {
    country: WbRef,
    #[serde(default)]
    countryiso3code: String,
    date: String,
    value: Option<f64>,
}

/// 페이지 메타 정보.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PageInfo {
    page: u64,
    pages: u64,
}

impl WorldBankClient {
    pub fn new(client: Client, base_url: impl Into<String>, per_page: u32) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            per_page: per_page.max(1),
        }
    }

    /// 지표 하나의 모든 페이지를 조회해 wide 테이블로 구성합니다.
    pub async fn fetch_wide_table(&self, code: &str) -> Result<WideIndicatorTable> {
        let url = format!("{}/country/all/indicator/{}", self.base_url, code);
        let mut observations = Vec::new();
        let mut page = 1u64;

        loop {
            debug!(code, page, "지표 페이지 조회");
            let body: JsonValue = self
                .client
                .get(&url)
                .query(&[
                    ("format", "json".to_string()),
                    ("per_page", self.per_page.to_string()),
                    ("page", page.to_string()),
                ])
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            let (info, batch) = parse_page(code, body)?;
            observations.extend(batch);

            if info.page >= info.pages {
                break;
            }
            page = info.page + 1;
        }

        let mut skipped = 0usize;
        let cells: Vec<(String, String, i32, Option<f64>)> = observations
            .into_iter()
            .filter_map(|obs| match obs.date.trim().parse::<i32>() {
                Ok(year) => {
                    let economy = if obs.countryiso3code.is_empty() {
                        obs.country.id
                    } else {
                        obs.countryiso3code
                    };
                    Some((economy, obs.country.value, year, obs.value))
                }
                Err(_) => {
                    skipped += 1;
                    None
                }
            })
            .collect();

        if skipped > 0 {
            warn!(code, skipped, "연도가 아닌 date 값을 가진 관측치 제외");
        }

        let wide = WideIndicatorTable::from_observations(cells);
        info!(
            code,
            economies = wide.rows.len(),
            years = wide.years.len(),
            "지표 wide 테이블 구성 완료"
        );
        Ok(wide)
    }

    /// 지표를 조회해 long 형식 시리즈로 변환합니다.
    pub async fn fetch_series(&self, spec: &IndicatorSpec) -> Result<MacroIndicatorSeries> {
        let wide = self.fetch_wide_table(&spec.code).await?;
        Ok(MacroIndicatorSeries {
            spec: spec.clone(),
            records: wide.melt(),
        })
    }
}

fn parse_page(code: &str, body: JsonValue) -> Result<(PageInfo, Vec<WbObservation>)> {
    let JsonValue::Array(mut parts) = body else {
        return Err(DataError::ParseError(format!("{}: 배열 응답이 아님", code)));
    };
    if parts.is_empty() {
        return Err(DataError::ParseError(format!("{}: 빈 응답", code)));
    }

    let meta = parts.remove(0);
    if let Some(message) = meta.get("message") {
        return Err(DataError::FetchError(format!("{}: API 오류 {}", code, message)));
    }

    let info = PageInfo {
        page: json_u64(meta.get("page")).unwrap_or(1),
        pages: json_u64(meta.get("pages")).unwrap_or(1),
    };

    // 결과가 없으면 두 번째 원소가 null
    let observations = match parts.into_iter().next() {
        Some(JsonValue::Null) | None => Vec::new(),
        Some(data) => serde_json::from_value(data)?,
    };

    Ok((info, observations))
}

/// 숫자 또는 숫자 문자열을 u64로 읽습니다. (`per_page`는 문자열로 옴)
fn json_u64(value: Option<&JsonValue>) -> Option<u64> {
    match value? {
        JsonValue::Number(n) => n.as_u64(),
        JsonValue::String(s) => s.parse().ok(),
        _ => None,
    }
}
