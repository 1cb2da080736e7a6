//! 보건 대시보드 데이터셋 수집기.
//!
//! 대시보드 페이지의 `<a href>` 링크 중 경로가 데이터셋 확장자로 끝나는 것을 찾아
//! 모두 내려받은 뒤, 이름이 정해진 두 파일을 테이블로 읽습니다.
//! 페이지 구조가 바뀌어 기대한 파일이 없으면 [`DataError::MissingFile`]로 실패합니다.

use crate::error::{DataError, Result};
use ingest_core::{HealthConfig, HealthDatasets, Table};
use reqwest::{Client, Url};
use scraper::{Html, Selector};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// 보건 대시보드 클라이언트.
pub struct HealthDashboardClient {
    client: Client,
}

impl HealthDashboardClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// 페이지에서 데이터셋 링크를 찾아 절대 URL 목록으로 반환합니다.
    pub async fn discover_links(&self, landing_url: &str, extension: &str) -> Result<Vec<Url>> {
        let base = Url::parse(landing_url)
            .map_err(|e| DataError::ConfigError(format!("잘못된 URL '{}': {}", landing_url, e)))?;

        let html = self
            .client
            .get(base.clone())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let links = extract_links(&html, &base, extension);
        info!(url = %base, links = links.len(), "데이터셋 링크 탐색 완료");
        Ok(links)
    }

    /// 파일 하나를 `dir` 아래 URL 마지막 경로 조각 이름으로 저장합니다.
    pub async fn download(&self, url: &Url, dir: &Path) -> Result<PathBuf> {
        let file_name = file_name_of(url)
            .ok_or_else(|| DataError::InvalidData(format!("파일 이름 없는 URL: {}", url)))?;
        let path = dir.join(file_name);

        info!(url = %url, "다운로드 중");
        let bytes = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        tokio::fs::write(&path, &bytes).await?;
        info!(path = %path.display(), bytes = bytes.len(), "저장 완료");
        Ok(path)
    }

    /// 링크 탐색 → 전체 다운로드 → 기대 파일 두 개를 테이블로 파싱.
    pub async fn fetch_datasets(&self, config: &HealthConfig) -> Result<HealthDatasets> {
        tokio::fs::create_dir_all(&config.download_dir).await?;

        let links = self
            .discover_links(&config.landing_url, &config.file_extension)
            .await?;

        let mut downloaded = 0;
        for link in &links {
            self.download(link, &config.download_dir).await?;
            downloaded += 1;
        }
        info!(downloaded, "다운로드 완료");

        let daily_cases = load_csv_table(
            config.download_dir.join(&config.daily_cases_file),
            config.daily_cases_table.clone(),
        )
        .await?;
        let vaccination = load_csv_table(
            config.download_dir.join(&config.vaccination_file),
            config.vaccination_table.clone(),
        )
        .await?;

        Ok(HealthDatasets {
            daily_cases,
            vaccination,
            downloaded_files: downloaded,
        })
    }
}

/// HTML에서 경로가 `extension`으로 끝나는 링크를 `base` 기준 절대 URL로 추출합니다.
///
/// 문서 순서를 유지하며 중복은 제거합니다.
pub fn extract_links(html: &str, base: &Url, extension: &str) -> Vec<Url> {
    let document = Html::parse_document(html);
    let selector = match Selector::parse("a[href]") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    let mut links: Vec<Url> = Vec::new();
    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let url = match base.join(href.trim()) {
            Ok(url) => url,
            Err(e) => {
                debug!(href, error = %e, "링크 해석 실패");
                continue;
            }
        };
        if url.path().ends_with(extension) && !links.contains(&url) {
            links.push(url);
        }
    }
    links
}

/// 헤더가 있는 CSV 파일을 테이블로 읽습니다. 열 타입은 셀 값에서 추론합니다.
pub fn read_csv_table(path: &Path, table_name: &str) -> Result<Table> {
    if !path.is_file() {
        warn!(path = %path.display(), "기대한 데이터셋 파일 없음");
        return Err(DataError::MissingFile(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }

    let table = Table::from_text_rows(table_name, headers, rows)?;
    debug!(table = table_name, rows = table.len(), "CSV 파싱 완료");
    Ok(table)
}

/// 블로킹 스레드에서 [`read_csv_table`]을 실행합니다.
async fn load_csv_table(path: PathBuf, table_name: String) -> Result<Table> {
    tokio::task::spawn_blocking(move || read_csv_table(&path, &table_name)).await?
}

fn file_name_of(url: &Url) -> Option<String> {
    url.path_segments()?
        .last()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
