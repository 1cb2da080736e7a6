//! 메모리 저장소와 mockito 서버로 전체 그래프를 실행하는 통합 테스트.

use async_trait::async_trait;
use chrono::NaiveDate;
use ingest_collector::{run_pipeline, PipelineContext, TaskId, TaskStatus};
use ingest_core::{Column, ColumnType, EpidemicRecord, PipelineConfig, Table, Value};
use ingest_data::provider::market::DailyQuote;
use ingest_data::{
    DocumentStore, MarketDataSource, MemoryDocumentStore, MemoryRelationalStore, RelationalStore,
};
use mockito::{Matcher, Server};
use secrecy::SecretString;
use std::sync::Arc;

const DAILY_CSV: &str = "Date_reported,Country_code,Country,New_cases\n\
2020-01-05,AF,Afghanistan,\n\
2020-01-12,AF,Afghanistan,3\n";

const VACCINATION_CSV: &str = "COUNTRY,ISO3,TOTAL_VACCINATIONS\nAfghanistan,AFG,22964750\n";

const WORLD_BANK_PAGE: &str = r#"[{"page":1,"pages":1,"per_page":"20000","total":2},[
    {"country":{"id":"AW","value":"Aruba"},"countryiso3code":"ABW","date":"2021","value":null},
    {"country":{"id":"AW","value":"Aruba"},"countryiso3code":"ABW","date":"2020","value":-18.6}
]]"#;

const EPIDEMIC_JSON: &str = r#"[
    {"state":"CA","actualsTimeseries":[
        {"date":"2021-01-01","cases":100,"deaths":2,"newCases":5},
        {"date":"2021-01-02","cases":110,"deaths":null}
    ]},
    {"state":"NY","actualsTimeseries":[{"date":"2021-01-01","cases":90,"deaths":1}]}
]"#;

struct StaticMarket;

#[async_trait]
impl MarketDataSource for StaticMarket {
    async fn fetch_history(
        &self,
        _ticker: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> ingest_data::Result<Vec<DailyQuote>> {
        Ok((1..=3)
            .map(|day| DailyQuote {
                date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
                open: 1.0,
                high: 2.0,
                low: 0.5,
                close: 1.5,
                adj_close: 1.5,
                volume: 100,
            })
            .collect())
    }

    async fn fetch_company_name(&self, ticker: &str) -> ingest_data::Result<Option<String>> {
        Ok(Some(format!("{} Corp", ticker)))
    }
}

struct Harness {
    server: mockito::ServerGuard,
    _dir: tempfile::TempDir,
    documents: Arc<MemoryDocumentStore>,
    relational: Arc<MemoryRelationalStore>,
    ctx: PipelineContext,
}

fn stale_record() -> EpidemicRecord {
    EpidemicRecord {
        date: NaiveDate::from_ymd_opt(2019, 12, 31).unwrap(),
        cases: Some(1),
        deaths: Some(1),
        state: "STALE".to_string(),
    }
}

async fn harness() -> Harness {
    let server = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    let mut config = PipelineConfig::default();
    config.snapshot.dir = dir.path().join("snapshots");
    config.health.download_dir = dir.path().join("downloads");
    config.health.landing_url = format!("{}/dashboards/covid19/data", server.url());
    config.macro_indicators.base_url = format!("{}/v2", server.url());
    config.epidemic.endpoint = format!("{}/v2/states.timeseries.json", server.url());
    config.epidemic.api_key = Some(SecretString::from("test-key".to_string()));

    let documents = Arc::new(MemoryDocumentStore::with_documents(vec![stale_record()]));
    let relational = Arc::new(MemoryRelationalStore::new());

    // 이전 실행이 남긴 테이블
    let mut stale = Table::new("stock_data", vec![Column::new("Ticker", ColumnType::Text)]);
    stale.push_row(vec![Value::Text("OLD".to_string())]).unwrap();
    relational.replace_table(&stale).await.unwrap();

    let ctx = PipelineContext::new(
        config,
        reqwest::Client::new(),
        Arc::new(StaticMarket),
        documents.clone(),
        relational.clone(),
    );

    Harness {
        server,
        _dir: dir,
        documents,
        relational,
        ctx,
    }
}

async fn mock_health(server: &mut mockito::ServerGuard, with_links: bool) {
    let landing = if with_links {
        r#"<a href="/files/WHO-COVID-19-global-daily-data.csv">daily</a>
           <a href="/files/vaccination-data.csv">vaccines</a>"#
    } else {
        r#"<a href="/about">about</a>"#
    };
    server
        .mock("GET", "/dashboards/covid19/data")
        .with_status(200)
        .with_body(landing)
        .create_async()
        .await;
    server
        .mock("GET", "/files/WHO-COVID-19-global-daily-data.csv")
        .with_status(200)
        .with_body(DAILY_CSV)
        .create_async()
        .await;
    server
        .mock("GET", "/files/vaccination-data.csv")
        .with_status(200)
        .with_body(VACCINATION_CSV)
        .create_async()
        .await;
}

async fn mock_world_bank(server: &mut mockito::ServerGuard) {
    server
        .mock(
            "GET",
            Matcher::Regex(r"^/v2/country/all/indicator/[A-Z.]+$".to_string()),
        )
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(WORLD_BANK_PAGE)
        .create_async()
        .await;
}

async fn mock_epidemic(server: &mut mockito::ServerGuard, status: usize) -> mockito::Mock {
    server
        .mock("GET", "/v2/states.timeseries.json")
        .match_query(Matcher::UrlEncoded("apiKey".into(), "test-key".into()))
        .with_status(status)
        .with_body(if status == 200 { EPIDEMIC_JSON } else { "{}" })
        .create_async()
        .await
}

#[tokio::test]
async fn test_full_run_replaces_every_store() {
    let mut h = harness().await;
    mock_health(&mut h.server, true).await;
    mock_world_bank(&mut h.server).await;
    let epidemic = mock_epidemic(&mut h.server, 200).await;

    let report = run_pipeline(&h.ctx).await;

    epidemic.assert_async().await;
    assert!(report.is_success(), "{:?}", report.outcomes);
    assert_eq!(report.outcomes.len(), 6);

    // 문서 저장소: 이번 실행의 레코드만 남음
    let docs = h.documents.find_all().await.unwrap();
    assert_eq!(docs.len(), 3);
    assert!(docs.iter().all(|d| d.state != "STALE"));

    // 관계형 저장소: 7개 테이블, 이전 행 없음
    let mut names = h.relational.table_names().await;
    names.sort();
    let mut expected: Vec<String> = h
        .ctx
        .config
        .table_names()
        .into_iter()
        .map(String::from)
        .collect();
    expected.sort();
    assert_eq!(names, expected);

    let stock = h.relational.table("stock_data").await.unwrap();
    assert_eq!(stock.len(), 9 * 3);
    assert!(stock
        .column_values("Ticker")
        .unwrap()
        .all(|v| *v != Value::Text("OLD".to_string())));

    let covid = h.relational.table("covid_data").await.unwrap();
    assert_eq!(covid.len(), 3);

    let gdp = h.relational.table("gdp_data").await.unwrap();
    assert_eq!(gdp.column_names(), vec!["Country", "economy", "Year", "GDP"]);
    assert_eq!(gdp.len(), 2);

    let unemployment = h.relational.table("unemployment").await.unwrap();
    assert_eq!(
        unemployment.column_names(),
        vec!["Country", "economy", "Year", "Unemployment_Percentage"]
    );

    assert_eq!(h.relational.table("covid_who_data").await.unwrap().len(), 2);
    assert_eq!(h.relational.table("covid_vaccine_who_data").await.unwrap().len(), 1);

    // 스냅샷
    let snapshots = &h.ctx.config.snapshot.dir;
    for file in [
        "ticker.csv",
        "Impact_gdb_data.csv",
        "Impact_Unemployment.csv",
        "Impact_central_government_debt.csv",
        "covid_data.csv",
    ] {
        assert!(snapshots.join(file).is_file(), "{} 스냅샷 없음", file);
    }
}

#[tokio::test]
async fn test_epidemic_http_error_skips_loaders() {
    let mut h = harness().await;
    mock_health(&mut h.server, true).await;
    mock_world_bank(&mut h.server).await;
    mock_epidemic(&mut h.server, 403).await;

    let report = run_pipeline(&h.ctx).await;

    assert!(!report.is_success());
    assert_eq!(report.failed(), vec![TaskId::EpidemicExtract]);
    assert!(matches!(
        report.outcome(TaskId::MarketExtract),
        Some(TaskStatus::Succeeded(_))
    ));
    for task in [TaskId::DocumentLoad, TaskId::RelationalLoad] {
        match report.outcome(task) {
            Some(TaskStatus::Skipped { failed_upstream }) => {
                assert_eq!(failed_upstream, &vec![TaskId::EpidemicExtract]);
            }
            other => panic!("{} 건너뜀 기대, 실제: {:?}", task, other),
        }
    }

    // 저장소는 손대지 않음
    assert_eq!(h.documents.find_all().await.unwrap(), vec![stale_record()]);
    assert_eq!(h.relational.table_names().await, vec!["stock_data".to_string()]);
    assert_eq!(h.relational.table("stock_data").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_missing_health_files_skip_relational_load_only() {
    let mut h = harness().await;
    mock_health(&mut h.server, false).await;
    mock_world_bank(&mut h.server).await;
    mock_epidemic(&mut h.server, 200).await;

    let report = run_pipeline(&h.ctx).await;

    assert_eq!(report.failed(), vec![TaskId::HealthExtract]);
    assert!(matches!(
        report.outcome(TaskId::DocumentLoad),
        Some(TaskStatus::Succeeded(_))
    ));
    match report.outcome(TaskId::RelationalLoad) {
        Some(TaskStatus::Skipped { failed_upstream }) => {
            assert_eq!(failed_upstream, &vec![TaskId::HealthExtract]);
        }
        other => panic!("건너뜀 기대, 실제: {:?}", other),
    }

    // 다운로드 디렉터리는 비어 있음
    let downloads = &h.ctx.config.health.download_dir;
    assert_eq!(std::fs::read_dir(downloads).unwrap().count(), 0);
    assert_eq!(h.documents.len().await, 3);
}
