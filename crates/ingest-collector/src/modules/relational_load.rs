//! 관계형 저장소 적재 모듈.

use super::document_load::DocumentLoadReceipt;
use crate::stats::{Measured, TaskStats};
use crate::Result;
use ingest_core::{HealthDatasets, MacroIndicatorSeries, PipelineConfig, Table};
use ingest_data::{DocumentStore, RelationalStore};

/// 추출 작업 결과 중 관계형 적재에 필요한 것들.
pub struct RelationalInputs<'a> {
    pub market: &'a Table,
    pub health: &'a HealthDatasets,
    pub macro_series: &'a [MacroIndicatorSeries],
}

/// 테이블별 적재 행 수 (적재 순서).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableLoadReport {
    pub tables: Vec<(String, u64)>,
}

impl TableLoadReport {
    pub fn rows(&self, table: &str) -> Option<u64> {
        self.tables
            .iter()
            .find(|(name, _)| name == table)
            .map(|(_, rows)| *rows)
    }

    pub fn total_rows(&self) -> u64 {
        self.tables.iter().map(|(_, rows)| rows).sum()
    }
}

impl Measured for TableLoadReport {
    fn stats(&self) -> TaskStats {
        TaskStats::new(self.total_rows() as usize, self.tables.len())
    }
}

/// 추출 결과와 문서 저장소 재조회 결과를 테이블별로 교체 적재합니다.
///
/// 각 테이블 교체는 독립적으로 원자적입니다. 중간에 실패하면 앞선 테이블은 교체된 상태로,
/// 나머지 테이블은 손대지 않은 상태로 남습니다.
pub async fn load_relational(
    config: &PipelineConfig,
    relational: &dyn RelationalStore,
    documents: &dyn DocumentStore,
    inputs: RelationalInputs<'_>,
    receipt: &DocumentLoadReceipt,
) -> Result<TableLoadReport> {
    let epidemic_records = documents.find_all().await?;
    tracing::info!(
        staged = receipt.inserted,
        read_back = epidemic_records.len(),
        "문서 저장소 재조회 완료"
    );
    if epidemic_records.len() as u64 != receipt.inserted {
        tracing::warn!(
            staged = receipt.inserted,
            read_back = epidemic_records.len(),
            "재조회 문서 수가 적재 수와 다릅니다"
        );
    }
    let epidemic_table = Table::from_rows(config.epidemic.table.clone(), &epidemic_records);

    let mut tables: Vec<&Table> = vec![
        inputs.market,
        &inputs.health.daily_cases,
        &inputs.health.vaccination,
    ];
    let macro_tables: Vec<Table> = inputs.macro_series.iter().map(|s| s.to_table()).collect();
    tables.extend(macro_tables.iter());
    tables.push(&epidemic_table);

    let mut report = TableLoadReport::default();
    for table in tables {
        let rows = relational.replace_table(table).await.map_err(|e| {
            tracing::error!(table = %table.name(), error = %e, "테이블 교체 실패");
            e
        })?;
        tracing::info!(table = %table.name(), rows, "테이블 교체 완료");
        report.tables.push((table.name().to_string(), rows));
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use ingest_core::{
        Column, ColumnType, EpidemicRecord, IndicatorSpec, MacroIndicatorRecord, Value,
    };
    use ingest_data::{DataError, MemoryDocumentStore, MemoryRelationalStore};
    use tokio::sync::Mutex;

    fn text_table(name: &str, cells: &[&str]) -> Table {
        let mut table = Table::new(name, vec![Column::new("v", ColumnType::Text)]);
        for c in cells {
            table.push_row(vec![Value::Text(c.to_string())]).unwrap();
        }
        table
    }

    fn health() -> HealthDatasets {
        HealthDatasets {
            daily_cases: text_table("covid_who_data", &["a", "b"]),
            vaccination: text_table("covid_vaccine_who_data", &["c"]),
            downloaded_files: 2,
        }
    }

    fn macro_series() -> Vec<MacroIndicatorSeries> {
        IndicatorSpec::defaults()
            .into_iter()
            .map(|spec| MacroIndicatorSeries {
                spec,
                records: vec![MacroIndicatorRecord {
                    country: "Aruba".to_string(),
                    economy: "ABW".to_string(),
                    year: "YR2020".to_string(),
                    value: None,
                }],
            })
            .collect()
    }

    fn epidemic(day: u32) -> EpidemicRecord {
        EpidemicRecord {
            date: NaiveDate::from_ymd_opt(2022, 1, day).unwrap(),
            cases: Some(1),
            deaths: Some(0),
            state: "NY".to_string(),
        }
    }

    #[tokio::test]
    async fn test_loads_seven_tables_in_order() {
        let config = PipelineConfig::default();
        let relational = MemoryRelationalStore::new();
        let documents = MemoryDocumentStore::with_documents(vec![epidemic(1), epidemic(2)]);
        let market = text_table("stock_data", &["x", "y", "z"]);
        let health = health();
        let series = macro_series();

        let report = load_relational(
            &config,
            &relational,
            &documents,
            RelationalInputs {
                market: &market,
                health: &health,
                macro_series: &series,
            },
            &DocumentLoadReceipt { deleted: 0, inserted: 2 },
        )
        .await
        .unwrap();

        let names: Vec<&str> = report.tables.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, config.table_names());
        assert_eq!(report.rows("stock_data"), Some(3));
        assert_eq!(report.rows("covid_data"), Some(2));
        assert_eq!(report.total_rows(), 3 + 2 + 1 + 3 + 2);

        let covid = relational.table("covid_data").await.unwrap();
        assert_eq!(covid.column_names(), vec!["date", "cases", "deaths", "state"]);
    }

    /// 지정한 테이블에서 실패하는 저장소.
    struct FailingStore {
        fail_on: &'static str,
        written: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl RelationalStore for FailingStore {
        async fn replace_table(&self, table: &Table) -> ingest_data::Result<u64> {
            if table.name() == self.fail_on {
                return Err(DataError::QueryError("disk full".to_string()));
            }
            self.written.lock().await.push(table.name().to_string());
            Ok(table.len() as u64)
        }
    }

    #[tokio::test]
    async fn test_failure_leaves_later_tables_untouched() {
        let config = PipelineConfig::default();
        let relational = FailingStore {
            fail_on: "gdp_data",
            written: Mutex::new(Vec::new()),
        };
        let documents = MemoryDocumentStore::new();
        let market = text_table("stock_data", &["x"]);
        let health = health();
        let series = macro_series();

        let result = load_relational(
            &config,
            &relational,
            &documents,
            RelationalInputs {
                market: &market,
                health: &health,
                macro_series: &series,
            },
            &DocumentLoadReceipt { deleted: 0, inserted: 0 },
        )
        .await;

        assert!(result.is_err());
        assert_eq!(
            *relational.written.lock().await,
            vec!["stock_data", "covid_who_data", "covid_vaccine_who_data"]
        );
    }
}
