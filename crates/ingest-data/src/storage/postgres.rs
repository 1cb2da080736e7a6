//! PostgreSQL 관계형 저장소.
//!
//! 테이블 교체는 트랜잭션 하나 안에서 `DROP TABLE IF EXISTS` → `CREATE TABLE` →
//! 다중 행 `INSERT`로 수행합니다. 여러 테이블을 묶는 트랜잭션은 없습니다.

use crate::error::{DataError, Result};
use crate::storage::relational::RelationalStore;
use async_trait::async_trait;
use chrono::NaiveDate;
use ingest_core::{Column, ColumnType, DatabaseConfig, Table, Value};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};
use tracing::{debug, info, instrument};

/// PostgreSQL 바인드 파라미터 최대 개수.
const MAX_BIND_PARAMS: usize = 65_535;

/// PostgreSQL 연결 풀 래퍼.
#[derive(Clone)]
pub struct PgRelationalStore {
    pool: PgPool,
    batch_size: usize,
}

impl PgRelationalStore {
    /// 새로운 연결 풀을 생성합니다.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        info!("Connecting to database...");

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout())
            .connect(&config.url)
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        info!("Database connection established");
        Ok(Self::from_pool(pool, config.insert_batch_size))
    }

    /// 기존 연결 풀에서 인스턴스를 생성합니다.
    pub fn from_pool(pool: PgPool, batch_size: usize) -> Self {
        Self {
            pool,
            batch_size: batch_size.max(1),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 열 개수를 고려한 INSERT 한 번당 행 수.
    fn rows_per_insert(&self, columns: usize) -> usize {
        self.batch_size.min(MAX_BIND_PARAMS / columns.max(1)).max(1)
    }
}

#[async_trait]
impl RelationalStore for PgRelationalStore {
    #[instrument(skip(self, table), fields(table = table.name(), rows = table.len()))]
    async fn replace_table(&self, table: &Table) -> Result<u64> {
        if table.columns().is_empty() {
            return Err(DataError::InvalidData(format!("{}: 열이 없음", table.name())));
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query(&drop_table_sql(table.name()))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&create_table_sql(table))
            .execute(&mut *tx)
            .await?;

        let column_list = column_list(table.columns());
        let mut written = 0u64;

        for chunk in table.rows().chunks(self.rows_per_insert(table.columns().len())) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
                "INSERT INTO {} ({}) ",
                quote_ident(table.name()),
                column_list
            ));
            builder.push_values(chunk, |mut b, row| {
                for (value, column) in row.iter().zip(table.columns()) {
                    match (value, column.column_type) {
                        (Value::Integer(v), _) => b.push_bind(*v),
                        (Value::Float(v), _) => b.push_bind(*v),
                        (Value::Numeric(v), _) => b.push_bind(*v),
                        (Value::Text(v), _) => b.push_bind(v.clone()),
                        (Value::Date(v), _) => b.push_bind(*v),
                        // NULL도 열 타입에 맞춰 바인딩해야 함
                        (Value::Null, ColumnType::Integer) => b.push_bind(None::<i64>),
                        (Value::Null, ColumnType::Float) => b.push_bind(None::<f64>),
                        (Value::Null, ColumnType::Numeric) => b.push_bind(None::<Decimal>),
                        (Value::Null, ColumnType::Text) => b.push_bind(None::<String>),
                        (Value::Null, ColumnType::Date) => b.push_bind(None::<NaiveDate>),
                    };
                }
            });

            written += builder.build().execute(&mut *tx).await?.rows_affected();
            debug!(written, "배치 삽입");
        }

        tx.commit().await?;
        info!(rows = written, "테이블 교체 완료");
        Ok(written)
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Database connection closed");
    }
}

/// 식별자를 큰따옴표로 감쌉니다.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn column_list(columns: &[Column]) -> String {
    columns
        .iter()
        .map(|c| quote_ident(&c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn drop_table_sql(name: &str) -> String {
    format!("DROP TABLE IF EXISTS {}", quote_ident(name))
}

fn create_table_sql(table: &Table) -> String {
    let columns = table
        .columns()
        .iter()
        .map(|c| format!("{} {}", quote_ident(&c.name), c.column_type.sql_type()))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE {} ({})", quote_ident(table.name()), columns)
}
