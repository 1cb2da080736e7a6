//! MongoDB 문서 저장소.

use crate::error::{DataError, Result};
use crate::storage::document::{DocumentStore, ReplaceOutcome};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use futures::TryStreamExt;
use ingest_core::{DocumentStoreConfig, EpidemicRecord};
use mongodb::bson::{doc, Bson, DateTime as BsonDateTime, Document};
use mongodb::{Client, Collection};
use tracing::{info, instrument};

/// 고정 컬렉션 하나에 대한 MongoDB 저장소.
#[derive(Clone)]
pub struct MongoDocumentStore {
    collection: Collection<Document>,
}

impl MongoDocumentStore {
    /// 연결 후 ping으로 서버 응답을 확인합니다.
    pub async fn connect(config: &DocumentStoreConfig) -> Result<Self> {
        info!(database = %config.database, collection = %config.collection, "MongoDB 연결 중...");

        let client = Client::with_uri_str(&config.uri)
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        let collection = client
            .database(&config.database)
            .collection::<Document>(&config.collection);

        info!("MongoDB 연결 완료");
        Ok(Self { collection })
    }
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    #[instrument(skip(self, records), fields(count = records.len()))]
    async fn replace_all(&self, records: &[EpidemicRecord]) -> Result<ReplaceOutcome> {
        let deleted = self.collection.delete_many(doc! {}).await?.deleted_count;

        let inserted = if records.is_empty() {
            0
        } else {
            let documents: Vec<Document> = records.iter().map(to_document).collect();
            self.collection.insert_many(documents).await?.inserted_ids.len() as u64
        };

        info!(deleted, inserted, "컬렉션 교체 완료");
        Ok(ReplaceOutcome { deleted, inserted })
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<EpidemicRecord>> {
        let documents: Vec<Document> = self
            .collection
            .find(doc! {})
            .projection(doc! { "_id": 0 })
            .await?
            .try_collect()
            .await?;

        documents.iter().map(from_document).collect()
    }
}

/// 레코드를 문서로 변환합니다. 날짜는 UTC 자정의 BSON datetime으로 저장합니다.
pub fn to_document(record: &EpidemicRecord) -> Document {
    let millis = record.date.and_time(NaiveTime::MIN).and_utc().timestamp_millis();
    doc! {
        "date": BsonDateTime::from_millis(millis),
        "cases": record.cases,
        "deaths": record.deaths,
        "state": record.state.as_str(),
    }
}

/// 문서를 레코드로 변환합니다.
pub fn from_document(document: &Document) -> Result<EpidemicRecord> {
    let date = match document.get("date") {
        Some(Bson::DateTime(dt)) => Utc
            .timestamp_millis_opt(dt.timestamp_millis())
            .single()
            .map(|t| t.date_naive()),
        Some(Bson::String(s)) => NaiveDate::parse_from_str(s, "%Y-%m-%d").ok(),
        _ => None,
    }
    .ok_or_else(|| DataError::ParseError(format!("date 필드 해석 실패: {}", document)))?;

    let state = document
        .get_str("state")
        .map_err(|e| DataError::ParseError(format!("state 필드 해석 실패: {}", e)))?
        .to_string();

    Ok(EpidemicRecord {
        date,
        cases: bson_i64(document.get("cases")),
        deaths: bson_i64(document.get("deaths")),
        state,
    })
}

fn bson_i64(value: Option<&Bson>) -> Option<i64> {
    match value? {
        Bson::Int32(v) => Some(i64::from(*v)),
        Bson::Int64(v) => Some(*v),
        Bson::Double(v) if v.is_finite() => Some(*v as i64),
        _ => None,
    }
}
