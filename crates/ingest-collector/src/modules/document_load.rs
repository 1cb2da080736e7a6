//! 문서 저장소 적재 모듈.

use crate::stats::{Measured, TaskStats};
use crate::Result;
use ingest_core::EpidemicRecord;
use ingest_data::DocumentStore;

/// 문서 저장소 교체 적재가 끝났다는 증표.
///
/// 관계형 적재는 이 값을 받아야만 호출할 수 있으므로 "쓰기 후 재조회" 순서가 타입으로 보장됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentLoadReceipt {
    pub deleted: u64,
    pub inserted: u64,
}

/// 컬렉션의 모든 문서를 지우고 이번 실행의 레코드를 삽입합니다.
pub async fn load_documents(
    store: &dyn DocumentStore,
    records: &[EpidemicRecord],
) -> Result<DocumentLoadReceipt> {
    tracing::info!(records = records.len(), "문서 저장소 적재 시작");

    let outcome = store.replace_all(records).await?;

    tracing::info!(
        deleted = outcome.deleted,
        inserted = outcome.inserted,
        "문서 저장소 적재 완료"
    );
    Ok(DocumentLoadReceipt {
        deleted: outcome.deleted,
        inserted: outcome.inserted,
    })
}

impl Measured for DocumentLoadReceipt {
    fn stats(&self) -> TaskStats {
        TaskStats::new(self.inserted as usize, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ingest_data::MemoryDocumentStore;

    fn record(state: &str, day: u32) -> EpidemicRecord {
        EpidemicRecord {
            date: NaiveDate::from_ymd_opt(2021, 3, day).unwrap(),
            cases: Some(day as i64),
            deaths: None,
            state: state.to_string(),
        }
    }

    #[tokio::test]
    async fn test_load_documents_replaces_collection() {
        let store = MemoryDocumentStore::with_documents(vec![record("TX", 1), record("TX", 2)]);
        let current = vec![record("CA", 5)];

        let receipt = load_documents(&store, &current).await.unwrap();

        assert_eq!(receipt, DocumentLoadReceipt { deleted: 2, inserted: 1 });
        assert_eq!(store.find_all().await.unwrap(), current);
    }
}
