//! 역학 레코드 스테이징용 문서 저장소.

use crate::error::Result;
use async_trait::async_trait;
use ingest_core::EpidemicRecord;
use tokio::sync::RwLock;

/// 전체 교체 결과.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceOutcome {
    pub deleted: u64,
    pub inserted: u64,
}

/// 컬렉션 하나를 소유하는 문서 저장소.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// 컬렉션의 모든 문서를 지우고 `records`를 삽입합니다.
    async fn replace_all(&self, records: &[EpidemicRecord]) -> Result<ReplaceOutcome>;

    /// 저장소 생성 id를 제외한 모든 문서를 읽습니다.
    async fn find_all(&self) -> Result<Vec<EpidemicRecord>>;
}

/// 메모리 기반 문서 저장소 (테스트, 드라이런용).
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<Vec<EpidemicRecord>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(documents: Vec<EpidemicRecord>) -> Self {
        Self {
            documents: RwLock::new(documents),
        }
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn replace_all(&self, records: &[EpidemicRecord]) -> Result<ReplaceOutcome> {
        let mut docs = self.documents.write().await;
        let deleted = docs.len() as u64;
        docs.clear();
        docs.extend_from_slice(records);
        Ok(ReplaceOutcome {
            deleted,
            inserted: records.len() as u64,
        })
    }

    async fn find_all(&self) -> Result<Vec<EpidemicRecord>> {
        Ok(self.documents.read().await.clone())
    }
}
