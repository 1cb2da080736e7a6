//! 최종 테이블 적재용 관계형 저장소.

use crate::error::Result;
use async_trait::async_trait;
use ingest_core::Table;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// 테이블 단위 교체 적재를 지원하는 저장소.
#[async_trait]
pub trait RelationalStore: Send + Sync {
    /// 같은 이름의 테이블을 삭제하고 다시 만든 뒤 모든 행을 씁니다.
    ///
    /// 교체 하나는 원자적입니다. 실패하면 기존 테이블이 그대로 남습니다.
    async fn replace_table(&self, table: &Table) -> Result<u64>;

    /// 연결을 정리합니다. 기본 구현은 아무것도 하지 않습니다.
    async fn close(&self) {}
}

/// 메모리 기반 관계형 저장소 (테스트, 드라이런용).
#[derive(Debug, Default)]
pub struct MemoryRelationalStore {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryRelationalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn table(&self, name: &str) -> Option<Table> {
        self.tables.read().await.get(name).cloned()
    }

    pub async fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.read().await.keys().cloned().collect();
        names.sort();
        names
    }
}

#[async_trait]
impl RelationalStore for MemoryRelationalStore {
    async fn replace_table(&self, table: &Table) -> Result<u64> {
        self.tables
            .write()
            .await
            .insert(table.name().to_string(), table.clone());
        Ok(table.len() as u64)
    }
}
