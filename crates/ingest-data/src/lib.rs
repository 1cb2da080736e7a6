//! 외부 데이터 소스 및 저장소.
//!
//! 이 crate는 다음을 제공합니다:
//! - 시세(Yahoo Finance), 보건 대시보드, 세계은행 지표, 역학 시계열 JSON 제공자
//! - 문서 저장소 (MongoDB) 및 관계형 저장소 (PostgreSQL) 전체 교체 적재
//! - 추출 결과 CSV 스냅샷 기록

pub mod error;
pub mod http;
pub mod provider;
pub mod storage;

pub use error::{DataError, Result};

pub use provider::{
    EpidemicTimeseriesClient, HealthDashboardClient, MarketDataSource, WorldBankClient,
    YahooMarketSource,
};
pub use storage::{
    save_snapshot, write_snapshot, DocumentStore, MemoryDocumentStore, MemoryRelationalStore,
    MongoDocumentStore, PgRelationalStore, RelationalStore, ReplaceOutcome,
};
