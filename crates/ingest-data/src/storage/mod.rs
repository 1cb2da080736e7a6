//! 저장소 구현.
//!
//! 두 저장소 모두 "전체 삭제 후 전체 삽입" 방식의 교체 적재만 지원합니다.

pub mod document;
pub mod mongo;
pub mod postgres;
pub mod relational;
pub mod snapshot;

pub use document::{DocumentStore, MemoryDocumentStore, ReplaceOutcome};
pub use mongo::MongoDocumentStore;
pub use postgres::PgRelationalStore;
pub use relational::{MemoryRelationalStore, RelationalStore};
pub use snapshot::{save_snapshot, write_snapshot};
