//! 추출/적재 작업 모듈.

pub mod document_load;
pub mod epidemic_extract;
pub mod health_extract;
pub mod macro_extract;
pub mod market_extract;
pub mod relational_load;

pub use document_load::{load_documents, DocumentLoadReceipt};
pub use epidemic_extract::extract_epidemic;
pub use health_extract::extract_health;
pub use macro_extract::extract_macro;
pub use market_extract::extract_market;
pub use relational_load::{load_relational, RelationalInputs, TableLoadReport};
