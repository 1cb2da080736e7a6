//! 파이프라인 단계 사이를 흐르는 레코드 타입.

mod epidemic;
mod health;
mod macro_indicator;
mod security;

pub use epidemic::*;
pub use health::*;
pub use macro_indicator::*;
pub use security::*;
