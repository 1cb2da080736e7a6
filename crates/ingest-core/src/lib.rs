//! # Ingest Core
//!
//! 임팩트 수집 파이프라인의 핵심 타입과 설정을 제공합니다.
//!
//! 이 크레이트는 파이프라인 전반에서 사용되는 기본 타입을 제공합니다:
//! - 레코드 타입 (증권 시세, 보건 데이터셋, 거시경제 지표, 역학 시계열)
//! - 저장소 적재용 범용 테이블 표현
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
