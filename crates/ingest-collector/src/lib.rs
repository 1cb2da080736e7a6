//! Impact ingest collector.
//!
//! 이 crate는 추출/적재 작업과 이를 묶는 실행 그래프, 스케줄 트리거를 제공합니다:
//! - 시세, 보건 데이터셋, 거시경제 지표, 역학 시계열 추출
//! - 문서 저장소 교체 적재 → 관계형 저장소 테이블 교체 적재
//! - cron 스케줄 기반 데몬 실행

pub mod config;
pub mod context;
pub mod error;
pub mod modules;
pub mod pipeline;
pub mod schedule;
pub mod stats;

pub use context::PipelineContext;
pub use error::{CollectorError, Result};
pub use pipeline::{run_pipeline, RunReport, TaskId, TaskOutcome, TaskStatus};
pub use stats::TaskStats;
