//! 작업 통계 구조체.

use serde::Serialize;
use std::time::Duration;

/// 작업 하나의 실행 통계
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskStats {
    /// 생성하거나 적재한 행 수
    pub rows: usize,
    /// 기록/다운로드/교체한 파일 또는 테이블 수
    pub artifacts: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl TaskStats {
    pub fn new(rows: usize, artifacts: usize) -> Self {
        Self {
            rows,
            artifacts,
            elapsed: Duration::ZERO,
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, task: &str) {
        tracing::info!(
            task = task,
            rows = self.rows,
            artifacts = self.artifacts,
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "작업 완료"
        );
    }
}

/// 작업 결과에서 통계를 뽑아내는 트레잇
pub trait Measured {
    fn stats(&self) -> TaskStats;
}
