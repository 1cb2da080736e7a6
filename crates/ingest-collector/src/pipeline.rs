//! 작업 의존 그래프와 한 번의 실행.
//!
//! ```text
//! market_extract ──────────────┐
//! health_extract ──────────────┤
//! macro_extract ───────────────┼──▶ relational_load
//! epidemic_extract ─▶ document_load ─┘
//! ```
//!
//! 네 개의 추출 작업은 동시에 실행되고, 적재 작업은 그 뒤에 순서대로 실행됩니다.
//! 상위 작업이 실패한 작업은 실행하지 않고 실패한 상위 작업을 명시해 건너뜀으로 기록합니다.

use crate::context::PipelineContext;
use crate::modules::{
    extract_epidemic, extract_health, extract_macro, extract_market, load_documents,
    load_relational, RelationalInputs,
};
use crate::stats::{Measured, TaskStats};
use crate::Result;
use chrono::{DateTime, Utc};
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::Instrument;
use uuid::Uuid;

/// 파이프라인 작업.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskId {
    MarketExtract,
    HealthExtract,
    MacroExtract,
    EpidemicExtract,
    DocumentLoad,
    RelationalLoad,
}

impl TaskId {
    /// 실행 순서대로 나열한 전체 작업.
    pub const ALL: [TaskId; 6] = [
        TaskId::MarketExtract,
        TaskId::HealthExtract,
        TaskId::MacroExtract,
        TaskId::EpidemicExtract,
        TaskId::DocumentLoad,
        TaskId::RelationalLoad,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TaskId::MarketExtract => "market_extract",
            TaskId::HealthExtract => "health_extract",
            TaskId::MacroExtract => "macro_extract",
            TaskId::EpidemicExtract => "epidemic_extract",
            TaskId::DocumentLoad => "document_load",
            TaskId::RelationalLoad => "relational_load",
        }
    }

    /// 직접 의존하는 상위 작업.
    pub fn upstream(&self) -> &'static [TaskId] {
        match self {
            TaskId::MarketExtract
            | TaskId::HealthExtract
            | TaskId::MacroExtract
            | TaskId::EpidemicExtract => &[],
            TaskId::DocumentLoad => &[TaskId::EpidemicExtract],
            TaskId::RelationalLoad => &[
                TaskId::MarketExtract,
                TaskId::HealthExtract,
                TaskId::MacroExtract,
                TaskId::DocumentLoad,
            ],
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 작업 결과 상태.
#[derive(Debug, Clone)]
pub enum TaskStatus {
    Succeeded(TaskStats),
    Failed(String),
    /// 상위 작업 실패로 실행하지 않음. 원인이 된 실패 작업을 담습니다.
    Skipped { failed_upstream: Vec<TaskId> },
}

impl TaskStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskStatus::Succeeded(_))
    }
}

/// 작업 하나의 실행 결과.
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    pub task: TaskId,
    pub status: TaskStatus,
}

/// 한 번의 실행 보고서.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub outcomes: Vec<TaskOutcome>,
    pub elapsed: Duration,
}

impl RunReport {
    /// 모든 작업이 성공했는지 확인.
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.status.is_success())
    }

    pub fn outcome(&self, task: TaskId) -> Option<&TaskStatus> {
        self.outcomes
            .iter()
            .find(|o| o.task == task)
            .map(|o| &o.status)
    }

    /// 실패한 작업 목록.
    pub fn failed(&self) -> Vec<TaskId> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, TaskStatus::Failed(_)))
            .map(|o| o.task)
            .collect()
    }

    /// 작업별 결과 요약 로그 출력
    pub fn log_summary(&self) {
        for outcome in &self.outcomes {
            match &outcome.status {
                TaskStatus::Succeeded(stats) => stats.log_summary(outcome.task.name()),
                TaskStatus::Failed(error) => {
                    tracing::error!(task = %outcome.task, error = %error, "작업 실패");
                }
                TaskStatus::Skipped { failed_upstream } => {
                    let upstream: Vec<&str> = failed_upstream.iter().map(TaskId::name).collect();
                    tracing::warn!(
                        task = %outcome.task,
                        failed_upstream = %upstream.join(","),
                        "상위 작업 실패로 건너뜀"
                    );
                }
            }
        }

        tracing::info!(
            run_id = %self.run_id,
            success = self.is_success(),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "=== 실행 완료 ==="
        );
    }
}

/// 실행 중 쌓이는 결과 기록.
#[derive(Default)]
struct Outcomes(Vec<TaskOutcome>);

impl Outcomes {
    fn record(&mut self, outcome: TaskOutcome) {
        self.0.push(outcome);
    }

    /// `task`의 상위 작업 중 성공하지 못한 것을 따라가 원인이 된 실패 작업을 모읍니다.
    fn failed_upstream(&self, task: TaskId) -> Vec<TaskId> {
        let mut failed = Vec::new();
        for up in task.upstream() {
            let Some(outcome) = self.0.iter().find(|o| o.task == *up) else {
                continue;
            };
            match &outcome.status {
                TaskStatus::Succeeded(_) => {}
                TaskStatus::Failed(_) => failed.push(*up),
                TaskStatus::Skipped { failed_upstream } => failed.extend(failed_upstream),
            }
        }
        failed.dedup();
        failed
    }

    fn skip(&mut self, task: TaskId) {
        let failed_upstream = self.failed_upstream(task);
        tracing::warn!(
            task = %task,
            failed_upstream = ?failed_upstream,
            "상위 작업 실패로 건너뜀"
        );
        self.record(TaskOutcome {
            task,
            status: TaskStatus::Skipped { failed_upstream },
        });
    }
}

/// 작업 하나를 span 안에서 실행하고 결과와 출력을 돌려줍니다.
async fn run_task<T, F>(task: TaskId, run_id: Uuid, fut: F) -> (TaskOutcome, Option<T>)
where
    T: Measured,
    F: Future<Output = Result<T>>,
{
    let span = ingest_core::task_span!(task, run_id);
    async move {
        tracing::info!("작업 시작");
        let start = Instant::now();

        match fut.await {
            Ok(output) => {
                let mut stats = output.stats();
                stats.elapsed = start.elapsed();
                tracing::info!(
                    rows = stats.rows,
                    elapsed = format!("{:.1}s", stats.elapsed.as_secs_f64()),
                    "작업 성공"
                );
                (
                    TaskOutcome {
                        task,
                        status: TaskStatus::Succeeded(stats),
                    },
                    Some(output),
                )
            }
            Err(e) => {
                tracing::error!(error = %e, "작업 실패");
                (
                    TaskOutcome {
                        task,
                        status: TaskStatus::Failed(e.to_string()),
                    },
                    None,
                )
            }
        }
    }
    .instrument(span)
    .await
}

/// 전체 그래프를 한 번 실행합니다.
///
/// 개별 작업의 실패는 보고서에 기록되며 이 함수 자체는 실패하지 않습니다.
pub async fn run_pipeline(ctx: &PipelineContext) -> RunReport {
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    let start = Instant::now();
    let config = ctx.config.as_ref();

    tracing::info!(run_id = %run_id, "=== 실행 시작 ===");

    let (market, health, macro_series, epidemic) = tokio::join!(
        run_task(
            TaskId::MarketExtract,
            run_id,
            extract_market(config, ctx.market_source.as_ref())
        ),
        run_task(TaskId::HealthExtract, run_id, extract_health(config, &ctx.http)),
        run_task(TaskId::MacroExtract, run_id, extract_macro(config, &ctx.http)),
        run_task(
            TaskId::EpidemicExtract,
            run_id,
            extract_epidemic(config, &ctx.http)
        ),
    );

    let mut outcomes = Outcomes::default();
    let (outcome, market) = market;
    outcomes.record(outcome);
    let (outcome, health) = health;
    outcomes.record(outcome);
    let (outcome, macro_series) = macro_series;
    outcomes.record(outcome);
    let (outcome, epidemic) = epidemic;
    outcomes.record(outcome);

    let receipt = match epidemic {
        Some(records) => {
            let (outcome, receipt) = run_task(
                TaskId::DocumentLoad,
                run_id,
                load_documents(ctx.document_store.as_ref(), &records),
            )
            .await;
            outcomes.record(outcome);
            receipt
        }
        None => {
            outcomes.skip(TaskId::DocumentLoad);
            None
        }
    };

    match (market, health, macro_series, receipt) {
        (Some(market), Some(health), Some(macro_series), Some(receipt)) => {
            let inputs = RelationalInputs {
                market: &market,
                health: &health,
                macro_series: &macro_series,
            };
            let (outcome, _) = run_task(
                TaskId::RelationalLoad,
                run_id,
                load_relational(
                    config,
                    ctx.relational_store.as_ref(),
                    ctx.document_store.as_ref(),
                    inputs,
                    &receipt,
                ),
            )
            .await;
            outcomes.record(outcome);
        }
        _ => outcomes.skip(TaskId::RelationalLoad),
    }

    RunReport {
        run_id,
        started_at,
        outcomes: outcomes.0,
        elapsed: start.elapsed(),
    }
}
