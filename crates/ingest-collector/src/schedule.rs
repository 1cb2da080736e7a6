//! cron 스케줄 트리거.

use crate::context::PipelineContext;
use crate::error::CollectorError;
use crate::pipeline::{run_pipeline, RunReport};
use crate::Result;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};

/// cron 표현식을 스케줄러가 받는 초 단위 6필드 형식으로 맞춥니다.
///
/// 5필드(분 시 일 월 요일)는 앞에 `0`초를 붙이고, 6/7필드는 그대로 둡니다.
pub fn normalize_cron(expr: &str) -> Result<String> {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    match fields.len() {
        5 => Ok(format!("0 {}", fields.join(" "))),
        6 | 7 => Ok(fields.join(" ")),
        n => Err(CollectorError::Config(format!(
            "cron 표현식 필드 수가 잘못되었습니다 ({}개): {:?}",
            n, expr
        ))),
    }
}

/// 실행 중복 방지 가드. 한 프로세스 안에서 두 실행이 겹치지 않도록 합니다.
#[derive(Clone, Default)]
pub struct RunGuard {
    lock: Arc<Mutex<()>>,
}

impl RunGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// 진행 중인 실행이 없으면 파이프라인을 실행하고, 있으면 건너뛰고 `None`을 반환합니다.
    pub async fn run(&self, ctx: &PipelineContext) -> Option<RunReport> {
        let Ok(_held) = self.lock.try_lock() else {
            tracing::warn!("이전 실행이 진행 중이므로 이번 트리거를 건너뜁니다");
            return None;
        };
        let report = run_pipeline(ctx).await;
        report.log_summary();
        Some(report)
    }
}

/// 설정된 스케줄로 전체 그래프를 반복 실행합니다. Ctrl-C를 받으면 종료합니다.
pub async fn run_daemon(ctx: PipelineContext) -> Result<()> {
    let schedule = &ctx.config.schedule;
    let cron = normalize_cron(&schedule.cron)?;
    let name = schedule.name.clone();

    let mut scheduler = JobScheduler::new().await?;
    let guard = RunGuard::new();

    let job_ctx = ctx.clone();
    let job_name = name.clone();
    let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
        let ctx = job_ctx.clone();
        let guard = guard.clone();
        let name = job_name.clone();

        Box::pin(async move {
            tracing::info!(schedule = %name, "스케줄 트리거 실행");
            if let Some(report) = guard.run(&ctx).await {
                if !report.is_success() {
                    tracing::error!(
                        schedule = %name,
                        run_id = %report.run_id,
                        failed = ?report.failed(),
                        "스케줄 실행 실패"
                    );
                }
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;
    tracing::info!(schedule = %name, cron = %cron, "=== 데몬 모드 시작 ===");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| CollectorError::Scheduler(format!("종료 신호 대기 실패: {}", e)))?;
    tracing::info!("종료 신호 수신, 데몬 종료 중...");

    scheduler.shutdown().await?;
    Ok(())
}
