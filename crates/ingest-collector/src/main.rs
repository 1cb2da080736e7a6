//! Impact ingest collector CLI.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use ingest_collector::context::PipelineContext;
use ingest_collector::stats::Measured;
use ingest_collector::{config, modules, pipeline, schedule};
use ingest_core::{init_logging, LogConfig, DEFAULT_CONFIG_PATH};
use ingest_data::{http::build_client, YahooMarketSource};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "impact-collector")]
#[command(about = "Impact Ingest Collector", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// 설정 파일 경로 (없으면 기본값 + 환경 변수만 사용)
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// 전체 그래프 한 번 실행 (추출 4종 → 문서 적재 → 관계형 적재)
    Run,

    /// 데몬 모드: cron 스케줄마다 전체 그래프 실행
    Daemon,

    /// 추출 작업 하나만 실행하고 스냅샷만 기록 (저장소 적재 없음)
    Extract {
        #[arg(value_enum)]
        task: ExtractTask,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExtractTask {
    Market,
    Health,
    Macro,
    Epidemic,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 로깅 초기화
    let level = &cli.log_level;
    init_logging(LogConfig::from_env_with_level(format!(
        "ingest_collector={level},ingest_data={level},ingest_core={level}"
    )))
    .map_err(|e| anyhow::anyhow!(e))
    .context("로깅 초기화 실패")?;

    tracing::info!("Impact Ingest Collector 시작");

    let config = config::load(&cli.config)?;

    match cli.command {
        Commands::Run => {
            let ctx = PipelineContext::connect(config).await?;
            let report = pipeline::run_pipeline(&ctx).await;
            report.log_summary();
            ctx.close().await;

            if !report.is_success() {
                anyhow::bail!(
                    "실행 {} 실패: {:?}",
                    report.run_id,
                    report
                        .failed()
                        .iter()
                        .map(|t| t.name())
                        .collect::<Vec<_>>()
                );
            }
        }
        Commands::Daemon => {
            let ctx = PipelineContext::connect(config).await?;
            let result = schedule::run_daemon(ctx.clone()).await;
            ctx.close().await;
            result?;
        }
        Commands::Extract { task } => {
            let http = build_client(&config.http)?;
            let start = Instant::now();

            let (name, mut stats) = match task {
                ExtractTask::Market => {
                    let source = YahooMarketSource::new()?;
                    let table = modules::extract_market(&config, &source).await?;
                    ("market_extract", table.stats())
                }
                ExtractTask::Health => {
                    let datasets = modules::extract_health(&config, &http).await?;
                    ("health_extract", datasets.stats())
                }
                ExtractTask::Macro => {
                    let series = modules::extract_macro(&config, &http).await?;
                    ("macro_extract", series.stats())
                }
                ExtractTask::Epidemic => {
                    let records = modules::extract_epidemic(&config, &http).await?;
                    ("epidemic_extract", records.stats())
                }
            };
            stats.elapsed = start.elapsed();
            stats.log_summary(name);
        }
    }

    tracing::info!("Impact Ingest Collector 종료");
    Ok(())
}
