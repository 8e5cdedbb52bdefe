//! Standalone collector CLI.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use b3scan_collector::{run, CollectorConfig};
use b3scan_core::AppConfig;
use b3scan_data::{ScrapePipeline, SnapshotRepository};

#[derive(Parser)]
#[command(name = "b3scan-collector")]
#[command(about = "B3Scan Standalone Page Collector", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// 전체 레지스트리 1회 수집 후 저장
    Run {
        /// 특정 종목만 수집 (쉼표로 구분, 예: "PETR3,VALE3")
        #[arg(long)]
        symbols: Option<String>,
    },

    /// 데몬 모드: 주기적으로 수집 실행
    Daemon,
}

/// `--symbols` 인자 파싱. 미지정 시 설정의 레지스트리 사용.
fn resolve_symbols(arg: Option<String>, config: &AppConfig) -> Vec<String> {
    match arg {
        Some(list) => list
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        None => config.scrape.symbols.clone(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("b3scan_collector={}", cli.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("B3Scan Collector 시작");

    // 설정 로드
    let collector_config = CollectorConfig::from_env()?;
    let app_config = AppConfig::load_default()?;
    tracing::debug!(
        symbols = app_config.scrape.symbols.len(),
        concurrency = app_config.scrape.concurrency(),
        "설정 로드 완료"
    );

    // DB 연결
    let pool = sqlx::PgPool::connect(&collector_config.database_url).await?;
    tracing::info!("데이터베이스 연결 성공");

    let repository = SnapshotRepository::new(pool.clone());
    repository.ensure_schema().await?;

    let pipeline = ScrapePipeline::from_config(&app_config.scrape);

    // 명령 실행
    match cli.command {
        Commands::Run { symbols } => {
            let symbols = resolve_symbols(symbols, &app_config);
            let stats = run::run_once(&pipeline, &repository, &symbols).await?;
            stats.log_summary("종목 수집");
        }
        Commands::Daemon => {
            tracing::info!(
                "=== 데몬 모드 시작 (주기: {}분) ===",
                collector_config.daemon.interval_minutes
            );

            let symbols = app_config.scrape.symbols.clone();
            let mut interval = tokio::time::interval(collector_config.daemon.interval());
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("종료 신호 수신, 데몬 종료 중...");
                        break;
                    }
                    _ = interval.tick() => {
                        match run::run_once(&pipeline, &repository, &symbols).await {
                            Ok(stats) => {
                                stats.log_summary("종목 수집");
                            }
                            Err(e) => {
                                tracing::error!("수집 실행 실패: {}", e);
                            }
                        }

                        tracing::info!(
                            "다음 실행: {}분 후",
                            collector_config.daemon.interval_minutes
                        );
                    }
                }
            }
        }
    }

    pool.close().await;
    tracing::info!("B3Scan Collector 종료");

    Ok(())
}
