//! 수집 워크플로우 실행.

use std::time::Instant;
use tracing::info;

use b3scan_data::{ScrapePipeline, SnapshotRepository};

use crate::stats::ScrapeRunStats;
use crate::Result;

/// 전체 레지스트리를 1회 수집하고 결과를 저장합니다.
///
/// 개별 종목의 실패는 실패 스냅샷으로 기록될 뿐 전체 실행을
/// 중단시키지 않습니다. 저장 실패만 오류로 전파됩니다.
pub async fn run_once(
    pipeline: &ScrapePipeline,
    repository: &SnapshotRepository,
    symbols: &[String],
) -> Result<ScrapeRunStats> {
    info!(
        symbols = symbols.len(),
        concurrency = pipeline.concurrent_limit(),
        "수집 실행 시작"
    );

    let started = Instant::now();
    let snapshots = pipeline.run(symbols).await;
    let stats = ScrapeRunStats::from_snapshots(&snapshots, started.elapsed());

    let run_id = repository.save_run(&snapshots).await?;
    info!(run_id = %run_id, "수집 결과 저장 완료");

    Ok(stats)
}
