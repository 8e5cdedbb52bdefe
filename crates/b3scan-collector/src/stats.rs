//! 수집 통계 구조체.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use b3scan_core::StockSnapshot;

/// 수집 실행 통계.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrapeRunStats {
    /// 전체 종목 수
    pub total: usize,
    /// 성공 횟수
    pub success: usize,
    /// 실패 횟수
    pub failed: usize,
    /// 성공했지만 추출된 데이터가 없는 종목 수
    pub empty: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl ScrapeRunStats {
    /// 스냅샷 목록에서 통계 집계.
    pub fn from_snapshots(snapshots: &[StockSnapshot], elapsed: Duration) -> Self {
        let failed = snapshots.iter().filter(|s| s.failed).count();
        let empty = snapshots
            .iter()
            .filter(|s| !s.failed && !s.has_data())
            .count();

        Self {
            total: snapshots.len(),
            success: snapshots.len() - failed,
            failed,
            empty,
            elapsed,
        }
    }

    /// 성공률 계산 (%).
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.success as f64 / self.total as f64) * 100.0
        }
    }

    /// 통계 요약 로그 출력.
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            total = self.total,
            success = self.success,
            failed = self.failed,
            empty = self.empty,
            success_rate = format!("{:.1}%", self.success_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "수집 완료"
        );
    }
}
