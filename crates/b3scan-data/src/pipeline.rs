//! 수집 파이프라인 오케스트레이터.
//!
//! 종목 목록을 fetch+extract 태스크로 팬아웃하고 결과를 입력 순서대로
//! 팬인합니다. 동시에 네트워크를 사용하는 태스크 수는 세마포어로
//! 제한됩니다(기본 1). 개별 종목의 실패는 해당 스냅샷만 실패로
//! 표시하며 다른 종목의 수집에는 영향을 주지 않습니다.

use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, warn, Instrument};

use b3scan_core::{ScrapeConfig, StockSnapshot};

use crate::extract::PageExtractor;
use crate::provider::{Investidor10Fetcher, PageFetcher};

/// 수집 파이프라인.
#[derive(Clone)]
pub struct ScrapePipeline {
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<PageExtractor>,
    concurrent_limit: usize,
}

impl ScrapePipeline {
    /// fetcher/extractor를 직접 주입하여 생성.
    ///
    /// `concurrent_limit`은 최소 1로 보정됩니다.
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        extractor: PageExtractor,
        concurrent_limit: usize,
    ) -> Self {
        Self {
            fetcher,
            extractor: Arc::new(extractor),
            concurrent_limit: concurrent_limit.max(1),
        }
    }

    /// 수집 설정에서 기본 구성(investidor10 fetcher)으로 생성.
    pub fn from_config(config: &ScrapeConfig) -> Self {
        Self::new(
            Arc::new(Investidor10Fetcher::new(config)),
            PageExtractor::new(config),
            config.concurrency(),
        )
    }

    /// 동시 요청 상한.
    pub fn concurrent_limit(&self) -> usize {
        self.concurrent_limit
    }

    /// 전체 종목을 수집합니다.
    ///
    /// 입력 티커당 정확히 하나의 스냅샷을 입력과 같은 순서로 반환합니다.
    /// 완료 순서는 네트워크 지연에 따라 달라지지만 결과는 위치 기준으로
    /// 재조립됩니다. 모든 태스크가 끝나야 반환되며, 부분 결과로 조기
    /// 종료하지 않습니다.
    pub async fn run(&self, tickers: &[String]) -> Vec<StockSnapshot> {
        let semaphore = Arc::new(Semaphore::new(self.concurrent_limit));

        let handles: Vec<_> = tickers
            .iter()
            .map(|ticker| {
                let ticker = ticker.clone();
                let fetcher = Arc::clone(&self.fetcher);
                let extractor = Arc::clone(&self.extractor);
                let semaphore = Arc::clone(&semaphore);
                let span = b3scan_core::scrape_span!("collect", ticker);

                tokio::spawn(
                    async move {
                        // 허가는 네트워크 구간에만 적용. 추출은 순수 연산이므로
                        // 허가 반납 후 수행한다.
                        let permit = match semaphore.acquire_owned().await {
                            Ok(permit) => permit,
                            Err(_) => return StockSnapshot::failed(ticker),
                        };
                        let page = fetcher.fetch_page(&ticker).await;
                        drop(permit);

                        match page {
                            Ok(html) => {
                                let snapshot = extractor.extract(&ticker, &html);
                                info!(
                                    quote = ?snapshot.quote,
                                    indicators = snapshot.indicators.len(),
                                    "종목 수집 성공"
                                );
                                snapshot
                            }
                            Err(e) => {
                                warn!(error = %e, "종목 수집 실패");
                                StockSnapshot::failed(ticker)
                            }
                        }
                    }
                    .instrument(span),
                )
            })
            .collect();

        let mut snapshots = Vec::with_capacity(handles.len());
        for (handle, ticker) in handles.into_iter().zip(tickers) {
            // 태스크 패닉도 해당 종목의 실패로 격리
            let snapshot = handle
                .await
                .unwrap_or_else(|_| StockSnapshot::failed(ticker.clone()));
            snapshots.push(snapshot);
        }

        snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::FetchError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const SAMPLE_PAGE: &str = r#"
        <html><body>
        <div class="_card cotacao">
            <div class="_card-body"><div><span>R$ 10,00</span></div></div>
        </div>
        <div id="table-indicators">
            <div class="cell">
                <span class="d-flex">P/L</span>
                <div class="value"><span>5,0</span></div>
            </div>
        </div>
        </body></html>
    "#;

    /// 티커별로 지정된 응답을 돌려주는 스텁 fetcher.
    ///
    /// 동시에 진행 중인 호출 수의 최고치를 기록하여 동시성 상한
    /// 검증에 사용합니다.
    struct StubFetcher {
        /// 티커 → HTTP 상태 코드 (200이면 SAMPLE_PAGE 반환)
        statuses: HashMap<String, u16>,
        delay: Duration,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl StubFetcher {
        fn new(statuses: &[(&str, u16)], delay: Duration) -> Self {
            Self {
                statuses: statuses
                    .iter()
                    .map(|(t, s)| (t.to_string(), *s))
                    .collect(),
                delay,
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        fn all_ok(tickers: &[&str], delay: Duration) -> Self {
            let statuses: Vec<(&str, u16)> = tickers.iter().map(|t| (*t, 200)).collect();
            Self::new(&statuses, delay)
        }

        fn max_seen(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        async fn fetch_page(&self, ticker: &str) -> Result<String, FetchError> {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);

            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match self.statuses.get(ticker).copied().unwrap_or(200) {
                200 => Ok(SAMPLE_PAGE.to_string()),
                status => Err(FetchError::Status { status }),
            }
        }
    }

    fn pipeline_with(fetcher: Arc<StubFetcher>, limit: usize) -> ScrapePipeline {
        ScrapePipeline::new(
            fetcher,
            PageExtractor::new(&ScrapeConfig::default()),
            limit,
        )
    }

    fn tickers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_one_snapshot_per_ticker_in_input_order() {
        let names = ["AAA3", "BBB4", "CCC5", "DDD6", "EEE7"];
        let fetcher = Arc::new(StubFetcher::all_ok(&names, Duration::from_millis(5)));
        let pipeline = pipeline_with(fetcher, 3);

        let snapshots = pipeline.run(&tickers(&names)).await;

        assert_eq!(snapshots.len(), names.len());
        for (snapshot, name) in snapshots.iter().zip(names) {
            assert_eq!(snapshot.ticker, name);
            assert!(!snapshot.failed);
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrency_ceiling_is_respected() {
        let names = ["A1", "B2", "C3", "D4", "E5", "F6"];
        let fetcher = Arc::new(StubFetcher::all_ok(&names, Duration::from_millis(20)));
        let pipeline = pipeline_with(Arc::clone(&fetcher), 2);

        pipeline.run(&tickers(&names)).await;

        assert!(fetcher.max_seen() <= 2, "max in-flight: {}", fetcher.max_seen());
        assert!(fetcher.max_seen() >= 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_serial_limit_runs_one_at_a_time() {
        let names = ["A1", "B2", "C3", "D4"];
        let fetcher = Arc::new(StubFetcher::all_ok(&names, Duration::from_millis(10)));
        let pipeline = pipeline_with(Arc::clone(&fetcher), 1);

        pipeline.run(&tickers(&names)).await;

        assert_eq!(fetcher.max_seen(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_single_failure_is_isolated() {
        // 레지스트리 = ["AAA3", "BBB4"], N=1: AAA3는 정상, BBB4는 500
        let fetcher = Arc::new(StubFetcher::new(
            &[("AAA3", 200), ("BBB4", 500)],
            Duration::from_millis(1),
        ));
        let pipeline = pipeline_with(fetcher, 1);

        let snapshots = pipeline.run(&tickers(&["AAA3", "BBB4"])).await;

        assert_eq!(snapshots.len(), 2);

        assert_eq!(snapshots[0].ticker, "AAA3");
        assert!(!snapshots[0].failed);
        assert_eq!(snapshots[0].quote.as_deref(), Some("R$ 10,00"));
        assert_eq!(snapshots[0].indicator("P/L"), Some("5,0"));

        assert_eq!(snapshots[1].ticker, "BBB4");
        assert!(snapshots[1].failed);
        assert!(snapshots[1].quote.is_none());
        assert!(snapshots[1].logo_url.is_none());
        assert!(snapshots[1].indicators.is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_failures_do_not_shorten_output() {
        let fetcher = Arc::new(StubFetcher::new(
            &[("A1", 500), ("B2", 404), ("C3", 200)],
            Duration::from_millis(1),
        ));
        let pipeline = pipeline_with(fetcher, 4);

        let snapshots = pipeline.run(&tickers(&["A1", "B2", "C3"])).await;

        assert_eq!(snapshots.len(), 3);
        assert!(snapshots[0].failed);
        assert!(snapshots[1].failed);
        assert!(!snapshots[2].failed);
    }

    #[tokio::test]
    async fn test_empty_registry_yields_empty_run() {
        let fetcher = Arc::new(StubFetcher::all_ok(&[], Duration::ZERO));
        let pipeline = pipeline_with(fetcher, 1);

        let snapshots = pipeline.run(&[]).await;

        assert!(snapshots.is_empty());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]

            /// 임의의 입력 목록에 대해 출력 길이와 순서가 보존된다.
            #[test]
            fn prop_output_matches_input_positionally(
                names in proptest::collection::vec("[A-Z]{4}[0-9]{1,2}", 0..12),
                limit in 1usize..5,
            ) {
                let rt = tokio::runtime::Builder::new_multi_thread()
                    .enable_all()
                    .build()
                    .unwrap();

                let snapshots = rt.block_on(async {
                    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
                    let fetcher = Arc::new(StubFetcher::all_ok(&refs, Duration::ZERO));
                    pipeline_with(fetcher, limit).run(&names).await
                });

                prop_assert_eq!(snapshots.len(), names.len());
                for (snapshot, name) in snapshots.iter().zip(&names) {
                    prop_assert_eq!(&snapshot.ticker, name);
                }
            }
        }
    }
}
