//! 종목 페이지 스냅샷 레코드.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 한 종목 페이지에서 추출한 스냅샷.
///
/// 파이프라인 실행마다 입력 티커당 정확히 하나씩 생성됩니다.
/// 수집에 실패한 티커도 레코드 자체는 유지되며, `failed` 플래그와
/// 비어 있는 필드로 구분됩니다. 슬롯이 누락되는 경우는 없습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSnapshot {
    /// 종목 코드 (예: "PETR3")
    pub ticker: String,
    /// 시세 텍스트 (예: "R$ 28,50")
    pub quote: Option<String>,
    /// 시세 텍스트에서 파싱한 가격
    pub price: Option<Decimal>,
    /// 종목 로고 절대 URL
    pub logo_url: Option<String>,
    /// 지표 이름 → 값 매핑 (이름의 공백은 `_`로 정규화됨)
    #[serde(default)]
    pub indicators: HashMap<String, String>,
    /// 수집 실패 여부
    #[serde(default)]
    pub failed: bool,
}

impl StockSnapshot {
    /// 수집 실패 스냅샷 생성.
    ///
    /// 모든 데이터 필드는 비어 있습니다.
    pub fn failed(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            quote: None,
            price: None,
            logo_url: None,
            indicators: HashMap::new(),
            failed: true,
        }
    }

    /// 지표 값 조회.
    pub fn indicator(&self, name: &str) -> Option<&str> {
        self.indicators.get(name).map(String::as_str)
    }

    /// 추출된 데이터가 하나라도 있는지 여부.
    pub fn has_data(&self) -> bool {
        self.quote.is_some() || self.logo_url.is_some() || !self.indicators.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_snapshot_has_empty_fields() {
        let snapshot = StockSnapshot::failed("PETR3");

        assert_eq!(snapshot.ticker, "PETR3");
        assert!(snapshot.failed);
        assert!(snapshot.quote.is_none());
        assert!(snapshot.price.is_none());
        assert!(snapshot.logo_url.is_none());
        assert!(snapshot.indicators.is_empty());
        assert!(!snapshot.has_data());
    }

    #[test]
    fn test_indicator_lookup() {
        let mut snapshot = StockSnapshot::failed("VALE3");
        snapshot.failed = false;
        snapshot
            .indicators
            .insert("P/L".to_string(), "5,32".to_string());

        assert_eq!(snapshot.indicator("P/L"), Some("5,32"));
        assert_eq!(snapshot.indicator("P/VP"), None);
        assert!(snapshot.has_data());
    }

    #[test]
    fn test_failed_flag_defaults_on_deserialize() {
        // 이전 버전 레코드에는 indicators/failed가 없을 수 있음
        let json = r#"{"ticker":"WEGE3","quote":null,"price":null,"logo_url":null}"#;
        let snapshot: StockSnapshot = serde_json::from_str(json).unwrap();

        assert!(!snapshot.failed);
        assert!(snapshot.indicators.is_empty());
    }
}
