//! 종목 페이지 HTML extractor.
//!
//! 이미 조회된 문서에서 시세 텍스트, 로고 URL, 지표 매핑을
//! 추출합니다. 추출은 실패하지 않습니다 — 기대하는 anchor가 문서에
//! 없으면 해당 필드만 비운 채 넘어갑니다. 부분적/깨진 문서도 필드
//! 단위로 점진적으로 처리됩니다.
//!
//! ## 문서 구조 (investidor10 종목 페이지)
//! - 지표: `#table-indicators .cell` 안의 `span.d-flex`(이름) /
//!   `div.value span`(값)
//! - 시세: `._card.cotacao` → `._card-body` → 첫 div → `span`
//! - 로고: `.page-subheader .logo img`의 `src` 속성

use reqwest::Url;
use rust_decimal::Decimal;
use scraper::{Html, Selector};
use std::collections::HashMap;

use b3scan_core::{ScrapeConfig, StockSnapshot};

/// 종목 페이지 extractor.
///
/// 로고 `src`를 절대 URL로 변환하기 위해 사이트 기준 URL을 보관합니다.
pub struct PageExtractor {
    base: Option<Url>,
}

impl PageExtractor {
    /// 수집 설정으로 생성.
    ///
    /// base_url이 URL로 파싱되지 않으면 로고 해석만 비활성화됩니다.
    pub fn new(config: &ScrapeConfig) -> Self {
        Self {
            base: Url::parse(&config.base_url).ok(),
        }
    }

    /// 문서에서 스냅샷 데이터 필드를 추출합니다.
    pub fn extract(&self, ticker: &str, html: &str) -> StockSnapshot {
        let document = Html::parse_document(html);

        let quote = extract_quote(&document);
        let price = quote.as_deref().and_then(parse_brl_price);

        StockSnapshot {
            ticker: ticker.to_string(),
            price,
            quote,
            logo_url: self.extract_logo(&document),
            indicators: extract_indicators(&document),
            failed: false,
        }
    }

    /// 로고 이미지 URL 추출 (절대 URL로 해석).
    fn extract_logo(&self, document: &Html) -> Option<String> {
        let selector = Selector::parse(".page-subheader .logo img").ok()?;
        let img = document.select(&selector).next()?;
        let src = img.value().attr("src")?;

        let base = self.base.as_ref()?;
        base.join(src).ok().map(|url| url.to_string())
    }
}

/// 지표 테이블 추출.
///
/// 이름/값 모두 trim 후 비어 있지 않은 쌍만 저장합니다. 이름 내부의
/// 연속 공백은 `_` 하나로 정규화되며, 정규화 후 같은 이름이 다시
/// 나오면 나중 값이 이전 값을 덮어씁니다.
fn extract_indicators(document: &Html) -> HashMap<String, String> {
    let mut indicators = HashMap::new();

    let cell_selector = match Selector::parse("#table-indicators .cell") {
        Ok(s) => s,
        Err(_) => return indicators,
    };
    let label_selector = match Selector::parse("span.d-flex") {
        Ok(s) => s,
        Err(_) => return indicators,
    };
    let value_selector = match Selector::parse("div.value span") {
        Ok(s) => s,
        Err(_) => return indicators,
    };

    for cell in document.select(&cell_selector) {
        let label = cell
            .select(&label_selector)
            .next()
            .map(|el| el.text().collect::<String>())
            .unwrap_or_default();
        let value = cell
            .select(&value_selector)
            .next()
            .map(|el| el.text().collect::<String>())
            .unwrap_or_default();

        let label = label.trim();
        let value = value.trim();

        if label.is_empty() || value.is_empty() {
            continue;
        }

        indicators.insert(normalize_label(label), value.to_string());
    }

    indicators
}

/// 시세 텍스트 추출.
///
/// 경로의 어느 단계든 없으면 None을 반환할 뿐 오류가 아닙니다.
fn extract_quote(document: &Html) -> Option<String> {
    let body_selector = Selector::parse("._card.cotacao ._card-body").ok()?;
    let div_selector = Selector::parse("div").ok()?;
    let span_selector = Selector::parse("span").ok()?;

    let body = document.select(&body_selector).next()?;
    let first_div = body.select(&div_selector).next()?;
    let span = first_div.select(&span_selector).next()?;

    let text = span.text().collect::<String>();
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// 지표 이름 정규화: 연속 공백을 `_` 하나로 치환.
fn normalize_label(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join("_")
}

/// 브라질 표기 가격 파싱.
///
/// "R$ 28,50" -> 28.50
/// "R$ 1.234,56" -> 1234.56
fn parse_brl_price(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.' || *c == '-')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    // 천 단위 '.' 제거, 소수점 ','를 '.'로 변환
    let normalized = cleaned.replace('.', "").replace(',', ".");
    normalized.parse().ok()
}
