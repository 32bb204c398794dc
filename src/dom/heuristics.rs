//! Cart rows recovered from a rendered element tree.
//!
//! Container selectors are tried in order and the first one that matches
//! anything decides the row set. Each row then goes through independent field
//! probes, each with its own ordered sub-selectors. A probe that errors leaves
//! its field unset.

use super::DomNode;
use crate::canonical::normalize_image_url;
use crate::config::DomHeuristicsConfig;
use crate::error::DomError;
use crate::models::CartItem;
use log::{debug, warn};
use regex::Regex;

const SKU_TEXT_SELECTORS: &[&str] = &[r#"[class*="goods-sn"]"#, r#"[class*="sku"]"#];

const SKU_DATA_ATTRIBUTES: &[&str] = &[
    "data-sku",
    "data-sku-id",
    "data-goods-id",
    "data-goods-sn",
    "data-product-id",
    "data-id",
];

/// Product URLs like `/Floral-Dress-p-12345678.html` or `?goods_id=12345678`.
const SKU_HREF_PATTERNS: &[&str] = &[r"-p-(\d+)", r"[?&](?:goods_id|goodsId|product_id)=(\d+)"];

const NAME_SELECTORS: &[&str] = &[
    r#"[class*="goods-name"]"#,
    r#"[class*="product-name"]"#,
    r#"[class*="goods-title"]"#,
    "h2",
    "h3",
    r#"[class*="name"]"#,
    r#"[class*="title"]"#,
];

// Most specific first.
const PRICE_SELECTORS: &[&str] = &[
    r#"[class*="sale-price"]"#,
    r#"[class*="main-price"]"#,
    r#"[class*="price"]"#,
    "[data-price]",
    r#"span[class*="amount"]"#,
];

const IMAGE_ATTRIBUTES: &[&str] = &["src", "data-src", "data-original", "data-lazy-src"];

const QUANTITY_SELECTORS: &[&str] = &[
    r#"input[type="number"]"#,
    r#"[class*="quantity"] input"#,
    r#"[class*="qty"] input"#,
];

const COLOR_SELECTORS: &[&str] = &[r#"[class*="color"]"#, r#"[class*="colour"]"#];

const SIZE_SELECTORS: &[&str] = &[r#"[class*="size"]"#, r#"[class*="spec"]"#];

#[derive(Debug, Clone)]
pub struct DomHeuristicExtractor {
    config: DomHeuristicsConfig,
    image_base_origin: String,
    href_patterns: Vec<Regex>,
}

impl DomHeuristicExtractor {
    pub fn new(
        config: DomHeuristicsConfig,
        image_base_origin: impl Into<String>,
    ) -> Result<Self, regex::Error> {
        let href_patterns = SKU_HREF_PATTERNS
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            config,
            image_base_origin: image_base_origin.into(),
            href_patterns,
        })
    }

    /// Rows of the first container selector with any match. Not deduplicated.
    pub async fn extract_from_dom<D: DomNode>(&self, root: &D) -> Vec<CartItem> {
        for selector in &self.config.container_selectors {
            let elements = match root.query_all(selector).await {
                Ok(elements) => elements,
                Err(e) => {
                    warn!("Container selector {} failed: {}", selector, e);
                    continue;
                }
            };
            if elements.is_empty() {
                continue;
            }

            debug!("Found {} elements with selector: {}", elements.len(), selector);
            let mut items = Vec::new();
            for element in &elements {
                if let Some(item) = self.extract_element(element).await {
                    items.push(item);
                }
            }
            return items;
        }

        Vec::new()
    }

    async fn extract_element<D: DomNode>(&self, element: &D) -> Option<CartItem> {
        if let Some(height) = probe(element.bounding_box_height().await, "bounding box").flatten() {
            if height < self.config.min_element_height {
                debug!("Skipping element of height {}", height);
                return None;
            }
        }

        let sku = self.probe_sku(element).await;
        let min_chars = self.config.min_name_chars;
        let name = first_text(element, NAME_SELECTORS, |t| t.chars().count() >= min_chars).await?;
        let price = first_text(element, PRICE_SELECTORS, |t| self.looks_like_price(t)).await;
        let image = self.probe_image(element).await;
        let quantity = probe_quantity(element).await;
        let color = first_text(element, COLOR_SELECTORS, |_| true).await;
        let size = first_text(element, SIZE_SELECTORS, |_| true).await;

        Some(CartItem {
            name: Some(name),
            price,
            quantity,
            image,
            sku,
            color,
            size,
            attributes: None,
        })
    }

    fn looks_like_price(&self, text: &str) -> bool {
        text.chars().any(|c| self.config.currency_symbols.contains(&c))
            && text.chars().any(|c| c.is_ascii_digit())
    }

    async fn probe_sku<D: DomNode>(&self, element: &D) -> Option<String> {
        if let Some(sku) = first_text(element, SKU_TEXT_SELECTORS, |_| true).await {
            return Some(sku);
        }

        for attr in SKU_DATA_ATTRIBUTES {
            if let Some(value) = probe(element.attribute(attr).await, attr).flatten() {
                let value = value.trim();
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }

        let anchors = probe(element.query_all("a[href]").await, "a[href]")?;
        for anchor in anchors {
            let Some(href) = probe(anchor.attribute("href").await, "href").flatten() else {
                continue;
            };
            if let Some(id) = self.sku_from_href(&href) {
                return Some(id);
            }
        }

        None
    }

    fn sku_from_href(&self, href: &str) -> Option<String> {
        self.href_patterns
            .iter()
            .find_map(|re| re.captures(href))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    async fn probe_image<D: DomNode>(&self, element: &D) -> Option<String> {
        let images = probe(element.query_all("img").await, "img")?;
        for img in images {
            for attr in IMAGE_ATTRIBUTES {
                let Some(src) = probe(img.attribute(attr).await, attr).flatten() else {
                    continue;
                };
                let src = src.trim();
                if src.is_empty() || self.is_sentinel(src) {
                    continue;
                }
                if let Some(url) = normalize_image_url(src, &self.image_base_origin) {
                    return Some(url);
                }
            }
        }
        None
    }

    fn is_sentinel(&self, src: &str) -> bool {
        let lower = src.to_lowercase();
        self.config
            .image_sentinels
            .iter()
            .any(|s| lower.contains(&s.to_lowercase()))
    }
}

/// `None` when no quantity control exists; `"1"` when one exists without a
/// usable positive value.
async fn probe_quantity<D: DomNode>(element: &D) -> Option<String> {
    for selector in QUANTITY_SELECTORS {
        if let Some(input) = probe(element.query(selector).await, selector).flatten() {
            let raw = probe(input.attribute("value").await, "value").flatten();
            return Some(parse_quantity(raw.as_deref()));
        }
    }
    None
}

fn parse_quantity(raw: Option<&str>) -> String {
    match raw.map(str::trim).and_then(|v| v.parse::<u32>().ok()) {
        Some(n) if n > 0 => n.to_string(),
        _ => "1".to_string(),
    }
}

/// Whitespace-collapsed text of the first descendant, across `selectors` in
/// order, that `accept` admits.
async fn first_text<D, F>(element: &D, selectors: &[&str], accept: F) -> Option<String>
where
    D: DomNode,
    F: Fn(&str) -> bool,
{
    for selector in selectors {
        let Some(candidates) = probe(element.query_all(selector).await, selector) else {
            continue;
        };
        for candidate in candidates {
            let Some(text) = probe(candidate.text().await, selector) else {
                continue;
            };
            let text = collapse_whitespace(&text);
            if !text.is_empty() && accept(&text) {
                return Some(text);
            }
        }
    }
    None
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn probe<T>(outcome: Result<T, DomError>, what: &str) -> Option<T> {
    match outcome {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("Probe {} failed: {}", what, e);
            None
        }
    }
}
