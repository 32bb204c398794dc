use serde::{Deserialize, Serialize};

pub const DEFAULT_IMAGE_ORIGIN: &str = "https://img.shein.com";

/// Global-state assignments looked for in page text, highest priority first.
pub const DEFAULT_GLOBAL_MARKERS: &[&str] = &[
    "__NUXT__",
    "__INITIAL_STATE__",
    "gbRawData",
    "cartData",
    "shareInfo",
];

/// Keys whose array value is likely to hold cart lines, highest priority first.
pub const DEFAULT_CONTAINER_KEYS: &[&str] = &[
    "cart",
    "cartItems",
    "items",
    "products",
    "goods",
    "cartGoods",
    "productList",
    "goodsList",
    "cartInfo",
];

pub const DEFAULT_CONTAINER_SELECTORS: &[&str] = &[
    r#"[class*="cart-item"]"#,
    r#"[class*="goods-item"]"#,
    r#"[class*="product-item"]"#,
    r#"[class*="CartItem"]"#,
    ".cart-goods-item",
    "[data-goods-id]",
    "div[data-product]",
];

/// How the composite (sku-less) dedupe key is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DedupeMode {
    /// name + price + image, lower-cased.
    #[default]
    Composite,
    /// name only, lower-cased.
    NameOnly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub script_content_types: Vec<String>,
    pub global_markers: Vec<String>,
    pub container_keys: Vec<String>,
    pub max_depth: usize,
    pub image_base_origin: String,
    pub dedupe: DedupeMode,
    pub dom: DomHeuristicsConfig,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            script_content_types: vec!["application/json".to_string()],
            global_markers: to_strings(DEFAULT_GLOBAL_MARKERS),
            container_keys: to_strings(DEFAULT_CONTAINER_KEYS),
            max_depth: 32,
            image_base_origin: DEFAULT_IMAGE_ORIGIN.to_string(),
            dedupe: DedupeMode::default(),
            dom: DomHeuristicsConfig::default(),
        }
    }
}

impl ExtractorConfig {
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DomHeuristicsConfig {
    pub container_selectors: Vec<String>,
    /// Rows shorter than this (in CSS pixels) are nested or decorative.
    pub min_element_height: f64,
    pub min_name_chars: usize,
    pub currency_symbols: Vec<char>,
    pub image_sentinels: Vec<String>,
}

impl Default for DomHeuristicsConfig {
    fn default() -> Self {
        Self {
            container_selectors: to_strings(DEFAULT_CONTAINER_SELECTORS),
            min_element_height: 50.0,
            min_name_chars: 4,
            currency_symbols: vec!['R', '$', '€', '£', '¥'],
            image_sentinels: vec!["placeholder".to_string(), "loading".to_string()],
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
