use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MOBILE_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 16_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.0 Mobile/15E148 Safari/604.1";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum WaitStrategy {
    Fixed(u64), // Milliseconds
    Selector { selector: String, timeout_ms: u64 },
}

impl Default for WaitStrategy {
    fn default() -> Self {
        WaitStrategy::Fixed(5000)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerRunConfig {
    pub headless: bool,
    pub user_agent: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub wait_for: WaitStrategy,
    /// `window` properties captured from the live page, highest priority first.
    pub global_names: Vec<String>,
}

impl Default for CrawlerRunConfig {
    fn default() -> Self {
        Self {
            headless: true,
            user_agent: MOBILE_USER_AGENT.to_string(),
            viewport_width: 375,
            viewport_height: 812,
            wait_for: WaitStrategy::default(),
            global_names: crate::config::DEFAULT_GLOBAL_MARKERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// One cart line in the unified schema every strategy converges to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CartItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Currency-tagged price text as displayed, never parsed into a number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    /// Absolute, scheme-qualified image URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Vendor variant metadata passed through untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Value>,
}

impl CartItem {
    /// Items with neither a name nor a price are layout artifacts.
    pub fn has_signal(&self) -> bool {
        self.name.is_some() || self.price.is_some()
    }
}

/// Which extraction technique produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    ScriptJson,
    GlobalState,
    Dom,
}

/// Everything the core gets to look at for one page.
///
/// `globals` holds page-level state objects already evaluated by a live-page
/// collaborator, labelled and in priority order. `dom` is present only when a
/// rendered (or statically parsed) element tree is available.
#[derive(Debug, Clone)]
pub struct PagePayload<D = crate::dom::HtmlNode> {
    pub html: String,
    pub globals: Vec<(String, Value)>,
    pub dom: Option<D>,
}

impl PagePayload<crate::dom::HtmlNode> {
    /// Raw text only, no DOM capability.
    pub fn from_html(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            globals: Vec::new(),
            dom: None,
        }
    }
}

impl<D> PagePayload<D> {
    pub fn with_dom(html: impl Into<String>, dom: D) -> Self {
        Self {
            html: html.into(),
            globals: Vec::new(),
            dom: Some(dom),
        }
    }

    pub fn globals(mut self, globals: Vec<(String, Value)>) -> Self {
        self.globals = globals;
        self
    }
}

/// Structured result handed back to callers. Never an error.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExtractionReport {
    pub success: bool,
    pub items: Vec<CartItem>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ExtractionReport {
    pub fn found(strategy: Strategy, items: Vec<CartItem>) -> Self {
        Self {
            success: true,
            count: items.len(),
            items,
            strategy: Some(strategy),
            message: None,
        }
    }

    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Default::default()
        }
    }
}
