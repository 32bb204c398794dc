use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use anyhow::{Result, anyhow};
use log::{debug, info, warn};
use serde_json::{Map, Value};
use crate::dom::ChromiumNode;
use crate::extraction_strategy::CartExtractor;
use crate::models::{CrawlerRunConfig, ExtractionReport, PagePayload, WaitStrategy};
use std::env;
use std::path::Path;
use std::future::Future;
use std::time::{Duration, Instant};

/// Collects page-level state objects by name. Values that cannot be
/// serialized (functions, cycles) are left out.
const GLOBALS_SCRIPT: &str = r#"(names) => {
    const out = {};
    for (const name of names) {
        try {
            if (window[name]) out[name] = JSON.parse(JSON.stringify(window[name]));
        } catch (e) {}
    }
    return out;
}"#;

#[derive(Default)]
pub struct CartCrawler {
    browser: Option<Browser>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl CartCrawler {
    pub fn new() -> Self {
        Self {
            browser: None,
            handle: None,
        }
    }

    pub async fn start(&mut self, config: &CrawlerRunConfig) -> Result<()> {
        if self.browser.is_some() {
            return Ok(());
        }

        let mut builder = BrowserConfig::builder();

        // Allow overriding via environment variable
        if let Ok(path) = env::var("CHROME_EXECUTABLE") {
            builder = builder.chrome_executable(Path::new(&path));
        }
        if !config.headless {
            builder = builder.with_head();
        }

        let browser_config = builder
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg(format!("--user-agent={}", config.user_agent))
            .window_size(config.viewport_width, config.viewport_height)
            .build()
            .map_err(|e| anyhow!(e))?;

        let (browser, mut handler) = Browser::launch(browser_config).await?;

        let handle = tokio::task::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        self.browser = Some(browser);
        self.handle = Some(handle);

        Ok(())
    }

    /// Renders `url` and runs the extractor against the live page.
    pub async fn arun(
        &mut self,
        url: &str,
        config: &CrawlerRunConfig,
        extractor: &CartExtractor,
    ) -> Result<ExtractionReport> {
        self.start(config).await?;

        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| anyhow!("browser not started"))?;

        info!("Loading page: {}", url);
        let page = browser.new_page(url).await?;
        let closer = page.clone();

        close_after(
            async {
                page.wait_for_navigation().await?;
                self.settle(&page, &config.wait_for).await;
                self.extract_from_page(&page, config, extractor).await
            },
            async move { closer.close().await.map_err(anyhow::Error::from) },
        )
        .await
    }

    async fn extract_from_page(
        &self,
        page: &Page,
        config: &CrawlerRunConfig,
        extractor: &CartExtractor,
    ) -> Result<ExtractionReport> {
        let html = page.content().await?;
        let globals = self.capture_globals(page, &config.global_names).await;
        let root = ChromiumNode::root(page).await?;

        let payload = PagePayload::with_dom(html, root).globals(globals);
        Ok(extractor.extract(&payload).await)
    }

    async fn settle(&self, page: &Page, wait_for: &WaitStrategy) {
        match wait_for {
            WaitStrategy::Fixed(ms) => {
                debug!("Waiting {}ms for cart data to load", ms);
                tokio::time::sleep(Duration::from_millis(*ms)).await;
            }
            WaitStrategy::Selector { selector, timeout_ms } => {
                let start = Instant::now();
                let timeout = Duration::from_millis(*timeout_ms);
                let mut delay = Duration::from_millis(50);

                while start.elapsed() < timeout {
                    if page.find_element(selector.as_str()).await.is_ok() {
                        return;
                    }
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(Duration::from_millis(500));
                }
                warn!("Timeout waiting for selector {}, proceeding anyway", selector);
            }
        }
    }

    /// Live global-state objects, in the order of `names`.
    async fn capture_globals(&self, page: &Page, names: &[String]) -> Vec<(String, Value)> {
        let names_json = match serde_json::to_string(names) {
            Ok(json) => json,
            Err(_) => return Vec::new(),
        };
        let expression = format!("({})({})", GLOBALS_SCRIPT, names_json);

        let found: Map<String, Value> = match page.evaluate(expression).await {
            Ok(result) => match result.into_value() {
                Ok(map) => map,
                Err(e) => {
                    debug!("Global state not serializable: {}", e);
                    return Vec::new();
                }
            },
            Err(e) => {
                debug!("Global state evaluation failed: {}", e);
                return Vec::new();
            }
        };

        names
            .iter()
            .filter_map(|name| found.get(name).map(|v| (name.clone(), v.clone())))
            .collect()
    }
}

/// Awaits `work`, then `close` whatever `work` returned. A failed close is
/// logged and does not replace the work's outcome.
async fn close_after<T, W, C>(work: W, close: C) -> Result<T>
where
    W: Future<Output = Result<T>>,
    C: Future<Output = Result<()>>,
{
    let outcome = work.await;
    if let Err(e) = close.await {
        warn!("Failed to close page: {}", e);
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test]
    async fn test_page_closed_when_navigation_fails() {
        let closed = Cell::new(false);

        let result: Result<()> = close_after(
            async { Err(anyhow!("navigation failed")) },
            async {
                closed.set(true);
                Ok(())
            },
        )
        .await;

        assert!(result.is_err());
        assert!(closed.get());
    }

    #[tokio::test]
    async fn test_close_failure_keeps_report() {
        let result = close_after(async { Ok(7) }, async { Err(anyhow!("target gone")) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
