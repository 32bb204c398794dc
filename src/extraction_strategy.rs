//! Ordered fallback over the extraction strategies.
//!
//! 1. JSON `<script>` payloads of a known content type
//! 2. global state: live objects captured by the browser, then pattern matches
//!    over the raw text
//! 3. DOM heuristics, when a DOM is available
//!
//! The first strategy with a non-empty deduplicated result wins and later
//! strategies never run.

use crate::canonical::Canonicalizer;
use crate::config::ExtractorConfig;
use crate::dedupe::dedupe;
use crate::dom::{DomHeuristicExtractor, DomNode};
use crate::embedded::{script_json_payloads, PatternMatcher};
use crate::error::ExtractError;
use crate::json_walker::ItemListWalker;
use crate::models::{CartItem, ExtractionReport, PagePayload, Strategy};
use log::{debug, info, warn};
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct CartExtractor {
    config: ExtractorConfig,
    patterns: PatternMatcher,
    walker: ItemListWalker,
    canonicalizer: Canonicalizer,
    dom: DomHeuristicExtractor,
}

impl CartExtractor {
    pub fn new(config: ExtractorConfig) -> Result<Self, regex::Error> {
        let patterns = PatternMatcher::new(&config.global_markers)?;
        let walker = ItemListWalker::new(config.container_keys.clone(), config.max_depth);
        let canonicalizer = Canonicalizer::new(config.image_base_origin.clone());
        let dom = DomHeuristicExtractor::new(config.dom.clone(), config.image_base_origin.clone())?;

        Ok(Self {
            config,
            patterns,
            walker,
            canonicalizer,
            dom,
        })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Runs every strategy in order and always returns a structured report.
    pub async fn extract<D: DomNode>(&self, payload: &PagePayload<D>) -> ExtractionReport {
        match self.try_extract(payload).await {
            Ok(Some((strategy, items))) => {
                info!("Extracted {} item(s) via {:?}", items.len(), strategy);
                ExtractionReport::found(strategy, items)
            }
            Ok(None) => {
                info!("No cart items found");
                ExtractionReport::empty(
                    "No items found: the cart may be empty, expired, or the page layout unrecognized",
                )
            }
            Err(e) => {
                warn!("Extraction failed: {}", e);
                ExtractionReport::failed(e.to_string())
            }
        }
    }

    /// `Ok(None)` when every strategy ran and found nothing.
    pub async fn try_extract<D: DomNode>(
        &self,
        payload: &PagePayload<D>,
    ) -> Result<Option<(Strategy, Vec<CartItem>)>, ExtractError> {
        let items = self.from_script_json(&payload.html);
        if !items.is_empty() {
            return Ok(Some((Strategy::ScriptJson, items)));
        }

        let items = self.from_global_state(&payload.globals, &payload.html);
        if !items.is_empty() {
            return Ok(Some((Strategy::GlobalState, items)));
        }

        let Some(dom) = payload.dom.as_ref() else {
            return Err(ExtractError::CapabilityUnavailable(
                "no JSON strategy matched and no rendered DOM was supplied".to_string(),
            ));
        };

        let items = dedupe(self.dom.extract_from_dom(dom).await, self.config.dedupe);
        if !items.is_empty() {
            return Ok(Some((Strategy::Dom, items)));
        }

        Ok(None)
    }

    fn from_script_json(&self, html: &str) -> Vec<CartItem> {
        for payload in script_json_payloads(html, &self.config.script_content_types) {
            let items = self.items_from_value(&payload);
            if !items.is_empty() {
                debug!("Script JSON payload yielded {} item(s)", items.len());
                return items;
            }
        }
        Vec::new()
    }

    fn from_global_state(&self, globals: &[(String, Value)], html: &str) -> Vec<CartItem> {
        for (label, value) in globals {
            let items = self.items_from_value(value);
            if !items.is_empty() {
                debug!("Live global {} yielded {} item(s)", label, items.len());
                return items;
            }
        }

        for candidate in self.patterns.find_embedded_json(html) {
            let items = self.items_from_value(&candidate.value);
            if !items.is_empty() {
                debug!("Pattern {} yielded {} item(s)", candidate.label, items.len());
                return items;
            }
        }

        Vec::new()
    }

    /// Walk, canonicalize and dedupe one JSON document. A list counts as the
    /// cart only if at least one of its elements canonicalizes.
    pub fn items_from_value(&self, value: &Value) -> Vec<CartItem> {
        let items = self
            .walker
            .find_items(value, |raw| self.canonicalizer.canonicalize(raw));
        dedupe(items, self.config.dedupe)
    }
}
