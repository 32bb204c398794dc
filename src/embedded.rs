//! Locating JSON inside raw page text.
//!
//! Two sources are covered:
//! - `<script>` tags whose `type` is a JSON content type, parsed directly
//! - global-state assignments (`window.__NUXT__ = {...};`, `var cartData = [...];`)
//!   found by pattern matching over the raw text
//!
//! Assignment captures are bounded by a non-greedy match up to the first `}`
//! (or `]`) that is followed by optional whitespace and a `;`. Braces are not
//! balanced. A string value containing `};` truncates the capture, and an
//! assignment not terminated by `;` runs on into later script text. Both cases
//! fail to parse and the candidate is skipped.

use kuchiki::traits::*;
use log::debug;
use regex::Regex;
use serde_json::Value;

/// A parseable JSON candidate found in page text.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedJson {
    /// Marker and capture mode, e.g. `__NUXT__:object`.
    pub label: String,
    pub raw: String,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptureMode {
    Object,
    Array,
}

impl CaptureMode {
    fn as_str(&self) -> &'static str {
        match self {
            CaptureMode::Object => "object",
            CaptureMode::Array => "array",
        }
    }

    fn literal(&self) -> &'static str {
        match self {
            CaptureMode::Object => r"\{.*?\}",
            CaptureMode::Array => r"\[.*?\]",
        }
    }
}

#[derive(Debug, Clone)]
struct MarkerPattern {
    marker: String,
    mode: CaptureMode,
    regex: Regex,
}

/// Ordered set of global-state patterns. Each marker gets an object-literal
/// pattern followed by an array-literal pattern.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    patterns: Vec<MarkerPattern>,
}

impl PatternMatcher {
    pub fn new<S: AsRef<str>>(markers: &[S]) -> Result<Self, regex::Error> {
        let mut patterns = Vec::with_capacity(markers.len() * 2);
        for marker in markers {
            let marker = marker.as_ref();
            for mode in [CaptureMode::Object, CaptureMode::Array] {
                let source = format!(
                    r"(?s)(?:\bwindow\.)?\b{}\s*=\s*({})\s*;",
                    regex::escape(marker),
                    mode.literal()
                );
                patterns.push(MarkerPattern {
                    marker: marker.to_string(),
                    mode,
                    regex: Regex::new(&source)?,
                });
            }
        }
        Ok(Self { patterns })
    }

    /// All parseable candidates, in pattern priority order. Only the first
    /// match of each pattern is considered.
    pub fn find_embedded_json(&self, text: &str) -> Vec<EmbeddedJson> {
        self.patterns
            .iter()
            .filter_map(|pattern| self.try_pattern(pattern, text))
            .collect()
    }

    /// The first candidate that parses as JSON.
    pub fn first_embedded_json(&self, text: &str) -> Option<EmbeddedJson> {
        self.patterns
            .iter()
            .find_map(|pattern| self.try_pattern(pattern, text))
    }

    fn try_pattern(&self, pattern: &MarkerPattern, text: &str) -> Option<EmbeddedJson> {
        let raw = pattern.regex.captures(text)?.get(1)?.as_str();
        let label = format!("{}:{}", pattern.marker, pattern.mode.as_str());
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Some(EmbeddedJson {
                label,
                raw: raw.to_string(),
                value,
            }),
            Err(e) => {
                debug!("Skipping malformed candidate {}: {}", label, e);
                None
            }
        }
    }
}

/// JSON bodies of `<script>` tags with one of the given content types, in
/// document order. Bodies that do not parse are skipped.
pub fn script_json_payloads<S: AsRef<str>>(html: &str, content_types: &[S]) -> Vec<Value> {
    let document = kuchiki::parse_html().one(html);
    let mut payloads = Vec::new();

    let scripts = match document.select("script[type]") {
        Ok(s) => s,
        Err(_) => return payloads,
    };

    for script in scripts {
        let script_type = {
            let attrs = script.attributes.borrow();
            attrs.get("type").map(|t| t.trim().to_ascii_lowercase())
        };
        let Some(script_type) = script_type else {
            continue;
        };
        if !content_types
            .iter()
            .any(|ct| ct.as_ref().eq_ignore_ascii_case(&script_type))
        {
            continue;
        }

        let body = script.as_node().text_contents();
        let trimmed = body.trim();
        if trimmed.is_empty() {
            continue;
        }

        match serde_json::from_str::<Value>(trimmed) {
            Ok(value) => payloads.push(value),
            Err(e) => debug!("Skipping malformed {} script: {}", script_type, e),
        }
    }

    payloads
}
