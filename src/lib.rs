//! Best-effort shopping-cart extraction from adversarial web pages.
//!
//! Cart lines are looked for in JSON `<script>` payloads, in global-state
//! assignments, and finally in the rendered DOM. Vendor field names are mapped
//! onto [`models::CartItem`] and repeated detections are collapsed.

pub mod canonical;
pub mod config;
pub mod crawler;
pub mod dedupe;
pub mod dom;
pub mod embedded;
pub mod error;
pub mod extraction_strategy;
pub mod json_walker;
pub mod models;
pub mod share;

pub use config::{DedupeMode, DomHeuristicsConfig, ExtractorConfig};
pub use error::{DomError, ExtractError, ShareLinkError};
pub use extraction_strategy::CartExtractor;
pub use models::{CartItem, ExtractionReport, PagePayload, Strategy};
