//! Queryable element trees.
//!
//! The extraction core only ever talks to a page through [`DomNode`]. Every
//! access may suspend (a CDP round-trip for a live browser page), but callers
//! await them one at a time.

use crate::error::DomError;
use async_trait::async_trait;

pub mod chromium;
pub mod heuristics;
pub mod html;

pub use chromium::ChromiumNode;
pub use heuristics::DomHeuristicExtractor;
pub use html::HtmlNode;

#[async_trait(?Send)]
pub trait DomNode: Sized {
    /// Descendants matching `selector`, in document order.
    async fn query_all(&self, selector: &str) -> Result<Vec<Self>, DomError>;

    /// First descendant matching `selector`.
    async fn query(&self, selector: &str) -> Result<Option<Self>, DomError> {
        Ok(self.query_all(selector).await?.into_iter().next())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, DomError>;

    /// Rendered text of the element and its descendants.
    async fn text(&self) -> Result<String, DomError>;

    /// Rendered height in CSS pixels, `None` when layout is unknown.
    async fn bounding_box_height(&self) -> Result<Option<f64>, DomError>;
}
