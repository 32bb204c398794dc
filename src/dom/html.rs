//! Static element tree over parsed HTML, for pages fetched without a browser.

use super::DomNode;
use crate::error::DomError;
use async_trait::async_trait;
use kuchiki::traits::*;
use kuchiki::NodeRef;

/// A node of a `kuchiki` document. There is no layout, so it never reports a
/// bounding box.
#[derive(Debug, Clone)]
pub struct HtmlNode(NodeRef);

impl HtmlNode {
    pub fn parse(html: &str) -> Self {
        Self(kuchiki::parse_html().one(html))
    }

    pub fn node(&self) -> &NodeRef {
        &self.0
    }
}

impl From<NodeRef> for HtmlNode {
    fn from(node: NodeRef) -> Self {
        Self(node)
    }
}

#[async_trait(?Send)]
impl DomNode for HtmlNode {
    async fn query_all(&self, selector: &str) -> Result<Vec<Self>, DomError> {
        let selection = self
            .0
            .descendants()
            .select(selector)
            .map_err(|_| DomError::InvalidSelector(selector.to_string()))?;
        Ok(selection.map(|el| Self(el.as_node().clone())).collect())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, DomError> {
        Ok(self
            .0
            .as_element()
            .and_then(|el| el.attributes.borrow().get(name).map(String::from)))
    }

    async fn text(&self) -> Result<String, DomError> {
        Ok(self.0.text_contents())
    }

    async fn bounding_box_height(&self) -> Result<Option<f64>, DomError> {
        Ok(None)
    }
}
