use super::DomNode;
use crate::error::DomError;
use async_trait::async_trait;
use chromiumoxide::element::Element;
use chromiumoxide::Page;

/// An element of a live Chromium page. Every call is a CDP round-trip.
#[derive(Debug)]
pub struct ChromiumNode(Element);

impl ChromiumNode {
    /// The page's document element.
    pub async fn root(page: &Page) -> Result<Self, DomError> {
        Ok(Self(page.find_element("html").await?))
    }
}

impl From<Element> for ChromiumNode {
    fn from(element: Element) -> Self {
        Self(element)
    }
}

#[async_trait(?Send)]
impl DomNode for ChromiumNode {
    async fn query_all(&self, selector: &str) -> Result<Vec<Self>, DomError> {
        let elements = self.0.find_elements(selector).await?;
        Ok(elements.into_iter().map(Self).collect())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, DomError> {
        Ok(self.0.attribute(name).await?)
    }

    async fn text(&self) -> Result<String, DomError> {
        Ok(self.0.inner_text().await?.unwrap_or_default())
    }

    async fn bounding_box_height(&self) -> Result<Option<f64>, DomError> {
        let bbox = self.0.bounding_box().await?;
        Ok(Some(bbox.height))
    }
}
