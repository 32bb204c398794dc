use async_trait::async_trait;
use cart_scrape_rs::dom::{DomHeuristicExtractor, DomNode, HtmlNode};
use cart_scrape_rs::{
    CartExtractor, DedupeMode, DomError, DomHeuristicsConfig, ExtractorConfig, PagePayload,
    Strategy,
};

/// Static tree that pretends to have layout: height comes from `data-height`.
#[derive(Clone)]
struct SizedNode(HtmlNode);

#[async_trait(?Send)]
impl DomNode for SizedNode {
    async fn query_all(&self, selector: &str) -> Result<Vec<Self>, DomError> {
        Ok(self.0.query_all(selector).await?.into_iter().map(SizedNode).collect())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, DomError> {
        self.0.attribute(name).await
    }

    async fn text(&self) -> Result<String, DomError> {
        self.0.text().await
    }

    async fn bounding_box_height(&self) -> Result<Option<f64>, DomError> {
        Ok(self
            .0
            .attribute("data-height")
            .await?
            .and_then(|h| h.parse().ok()))
    }
}

/// Tree whose attribute reads and layout queries always fail.
#[derive(Clone)]
struct FlakyNode(HtmlNode);

#[async_trait(?Send)]
impl DomNode for FlakyNode {
    async fn query_all(&self, selector: &str) -> Result<Vec<Self>, DomError> {
        Ok(self.0.query_all(selector).await?.into_iter().map(FlakyNode).collect())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, DomError> {
        Err(DomError::InvalidSelector(name.to_string()))
    }

    async fn text(&self) -> Result<String, DomError> {
        self.0.text().await
    }

    async fn bounding_box_height(&self) -> Result<Option<f64>, DomError> {
        Err(DomError::InvalidSelector("bounding box".to_string()))
    }
}

fn heuristics() -> DomHeuristicExtractor {
    DomHeuristicExtractor::new(DomHeuristicsConfig::default(), "https://img.example.com").unwrap()
}

#[tokio::test]
async fn test_small_rows_are_excluded() {
    let html = r#"
    <div class="cart-item" data-height="30">
        <h3>Tiny Badge Row</h3><span class="price">R10</span>
    </div>
    <div class="cart-item" data-height="120">
        <h3>Oversized Hoodie</h3><span class="price">R320</span>
    </div>
    "#;
    let root = SizedNode(HtmlNode::parse(html));

    let items = heuristics().extract_from_dom(&root).await;

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name.as_deref(), Some("Oversized Hoodie"));
    assert_eq!(items[0].price.as_deref(), Some("R320"));
}

#[tokio::test]
async fn test_threshold_is_configurable() {
    let html = r#"
    <div class="cart-item" data-height="30"><h3>Compact Row Item</h3></div>
    "#;
    let config = DomHeuristicsConfig {
        min_element_height: 20.0,
        ..Default::default()
    };
    let extractor = DomHeuristicExtractor::new(config, "https://img.example.com").unwrap();

    let items = extractor.extract_from_dom(&SizedNode(HtmlNode::parse(html))).await;

    assert_eq!(items.len(), 1);
}

#[tokio::test]
async fn test_failed_probes_leave_fields_unset() {
    let html = r#"
    <div class="cart-item" data-goods-id="77">
        <h3>Pleated Trousers</h3>
        <span class="price">$42.00</span>
        <img src="//img.example.com/t.jpg">
    </div>
    "#;

    let items = heuristics()
        .extract_from_dom(&FlakyNode(HtmlNode::parse(html)))
        .await;

    assert_eq!(items.len(), 1);
    let item = &items[0];
    assert_eq!(item.name.as_deref(), Some("Pleated Trousers"));
    assert_eq!(item.price.as_deref(), Some("$42.00"));
    assert!(item.sku.is_none());
    assert!(item.image.is_none());
}

#[tokio::test]
async fn test_name_only_dedupe_for_dom_rows() {
    let html = r#"
    <div class="cart-item"><h3>Striped Polo Shirt</h3><span class="price">$15</span></div>
    <div class="cart-item"><h3>Striped Polo Shirt</h3><span class="price">$12</span></div>
    "#;
    let root = HtmlNode::parse(html);

    let composite = CartExtractor::new(ExtractorConfig::default()).unwrap();
    let report = composite.extract(&PagePayload::with_dom(html, root.clone())).await;
    assert_eq!(report.count, 2);

    let name_only = CartExtractor::new(ExtractorConfig {
        dedupe: DedupeMode::NameOnly,
        ..Default::default()
    })
    .unwrap();
    let report = name_only.extract(&PagePayload::with_dom(html, root)).await;
    assert_eq!(report.strategy, Some(Strategy::Dom));
    assert_eq!(report.count, 1);
    assert_eq!(report.items[0].price.as_deref(), Some("$15"));
}

#[tokio::test]
async fn test_static_dom_has_no_size_gate() {
    let html = r#"<div class="goods-item"><h2>Leather Loafers</h2></div>"#;

    let items = heuristics().extract_from_dom(&HtmlNode::parse(html)).await;

    assert_eq!(items.len(), 1);
    assert!(items[0].price.is_none());
    assert!(items[0].quantity.is_none());
}
