//! Vendor field names to the canonical item schema.

use crate::models::CartItem;
use serde_json::{Map, Value};
use url::Url;

pub const NAME_ALIASES: &[&str] = &[
    "name",
    "title",
    "productName",
    "goodsName",
    "goods_name",
    "goods_title",
    "productRelationID",
];

pub const PRICE_ALIASES: &[&str] = &[
    "price",
    "salePrice",
    "retailPrice",
    "amount",
    "unit_price",
    "goods_price",
    "unitPrice",
];

// No `amount` here: vendor items use it for the line price.
pub const QUANTITY_ALIASES: &[&str] = &["quantity", "qty", "num", "goods_num"];

pub const IMAGE_ALIASES: &[&str] = &[
    "image",
    "img",
    "thumbnail",
    "pic",
    "goodsImg",
    "goods_img",
    "goods_image",
    "goodsThumb",
];

pub const SKU_ALIASES: &[&str] = &[
    "sku",
    "id",
    "productId",
    "goodsId",
    "goods_id",
    "goods_sn",
    "productRelationID",
];

pub const COLOR_ALIASES: &[&str] = &["color", "colour"];

pub const SIZE_ALIASES: &[&str] = &["size", "sizeName"];

pub const ATTRIBUTE_ALIASES: &[&str] = &["attr", "attributes", "sku_info", "skuInfo", "attrInfo"];

/// First alias present in `map` with a truthy value.
pub fn first_present<'a>(map: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|key| map.get(*key))
        .find(|value| is_truthy(value))
}

/// `null`, `false`, zero, and empty strings or containers carry no value.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Text form of a JSON value: strings verbatim, everything else as compact JSON.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Makes an image URL absolute. Protocol-relative URLs get `https:`, paths
/// are resolved against `base_origin`. `None` when no valid URL results.
pub fn normalize_image_url(url: &str, base_origin: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    if Url::parse(url).is_ok() {
        return Some(url.to_string());
    }

    let resolved = if url.starts_with("//") {
        Url::parse(&format!("https:{}", url))
    } else {
        Url::parse(base_origin).and_then(|base| base.join(url))
    };
    resolved.ok().map(String::from)
}

#[derive(Debug, Clone)]
pub struct Canonicalizer {
    image_base_origin: String,
}

impl Canonicalizer {
    pub fn new(image_base_origin: impl Into<String>) -> Self {
        Self {
            image_base_origin: image_base_origin.into(),
        }
    }

    /// Returns `None` for raw items with neither a name nor a price.
    pub fn canonicalize(&self, raw: &Map<String, Value>) -> Option<CartItem> {
        let text = |aliases: &[&str]| first_present(raw, aliases).map(value_to_text);

        let item = CartItem {
            name: text(NAME_ALIASES),
            price: text(PRICE_ALIASES),
            quantity: text(QUANTITY_ALIASES),
            image: text(IMAGE_ALIASES)
                .and_then(|img| normalize_image_url(&img, &self.image_base_origin)),
            sku: text(SKU_ALIASES),
            color: text(COLOR_ALIASES),
            size: text(SIZE_ALIASES),
            attributes: ATTRIBUTE_ALIASES
                .iter()
                .filter_map(|key| raw.get(*key))
                .find(|v| (v.is_object() || v.is_array()) && is_truthy(v))
                .cloned(),
        };

        item.has_signal().then_some(item)
    }
}
