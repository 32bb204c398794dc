//! Share links point at an app-jump page that embeds a `shareInfo` object.
//! The cart itself lives on a landing page built from that object.

use crate::canonical::{is_truthy, value_to_text};
use crate::error::ShareLinkError;
use log::{debug, info};
use regex::Regex;
use serde_json::Value;
use url::Url;

pub const LANDING_ORIGIN: &str = "https://m.shein.com";

pub fn is_share_link(url: &str) -> bool {
    url.contains("api-shein.shein.com") || url.contains("sharejump")
}

/// Landing URL for a parsed `shareInfo` object.
pub fn landing_url_from_share_info(info: &Value) -> Result<String, ShareLinkError> {
    let share_id = ["shareId", "id"]
        .iter()
        .filter_map(|key| info.get(*key))
        .find(|v| is_truthy(v))
        .map(value_to_text)
        .ok_or(ShareLinkError::MissingShareId)?;
    let country = info
        .get("localcountry")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let cart_share = info
        .get("cart_share")
        .filter(|v| is_truthy(v))
        .map(value_to_text)
        .unwrap_or_else(|| "1".to_string());

    let base = if country.is_empty() {
        format!("{}/cart/share/landing", LANDING_ORIGIN)
    } else {
        format!("{}/{}/cart/share/landing", LANDING_ORIGIN, country.to_lowercase())
    };

    let url = Url::parse_with_params(
        &base,
        &[
            ("group_id", share_id.as_str()),
            ("local_country", country),
            ("url_from", ""),
            ("cart_share", cart_share.as_str()),
        ],
    )?;
    Ok(url.to_string())
}

#[derive(Debug, Clone)]
pub struct ShareLinkResolver {
    client: reqwest::Client,
    share_info: Regex,
}

impl ShareLinkResolver {
    pub fn new(client: reqwest::Client) -> Result<Self, regex::Error> {
        Ok(Self {
            client,
            share_info: Regex::new(r"var\s+shareInfo\s*=\s*(\{[^;]+\});")?,
        })
    }

    /// Returns `url` unchanged unless it is a share link.
    pub async fn resolve(&self, url: &str) -> Result<String, ShareLinkError> {
        if !is_share_link(url) {
            return Ok(url.to_string());
        }

        info!("Share URL detected, resolving cart landing URL");
        let html = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let info = self.share_info_from_html(&html)?;
        let landing = landing_url_from_share_info(&info)?;
        debug!("Cart landing URL: {}", landing);
        Ok(landing)
    }

    pub fn share_info_from_html(&self, html: &str) -> Result<Value, ShareLinkError> {
        let raw = self
            .share_info
            .captures(html)
            .and_then(|caps| caps.get(1))
            .ok_or(ShareLinkError::MissingShareInfo)?;
        Ok(serde_json::from_str(raw.as_str())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_landing_url_with_country() {
        let url = landing_url_from_share_info(&json!({
            "shareId": "abc",
            "localcountry": "ZA",
            "cart_share": 1
        }))
        .unwrap();
        assert_eq!(
            url,
            "https://m.shein.com/za/cart/share/landing?group_id=abc&local_country=ZA&url_from=&cart_share=1"
        );
    }

    #[test]
    fn test_landing_url_without_country_uses_id() {
        let url = landing_url_from_share_info(&json!({"id": 42})).unwrap();
        assert!(url.starts_with("https://m.shein.com/cart/share/landing?group_id=42"));
    }

    #[test]
    fn test_missing_share_id() {
        assert!(matches!(
            landing_url_from_share_info(&json!({"localcountry": "ZA"})),
            Err(ShareLinkError::MissingShareId)
        ));
    }

    #[test]
    fn test_share_link_detection() {
        assert!(is_share_link(
            "https://api-shein.shein.com/h5/sharejump/appjump?link=lbCieue0XMV_b"
        ));
        assert!(!is_share_link("https://m.shein.com/za/cart"));
    }
}
