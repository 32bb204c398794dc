use crate::config::DedupeMode;
use crate::models::CartItem;
use std::collections::HashSet;

/// Drops repeated detections, keeping the first occurrence.
///
/// Items with a non-empty sku are keyed on it; all others on a composite key
/// chosen by `mode`. The two key spaces never collide with each other.
pub fn dedupe(items: Vec<CartItem>, mode: DedupeMode) -> Vec<CartItem> {
    let mut seen_skus: HashSet<String> = HashSet::new();
    let mut seen_composite: HashSet<String> = HashSet::new();

    items
        .into_iter()
        .filter(|item| match item.sku.as_deref().filter(|s| !s.is_empty()) {
            Some(sku) => seen_skus.insert(sku.to_string()),
            None => seen_composite.insert(composite_key(item, mode)),
        })
        .collect()
}

fn composite_key(item: &CartItem, mode: DedupeMode) -> String {
    let name = item.name.as_deref().unwrap_or_default();
    match mode {
        DedupeMode::Composite => format!(
            "{}{}{}",
            name,
            item.price.as_deref().unwrap_or_default(),
            item.image.as_deref().unwrap_or_default()
        )
        .to_lowercase(),
        DedupeMode::NameOnly => name.to_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, price: &str, sku: Option<&str>) -> CartItem {
        CartItem {
            name: Some(name.to_string()),
            price: Some(price.to_string()),
            sku: sku.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_same_sku_collapses_first_wins() {
        let items = vec![
            item("Shoe", "R100", Some("55")),
            item("Shoe (duplicate render)", "R100", Some("55")),
        ];
        let out = dedupe(items, DedupeMode::Composite);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name.as_deref(), Some("Shoe"));
    }

    #[test]
    fn test_unique_sku_kept_despite_composite_collision() {
        let items = vec![
            item("Shoe", "R100", Some("1")),
            item("Shoe", "R100", Some("2")),
            item("Shoe", "R100", None),
        ];
        assert_eq!(dedupe(items, DedupeMode::Composite).len(), 3);
    }

    #[test]
    fn test_composite_key_is_case_insensitive() {
        let items = vec![item("Red Top", "$5", None), item("RED TOP", "$5", None)];
        assert_eq!(dedupe(items, DedupeMode::Composite).len(), 1);
    }

    #[test]
    fn test_name_only_ignores_price() {
        let items = vec![item("Red Top", "$5", None), item("red top", "$7", None)];
        assert_eq!(dedupe(items.clone(), DedupeMode::NameOnly).len(), 1);
        assert_eq!(dedupe(items, DedupeMode::Composite).len(), 2);
    }

    #[test]
    fn test_empty_sku_uses_composite() {
        let items = vec![item("A", "$1", Some("")), item("a", "$1", None)];
        assert_eq!(dedupe(items, DedupeMode::Composite).len(), 1);
    }

    #[test]
    fn test_idempotent() {
        let items = vec![
            item("A", "$1", Some("9")),
            item("B", "$2", None),
            item("A", "$1", Some("9")),
            item("b", "$2", None),
        ];
        let once = dedupe(items, DedupeMode::Composite);
        let twice = dedupe(once.clone(), DedupeMode::Composite);
        assert_eq!(once, twice);
        assert_eq!(once.len(), 2);
    }
}
