//! Schema-free search for lists of product-shaped objects.

use serde_json::{Map, Value};

/// A JSON object found in an item list, before field-name normalization.
pub type RawItem<'a> = &'a Map<String, Value>;

/// Finds the first list of objects reachable through a container-key alias
/// or, failing that, through depth-first recursion.
#[derive(Debug, Clone)]
pub struct ItemListWalker {
    container_keys: Vec<String>,
    max_depth: usize,
}

impl ItemListWalker {
    pub fn new(container_keys: Vec<String>, max_depth: usize) -> Self {
        Self {
            container_keys,
            max_depth,
        }
    }

    /// Every object element of the first list found, unfiltered.
    pub fn find_item_lists<'a>(&self, value: &'a Value) -> Vec<RawItem<'a>> {
        self.find_items(value, Some)
    }

    /// Elements of the first list for which `accept` returns a value.
    ///
    /// A list whose elements are all rejected does not count as found, so
    /// the search moves on to the next alias or branch.
    pub fn find_items<'a, T, F>(&self, value: &'a Value, accept: F) -> Vec<T>
    where
        F: Fn(RawItem<'a>) -> Option<T>,
    {
        self.walk(value, 0, &accept)
    }

    fn walk<'a, T, F>(&self, value: &'a Value, depth: usize, accept: &F) -> Vec<T>
    where
        F: Fn(RawItem<'a>) -> Option<T>,
    {
        if depth > self.max_depth {
            return Vec::new();
        }

        match value {
            Value::Array(arr) => accepted(arr, accept),
            Value::Object(obj) => {
                // First alias with content wins, aliases are never merged.
                for key in &self.container_keys {
                    if let Some(Value::Array(arr)) = obj.get(key) {
                        let items = accepted(arr, accept);
                        if !items.is_empty() {
                            return items;
                        }
                    }
                }

                for nested in obj.values() {
                    if matches!(nested, Value::Object(_) | Value::Array(_)) {
                        let items = self.walk(nested, depth + 1, accept);
                        if !items.is_empty() {
                            return items;
                        }
                    }
                }

                Vec::new()
            }
            _ => Vec::new(),
        }
    }
}

fn accepted<'a, T, F>(arr: &'a [Value], accept: &F) -> Vec<T>
where
    F: Fn(RawItem<'a>) -> Option<T>,
{
    arr.iter()
        .filter_map(Value::as_object)
        .filter_map(|raw| accept(raw))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_CONTAINER_KEYS;
    use serde_json::json;

    fn walker() -> ItemListWalker {
        ItemListWalker::new(
            DEFAULT_CONTAINER_KEYS.iter().map(|s| s.to_string()).collect(),
            32,
        )
    }

    #[test]
    fn test_alias_at_root() {
        let data = json!({"cartItems": [{"goods_name": "A"}, 3, {"goods_name": "B"}]});
        let items = walker().find_item_lists(&data);
        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["goods_name"], "B");
    }

    #[test]
    fn test_first_alias_wins_without_merge() {
        let data = json!({
            "items": [{"name": "from items"}],
            "cart": [{"name": "from cart"}]
        });
        let items = walker().find_item_lists(&data);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["name"], "from cart");
    }

    #[test]
    fn test_alias_without_objects_is_skipped() {
        let data = json!({"cart": [1, 2], "goods": [{"name": "G"}]});
        let items = walker().find_item_lists(&data);
        assert_eq!(items[0]["name"], "G");
    }

    fn named(raw: RawItem<'_>) -> Option<RawItem<'_>> {
        raw.contains_key("name").then_some(raw)
    }

    #[test]
    fn test_recursion_stops_at_first_success() {
        let data = json!({
            "meta": {"banners": [{"img": "hero.jpg"}]},
            "state": {"checkout": {"goodsList": [{"name": "first"}]}},
            "other": {"items": [{"name": "second"}]}
        });
        let items = walker().find_items(&data, named);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["name"], "first");
    }

    #[test]
    fn test_rejected_branch_does_not_end_search() {
        let data = json!({
            "data": [{"seo": "x"}],
            "state": {"cart": {"goodsList": [{"name": "Floral Dress"}]}}
        });

        let unfiltered = walker().find_item_lists(&data);
        assert_eq!(unfiltered[0]["seo"], "x");

        let items = walker().find_items(&data, named);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["name"], "Floral Dress");
    }

    #[test]
    fn test_rejected_alias_falls_through_to_next_alias() {
        let data = json!({
            "cart": [{"cart_id": "c1"}],
            "goods": [{"name": "Wool Coat"}]
        });
        let items = walker().find_items(&data, named);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["name"], "Wool Coat");
    }

    #[test]
    fn test_accept_filters_within_a_list() {
        let data = json!({"items": [{"name": "kept"}, {"id": 1}, {"name": "also kept"}]});
        assert_eq!(walker().find_items(&data, named).len(), 2);
    }

    #[test]
    fn test_top_level_array() {
        let data = json!([{"name": "x"}, "noise", {"name": "y"}]);
        assert_eq!(walker().find_item_lists(&data).len(), 2);
    }

    #[test]
    fn test_scalars_and_empty_containers() {
        assert!(walker().find_item_lists(&json!("text")).is_empty());
        assert!(walker().find_item_lists(&json!({})).is_empty());
        assert!(walker().find_item_lists(&json!([])).is_empty());
        assert!(walker().find_item_lists(&json!({"cart": []})).is_empty());
    }

    #[test]
    fn test_depth_bound() {
        let data = json!({"a": {"b": {"c": {"items": [{"name": "deep"}]}}}});
        let shallow = ItemListWalker::new(vec!["items".to_string()], 2);
        assert!(shallow.find_item_lists(&data).is_empty());
        let deep = ItemListWalker::new(vec!["items".to_string()], 3);
        assert_eq!(deep.find_item_lists(&data).len(), 1);
    }
}
