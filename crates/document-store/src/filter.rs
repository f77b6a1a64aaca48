use serde_json::{Map, Value};

/// Order in which matching documents are returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Insertion order (oldest first).
    #[default]
    OldestFirst,
    /// Reverse insertion order (newest first).
    NewestFirst,
}

/// Builder for constructing document filters.
///
/// A filter is a JSON containment pattern: a document matches when every
/// field in the pattern is present in the document with a containing value.
/// Arrays match when each pattern element is contained by some element of
/// the document's array. This mirrors PostgreSQL's `jsonb @>` operator.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    /// Containment pattern that documents must satisfy.
    pub pattern: Map<String, Value>,

    /// Result ordering.
    pub order: SortOrder,

    /// Maximum number of documents to return.
    pub limit: Option<usize>,
}

impl Filter {
    /// Creates a filter matching every document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires `field` to equal `value`.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.pattern.insert(field.into(), value.into());
        self
    }

    /// Requires the array in `field` to hold an element containing `element`.
    pub fn has_element(mut self, field: impl Into<String>, element: impl Into<Value>) -> Self {
        let entry = self
            .pattern
            .entry(field.into())
            .or_insert_with(|| Value::Array(Vec::new()));
        match entry {
            Value::Array(elements) => elements.push(element.into()),
            other => *other = Value::Array(vec![element.into()]),
        }
        self
    }

    /// Returns newest documents first.
    ///
    /// "Newest" is insertion order, not any timestamp in the body; callers
    /// sorting by `created_at` rely on it being set at insert.
    pub fn newest_first(mut self) -> Self {
        self.order = SortOrder::NewestFirst;
        self
    }

    /// Limits the number of results.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns the pattern as a JSON object value.
    pub fn pattern_value(&self) -> Value {
        Value::Object(self.pattern.clone())
    }

    /// Checks whether a document body matches this filter.
    pub fn matches(&self, body: &Value) -> bool {
        self.pattern
            .iter()
            .all(|(field, expected)| body.get(field).is_some_and(|v| contains(v, expected)))
    }
}

/// Checks whether `value` contains `pattern` using `jsonb @>` semantics.
pub fn contains(value: &Value, pattern: &Value) -> bool {
    match (value, pattern) {
        (Value::Object(value), Value::Object(pattern)) => pattern
            .iter()
            .all(|(k, p)| value.get(k).is_some_and(|v| contains(v, p))),
        (Value::Array(values), Value::Array(patterns)) => patterns
            .iter()
            .all(|p| values.iter().any(|v| contains(v, p))),
        _ => value == pattern,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_filter_matches_everything() {
        assert!(Filter::new().matches(&json!({"a": 1})));
    }

    #[test]
    fn eq_matches_scalar_fields() {
        let filter = Filter::new().eq("user_id", "abc").eq("status", "active");
        assert!(filter.matches(&json!({"user_id": "abc", "status": "active", "x": 1})));
        assert!(!filter.matches(&json!({"user_id": "abc", "status": "ordered"})));
        assert!(!filter.matches(&json!({"status": "active"})));
    }

    #[test]
    fn has_element_matches_nested_arrays() {
        let filter = Filter::new().has_element("items", json!({"product_id": "p1"}));
        assert!(filter.matches(&json!({
            "items": [{"product_id": "p0", "quantity": 1}, {"product_id": "p1", "quantity": 2}]
        })));
        assert!(!filter.matches(&json!({"items": [{"product_id": "p0"}]})));
        assert!(!filter.matches(&json!({"items": []})));
    }

    #[test]
    fn has_element_accumulates() {
        let filter = Filter::new()
            .has_element("tags", "a")
            .has_element("tags", "b");
        assert_eq!(filter.pattern_value(), json!({"tags": ["a", "b"]}));
        assert!(filter.matches(&json!({"tags": ["b", "c", "a"]})));
        assert!(!filter.matches(&json!({"tags": ["a"]})));
    }

    #[test]
    fn builder_sets_order_and_limit() {
        let filter = Filter::new().newest_first().limit(3);
        assert_eq!(filter.order, SortOrder::NewestFirst);
        assert_eq!(filter.limit, Some(3));
    }
}
