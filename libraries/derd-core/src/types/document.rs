/// Document model shared by every document store implementation
use crate::types::DocumentId;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Render a timestamp the way stores persist server timestamps.
///
/// Fixed-width UTC with microseconds, so lexical order equals time order.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a persisted timestamp field
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// A stored document: its ID plus a flat JSON field map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Store-assigned identifier
    pub id: DocumentId,

    /// Field values as written (sentinels already resolved)
    pub fields: Map<String, Value>,
}

impl Document {
    /// Create a document from its parts
    pub fn new(id: DocumentId, fields: Map<String, Value>) -> Self {
        Self { id, fields }
    }

    /// Raw field value
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// String field value
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    /// Integer field value
    pub fn get_i64(&self, field: &str) -> Option<i64> {
        self.fields.get(field).and_then(Value::as_i64)
    }

    /// Timestamp field value; `None` while the server has not assigned it
    pub fn get_timestamp(&self, field: &str) -> Option<DateTime<Utc>> {
        self.get_str(field).and_then(parse_timestamp)
    }
}

/// Value written to a document field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Literal JSON value
    Value(Value),

    /// Replaced by the store's clock at commit time
    ServerTimestamp,

    /// Added to the current numeric value (missing counts as zero)
    Increment(i64),
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Value(Value::String(value.to_string()))
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Value(Value::String(value))
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Value(Value::Bool(value))
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Value(Value::from(value))
    }
}

/// Ordered set of field writes for a create or update call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields(BTreeMap<String, FieldValue>);

impl Fields {
    /// Empty field set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a literal value
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Set a field to the server's commit time
    #[must_use]
    pub fn server_timestamp(mut self, field: impl Into<String>) -> Self {
        self.0.insert(field.into(), FieldValue::ServerTimestamp);
        self
    }

    /// Increment a numeric field by `by` (negative to decrement)
    #[must_use]
    pub fn increment(mut self, field: impl Into<String>, by: i64) -> Self {
        self.0.insert(field.into(), FieldValue::Increment(by));
        self
    }

    /// Look up a pending write
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0.get(field)
    }

    /// Iterate over pending writes in field-name order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolve sentinels against `target` using `now` as the server clock
    pub fn apply_to(&self, target: &mut Map<String, Value>, now: DateTime<Utc>) {
        for (field, value) in &self.0 {
            let resolved = match value {
                FieldValue::Value(v) => v.clone(),
                FieldValue::ServerTimestamp => Value::String(format_timestamp(now)),
                FieldValue::Increment(by) => {
                    let current = target.get(field).and_then(Value::as_i64).unwrap_or(0);
                    Value::from(current + by)
                }
            };
            target.insert(field.clone(), resolved);
        }
    }
}

/// Sort direction for a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Live query over one collection: an optional equality filter and ordering
///
/// Documents lacking the ordering field are left out of the result, so an
/// entry whose server timestamp is still pending never shows up half-formed.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Collection name
    pub collection: String,

    /// `field == value` filter
    pub filter: Option<(String, Value)>,

    /// Ordering field and direction
    pub order_by: Option<(String, Direction)>,
}

impl Query {
    /// All documents of a collection
    pub fn collection(name: impl Into<String>) -> Self {
        Self {
            collection: name.into(),
            filter: None,
            order_by: None,
        }
    }

    /// Keep documents whose `field` equals `value`
    #[must_use]
    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter = Some((field.into(), value.into()));
        self
    }

    /// Order results by `field`
    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    /// Whether a document belongs in the result set
    pub fn matches(&self, doc: &Document) -> bool {
        if let Some((field, expected)) = &self.filter {
            if doc.get(field) != Some(expected) {
                return false;
            }
        }
        match &self.order_by {
            Some((field, _)) => doc.get(field).is_some_and(|v| !v.is_null()),
            None => true,
        }
    }

    /// Filter and order a full collection into a snapshot
    pub fn apply(&self, docs: impl IntoIterator<Item = Document>) -> Vec<Document> {
        let mut result: Vec<Document> = docs.into_iter().filter(|d| self.matches(d)).collect();
        if let Some((field, direction)) = &self.order_by {
            result.sort_by(|a, b| {
                let ord = compare_values(a.get(field), b.get(field)).then_with(|| a.id.cmp(&b.id));
                match direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                }
            });
        }
        result
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Number(a)), Some(Value::Number(b))) => {
            let (a, b) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn doc(id: &str, fields: Value) -> Document {
        let Value::Object(map) = fields else {
            panic!("fields must be an object")
        };
        Document::new(DocumentId::new(id), map)
    }

    #[test]
    fn sentinels_resolve_against_existing_fields() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut target = Map::new();
        target.insert("likesCount".into(), json!(3));

        Fields::new()
            .with("title", "Rain")
            .server_timestamp("createdAt")
            .increment("likesCount", -1)
            .increment("views", 2)
            .apply_to(&mut target, now);

        assert_eq!(target["title"], json!("Rain"));
        assert_eq!(target["likesCount"], json!(2));
        assert_eq!(target["views"], json!(2));
        assert_eq!(
            parse_timestamp(target["createdAt"].as_str().unwrap()),
            Some(now)
        );
    }

    #[test]
    fn query_filters_and_orders_descending() {
        let docs = vec![
            doc("a", json!({"userId": "u1", "createdAt": "2024-01-01T00:00:00.000000Z"})),
            doc("b", json!({"userId": "u2", "createdAt": "2024-01-03T00:00:00.000000Z"})),
            doc("c", json!({"userId": "u1", "createdAt": "2024-01-02T00:00:00.000000Z"})),
            doc("d", json!({"userId": "u1"})),
        ];

        let result = Query::collection("diaries")
            .where_eq("userId", "u1")
            .order_by("createdAt", Direction::Descending)
            .apply(docs);

        let ids: Vec<_> = result.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    #[test]
    fn timestamp_format_sorts_lexically() {
        let early = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        assert!(format_timestamp(early) < format_timestamp(late));
    }
}
