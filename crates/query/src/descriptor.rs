//! Canonical query descriptor and the composer that owns it.
//!
//! The descriptor is `{selector, options: {sort, skip, limit}, force?}`. The
//! composer keeps it serialized as extended JSON, so every read hands out an
//! independent copy and dates or regexes survive unchanged.

use crate::sort::SortKey;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use sieve_core::ejson::{from_ejson_str, to_ejson_string};
use sieve_core::{Document, Error, Result, Value};

/// Selector field used to scope reads to documents delivered by one
/// results subscription.
pub const FILTER_TAG_FIELD: &str = "__filter";

/// Non-predicate query parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryOptions {
    pub sort: Vec<SortKey>,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

impl QueryOptions {
    /// `{sort: [[field, direction], ...], skip?, limit?}`
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new().with(
            "sort",
            Value::Array(self.sort.iter().map(SortKey::to_value).collect()),
        );
        if let Some(skip) = self.skip {
            doc.insert("skip", skip);
        }
        if let Some(limit) = self.limit {
            doc.insert("limit", limit);
        }
        doc
    }

    pub fn from_document(doc: &Document) -> Result<Self> {
        let sort = match doc.get("sort") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(pairs)) => pairs
                .iter()
                .map(sort_key_from_value)
                .collect::<Result<Vec<_>>>()?,
            Some(_) => return Err(Error::serialization("options.sort must be an array")),
        };
        Ok(Self {
            sort,
            skip: count_from(doc.get("skip"), "skip")?,
            limit: count_from(doc.get("limit"), "limit")?,
        })
    }
}

fn sort_key_from_value(value: &Value) -> Result<SortKey> {
    match value.as_array().map(Vec::as_slice) {
        Some([Value::String(field), Value::String(direction)]) => {
            Ok(SortKey::new(field.clone(), direction.clone()))
        }
        _ => Err(Error::serialization(
            "options.sort entries must be [field, direction] pairs",
        )),
    }
}

fn count_from(value: Option<&Value>, name: &str) -> Result<Option<usize>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Int(n)) if *n >= 0 => Ok(Some(*n as usize)),
        Some(_) => Err(Error::serialization(alloc::format!(
            "options.{} must be a non-negative integer",
            name
        ))),
    }
}

/// The merged selector and options that determine what is subscribed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryDescriptor {
    pub selector: Document,
    pub options: QueryOptions,
    /// Freshness marker; changes force a resubscription with identical
    /// selector and options.
    pub force: Option<i64>,
}

impl QueryDescriptor {
    pub fn to_value(&self) -> Value {
        let mut doc = Document::new()
            .with("selector", self.selector.clone())
            .with("options", self.options.to_document());
        if let Some(force) = self.force {
            doc.insert("force", force);
        }
        Value::Document(doc)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let doc = value
            .as_document()
            .ok_or_else(|| Error::serialization("query descriptor must be a document"))?;
        let selector = match doc.get("selector") {
            None | Some(Value::Null) => Document::new(),
            Some(Value::Document(selector)) => selector.clone(),
            Some(_) => return Err(Error::serialization("selector must be a document")),
        };
        let options = match doc.get("options") {
            None | Some(Value::Null) => QueryOptions::default(),
            Some(Value::Document(options)) => QueryOptions::from_document(options)?,
            Some(_) => return Err(Error::serialization("options must be a document")),
        };
        let force = match doc.get("force") {
            None | Some(Value::Null) => None,
            Some(Value::Int(force)) => Some(*force),
            Some(_) => return Err(Error::serialization("force must be an integer")),
        };
        Ok(Self {
            selector,
            options,
            force,
        })
    }

    /// Serializes to extended JSON.
    pub fn to_ejson(&self) -> Result<String> {
        to_ejson_string(&self.to_value())
    }

    /// Parses extended JSON produced by [`QueryDescriptor::to_ejson`].
    pub fn from_ejson(s: &str) -> Result<Self> {
        Self::from_value(&from_ejson_str(s)?)
    }

    /// The read query: skip and limit removed, optionally scoped to the
    /// documents of one subscription via [`FILTER_TAG_FIELD`].
    pub fn results_query(&self, filter_tag: Option<&str>) -> Self {
        let mut query = self.clone();
        query.options.skip = None;
        query.options.limit = None;
        if let Some(tag) = filter_tag {
            query.selector.insert(FILTER_TAG_FIELD, tag.to_string());
        }
        query
    }
}

/// Owner of the canonical, serialized descriptor.
#[derive(Clone, Debug)]
pub struct QueryComposer {
    serialized: String,
    last_force: i64,
}

impl Default for QueryComposer {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryComposer {
    /// Creates a composer holding the empty descriptor.
    pub fn new() -> Self {
        Self {
            serialized: String::from(r#"{"selector":{},"options":{"sort":[]}}"#),
            last_force: 0,
        }
    }

    /// Replaces the canonical descriptor. On error the previous one is kept.
    pub fn set(&mut self, descriptor: &QueryDescriptor) -> Result<()> {
        self.serialized = descriptor.to_ejson()?;
        Ok(())
    }

    /// Returns an independent copy of the canonical descriptor.
    pub fn get(&self) -> Result<QueryDescriptor> {
        QueryDescriptor::from_ejson(&self.serialized)
    }

    /// The canonical descriptor as extended JSON.
    pub fn serialized(&self) -> &str {
        &self.serialized
    }

    /// Returns a force marker strictly greater than any returned before,
    /// using `now_ms` when it is already greater.
    pub fn next_force(&mut self, now_ms: i64) -> i64 {
        let force = now_ms.max(self.last_force + 1);
        self.last_force = force;
        force
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use sieve_core::Regex;

    fn descriptor() -> QueryDescriptor {
        QueryDescriptor {
            selector: Document::new()
                .with("status", "open")
                .with("created", Document::new().with("$gt", Value::Date(1_700_000_000_000)))
                .with(
                    "$or",
                    vec![
                        Value::Document(Document::new().with("name", Regex::new("^ab", "i"))),
                        Value::Document(Document::new().with("score", 2.5)),
                    ],
                ),
            options: QueryOptions {
                sort: vec![SortKey::new("created", "desc"), SortKey::new("name", "asc")],
                skip: Some(20),
                limit: Some(10),
            },
            force: None,
        }
    }

    #[test]
    fn test_empty_composer() {
        let composer = QueryComposer::new();
        assert_eq!(composer.get().unwrap(), QueryDescriptor::default());
    }

    #[test]
    fn test_composer_round_trip() {
        let mut composer = QueryComposer::new();
        let d = descriptor();
        composer.set(&d).unwrap();
        assert_eq!(composer.get().unwrap(), d);
    }

    #[test]
    fn test_get_returns_copy() {
        let mut composer = QueryComposer::new();
        composer.set(&descriptor()).unwrap();
        let mut copy = composer.get().unwrap();
        copy.selector.insert("status", "closed");
        assert_eq!(composer.get().unwrap(), descriptor());
    }

    #[test]
    fn test_options_document_omits_missing_paging() {
        let options = QueryOptions::default().to_document();
        assert_eq!(options.keys().collect::<Vec<_>>(), vec!["sort"]);
    }

    #[test]
    fn test_results_query_strips_paging() {
        let read = descriptor().results_query(None);
        assert_eq!(read.options.skip, None);
        assert_eq!(read.options.limit, None);
        assert_eq!(read.options.sort.len(), 2);
        assert!(!read.selector.contains_key(FILTER_TAG_FIELD));

        let doc = read.options.to_document();
        assert!(!doc.contains_key("skip"));
        assert!(!doc.contains_key("limit"));
    }

    #[test]
    fn test_results_query_tags_selector() {
        let read = descriptor().results_query(Some("tasks-results"));
        assert_eq!(
            read.selector.get(FILTER_TAG_FIELD),
            Some(&Value::from("tasks-results"))
        );
    }

    #[test]
    fn test_from_value_rejects_bad_shapes() {
        assert!(QueryDescriptor::from_value(&Value::Int(1)).is_err());

        let bad_sort = Value::Document(
            Document::new().with("options", Document::new().with("sort", vec![Value::from("a")])),
        );
        assert!(QueryDescriptor::from_value(&bad_sort).is_err());

        let bad_skip = Value::Document(
            Document::new().with("options", Document::new().with("skip", -1i64)),
        );
        assert!(QueryDescriptor::from_value(&bad_skip).is_err());
    }

    #[test]
    fn test_force_round_trip() {
        let mut composer = QueryComposer::new();
        let mut d = descriptor();
        d.force = Some(composer.next_force(1_000));
        composer.set(&d).unwrap();
        assert_eq!(composer.get().unwrap().force, Some(1_000));
    }

    #[test]
    fn test_next_force_strictly_increases() {
        let mut composer = QueryComposer::new();
        assert_eq!(composer.next_force(500), 500);
        assert_eq!(composer.next_force(500), 501);
        assert_eq!(composer.next_force(100), 502);
        assert_eq!(composer.next_force(900), 900);
    }
}
