//! Extended JSON codec.
//!
//! Plain JSON cannot carry dates, regex literals or non-finite floats, and it
//! does not tell integers from floats once parsed. Query descriptors are
//! stored as strings, so they go through this codec to come back exactly as
//! they were written.
//!
//! Encoding rules:
//!
//! - `Date(ms)` → `{"$date": ms}`
//! - non-finite `Float` → `{"$InfNaN": 1 | -1 | 0}`
//! - `Regex` → `{"$type": "regex", "$value": {"pattern": .., "flags": ..}}`
//! - a `Document` whose keys collide with one of the wrappers above →
//!   `{"$escape": {..}}`
//!
//! Decoding is done top-down on the raw tree so that an escaped document's
//! own keys are never reinterpreted.

use crate::document::Document;
use crate::error::Result;
use crate::value::{Regex, Value};
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

const DATE_KEY: &str = "$date";
const INF_NAN_KEY: &str = "$InfNaN";
const ESCAPE_KEY: &str = "$escape";
const TYPE_KEY: &str = "$type";
const TYPE_VALUE_KEY: &str = "$value";
const REGEX_TYPE: &str = "regex";

/// Serializes a value to an extended JSON string.
pub fn to_ejson_string(value: &Value) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

/// Parses an extended JSON string back into a value.
pub fn from_ejson_str(input: &str) -> Result<Value> {
    Ok(serde_json::from_str(input)?)
}

fn needs_escape(doc: &Document) -> bool {
    match doc.len() {
        1 => doc
            .keys()
            .any(|k| k == DATE_KEY || k == INF_NAN_KEY || k == ESCAPE_KEY),
        2 => doc.contains_key(TYPE_KEY) && doc.contains_key(TYPE_VALUE_KEY),
        _ => false,
    }
}

/// Serializes the entries of a document without the escape check.
struct Entries<'a>(&'a Document);

impl Serialize for Entries<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in self.0.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

struct RegexBody<'a>(&'a Regex);

impl Serialize for RegexBody<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("pattern", &self.0.pattern)?;
        map.serialize_entry("flags", &self.0.flags)?;
        map.end()
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) if f.is_finite() => serializer.serialize_f64(*f),
            Value::Float(f) => {
                let sign: i64 = if f.is_nan() {
                    0
                } else if f.is_sign_positive() {
                    1
                } else {
                    -1
                };
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(INF_NAN_KEY, &sign)?;
                map.end()
            }
            Value::String(s) => serializer.serialize_str(s),
            Value::Date(ms) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(DATE_KEY, ms)?;
                map.end()
            }
            Value::Regex(re) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry(TYPE_KEY, REGEX_TYPE)?;
                map.serialize_entry(TYPE_VALUE_KEY, &RegexBody(re))?;
                map.end()
            }
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Document(doc) => doc.serialize(serializer),
        }
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        if needs_escape(self) {
            let mut map = serializer.serialize_map(Some(1))?;
            map.serialize_entry(ESCAPE_KEY, &Entries(self))?;
            map.end()
        } else {
            Entries(self).serialize(serializer)
        }
    }
}

/// The undecoded JSON tree, with map order preserved.
struct Raw(Value);

struct RawVisitor;

impl<'de> Visitor<'de> for RawVisitor {
    type Value = Raw;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an extended JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> core::result::Result<Raw, E> {
        Ok(Raw(Value::Null))
    }

    fn visit_none<E: de::Error>(self) -> core::result::Result<Raw, E> {
        Ok(Raw(Value::Null))
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> core::result::Result<Raw, D::Error> {
        Raw::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> core::result::Result<Raw, E> {
        Ok(Raw(Value::Bool(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> core::result::Result<Raw, E> {
        Ok(Raw(Value::Int(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> core::result::Result<Raw, E> {
        Ok(Raw(match i64::try_from(v) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::Float(v as f64),
        }))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> core::result::Result<Raw, E> {
        Ok(Raw(Value::Float(v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> core::result::Result<Raw, E> {
        Ok(Raw(Value::String(String::from(v))))
    }

    fn visit_string<E: de::Error>(self, v: String) -> core::result::Result<Raw, E> {
        Ok(Raw(Value::String(v)))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> core::result::Result<Raw, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(Raw(item)) = seq.next_element::<Raw>()? {
            items.push(item);
        }
        Ok(Raw(Value::Array(items)))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> core::result::Result<Raw, A::Error> {
        let mut doc = Document::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, Raw(value))) = map.next_entry::<String, Raw>()? {
            doc.insert(key, value);
        }
        Ok(Raw(Value::Document(doc)))
    }
}

impl<'de> Deserialize<'de> for Raw {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        deserializer.deserialize_any(RawVisitor)
    }
}

fn decode(raw: Value) -> Value {
    match raw {
        Value::Array(items) => Value::Array(items.into_iter().map(decode).collect()),
        Value::Document(doc) => decode_document(doc),
        other => other,
    }
}

fn decode_entries(doc: Document) -> Document {
    doc.into_iter().map(|(k, v)| (k, decode(v))).collect()
}

fn decode_document(doc: Document) -> Value {
    if doc.len() == 1 {
        if let Some(Value::Int(ms)) = doc.get(DATE_KEY) {
            return Value::Date(*ms);
        }
        if let Some(Value::Int(sign)) = doc.get(INF_NAN_KEY) {
            return Value::Float(match *sign {
                1 => f64::INFINITY,
                -1 => f64::NEG_INFINITY,
                _ => f64::NAN,
            });
        }
        if matches!(doc.get(ESCAPE_KEY), Some(Value::Document(_))) {
            return match doc.into_iter().next() {
                Some((_, Value::Document(inner))) => Value::Document(decode_entries(inner)),
                _ => Value::Document(Document::new()),
            };
        }
    }
    if doc.len() == 2 {
        if let Some(re) = decode_regex(&doc) {
            return Value::Regex(re);
        }
    }
    Value::Document(decode_entries(doc))
}

fn decode_regex(doc: &Document) -> Option<Regex> {
    if doc.get(TYPE_KEY)?.as_str()? != REGEX_TYPE {
        return None;
    }
    let body = doc.get(TYPE_VALUE_KEY)?.as_document()?;
    let pattern = body.get("pattern")?.as_str()?;
    let flags = body.get("flags")?.as_str()?;
    Some(Regex::new(pattern, flags))
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        let Raw(raw) = Raw::deserialize(deserializer)?;
        Ok(decode(raw))
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Document(doc) => Ok(doc),
            _ => Err(de::Error::custom("expected a document")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn round_trip(value: &Value) -> Value {
        from_ejson_str(&to_ejson_string(value).unwrap()).unwrap()
    }

    #[test]
    fn test_plain_json_shape() {
        let doc = Document::new().with("status", "open").with("count", 3i64);
        let text = to_ejson_string(&Value::Document(doc)).unwrap();
        assert_eq!(text, r#"{"status":"open","count":3}"#);
    }

    #[test]
    fn test_date_encoding() {
        let text = to_ejson_string(&Value::Date(1700000000000)).unwrap();
        assert_eq!(text, r#"{"$date":1700000000000}"#);
        assert_eq!(from_ejson_str(&text).unwrap(), Value::Date(1700000000000));
    }

    #[test]
    fn test_int_and_float_stay_distinct() {
        assert_eq!(round_trip(&Value::Int(2)), Value::Int(2));
        assert_eq!(round_trip(&Value::Float(2.0)), Value::Float(2.0));
    }

    #[test]
    fn test_non_finite_floats() {
        assert_eq!(round_trip(&Value::Float(f64::INFINITY)), Value::Float(f64::INFINITY));
        assert_eq!(
            round_trip(&Value::Float(f64::NEG_INFINITY)),
            Value::Float(f64::NEG_INFINITY)
        );
        assert_eq!(round_trip(&Value::Float(f64::NAN)), Value::Float(f64::NAN));
    }

    #[test]
    fn test_regex_round_trip() {
        let value = Value::Regex(Regex::new("^ab+", "i"));
        assert_eq!(round_trip(&value), value);
    }

    #[test]
    fn test_colliding_document_is_escaped() {
        let doc = Document::new().with("$date", "not a date");
        let value = Value::Document(doc);
        let text = to_ejson_string(&value).unwrap();
        assert!(text.starts_with(r#"{"$escape":"#));
        assert_eq!(round_trip(&value), value);
    }

    #[test]
    fn test_escaped_document_keeps_nested_escape() {
        let inner = Document::new().with("$escape", Value::Date(5));
        let value = Value::Document(Document::new().with("$escape", inner));
        assert_eq!(round_trip(&value), value);
    }

    #[test]
    fn test_nested_structures() {
        let selector = Document::new()
            .with(
                "$or",
                vec![
                    Value::Document(Document::new().with("title", Value::Regex(Regex::new("abc", "i")))),
                    Value::Document(Document::new().with("created", Value::Date(42))),
                ],
            )
            .with("archived", false);
        let value = Value::Document(selector);
        assert_eq!(round_trip(&value), value);
    }

    #[test]
    fn test_invalid_input() {
        assert!(from_ejson_str("{not json").is_err());
    }
}
