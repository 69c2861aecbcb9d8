//! Sort engine.
//!
//! Keeps an ordered list of `(field, direction)` pairs where position is
//! priority: the first entry is the primary sort key. Directions come from
//! a configurable cycle; stepping past its last entry removes the field.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use sieve_core::{Document, Error, Result, Value};

/// Direction cycle used when none is configured.
pub const DEFAULT_SORT_ORDER: [&str; 2] = ["asc", "desc"];

/// One entry of the sort list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortKey {
    /// Dotted field path, e.g. `"author.name"`
    pub field: String,
    /// A direction from the configured cycle
    pub direction: String,
}

impl SortKey {
    /// Creates a new sort key.
    pub fn new(field: impl Into<String>, direction: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: direction.into(),
        }
    }

    /// `[field, direction]` as the store expects it.
    pub fn to_value(&self) -> Value {
        Value::Array(alloc::vec![
            Value::String(self.field.clone()),
            Value::String(self.direction.clone()),
        ])
    }
}

/// Ordered sort specification with a direction cycle.
#[derive(Clone, Debug)]
pub struct SortEngine {
    keys: Vec<SortKey>,
    order: Vec<String>,
}

impl Default for SortEngine {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl SortEngine {
    /// Creates an empty sort list. An empty `order` selects
    /// `DEFAULT_SORT_ORDER`.
    pub fn new(order: Vec<String>) -> Self {
        let order = if order.is_empty() {
            DEFAULT_SORT_ORDER.iter().map(|d| d.to_string()).collect()
        } else {
            order
        };
        Self {
            keys: Vec::new(),
            order,
        }
    }

    /// Creates a sort list seeded with `defaults`, highest priority first.
    pub fn with_defaults(defaults: Vec<SortKey>, order: Vec<String>) -> Result<Self> {
        let mut engine = Self::new(order);
        for key in defaults {
            if !engine.is_legal(&key.direction) {
                return Err(Error::invalid_direction(key.direction));
            }
            engine.keys.retain(|k| k.field != key.field);
            engine.keys.push(key);
        }
        Ok(engine)
    }

    /// The configured direction cycle.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Returns true if `direction` is part of the configured cycle.
    pub fn is_legal(&self, direction: &str) -> bool {
        self.order.iter().any(|d| d == direction)
    }

    /// Current sort list, highest priority first.
    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Returns the number of sorted fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if nothing is sorted.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Current direction of `field`, if it is sorted.
    pub fn direction_of(&self, field: &str) -> Option<&str> {
        self.keys
            .iter()
            .find(|k| k.field == field)
            .map(|k| k.direction.as_str())
    }

    /// Toggles or inserts `field`.
    ///
    /// A field already in the list advances one step through the cycle
    /// (the `direction` argument is ignored) and becomes the primary key,
    /// or is removed when the cycle is exhausted. A new field is inserted as
    /// the primary key with `direction`, defaulting to the first cycle value.
    /// An empty field name is ignored.
    pub fn set(&mut self, field: &str, direction: Option<&str>) -> Result<()> {
        if let Some(direction) = direction {
            if !self.is_legal(direction) {
                return Err(Error::invalid_direction(direction));
            }
        }
        if field.is_empty() {
            return Ok(());
        }

        match self.keys.iter().position(|k| k.field == field) {
            Some(idx) => {
                let current = self.keys.remove(idx);
                let step = self
                    .order
                    .iter()
                    .position(|d| *d == current.direction)
                    .map(|i| i + 1)
                    .unwrap_or(0);
                if let Some(next) = self.order.get(step) {
                    self.keys.insert(0, SortKey::new(field, next.clone()));
                }
            }
            None => {
                let direction = direction.unwrap_or(self.order[0].as_str());
                self.keys.insert(0, SortKey::new(field, direction));
            }
        }
        Ok(())
    }

    /// Removes every sort key.
    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Nested display document.
    ///
    /// Each field is split on `.` and nested; the leaf carries
    /// `{<direction>: true}`. Fields sharing a path prefix merge into the
    /// same nested document.
    pub fn spec(&self) -> Document {
        let mut spec = Document::new();
        for key in &self.keys {
            let mut cursor = &mut spec;
            for part in key.field.split('.') {
                cursor = cursor.document_entry(part);
            }
            cursor.insert(key.direction.clone(), true);
        }
        spec
    }

    /// The list as `[[field, direction], ...]` for query options.
    pub fn to_value(&self) -> Value {
        Value::Array(self.keys.iter().map(SortKey::to_value).collect())
    }
}
