//! Search engine.
//!
//! Fans one free-text criterion out to every searchable filter slot that is
//! currently enabled.

use crate::filter::{FilterSet, Searchable};
use alloc::string::String;
use alloc::vec::Vec;

/// A filter slot that takes part in free-text search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchField {
    pub field: String,
    pub title: String,
    pub active: bool,
}

/// Search criterion plus the optional and required searchable fields.
#[derive(Clone, Debug, Default)]
pub struct SearchState {
    criteria: String,
    fields: Vec<SearchField>,
    required: Vec<SearchField>,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the field lists from the slots' `searchable` setting.
    /// Optional fields start disabled, required ones are always enabled.
    pub fn from_filters(filters: &FilterSet) -> Self {
        let mut state = Self::new();
        state.init(filters);
        state
    }

    /// Recomputes the field lists, keeping the current criterion.
    pub fn init(&mut self, filters: &FilterSet) {
        self.fields.clear();
        self.required.clear();
        for (key, slot) in filters.iter() {
            let field = SearchField {
                field: String::from(key),
                title: slot.title.clone(),
                active: slot.searchable == Searchable::Required,
            };
            match slot.searchable {
                Searchable::Optional => self.fields.push(field),
                Searchable::Required => self.required.push(field),
                Searchable::None => {}
            }
        }
    }

    /// The current criterion, empty when cleared.
    pub fn criteria(&self) -> &str {
        &self.criteria
    }

    /// Optional fields, followed by the required ones when `full` is set.
    pub fn fields(&self, full: bool) -> Vec<SearchField> {
        let mut fields = self.fields.clone();
        if full {
            fields.extend(self.required.iter().cloned());
        }
        fields
    }

    /// Toggles an optional field. Required fields cannot be toggled.
    /// Returns true if a field was toggled.
    pub fn toggle_field(&mut self, key: &str) -> bool {
        match self.fields.iter_mut().find(|f| f.field == key) {
            Some(field) => {
                field.active = !field.active;
                true
            }
            None => false,
        }
    }

    /// Stores a new criterion and returns the enabled fields it must be
    /// applied to. An empty criterion is ignored and returns `None`.
    pub fn set_criteria(&mut self, value: &str) -> Option<Vec<String>> {
        if value.is_empty() {
            return None;
        }
        self.criteria = String::from(value);
        Some(
            self.fields
                .iter()
                .chain(self.required.iter())
                .filter(|f| f.active)
                .map(|f| f.field.clone())
                .collect(),
        )
    }

    /// Resets the criterion.
    pub fn clear(&mut self) {
        self.criteria.clear();
    }
}
