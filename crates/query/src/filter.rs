//! Filter engine.
//!
//! A fixed set of named slots, configured up front. Setting a value makes a
//! slot active; the selector is rebuilt from the active slots on every call
//! so it never drifts from the slot state.

use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use hashbrown::HashMap;
use sieve_core::{Document, Error, Result, Value};

/// Operator label reported for slots that match by equality.
pub const MATCH_OPERATOR: &str = "match";

/// Selector key that carries an operator's modifier.
pub const OPTIONS_KEY: &str = "$options";

/// Pure function applied to a slot's value before it enters the selector.
pub type Transform = Rc<dyn Fn(&Value) -> Value>;

/// Whether free-text search fans out into a slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Searchable {
    /// Never searched
    #[default]
    None,
    /// Searched when the user enables it
    Optional,
    /// Always searched
    Required,
}

/// A comparator such as `$regex` with an optional modifier such as `i`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Operator {
    pub comparator: String,
    pub modifier: Option<String>,
}

impl Operator {
    pub fn new(comparator: impl Into<String>) -> Self {
        Self {
            comparator: comparator.into(),
            modifier: None,
        }
    }

    pub fn with_modifier(comparator: impl Into<String>, modifier: impl Into<String>) -> Self {
        Self {
            comparator: comparator.into(),
            modifier: Some(modifier.into()),
        }
    }
}

/// One configured filter.
#[derive(Clone, Default)]
pub struct FilterSlot {
    pub title: String,
    pub value: Option<Value>,
    pub operator: Option<Operator>,
    pub transform: Option<Transform>,
    /// Group name such as `"or"`; grouped conditions are collected into a
    /// list under `$<group>`.
    pub condition: Option<String>,
    pub searchable: Searchable,
    /// Sort direction forced on this field while the slot is active.
    pub sort: Option<String>,
    active: bool,
}

impl FilterSlot {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self.refresh_active();
        self
    }

    pub fn with_operator(mut self, operator: Operator) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn with_transform(mut self, transform: impl Fn(&Value) -> Value + 'static) -> Self {
        self.transform = Some(Rc::new(transform));
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn with_searchable(mut self, searchable: Searchable) -> Self {
        self.searchable = searchable;
        self
    }

    pub fn with_sort(mut self, direction: impl Into<String>) -> Self {
        self.sort = Some(direction.into());
        self
    }

    /// True iff the slot holds a truthy value.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Comparator label, `"match"` when none is declared.
    pub fn operator_label(&self) -> &str {
        self.operator
            .as_ref()
            .map(|op| op.comparator.as_str())
            .filter(|c| !c.is_empty())
            .unwrap_or(MATCH_OPERATOR)
    }

    fn refresh_active(&mut self) {
        self.active = self.value.as_ref().map(Value::is_truthy).unwrap_or(false);
    }

    fn clear_value(&mut self) -> bool {
        let was_active = self.active;
        self.value = None;
        self.active = false;
        was_active
    }

    fn selector_value(&self) -> Option<Value> {
        if !self.active {
            return None;
        }
        let raw = self.value.as_ref()?;
        let value = match &self.transform {
            Some(transform) => transform(raw),
            None => raw.clone(),
        };
        match &self.operator {
            Some(op) if !op.comparator.is_empty() => {
                let mut condition = Document::new().with(op.comparator.clone(), value);
                if let Some(modifier) = op.modifier.as_ref().filter(|m| !m.is_empty()) {
                    condition.insert(OPTIONS_KEY, modifier.clone());
                }
                Some(Value::Document(condition))
            }
            _ => Some(value),
        }
    }
}

impl fmt::Debug for FilterSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterSlot")
            .field("title", &self.title)
            .field("value", &self.value)
            .field("operator", &self.operator)
            .field("transform", &self.transform.is_some())
            .field("condition", &self.condition)
            .field("searchable", &self.searchable)
            .field("sort", &self.sort)
            .field("active", &self.active)
            .finish()
    }
}

/// Fields to overwrite on a slot. `None` leaves the field untouched.
#[derive(Clone, Default)]
pub struct FilterPatch {
    pub value: Option<Value>,
    pub title: Option<String>,
    pub operator: Option<Operator>,
    pub transform: Option<Transform>,
    pub condition: Option<String>,
    pub searchable: Option<Searchable>,
    pub sort: Option<String>,
}

impl FilterPatch {
    /// A patch that only sets the value.
    pub fn value(value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn operator(mut self, operator: Operator) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn sort(mut self, direction: impl Into<String>) -> Self {
        self.sort = Some(direction.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    fn apply(self, slot: &mut FilterSlot) {
        if let Some(value) = self.value {
            slot.value = Some(value);
        }
        if let Some(title) = self.title {
            slot.title = title;
        }
        if let Some(operator) = self.operator {
            slot.operator = Some(operator);
        }
        if let Some(transform) = self.transform {
            slot.transform = Some(transform);
        }
        if let Some(condition) = self.condition {
            slot.condition = Some(condition);
        }
        if let Some(searchable) = self.searchable {
            slot.searchable = searchable;
        }
        if let Some(sort) = self.sort {
            slot.sort = Some(sort);
        }
        slot.refresh_active();
    }
}

/// Summary of one active slot.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveFilter {
    pub key: String,
    pub title: String,
    pub operator: String,
    pub value: Value,
}

/// Ordered set of filter slots.
#[derive(Clone, Debug, Default)]
pub struct FilterSet {
    slots: Vec<(String, FilterSlot)>,
    index: HashMap<String, usize>,
}

impl FilterSet {
    /// Creates an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a slot, or replaces the configuration of an existing key in place.
    pub fn insert(&mut self, key: impl Into<String>, slot: FilterSlot) {
        let key = key.into();
        match self.index.get(&key) {
            Some(&idx) => self.slots[idx].1 = slot,
            None => {
                self.index.insert(key.clone(), self.slots.len());
                self.slots.push((key, slot));
            }
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, slot: FilterSlot) -> Self {
        self.insert(key, slot);
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&FilterSlot> {
        self.index.get(key).map(|&idx| &self.slots[idx].1)
    }

    /// Iterates slots in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterSlot)> {
        self.slots.iter().map(|(k, s)| (k.as_str(), s))
    }

    /// Applies `patch` to slot `key`.
    ///
    /// Fails with `InvalidFilterKey` for a key that was never configured,
    /// leaving every slot unchanged.
    pub fn set(&mut self, key: &str, patch: FilterPatch) -> Result<&FilterSlot> {
        let idx = *self
            .index
            .get(key)
            .ok_or_else(|| Error::invalid_filter_key(key))?;
        let slot = &mut self.slots[idx].1;
        patch.apply(slot);
        Ok(slot)
    }

    /// Clears the value of slot `key`. Returns true if it was active.
    ///
    /// Fails with `InvalidFilterKey` for a key that was never configured.
    pub fn clear(&mut self, key: &str) -> Result<bool> {
        let idx = *self
            .index
            .get(key)
            .ok_or_else(|| Error::invalid_filter_key(key))?;
        Ok(self.slots[idx].1.clear_value())
    }

    /// Clears every slot. Returns how many were active.
    pub fn clear_all(&mut self) -> usize {
        let mut cleared = 0;
        for (_, slot) in self.slots.iter_mut() {
            if slot.clear_value() {
                cleared += 1;
            }
        }
        cleared
    }

    /// Number of active slots.
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|(_, s)| s.active).count()
    }

    /// Builds the store selector from the active slots.
    ///
    /// Ungrouped conditions are merged at the top level in configuration
    /// order, so a later slot overwrites an earlier one with the same key.
    /// Grouped conditions are appended to the list under `$<group>`.
    pub fn selector(&self) -> Document {
        let mut selector = Document::new();
        for (key, slot) in &self.slots {
            let Some(condition) = slot.selector_value() else {
                continue;
            };
            match slot.condition.as_deref().filter(|c| !c.is_empty()) {
                Some(group) => {
                    let segment = Value::Document(Document::new().with(key.clone(), condition));
                    let group_key = group_key(group);
                    match selector.get_mut(&group_key) {
                        Some(Value::Array(items)) => items.push(segment),
                        _ => {
                            selector.insert(group_key, Value::Array(alloc::vec![segment]));
                        }
                    }
                }
                None => {
                    selector.insert(key.clone(), condition);
                }
            }
        }
        selector
    }

    /// Active slots in configuration order.
    pub fn active(&self) -> Vec<ActiveFilter> {
        self.slots
            .iter()
            .filter(|(_, slot)| slot.active)
            .map(|(key, slot)| ActiveFilter {
                key: key.clone(),
                title: slot.title.clone(),
                operator: String::from(slot.operator_label()),
                value: slot.value.clone().unwrap_or_default(),
            })
            .collect()
    }

    /// True iff slot `key` is active with a value loosely equal to `value`
    /// and, when `operator` is given, declares that comparator.
    pub fn is_active(&self, key: &str, value: &Value, operator: Option<&str>) -> bool {
        let Some(slot) = self.get(key) else {
            return false;
        };
        if !slot.active {
            return false;
        }
        let matches = slot
            .value
            .as_ref()
            .map(|current| current.loose_eq(value))
            .unwrap_or(false);
        if !matches {
            return false;
        }
        match operator {
            Some(op) => slot.operator_label() == op,
            None => true,
        }
    }
}

fn group_key(group: &str) -> String {
    if group.starts_with('$') {
        String::from(group)
    } else {
        format!("${}", group)
    }
}
