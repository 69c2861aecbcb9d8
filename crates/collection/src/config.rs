//! Collection settings.
//!
//! Everything serializable can be loaded from JSON with
//! [`Settings::from_json`]; filter transforms are attached afterwards with
//! [`Settings::transform`].

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use sieve_core::{Error, Result, Value};
use sieve_query::{
    FilterSet, FilterSlot, Operator, PagerConfig, Searchable, SortEngine, SortKey, DEFAULT_PAGE_SIZES,
    DEFAULT_SORT_ORDER,
};
use std::fmt;

/// Settings of one collection. Every field is optional in JSON.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Collection name; empty means the store's own name.
    pub name: String,
    /// Restrict reads to documents delivered by this collection's results
    /// subscription.
    pub use_filter_data_only: bool,
    pub sort: SortSettings,
    pub pager: PagerSettings,
    /// Filter slots in document order.
    #[serde(deserialize_with = "deserialize_filters")]
    pub filters: FilterSet,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SortSettings {
    /// Initial `[field, direction]` pairs, highest priority first.
    pub defaults: Vec<(String, String)>,
    /// Direction cycle.
    pub order: Vec<String>,
}

impl Default for SortSettings {
    fn default() -> Self {
        Self {
            defaults: Vec::new(),
            order: DEFAULT_SORT_ORDER.iter().map(|d| d.to_string()).collect(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PagerSettings {
    pub options: Vec<usize>,
    pub items_per_page: usize,
    pub current_page: usize,
    pub show_pages: usize,
}

impl Default for PagerSettings {
    fn default() -> Self {
        let config = PagerConfig::default();
        Self {
            options: DEFAULT_PAGE_SIZES.to_vec(),
            items_per_page: config.items_per_page,
            current_page: config.current_page,
            show_pages: config.show_pages,
        }
    }
}

impl Settings {
    /// Creates default settings for `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parses and validates settings from JSON.
    pub fn from_json(input: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(input)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Adds or replaces a filter slot.
    pub fn filter(mut self, key: impl Into<String>, slot: FilterSlot) -> Self {
        self.filters.insert(key, slot);
        self
    }

    /// Attaches a value transform to an already configured filter.
    pub fn transform<F>(mut self, key: &str, transform: F) -> Result<Self>
    where
        F: Fn(&Value) -> Value + 'static,
    {
        let slot = self
            .filters
            .get(key)
            .cloned()
            .ok_or_else(|| Error::invalid_filter_key(key))?;
        self.filters.insert(key, slot.with_transform(transform));
        Ok(self)
    }

    /// Rejects settings that can never produce a valid query.
    pub fn validate(&self) -> Result<()> {
        if self.pager.items_per_page == 0 {
            return Err(Error::invalid_settings("pager.itemsPerPage must be positive"));
        }
        if self.sort.order.is_empty() {
            return Err(Error::invalid_settings("sort.order must not be empty"));
        }
        if let Some((field, direction)) = self
            .sort
            .defaults
            .iter()
            .find(|(_, direction)| !self.sort.order.contains(direction))
        {
            return Err(Error::invalid_settings(format!(
                "sort default {} uses unknown direction {}",
                field, direction
            )));
        }
        Ok(())
    }

    /// The sort engine seeded with the configured defaults.
    pub fn sort_engine(&self) -> Result<SortEngine> {
        let defaults = self
            .sort
            .defaults
            .iter()
            .map(|(field, direction)| SortKey::new(field.clone(), direction.clone()))
            .collect();
        SortEngine::with_defaults(defaults, self.sort.order.clone())
    }

    pub fn pager_config(&self) -> PagerConfig {
        PagerConfig {
            options: self.pager.options.clone(),
            items_per_page: self.pager.items_per_page,
            current_page: self.pager.current_page,
            show_pages: self.pager.show_pages,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FilterConfig {
    title: String,
    value: Option<Value>,
    /// `[comparator]` or `[comparator, modifier]`
    operator: Vec<String>,
    condition: Option<String>,
    searchable: Option<String>,
    sort: Option<String>,
}

impl FilterConfig {
    fn into_slot(self) -> std::result::Result<FilterSlot, String> {
        let mut slot = FilterSlot::new(self.title);
        if let Some(value) = self.value {
            slot = slot.with_value(value);
        }
        let mut operator = self.operator.into_iter().filter(|part| !part.is_empty());
        if let Some(comparator) = operator.next() {
            slot = slot.with_operator(match operator.next() {
                Some(modifier) => Operator::with_modifier(comparator, modifier),
                None => Operator::new(comparator),
            });
        }
        if let Some(condition) = self.condition.filter(|c| !c.is_empty()) {
            slot = slot.with_condition(condition);
        }
        let searchable = match self.searchable.as_deref() {
            None | Some("") | Some("none") => Searchable::None,
            Some("optional") => Searchable::Optional,
            Some("required") => Searchable::Required,
            Some(other) => return Err(format!("unknown searchable mode {}", other)),
        };
        slot = slot.with_searchable(searchable);
        if let Some(sort) = self.sort.filter(|s| !s.is_empty()) {
            slot = slot.with_sort(sort);
        }
        Ok(slot)
    }
}

struct FiltersVisitor;

impl<'de> Visitor<'de> for FiltersVisitor {
    type Value = FilterSet;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of filter key to filter settings")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<FilterSet, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut filters = FilterSet::new();
        while let Some((key, config)) = map.next_entry::<String, FilterConfig>()? {
            let slot = config.into_slot().map_err(de::Error::custom)?;
            filters.insert(key, slot);
        }
        Ok(filters)
    }
}

// Entries are visited in document order, which becomes the slot order.
fn deserialize_filters<'de, D>(deserializer: D) -> std::result::Result<FilterSet, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_map(FiltersVisitor)
}
