//! Per-facet handles of a collection: sort, pager, filter, search, query.
//!
//! Reads register the running computation on the facet's channel. Writes go
//! through one batched mutation each.

use crate::channel::Channel;
use crate::collection::Shared;
use crate::hooks::rewrite;
use crate::transport::DocumentStore;
use sieve_core::{Document, Result, Value};
use sieve_query::{
    ActiveFilter, FilterPatch, FilterSet, PagerState, QueryDescriptor, SearchField, SortKey,
};
use std::time::{SystemTime, UNIX_EPOCH};

/// Sort facet.
pub struct SortFacet<'a, S: DocumentStore> {
    shared: &'a Shared<S>,
}

impl<'a, S: DocumentStore> SortFacet<'a, S> {
    pub(crate) fn new(shared: &'a Shared<S>) -> Self {
        Self { shared }
    }

    /// Nested display document, e.g. `{author: {name: {asc: true}}}`.
    pub fn get(&self) -> Document {
        self.shared.depend(Channel::Sort);
        self.shared.read(|state| state.sort.spec())
    }

    /// The sort list, highest priority first.
    pub fn keys(&self) -> Vec<SortKey> {
        self.shared.depend(Channel::Sort);
        self.shared.read(|state| state.sort.keys().to_vec())
    }

    /// The configured direction cycle.
    pub fn order(&self) -> Vec<String> {
        self.shared.read(|state| state.sort.order().to_vec())
    }

    /// Toggles or inserts `field`; see [`sieve_query::SortEngine::set`].
    pub fn set(&self, field: &str, direction: Option<&str>, trigger: bool) -> Result<()> {
        self.shared
            .mutate(|state, signals| state.sort_set(field, direction, trigger, signals))
    }

    /// Cycles `field` and publishes the new order.
    pub fn toggle(&self, field: &str) -> Result<()> {
        self.set(field, None, true)
    }

    pub fn run(&self) -> Result<()> {
        self.shared.mutate(|state, signals| state.sort_run(signals))
    }

    pub fn clear(&self, trigger: bool) -> Result<()> {
        self.shared
            .mutate(|state, signals| state.sort_clear(trigger, signals))
    }
}

/// Pager facet.
pub struct PagerFacet<'a, S: DocumentStore> {
    shared: &'a Shared<S>,
}

impl<'a, S: DocumentStore> PagerFacet<'a, S> {
    pub(crate) fn new(shared: &'a Shared<S>) -> Self {
        Self { shared }
    }

    pub fn get(&self) -> PagerState {
        self.shared.depend(Channel::Pager);
        self.shared.read(|state| state.pager.snapshot())
    }

    pub fn has_previous(&self) -> bool {
        self.shared.depend(Channel::Pager);
        self.shared.read(|state| state.pager.has_previous())
    }

    pub fn has_next(&self) -> bool {
        self.shared.depend(Channel::Pager);
        self.shared.read(|state| state.pager.has_next())
    }

    /// Sets the page size; `trigger` recomputes and publishes.
    pub fn set_items_per_page(&self, items_per_page: usize, trigger: bool) -> Result<()> {
        self.shared.mutate(|state, signals| {
            state.pager.set_items_per_page(items_per_page);
            if trigger {
                state.pager_recompute(true, signals)?;
            }
            Ok(())
        })
    }

    /// Sets the page; `trigger` recomputes and publishes.
    pub fn set_current_page(&self, page: usize, trigger: bool) -> Result<()> {
        self.shared.mutate(|state, signals| {
            state.pager.set_current_page(page);
            if trigger {
                state.pager_recompute(true, signals)?;
            }
            Ok(())
        })
    }

    /// Switches to a new page size and returns to the first page.
    pub fn change_page_size(&self, items_per_page: usize) -> Result<()> {
        self.shared.mutate(|state, signals| {
            state.pager.set_items_per_page(items_per_page);
            state.pager.set_current_page(1);
            state.pager_recompute(true, signals)
        })
    }

    pub fn recompute(&self, trigger: bool) -> Result<()> {
        self.shared
            .mutate(|state, signals| state.pager_recompute(trigger, signals))
    }

    pub fn set_totals(&self, total_items: usize) -> Result<()> {
        self.shared.mutate(|state, signals| {
            state.pager_set_totals(total_items, signals);
            Ok(())
        })
    }

    pub fn run(&self) -> Result<()> {
        self.shared.mutate(|state, signals| state.pager_run(signals))
    }

    /// Returns true if the page changed.
    pub fn move_to(&self, page: usize) -> Result<bool> {
        self.shared
            .mutate(|state, signals| state.pager_move(|pager| pager.move_to(page), signals))
    }

    pub fn move_previous(&self) -> Result<bool> {
        self.shared
            .mutate(|state, signals| state.pager_move(|pager| pager.move_previous(), signals))
    }

    pub fn move_next(&self) -> Result<bool> {
        self.shared
            .mutate(|state, signals| state.pager_move(|pager| pager.move_next(), signals))
    }

    pub fn move_first(&self) -> Result<bool> {
        self.shared
            .mutate(|state, signals| state.pager_move(|pager| pager.move_first(), signals))
    }

    pub fn move_last(&self) -> Result<bool> {
        self.shared
            .mutate(|state, signals| state.pager_move(|pager| pager.move_last(), signals))
    }
}

/// Filter facet.
pub struct FilterFacet<'a, S: DocumentStore> {
    shared: &'a Shared<S>,
}

impl<'a, S: DocumentStore> FilterFacet<'a, S> {
    pub(crate) fn new(shared: &'a Shared<S>) -> Self {
        Self { shared }
    }

    /// A copy of every slot.
    pub fn get(&self) -> FilterSet {
        self.shared.depend(Channel::Filter);
        self.shared.read(|state| state.filters.clone())
    }

    /// Applies `patch` to slot `key`; `trigger` publishes the selector and
    /// restarts pagination.
    ///
    /// Fails with `InvalidFilterKey` for an unconfigured key, changing
    /// nothing.
    pub fn set(&self, key: &str, patch: FilterPatch, trigger: bool) -> Result<()> {
        self.shared
            .mutate(|state, signals| state.filter_set(key, patch, trigger, signals))
    }

    /// The selector built from the active slots.
    pub fn selector(&self) -> Document {
        self.shared.depend(Channel::Filter);
        self.shared.read(|state| state.filters.selector())
    }

    pub fn active(&self) -> Vec<ActiveFilter> {
        self.shared.depend(Channel::Filter);
        self.shared.read(|state| state.filters.active())
    }

    pub fn is_active(&self, key: &str, value: &Value, operator: Option<&str>) -> bool {
        self.shared.depend(Channel::Filter);
        self.shared
            .read(|state| state.filters.is_active(key, value, operator))
    }

    /// Publishes the selector and returns to the first page.
    pub fn run(&self) -> Result<()> {
        self.shared.mutate(|state, signals| state.filter_run(signals))
    }

    /// Clears slot `key`, or every slot when `key` is `None`.
    pub fn clear(&self, key: Option<&str>, trigger: bool) -> Result<()> {
        self.shared
            .mutate(|state, signals| state.filter_clear(key, trigger, signals))
    }

    /// Clears one slot; removing the last active filter also clears the
    /// search criterion.
    pub fn remove(&self, key: &str) -> Result<()> {
        self.shared
            .mutate(|state, signals| state.filter_remove(key, signals))
    }

    /// Clears the search and all filters.
    pub fn reset(&self) -> Result<()> {
        self.shared.mutate(|state, signals| state.filter_reset(signals))
    }
}

/// Search facet.
pub struct SearchFacet<'a, S: DocumentStore> {
    shared: &'a Shared<S>,
}

impl<'a, S: DocumentStore> SearchFacet<'a, S> {
    pub(crate) fn new(shared: &'a Shared<S>) -> Self {
        Self { shared }
    }

    /// Optional searchable fields, plus the required ones when `full`.
    pub fn fields(&self, full: bool) -> Vec<SearchField> {
        self.shared.depend(Channel::Search);
        self.shared.read(|state| state.search.fields(full))
    }

    pub fn criteria(&self) -> String {
        self.shared.depend(Channel::Search);
        self.shared.read(|state| state.search.criteria().to_string())
    }

    /// Enables or disables an optional searchable field.
    pub fn toggle_field(&self, key: &str) {
        // Toggling cannot fail.
        let _ = self.shared.mutate(|state, signals| {
            state.search_toggle(key, signals);
            Ok(())
        });
    }

    /// Sets the criterion on every enabled searchable filter. An empty
    /// criterion is ignored. `trigger` returns to the first page.
    pub fn set_criteria(&self, value: &str, trigger: bool) -> Result<()> {
        self.shared
            .mutate(|state, signals| state.search_set_criteria(value, trigger, signals))
    }

    pub fn run(&self) -> Result<()> {
        self.shared.mutate(|state, signals| state.search_run(signals))
    }

    /// Clears the criterion and every filter.
    pub fn clear(&self) -> Result<()> {
        self.shared.mutate(|state, signals| state.search_clear(signals))
    }
}

/// Query facet.
pub struct QueryFacet<'a, S: DocumentStore> {
    shared: &'a Shared<S>,
}

impl<'a, S: DocumentStore> QueryFacet<'a, S> {
    pub(crate) fn new(shared: &'a Shared<S>) -> Self {
        Self { shared }
    }

    /// A copy of the canonical descriptor.
    pub fn get(&self) -> Result<QueryDescriptor> {
        self.shared.depend(Channel::Query);
        self.shared.read(|state| state.composer.get())
    }

    /// The canonical descriptor as extended JSON.
    pub fn serialized(&self) -> String {
        self.shared.depend(Channel::Query);
        self.shared
            .read(|state| state.composer.serialized().to_string())
    }

    /// Replaces the canonical descriptor.
    pub fn set(&self, descriptor: &QueryDescriptor) -> Result<()> {
        self.shared.mutate(|state, signals| {
            state.composer.set(descriptor)?;
            signals.raise(Channel::Query);
            Ok(())
        })
    }

    /// Forces a resubscription with unchanged selector and options.
    pub fn update_results(&self) -> Result<()> {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);
        self.shared
            .mutate(|state, signals| state.update_results(now_ms, signals))
    }

    /// Reads the current results from the store.
    ///
    /// Skip and limit are never passed on; the subscription already bounds
    /// what is available locally.
    pub fn results(&self) -> S::Cursor {
        self.shared.depend(Channel::Query);
        let tag = self
            .shared
            .use_filter_data_only
            .then_some(self.shared.results_channel.as_str());
        let query = self.shared.read(|state| state.draft.results_query(tag));
        let query = rewrite(&self.shared.hooks.before_results, query);
        let cursor = self
            .shared
            .backend
            .store
            .find(&query.selector, &query.options.to_document());
        match &self.shared.hooks.after_results {
            Some(hook) => hook(cursor),
            None => cursor,
        }
    }
}
