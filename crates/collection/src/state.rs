//! Engine state of one collection and the operations that keep the draft
//! descriptor, the engines and the canonical query consistent.
//!
//! Every operation records the channels it touched in `Signals`; the caller
//! fires them once the state borrow is released.

use crate::channel::{Channel, Signals};
use crate::config::Settings;
use sieve_core::{Error, Result};
use sieve_query::{
    FilterPatch, FilterSet, Pager, QueryComposer, QueryDescriptor, SearchState, SortEngine,
};

pub(crate) struct EngineState {
    pub(crate) sort: SortEngine,
    pub(crate) pager: Pager,
    pub(crate) filters: FilterSet,
    pub(crate) search: SearchState,
    /// Working copy every engine writes into before it is published.
    pub(crate) draft: QueryDescriptor,
    pub(crate) composer: QueryComposer,
    pub(crate) initialized: bool,
}

impl EngineState {
    pub(crate) fn new(settings: &Settings) -> Result<Self> {
        settings.validate()?;
        let filters = settings.filters.clone();
        let search = SearchState::from_filters(&filters);
        Ok(Self {
            sort: settings.sort_engine()?,
            pager: Pager::new(settings.pager_config()),
            filters,
            search,
            draft: QueryDescriptor::default(),
            composer: QueryComposer::new(),
            initialized: false,
        })
    }

    /// Publishes the draft as the canonical descriptor.
    pub(crate) fn compose(&mut self, signals: &mut Signals) -> Result<()> {
        self.composer.set(&self.draft)?;
        signals.raise(Channel::Query);
        Ok(())
    }

    /// Writes the initial sort, paging and selector once.
    pub(crate) fn bootstrap(&mut self, signals: &mut Signals) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        self.draft.options.sort = self.sort.keys().to_vec();
        self.draft.options.skip = Some(self.pager.skip());
        self.draft.options.limit = Some(self.pager.limit());
        self.draft.selector = self.filters.selector();
        self.compose(signals)?;
        self.initialized = true;
        Ok(())
    }

    pub(crate) fn sort_run(&mut self, signals: &mut Signals) -> Result<()> {
        self.draft.options.sort = self.sort.keys().to_vec();
        self.compose(signals)
    }

    pub(crate) fn sort_set(
        &mut self,
        field: &str,
        direction: Option<&str>,
        trigger: bool,
        signals: &mut Signals,
    ) -> Result<()> {
        self.sort.set(field, direction)?;
        if trigger {
            self.sort_run(signals)?;
        }
        signals.raise(Channel::Sort);
        Ok(())
    }

    pub(crate) fn sort_clear(&mut self, trigger: bool, signals: &mut Signals) -> Result<()> {
        self.sort.clear();
        if trigger {
            self.sort_run(signals)?;
        }
        signals.raise(Channel::Sort);
        Ok(())
    }

    pub(crate) fn pager_run(&mut self, signals: &mut Signals) -> Result<()> {
        self.draft.options.skip = Some(self.pager.skip());
        self.draft.options.limit = Some(self.pager.limit());
        self.compose(signals)
    }

    pub(crate) fn pager_recompute(&mut self, trigger: bool, signals: &mut Signals) -> Result<()> {
        self.pager.recompute();
        if trigger {
            self.pager_run(signals)?;
        }
        signals.raise(Channel::Pager);
        Ok(())
    }

    /// Applies a navigation step; publishes only if the page changed.
    pub(crate) fn pager_move(
        &mut self,
        step: impl FnOnce(&mut Pager) -> bool,
        signals: &mut Signals,
    ) -> Result<bool> {
        if !step(&mut self.pager) {
            return Ok(false);
        }
        self.pager_recompute(true, signals)?;
        Ok(true)
    }

    pub(crate) fn pager_set_totals(&mut self, total_items: usize, signals: &mut Signals) {
        self.pager.set_totals(total_items);
        signals.raise(Channel::Pager);
    }

    /// Publishes the selector and restarts pagination.
    pub(crate) fn filter_run(&mut self, signals: &mut Signals) -> Result<()> {
        self.draft.selector = self.filters.selector();
        self.compose(signals)?;
        self.pager_move(|pager| pager.move_to(1), signals)?;
        Ok(())
    }

    pub(crate) fn filter_set(
        &mut self,
        key: &str,
        patch: FilterPatch,
        trigger: bool,
        signals: &mut Signals,
    ) -> Result<()> {
        let slot = self.filters.set(key, patch)?;
        let forced = slot
            .sort
            .clone()
            .filter(|direction| slot.is_active() && self.sort.is_legal(direction));
        if let Some(direction) = forced {
            self.sort_clear(true, signals)?;
            self.sort_set(key, Some(&direction), true, signals)?;
        }
        if trigger {
            self.filter_run(signals)?;
        }
        signals.raise(Channel::Filter);
        Ok(())
    }

    /// Clears one slot, or every slot when `key` is `None`.
    pub(crate) fn filter_clear(
        &mut self,
        key: Option<&str>,
        trigger: bool,
        signals: &mut Signals,
    ) -> Result<()> {
        match key {
            Some(key) => {
                self.filters.clear(key)?;
            }
            None => {
                self.filters.clear_all();
            }
        }
        if trigger {
            self.filter_run(signals)?;
        }
        signals.raise(Channel::Filter);
        Ok(())
    }

    /// Clears one slot; clearing the last active one also clears the search.
    pub(crate) fn filter_remove(&mut self, key: &str, signals: &mut Signals) -> Result<()> {
        if !self.filters.contains(key) {
            return Err(Error::invalid_filter_key(key));
        }
        if self.filters.active_count() == 1 {
            self.search_clear(signals)?;
        }
        self.filter_clear(Some(key), true, signals)
    }

    /// Clears the search and every filter, if any filter is active.
    pub(crate) fn filter_reset(&mut self, signals: &mut Signals) -> Result<()> {
        if self.filters.active_count() > 0 {
            self.search_clear(signals)?;
        }
        Ok(())
    }

    pub(crate) fn search_toggle(&mut self, key: &str, signals: &mut Signals) {
        self.search.toggle_field(key);
        signals.raise(Channel::Search);
    }

    pub(crate) fn search_set_criteria(
        &mut self,
        value: &str,
        trigger: bool,
        signals: &mut Signals,
    ) -> Result<()> {
        let Some(targets) = self.search.set_criteria(value) else {
            return Ok(());
        };
        for key in targets {
            self.filter_set(&key, FilterPatch::value(value), true, signals)?;
        }
        if trigger {
            self.search_run(signals)?;
        }
        signals.raise(Channel::Search);
        Ok(())
    }

    pub(crate) fn search_run(&mut self, signals: &mut Signals) -> Result<()> {
        self.pager_move(|pager| pager.move_to(1), signals)?;
        Ok(())
    }

    pub(crate) fn search_clear(&mut self, signals: &mut Signals) -> Result<()> {
        self.search.clear();
        self.filter_clear(None, true, signals)?;
        signals.raise(Channel::Search);
        Ok(())
    }

    /// Re-publishes the draft with a fresh force marker.
    pub(crate) fn update_results(&mut self, now_ms: i64, signals: &mut Signals) -> Result<()> {
        self.draft.force = Some(self.composer.next_force(now_ms));
        self.compose(signals)
    }
}
