//! The reactive collection facade.

use crate::channel::{Channel, Signals};
use crate::config::Settings;
use crate::facet::{FilterFacet, PagerFacet, QueryFacet, SearchFacet, SortFacet};
use crate::hooks::Hooks;
use crate::lifecycle::Lifecycle;
use crate::state::EngineState;
use crate::transport::{CountStore, DocumentStore, Transport};
use sieve_core::{Document, Result};
use sieve_query::{ActiveFilter, FilterSet, PagerState, SearchField};
use sieve_reactive::{ChannelSet, Tracker};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{trace, warn};

/// The external collaborators of a collection.
pub struct Backend<S> {
    /// Store the results are read from
    pub store: S,
    /// Store the count subscription publishes into
    pub count_store: Rc<dyn CountStore>,
    pub transport: Rc<dyn Transport>,
}

/// State shared between the collection handle and its lifecycle.
pub(crate) struct Shared<S: DocumentStore> {
    pub(crate) name: String,
    pub(crate) results_channel: String,
    pub(crate) count_channel: String,
    pub(crate) use_filter_data_only: bool,
    pub(crate) tracker: Tracker,
    pub(crate) channels: ChannelSet<Channel>,
    pub(crate) state: RefCell<EngineState>,
    pub(crate) backend: Backend<S>,
    pub(crate) hooks: Hooks<S::Cursor>,
    pub(crate) lifecycle: RefCell<Lifecycle>,
    pub(crate) initial_ready: Cell<bool>,
}

impl<S: DocumentStore> Shared<S> {
    /// Registers the running computation, if any, on `channel`.
    pub(crate) fn depend(&self, channel: Channel) {
        self.channels
            .depend(&channel, self.tracker.current().as_ref());
    }

    /// Runs one logical operation: state changes happen inside a single
    /// batch and the touched channels fire once the borrow is released.
    pub(crate) fn mutate<R>(
        &self,
        op: impl FnOnce(&mut EngineState, &mut Signals) -> Result<R>,
    ) -> Result<R> {
        let result = self.tracker.batch(|| {
            let mut signals = Signals::default();
            let result = op(&mut self.state.borrow_mut(), &mut signals);
            if signals.contains(Channel::Query) {
                trace!(
                    collection = %self.name,
                    query = %self.state.borrow().composer.serialized(),
                    "Query updated"
                );
            }
            for channel in signals.drain() {
                self.channels.changed(&channel);
            }
            result
        });
        if let Some(err) = self.tracker.take_error() {
            warn!(collection = %self.name, error = %err, "Reactive flush aborted");
        }
        result
    }

    /// Reads engine state without registering any dependency.
    pub(crate) fn read<R>(&self, f: impl FnOnce(&EngineState) -> R) -> R {
        f(&self.state.borrow())
    }
}

/// A live, filtered, sorted and paged view over one document collection.
///
/// Reads register the calling computation of [`FilterCollection::tracker`]
/// on the channel they depend on; mutators re-run the affected computations
/// synchronously before they return.
pub struct FilterCollection<S: DocumentStore + 'static> {
    pub(crate) shared: Rc<Shared<S>>,
}

impl<S: DocumentStore + 'static> FilterCollection<S> {
    /// Creates a collection. Nothing is subscribed until [`start`] or
    /// [`ready`] is called.
    ///
    /// [`start`]: FilterCollection::start
    /// [`ready`]: FilterCollection::ready
    pub fn new(settings: Settings, backend: Backend<S>, hooks: Hooks<S::Cursor>) -> Result<Self> {
        let state = EngineState::new(&settings)?;
        let name = if settings.name.is_empty() {
            backend.store.name().to_string()
        } else {
            settings.name.clone()
        };
        Ok(Self {
            shared: Rc::new(Shared {
                results_channel: format!("{}-results", name),
                count_channel: format!("{}-count", name),
                name,
                use_filter_data_only: settings.use_filter_data_only,
                tracker: Tracker::new(),
                channels: ChannelSet::new(Channel::ALL),
                state: RefCell::new(state),
                backend,
                hooks,
                lifecycle: RefCell::new(Lifecycle::default()),
                initial_ready: Cell::new(false),
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// The scheduler reads register against.
    pub fn tracker(&self) -> &Tracker {
        &self.shared.tracker
    }

    pub fn sort(&self) -> SortFacet<'_, S> {
        SortFacet::new(&self.shared)
    }

    pub fn pager(&self) -> PagerFacet<'_, S> {
        PagerFacet::new(&self.shared)
    }

    pub fn filter(&self) -> FilterFacet<'_, S> {
        FilterFacet::new(&self.shared)
    }

    pub fn search(&self) -> SearchFacet<'_, S> {
        SearchFacet::new(&self.shared)
    }

    pub fn query(&self) -> QueryFacet<'_, S> {
        QueryFacet::new(&self.shared)
    }

    /// Starts the subscription lifecycle. Idempotent.
    pub fn start(&self) {
        Shared::start(&self.shared);
    }

    /// Stops the lifecycle and both subscriptions. Idempotent.
    pub fn stop(&self) {
        self.shared.stop();
    }

    /// Returns true while the lifecycle is running.
    pub fn is_running(&self) -> bool {
        self.shared.is_running()
    }

    /// Starts the lifecycle if needed and reports whether results and count
    /// have both been ready at least once.
    pub fn ready(&self) -> bool {
        self.start();
        self.shared.depend(Channel::InitialReady);
        self.shared.initial_ready.get()
    }

    /// Everything a view layer renders, read reactively.
    pub fn view(&self) -> CollectionView {
        let search = self.search();
        CollectionView {
            sort: self.sort().get(),
            pager: self.pager().get(),
            filters: self.filter().get(),
            active_filters: self.filter().active(),
            search_fields: search.fields(false),
            criteria: search.criteria(),
        }
    }
}

impl<S: DocumentStore + 'static> Drop for FilterCollection<S> {
    fn drop(&mut self) {
        self.shared.stop();
    }
}

impl<S: DocumentStore + 'static> std::fmt::Debug for FilterCollection<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterCollection")
            .field("name", &self.shared.name)
            .field("running", &self.shared.is_running())
            .field("initial_ready", &self.shared.initial_ready.get())
            .finish()
    }
}

/// Snapshot of the renderable state of a collection.
#[derive(Clone, Debug)]
pub struct CollectionView {
    pub sort: Document,
    pub pager: PagerState,
    pub filters: FilterSet,
    pub active_filters: Vec<ActiveFilter>,
    pub search_fields: Vec<SearchField>,
    pub criteria: String,
}
