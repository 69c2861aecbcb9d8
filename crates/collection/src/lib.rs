//! Sieve Collection - reactive filtered, sorted and paged collections.
//!
//! A [`FilterCollection`] combines the sort, pager, filter and search
//! engines of `sieve-query` into one canonical query descriptor and keeps a
//! results subscription and a count subscription in step with it.
//!
//! - `collection`: the collection handle and its renderable view
//! - `facet`: per-facet operations (`sort`, `pager`, `filter`, `search`, `query`)
//! - `config`: settings, loadable from JSON
//! - `hooks`: optional callbacks around subscribing and reading
//! - `transport`: traits for the subscription transport and the stores
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use sieve_collection::{
//!     Backend, CountStore, DocumentStore, FilterCollection, Hooks, Settings,
//!     SubscribeCallbacks, SubscriptionHandle, Transport,
//! };
//! use sieve_core::Document;
//! use sieve_query::{FilterPatch, FilterSlot, QueryDescriptor};
//!
//! struct Store;
//! impl DocumentStore for Store {
//!     type Cursor = Vec<Document>;
//!     fn name(&self) -> &str { "tasks" }
//!     fn find(&self, _: &Document, _: &Document) -> Vec<Document> { Vec::new() }
//! }
//!
//! struct Counts;
//! impl CountStore for Counts {
//!     fn find_one(&self) -> Option<Document> {
//!         Some(Document::new().with("count", 42i64))
//!     }
//! }
//!
//! struct Ready;
//! impl SubscriptionHandle for Ready {
//!     fn ready(&self) -> bool { true }
//!     fn stop(&self) {}
//! }
//!
//! struct Local;
//! impl Transport for Local {
//!     fn subscribe(&self, _: &str, _: &QueryDescriptor, _: SubscribeCallbacks) -> Box<dyn SubscriptionHandle> {
//!         Box::new(Ready)
//!     }
//! }
//!
//! let settings = Settings::new("tasks").filter("status", FilterSlot::new("Status"));
//! let backend = Backend { store: Store, count_store: Rc::new(Counts), transport: Rc::new(Local) };
//! let tasks = FilterCollection::new(settings, backend, Hooks::new()).unwrap();
//!
//! assert!(tasks.ready());
//! assert_eq!(tasks.pager().get().total_pages, 5);
//!
//! tasks.filter().set("status", FilterPatch::value("open"), true).unwrap();
//! assert_eq!(tasks.query().get().unwrap().selector.len(), 1);
//! ```

mod channel;
mod collection;
pub mod config;
pub mod facet;
pub mod hooks;
mod lifecycle;
mod state;
pub mod transport;

pub use channel::Channel;
pub use collection::{Backend, CollectionView, FilterCollection};
pub use config::{PagerSettings, Settings, SortSettings};
pub use facet::{FilterFacet, PagerFacet, QueryFacet, SearchFacet, SortFacet};
pub use hooks::{Hooks, QueryHook, ResultsHook, SubscribeHook};
pub use sieve_core::{Error, Result};
pub use transport::{
    count_store_name, CountStore, CountStoreRegistry, DocumentStore, SubscribeCallbacks,
    SubscriptionContext, SubscriptionError, SubscriptionHandle, Transport,
};
