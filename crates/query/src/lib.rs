//! Sieve Query - the state engines behind a filtered, sorted, paged view.
//!
//! This crate provides:
//!
//! - `sort`: ordered sort keys with a direction cycle
//! - `pager`: page cursor, totals, page window and page-size choices
//! - `filter`: named filter slots and selector construction
//! - `search`: free-text criterion fanned out to searchable slots
//! - `descriptor`: the canonical query descriptor and its composer
//!
//! Everything here is plain state with no reactivity; `sieve-collection`
//! wires the engines to the dependency core.
//!
//! # Example
//!
//! ```
//! use sieve_query::filter::{FilterPatch, FilterSet, FilterSlot};
//! use sieve_query::sort::SortEngine;
//!
//! let mut filters = FilterSet::new().with("status", FilterSlot::new("Status"));
//! filters.set("status", FilterPatch::value("open")).unwrap();
//!
//! let mut sort = SortEngine::default();
//! sort.set("created", Some("desc")).unwrap();
//!
//! assert_eq!(filters.selector().len(), 1);
//! assert_eq!(sort.direction_of("created"), Some("desc"));
//! ```

#![no_std]

extern crate alloc;

pub mod descriptor;
pub mod filter;
pub mod pager;
pub mod search;
pub mod sort;

pub use descriptor::{QueryComposer, QueryDescriptor, QueryOptions, FILTER_TAG_FIELD};
pub use filter::{ActiveFilter, FilterPatch, FilterSet, FilterSlot, Operator, Searchable, Transform};
pub use pager::{PageLink, PageSizeOption, Pager, PagerConfig, PagerState, DEFAULT_PAGE_SIZES};
pub use search::{SearchField, SearchState};
pub use sort::{SortEngine, SortKey, DEFAULT_SORT_ORDER};
