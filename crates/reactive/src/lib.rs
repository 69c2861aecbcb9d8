//! Sieve Reactive - Fine-grained invalidation for the Sieve query engine.
//!
//! This crate implements the dependency core every Sieve facet is built on.
//! Reads register the running computation against a named channel; writes
//! mark the channel changed and the tracker re-runs whoever read it.
//!
//! # Core Concepts
//!
//! - `Tracker`: Owns pending work and re-runs invalidated computations
//! - `Computation`: A closure that re-executes when its dependencies change
//! - `Dependency`: A single invalidation signal (`depend` / `changed`)
//! - `ChannelSet`: A fixed set of named dependencies
//!
//! # Example
//!
//! ```rust
//! use sieve_reactive::{Dependency, Tracker};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let tracker = Tracker::new();
//! let dep = Rc::new(Dependency::new());
//! let runs = Rc::new(Cell::new(0));
//!
//! let (d, r, t) = (dep.clone(), runs.clone(), tracker.clone());
//! tracker.autorun(move |_| {
//!     d.depend(t.current().as_ref());
//!     r.set(r.get() + 1);
//! });
//!
//! dep.changed();
//! assert_eq!(runs.get(), 2);
//! ```

#![no_std]

extern crate alloc;

pub mod channel;
pub mod computation;
pub mod dependency;
pub mod tracker;

pub use channel::ChannelSet;
pub use computation::{Computation, ComputationFn, ComputationId};
pub use dependency::Dependency;
pub use tracker::{Tracker, MAX_RERUNS_PER_FLUSH};
