//! Reactive scheduler.
//!
//! A `Tracker` owns the set of invalidated computations and re-runs them.
//! There is no ambient global: every collection creates its own tracker and
//! reads register against `Tracker::current()` explicitly.
//!
//! Scheduling discipline: re-execution is synchronous. A change outside any
//! batch flushes immediately; a change inside `Tracker::batch` is deferred
//! until the outermost batch returns, so every write made by one logical
//! operation results in at most one re-run per affected computation.

use crate::computation::{Computation, ComputationId};
use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use sieve_core::{Error, Result};

/// Upper bound on re-runs within a single flush before it is aborted.
pub const MAX_RERUNS_PER_FLUSH: usize = 1000;

pub(crate) struct TrackerInner {
    /// Stack of running computations; `None` marks a non-reactive section.
    current: RefCell<Vec<Option<Computation>>>,
    pending: RefCell<VecDeque<Computation>>,
    batch_depth: Cell<usize>,
    flushing: Cell<bool>,
    next_id: Cell<ComputationId>,
    last_error: RefCell<Option<Error>>,
}

impl TrackerInner {
    pub(crate) fn push_current(&self, computation: Option<Computation>) {
        self.current.borrow_mut().push(computation);
    }

    pub(crate) fn pop_current(&self) {
        self.current.borrow_mut().pop();
    }

    pub(crate) fn schedule(&self, computation: Computation) {
        self.pending.borrow_mut().push_back(computation);
        if self.batch_depth.get() == 0 {
            // Outcome is kept in `last_error`.
            let _ = self.flush();
        }
    }

    fn flush(&self) -> Result<usize> {
        if self.flushing.get() {
            return Ok(0);
        }
        self.flushing.set(true);

        let mut reruns = 0;
        let outcome = loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some(computation) = next else {
                break Ok(reruns);
            };
            if computation.is_stopped() || !computation.is_invalidated() {
                continue;
            }
            if reruns >= MAX_RERUNS_PER_FLUSH {
                computation.clear_invalidated();
                for abandoned in self.pending.borrow_mut().drain(..) {
                    abandoned.clear_invalidated();
                }
                break Err(Error::reactive_loop(reruns));
            }
            computation.run(self);
            reruns += 1;
        };

        self.flushing.set(false);
        if let Err(err) = &outcome {
            *self.last_error.borrow_mut() = Some(err.clone());
        }
        outcome
    }
}

/// Reactive scheduler handle. Clones share the same scheduler.
#[derive(Clone)]
pub struct Tracker {
    inner: Rc<TrackerInner>,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Tracker {
    /// Creates a new tracker with no computations.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(TrackerInner {
                current: RefCell::new(Vec::new()),
                pending: RefCell::new(VecDeque::new()),
                batch_depth: Cell::new(0),
                flushing: Cell::new(false),
                next_id: Cell::new(1),
                last_error: RefCell::new(None),
            }),
        }
    }

    /// Creates a computation and runs it once immediately.
    ///
    /// The closure re-runs whenever a dependency it read is changed.
    pub fn autorun<F>(&self, func: F) -> Computation
    where
        F: FnMut(&Computation) + 'static,
    {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);

        let computation = Computation::new(id, Box::new(func), Rc::downgrade(&self.inner));
        // The first run counts as a batch so that changes it makes are
        // picked up by a flush after it returns, not from inside it.
        self.batch(|| computation.run(&self.inner));
        computation
    }

    /// Returns the computation currently executing, if any.
    pub fn current(&self) -> Option<Computation> {
        self.inner.current.borrow().last().cloned().flatten()
    }

    /// Returns true while a computation is executing.
    pub fn is_active(&self) -> bool {
        self.current().is_some()
    }

    /// Runs `f` with re-execution deferred until the outermost batch ends.
    pub fn batch<R>(&self, f: impl FnOnce() -> R) -> R {
        self.inner.batch_depth.set(self.inner.batch_depth.get() + 1);
        let result = f();
        let depth = self.inner.batch_depth.get() - 1;
        self.inner.batch_depth.set(depth);
        if depth == 0 {
            let _ = self.inner.flush();
        }
        result
    }

    /// Re-runs every invalidated computation now.
    ///
    /// Returns the number of re-runs, or `Error::ReactiveLoop` when the
    /// flush did not converge within `MAX_RERUNS_PER_FLUSH` re-runs.
    pub fn flush(&self) -> Result<usize> {
        self.inner.flush()
    }

    /// Returns true while a batch is open.
    pub fn in_batch(&self) -> bool {
        self.inner.batch_depth.get() > 0
    }

    #[cfg(test)]
    fn pending_count(&self) -> usize {
        self.inner.pending.borrow().len()
    }

    /// Takes the error recorded by the last aborted automatic flush.
    pub fn take_error(&self) -> Option<Error> {
        self.inner.last_error.borrow_mut().take()
    }
}
