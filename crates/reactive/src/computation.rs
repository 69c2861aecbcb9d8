//! Reactive computations.
//!
//! A `Computation` wraps a closure that is re-executed whenever one of the
//! dependencies it read during its last run reports a change.

use crate::tracker::TrackerInner;
use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use core::cell::{Cell, RefCell};

/// Unique identifier for a computation within one tracker.
pub type ComputationId = u64;

/// Body of a computation. It receives its own handle so it can inspect
/// `is_first_run()` or stop itself.
pub type ComputationFn = Box<dyn FnMut(&Computation)>;

pub(crate) struct ComputationInner {
    id: ComputationId,
    func: RefCell<Option<ComputationFn>>,
    invalidated: Cell<bool>,
    stopped: Cell<bool>,
    first_run: Cell<bool>,
    tracker: Weak<TrackerInner>,
}

/// Handle to a running reactive computation.
///
/// Cloning the handle does not clone the computation; all clones refer to
/// the same closure and state.
#[derive(Clone)]
pub struct Computation {
    inner: Rc<ComputationInner>,
}

impl Computation {
    pub(crate) fn new(id: ComputationId, func: ComputationFn, tracker: Weak<TrackerInner>) -> Self {
        Self {
            inner: Rc::new(ComputationInner {
                id,
                func: RefCell::new(Some(func)),
                invalidated: Cell::new(false),
                stopped: Cell::new(false),
                first_run: Cell::new(true),
                tracker,
            }),
        }
    }

    pub(crate) fn from_inner(inner: Rc<ComputationInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<ComputationInner> {
        Rc::downgrade(&self.inner)
    }

    /// Returns the computation ID.
    #[inline]
    pub fn id(&self) -> ComputationId {
        self.inner.id
    }

    /// Returns true while the computation is executing for the first time.
    #[inline]
    pub fn is_first_run(&self) -> bool {
        self.inner.first_run.get()
    }

    /// Returns true if the computation is waiting to be re-run.
    #[inline]
    pub fn is_invalidated(&self) -> bool {
        self.inner.invalidated.get()
    }

    /// Returns true once the computation has been stopped.
    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.get()
    }

    /// Schedules the computation for re-execution.
    ///
    /// Invalidating an already invalidated or stopped computation is a
    /// no-op, so several changes before the next flush coalesce into one run.
    pub fn invalidate(&self) {
        if self.inner.invalidated.get() || self.inner.stopped.get() {
            return;
        }
        self.inner.invalidated.set(true);
        if let Some(tracker) = self.inner.tracker.upgrade() {
            tracker.schedule(self.clone());
        }
    }

    /// Stops the computation permanently. Safe to call more than once.
    pub fn stop(&self) {
        if self.inner.stopped.replace(true) {
            return;
        }
        // Dropped here unless the closure is currently running; `run` drops
        // it on return in that case.
        self.inner.func.borrow_mut().take();
    }

    pub(crate) fn clear_invalidated(&self) {
        self.inner.invalidated.set(false);
    }

    /// Executes the closure once, with this computation as the current one.
    pub(crate) fn run(&self, tracker: &TrackerInner) {
        self.inner.invalidated.set(false);
        if self.inner.stopped.get() {
            return;
        }
        // Taken out so the closure may freely re-enter the tracker.
        let Some(mut func) = self.inner.func.borrow_mut().take() else {
            return;
        };

        tracker.push_current(Some(self.clone()));
        func(self);
        tracker.pop_current();

        self.inner.first_run.set(false);
        if !self.inner.stopped.get() {
            *self.inner.func.borrow_mut() = Some(func);
        }
    }
}

impl core::fmt::Debug for Computation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Computation")
            .field("id", &self.inner.id)
            .field("invalidated", &self.inner.invalidated.get())
            .field("stopped", &self.inner.stopped.get())
            .finish()
    }
}
