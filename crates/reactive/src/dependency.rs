//! Invalidation signals.
//!
//! A `Dependency` remembers which computations read it and invalidates them
//! when `changed()` is called. Observers are dropped from the dependency on
//! invalidation and register again on their next run.

use crate::computation::{Computation, ComputationId, ComputationInner};
use alloc::rc::Weak;
use alloc::vec::Vec;
use core::cell::RefCell;
use hashbrown::HashMap;

/// A single invalidation signal.
#[derive(Default)]
pub struct Dependency {
    /// Computation ID -> computation that read this dependency
    dependents: RefCell<HashMap<ComputationId, Weak<ComputationInner>>>,
}

impl Dependency {
    /// Creates a new dependency with no observers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `computation` as an observer.
    ///
    /// Passing `None` (no computation running) is a no-op. Returns true if
    /// the computation was not already registered.
    pub fn depend(&self, computation: Option<&Computation>) -> bool {
        let Some(computation) = computation else {
            return false;
        };
        if computation.is_stopped() {
            return false;
        }
        self.dependents
            .borrow_mut()
            .insert(computation.id(), computation.downgrade())
            .is_none()
    }

    /// Invalidates every current observer.
    pub fn changed(&self) {
        // Drained first: invalidation may re-run observers synchronously and
        // they register here again.
        let observers: Vec<_> = self.dependents.borrow_mut().drain().map(|(_, w)| w).collect();
        for observer in observers {
            if let Some(inner) = observer.upgrade() {
                Computation::from_inner(inner).invalidate();
            }
        }
    }

    /// Number of live, non-stopped observers.
    #[cfg(test)]
    pub(crate) fn dependent_count(&self) -> usize {
        self.dependents
            .borrow()
            .values()
            .filter_map(Weak::upgrade)
            .filter(|inner| !Computation::from_inner(inner.clone()).is_stopped())
            .count()
    }
}
