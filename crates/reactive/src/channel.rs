//! Named invalidation channels.

use crate::computation::Computation;
use crate::dependency::Dependency;
use core::hash::Hash;
use hashbrown::HashMap;

/// A fixed set of named `Dependency` channels.
///
/// Channels are declared up front; depending on or changing an undeclared
/// channel is a no-op.
pub struct ChannelSet<K> {
    channels: HashMap<K, Dependency>,
}

impl<K: Hash + Eq> ChannelSet<K> {
    /// Creates one channel per key.
    pub fn new(keys: impl IntoIterator<Item = K>) -> Self {
        Self {
            channels: keys.into_iter().map(|k| (k, Dependency::new())).collect(),
        }
    }

    /// Registers `computation` on the channel named `key`.
    pub fn depend(&self, key: &K, computation: Option<&Computation>) -> bool {
        self.channels
            .get(key)
            .map(|dep| dep.depend(computation))
            .unwrap_or(false)
    }

    /// Invalidates every observer of the channel named `key`.
    pub fn changed(&self, key: &K) {
        if let Some(dep) = self.channels.get(key) {
            dep.changed();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tracker;
    use alloc::rc::Rc;
    use core::cell::Cell;

    #[test]
    fn test_channels_are_independent() {
        let tracker = Tracker::new();
        let channels = Rc::new(ChannelSet::new(["sort", "pager"]));
        let runs = Rc::new(Cell::new(0));

        let (channels_clone, runs_clone, tracker_clone) =
            (channels.clone(), runs.clone(), tracker.clone());
        tracker.autorun(move |_| {
            channels_clone.depend(&"sort", tracker_clone.current().as_ref());
            runs_clone.set(runs_clone.get() + 1);
        });

        channels.changed(&"pager");
        assert_eq!(runs.get(), 1);
        channels.changed(&"sort");
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_unknown_channel_is_noop() {
        let channels = ChannelSet::new(["query"]);
        assert!(!channels.depend(&"filter", None));
        channels.changed(&"filter");
    }
}
