//! Invalidation channels of a collection.

use core::fmt;

/// One named invalidation signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    /// The canonical query descriptor changed
    Query,
    Sort,
    Pager,
    Filter,
    Search,
    /// Raised once, when results and count are first both ready
    InitialReady,
    /// A subscription became ready or its published data changed
    Subscriptions,
}

impl Channel {
    /// Every channel, in declaration order.
    pub const ALL: [Channel; 7] = [
        Channel::Query,
        Channel::Sort,
        Channel::Pager,
        Channel::Filter,
        Channel::Search,
        Channel::InitialReady,
        Channel::Subscriptions,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Channel::Query => "query",
            Channel::Sort => "sort",
            Channel::Pager => "pager",
            Channel::Filter => "filter",
            Channel::Search => "search",
            Channel::InitialReady => "initial_ready",
            Channel::Subscriptions => "subscriptions",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Channels raised by one mutation, fired together once it completes.
#[derive(Debug, Default)]
pub(crate) struct Signals {
    raised: Vec<Channel>,
}

impl Signals {
    pub(crate) fn raise(&mut self, channel: Channel) {
        if !self.raised.contains(&channel) {
            self.raised.push(channel);
        }
    }

    pub(crate) fn contains(&self, channel: Channel) -> bool {
        self.raised.contains(&channel)
    }

    pub(crate) fn drain(&mut self) -> std::vec::Drain<'_, Channel> {
        self.raised.drain(..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_names() {
        assert_eq!(Channel::InitialReady.to_string(), "initial_ready");
        assert_eq!(Channel::ALL.len(), 7);
    }

    #[test]
    fn test_signals_dedup() {
        let mut signals = Signals::default();
        signals.raise(Channel::Query);
        signals.raise(Channel::Pager);
        signals.raise(Channel::Query);
        assert!(signals.contains(Channel::Pager));
        assert_eq!(signals.drain().collect::<Vec<_>>(), vec![Channel::Query, Channel::Pager]);
    }
}
