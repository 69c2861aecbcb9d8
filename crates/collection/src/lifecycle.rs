//! Subscription lifecycle.
//!
//! One reactive computation per running collection. On its first run it
//! publishes the initial sort, paging and selector; on every run it reads the
//! canonical query, opens or reuses the results and count subscriptions,
//! forwards the published count to the pager and raises the initial-ready
//! signal the first time both subscriptions are ready.

use crate::channel::Channel;
use crate::collection::Shared;
use crate::hooks::{notify, rewrite, SubscribeHook};
use crate::transport::{
    DocumentStore, SubscribeCallbacks, SubscriptionContext, SubscriptionError, SubscriptionHandle,
};
use sieve_core::Value;
use sieve_query::QueryDescriptor;
use sieve_reactive::Computation;
use std::rc::{Rc, Weak};
use tracing::{debug, trace, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Feed {
    Results,
    Count,
}

/// One open subscription and the query it was opened for.
struct ActiveSubscription {
    key: String,
    context: SubscriptionContext,
    handle: Box<dyn SubscriptionHandle>,
    /// Whether the after-subscribe hook has seen this one ready.
    reported: bool,
}

#[derive(Default)]
pub(crate) struct Lifecycle {
    computation: Option<Computation>,
    results: Option<ActiveSubscription>,
    count: Option<ActiveSubscription>,
}

impl Lifecycle {
    fn feed_mut(&mut self, feed: Feed) -> &mut Option<ActiveSubscription> {
        match feed {
            Feed::Results => &mut self.results,
            Feed::Count => &mut self.count,
        }
    }
}

impl<S: DocumentStore + 'static> Shared<S> {
    pub(crate) fn start(this: &Rc<Self>) {
        if this.is_running() {
            return;
        }
        debug!(collection = %this.name, "Lifecycle starting");
        let weak = Rc::downgrade(this);
        // The first run registers the computation itself, so a `start` or
        // `stop` issued from a hook during that run sees it.
        this.tracker.autorun(move |computation| {
            if let Some(shared) = weak.upgrade() {
                shared.run_lifecycle(computation);
            }
        });
    }

    pub(crate) fn is_running(&self) -> bool {
        self.lifecycle
            .borrow()
            .computation
            .as_ref()
            .map(|c| !c.is_stopped())
            .unwrap_or(false)
    }

    pub(crate) fn stop(&self) {
        let (computation, results, count) = {
            let mut lifecycle = self.lifecycle.borrow_mut();
            (
                lifecycle.computation.take(),
                lifecycle.results.take(),
                lifecycle.count.take(),
            )
        };
        if let Some(computation) = computation {
            computation.stop();
            debug!(collection = %self.name, "Lifecycle stopped");
        }
        for subscription in results.into_iter().chain(count) {
            subscription.handle.stop();
            debug!(channel = %subscription.context.channel, "Subscription stopped");
        }
    }

    fn run_lifecycle(self: Rc<Self>, computation: &Computation) {
        if computation.is_first_run() {
            self.lifecycle.borrow_mut().computation = Some(computation.clone());
        }
        if let Err(err) = self.mutate(|state, signals| state.bootstrap(signals)) {
            warn!(collection = %self.name, error = %err, "Initial query could not be published");
        }

        self.channels.depend(&Channel::Query, Some(computation));
        self.channels
            .depend(&Channel::Subscriptions, Some(computation));

        let query = match self.read(|state| state.composer.get()) {
            Ok(query) => query,
            Err(err) => {
                warn!(collection = %self.name, error = %err, "Canonical query unreadable");
                return;
            }
        };

        let query = rewrite(&self.hooks.before_subscribe, query);
        if computation.is_stopped() {
            return;
        }
        let results_ready = self.ensure_subscription(Feed::Results, &query);

        let query = rewrite(&self.hooks.before_subscribe_count, query);
        if computation.is_stopped() {
            return;
        }
        let count_ready = self.ensure_subscription(Feed::Count, &query);
        if count_ready {
            self.apply_count();
        }

        if results_ready && count_ready && !self.initial_ready.get() {
            self.initial_ready.set(true);
            debug!(collection = %self.name, "Initial data ready");
            self.channels.changed(&Channel::InitialReady);
        }
    }

    /// Opens the feed for `query` unless the open one already serves it.
    /// Returns whether the feed is ready.
    fn ensure_subscription(self: &Rc<Self>, feed: Feed, query: &QueryDescriptor) -> bool {
        let key = match query.to_ejson() {
            Ok(key) => key,
            Err(err) => {
                warn!(collection = %self.name, error = %err, "Query could not be serialized");
                return false;
            }
        };

        let stale = {
            let mut lifecycle = self.lifecycle.borrow_mut();
            let slot = lifecycle.feed_mut(feed);
            let reuse = matches!(slot, Some(active) if active.key == key);
            if reuse {
                None
            } else {
                slot.take()
            }
        };
        if let Some(stale) = stale {
            stale.handle.stop();
            debug!(channel = %stale.context.channel, "Subscription replaced");
        }

        let needs_subscribe = self.lifecycle.borrow_mut().feed_mut(feed).is_none();
        if needs_subscribe {
            let channel = match feed {
                Feed::Results => self.results_channel.clone(),
                Feed::Count => self.count_channel.clone(),
            };
            let context = SubscriptionContext {
                channel: channel.clone(),
                query: query.clone(),
            };
            let callbacks = self.callbacks(feed, context.clone());
            let handle = self.backend.transport.subscribe(&channel, query, callbacks);
            debug!(channel = %channel, "Subscription opened");
            *self.lifecycle.borrow_mut().feed_mut(feed) = Some(ActiveSubscription {
                key,
                context,
                handle,
                reported: false,
            });
        } else {
            trace!(collection = %self.name, feed = ?feed, "Subscription reused");
        }

        let (ready, newly_ready) = {
            let mut lifecycle = self.lifecycle.borrow_mut();
            match lifecycle.feed_mut(feed) {
                Some(active) => {
                    let ready = active.handle.ready();
                    let newly_ready = (ready && !active.reported).then(|| active.context.clone());
                    if ready {
                        active.reported = true;
                    }
                    (ready, newly_ready)
                }
                // Stopped from inside `subscribe`.
                None => (false, None),
            }
        };
        if let Some(context) = newly_ready {
            notify(self.after_hook(feed), None, &context);
        }
        ready
    }

    fn callbacks(self: &Rc<Self>, feed: Feed, context: SubscriptionContext) -> SubscribeCallbacks {
        let on_ready: Weak<Self> = Rc::downgrade(self);
        let on_error: Weak<Self> = Rc::downgrade(self);
        SubscribeCallbacks {
            on_ready: Box::new(move || {
                if let Some(shared) = on_ready.upgrade() {
                    let _ = shared.mutate(|_, signals| {
                        signals.raise(Channel::Subscriptions);
                        Ok(())
                    });
                }
            }),
            on_error: Box::new(move |error: SubscriptionError| {
                if let Some(shared) = on_error.upgrade() {
                    warn!(channel = %context.channel, error = %error, "Subscription failed");
                    notify(shared.after_hook(feed), Some(&error), &context);
                }
            }),
        }
    }

    fn after_hook(&self, feed: Feed) -> &Option<SubscribeHook> {
        match feed {
            Feed::Results => &self.hooks.after_subscribe,
            Feed::Count => &self.hooks.after_subscribe_count,
        }
    }

    /// Forwards the published `{count}` to the pager.
    fn apply_count(&self) {
        let count = self
            .backend
            .count_store
            .find_one()
            .and_then(|doc| doc.get("count").and_then(count_value));
        match count {
            Some(count) => {
                let _ = self.mutate(|state, signals| {
                    state.pager_set_totals(count, signals);
                    Ok(())
                });
            }
            None => warn!(collection = %self.name, "Count document missing or malformed"),
        }
    }
}

fn count_value(value: &Value) -> Option<usize> {
    match value {
        Value::Int(n) if *n >= 0 => Some(*n as usize),
        Value::Float(f) if f.is_finite() && *f >= 0.0 => Some(*f as usize),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_value() {
        assert_eq!(count_value(&Value::Int(42)), Some(42));
        assert_eq!(count_value(&Value::Float(7.0)), Some(7));
        assert_eq!(count_value(&Value::Int(-1)), None);
        assert_eq!(count_value(&Value::Float(f64::NAN)), None);
        assert_eq!(count_value(&Value::from("3")), None);
    }
}
