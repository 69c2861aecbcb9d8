//! Interfaces of the external collaborators: the subscription transport,
//! the document store and the count store.

use hashbrown::HashMap;
use sieve_core::Document;
use sieve_query::QueryDescriptor;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Error reported by the transport for one subscription.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubscriptionError {
    pub message: String,
}

impl SubscriptionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for SubscriptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Subscription error: {}", self.message)
    }
}

impl std::error::Error for SubscriptionError {}

/// What a subscription hook is told about the subscription it concerns.
#[derive(Clone, Debug, PartialEq)]
pub struct SubscriptionContext {
    /// Transport channel, `<name>-results` or `<name>-count`
    pub channel: String,
    /// Descriptor the subscription was opened with
    pub query: QueryDescriptor,
}

/// A live feed opened by the transport.
pub trait SubscriptionHandle {
    /// Returns true once the initial data set has arrived.
    fn ready(&self) -> bool;

    /// Ends the feed. Must be safe to call more than once.
    fn stop(&self);
}

/// Callbacks the transport invokes for one subscription.
pub struct SubscribeCallbacks {
    /// Call when the subscription becomes ready, and again whenever the
    /// data it publishes changes.
    pub on_ready: Box<dyn Fn()>,
    pub on_error: Box<dyn Fn(SubscriptionError)>,
}

/// Publish/subscribe transport.
///
/// Callbacks may be invoked from inside `subscribe` or at any later point
/// from the caller's event loop, but never from another thread.
pub trait Transport {
    fn subscribe(
        &self,
        channel: &str,
        query: &QueryDescriptor,
        callbacks: SubscribeCallbacks,
    ) -> Box<dyn SubscriptionHandle>;
}

/// The document store results are read from.
pub trait DocumentStore {
    /// Live cursor or materialized result set.
    type Cursor;

    /// Name used when the settings do not give one.
    fn name(&self) -> &str;

    /// Runs `selector` with `options` (`sort`, `skip`, `limit`).
    fn find(&self, selector: &Document, options: &Document) -> Self::Cursor;
}

/// The store the count subscription publishes its `{count}` document into.
pub trait CountStore {
    fn find_one(&self) -> Option<Document>;
}

/// Name of the count store for the collection `name`.
pub fn count_store_name(name: &str) -> String {
    format!("{}CountFC", name)
}

/// Instance-scoped registry of count stores, so collections sharing a name
/// share one store.
pub struct CountStoreRegistry<C> {
    stores: RefCell<HashMap<String, Rc<C>>>,
}

impl<C> Default for CountStoreRegistry<C> {
    fn default() -> Self {
        Self {
            stores: RefCell::new(HashMap::new()),
        }
    }
}

impl<C> CountStoreRegistry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the count store of collection `name`, creating it with
    /// `create` (called with the store name) on first use.
    pub fn get_or_insert_with(&self, name: &str, create: impl FnOnce(&str) -> C) -> Rc<C> {
        let store_name = count_store_name(name);
        let mut stores = self.stores.borrow_mut();
        if let Some(store) = stores.get(&store_name) {
            return store.clone();
        }
        let store = Rc::new(create(&store_name));
        stores.insert(store_name, store.clone());
        store
    }

    pub fn get(&self, name: &str) -> Option<Rc<C>> {
        self.stores.borrow().get(&count_store_name(name)).cloned()
    }

    pub fn len(&self) -> usize {
        self.stores.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_store_name() {
        assert_eq!(count_store_name("tasks"), "tasksCountFC");
    }

    #[test]
    fn test_registry_shares_by_name() {
        let registry: CountStoreRegistry<String> = CountStoreRegistry::new();
        let a = registry.get_or_insert_with("tasks", |name| name.to_string());
        let b = registry.get_or_insert_with("tasks", |_| "other".to_string());
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(a.as_str(), "tasksCountFC");

        registry.get_or_insert_with("users", |name| name.to_string());
        assert_eq!(registry.len(), 2);
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_subscription_error_display() {
        let err = SubscriptionError::new("denied");
        assert_eq!(err.to_string(), "Subscription error: denied");
    }
}
