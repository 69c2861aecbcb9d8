//! Optional callbacks around subscribing and reading results.

use crate::transport::{SubscriptionContext, SubscriptionError};
use sieve_query::QueryDescriptor;
use std::fmt;

/// Rewrites a query; `None` keeps the query unchanged.
pub type QueryHook = Box<dyn Fn(&QueryDescriptor) -> Option<QueryDescriptor>>;

/// Told about a subscription's readiness (`None`) or failure.
pub type SubscribeHook = Box<dyn Fn(Option<&SubscriptionError>, &SubscriptionContext)>;

/// Rewrites the cursor returned by the store.
pub type ResultsHook<C> = Box<dyn Fn(C) -> C>;

/// Callback hooks; each is called only when set.
pub struct Hooks<C> {
    pub(crate) before_subscribe: Option<QueryHook>,
    pub(crate) after_subscribe: Option<SubscribeHook>,
    pub(crate) before_subscribe_count: Option<QueryHook>,
    pub(crate) after_subscribe_count: Option<SubscribeHook>,
    pub(crate) before_results: Option<QueryHook>,
    pub(crate) after_results: Option<ResultsHook<C>>,
}

impl<C> Default for Hooks<C> {
    fn default() -> Self {
        Self {
            before_subscribe: None,
            after_subscribe: None,
            before_subscribe_count: None,
            after_subscribe_count: None,
            before_results: None,
            after_results: None,
        }
    }
}

impl<C> Hooks<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn before_subscribe(
        mut self,
        hook: impl Fn(&QueryDescriptor) -> Option<QueryDescriptor> + 'static,
    ) -> Self {
        self.before_subscribe = Some(Box::new(hook));
        self
    }

    pub fn after_subscribe(
        mut self,
        hook: impl Fn(Option<&SubscriptionError>, &SubscriptionContext) + 'static,
    ) -> Self {
        self.after_subscribe = Some(Box::new(hook));
        self
    }

    pub fn before_subscribe_count(
        mut self,
        hook: impl Fn(&QueryDescriptor) -> Option<QueryDescriptor> + 'static,
    ) -> Self {
        self.before_subscribe_count = Some(Box::new(hook));
        self
    }

    pub fn after_subscribe_count(
        mut self,
        hook: impl Fn(Option<&SubscriptionError>, &SubscriptionContext) + 'static,
    ) -> Self {
        self.after_subscribe_count = Some(Box::new(hook));
        self
    }

    pub fn before_results(
        mut self,
        hook: impl Fn(&QueryDescriptor) -> Option<QueryDescriptor> + 'static,
    ) -> Self {
        self.before_results = Some(Box::new(hook));
        self
    }

    pub fn after_results(mut self, hook: impl Fn(C) -> C + 'static) -> Self {
        self.after_results = Some(Box::new(hook));
        self
    }
}

impl<C> fmt::Debug for Hooks<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("before_subscribe", &self.before_subscribe.is_some())
            .field("after_subscribe", &self.after_subscribe.is_some())
            .field("before_subscribe_count", &self.before_subscribe_count.is_some())
            .field("after_subscribe_count", &self.after_subscribe_count.is_some())
            .field("before_results", &self.before_results.is_some())
            .field("after_results", &self.after_results.is_some())
            .finish()
    }
}

pub(crate) fn rewrite(hook: &Option<QueryHook>, query: QueryDescriptor) -> QueryDescriptor {
    match hook {
        Some(hook) => hook(&query).unwrap_or(query),
        None => query,
    }
}

pub(crate) fn notify(
    hook: &Option<SubscribeHook>,
    error: Option<&SubscriptionError>,
    context: &SubscriptionContext,
) {
    if let Some(hook) = hook {
        hook(error, context);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sieve_core::Document;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_rewrite_keeps_query_on_none() {
        let hooks: Hooks<()> = Hooks::new().before_subscribe(|_| None);
        let query = QueryDescriptor::default();
        assert_eq!(rewrite(&hooks.before_subscribe, query.clone()), query);
        assert_eq!(rewrite(&hooks.before_results, query.clone()), query);
    }

    #[test]
    fn test_rewrite_replaces_query() {
        let hooks: Hooks<()> = Hooks::new().before_subscribe(|q| {
            let mut q = q.clone();
            q.selector = Document::new().with("owner", "me");
            Some(q)
        });
        let rewritten = rewrite(&hooks.before_subscribe, QueryDescriptor::default());
        assert!(rewritten.selector.contains_key("owner"));
    }

    #[test]
    fn test_notify_only_when_set() {
        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();
        let hooks: Hooks<()> = Hooks::new().after_subscribe(move |err, _| {
            assert!(err.is_none());
            calls_clone.set(calls_clone.get() + 1);
        });
        let context = SubscriptionContext {
            channel: "tasks-results".into(),
            query: QueryDescriptor::default(),
        };
        notify(&hooks.after_subscribe, None, &context);
        notify(&hooks.after_subscribe_count, None, &context);
        assert_eq!(calls.get(), 1);
    }
}
