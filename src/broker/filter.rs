use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::subscriber::Subscriber;
use crate::utils::error::FilterError;

type FilterFn = dyn Fn(&Subscriber, &Value) -> Result<bool, FilterError> + Send + Sync;

/// Per-field predicates deciding whether a subscriber receives an event.
///
/// A field without a registered filter broadcasts to all of its
/// subscribers. Predicates are evaluated once per (subscriber, event) pair
/// right before resolution and must not mutate either input; a `false` or
/// an error skips the subscriber for this event only, it stays registered.
#[derive(Default, Clone)]
pub struct FilterRegistry {
    filters: HashMap<String, Arc<FilterFn>>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the predicate for a subscription field, replacing any
    /// previous one.
    pub fn register<F>(&mut self, field_name: impl Into<String>, filter: F)
    where
        F: Fn(&Subscriber, &Value) -> Result<bool, FilterError> + Send + Sync + 'static,
    {
        self.filters.insert(field_name.into(), Arc::new(filter));
    }

    /// Should `subscriber` receive the event carrying `root`?
    pub fn should_broadcast(
        &self,
        subscriber: &Subscriber,
        root: &Value,
    ) -> Result<bool, FilterError> {
        match self.filters.get(&subscriber.field_name) {
            Some(filter) => filter(subscriber, root),
            None => Ok(true),
        }
    }
}

impl std::fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("fields", &self.filters.keys().collect::<Vec<_>>())
            .finish()
    }
}
