//! Event query and mutation logic, built once at startup and shared by
//! every request handler.

mod mutation;
mod query;
pub mod transitions;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use chrono::Duration;

use crate::store::Store;
use transitions::TransitionTable;

pub use query::{AdminSearch, PublicSearch};

#[derive(Debug, Clone)]
pub struct EventRules {
    /// Owner-submitted dates must be at least this far in the future.
    pub min_lead: Duration,
    /// Publication requires the event to be at least this far away.
    pub publish_lead: Duration,
    pub transitions: TransitionTable,
}

impl Default for EventRules {
    fn default() -> Self {
        Self {
            min_lead: Duration::hours(2),
            publish_lead: Duration::hours(1),
            transitions: TransitionTable::default(),
        }
    }
}

#[derive(Clone)]
pub struct EventService {
    store: Arc<dyn Store>,
    rules: Arc<EventRules>,
}

impl EventService {
    pub fn new(store: Arc<dyn Store>, rules: EventRules) -> Self {
        Self {
            store,
            rules: Arc::new(rules),
        }
    }
}
