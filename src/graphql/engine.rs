use std::sync::Arc;

use serde_json::Value;

use crate::graphql::executor::{ExecutionRequest, SelectionExecutor};
use crate::graphql::response::Response;
use crate::subscriber::Subscriber;
use crate::utils::error::ResolutionError;

/// Re-executes a subscriber's stored selection against a new root value.
///
/// The engine only assembles inputs and packages outputs; actual selection
/// execution is delegated to the configured [`SelectionExecutor`]. A failure
/// here concerns exactly one subscriber and never the broadcast as a whole.
#[derive(Clone)]
pub struct ResolutionEngine {
    executor: Arc<dyn SelectionExecutor>,
}

impl ResolutionEngine {
    pub fn new(executor: Arc<dyn SelectionExecutor>) -> Self {
        Self { executor }
    }

    /// Produces this subscriber's personalized response for `root`.
    ///
    /// Partial executions (data plus a non-empty error list) still count as
    /// resolved; only total executor failure maps to `ResolutionError`.
    pub fn resolve(
        &self,
        subscriber: &Subscriber,
        root: &Value,
    ) -> Result<Response, ResolutionError> {
        let request = ExecutionRequest {
            query: &subscriber.selection_set,
            field_name: &subscriber.field_name,
            arguments: &subscriber.arguments,
            variables: &subscriber.variables,
            context: &subscriber.context,
            root,
        };
        Ok(self.executor.execute(&request)?)
    }
}

impl std::fmt::Debug for ResolutionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionEngine").finish()
    }
}
