use serde_json::{Map, Value};

use crate::graphql::response::Response;
use crate::utils::error::ExecutorError;

/// Everything an executor needs to re-run a stored selection: the captured
/// subscribe-time state plus the root value produced by the triggering
/// write.
#[derive(Debug, Clone)]
pub struct ExecutionRequest<'a> {
    pub query: &'a str,
    pub field_name: &'a str,
    pub arguments: &'a Value,
    pub variables: &'a Map<String, Value>,
    pub context: &'a Value,
    pub root: &'a Value,
}

/// The external query-executor collaborator.
///
/// Implementations resolve `request.query` against `request.root`, using the
/// captured variables and context as the execution environment. Field-level
/// errors are reported inside the returned [`Response`]; `Err` means the
/// execution failed as a whole.
pub trait SelectionExecutor: Send + Sync {
    fn execute(&self, request: &ExecutionRequest<'_>) -> Result<Response, ExecutorError>;
}

/// Executor for local development and tests: hands the root value back as
/// the resolved field value, unshaped.
#[derive(Debug, Default, Clone)]
pub struct PassthroughExecutor;

impl SelectionExecutor for PassthroughExecutor {
    fn execute(&self, request: &ExecutionRequest<'_>) -> Result<Response, ExecutorError> {
        Ok(Response::data(request.root.clone()))
    }
}
