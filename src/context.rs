//! Per-run execution state: the variable store, run status, and correlation id.
//!
//! An [`ExecutionContext`] is created fresh before each `WorkflowRunner::run` and is not
//! shared across concurrent runs — it owns no synchronization because exactly one run
//! touches it at a time (§5).

use crate::error::{GraphError, Result};
use crate::ids::ExecutionId;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

/// Lifecycle status of a single workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Idle,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl RunStatus {
    /// Permitted transitions are `Idle -> Running`, `Running -> {Completed, Failed,
    /// Cancelled}`, and `Idle -> Cancelled` (a run whose cancellation token was already
    /// signalled before dispatch never enters `Running` at all — see
    /// `WorkflowRunner::run`). Anything else (including re-entering `Running`, or moving
    /// out of a terminal state) is rejected.
    fn can_transition_to(self, next: RunStatus) -> bool {
        use RunStatus::*;
        matches!(
            (self, next),
            (Idle, Running)
                | (Idle, Cancelled)
                | (Running, Completed)
                | (Running, Failed)
                | (Running, Cancelled)
        )
    }
}

/// Mutable runtime object scoped to a single workflow run: an unordered name→value
/// variable store, the run's status, and its correlation id.
#[derive(Debug)]
pub struct ExecutionContext {
    execution_id: ExecutionId,
    status: RunStatus,
    variables: HashMap<String, Value>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self {
            execution_id: ExecutionId::new(),
            status: RunStatus::Idle,
            variables: HashMap::new(),
        }
    }

    pub fn execution_id(&self) -> ExecutionId {
        self.execution_id
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Applies a status transition, rejecting any move that isn't in the permitted set
    /// (§4.3). Rejections are programmer errors — callers should only ever drive the
    /// documented sequence.
    pub fn set_status(&mut self, next: RunStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(GraphError::invalid_argument(format!(
                "illegal status transition {:?} -> {:?}",
                self.status, next
            )));
        }
        self.status = next;
        Ok(())
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    pub fn get_variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// Returns `Some(value)` iff a variable named `name` is present **and** deserializes
    /// into `T` (the Rust analogue of "present and type-assignable").
    pub fn try_get_variable<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        self.variables
            .get(name)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// The full variable store, used by the property-path resolver's "object" backend
    /// (§4.7, §9) when a condition rule resolves a path against context-stored
    /// composites rather than a raw JSON payload.
    pub fn variables(&self) -> &HashMap<String, Value> {
        &self.variables
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_starts_idle_and_allows_the_documented_path() {
        let mut ctx = ExecutionContext::new();
        assert_eq!(ctx.status(), RunStatus::Idle);
        ctx.set_status(RunStatus::Running).unwrap();
        ctx.set_status(RunStatus::Completed).unwrap();
        assert_eq!(ctx.status(), RunStatus::Completed);
    }

    #[test]
    fn illegal_transitions_are_rejected() {
        let mut ctx = ExecutionContext::new();
        assert!(ctx.set_status(RunStatus::Completed).is_err());
        ctx.set_status(RunStatus::Running).unwrap();
        assert!(ctx.set_status(RunStatus::Running).is_err());
        ctx.set_status(RunStatus::Failed).unwrap();
        assert!(ctx.set_status(RunStatus::Running).is_err());
    }

    #[test]
    fn set_then_try_get_round_trips_when_type_matches() {
        let mut ctx = ExecutionContext::new();
        ctx.set_variable("x", json!(10));
        assert_eq!(ctx.try_get_variable::<i64>("x"), Some(10));
        assert_eq!(ctx.try_get_variable::<String>("x"), None);
    }

    #[test]
    fn missing_variable_is_none() {
        let ctx = ExecutionContext::new();
        assert!(ctx.get_variable("missing").is_none());
        assert_eq!(ctx.try_get_variable::<i64>("missing"), None);
    }
}
