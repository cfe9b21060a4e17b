//! Script runner port

use async_trait::async_trait;
use graphit_domain::{ScriptResult, ScriptTask};

/// Port for running user scripts in a sandbox.
///
/// Implementations must isolate execution from the caller and honour
/// `task.timeout`, returning partial state when the deadline passes.
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    /// Runs one script. Failures are reported inside the result.
    async fn run(&self, task: ScriptTask) -> ScriptResult;
}
