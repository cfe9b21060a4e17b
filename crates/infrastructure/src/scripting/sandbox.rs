//! Rhai script runner.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use graphit_application::ports::ScriptRunner;
use graphit_domain::{SCRIPT_TIMEOUT_MESSAGE, ScriptKind, ScriptResult, ScriptTask};
use rhai::module_resolvers::DummyModuleResolver;
use rhai::serde::to_dynamic;
use rhai::{Dynamic, Engine, EvalAltResult, Scope};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use super::api::{self, EnvApi, HeadersApi, SandboxState, SharedState, VarsApi};

/// Resource limits applied to every script engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SandboxLimits {
    /// Maximum operations per run; `0` leaves only the deadline.
    pub max_operations: u64,
    /// Maximum function call depth.
    pub max_call_levels: usize,
    /// Maximum string length in bytes.
    pub max_string_size: usize,
    /// Maximum array length.
    pub max_array_size: usize,
    /// Maximum object map size.
    pub max_map_size: usize,
}

impl Default for SandboxLimits {
    fn default() -> Self {
        Self {
            max_operations: 0,
            max_call_levels: 64,
            max_string_size: 1024 * 1024,
            max_array_size: 10_000,
            max_map_size: 10_000,
        }
    }
}

/// Runs scripts with a Rhai engine on a dedicated worker thread.
///
/// Each run gets a fresh engine and fresh state. When the deadline passes
/// the caller gets whatever logs and overrides were staged so far, and the
/// engine is interrupted on its next progress check.
#[derive(Debug, Clone, Default)]
pub struct RhaiSandbox {
    limits: SandboxLimits,
}

impl RhaiSandbox {
    /// Creates a sandbox with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sandbox with custom limits.
    #[must_use]
    pub const fn with_limits(limits: SandboxLimits) -> Self {
        Self { limits }
    }
}

fn build_engine(limits: SandboxLimits, state: &SharedState, deadline: Instant) -> Engine {
    let mut engine = Engine::new();

    engine.set_module_resolver(DummyModuleResolver::new());
    engine.disable_symbol("eval");
    engine.set_max_operations(limits.max_operations);
    engine.set_max_call_levels(limits.max_call_levels);
    engine.set_max_string_size(limits.max_string_size);
    engine.set_max_array_size(limits.max_array_size);
    engine.set_max_map_size(limits.max_map_size);
    engine.on_progress(move |_| {
        if Instant::now() >= deadline {
            Some(Dynamic::UNIT)
        } else {
            None
        }
    });

    api::register(&mut engine, state);
    engine
}

fn error_message(error: &EvalAltResult) -> String {
    match error {
        EvalAltResult::ErrorTerminated(..) => SCRIPT_TIMEOUT_MESSAGE.to_string(),
        EvalAltResult::ErrorRuntime(value, _) => value.to_string(),
        EvalAltResult::ErrorTooManyOperations(_) => {
            "Script exceeded its operation limit".to_string()
        }
        other => other.to_string(),
    }
}

/// Runs on the worker thread.
fn execute(
    task: ScriptTask,
    state: &SharedState,
    limits: SandboxLimits,
    deadline: Instant,
) -> Result<(), String> {
    let engine = build_engine(limits, state, deadline);

    let mut scope = Scope::new();
    scope.push("env", EnvApi::new(task.env, state));
    scope.push("vars", VarsApi::new(task.vars, state));
    scope.push("headers", HeadersApi::new(state));
    if task.kind == ScriptKind::Post {
        let response = task.response.unwrap_or_default();
        let response = to_dynamic(&response).map_err(|e| error_message(&e))?;
        scope.push_constant("response", response);
    }

    engine
        .run_with_scope(&mut scope, &task.script)
        .map_err(|e| error_message(&e))
}

fn snapshot(state: &SharedState, outcome: Result<(), String>) -> ScriptResult {
    let state = state.lock();
    ScriptResult {
        success: outcome.is_ok(),
        logs: state.logs.clone(),
        env_overrides: state.env_overrides.clone(),
        vars_overrides: state.vars_overrides.clone(),
        headers_overrides: state.headers.clone(),
        error: outcome.err(),
    }
}

#[async_trait]
impl ScriptRunner for RhaiSandbox {
    async fn run(&self, task: ScriptTask) -> ScriptResult {
        let kind = task.kind;
        let timeout = Duration::from_millis(task.timeout);
        let deadline = Instant::now() + timeout;
        let state = SandboxState::with_headers(task.headers.clone());
        let limits = self.limits;

        let (tx, rx) = oneshot::channel();
        let worker_state = Arc::clone(&state);
        let spawned = std::thread::Builder::new()
            .name(format!("graphit-script-{}", kind.as_str()))
            .spawn(move || {
                let outcome = execute(task, &worker_state, limits, deadline);
                let _ = tx.send(outcome);
            });
        if let Err(e) = spawned {
            warn!(error = %e, "Failed to start script worker");
            return ScriptResult::error(format!("Failed to start script worker: {e}"));
        }

        let outcome = match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err("Script worker stopped unexpectedly".to_string()),
            Err(_) => Err(SCRIPT_TIMEOUT_MESSAGE.to_string()),
        };

        let result = snapshot(&state, outcome);
        debug!(
            kind = kind.as_str(),
            success = result.success,
            logs = result.logs.len(),
            error = ?result.error,
            "Script finished"
        );
        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{Map, Value, json};
    use std::collections::BTreeMap;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_env_and_vars_are_layered() {
        let task = ScriptTask::pre(
            r#"
            log(env.get("base"));
            env.set("token", "abc");
            log(env.get("token"));
            vars.set("limit", vars.get("limit") + 5);
            "#,
        )
        .with_env(object(json!({"base": "https://api.test"})))
        .with_vars(object(json!({"limit": 10, "id": "x"})));

        let result = RhaiSandbox::new().run(task).await;

        assert!(result.success, "{:?}", result.error);
        assert_eq!(result.logs, vec!["https://api.test", "abc"]);
        assert_eq!(result.env_overrides, object(json!({"token": "abc"})));
        assert_eq!(result.vars_overrides, object(json!({"limit": 15})));
    }

    #[tokio::test]
    async fn test_headers_start_from_current_map() {
        let headers = BTreeMap::from([("Accept".to_string(), "application/json".to_string())]);
        let task = ScriptTask::pre(r#"headers.set("X-Trace", 42); log(headers.get("Accept"));"#)
            .with_headers(headers);

        let result = RhaiSandbox::new().run(task).await;

        assert!(result.success);
        assert_eq!(result.logs, vec!["application/json"]);
        assert_eq!(
            result.headers_overrides,
            BTreeMap::from([
                ("Accept".to_string(), "application/json".to_string()),
                ("X-Trace".to_string(), "42".to_string()),
            ])
        );
    }

    #[tokio::test]
    async fn test_log_pretty_prints_objects() {
        let task = ScriptTask::pre(r#"log("payload", #{ id: 1 }); print("raw");"#);

        let result = RhaiSandbox::new().run(task).await;

        assert_eq!(result.logs, vec!["payload {\n  \"id\": 1\n}", "raw"]);
    }

    #[tokio::test]
    async fn test_post_script_reads_response() {
        let task = ScriptTask::post(
            r#"env.set("user", response.data.user.id);"#,
            json!({"data": {"user": {"id": "u-1"}}}),
        );

        let result = RhaiSandbox::new().run(task).await;

        assert!(result.success, "{:?}", result.error);
        assert_eq!(result.env_overrides, object(json!({"user": "u-1"})));
    }

    #[tokio::test]
    async fn test_response_is_absent_in_pre_scripts() {
        let result = RhaiSandbox::new()
            .run(ScriptTask::pre("log(response);"))
            .await;

        assert!(!result.success);
        assert!(result.error.unwrap().contains("response"));
    }

    #[tokio::test]
    async fn test_response_is_read_only() {
        let task = ScriptTask::post("response = 1;", json!({"data": null}));

        let result = RhaiSandbox::new().run(task).await;

        assert!(!result.success);
    }

    #[tokio::test]
    async fn test_thrown_error_keeps_logs() {
        let task = ScriptTask::pre(r#"log("before"); env.set("a", 1); throw "boom"; log("after");"#);

        let result = RhaiSandbox::new().run(task).await;

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("boom"));
        assert_eq!(result.logs, vec!["before"]);
        assert_eq!(result.env_overrides, object(json!({"a": 1})));
    }

    #[tokio::test]
    async fn test_timeout_returns_partial_state() {
        let task = ScriptTask::pre(r#"log("start"); env.set("k", "v"); loop { }"#).with_timeout(100);

        let started = Instant::now();
        let result = RhaiSandbox::new().run(task).await;

        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(!result.success);
        assert!(result.timed_out());
        assert_eq!(result.logs, vec!["start"]);
        assert_eq!(result.env_overrides, object(json!({"k": "v"})));
    }

    #[tokio::test]
    async fn test_eval_is_disabled() {
        let result = RhaiSandbox::new()
            .run(ScriptTask::pre(r#"eval("log(1)");"#))
            .await;

        assert!(!result.success);
        assert!(result.logs.is_empty());
    }

    #[tokio::test]
    async fn test_operation_limit() {
        let sandbox = RhaiSandbox::with_limits(SandboxLimits {
            max_operations: 1_000,
            ..SandboxLimits::default()
        });

        let result = sandbox
            .run(ScriptTask::pre("let x = 0; loop { x += 1; }"))
            .await;

        assert_eq!(result.error.as_deref(), Some("Script exceeded its operation limit"));
    }

    #[tokio::test]
    async fn test_state_does_not_leak_between_runs() {
        let sandbox = RhaiSandbox::new();
        sandbox
            .run(ScriptTask::pre(r#"log("first"); env.set("a", 1);"#))
            .await;

        let result = sandbox.run(ScriptTask::pre(r#"log(env.get("a"));"#)).await;

        assert_eq!(result.logs, vec!["()"]);
        assert!(result.env_overrides.is_empty());
    }
}
