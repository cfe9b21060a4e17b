//! Run Operation Use Case
//!
//! The end-to-end "run" action: pre-request script, overrides, request,
//! post-request script.

use std::collections::BTreeMap;
use std::sync::Arc;

use graphit_domain::{
    GraphQLResponse, Header, RequestOptions, RequestResult, RequestScripts, ScriptResult,
    ScriptTask, scripting::DEFAULT_SCRIPT_TIMEOUT_MS,
};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use super::ExecuteRequest;
use crate::ports::{HttpClient, ScriptRunner};
use crate::variable_resolver::VariableResolver;

/// Outcome of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationOutcome {
    /// The request result. Its stats are `None` if the pre-request script failed.
    pub result: RequestResult,
    /// Pre-request script result, if one ran.
    pub pre_script: Option<ScriptResult>,
    /// Post-request script result, if one ran.
    pub post_script: Option<ScriptResult>,
    /// Environment overrides from successful scripts, for the caller to persist.
    pub env_overrides: Map<String, Value>,
    /// Script overrides that could not be applied to the request.
    pub warnings: Vec<String>,
}

impl OperationOutcome {
    /// All script log lines, pre first.
    #[must_use]
    pub fn logs(&self) -> Vec<&str> {
        self.pre_script
            .iter()
            .chain(self.post_script.iter())
            .flat_map(|s| s.logs.iter().map(String::as_str))
            .collect()
    }
}

/// Runs an operation with its scripts.
pub struct RunOperation<C: HttpClient, S: ScriptRunner> {
    executor: ExecuteRequest<C>,
    runner: Arc<S>,
    script_timeout_ms: u64,
}

impl<C: HttpClient, S: ScriptRunner> RunOperation<C, S> {
    /// Creates a new `RunOperation` use case.
    #[must_use]
    pub const fn new(executor: ExecuteRequest<C>, runner: Arc<S>) -> Self {
        Self {
            executor,
            runner,
            script_timeout_ms: DEFAULT_SCRIPT_TIMEOUT_MS,
        }
    }

    /// Sets the script deadline.
    #[must_use]
    pub const fn with_script_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.script_timeout_ms = timeout_ms;
        self
    }

    /// Runs the operation.
    ///
    /// A failing pre-request script stops the run. A failing post-request
    /// script is reported but the response is kept.
    pub async fn run(&self, options: &RequestOptions, scripts: &RequestScripts) -> OperationOutcome {
        let mut options = options.clone();
        let mut env_overrides = Map::new();
        let mut warnings = Vec::new();

        let pre_script = if scripts.pre_request.should_run() {
            let task = self.task(ScriptTask::pre(&scripts.pre_request.content), &options);
            let pre = self.runner.run(task).await;

            if !pre.success {
                let message = pre.error.clone().unwrap_or_default();
                warn!(error = %message, "Pre-request script failed, request not sent");
                return OperationOutcome {
                    result: RequestResult::aborted(format!("Pre-request script failed: {message}")),
                    pre_script: Some(pre),
                    post_script: None,
                    env_overrides,
                    warnings,
                };
            }

            debug!(logs = pre.logs.len(), "Pre-request script finished");
            if let Err(e) = apply_overrides(&mut options, &pre) {
                warn!(error = %e, "Pre-request script overrides partially applied");
                warnings.push(e.to_string());
            }
            env_overrides.extend(pre.env_overrides.clone());
            Some(pre)
        } else {
            None
        };

        let result = self.executor.execute(&options).await;

        let post_script = if scripts.post_request.should_run() {
            let response = result
                .response
                .as_ref()
                .map_or(Value::Null, GraphQLResponse::to_value);
            let task = self.task(
                ScriptTask::post(&scripts.post_request.content, response),
                &options,
            );
            let post = self.runner.run(task).await;

            if post.success {
                env_overrides.extend(post.env_overrides.clone());
            } else {
                warn!(
                    error = post.error.as_deref().unwrap_or_default(),
                    "Post-request script failed, keeping response"
                );
            }
            Some(post)
        } else {
            None
        };

        OperationOutcome {
            result,
            pre_script,
            post_script,
            env_overrides,
            warnings,
        }
    }

    fn task(&self, task: ScriptTask, options: &RequestOptions) -> ScriptTask {
        let resolver = VariableResolver::new(&options.context);

        let vars = match serde_json::from_str::<Value>(&resolver.interpolate(&options.variables)) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };

        let headers: BTreeMap<String, String> = resolver
            .interpolate_headers(&options.headers)
            .into_iter()
            .filter(Header::is_active)
            .map(|h| (h.key.trim().to_string(), h.value))
            .collect();

        task.with_env(options.context.to_json())
            .with_vars(vars)
            .with_headers(headers)
            .with_timeout(self.script_timeout_ms)
    }
}

/// A script override that could not be applied.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OverrideError {
    /// The resolved variables text is not a JSON object.
    #[error("Variable overrides not applied: variables are not a JSON object")]
    VariablesNotObject,
}

/// Applies a script's overrides to request options.
///
/// Environment overrides shadow the context, variable overrides are merged
/// into the resolved variables object, and header overrides replace the
/// values of matching enabled headers, compared case-insensitively. Unknown
/// header names are appended.
///
/// # Errors
///
/// Returns [`OverrideError::VariablesNotObject`] if variable overrides exist
/// but the variables cannot be read as an object. The variables are left
/// untouched; every other override is still applied.
pub fn apply_overrides(options: &mut RequestOptions, script: &ScriptResult) -> Result<(), OverrideError> {
    let resolver = VariableResolver::new(&options.context);

    if !script.headers_overrides.is_empty() {
        let mut seen: Vec<String> = Vec::new();

        for header in options.headers.iter_mut().filter(|h| h.is_active()) {
            let key = resolver.interpolate(&header.key).trim().to_string();
            if let Some(value) = override_for(&script.headers_overrides, &key)
                && *value != resolver.interpolate(&header.value)
            {
                header.value.clone_from(value);
            }
            seen.push(key);
        }

        for (key, value) in &script.headers_overrides {
            if !seen.iter().any(|s| s.eq_ignore_ascii_case(key)) {
                options.headers.push(Header::new(key.clone(), value.clone()));
            }
        }
    }

    let mut outcome = Ok(());
    if !script.vars_overrides.is_empty() {
        let text = resolver.interpolate(&options.variables);
        let parsed = if text.trim().is_empty() {
            Some(Map::new())
        } else {
            match serde_json::from_str::<Value>(&text) {
                Ok(Value::Object(map)) => Some(map),
                _ => None,
            }
        };
        match parsed {
            Some(mut vars) => {
                vars.extend(script.vars_overrides.clone());
                options.variables = Value::Object(vars).to_string();
            }
            None => outcome = Err(OverrideError::VariablesNotObject),
        }
    }

    if !script.env_overrides.is_empty() {
        options.context = options.context.layered(&script.env_overrides);
    }

    outcome
}

fn override_for<'a>(overrides: &'a BTreeMap<String, String>, key: &str) -> Option<&'a String> {
    overrides
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use graphit_domain::{InterpolationContext, Script, ScriptKind};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::ports::{HttpClientError, OutboundBody, OutboundRequest, RawResponse};

    #[derive(Default)]
    struct RecordingClient {
        seen: Mutex<Vec<OutboundRequest>>,
    }

    #[async_trait]
    impl HttpClient for RecordingClient {
        async fn execute(&self, request: &OutboundRequest) -> Result<RawResponse, HttpClientError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(RawResponse {
                status: 200,
                status_text: "OK".to_string(),
                headers: Vec::new(),
                body: br#"{"data":{"token":"t2"}}"#.to_vec(),
                duration: Duration::from_millis(1),
            })
        }
    }

    /// Script runner that replays canned results per kind.
    struct CannedRunner {
        pre: ScriptResult,
        post: ScriptResult,
        tasks: Mutex<Vec<ScriptTask>>,
    }

    #[async_trait]
    impl ScriptRunner for CannedRunner {
        async fn run(&self, task: ScriptTask) -> ScriptResult {
            let kind = task.kind;
            self.tasks.lock().unwrap().push(task);
            match kind {
                ScriptKind::Pre => self.pre.clone(),
                ScriptKind::Post => self.post.clone(),
            }
        }
    }

    fn ok_result() -> ScriptResult {
        ScriptResult {
            success: true,
            ..ScriptResult::default()
        }
    }

    fn scripts() -> RequestScripts {
        RequestScripts::default()
            .with_pre_request(Script::with_content("pre"))
            .with_post_request(Script::with_content("post"))
    }

    fn options() -> RequestOptions {
        let ctx: InterpolationContext = [
            ("API_URL", json!("https://x.test")),
            ("TOKEN", json!("t1")),
        ]
        .into_iter()
        .collect();
        RequestOptions::new("{{API_URL}}/graphql", "{ a }")
            .with_variables(r#"{"a": 1}"#)
            .with_header(Header::new("Authorization", "Bearer {{TOKEN}}"))
            .with_header(Header::new("X-Keep", "1"))
            .with_context(ctx)
    }

    fn run_with(pre: ScriptResult, post: ScriptResult) -> (Arc<RecordingClient>, RunOperation<RecordingClient, CannedRunner>) {
        let client = Arc::new(RecordingClient::default());
        let runner = Arc::new(CannedRunner {
            pre,
            post,
            tasks: Mutex::new(Vec::new()),
        });
        let use_case = RunOperation::new(ExecuteRequest::new(Arc::clone(&client)), runner)
            .with_script_timeout_ms(250);
        (client, use_case)
    }

    #[tokio::test]
    async fn test_pre_script_failure_stops_run() {
        let mut failed = ScriptResult::error("ReferenceError: x");
        failed.logs.push("before".to_string());
        let (client, use_case) = run_with(failed, ok_result());

        let outcome = use_case.run(&options(), &scripts()).await;

        assert_eq!(
            outcome.result.error.as_deref(),
            Some("Pre-request script failed: ReferenceError: x")
        );
        assert!(outcome.result.stats.is_none());
        assert!(outcome.post_script.is_none());
        assert_eq!(outcome.logs(), vec!["before"]);
        assert!(client.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pre_script_overrides_are_applied() {
        let mut pre = ok_result();
        pre.env_overrides.insert("TOKEN".to_string(), json!("t9"));
        pre.vars_overrides.insert("b".to_string(), json!(2));
        pre.headers_overrides = [
            ("Authorization".to_string(), "Bearer t1".to_string()),
            ("X-Keep".to_string(), "1".to_string()),
            ("X-New".to_string(), "yes".to_string()),
        ]
        .into_iter()
        .collect();
        let (client, use_case) = run_with(pre, ok_result());

        let outcome = use_case.run(&options(), &scripts()).await;
        assert!(outcome.result.is_success());
        assert_eq!(outcome.env_overrides.get("TOKEN"), Some(&json!("t9")));

        let sent = client.seen.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        // Unchanged header keeps its template, so the env override flows in
        assert_eq!(sent[0].header("Authorization"), Some("Bearer t9"));
        assert_eq!(sent[0].header("X-New"), Some("yes"));
        match &sent[0].body {
            OutboundBody::Json(text) => {
                let body: Value = serde_json::from_str(text).unwrap();
                assert_eq!(body["variables"], json!({"a": 1, "b": 2}));
            }
            other => unreachable!("unexpected body {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_post_script_failure_keeps_response() {
        let (_, use_case) = run_with(ok_result(), ScriptResult::error("boom"));
        let outcome = use_case.run(&options(), &scripts()).await;

        assert!(outcome.result.is_success());
        assert_eq!(
            outcome.post_script.and_then(|s| s.error),
            Some("boom".to_string())
        );
    }

    #[tokio::test]
    async fn test_tasks_carry_state() {
        let client = Arc::new(RecordingClient::default());
        let runner = Arc::new(CannedRunner {
            pre: ok_result(),
            post: ok_result(),
            tasks: Mutex::new(Vec::new()),
        });
        let use_case = RunOperation::new(ExecuteRequest::new(client), Arc::clone(&runner))
            .with_script_timeout_ms(250);

        let _ = use_case.run(&options(), &scripts()).await;

        let tasks = runner.tasks.lock().unwrap().clone();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].kind, ScriptKind::Pre);
        assert_eq!(tasks[0].timeout, 250);
        assert_eq!(tasks[0].env.get("TOKEN"), Some(&json!("t1")));
        assert_eq!(tasks[0].vars.get("a"), Some(&json!(1)));
        assert_eq!(tasks[0].headers.get("Authorization").map(String::as_str), Some("Bearer t1"));
        assert!(tasks[0].response.is_none());
        assert_eq!(tasks[1].response, Some(json!({"data": {"token": "t2"}})));
    }

    fn sent_variables(client: &RecordingClient) -> Value {
        let sent = client.seen.lock().unwrap().clone();
        match &sent[0].body {
            OutboundBody::Json(text) => serde_json::from_str::<Value>(text).unwrap()["variables"].clone(),
            other => unreachable!("unexpected body {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_var_overrides_merge_into_templated_variables() {
        let mut pre = ok_result();
        pre.vars_overrides.insert("b".to_string(), json!(2));
        let (client, use_case) = run_with(pre, ok_result());
        let base = options();
        let limit = [("LIMIT".to_string(), json!(5))];
        let context = base.context.layered(limit.iter().map(|(k, v)| (k, v)));
        let options = base
            .with_variables(r#"{"limit": {{LIMIT}}, "a": 1}"#)
            .with_context(context);

        let outcome = use_case.run(&options, &scripts()).await;

        assert!(outcome.warnings.is_empty());
        assert_eq!(sent_variables(&client), json!({"limit": 5, "a": 1, "b": 2}));
    }

    #[test]
    fn test_var_overrides_keep_unreadable_variables() {
        let mut script = ok_result();
        script.vars_overrides.insert("b".to_string(), json!(2));
        script.env_overrides.insert("TOKEN".to_string(), json!("t9"));
        let mut options = options().with_variables("[1, 2]");

        let result = apply_overrides(&mut options, &script);

        assert_eq!(result, Err(OverrideError::VariablesNotObject));
        assert_eq!(options.variables, "[1, 2]");
        assert_eq!(options.context.get("TOKEN"), Some(&json!("t9")));
    }

    #[tokio::test]
    async fn test_unapplied_overrides_are_reported() {
        let mut pre = ok_result();
        pre.vars_overrides.insert("b".to_string(), json!(2));
        let (client, use_case) = run_with(pre, ok_result());
        let options = options().with_variables(r#"{"a": {{MISSING}}}"#);

        let outcome = use_case.run(&options, &scripts()).await;

        assert_eq!(
            outcome.warnings,
            vec!["Variable overrides not applied: variables are not a JSON object".to_string()]
        );
        assert!(client.seen.lock().unwrap().is_empty());
        assert_eq!(
            outcome.result.error.as_deref().map(|e| e.starts_with("Invalid variables JSON")),
            Some(true)
        );
    }

    #[test]
    fn test_header_overrides_match_case_insensitively() {
        let mut script = ok_result();
        script.headers_overrides = [("authorization".to_string(), "Bearer t5".to_string())]
            .into_iter()
            .collect();
        let mut options = options();

        apply_overrides(&mut options, &script).unwrap();

        let auth: Vec<_> = options
            .headers
            .iter()
            .filter(|h| h.key.eq_ignore_ascii_case("authorization"))
            .collect();
        assert_eq!(auth.len(), 1);
        assert_eq!(auth[0].key, "Authorization");
        assert_eq!(auth[0].value, "Bearer t5");
    }

    #[tokio::test]
    async fn test_no_scripts_runs_request_only() {
        let (client, use_case) = run_with(ScriptResult::error("unused"), ScriptResult::error("unused"));
        let outcome = use_case.run(&options(), &RequestScripts::default()).await;
        assert!(outcome.pre_script.is_none());
        assert!(outcome.post_script.is_none());
        assert!(outcome.result.is_success());
        assert_eq!(client.seen.lock().unwrap().len(), 1);
    }
}
