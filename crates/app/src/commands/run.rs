//! `graphit run`

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use graphit_application::document::select_operation;
use graphit_application::ports::EnvironmentRepository;
use graphit_application::{DocumentError, ExecuteRequest, RunOperation, validate_request};
use graphit_domain::{ClientSettings, RequestOptions, RequestScripts, Variable};
use graphit_infrastructure::{JsonEnvironmentRepository, ReqwestHttpClient, RhaiSandbox};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::{load_context, print_json};
use crate::cli::RunArgs;
use crate::definition::RequestFile;

pub async fn execute(args: &RunArgs, settings: &ClientSettings) -> Result<ExitCode> {
    let file = RequestFile::load(&args.request).await?;
    let context = load_context(args.env.env.as_deref()).await?;

    let mut options = file
        .request_options(context, settings.request_timeout_ms)
        .await?;
    if let Some(name) = &args.operation {
        options.operation_name = Some(name.clone());
    }
    if let Some(timeout) = args.timeout {
        options.timeout_ms = timeout;
    }

    check_operation(&options)?;
    for missing in validate_request(&options) {
        warn!(variable = %missing.name, site = ?missing.site, "Unresolved variable");
    }

    let scripts = if args.no_scripts {
        RequestScripts::default()
    } else {
        file.definition.scripts.clone()
    };

    let client = ReqwestHttpClient::with_settings(settings)?;
    let executor = ExecuteRequest::new(Arc::new(client)).with_settings(settings);
    let operation = RunOperation::new(executor, Arc::new(RhaiSandbox::new()))
        .with_script_timeout_ms(settings.script_timeout_ms);

    let outcome = operation.run(&options, &scripts).await;

    for line in outcome.logs() {
        eprintln!("[script] {line}");
    }
    if let Some(post) = &outcome.post_script
        && let Some(error) = &post.error
    {
        eprintln!("[script] post-request script failed: {error}");
    }
    for warning in &outcome.warnings {
        eprintln!("[script] {warning}");
    }

    if args.save_env
        && let Some(path) = args.env.env.as_deref()
        && !outcome.env_overrides.is_empty()
    {
        save_env_overrides(path, &outcome.env_overrides).await?;
        info!(path = %path.display(), count = outcome.env_overrides.len(), "Saved environment overrides");
    }

    print_json(&outcome.result)?;

    Ok(if outcome.result.error.is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Rejects documents whose operation cannot be chosen.
fn check_operation(options: &RequestOptions) -> Result<()> {
    match select_operation(&options.query, options.operation_name.as_deref()) {
        Ok(info) => {
            debug!(kind = %info.kind, name = ?info.name, "Selected operation");
            Ok(())
        }
        // The endpoint reports syntax errors itself
        Err(DocumentError::Syntax(message)) => {
            warn!(%message, "Document does not parse locally");
            Ok(())
        }
        Err(e) => bail!(e),
    }
}

async fn save_env_overrides(path: &Path, overrides: &Map<String, Value>) -> Result<()> {
    let repository = JsonEnvironmentRepository::new();
    let mut environment = repository
        .load(path)
        .await
        .with_context(|| format!("Failed to load environment {}", path.display()))?;

    for (key, value) in overrides {
        match environment.variables.iter_mut().find(|v| &v.key == key) {
            Some(variable) => variable.value = value.clone(),
            None => environment.variables.push(Variable::new(key, value.clone())),
        }
    }

    repository
        .save(path, &environment)
        .await
        .with_context(|| format!("Failed to save environment {}", path.display()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use graphit_domain::Environment;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_check_operation() {
        let doc = "query A { a } query B { b }";
        assert!(check_operation(&RequestOptions::new("https://x.test", doc)).is_err());
        assert!(
            check_operation(&RequestOptions::new("https://x.test", doc).with_operation_name("B"))
                .is_ok()
        );
        assert!(check_operation(&RequestOptions::new("https://x.test", "{ broken")).is_ok());
    }

    #[tokio::test]
    async fn test_save_env_overrides_updates_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dev.json");
        let repository = JsonEnvironmentRepository::new();
        let environment = Environment::new("dev")
            .with_variable("TOKEN", "old")
            .with_variable("API_URL", "https://x.test");
        repository.save(&path, &environment).await.unwrap();

        let overrides = json!({"TOKEN": "new", "USER_ID": 7});
        save_env_overrides(&path, overrides.as_object().unwrap())
            .await
            .unwrap();

        let saved = repository.load(&path).await.unwrap();
        let context = saved.context();
        assert_eq!(context.get("TOKEN"), Some(&json!("new")));
        assert_eq!(context.get("API_URL"), Some(&json!("https://x.test")));
        assert_eq!(context.get("USER_ID"), Some(&json!(7)));
        assert_eq!(saved.variables.len(), 3);
    }
}
