//! Subcommand implementations and shared helpers.

pub mod document;
pub mod run;
pub mod schema;
pub mod subscribe;

use std::path::Path;

use anyhow::{Context, Result};
use graphit_application::ports::EnvironmentRepository;
use graphit_domain::{ClientSettings, InterpolationContext};
use graphit_infrastructure::{JsonEnvironmentRepository, SettingsRepository};
use serde::Serialize;
use tokio::io::AsyncReadExt;

/// Loads settings from `path` or the default location, with env overrides.
pub async fn load_settings(path: Option<&Path>) -> Result<ClientSettings> {
    let repository = path.map_or_else(SettingsRepository::new, SettingsRepository::at);
    repository.load().await.context("Failed to load settings")
}

/// Builds the interpolation context from an environment file.
pub async fn load_context(path: Option<&Path>) -> Result<InterpolationContext> {
    let Some(path) = path else {
        return Ok(InterpolationContext::new());
    };
    let environment = JsonEnvironmentRepository::new()
        .load(path)
        .await
        .with_context(|| format!("Failed to load environment {}", path.display()))?;
    tracing::debug!(name = %environment.name, variables = environment.variables.len(), "Loaded environment");
    Ok(environment.context())
}

/// Reads a document from `path`, or stdin for `None` and `-`.
pub async fn read_document(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

pub fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
