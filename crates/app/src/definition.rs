//! Request definition files.
//!
//! A definition is a JSON object describing one operation:
//!
//! ```json
//! {
//!   "endpoint": "{{API_URL}}/graphql",
//!   "queryFile": "me.graphql",
//!   "variables": { "id": "{{USER_ID}}" },
//!   "headers": [{ "key": "X-Trace", "value": "cli" }],
//!   "auth": { "type": "bearer", "token": "{{TOKEN}}" },
//!   "files": [{ "variable": "input.avatar", "path": "avatar.png" }],
//!   "scripts": { "preRequest": { "content": "log(env.get(\"API_URL\"));" } }
//! }
//! ```
//!
//! Relative paths resolve against the definition's directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use graphit_domain::{
    AuthConfig, FileHandle, FileMapping, Header, HttpMethod, InterpolationContext,
    RequestOptions, RequestScripts, SubscriptionOptions, SubscriptionProtocol,
};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDefinition {
    pub endpoint: String,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub query_file: Option<PathBuf>,
    /// An object, or JSON text with placeholders.
    #[serde(default)]
    pub variables: Option<Value>,
    #[serde(default)]
    pub operation_name: Option<String>,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default)]
    pub files: Vec<FileDefinition>,
    #[serde(default)]
    pub proxy: bool,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub scripts: RequestScripts,
    #[serde(default)]
    pub protocol: SubscriptionProtocol,
}

/// A file bound to a variable path; unbound when `path` is absent.
#[derive(Debug, Clone, Deserialize)]
pub struct FileDefinition {
    pub variable: String,
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// A definition together with the directory it was read from.
#[derive(Debug, Clone)]
pub struct RequestFile {
    pub definition: RequestDefinition,
    base_dir: PathBuf,
}

impl RequestFile {
    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read request file {}", path.display()))?;
        let definition: RequestDefinition = serde_json::from_str(&text)
            .with_context(|| format!("Invalid request file {}", path.display()))?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(Self {
            definition,
            base_dir,
        })
    }

    #[cfg(test)]
    pub fn from_definition(definition: RequestDefinition, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            definition,
            base_dir: base_dir.into(),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// The document, inline or from `queryFile`.
    pub async fn query(&self) -> Result<String> {
        if let Some(query) = &self.definition.query {
            return Ok(query.clone());
        }
        let Some(file) = &self.definition.query_file else {
            bail!("Request definition needs `query` or `queryFile`");
        };
        let path = self.resolve(file);
        tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read query file {}", path.display()))
    }

    pub fn variables_text(&self) -> String {
        match &self.definition.variables {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Options for `query` without file bindings.
    pub fn base_options(
        &self,
        query: String,
        context: InterpolationContext,
        default_timeout_ms: u64,
    ) -> RequestOptions {
        let definition = &self.definition;
        let mut options = RequestOptions::new(&definition.endpoint, query)
            .with_variables(self.variables_text())
            .with_auth(definition.auth.clone())
            .with_method(definition.method)
            .with_proxy(definition.proxy)
            .with_timeout_ms(definition.timeout_ms.unwrap_or(default_timeout_ms))
            .with_context(context);
        options.headers.clone_from(&definition.headers);
        if let Some(name) = &definition.operation_name {
            options = options.with_operation_name(name);
        }
        options
    }

    /// Complete options, reading bound files from disk.
    pub async fn request_options(
        &self,
        context: InterpolationContext,
        default_timeout_ms: u64,
    ) -> Result<RequestOptions> {
        let mut options = self.base_options(self.query().await?, context, default_timeout_ms);

        for file in &self.definition.files {
            let mapping = FileMapping::new(&file.variable);
            let mapping = match &file.path {
                Some(path) => {
                    let path = self.resolve(path);
                    let bytes = tokio::fs::read(&path)
                        .await
                        .with_context(|| format!("Failed to read upload {}", path.display()))?;
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    mapping.with_file(name, FileHandle::new(bytes))
                }
                None => mapping,
            };
            options = options.with_file_mapping(mapping);
        }

        Ok(options)
    }

    pub async fn subscription_options(
        &self,
        context: InterpolationContext,
    ) -> Result<SubscriptionOptions> {
        let definition = &self.definition;
        let mut options =
            SubscriptionOptions::new(&definition.endpoint, self.query().await?, definition.protocol)
                .with_variables(self.variables_text())
                .with_auth(definition.auth.clone())
                .with_context(context);
        options.headers.clone_from(&definition.headers);
        if let Some(name) = &definition.operation_name {
            options = options.with_operation_name(name);
        }
        Ok(options)
    }
}
