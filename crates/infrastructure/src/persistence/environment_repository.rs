//! File-based environment repository implementation.
//!
//! An environment file is one JSON document holding a name and its variables.

use std::path::Path;

use async_trait::async_trait;
use graphit_application::ports::{EnvironmentError, EnvironmentRepository};
use graphit_domain::Environment;
use tokio::fs;

use crate::serialization::{from_json_bytes, to_json_stable};

/// Environment repository reading and writing JSON files.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEnvironmentRepository;

impl JsonEnvironmentRepository {
    /// Creates a new repository.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EnvironmentRepository for JsonEnvironmentRepository {
    async fn load(&self, path: &Path) -> Result<Environment, EnvironmentError> {
        let content = fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                EnvironmentError::NotFound(path.display().to_string())
            } else {
                EnvironmentError::Io(e)
            }
        })?;

        from_json_bytes(&content).map_err(|e| EnvironmentError::Serialization(e.to_string()))
    }

    async fn save(&self, path: &Path, environment: &Environment) -> Result<(), EnvironmentError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).await?;
        }

        let content = to_json_stable(environment)
            .map_err(|e| EnvironmentError::Serialization(e.to_string()))?;
        fs::write(path, content).await?;
        Ok(())
    }
}
