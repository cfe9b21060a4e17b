//! Environment repository port
//!
//! Defines the interface for environment persistence.

use std::path::Path;

use async_trait::async_trait;
use graphit_domain::Environment;

/// Errors that can occur during environment operations.
#[derive(Debug, thiserror::Error)]
pub enum EnvironmentError {
    /// Environment not found.
    #[error("Environment not found: {0}")]
    NotFound(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Repository trait for environment files.
#[async_trait]
pub trait EnvironmentRepository: Send + Sync {
    /// Loads an environment file.
    ///
    /// # Errors
    /// Returns `EnvironmentError::NotFound` if the file doesn't exist.
    async fn load(&self, path: &Path) -> Result<Environment, EnvironmentError>;

    /// Saves an environment file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    async fn save(&self, path: &Path, environment: &Environment) -> Result<(), EnvironmentError>;
}
