//! File persistence for settings and environments.

mod environment_repository;
mod settings_repository;

pub use environment_repository::JsonEnvironmentRepository;
pub use settings_repository::{
    PROXY_URL_VAR, REQUEST_TIMEOUT_VAR, SCRIPT_TIMEOUT_VAR, SettingsError, SettingsRepository,
    apply_overrides,
};
