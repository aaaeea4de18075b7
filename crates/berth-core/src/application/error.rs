//! Application layer errors.
//!
//! These errors represent failures in orchestration and in the ports the
//! services drive, not validation. Validation errors are `DomainError`.
//!
//! Most variants are *recoverable*: the orchestrator turns them into a
//! fallback or a `ProvisioningOutcome` rather than propagating them.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::FailureStage;
use crate::error::ErrorCategory;

/// Errors that occur during provisioning orchestration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// No template registered under this identifier.
    #[error("Template not found: {id}")]
    TemplateNotFound { id: String },

    /// A template placeholder had no value in the variable mapping.
    #[error("Template '{template}' references undefined variable '{variable}'")]
    MissingVariable { template: String, variable: String },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// An external command could not be started at all.
    #[error("Failed to run '{program}': {reason}")]
    ProcessSpawn { program: String, reason: String },

    /// An external command exceeded its timeout and was killed.
    #[error("'{program}' timed out after {seconds}s")]
    ProcessTimedOut { program: String, seconds: u64 },

    /// `compose up` exited unsuccessfully.
    #[error("Container start failed: {reason}")]
    ContainerStartFailed { reason: String },

    /// `compose down` exited unsuccessfully.
    #[error("Container stop failed: {reason}")]
    ContainerStopFailed { reason: String },

    /// The service never answered its probe within the retry budget.
    #[error("Service '{service}' not ready after {attempts} health-check attempts")]
    HealthCheckTimedOut { service: String, attempts: u32 },

    /// Could not open a database session.
    #[error("Could not connect to {host}:{port}: {reason}")]
    ConnectionFailed {
        host: String,
        port: u16,
        reason: String,
    },

    /// A provisioning statement was rejected by the server.
    #[error("Statement {step} of {total} failed: {reason}")]
    StatementFailed {
        step: usize,
        total: usize,
        reason: String,
    },

    /// Shared state lock poisoned (in-memory adapters).
    #[error("Adapter state lock poisoned")]
    StoreLockError,
}

impl ApplicationError {
    /// Orchestration stage this error belongs to, if it is part of the
    /// recoverable taxonomy.
    pub fn failure_stage(&self) -> Option<FailureStage> {
        match self {
            Self::TemplateNotFound { .. }
            | Self::MissingVariable { .. }
            | Self::FilesystemError { .. } => Some(FailureStage::TemplateGeneration),
            Self::ProcessSpawn { .. }
            | Self::ProcessTimedOut { .. }
            | Self::ContainerStartFailed { .. } => Some(FailureStage::ContainerStart),
            Self::HealthCheckTimedOut { .. } => Some(FailureStage::HealthCheckTimeout),
            Self::ConnectionFailed { .. } | Self::StatementFailed { .. } => {
                Some(FailureStage::DirectConnection)
            }
            Self::ContainerStopFailed { .. } | Self::StoreLockError => None,
        }
    }

    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::TemplateNotFound { id } => vec![
                format!("No compose template named '{}'", id),
                "Check BERTH_TEMPLATES_DIR or remove it to use the built-in templates".into(),
            ],
            Self::MissingVariable { variable, .. } => vec![
                format!("The template needs a value for {{{{{}}}}}", variable),
                "Custom templates may only use the documented variables".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
                "Ensure the parent directory exists".into(),
            ],
            Self::ProcessSpawn { program, .. } => vec![
                format!("Is '{}' installed and on your PATH?", program),
                "Use --runtime to select another container runtime (e.g. podman)".into(),
            ],
            Self::ProcessTimedOut { .. } => vec![
                "The container runtime is slow to respond".into(),
                "Raise container.start_timeout_secs in your configuration".into(),
            ],
            Self::ContainerStartFailed { .. } => vec![
                "Run `docker compose up` in the target directory to see the full output".into(),
                "Check that the published port is not already in use".into(),
            ],
            Self::ContainerStopFailed { .. } => vec![
                "Run `docker compose down` in the target directory to see the full output".into(),
                "Containers may already be gone; check `docker compose ps`".into(),
            ],
            Self::HealthCheckTimedOut { .. } => vec![
                "The service may still be initialising".into(),
                "Raise health_check.max_attempts or health_check.interval_secs".into(),
            ],
            Self::ConnectionFailed { host, port, .. } => vec![
                format!("Is a server listening on {}:{}?", host, port),
                "Check the administrator user name and password".into(),
            ],
            Self::StatementFailed { .. } => vec![
                "The administrator account may lack CREATE USER or GRANT OPTION".into(),
                "Statements before the failing one were applied; re-running is safe".into(),
            ],
            Self::StoreLockError => vec!["Try again in a moment".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TemplateNotFound { .. } => ErrorCategory::NotFound,
            Self::MissingVariable { .. } => ErrorCategory::Configuration,
            Self::FilesystemError { .. } | Self::StoreLockError => ErrorCategory::Internal,
            Self::ProcessSpawn { .. }
            | Self::ProcessTimedOut { .. }
            | Self::ContainerStartFailed { .. }
            | Self::ContainerStopFailed { .. }
            | Self::HealthCheckTimedOut { .. } => ErrorCategory::Environment,
            Self::ConnectionFailed { .. } | Self::StatementFailed { .. } => {
                ErrorCategory::Environment
            }
        }
    }
}
