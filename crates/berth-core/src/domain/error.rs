// ============================================================================
// domain/error.rs - DOMAIN VALIDATION ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (outcomes and reports may carry them)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    #[error("unknown service kind: {0}")]
    UnknownServiceKind(String),

    #[error("invalid connection configuration: {0}")]
    InvalidConnection(String),

    #[error("invalid health-check policy: {0}")]
    InvalidPolicy(String),

    #[error("credentials do not match service kind '{kind}': {reason}")]
    CredentialsMismatch { kind: String, reason: String },

    // ========================================================================
    // Constraint Violations
    // ========================================================================
    #[error("Required field missing: {field}")]
    MissingRequiredField { field: &'static str },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::UnknownServiceKind(kind) => vec![
                format!("'{}' is not a supported service", kind),
                "Supported services: mysql, mariadb, redis".into(),
                "Try: berth services".into(),
            ],
            Self::InvalidConnection(msg) => vec![
                "Check the --host and --port values".into(),
                format!("Details: {}", msg),
            ],
            Self::InvalidPolicy(msg) => vec![
                "Check the [health_check] section of your configuration".into(),
                format!("Details: {}", msg),
            ],
            Self::CredentialsMismatch { kind, .. } => vec![format!(
                "Use --password for redis and --db-* flags for {} databases",
                kind
            )],
            Self::MissingRequiredField { field } => {
                vec![format!("Provide a value for '{}'", field)]
            }
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownServiceKind(_) => ErrorCategory::NotFound,
            _ => ErrorCategory::Validation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Internal,
}
