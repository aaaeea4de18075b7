//! Application layer for Berth.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (topology generation, container
//!   lifecycle, direct database provisioning, the provisioning orchestrator)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer sequences the domain layer; per-service facts live
//! in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

// Re-export main services
pub use services::{
    ComposeTopologyGenerator, ContainerLifecycleController, DirectConnectionProvisioner,
    ProvisionOptions, ProvisioningOrchestrator,
};

// Re-export port traits (for adapter implementation)
pub use ports::{
    DatabaseConnector, DatabaseSession, Filesystem, ProcessRunner, Sleeper, TemplateRenderer,
};

pub use error::ApplicationError;
