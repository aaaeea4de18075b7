// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Berth.
//!
//! This module contains pure provisioning logic with ZERO I/O.
//! Processes, files, templates, and database drivers are reached via ports
//! (traits) defined in the application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or external calls
//! - **Immutable values**: strategy changes build new values
//! - **Closed catalog**: every per-service fact is an exhaustive `match`
//!
// Public API - what the world sees
pub mod entities;
pub mod error;
pub mod value_objects;

// Private implementation details - not visible outside domain
mod validation;

// Re-exports for convenience
pub use entities::{
    connection::{AdminCredentials, Credentials, LOOPBACK, ServiceConnectionConfig},
    health::{ContainerRuntime, HealthCheckBudget, HealthCheckPolicy},
    outcome::ProvisioningOutcome,
    topology::{
        ComposeTopologySpec, MANIFEST_FILE, PRODUCT_PREFIX, TopologyVariables,
        manifest_escape, normalize_app_name, resource_prefix,
    },
};

pub use error::{DomainError, ErrorCategory};

pub use value_objects::{FailureStage, ServiceFamily, ServiceKind};

pub use validation::DomainValidator;
