//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "provision a cache" or "create a schema".

pub mod database_service;
pub mod lifecycle_service;
pub mod provisioning_service;
pub mod topology_service;

pub use database_service::DirectConnectionProvisioner;
pub use lifecycle_service::ContainerLifecycleController;
pub use provisioning_service::{ProvisionOptions, ProvisioningOrchestrator};
pub use topology_service::ComposeTopologyGenerator;
