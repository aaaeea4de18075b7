//! Berth Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for Berth, which
//! provisions backing services (relational databases, caches) for PHP
//! applications, container-first with a local fallback.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            berth-cli (CLI)              │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (ProvisioningOrchestrator, Topology,   │
//! │   Lifecycle, DirectConnection)          │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │       Application Ports (Traits)        │
//! │ (Filesystem, Renderer, ProcessRunner,   │
//! │  Sleeper, DatabaseConnector)            │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     berth-adapters (Infrastructure)     │
//! │ (LocalFilesystem, SimpleRenderer,       │
//! │  SystemProcessRunner, MysqlConnector)   │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │        Domain Layer (Pure Logic)        │
//! │ (ServiceKind, ServiceConnectionConfig,  │
//! │  HealthCheckPolicy, ProvisioningOutcome)│
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use berth_core::prelude::*;
//! # fn wire(generator: ComposeTopologyGenerator, lifecycle: ContainerLifecycleController) -> BerthResult<()> {
//!
//! let orchestrator = ProvisioningOrchestrator::new(generator, lifecycle);
//! let requested = ServiceConnectionConfig::defaults_for(ServiceKind::Redis);
//!
//! let outcome = orchestrator.provision(ServiceKind::Redis, requested, "./shop".as_ref())?;
//! if outcome.fallback_from().is_some() {
//!     println!("containers unavailable, using local configuration");
//! }
//! # Ok(())
//! # }
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ComposeTopologyGenerator, ContainerLifecycleController, DirectConnectionProvisioner,
        ProvisionOptions, ProvisioningOrchestrator,
        ports::{
            CommandSpec, DatabaseConnector, DatabaseSession, Filesystem, ProcessOutput,
            ProcessRunner, Sleeper, TemplateRenderer,
        },
    };
    pub use crate::domain::{
        AdminCredentials, ContainerRuntime, Credentials, FailureStage, HealthCheckBudget,
        HealthCheckPolicy, ProvisioningOutcome, ServiceConnectionConfig, ServiceKind,
        TopologyVariables,
    };
    pub use crate::error::{BerthError, BerthResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
