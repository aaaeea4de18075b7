//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `berth-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: Manifest writes
//!   - `TemplateRenderer`: Compose template rendering
//!   - `ProcessRunner`: External command execution
//!   - `Sleeper`: Pauses between health-check attempts
//!   - `DatabaseConnector` / `DatabaseSession`: Administrator connections
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by services)

pub mod output;

pub use output::{
    CommandSpec, DatabaseConnector, DatabaseSession, Filesystem, ProcessOutput, ProcessRunner,
    Sleeper, TemplateRenderer,
};
