//! Infrastructure adapters for Berth.
//!
//! This crate implements the ports defined in `berth-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod builtin_templates;
pub mod database;
pub mod filesystem;
pub mod process;
pub mod renderer;

// Re-export commonly used adapters
pub use builtin_templates::{TemplateCatalog, TemplateSource};
pub use database::MysqlConnector;
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use process::{SystemProcessRunner, ThreadSleeper};
pub use renderer::SimpleRenderer;
