//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `berth-adapters` crate provides implementations.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::TopologyVariables;
use crate::error::BerthResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `berth_adapters::filesystem::LocalFilesystem` (production)
/// - `berth_adapters::filesystem::MemoryFilesystem` (testing)
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> BerthResult<()>;

    /// Write content to a file, replacing any previous content.
    fn write_file(&self, path: &Path, content: &str) -> BerthResult<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Port for template rendering.
///
/// Implemented by:
/// - `berth_adapters::renderer::SimpleRenderer` (built-in + override directory)
///
/// ## Contract
///
/// - `render` substitutes every `{{NAME}}` placeholder and fails with
///   `ApplicationError::MissingVariable` when a name has no value.
/// - Optional sections are removed whole; removing an absent section
///   returns the content unchanged.
#[cfg_attr(test, mockall::automock)]
pub trait TemplateRenderer: Send + Sync {
    /// Render the template registered under `template_id`.
    fn render(&self, template_id: &str, variables: &TopologyVariables) -> BerthResult<String>;

    /// Remove the named optional section (markers included).
    fn remove_optional_section(&self, content: &str, section: &str) -> String;

    /// Names of the optional sections present in `content`.
    fn optional_sections(&self, content: &str) -> BTreeSet<String>;
}

/// An external command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    pub timeout: Option<Duration>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: working_dir.into(),
            timeout: None,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Command line for logs.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            exit_code: Some(0),
            ..Self::default()
        }
    }

    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            exit_code: Some(exit_code),
            stderr: stderr.into(),
            ..Self::default()
        }
    }
}

/// Port for running external commands.
///
/// `Ok` means the command ran to completion (successfully or not); `Err`
/// means it could not be started or was killed on timeout.
///
/// Implemented by:
/// - `berth_adapters::process::SystemProcessRunner`
#[cfg_attr(test, mockall::automock)]
pub trait ProcessRunner: Send + Sync {
    fn run(&self, command: &CommandSpec) -> BerthResult<ProcessOutput>;
}

/// Port for blocking pauses between retries.
///
/// Implemented by:
/// - `berth_adapters::process::ThreadSleeper`
#[cfg_attr(test, mockall::automock)]
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Port for opening administrator database sessions.
///
/// Implemented by:
/// - `berth_adapters::database::MysqlConnector`
pub trait DatabaseConnector: Send + Sync {
    fn connect(
        &self,
        host: &str,
        port: u16,
        user: &str,
        password: &str,
    ) -> BerthResult<Box<dyn DatabaseSession>>;
}

/// An open database session. Dropping it closes the connection.
pub trait DatabaseSession {
    /// Run a statement, discarding any result set.
    fn execute(&mut self, statement: &str) -> BerthResult<()>;

    /// Run a trivial query.
    fn ping(&mut self) -> BerthResult<()>;

    /// Quote and escape a string value with the driver's escaping rules.
    fn quote_literal(&self, value: &str) -> String;

    /// Quote a schema or table identifier.
    fn quote_identifier(&self, identifier: &str) -> String;
}
