//! Built-in compose templates and directory overrides.
//!
//! The three service templates ship inside the binary. A directory of
//! overrides may replace any of them by file name:
//!
//! ```text
//! $BERTH_TEMPLATES_DIR/
//! ├── mysql.yml      ← replaces compose/mysql
//! └── redis.yml      ← replaces compose/redis
//! ```
//!
//! Files are looked up lazily on every load, so editing an override takes
//! effect on the next run without restarting anything.
//!
//! # Environment variable
//!
//! ```env
//! BERTH_TEMPLATES_DIR=./compose-templates
//! ```

use std::{
    io,
    path::{Path, PathBuf},
};

use serde::Serialize;
use tracing::{debug, instrument};

use berth_core::{application::ApplicationError, error::BerthResult};

/// Environment variable naming the override directory.
pub const TEMPLATES_DIR_ENV: &str = "BERTH_TEMPLATES_DIR";

/// A template compiled into the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinTemplate {
    pub id: &'static str,
    /// Override file name inside the templates directory.
    pub file_name: &'static str,
    pub content: &'static str,
}

pub const BUILTIN_TEMPLATES: [BuiltinTemplate; 3] = [
    BuiltinTemplate {
        id: "compose/mysql",
        file_name: "mysql.yml",
        content: include_str!("../templates/mysql.yml"),
    },
    BuiltinTemplate {
        id: "compose/mariadb",
        file_name: "mariadb.yml",
        content: include_str!("../templates/mariadb.yml"),
    },
    BuiltinTemplate {
        id: "compose/redis",
        file_name: "redis.yml",
        content: include_str!("../templates/redis.yml"),
    },
];

/// Look up a built-in template by id.
pub fn builtin(id: &str) -> Option<&'static BuiltinTemplate> {
    BUILTIN_TEMPLATES.iter().find(|t| t.id == id)
}

/// Where a loaded template came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "path", rename_all = "lowercase")]
pub enum TemplateSource {
    Builtin,
    Override(PathBuf),
}

/// Catalog entry for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateEntry {
    pub id: &'static str,
    #[serde(flatten)]
    pub source: TemplateSource,
}

/// Resolves template ids to content: override directory first, then built-ins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateCatalog {
    override_dir: Option<PathBuf>,
}

impl TemplateCatalog {
    /// Built-in templates only.
    pub fn builtin_only() -> Self {
        Self::default()
    }

    pub fn with_override_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            override_dir: Some(dir.into()),
        }
    }

    /// Catalog honouring `$BERTH_TEMPLATES_DIR` when it is set and non-empty.
    pub fn from_env() -> Self {
        match std::env::var(TEMPLATES_DIR_ENV) {
            Ok(dir) if !dir.trim().is_empty() => {
                debug!(path = %dir, "override directory from ${}", TEMPLATES_DIR_ENV);
                Self::with_override_dir(dir)
            }
            _ => Self::builtin_only(),
        }
    }

    pub fn override_dir(&self) -> Option<&Path> {
        self.override_dir.as_deref()
    }

    /// Content for `id`, with its source.
    #[instrument(skip(self))]
    pub fn load(&self, id: &str) -> BerthResult<(String, TemplateSource)> {
        let template = builtin(id).ok_or_else(|| ApplicationError::TemplateNotFound {
            id: id.to_string(),
        })?;

        if let Some(path) = self.override_path(template) {
            match std::fs::read_to_string(&path) {
                Ok(content) => {
                    debug!(path = %path.display(), "using override template");
                    return Ok((content, TemplateSource::Override(path)));
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(ApplicationError::FilesystemError {
                        path,
                        reason: format!("Failed to read template: {e}"),
                    }
                    .into());
                }
            }
        }

        Ok((template.content.to_string(), TemplateSource::Builtin))
    }

    /// Every known template id with the source [`Self::load`] would use.
    pub fn entries(&self) -> Vec<TemplateEntry> {
        BUILTIN_TEMPLATES
            .iter()
            .map(|template| {
                let source = match self.override_path(template) {
                    Some(path) if path.is_file() => TemplateSource::Override(path),
                    _ => TemplateSource::Builtin,
                };
                TemplateEntry {
                    id: template.id,
                    source,
                }
            })
            .collect()
    }

    fn override_path(&self, template: &BuiltinTemplate) -> Option<PathBuf> {
        self.override_dir
            .as_ref()
            .map(|dir| dir.join(template.file_name))
    }
}
