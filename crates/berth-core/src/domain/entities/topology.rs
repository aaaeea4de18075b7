//! Compose topology naming, variables, and the rendered manifest.
//!
//! ## Naming
//!
//! Every container, volume, and network is named `<PRODUCT_PREFIX>-<app>`
//! where `<app>` is [`normalize_app_name`] of the application name:
//!
//! | Input           | Prefix               |
//! |-----------------|----------------------|
//! | `"My Shop"`     | `berth-my-shop`      |
//! | `"shop__API.v2"`| `berth-shop-api-v2`  |
//! | `"!!!"`         | `berth-app`          |
//!
//! ## Credential values
//!
//! Templates place credentials inside double-quoted YAML scalars, which
//! compose then interpolates. [`manifest_escape`] is applied to every
//! credential variable so the container receives the exact string.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::domain::{Credentials, ServiceConnectionConfig, ServiceKind};

/// Prefix shared by every generated resource name.
pub const PRODUCT_PREFIX: &str = "berth";

/// Well-known manifest filename inside the target directory.
pub const MANIFEST_FILE: &str = "docker-compose.yml";

/// Lower-case `name`, collapsing each run of non-alphanumeric characters into
/// a single `-` and trimming separators at both ends.
pub fn normalize_app_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('-');
            }
            pending_sep = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }

    if out.is_empty() {
        "app".into()
    } else {
        out
    }
}

/// Escape `value` for a double-quoted YAML scalar in a compose file.
///
/// Backslashes, quotes and control characters get YAML escapes. `$` is
/// doubled so compose does not interpolate it.
pub fn manifest_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '$' => out.push_str("$$"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", u32::from(c))),
            c => out.push(c),
        }
    }
    out
}

/// `<PRODUCT_PREFIX>-<normalized app name>`.
pub fn resource_prefix(app_name: &str) -> String {
    format!("{PRODUCT_PREFIX}-{}", normalize_app_name(app_name))
}

/// Flat variable mapping supplied to the template renderer.
///
/// Backed by a `BTreeMap` so iteration order, and therefore any rendering
/// that depends on it, is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopologyVariables {
    variables: BTreeMap<String, String>,
}

impl TopologyVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard variables for provisioning `kind` for `app_name`.
    pub fn for_service(kind: ServiceKind, app_name: &str, config: &ServiceConnectionConfig) -> Self {
        let prefix = resource_prefix(app_name);

        let mut vars = Self::new()
            .with_variable("PROJECT_NAME", prefix.clone())
            .with_variable("CONTAINER_PREFIX", prefix.clone())
            .with_variable("VOLUME_PREFIX", prefix.clone())
            .with_variable("NETWORK_PREFIX", prefix)
            .with_variable("SERVICE_NAME", kind.compose_service())
            .with_variable("PORT", config.port().to_string())
            .with_variable("ADMIN_UI_PORT", kind.sidecar_port().to_string());

        match config.credentials() {
            Credentials::Database {
                database,
                username,
                password,
                root_password,
            } => {
                vars = vars
                    .with_variable("DB_NAME", manifest_escape(database))
                    .with_variable("DB_USER", manifest_escape(username))
                    .with_variable("DB_PASSWORD", manifest_escape(password))
                    .with_variable("ROOT_PASSWORD", manifest_escape(root_password));
            }
            Credentials::Password { password } => {
                vars = vars.with_variable("REDIS_PASSWORD", manifest_escape(password));
            }
            Credentials::None => {
                vars = vars.with_variable("REDIS_PASSWORD", "");
            }
        }

        vars
    }

    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.variables.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

/// A rendered compose manifest and where it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeTopologySpec {
    pub kind: ServiceKind,
    pub content: String,
    pub included_sections: BTreeSet<String>,
    pub path: PathBuf,
}

impl ComposeTopologySpec {
    pub fn new(
        kind: ServiceKind,
        content: String,
        included_sections: BTreeSet<String>,
        target_dir: &Path,
    ) -> Self {
        Self {
            kind,
            content,
            included_sections,
            path: target_dir.join(MANIFEST_FILE),
        }
    }

    pub fn includes(&self, section: &str) -> bool {
        self.included_sections.contains(section)
    }

    /// Name of the service the health check should target.
    pub fn service_name(&self) -> &'static str {
        self.kind.compose_service()
    }
}
