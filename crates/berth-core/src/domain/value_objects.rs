//! Domain value objects: ServiceKind, ServiceFamily, FailureStage.
//!
//! # Design
//!
//! These are pure value types: `Copy`, equality-by-value, no identity.
//! Every per-kind fact (template id, compose service, ports, probe) is an
//! exhaustive `match` on [`ServiceKind`], so adding a variant fails to compile
//! until every table below has an arm for it.
//!
//! # Adding New Variants
//!
//! 1. Add the enum variant here
//! 2. Add an arm to each table method and to `FromStr`
//! 3. Add the compose template to `berth-adapters/templates/`
//! 4. Done; the orchestrator needs no change

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── ServiceFamily ────────────────────────────────────────────────────────────

/// Broad category of a backing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceFamily {
    RelationalDatabase,
    Cache,
}

impl ServiceFamily {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RelationalDatabase => "relational-database",
            Self::Cache => "cache",
        }
    }
}

impl fmt::Display for ServiceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── ServiceKind ──────────────────────────────────────────────────────────────

/// A backing service that can be provisioned for an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    MySql,
    MariaDb,
    Redis,
}

impl ServiceKind {
    /// Every supported kind, in display order.
    pub const ALL: [ServiceKind; 3] = [Self::MySql, Self::MariaDb, Self::Redis];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::MariaDb => "mariadb",
            Self::Redis => "redis",
        }
    }

    pub const fn family(&self) -> ServiceFamily {
        match self {
            Self::MySql | Self::MariaDb => ServiceFamily::RelationalDatabase,
            Self::Redis => ServiceFamily::Cache,
        }
    }

    /// Identifier of the compose template rendered for this kind.
    pub const fn template_id(&self) -> &'static str {
        match self {
            Self::MySql => "compose/mysql",
            Self::MariaDb => "compose/mariadb",
            Self::Redis => "compose/redis",
        }
    }

    /// Name of the service declared inside the compose template.
    pub const fn compose_service(&self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::MariaDb => "mariadb",
            Self::Redis => "redis",
        }
    }

    /// Port the service listens on when none is requested.
    pub const fn default_port(&self) -> u16 {
        match self {
            Self::MySql | Self::MariaDb => 3306,
            Self::Redis => 6379,
        }
    }

    /// Optional admin-UI sidecar section shipped with the template.
    pub const fn sidecar_section(&self) -> &'static str {
        match self {
            Self::MySql | Self::MariaDb => "phpmyadmin",
            Self::Redis => "redis-commander",
        }
    }

    /// Host port the admin-UI sidecar is published on.
    pub const fn sidecar_port(&self) -> u16 {
        match self {
            Self::MySql | Self::MariaDb => 8080,
            Self::Redis => 8081,
        }
    }

    pub const fn is_relational(&self) -> bool {
        matches!(self.family(), ServiceFamily::RelationalDatabase)
    }

    /// In-container liveness command.
    ///
    /// `secret` is the root password for relational kinds and the server
    /// password for the cache; `None` probes without authentication.
    pub fn probe_command(&self, secret: Option<&str>) -> Vec<String> {
        let mut argv: Vec<String> = match self {
            Self::MySql => vec!["mysqladmin".into(), "ping".into(), "-h".into(), "127.0.0.1".into()],
            Self::MariaDb => vec![
                "mariadb-admin".into(),
                "ping".into(),
                "-h".into(),
                "127.0.0.1".into(),
            ],
            Self::Redis => vec!["redis-cli".into()],
        };

        match (self.family(), secret) {
            (ServiceFamily::RelationalDatabase, Some(root)) => {
                argv.push("-uroot".into());
                argv.push(format!("-p{root}"));
                argv.push("--silent".into());
            }
            (ServiceFamily::RelationalDatabase, None) => argv.push("--silent".into()),
            (ServiceFamily::Cache, Some(password)) if !password.is_empty() => {
                argv.push("-a".into());
                argv.push(password.into());
                argv.push("ping".into());
            }
            (ServiceFamily::Cache, _) => argv.push("ping".into()),
        }

        argv
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" => Ok(Self::MySql),
            "mariadb" | "maria" => Ok(Self::MariaDb),
            "redis" | "cache" => Ok(Self::Redis),
            other => Err(DomainError::UnknownServiceKind(other.to_string())),
        }
    }
}

// ── FailureStage ─────────────────────────────────────────────────────────────

/// Stage of an orchestration attempt that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureStage {
    TemplateGeneration,
    ContainerStart,
    HealthCheckTimeout,
    DirectConnection,
}

impl FailureStage {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TemplateGeneration => "template-generation",
            Self::ContainerStart => "container-start",
            Self::HealthCheckTimeout => "health-check-timeout",
            Self::DirectConnection => "direct-connection",
        }
    }
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
