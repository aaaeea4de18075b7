//! Connection values handed back to whatever writes application config.
//!
//! [`ServiceConnectionConfig`] is immutable: each orchestration stage that
//! changes strategy builds a new value through a consuming transition
//! (`into_container`, `into_local`) rather than mutating fields.

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, ServiceFamily, ServiceKind};

/// Address every managed container is published on.
pub const LOOPBACK: &str = "127.0.0.1";

/// Service-specific secrets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Credentials {
    /// No authentication (e.g. an open local cache).
    None,
    /// Single shared password (cache servers).
    Password { password: String },
    /// Application database, its low-privilege user, and the server root password.
    Database {
        database: String,
        username: String,
        password: String,
        root_password: String,
    },
}

impl Credentials {
    /// Placeholder database credentials used when the caller supplies none.
    pub fn database_defaults() -> Self {
        Self::Database {
            database: "app".into(),
            username: "app".into(),
            password: "secret".into(),
            root_password: "secret".into(),
        }
    }

    /// Secret used by the in-container probe.
    pub fn probe_secret(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Password { password } => Some(password.as_str()),
            Self::Database { root_password, .. } => Some(root_password.as_str()),
        }
    }

    /// Password the application itself authenticates with.
    pub fn password(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Password { password } | Self::Database { password, .. } => {
                Some(password.as_str())
            }
        }
    }

    fn check_kind(&self, kind: ServiceKind) -> Result<(), DomainError> {
        let ok = match (kind.family(), self) {
            (ServiceFamily::RelationalDatabase, Self::Database { .. }) => true,
            (ServiceFamily::Cache, Self::None | Self::Password { .. }) => true,
            _ => false,
        };

        if ok {
            Ok(())
        } else {
            Err(DomainError::CredentialsMismatch {
                kind: kind.to_string(),
                reason: format!("{} services cannot use these credentials", kind.family()),
            })
        }
    }
}

/// Elevated credentials used only while provisioning a database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl AdminCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// How to reach a provisioned service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConnectionConfig {
    host: String,
    port: u16,
    credentials: Credentials,
    using_container: bool,
}

impl ServiceConnectionConfig {
    /// Build a validated request for `kind`.
    ///
    /// `port` falls back to the kind's default. `using_container` starts as
    /// `true` (container-first); call [`Self::prefer_local`] to opt out.
    pub fn new(
        kind: ServiceKind,
        host: impl Into<String>,
        port: Option<u16>,
        credentials: Credentials,
    ) -> Result<Self, DomainError> {
        let config = Self {
            host: host.into(),
            port: port.unwrap_or_else(|| kind.default_port()),
            credentials,
            using_container: true,
        };
        config.validate(kind)?;
        Ok(config)
    }

    /// Loopback, default port, placeholder credentials, container-first.
    pub fn defaults_for(kind: ServiceKind) -> Self {
        let credentials = match kind.family() {
            ServiceFamily::RelationalDatabase => Credentials::database_defaults(),
            ServiceFamily::Cache => Credentials::None,
        };

        Self {
            host: LOOPBACK.into(),
            port: kind.default_port(),
            credentials,
            using_container: true,
        }
    }

    /// Same request, with the host-local strategy chosen up front.
    pub fn prefer_local(self) -> Self {
        Self {
            using_container: false,
            ..self
        }
    }

    /// Same request, with the container strategy chosen up front.
    pub fn prefer_container(self) -> Self {
        Self {
            using_container: true,
            ..self
        }
    }

    /// Values for a container published on this machine.
    ///
    /// Port and credentials are preserved; the host becomes loopback.
    pub fn into_container(self) -> Self {
        Self {
            host: LOOPBACK.into(),
            using_container: true,
            ..self
        }
    }

    /// Values for a pre-existing local service: the request, unchanged, with
    /// `using_container` cleared.
    pub fn into_local(self) -> Self {
        self.prefer_local()
    }

    pub fn validate(&self, kind: ServiceKind) -> Result<(), DomainError> {
        if self.host.trim().is_empty() {
            return Err(DomainError::InvalidConnection("host cannot be empty".into()));
        }
        if self.port == 0 {
            return Err(DomainError::InvalidConnection("port cannot be 0".into()));
        }
        self.credentials.check_kind(kind)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn using_container(&self) -> bool {
        self.using_container
    }

    pub fn password(&self) -> Option<&str> {
        self.credentials.password()
    }
}
