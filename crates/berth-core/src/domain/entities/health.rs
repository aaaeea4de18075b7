//! Health-check and container-runtime parameters.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, ServiceConnectionConfig, ServiceKind};

/// How to poll a started service for readiness.
///
/// A parameter object consumed by one lifecycle run; total wait is bounded
/// by `max_attempts * interval_secs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheckPolicy {
    service_name: String,
    max_attempts: u32,
    interval_secs: u64,
    probe: Vec<String>,
}

impl HealthCheckPolicy {
    pub fn new(
        service_name: impl Into<String>,
        max_attempts: u32,
        interval_secs: u64,
    ) -> Result<Self, DomainError> {
        let policy = Self {
            service_name: service_name.into(),
            max_attempts,
            interval_secs,
            probe: Vec::new(),
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Policy targeting `kind`'s compose service with its standard probe.
    pub fn for_service(
        kind: ServiceKind,
        config: &ServiceConnectionConfig,
        max_attempts: u32,
        interval_secs: u64,
    ) -> Result<Self, DomainError> {
        Ok(Self::new(kind.compose_service(), max_attempts, interval_secs)?
            .with_probe(kind.probe_command(config.credentials().probe_secret())))
    }

    /// Command run inside the service container on each attempt.
    pub fn with_probe(mut self, probe: Vec<String>) -> Self {
        self.probe = probe;
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.service_name.trim().is_empty() {
            return Err(DomainError::InvalidPolicy("service name cannot be empty".into()));
        }
        if self.max_attempts == 0 {
            return Err(DomainError::InvalidPolicy("max_attempts must be positive".into()));
        }
        if self.interval_secs == 0 {
            return Err(DomainError::InvalidPolicy("interval_secs must be positive".into()));
        }
        Ok(())
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn probe(&self) -> &[String] {
        &self.probe
    }

    /// Upper bound on time spent sleeping between probes.
    pub fn max_wait(&self) -> Duration {
        self.interval() * self.max_attempts
    }
}

/// Retry budget applied to every health check an orchestrator runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheckBudget {
    pub max_attempts: u32,
    pub interval_secs: u64,
}

impl Default for HealthCheckBudget {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            interval_secs: 2,
        }
    }
}

impl HealthCheckBudget {
    pub fn new(max_attempts: u32, interval_secs: u64) -> Result<Self, DomainError> {
        let budget = Self {
            max_attempts,
            interval_secs,
        };
        budget.validate()?;
        Ok(budget)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.max_attempts == 0 || self.interval_secs == 0 {
            return Err(DomainError::InvalidPolicy(
                "max_attempts and interval_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Policy for `kind` with this budget and the kind's standard probe.
    pub fn policy_for(
        &self,
        kind: ServiceKind,
        config: &ServiceConnectionConfig,
    ) -> Result<HealthCheckPolicy, DomainError> {
        HealthCheckPolicy::for_service(kind, config, self.max_attempts, self.interval_secs)
    }
}

/// Container orchestration binary and its timeouts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRuntime {
    pub binary: String,
    pub start_timeout_secs: u64,
    pub probe_timeout_secs: u64,
}

impl Default for ContainerRuntime {
    fn default() -> Self {
        Self {
            binary: "docker".into(),
            start_timeout_secs: 300,
            probe_timeout_secs: 10,
        }
    }
}

impl ContainerRuntime {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.binary.trim().is_empty() {
            return Err(DomainError::MissingRequiredField {
                field: "container.runtime",
            });
        }
        if self.probe_timeout_secs == 0 || self.start_timeout_secs < self.probe_timeout_secs {
            return Err(DomainError::InvalidPolicy(
                "start timeout must be at least the (non-zero) probe timeout".into(),
            ));
        }
        Ok(())
    }

    pub fn start_timeout(&self) -> Duration {
        Duration::from_secs(self.start_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    /// `compose -f <manifest> <subcommand...>` argument list.
    pub fn compose_args<I, S>(&self, subcommand: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = vec![
            "compose".to_string(),
            "-f".to_string(),
            crate::domain::MANIFEST_FILE.to_string(),
        ];
        args.extend(subcommand.into_iter().map(Into::into));
        args
    }
}
