use crate::domain::{
    entities::{HealthCheckPolicy, ServiceConnectionConfig, health::ContainerRuntime},
    error::DomainError,
    value_objects::ServiceKind,
};

/// Centralized domain validation.
///
/// All validation logic lives here, not scattered across services.
pub struct DomainValidator;

impl DomainValidator {
    pub fn validate_connection(
        kind: ServiceKind,
        config: &ServiceConnectionConfig,
    ) -> Result<(), DomainError> {
        config.validate(kind)
    }

    pub fn validate_policy(policy: &HealthCheckPolicy) -> Result<(), DomainError> {
        policy.validate()
    }

    pub fn validate_runtime(runtime: &ContainerRuntime) -> Result<(), DomainError> {
        runtime.validate()
    }
}
