pub mod connection;
pub mod health;
pub mod outcome;
pub mod topology;

pub use crate::domain::DomainError;
pub use connection::ServiceConnectionConfig;
pub use health::HealthCheckPolicy;
pub use outcome::ProvisioningOutcome;
pub use topology::ComposeTopologySpec;
