//! Result of one orchestration attempt.

use serde::Serialize;
use uuid::Uuid;

use crate::domain::{FailureStage, ServiceConnectionConfig, ServiceKind};

/// Normalized result returned by the provisioning orchestrator.
///
/// Never an error: callers check [`Self::is_success`]. When a container
/// attempt degraded to the local strategy, `fallback_from` names the stage
/// that failed so the caller can tell the user why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisioningOutcome {
    attempt_id: Uuid,
    kind: ServiceKind,
    success: bool,
    config: Option<ServiceConnectionConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure_stage: Option<FailureStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fallback_from: Option<FailureStage>,
}

impl ProvisioningOutcome {
    pub fn container(attempt_id: Uuid, kind: ServiceKind, config: ServiceConnectionConfig) -> Self {
        Self {
            attempt_id,
            kind,
            success: true,
            config: Some(config),
            failure_stage: None,
            failure_reason: None,
            fallback_from: None,
        }
    }

    pub fn local(
        attempt_id: Uuid,
        kind: ServiceKind,
        config: ServiceConnectionConfig,
        fallback_from: Option<FailureStage>,
    ) -> Self {
        Self {
            attempt_id,
            kind,
            success: true,
            config: Some(config),
            failure_stage: None,
            failure_reason: None,
            fallback_from,
        }
    }

    pub fn failed(
        attempt_id: Uuid,
        kind: ServiceKind,
        stage: FailureStage,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            attempt_id,
            kind,
            success: false,
            config: None,
            failure_stage: Some(stage),
            failure_reason: Some(reason.into()),
            fallback_from: None,
        }
    }

    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    pub fn kind(&self) -> ServiceKind {
        self.kind
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Connection values; `None` when the attempt failed.
    pub fn config(&self) -> Option<&ServiceConnectionConfig> {
        self.config.as_ref()
    }

    pub fn failure_stage(&self) -> Option<FailureStage> {
        self.failure_stage
    }

    /// Human-readable cause of a failed attempt.
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    pub fn fallback_from(&self) -> Option<FailureStage> {
        self.fallback_from
    }

    pub fn used_container(&self) -> bool {
        self.config.as_ref().is_some_and(|c| c.using_container())
    }
}
