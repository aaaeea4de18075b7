//! Provisioning Orchestrator - container-first with local fallback.
//!
//! ```text
//! Start ──using_container──▶ GenerateTopology ──ok──▶ StartContainer ──ok──▶ ContainerSuccess
//!   │                              │ err                    │ err
//!   └──────────────────────────────┴────────▶ Local ◀───────┘
//! ```
//!
//! A health-check timeout tears the half-started topology down before
//! falling back, so the local configuration never points at it.
//!
//! `ContainerSuccess` reports the requested port and credentials on
//! loopback. `Local` reports the request unchanged with `using_container`
//! cleared and, for relational kinds with admin credentials, provisions the
//! schema directly.

use std::path::Path;

use tracing::{Span, field, info, instrument, warn};
use uuid::Uuid;

use crate::{
    application::services::{
        ComposeTopologyGenerator, ContainerLifecycleController, DirectConnectionProvisioner,
    },
    domain::{
        AdminCredentials, Credentials, DomainValidator as validator, FailureStage,
        HealthCheckBudget, ProvisioningOutcome, ServiceConnectionConfig, ServiceKind,
        TopologyVariables,
    },
    error::BerthResult,
};

/// Per-call knobs that are not part of the connection request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionOptions {
    /// Name used for container/volume/network prefixes. Defaults to the
    /// target directory's final component.
    pub app_name: Option<String>,
    /// Keep the admin-UI sidecar in the manifest.
    pub include_sidecars: bool,
    /// Server administrator; enables direct provisioning on the local path.
    pub admin: Option<AdminCredentials>,
}

impl Default for ProvisionOptions {
    fn default() -> Self {
        Self {
            app_name: None,
            include_sidecars: true,
            admin: None,
        }
    }
}

impl ProvisionOptions {
    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    pub fn without_sidecars(mut self) -> Self {
        self.include_sidecars = false;
        self
    }

    pub fn with_admin(mut self, admin: AdminCredentials) -> Self {
        self.admin = Some(admin);
        self
    }
}

/// Entry point for provisioning one backing service.
pub struct ProvisioningOrchestrator {
    generator: ComposeTopologyGenerator,
    lifecycle: ContainerLifecycleController,
    provisioner: Option<DirectConnectionProvisioner>,
    budget: HealthCheckBudget,
}

impl ProvisioningOrchestrator {
    pub fn new(generator: ComposeTopologyGenerator, lifecycle: ContainerLifecycleController) -> Self {
        Self {
            generator,
            lifecycle,
            provisioner: None,
            budget: HealthCheckBudget::default(),
        }
    }

    pub fn with_provisioner(mut self, provisioner: DirectConnectionProvisioner) -> Self {
        self.provisioner = Some(provisioner);
        self
    }

    pub fn with_budget(mut self, budget: HealthCheckBudget) -> Self {
        self.budget = budget;
        self
    }

    pub fn budget(&self) -> HealthCheckBudget {
        self.budget
    }

    /// [`Self::provision_with`] using default options.
    pub fn provision(
        &self,
        kind: ServiceKind,
        requested: ServiceConnectionConfig,
        target_dir: &Path,
    ) -> BerthResult<ProvisioningOutcome> {
        self.provision_with(kind, requested, target_dir, &ProvisionOptions::default())
    }

    /// Provision `kind` for the application in `target_dir`.
    ///
    /// Container and health-check failures never surface as `Err`: they
    /// degrade to the local strategy and are recorded in
    /// [`ProvisioningOutcome::fallback_from`]. `Err` is reserved for invalid
    /// requests (credentials that do not fit `kind`, an unusable budget).
    #[instrument(
        skip_all,
        fields(kind = %kind, target = %target_dir.display(), attempt_id = field::Empty)
    )]
    pub fn provision_with(
        &self,
        kind: ServiceKind,
        requested: ServiceConnectionConfig,
        target_dir: &Path,
        options: &ProvisionOptions,
    ) -> BerthResult<ProvisioningOutcome> {
        let attempt_id = Uuid::new_v4();
        Span::current().record("attempt_id", field::display(attempt_id));

        validator::validate_connection(kind, &requested)?;
        self.budget.validate()?;

        if !requested.using_container() {
            info!("Local strategy requested");
            return Ok(self.local(attempt_id, kind, requested, options, None));
        }

        match self.run_container(kind, &requested, target_dir, options) {
            Ok(()) => {
                info!("Container ready");
                Ok(ProvisioningOutcome::container(
                    attempt_id,
                    kind,
                    requested.into_container(),
                ))
            }
            Err(e) => {
                let stage = e.failure_stage().unwrap_or(FailureStage::ContainerStart);
                warn!(stage = %stage, error = %e, "Container strategy failed, using local configuration");
                if stage == FailureStage::HealthCheckTimeout {
                    self.stop_started(target_dir);
                }
                Ok(self.local(attempt_id, kind, requested, options, Some(stage)))
            }
        }
    }

    fn run_container(
        &self,
        kind: ServiceKind,
        requested: &ServiceConnectionConfig,
        target_dir: &Path,
        options: &ProvisionOptions,
    ) -> BerthResult<()> {
        let app_name = options
            .app_name
            .clone()
            .unwrap_or_else(|| default_app_name(target_dir));
        let variables = TopologyVariables::for_service(kind, &app_name, requested);

        self.generator
            .generate_with(kind, target_dir, &variables, options.include_sidecars)?;

        let policy = self.budget.policy_for(kind, requested)?;
        self.lifecycle.start_and_wait(target_dir, &policy)
    }

    /// Best-effort `compose down` after `up` succeeded but readiness never came.
    fn stop_started(&self, target_dir: &Path) {
        if let Err(e) = self.lifecycle.stop(target_dir) {
            warn!(error = %e, "Could not stop containers that never became ready");
        }
    }

    fn local(
        &self,
        attempt_id: Uuid,
        kind: ServiceKind,
        requested: ServiceConnectionConfig,
        options: &ProvisionOptions,
        fallback_from: Option<FailureStage>,
    ) -> ProvisioningOutcome {
        let config = requested.into_local();

        if let (Some(admin), true) = (&options.admin, kind.is_relational()) {
            if let Err(reason) = self.provision_directly(&config, admin) {
                return ProvisioningOutcome::failed(
                    attempt_id,
                    kind,
                    FailureStage::DirectConnection,
                    reason,
                );
            }
        }

        ProvisioningOutcome::local(attempt_id, kind, config, fallback_from)
    }

    fn provision_directly(
        &self,
        config: &ServiceConnectionConfig,
        admin: &AdminCredentials,
    ) -> Result<(), String> {
        let Some(provisioner) = &self.provisioner else {
            return Err("no database connector configured".into());
        };

        let Credentials::Database {
            database,
            username,
            password,
            ..
        } = config.credentials()
        else {
            return Err("database credentials required".into());
        };

        provisioner
            .create_database_and_user(
                config.host(),
                config.port(),
                admin,
                database,
                username,
                password,
            )
            .map_err(|e| e.to_string())
    }
}

fn default_app_name(target_dir: &Path) -> String {
    target_dir
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("app")
        .to_string()
}
