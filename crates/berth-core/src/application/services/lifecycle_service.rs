//! Container Lifecycle Controller - starts a topology and waits for readiness.
//!
//! ## Sequence
//!
//! 1. `<runtime> compose -f docker-compose.yml up -d` with the start timeout.
//!    A spawn error, timeout, or non-zero exit ends the run immediately.
//! 2. Up to `max_attempts` probes of
//!    `<runtime> compose -f docker-compose.yml exec -T <service> <probe...>`,
//!    each bounded by the probe timeout, sleeping `interval` between them.
//!
//! The wait is blocking; the attempt count is the only cancellation point.

use std::path::Path;

use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{CommandSpec, ProcessRunner, Sleeper},
    },
    domain::{ContainerRuntime, DomainValidator as validator, HealthCheckPolicy},
    error::BerthResult,
};

/// Drives the container runtime for one target directory at a time.
pub struct ContainerLifecycleController {
    runner: Box<dyn ProcessRunner>,
    sleeper: Box<dyn Sleeper>,
    runtime: ContainerRuntime,
}

impl ContainerLifecycleController {
    pub fn new(
        runner: Box<dyn ProcessRunner>,
        sleeper: Box<dyn Sleeper>,
        runtime: ContainerRuntime,
    ) -> Self {
        Self {
            runner,
            sleeper,
            runtime,
        }
    }

    pub fn runtime(&self) -> &ContainerRuntime {
        &self.runtime
    }

    /// Start the topology, then poll until ready.
    ///
    /// Errors are the recoverable kinds the orchestrator falls back on:
    /// container-start failures and `HealthCheckTimedOut`.
    #[instrument(skip_all, fields(target = %target_dir.display(), service = policy.service_name()))]
    pub fn start_and_wait(&self, target_dir: &Path, policy: &HealthCheckPolicy) -> BerthResult<()> {
        validator::validate_policy(policy)?;
        self.start(target_dir)?;

        if self.wait_until_ready(target_dir, policy) {
            Ok(())
        } else {
            Err(ApplicationError::HealthCheckTimedOut {
                service: policy.service_name().to_string(),
                attempts: policy.max_attempts(),
            }
            .into())
        }
    }

    /// Bring the topology up in detached mode.
    pub fn start(&self, target_dir: &Path) -> BerthResult<()> {
        let command = self
            .compose(target_dir, ["up", "-d"])
            .timeout(self.runtime.start_timeout());

        info!(command = %command.display(), "Starting containers");
        let output = self.runner.run(&command)?;

        if output.success {
            Ok(())
        } else {
            Err(ApplicationError::ContainerStartFailed {
                reason: failure_reason(output.exit_code, &output.stderr),
            }
            .into())
        }
    }

    /// Probe the policy's service until it answers or attempts run out.
    ///
    /// Returns `false` on exhaustion; a timed-out wait is an expected outcome.
    pub fn wait_until_ready(&self, target_dir: &Path, policy: &HealthCheckPolicy) -> bool {
        let mut exec = vec!["exec".to_string(), "-T".to_string(), policy.service_name().to_string()];
        exec.extend(policy.probe().iter().cloned());

        let command = self
            .compose(target_dir, exec)
            .timeout(self.runtime.probe_timeout());

        for attempt in 1..=policy.max_attempts() {
            match self.runner.run(&command) {
                Ok(output) if output.success => {
                    info!(attempt, "Service is ready");
                    return true;
                }
                Ok(output) => debug!(attempt, exit_code = ?output.exit_code, "Probe failed"),
                Err(e) => debug!(attempt, error = %e, "Probe could not run"),
            }

            if attempt < policy.max_attempts() {
                self.sleeper.sleep(policy.interval());
            }
        }

        warn!(
            attempts = policy.max_attempts(),
            "Service did not become ready"
        );
        false
    }

    /// Tear the topology down (`compose down`).
    pub fn stop(&self, target_dir: &Path) -> BerthResult<()> {
        let command = self
            .compose(target_dir, ["down"])
            .timeout(self.runtime.start_timeout());

        let output = self.runner.run(&command)?;
        if output.success {
            info!("Containers stopped");
            Ok(())
        } else {
            Err(ApplicationError::ContainerStopFailed {
                reason: failure_reason(output.exit_code, &output.stderr),
            }
            .into())
        }
    }

    fn compose<I, S>(&self, target_dir: &Path, subcommand: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandSpec::new(&self.runtime.binary, target_dir).args(self.runtime.compose_args(subcommand))
    }
}

fn failure_reason(exit_code: Option<i32>, stderr: &str) -> String {
    let code = exit_code.map_or_else(|| "signal".to_string(), |c| c.to_string());
    let detail = stderr.trim();
    if detail.is_empty() {
        format!("exit status {code}")
    } else {
        format!("exit status {code}: {detail}")
    }
}
