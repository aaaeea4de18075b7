//! Orchestrator scenarios driven through the public API only.

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};

use berth_core::prelude::*;

/// Renders `<id>:<PORT>` so tests can see which variables reached the template.
struct EchoRenderer;

impl TemplateRenderer for EchoRenderer {
    fn render(&self, template_id: &str, variables: &TopologyVariables) -> BerthResult<String> {
        Ok(format!(
            "{template_id}:{}",
            variables.get("PORT").unwrap_or_default()
        ))
    }

    fn remove_optional_section(&self, content: &str, _section: &str) -> String {
        content.to_string()
    }

    fn optional_sections(&self, _content: &str) -> BTreeSet<String> {
        BTreeSet::new()
    }
}

#[derive(Clone, Default)]
struct RecordingFs {
    written: Arc<Mutex<Vec<(PathBuf, String)>>>,
}

impl Filesystem for RecordingFs {
    fn create_dir_all(&self, _path: &Path) -> BerthResult<()> {
        Ok(())
    }

    fn write_file(&self, path: &Path, content: &str) -> BerthResult<()> {
        self.written
            .lock()
            .unwrap()
            .push((path.to_path_buf(), content.to_string()));
        Ok(())
    }

    fn exists(&self, _path: &Path) -> bool {
        false
    }
}

/// `up` always succeeds; probes succeed from attempt `ready_at` onward.
#[derive(Clone)]
struct Runtime {
    ready_at: u32,
    probes: Arc<Mutex<u32>>,
}

impl ProcessRunner for Runtime {
    fn run(&self, command: &CommandSpec) -> BerthResult<ProcessOutput> {
        if !command.args.iter().any(|arg| arg == "exec") {
            return Ok(ProcessOutput::succeeded());
        }
        let mut probes = self.probes.lock().unwrap();
        *probes += 1;
        if *probes >= self.ready_at {
            Ok(ProcessOutput::succeeded())
        } else {
            Ok(ProcessOutput::failed(1, "not ready"))
        }
    }
}

struct NoSleep;

impl Sleeper for NoSleep {
    fn sleep(&self, _duration: Duration) {}
}

fn orchestrator(ready_at: u32, fs: RecordingFs) -> (ProvisioningOrchestrator, Arc<Mutex<u32>>) {
    let probes = Arc::new(Mutex::new(0));
    let runtime = Runtime {
        ready_at,
        probes: probes.clone(),
    };
    let orchestrator = ProvisioningOrchestrator::new(
        ComposeTopologyGenerator::new(Box::new(EchoRenderer), Box::new(fs)),
        ContainerLifecycleController::new(
            Box::new(runtime),
            Box::new(NoSleep),
            ContainerRuntime::default(),
        ),
    )
    .with_budget(HealthCheckBudget::new(3, 1).unwrap());
    (orchestrator, probes)
}

#[test]
fn container_ready_on_third_probe() {
    let fs = RecordingFs::default();
    let (orchestrator, probes) = orchestrator(3, fs.clone());
    let requested = ServiceConnectionConfig::new(
        ServiceKind::MySql,
        "db.internal",
        Some(3307),
        Credentials::database_defaults(),
    )
    .unwrap();

    let outcome = orchestrator
        .provision(ServiceKind::MySql, requested.clone(), Path::new("/srv/shop"))
        .unwrap();

    assert!(outcome.is_success());
    assert!(outcome.used_container());
    let config = outcome.config().unwrap();
    assert_eq!(config.host(), "127.0.0.1");
    assert_eq!(config.port(), 3307);
    assert_eq!(config.credentials(), requested.credentials());
    assert_eq!(*probes.lock().unwrap(), 3);

    let written = fs.written.lock().unwrap();
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].0, Path::new("/srv/shop/docker-compose.yml"));
    assert_eq!(written[0].1, "compose/mysql:3307");
}

#[test]
fn exhausted_budget_degrades_to_local() {
    let (orchestrator, probes) = orchestrator(10, RecordingFs::default());
    let requested = ServiceConnectionConfig::defaults_for(ServiceKind::Redis);

    let outcome = orchestrator
        .provision(ServiceKind::Redis, requested.clone(), Path::new("/srv/shop"))
        .unwrap();

    assert!(outcome.is_success());
    assert_eq!(outcome.fallback_from(), Some(FailureStage::HealthCheckTimeout));
    assert_eq!(outcome.config(), Some(&requested.into_local()));
    assert_eq!(*probes.lock().unwrap(), 3);
}

#[test]
fn credentials_for_the_wrong_kind_are_rejected() {
    let (orchestrator, _) = orchestrator(1, RecordingFs::default());
    let requested = ServiceConnectionConfig::defaults_for(ServiceKind::Redis);

    let result = orchestrator.provision(ServiceKind::MySql, requested, Path::new("/srv/shop"));

    assert!(result.is_err());
}

#[test]
fn outcome_serializes_for_callers() {
    let (orchestrator, _) = orchestrator(1, RecordingFs::default());
    let requested = ServiceConnectionConfig::defaults_for(ServiceKind::MariaDb).prefer_local();

    let outcome = orchestrator
        .provision(ServiceKind::MariaDb, requested, Path::new("/srv/shop"))
        .unwrap();
    let json = serde_json::to_value(&outcome).unwrap();

    assert_eq!(json["success"], true);
    assert_eq!(json["kind"], "mariadb");
    assert_eq!(json["config"]["using_container"], false);
    assert!(json.get("fallback_from").is_none());
}
