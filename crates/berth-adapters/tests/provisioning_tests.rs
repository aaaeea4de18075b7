//! End-to-end orchestrator runs over the real renderer and in-memory files.

use std::{
    path::Path,
    sync::{Arc, Mutex},
    time::Duration,
};

use berth_adapters::{LocalFilesystem, MemoryFilesystem, SimpleRenderer};
use berth_core::{
    application::ApplicationError,
    prelude::*,
};

/// Replays `up` and probe results; records every command line.
#[derive(Clone, Default)]
struct ScriptedRunner {
    up: Option<Result<ProcessOutput, ApplicationError>>,
    probes: Arc<Mutex<Vec<ProcessOutput>>>,
    log: Arc<Mutex<Vec<String>>>,
}

impl ScriptedRunner {
    fn starting(up: Result<ProcessOutput, ApplicationError>) -> Self {
        Self {
            up: Some(up),
            ..Self::default()
        }
    }

    fn then_probes(self, probes: Vec<ProcessOutput>) -> Self {
        *self.probes.lock().unwrap() = probes;
        self
    }

    fn commands(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(&self, command: &CommandSpec) -> BerthResult<ProcessOutput> {
        self.log.lock().unwrap().push(command.display());

        if command.args.iter().any(|a| a == "up") {
            return match &self.up {
                Some(Ok(output)) => Ok(output.clone()),
                Some(Err(e)) => Err(e.clone().into()),
                None => Ok(ProcessOutput::succeeded()),
            };
        }

        let mut probes = self.probes.lock().unwrap();
        if probes.is_empty() {
            Ok(ProcessOutput::failed(1, "not ready"))
        } else {
            Ok(probes.remove(0))
        }
    }
}

#[derive(Clone, Default)]
struct CountingSleeper(Arc<Mutex<Duration>>);

impl Sleeper for CountingSleeper {
    fn sleep(&self, duration: Duration) {
        *self.0.lock().unwrap() += duration;
    }
}

fn orchestrator(
    fs: Box<dyn Filesystem>,
    runner: &ScriptedRunner,
    sleeper: &CountingSleeper,
) -> ProvisioningOrchestrator {
    ProvisioningOrchestrator::new(
        ComposeTopologyGenerator::new(Box::new(SimpleRenderer::new()), fs),
        ContainerLifecycleController::new(
            Box::new(runner.clone()),
            Box::new(sleeper.clone()),
            ContainerRuntime::default(),
        ),
    )
    .with_budget(HealthCheckBudget::new(5, 2).unwrap())
}

fn cache_request(port: u16, password: &str) -> ServiceConnectionConfig {
    ServiceConnectionConfig::new(
        ServiceKind::Redis,
        "redis.local",
        Some(port),
        Credentials::Password {
            password: password.into(),
        },
    )
    .unwrap()
}

#[test]
fn cache_start_failure_falls_back_with_the_request_unchanged() {
    let runner = ScriptedRunner::starting(Err(ApplicationError::ProcessSpawn {
        program: "docker".into(),
        reason: "No such file or directory".into(),
    }));
    let fs = MemoryFilesystem::new();
    let orchestrator = orchestrator(Box::new(fs.clone()), &runner, &CountingSleeper::default());

    let outcome = orchestrator
        .provision(ServiceKind::Redis, cache_request(6380, "pw"), Path::new("/srv/blog"))
        .unwrap();

    let config = outcome.config().unwrap();
    assert!(outcome.is_success());
    assert!(!config.using_container());
    assert_eq!(config.host(), "redis.local");
    assert_eq!(config.port(), 6380);
    assert_eq!(config.password(), Some("pw"));
    assert_eq!(outcome.fallback_from(), Some(FailureStage::ContainerStart));

    // Manifest was still generated before the start attempt.
    assert!(fs.exists(Path::new("/srv/blog/docker-compose.yml")));
    assert_eq!(runner.commands().len(), 1);
}

#[test]
fn cache_container_success_on_first_probe() {
    let runner = ScriptedRunner::starting(Ok(ProcessOutput::succeeded()))
        .then_probes(vec![ProcessOutput::succeeded()]);
    let sleeper = CountingSleeper::default();
    let fs = MemoryFilesystem::new();
    let orchestrator = orchestrator(Box::new(fs.clone()), &runner, &sleeper);

    let outcome = orchestrator
        .provision(ServiceKind::Redis, cache_request(7001, "sekret"), Path::new("/srv/blog"))
        .unwrap();

    let config = outcome.config().unwrap();
    assert!(config.using_container());
    assert_eq!(config.host(), "127.0.0.1");
    assert_eq!(config.port(), 7001);
    assert_eq!(config.password(), Some("sekret"));
    assert_eq!(*sleeper.0.lock().unwrap(), Duration::ZERO);

    let manifest = fs.read_file(Path::new("/srv/blog/docker-compose.yml")).unwrap();
    assert!(manifest.contains("\"7001:6379\""));
    assert!(manifest.contains("--requirepass\", \"sekret\""));
    assert!(manifest.contains("container_name: berth-blog-redis"));

    let commands = runner.commands();
    assert_eq!(commands[0], "docker compose -f docker-compose.yml up -d");
    assert_eq!(
        commands[1],
        "docker compose -f docker-compose.yml exec -T redis redis-cli -a sekret ping"
    );
}

#[test]
fn health_timeout_probes_max_attempts_and_waits_between_them() {
    let runner = ScriptedRunner::starting(Ok(ProcessOutput::succeeded()));
    let sleeper = CountingSleeper::default();
    let orchestrator = orchestrator(Box::new(MemoryFilesystem::new()), &runner, &sleeper);

    let outcome = orchestrator
        .provision(ServiceKind::MySql, ServiceConnectionConfig::defaults_for(ServiceKind::MySql), Path::new("/srv/shop"))
        .unwrap();

    assert!(outcome.is_success());
    assert_eq!(outcome.fallback_from(), Some(FailureStage::HealthCheckTimeout));

    let probes = runner.commands().iter().filter(|c| c.contains(" exec ")).count();
    assert_eq!(probes, 5);
    assert!(*sleeper.0.lock().unwrap() >= Duration::from_secs(4 * 2));
    assert_eq!(
        runner.commands().last().map(String::as_str),
        Some("docker compose -f docker-compose.yml down")
    );
}

#[test]
fn unwritable_target_falls_back_without_starting() {
    let runner = ScriptedRunner::default();
    let fs = MemoryFilesystem::new();
    fs.mark_read_only(Path::new("/ro"));
    let orchestrator = orchestrator(Box::new(fs), &runner, &CountingSleeper::default());

    let outcome = orchestrator
        .provision(ServiceKind::MariaDb, ServiceConnectionConfig::defaults_for(ServiceKind::MariaDb), Path::new("/ro/app"))
        .unwrap();

    assert!(outcome.is_success());
    assert_eq!(outcome.fallback_from(), Some(FailureStage::TemplateGeneration));
    assert!(runner.commands().is_empty());
}

#[test]
fn generation_is_byte_for_byte_idempotent_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let generator = ComposeTopologyGenerator::new(
        Box::new(SimpleRenderer::new()),
        Box::new(LocalFilesystem::new()),
    );
    let config = ServiceConnectionConfig::defaults_for(ServiceKind::MySql);
    let vars = TopologyVariables::for_service(ServiceKind::MySql, "shop", &config);

    let first = generator.generate(ServiceKind::MySql, dir.path(), &vars).unwrap();
    let on_disk = std::fs::read(dir.path().join("docker-compose.yml")).unwrap();
    let second = generator.generate(ServiceKind::MySql, dir.path(), &vars).unwrap();

    assert_eq!(first, second);
    assert_eq!(on_disk, std::fs::read(dir.path().join("docker-compose.yml")).unwrap());
    assert!(!second.content.contains("{{"));
}

#[test]
fn manifest_without_sidecar_is_a_subset_of_the_full_one() {
    let generator = ComposeTopologyGenerator::new(
        Box::new(SimpleRenderer::new()),
        Box::new(MemoryFilesystem::new()),
    );
    let config = ServiceConnectionConfig::defaults_for(ServiceKind::Redis);
    let vars = TopologyVariables::for_service(ServiceKind::Redis, "blog", &config);

    let full = generator
        .generate_with(ServiceKind::Redis, Path::new("/a"), &vars, true)
        .unwrap();
    let lean = generator
        .generate_with(ServiceKind::Redis, Path::new("/a"), &vars, false)
        .unwrap();

    assert!(full.includes("redis-commander"));
    assert!(!lean.includes("redis-commander"));
    assert!(!lean.content.contains("redis-commander"));
    for line in lean.content.lines() {
        assert!(full.content.lines().any(|l| l == line), "unexpected line: {line}");
    }
    assert!(lean.content.contains("image: redis:7-alpine"));
}
