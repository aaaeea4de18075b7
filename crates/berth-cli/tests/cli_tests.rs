//! End-to-end tests for the `berth` binary.
//!
//! Every command runs in a fresh temporary directory with
//! `XDG_CONFIG_HOME` pointed inside it, so no user configuration leaks in.

use std::{fs, path::Path};

use assert_cmd::{Command, cargo};
use predicates::prelude::*;
use tempfile::TempDir;

fn berth(sandbox: &Path) -> Command {
    let mut cmd = cargo::cargo_bin_cmd!("berth");
    cmd.current_dir(sandbox)
        .env("XDG_CONFIG_HOME", sandbox.join("xdg"))
        .env("HOME", sandbox)
        .env_remove("RUST_LOG")
        .env_remove("BERTH_TEMPLATES_DIR")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn help_lists_commands() {
    let temp = TempDir::new().unwrap();
    berth(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("provision"))
        .stdout(predicate::str::contains("compose"))
        .stdout(predicate::str::contains("services"));
}

#[test]
fn version_flag() {
    let temp = TempDir::new().unwrap();
    berth(temp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_service_kind_is_a_usage_error() {
    let temp = TempDir::new().unwrap();
    berth(temp.path())
        .args(["provision", "postgres"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("postgres"));
}

// ── provision ─────────────────────────────────────────────────────────────────

#[test]
fn missing_runtime_falls_back_to_local() {
    let temp = TempDir::new().unwrap();
    let app = temp.path().join("shop");

    berth(temp.path())
        .args(["provision", "redis", "--runtime", "/nonexistent/docker", "--dir"])
        .arg(&app)
        .args(["--port", "7001", "--password", "sekret"])
        .assert()
        .success()
        .stdout(predicate::str::contains("container-start"))
        .stdout(predicate::str::contains("REDIS_HOST=127.0.0.1"))
        .stdout(predicate::str::contains("REDIS_PORT=7001"))
        .stdout(predicate::str::contains("REDIS_PASSWORD=sekret"));

    let manifest = fs::read_to_string(app.join("docker-compose.yml")).unwrap();
    assert!(manifest.contains("name: berth-shop"));
    assert!(manifest.contains("\"7001:6379\""));
}

#[test]
fn json_outcome_records_the_fallback() {
    let temp = TempDir::new().unwrap();
    let app = temp.path().join("shop");

    let assert = berth(temp.path())
        .args(["--output-format", "json", "provision", "mysql"])
        .args(["--runtime", "/nonexistent/docker", "--dir"])
        .arg(&app)
        .assert()
        .success();

    let outcome: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(outcome["success"], true);
    assert_eq!(outcome["kind"], "mysql");
    assert_eq!(outcome["fallback_from"], "container-start");
    assert_eq!(outcome["config"]["using_container"], false);
    assert_eq!(outcome["config"]["port"], 3306);
}

#[test]
fn local_strategy_writes_no_manifest() {
    let temp = TempDir::new().unwrap();
    let app = temp.path().join("shop");

    berth(temp.path())
        .args(["provision", "mariadb", "--local", "--host", "db.internal", "--dir"])
        .arg(&app)
        .args(["--db-name", "shop"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DB_HOST=db.internal"))
        .stdout(predicate::str::contains("DB_DATABASE=shop"))
        .stdout(predicate::str::contains("container-start").not());

    assert!(!app.join("docker-compose.yml").exists());
}

#[test]
fn failed_direct_provisioning_exits_non_zero() {
    let temp = TempDir::new().unwrap();

    berth(temp.path())
        .args(["provision", "mysql", "--local", "--port", "1"])
        .args(["--admin-user", "root", "--admin-password", "root"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("direct-connection"))
        .stderr(predicate::str::contains("--admin-user"));
}

#[test]
fn cache_rejects_database_flags() {
    let temp = TempDir::new().unwrap();

    berth(temp.path())
        .args(["provision", "redis", "--local", "--db-name", "shop"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--password"));
}

// ── compose / down ────────────────────────────────────────────────────────────

#[test]
fn compose_writes_manifest_with_sidecar() {
    let temp = TempDir::new().unwrap();

    berth(temp.path())
        .args(["compose", "mysql", "--dir", "out", "--app-name", "My Shop"])
        .assert()
        .success()
        .stdout(predicate::str::contains("docker-compose.yml"));

    let manifest = fs::read_to_string(temp.path().join("out/docker-compose.yml")).unwrap();
    assert!(manifest.contains("container_name: berth-my-shop-mysql"));
    assert!(manifest.contains("phpmyadmin"));
    assert!(!manifest.contains("{{"));
}

#[test]
fn compose_without_admin_ui_is_byte_identical_on_rerun() {
    let temp = TempDir::new().unwrap();
    let run = || {
        berth(temp.path())
            .args(["compose", "redis", "--dir", "out", "--no-admin-ui"])
            .assert()
            .success();
        fs::read(temp.path().join("out/docker-compose.yml")).unwrap()
    };

    let first = run();
    let second = run();
    assert_eq!(first, second);
    assert!(!String::from_utf8(first).unwrap().contains("redis-commander"));
}

#[test]
fn compose_honours_template_override_from_config() {
    let temp = TempDir::new().unwrap();
    let templates = temp.path().join("templates");
    fs::create_dir_all(&templates).unwrap();
    fs::write(templates.join("redis.yml"), "name: {{PROJECT_NAME}}\n# custom\n").unwrap();
    fs::write(
        temp.path().join(".berth.toml"),
        format!("[templates]\ndir = {:?}\n", templates.display().to_string()),
    )
    .unwrap();

    berth(temp.path())
        .args(["compose", "redis", "--dir", "out"])
        .assert()
        .success();

    let manifest = fs::read_to_string(temp.path().join("out/docker-compose.yml")).unwrap();
    assert_eq!(manifest, "name: berth-out\n# custom\n");
}

#[test]
fn down_without_manifest_is_a_user_error() {
    let temp = TempDir::new().unwrap();

    berth(temp.path())
        .args(["down", "--dir", "."])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("docker-compose.yml"));
}

#[test]
fn failed_down_reports_a_stop_failure() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("docker-compose.yml"), "services: {}\n").unwrap();

    // `false` exits 1 for any arguments, standing in for a failing runtime.
    berth(temp.path())
        .args(["down", "--dir", ".", "--runtime", "false"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Container stop failed"))
        .stderr(predicate::str::contains("docker compose down"))
        .stderr(predicate::str::contains("published port").not());
}

// ── db ────────────────────────────────────────────────────────────────────────

#[test]
fn db_check_fails_when_nothing_listens() {
    let temp = TempDir::new().unwrap();

    berth(temp.path())
        .args(["db", "check", "--port", "1", "--user", "app"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Cannot connect"));
}

// ── services ──────────────────────────────────────────────────────────────────

#[test]
fn services_json_lists_every_kind() {
    let temp = TempDir::new().unwrap();

    let assert = berth(temp.path())
        .args(["services", "--format", "json"])
        .assert()
        .success();

    let rows: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    let names: Vec<_> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["mysql", "mariadb", "redis"]);
}

#[test]
fn services_csv_has_header() {
    let temp = TempDir::new().unwrap();

    berth(temp.path())
        .args(["services", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("name,family,port,template,sidecar,source"));
}

// ── config / init / completions ───────────────────────────────────────────────

#[test]
fn init_local_then_refuses_to_overwrite() {
    let temp = TempDir::new().unwrap();

    berth(temp.path()).args(["init", "--local"]).assert().success();
    let written = fs::read_to_string(temp.path().join(".berth.toml")).unwrap();
    assert!(written.contains("[health_check]"));

    berth(temp.path())
        .args(["init", "--local"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--force"));

    berth(temp.path())
        .args(["init", "--local", "--force"])
        .assert()
        .success();
}

#[test]
fn config_get_reads_environment_overrides() {
    let temp = TempDir::new().unwrap();

    berth(temp.path())
        .env("BERTH_HEALTH_CHECK__MAX_ATTEMPTS", "7")
        .args(["config", "get", "health_check.max_attempts"])
        .assert()
        .success()
        .stdout("7\n");
}

#[test]
fn config_get_unknown_key_is_not_found() {
    let temp = TempDir::new().unwrap();

    berth(temp.path())
        .args(["config", "get", "nope.nothing"])
        .assert()
        .code(3);
}

#[test]
fn invalid_config_file_exits_with_configuration_code() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("bad.toml");
    fs::write(&file, "[health_check]\ninterval_secs = 0\n").unwrap();

    berth(temp.path())
        .arg("--config")
        .arg(&file)
        .arg("services")
        .assert()
        .code(4);
}

#[test]
fn config_path_points_into_config_dir() {
    let temp = TempDir::new().unwrap();

    berth(temp.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn bash_completions_mention_binary() {
    let temp = TempDir::new().unwrap();

    berth(temp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("berth"));
}
