use assert_cmd::Command;
use assert_cmd::cargo;
use mockito::Server;
use predicates::prelude::*;
use tempfile::tempdir;

fn esm_versions() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("esm_versions"));
    cmd.env_remove("GITHUB_TOKEN")
        .env_remove("VIRTUAL_ENV")
        .env_remove("ESM_VERSIONS_PYTHON");
    cmd
}

/// A stand-in interpreter: `esm_parser` 6.20.0 is installed, nothing else is,
/// and `-m pip ...` invocations are appended to `log`.
#[cfg(unix)]
fn fake_python(dir: &std::path::Path, log: &std::path::Path) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = format!(
        r#"#!/bin/sh
if [ "$1" = "-m" ]; then
    printf '%s\n' "$*" >> "{log}"
    exit 0
fi
if [ "$#" -eq 2 ]; then
    echo '{{"sys_path": [], "user_site": "{site}", "executable": "/usr/bin/python3"}}'
    exit 0
fi
case "$3" in
    esm_parser)
        echo "esm_parser prints a banner on import"
        echo '{{"version": "6.20.0", "file": "/opt/site/esm_parser/__init__.py"}}'
        ;;
    *)
        exit 3
        ;;
esac
"#,
        log = log.display(),
        site = dir.join("site").display(),
    );
    let path = dir.join("python");
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[test]
fn test_help_lists_subcommands() {
    esm_versions()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("upgrade"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("clean"));
}

#[test]
fn test_check_unknown_package_fails() {
    esm_versions()
        .args(["check", "--package", "bogus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bogus not found"));
}

#[test]
fn test_get_unknown_package_fails() {
    esm_versions()
        .args(["get", "bogus", "version"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bogus not found"));
}

#[test]
fn test_get_unknown_attribute_is_a_usage_error() {
    esm_versions()
        .args(["get", "esm_parser", "colour"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("colour"));
}

#[test]
fn test_remote_discovery_failure_is_fatal() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", "/orgs/esm-tools/repos?per_page=100&page=1")
        .with_status(403)
        .with_header("x-ratelimit-remaining", "0")
        .create();

    esm_versions()
        .args(["check", "--from-github", "--api-url", server.url().as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("esm-tools"));
}

#[test]
fn test_remote_discovery_limits_known_packages() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", "/orgs/esm-tools/repos?per_page=100&page=1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"name": "esm_tools"}, {"name": "esm_parser"}, {"name": "pyfesom2"}]"#)
        .create();

    esm_versions()
        .args(["get", "esm_calendar", "--from-github", "--api-url", server.url().as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Known packages: esm_tools, esm_parser, pyfesom2",
        ));
}

#[cfg(unix)]
#[test]
fn test_check_reports_installed_and_missing_packages() {
    let dir = tempdir().unwrap();
    let python = fake_python(dir.path(), &dir.path().join("pip.log"));

    let mut server = Server::new();
    let _latest = server
        .mock("GET", "/repos/esm-tools/esm_parser/releases/latest")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"tag_name": "v6.21.0"}"#)
        .create();

    esm_versions()
        .env("COLUMNS", "200")
        .arg("check")
        .arg("--no-color")
        .arg("--python")
        .arg(&python)
        .arg("--api-url")
        .arg(server.url())
        .assert()
        .success()
        .stdout(predicate::str::contains("esm_parser"))
        .stdout(predicate::str::contains("6.20.0"))
        .stdout(predicate::str::contains("6.21.0"))
        .stdout(predicate::str::contains("upgrade available"))
        .stdout(predicate::str::contains("esm_calendar"))
        .stdout(predicate::str::contains("not installed"));
}

#[cfg(unix)]
#[test]
fn test_get_single_attribute() {
    let dir = tempdir().unwrap();
    let python = fake_python(dir.path(), &dir.path().join("pip.log"));

    let mut server = Server::new();
    let _latest = server
        .mock("GET", "/repos/esm-tools/esm_parser/releases/latest")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"tag_name": "v6.21.0"}"#)
        .create();

    esm_versions()
        .env("ESM_VERSIONS_PYTHON", &python)
        .args(["get", "esm_parser", "version", "--api-url", server.url().as_str()])
        .assert()
        .success()
        .stdout("6.20.0\n");
}

#[cfg(unix)]
#[test]
fn test_upgrade_pinned_version_runs_pip() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("pip.log");
    let python = fake_python(dir.path(), &log);

    esm_versions()
        .arg("--python")
        .arg(&python)
        .args(["upgrade", "esm_parser==v6.21.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Installed esm_parser v6.21.0"));

    let logged = std::fs::read_to_string(&log).unwrap();
    assert_eq!(
        logged.trim(),
        "-m pip install --user --upgrade git+https://github.com/esm-tools/esm_parser@v6.21.0"
    );
}

#[cfg(unix)]
#[test]
fn test_upgrade_missing_package_is_skipped() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("pip.log");
    let python = fake_python(dir.path(), &log);

    esm_versions()
        .arg("--python")
        .arg(&python)
        .args(["update", "esm_calendar"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not installed"));

    assert!(!log.exists());
}

#[cfg(unix)]
#[test]
fn test_clean_with_nothing_to_remove() {
    let dir = tempdir().unwrap();
    let python = fake_python(dir.path(), &dir.path().join("pip.log"));

    esm_versions()
        .env("PATH", dir.path().join("empty-bin"))
        .arg("--python")
        .arg(&python)
        .args(["clean", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to remove"));
}
