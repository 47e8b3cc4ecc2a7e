use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const TECHNOLOGIES: &str = "\
React:
  specialty: Frontend
  priority: 1
  description: UI lib
Git:
  specialty: [Frontend, Backend]
  priority: 2
  description: Version control
";

const SPECIALTIES: &str = "\
Frontend:
  priority: 1
  description: \"\"
Backend:
  priority: 2
  description: \"\"
";

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn workspace() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "config/category-mapping.yaml", TECHNOLOGIES);
    write(tmp.path(), "config/specialties.yaml", SPECIALTIES);
    write(
        tmp.path(),
        "docs/001 React/hooks.md",
        "---\ntitle: Hooks\ntags: [react]\ninfo:\n  - https://react.dev\n  - \"[[Internal]]\"\n---\n# Hooks",
    );
    write(tmp.path(), "docs/002 Git/branching.md", "# Branching");
    write(tmp.path(), "docs/002 Git/wip.md", "---\ndraft: true\n---\n# WIP");
    write(tmp.path(), "docs/Unmapped/ignored.md", "# Ignored");
    tmp
}

fn docsync(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("docsync").unwrap();
    cmd.current_dir(dir)
        .env_remove("DOCSYNC_DB")
        .env_remove("DOCSYNC_DOCS")
        .env_remove("DOCSYNC_CONFIG_DIR")
        .env_remove("DOCSYNC_SETTINGS")
        .env_remove("RUST_LOG");
    cmd
}

fn json_output(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "command failed: {:?}", output);
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_init_creates_database() {
    let tmp = workspace();

    docsync(tmp.path())
        .args(["init", "--database", "data/catalogue.db"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized database"));

    assert!(tmp.path().join("data/catalogue.db").exists());
}

#[test]
fn test_parse_then_check_converges() {
    let tmp = workspace();

    let report = json_output(docsync(tmp.path()).args(["parse", "-o", "json"]));
    assert_eq!(report["scanned"], 2);
    // hooks-frontend, branching-frontend, branching-backend
    assert_eq!(report["saved"]["articles"], 3);

    let report = json_output(docsync(tmp.path()).args(["check", "-o", "json"]));
    assert_eq!(report["total"], 2);
    assert_eq!(report["to_update"], 0);
    assert_eq!(report["unchanged"], 2);
    assert_eq!(report["degraded"], false);
}

#[test]
fn test_update_saves_only_changed_documents() {
    let tmp = workspace();
    docsync(tmp.path()).arg("parse").assert().success();

    write(tmp.path(), "docs/001 React/hooks.md", "---\ntitle: Hooks\n---\n# Hooks v2");
    write(tmp.path(), "docs/001 React/state.md", "# State");

    let report = json_output(docsync(tmp.path()).args(["check", "-o", "json"]));
    assert_eq!(report["to_update"], 2);
    assert_eq!(report["new"], 1);
    assert_eq!(report["changed"], 1);

    let report = json_output(docsync(tmp.path()).args(["update", "-o", "json"]));
    assert_eq!(report["changes"]["to_update"], 2);
    assert_eq!(report["saved"]["articles"], 2);

    docsync(tmp.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to update"));
}

#[test]
fn test_update_force_saves_everything() {
    let tmp = workspace();
    docsync(tmp.path()).arg("parse").assert().success();

    let report = json_output(docsync(tmp.path()).args(["update", "--force", "-o", "json"]));
    assert_eq!(report["changes"], serde_json::Value::Null);
    assert_eq!(report["saved"]["articles"], 3);
}

#[test]
fn test_parse_check_only_saves_nothing() {
    let tmp = workspace();

    let report = json_output(docsync(tmp.path()).args(["parse", "--check-only", "-o", "json"]));
    assert_eq!(report["to_update"], 2);
    assert_eq!(report["degraded"], true);
    assert!(!tmp.path().join("docsync.db").exists());
}

#[test]
fn test_check_does_not_create_database() {
    let tmp = workspace();

    let report = json_output(
        docsync(tmp.path()).args(["check", "--database", "state/catalogue.db", "-o", "json"]),
    );
    assert_eq!(report["degraded"], true);
    assert_eq!(report["changed"], 2);
    assert!(!tmp.path().join("state").exists());

    docsync(tmp.path())
        .args(["parse", "--database", "state/catalogue.db"])
        .assert()
        .success();

    let report = json_output(
        docsync(tmp.path()).args(["check", "--database", "state/catalogue.db", "-o", "json"]),
    );
    assert_eq!(report["degraded"], false);
    assert_eq!(report["unchanged"], 2);
}

#[test]
fn test_clear_empties_database() {
    let tmp = workspace();
    docsync(tmp.path()).arg("parse").assert().success();

    let report = json_output(docsync(tmp.path()).args(["clear", "-o", "json"]));
    assert_eq!(report["stats"]["articles"], 0);
    assert_eq!(report["stats"]["specialties"], 0);
}

#[test]
fn test_missing_docs_directory_fails() {
    let tmp = workspace();

    docsync(tmp.path())
        .args(["check", "--path", "nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_missing_mappings_skip_everything() {
    let tmp = workspace();

    let report = json_output(
        docsync(tmp.path()).args(["check", "--config-dir", "absent", "-o", "json"]),
    );
    assert_eq!(report["total"], 0);
}

#[test]
fn test_settings_file_is_used() {
    let tmp = workspace();
    fs::rename(tmp.path().join("docs"), tmp.path().join("wiki")).unwrap();
    write(
        tmp.path(),
        "docsync.toml",
        "docs_path = \"wiki\"\n\n[database]\npath = \"state/docsync.db\"\n",
    );

    let report = json_output(docsync(tmp.path()).args(["parse", "-o", "json"]));
    assert_eq!(report["scanned"], 2);
    assert!(tmp.path().join("state/docsync.db").exists());
}
