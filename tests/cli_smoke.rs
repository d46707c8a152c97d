#![allow(clippy::unwrap_used)]
//! CLI smoke tests to verify basic command functionality.
//!
//! Every command runs against temporary config, data and notes folders so the
//! user's real files are never touched.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("notes").join("travel")).unwrap();
        fs::write(
            dir.path().join("notes").join("travel").join("paris.md"),
            "---\ntitle: Paris\n---\nUne belle ville, une belle journée.\n",
        )
        .unwrap();
        fs::write(dir.path().join("notes").join("todo.md"), "# Todo\nbuy bread\n").unwrap();
        Self { dir }
    }

    #[allow(deprecated)]
    fn oxygen(&self) -> Command {
        let root = self.dir.path();
        let mut cmd = Command::cargo_bin("oxygen").unwrap();
        cmd.env("HOME", root)
            .env("XDG_CONFIG_HOME", root.join("config"))
            .env("XDG_DATA_HOME", root.join("data"))
            .env("OXYGEN_HOME", root.join("notes"))
            .env("NO_COLOR", "1")
            .env_remove("OXYGEN_API_KEY")
            .env_remove("OXYGEN_LOG");
        cmd
    }
}

#[test]
fn test_help_displays_usage() {
    Sandbox::new()
        .oxygen()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("language learners"))
        .stdout(predicate::str::contains("translate"))
        .stdout(predicate::str::contains("lookup"))
        .stdout(predicate::str::contains("review"));
}

#[test]
fn test_version_displays_version() {
    Sandbox::new()
        .oxygen()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_settings_path_uses_xdg_config_home() {
    let sandbox = Sandbox::new();
    let expected = sandbox
        .dir
        .path()
        .join("config")
        .join("oxygen")
        .join("settings.json");

    sandbox
        .oxygen()
        .args(["settings", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(expected.display().to_string()));
}

#[test]
fn test_settings_get_default_and_set() {
    let sandbox = Sandbox::new();

    sandbox
        .oxygen()
        .args(["settings", "get", "openai.apiModel"])
        .assert()
        .success()
        .stdout("gpt-4o\n");

    sandbox
        .oxygen()
        .args(["settings", "set", "openai.apiModel", "gpt-4o-mini"])
        .assert()
        .success();

    sandbox
        .oxygen()
        .args(["settings", "get", "openai.apiModel"])
        .assert()
        .success()
        .stdout("gpt-4o-mini\n");

    let saved =
        fs::read_to_string(sandbox.dir.path().join("config/oxygen/settings.json")).unwrap();
    assert!(saved.contains("\"apiModel\": \"gpt-4o-mini\""));
}

#[test]
fn test_settings_get_unknown_key_fails() {
    Sandbox::new()
        .oxygen()
        .args(["settings", "get", "openai.nothing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown setting"));
}

#[test]
fn test_settings_show_masks_api_key() {
    let sandbox = Sandbox::new();

    sandbox
        .oxygen()
        .args(["settings", "set", "openai.apiKey", "sk-secret-123456"])
        .assert()
        .success();

    sandbox
        .oxygen()
        .args(["settings", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3456"))
        .stdout(predicate::str::contains("sk-secret").not());
}

#[test]
fn test_tree_lists_notes() {
    Sandbox::new()
        .oxygen()
        .arg("tree")
        .assert()
        .success()
        .stdout(predicate::str::contains("travel/"))
        .stdout(predicate::str::contains("paris.md"))
        .stdout(predicate::str::contains("todo.md"));
}

#[test]
fn test_tree_json() {
    let output = Sandbox::new().oxygen().args(["tree", "--json"]).output().unwrap();

    assert!(output.status.success());
    let tree: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(tree["type"], "folder");
    assert_eq!(tree["children"][0]["name"], "travel");
}

#[test]
fn test_words_of_note() {
    Sandbox::new()
        .oxygen()
        .args(["words", "travel/paris.md"])
        .assert()
        .success()
        .stdout("une\nbelle\nville\njournée\n");
}

#[test]
fn test_search_notes() {
    Sandbox::new()
        .oxygen()
        .args(["search", "BREAD"])
        .assert()
        .success()
        .stdout(predicate::str::contains("todo.md"))
        .stdout(predicate::str::contains("paris.md").not());
}

#[test]
fn test_open_missing_note_fails() {
    Sandbox::new()
        .oxygen()
        .args(["open", "missing.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read document"));
}

#[test]
fn test_define_without_api_key_fails_with_config_exit_code() {
    Sandbox::new()
        .oxygen()
        .args(["define", "serendipity"])
        .assert()
        .code(78)
        .stderr(predicate::str::contains("No API key configured"));
}

#[test]
fn test_translate_without_api_key_fails() {
    Sandbox::new()
        .oxygen()
        .arg("translate")
        .write_stdin("Bonjour")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No API key configured"));
}

#[test]
fn test_vocab_add_list_and_show() {
    let sandbox = Sandbox::new();

    sandbox
        .oxygen()
        .args(["vocab", "add", "break the ice", "--meaning", "打破僵局"])
        .assert()
        .success();
    sandbox
        .oxygen()
        .args(["vocab", "sentence", "break the ice", "He told a joke to break the ice."])
        .assert()
        .success();

    sandbox
        .oxygen()
        .args(["vocab", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("break the ice"))
        .stdout(predicate::str::contains("打破僵局"));

    sandbox
        .oxygen()
        .args(["vocab", "show", "break the ice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("He told a joke to break the ice."));
}

#[test]
fn test_vocab_show_unknown_fails() {
    Sandbox::new()
        .oxygen()
        .args(["vocab", "show", "nothing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Expression not found"));
}

#[test]
fn test_review_with_empty_vocabulary() {
    Sandbox::new()
        .oxygen()
        .arg("review")
        .assert()
        .success()
        .stderr(predicate::str::contains("No active words"));
}
