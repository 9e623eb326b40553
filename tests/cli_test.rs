//! End-to-end CLI tests.
//!
//! Every command is driven non-interactively: the database location and
//! password come from the environment, field values from flags.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const PASSWORD: &str = "cli-test-password";

struct CliEnv {
    dir: TempDir,
    db: PathBuf,
}

impl CliEnv {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("db.sbx");
        Self { dir, db }
    }

    fn cmd(&self) -> Command {
        self.cmd_with_password(PASSWORD)
    }

    fn cmd_with_password(&self, password: &str) -> Command {
        let mut cmd = Command::cargo_bin("strongbox").unwrap();
        cmd.env_clear()
            .env("PATH", std::env::var_os("PATH").unwrap_or_default())
            .env("STRONGBOX_DB", &self.db)
            .env("STRONGBOX_PASSWORD", password)
            // Keep cache and profile inside the sandbox
            .env("XDG_CACHE_HOME", self.dir.path().join("cache"))
            .env("XDG_CONFIG_HOME", self.dir.path().join("config"))
            .env("HOME", self.dir.path());
        cmd
    }

    fn init(&self) {
        self.cmd().arg("init").assert().success();
    }

    fn add(&self, group: &str, title: &str, username: &str, password: &str) {
        self.cmd()
            .args([
                "add",
                "--group",
                group,
                "--title",
                title,
                "--username",
                username,
                "--password",
                password,
                "--url",
                "",
                "--notes",
                "",
            ])
            .assert()
            .success();
    }
}

fn group_add(env: &CliEnv, name: &str) {
    env.cmd().args(["group", "add", name]).assert().success();
}

#[test]
fn test_version_and_help() {
    Command::cargo_bin("strongbox")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("strongbox"));

    Command::cargo_bin("strongbox")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("credential manager"));
}

#[test]
fn test_init_creates_database() {
    let env = CliEnv::new();

    env.cmd()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("created"));
    assert!(env.db.exists());

    // A second init must refuse to overwrite
    env.cmd()
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_add_and_get() {
    let env = CliEnv::new();
    env.init();
    group_add(&env, "web");
    env.add("web", "gmail", "alice", "s3cret");

    // Masked by default
    env.cmd()
        .args(["get", "gmail"])
        .assert()
        .success()
        .stdout(predicate::str::contains("web/gmail"))
        .stdout(predicate::str::contains("alice"))
        .stdout(predicate::str::contains("********"))
        .stdout(predicate::str::contains("s3cret").not());

    // Revealed on request
    env.cmd()
        .args(["get", "gmail", "--show-password"])
        .assert()
        .success()
        .stdout(predicate::str::contains("s3cret"));
}

#[test]
fn test_get_group_slash_title_query() {
    let env = CliEnv::new();
    env.init();
    group_add(&env, "web");
    env.add("web", "gmail", "alice", "pw");

    env.cmd()
        .args(["get", "web/gm"])
        .assert()
        .success()
        .stdout(predicate::str::contains("web/gmail"));

    env.cmd()
        .args(["get", "nothing-matches"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no matching entry found"));
}

#[test]
fn test_show_is_pipe_friendly() {
    let env = CliEnv::new();
    env.init();
    group_add(&env, "web");
    env.add("web", "gmail", "alice", "s3cret");

    env.cmd()
        .args(["show", "gmail"])
        .assert()
        .success()
        .stdout("s3cret\n");

    env.cmd()
        .args(["show", "gmail", "username"])
        .assert()
        .success()
        .stdout("alice\n");
}

#[test]
fn test_duplicate_title_is_rejected() {
    let env = CliEnv::new();
    env.init();
    group_add(&env, "web");
    env.add("web", "gmail", "alice", "pw");

    env.cmd()
        .args([
            "add", "--group", "web", "--title", "GMAIL", "--username", "x",
            "--password", "x", "--url", "", "--notes", "",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_edit_and_invalid_field() {
    let env = CliEnv::new();
    env.init();
    group_add(&env, "web");
    env.add("web", "gmail", "alice", "pw");

    env.cmd()
        .args(["edit", "gmail", "username", "bob"])
        .assert()
        .success();
    env.cmd()
        .args(["show", "gmail", "username"])
        .assert()
        .success()
        .stdout("bob\n");

    // Password is not an editable field; unknown names share the path
    env.cmd()
        .args(["edit", "gmail", "password", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown field"));
    env.cmd()
        .args(["edit", "gmail", "shoe-size", "44"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown field"));
}

#[test]
fn test_change_password_and_rm() {
    let env = CliEnv::new();
    env.init();
    group_add(&env, "web");
    env.add("web", "gmail", "alice", "old-pw");

    env.cmd()
        .args(["change-password", "gmail", "--password", "new-pw"])
        .assert()
        .success()
        .stdout(predicate::str::contains("password updated"));
    env.cmd()
        .args(["show", "gmail"])
        .assert()
        .success()
        .stdout("new-pw\n");

    env.cmd()
        .args(["rm", "gmail", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("removed"));
    env.cmd()
        .args(["get", "gmail"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no matching entry found"));
}

#[test]
fn test_list_groups_and_entries() {
    let env = CliEnv::new();
    env.init();
    group_add(&env, "web");
    env.add("web", "gmail", "alice", "pw");

    env.cmd()
        .args(["list-groups"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Root"))
        .stdout(predicate::str::contains("web"));

    env.cmd()
        .args(["list-entries", "web"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gmail"));

    env.cmd()
        .args(["list-entries", "no-such-group"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no group matching"));
}

#[test]
fn test_wrong_password_fails_cleanly() {
    let env = CliEnv::new();
    env.init();

    env.cmd_with_password("not-the-password")
        .args(["list-groups"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("authentication failed"));
}

#[test]
fn test_group_rm_cascades() {
    let env = CliEnv::new();
    env.init();
    group_add(&env, "doomed");
    env.add("doomed", "one", "a", "pw");
    env.add("doomed", "two", "b", "pw");

    env.cmd()
        .args(["group", "rm", "doomed", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 entries"));

    env.cmd()
        .args(["get", "one"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no matching entry found"));
}

#[test]
fn test_compare_without_copies() {
    let env = CliEnv::new();
    env.init();

    env.cmd()
        .arg("compare")
        .assert()
        .success()
        .stdout(predicate::str::contains("no conflicting files"));
}

#[test]
fn test_compare_reports_divergence() {
    let env = CliEnv::new();
    env.init();
    group_add(&env, "red");
    env.add("red", "test1", "userA", "pw");

    // Create the conflicted copy through a second database
    let copy = CliEnv {
        db: env.dir.path().join("db (conflicted copy).sbx"),
        dir: TempDir::new().unwrap(),
    };
    copy.init();
    group_add(&copy, "red");
    copy.add("red", "test1", "userB", "pw");

    env.cmd()
        .arg("compare")
        .assert()
        .success()
        .stdout(predicate::str::contains("Comparing db (conflicted copy).sbx"))
        .stdout(predicate::str::contains("red/test1"))
        .stdout(predicate::str::contains("username"));
}

#[test]
fn test_missing_database_hint() {
    let env = CliEnv::new();

    env.cmd()
        .args(["list-groups"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("database not found"));
}
