mod support;

use predicates::str::contains;

use support::{procdesk_cmd, TestEnv};

#[test]
fn procdesk_help_works() {
    procdesk_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("defect and recruitment desk"));
}

#[test]
fn subcommand_help_works() {
    let subcommands = ["init", "categorize", "suggest-tasks", "doc", "list", "stats", "shell"];

    for cmd in subcommands {
        procdesk_cmd().arg(cmd).arg("--help").assert().success();
    }
}

#[test]
fn categorize_without_key_uses_fallback() {
    let env = TestEnv::new();
    env.cmd()
        .args(["categorize", "Login fails with special characters"])
        .assert()
        .success()
        .stdout(contains("Category: Other"))
        .stdout(contains("no API key in $API_KEY"));
}

#[test]
fn categorize_json_envelope() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestEnv::new();
    let output = env
        .cmd()
        .args(["--json", "categorize", "Export hangs"])
        .output()?;
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["schema_version"], "procdesk.v1");
    assert_eq!(value["command"], "categorize");
    assert_eq!(value["status"], "success");
    assert_eq!(value["data"]["category"], "Other");
    assert_eq!(value["data"]["credential"], false);
    Ok(())
}

#[test]
fn suggest_tasks_rejects_unknown_domain() {
    let env = TestEnv::new();
    env.cmd()
        .args(["suggest-tasks", "--domain", "sales", "anything"])
        .assert()
        .code(2)
        .stderr(contains("invalid domain"));
}

#[test]
fn suggest_tasks_without_key_is_empty() {
    let env = TestEnv::new();
    env.cmd()
        .args(["suggest-tasks", "--domain", "recruitment", "Candidate: Ada"])
        .assert()
        .success()
        .stdout(contains("No tasks suggested"));
}

#[test]
fn doc_without_key_explains_itself() {
    let env = TestEnv::new();
    env.cmd()
        .arg("doc")
        .assert()
        .success()
        .stdout(contains("## API Key Missing"));
}

#[test]
fn list_and_stats_show_seed_records() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestEnv::new();
    env.cmd()
        .args(["list", "defects"])
        .assert()
        .success()
        .stdout(contains("DEF-001"))
        .stdout(contains("DEF-002"));

    let output = env.cmd().args(["--json", "stats", "candidates"]).output()?;
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["command"], "stats candidates");
    assert_eq!(value["data"]["total"], 2);
    let statuses = value["data"]["statuses"].as_array().expect("statuses");
    assert_eq!(statuses.len(), 6);
    Ok(())
}

#[test]
fn invalid_explicit_config_is_a_user_error() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestEnv::new();
    std::fs::write(env.config_path(), "[records]\nid_width = 0\n")?;
    env.cmd()
        .args(["list", "defects"])
        .assert()
        .code(2)
        .stderr(contains("Invalid configuration"));
    Ok(())
}

#[test]
fn json_error_names_the_command() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestEnv::new();
    std::fs::write(env.config_path(), "[records]\nid_width = 0\n")?;
    let output = env.cmd().args(["--json", "list", "defects"]).output()?;
    assert_eq!(output.status.code(), Some(2));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["command"], "list defects");
    assert_eq!(value["status"], "error");
    assert_eq!(value["error"]["code"], 2);
    assert_eq!(value["error"]["kind"], "user_error");
    assert!(value.get("data").is_none());
    assert!(value["next_steps"][0]
        .as_str()
        .is_some_and(|step| step.contains("procdesk init --force")));
    Ok(())
}

#[test]
fn init_writes_a_loadable_config_once() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    procdesk_cmd()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(contains("config created"));

    let path = dir.path().join(".procdesk.toml");
    let config = procdesk::config::Config::load(&path)?;
    assert_eq!(config.records.id_width, 3);

    procdesk_cmd()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(contains("nothing to do"));
    Ok(())
}

#[test]
fn init_force_repairs_a_broken_config() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestEnv::new();
    std::fs::write(env.config_path(), "[records]\nid_width = 0\n")?;
    let output = env.cmd().args(["--json", "init", "--force"]).output()?;
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["command"], "init");
    assert_eq!(value["data"]["overwritten"], true);
    env.cmd().args(["list", "defects"]).assert().success();
    Ok(())
}

#[test]
fn shell_session_creates_a_defect() {
    let env = TestEnv::new();
    let script = "\
new defect
set customer Acme
set description Checkout rounds totals down
categorize
task add
save
list defects
quit
";
    env.cmd()
        .arg("shell")
        .write_stdin(script)
        .assert()
        .success()
        .stdout(contains("Category set to Other"))
        .stdout(contains("Saved DEF-003 (created)"))
        .stdout(contains("3 defects"));
}

#[test]
fn shell_reports_errors_and_continues() {
    let env = TestEnv::new();
    env.cmd()
        .arg("shell")
        .write_stdin("save\nedit DEF-404\nfrobnicate\nlist candidates\n")
        .assert()
        .success()
        .stderr(contains("No draft is open"))
        .stderr(contains("Record not found: DEF-404"))
        .stderr(contains("unknown command 'frobnicate'"))
        .stdout(contains("CAN-101"));
}
