//! End-to-end tests of the `parallexe` binary on a local-only fleet

mod common;
use common::{CliTestContext, run_cli};

#[test]
fn test_validate() {
    let ctx = CliTestContext::new();
    ctx.run(&["validate"])
        .assert_success()
        .assert_contains("✓ Inventory valid")
        .assert_contains("Name: local")
        .assert_contains("Hosts: 2 (2 local)")
        .assert_contains("Groups: control, loopback");
}

#[test]
fn test_validate_rejects_bad_inventory() {
    let ctx = CliTestContext::with_inventory("version: \"1.0\"\nhosts: []\n");
    ctx.run(&["validate"])
        .assert_failure()
        .assert_stderr_contains("at least one host");
}

#[test]
fn test_missing_inventory() {
    run_cli("/nonexistent/inventory.yaml".as_ref(), &["exec", "true"])
        .assert_failure()
        .assert_stderr_contains("Failed to load inventory");
}

#[test]
fn test_exec_every_host() {
    let ctx = CliTestContext::new();
    let output = ctx.run(&["exec", "echo ran", "--json"]);
    output.assert_success();

    let batch = output.json();
    assert_eq!(batch["localhost"]["stdout"], "ran\n");
    assert_eq!(batch["127.0.0.1"]["stdout"], "ran\n");
    assert_eq!(batch["localhost"]["success"], true);
}

#[test]
fn test_exec_table() {
    let ctx = CliTestContext::new();
    ctx.run(&["exec", "echo ran"])
        .assert_success()
        .assert_contains("HOST")
        .assert_contains("localhost")
        .assert_contains("ok");
}

#[test]
fn test_exec_nonzero_exit_is_not_failure() {
    let ctx = CliTestContext::new();
    let output = ctx.run(&["exec", "exit 3", "--json"]);
    output.assert_success();
    assert_eq!(output.json()["localhost"]["code"], 3);
}

#[test]
fn test_exec_stderr_fails() {
    let ctx = CliTestContext::new();
    let output = ctx.run(&["exec", "echo oops >&2", "--json"]);
    output
        .assert_failure()
        .assert_stderr_contains("error on hosts: [127.0.0.1, localhost]");
    assert_eq!(output.json()["localhost"]["stderr"], "oops\n");
}

#[test]
fn test_exec_filters() {
    let ctx = CliTestContext::new();

    let output = ctx.run(&["exec", "echo ran", "--json", "--hosts", "localhost"]);
    output.assert_success();
    let batch = output.json();
    assert!(batch.get("localhost").is_some());
    assert!(batch.get("127.0.0.1").is_none());

    let output = ctx.run(&["exec", "echo ran", "--json", "--groups", "loopback"]);
    output.assert_success();
    let batch = output.json();
    assert!(batch.get("localhost").is_none());
    assert!(batch.get("127.0.0.1").is_some());

    let output = ctx.run(&["exec", "echo ran", "--json", "--hosts", "nope"]);
    output.assert_success();
    assert_eq!(output.json(), serde_json::json!({}));
}

#[test]
fn test_run_halts_at_failing_step() {
    let ctx = CliTestContext::new();
    let output = ctx.run(&["run", "echo one", "echo two >&2", "echo three", "--json"]);
    output.assert_failure();

    let steps = output.json();
    assert_eq!(steps[0]["status"], "done");
    assert_eq!(steps[1]["status"], "done");
    assert_eq!(steps[2]["status"], "skipped");
    assert_eq!(steps[2]["batch"], serde_json::json!({}));
}

#[test]
fn test_run_table() {
    let ctx = CliTestContext::new();
    ctx.run(&["run", "echo one", "echo two"])
        .assert_success()
        .assert_contains("[1] done: echo one")
        .assert_contains("[2] done: echo two");
}

#[test]
fn test_line_in_file() {
    let ctx = CliTestContext::new();
    let file = ctx.path("hosts.conf");
    let path = file.to_str().unwrap();

    for _ in 0..2 {
        ctx.run(&["line-in-file", path, "10.0.0.1 db", "--hosts", "localhost"])
            .assert_success();
    }
    assert_eq!(std::fs::read_to_string(&file).unwrap(), "10.0.0.1 db\n");

    ctx.run(&["line-in-file", path, "10.0.0.1 db", "--absent", "--hosts", "localhost"])
        .assert_success();
    assert_eq!(std::fs::read_to_string(&file).unwrap(), "");
}

#[test]
fn test_send_template() {
    let ctx = CliTestContext::new();
    let source = ctx.path("motd.tmpl");
    std::fs::write(&source, "${greeting} from ${name}\n").unwrap();
    let dest = ctx.path("motd");

    ctx.run(&[
        "send",
        source.to_str().unwrap(),
        dest.to_str().unwrap(),
        "--template",
        "--hosts",
        "localhost",
    ])
    .assert_success();

    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "hello from control\n");
}

#[test]
fn test_vars() {
    let ctx = CliTestContext::new();
    let output = ctx.run(&["vars", "localhost"]);
    output.assert_success();

    let vars = output.json();
    assert_eq!(vars["greeting"], "hello");
    assert_eq!(vars["name"], "control");

    ctx.run(&["vars", "unknown"])
        .assert_failure()
        .assert_stderr_contains("Host 'unknown' not found");
}

#[test]
fn test_inventory_log_level_applies() {
    let ctx = CliTestContext::with_inventory(
        "version: \"1.0\"\nsettings:\n  log_level: debug\nhosts:\n  - host: localhost\n",
    );
    ctx.run(&["exec", "true"])
        .assert_success()
        .assert_stderr_contains("DEBUG");

    let quiet = ctx.run(&["exec", "true", "--log-level", "error"]);
    quiet.assert_success();
    assert!(!quiet.stderr.contains("DEBUG"), "stderr: {}", quiet.stderr);
}
