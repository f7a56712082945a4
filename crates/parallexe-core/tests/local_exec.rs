//! Fleet execution against the local machine

use parallexe_core::{ExecFilter, Fleet, HostConfig, RegistryOptions, StepStatus};

mod common;
use common::FakeProvider;

async fn local_fleet() -> Fleet {
    Fleet::connect_with(
        vec![HostConfig::new("localhost")],
        &FakeProvider::new(),
        &RegistryOptions::default(),
    )
    .await
    .unwrap()
}

#[smol_potat::test]
async fn test_local_alias_never_touches_provider() {
    let provider = FakeProvider::new();
    let fleet = Fleet::connect_with(
        vec![HostConfig::new("localhost"), HostConfig::new("127.0.0.1")],
        &provider,
        &RegistryOptions::default(),
    )
    .await
    .unwrap();

    assert!(provider.log.connected().is_empty());
    assert!(fleet.connections().iter().all(|c| c.is_local()));
    fleet.close().await.unwrap();
    assert!(provider.log.closed().is_empty());
}

#[smol_potat::test]
async fn test_exec_true() {
    let fleet = local_fleet().await;

    let batch = fleet.exec("true", &ExecFilter::all()).await.unwrap();

    assert_eq!(batch.len(), 1);
    let result = batch.get("localhost").unwrap();
    assert_eq!(result.code, 0);
    assert!(result.success);
    assert!(result.error.is_none());
    fleet.close().await.unwrap();
}

#[smol_potat::test]
async fn test_exec_captures_stdout() {
    let fleet = local_fleet().await;

    let batch = fleet
        .exec("echo one; echo two", &ExecFilter::all())
        .await
        .unwrap();

    assert_eq!(batch.stdout_lines()["localhost"], vec!["one", "two"]);
    fleet.close().await.unwrap();
}

#[smol_potat::test]
async fn test_exec_unknown_command_fails_host() {
    let fleet = local_fleet().await;

    let err = fleet
        .exec("a-command-that-does-not-exist", &ExecFilter::all())
        .await
        .unwrap_err();

    assert_eq!(err.hosts, vec!["localhost"]);
    let result = err.batch.get("localhost").unwrap();
    assert!(!result.stderr.is_empty());
    assert!(!result.success);
    assert!(err.to_string().contains("localhost"));
    fleet.close().await.unwrap();
}

#[smol_potat::test]
async fn test_exec_nonzero_exit_without_stderr_succeeds() {
    let fleet = local_fleet().await;

    let batch = fleet.exec("exit 3", &ExecFilter::all()).await.unwrap();

    let result = batch.get("localhost").unwrap();
    assert_eq!(result.code, 3);
    assert!(result.success);
    fleet.close().await.unwrap();
}

#[smol_potat::test]
async fn test_sequence_creates_files() {
    let dir = tempfile::tempdir().unwrap();
    let f1 = dir.path().join("f1");
    let f2 = dir.path().join("f2");
    let fleet = local_fleet().await;

    let steps = fleet
        .multi_exec(
            &[
                format!("touch {}", f1.display()),
                format!("touch {}", f2.display()),
            ],
            &ExecFilter::all(),
        )
        .await
        .unwrap();

    assert_eq!(steps.len(), 2);
    assert!(steps.iter().all(|s| s.status == StepStatus::Done));
    assert!(f1.exists());
    assert!(f2.exists());
    fleet.close().await.unwrap();
}

#[smol_potat::test]
async fn test_sequence_continues_after_silent_false() {
    let dir = tempfile::tempdir().unwrap();
    let f2 = dir.path().join("f2");
    let fleet = local_fleet().await;

    let steps = fleet
        .multi_exec(
            &["false".to_string(), format!("touch {}", f2.display())],
            &ExecFilter::all(),
        )
        .await
        .unwrap();

    assert_eq!(steps[0].status, StepStatus::Done);
    assert_eq!(steps[0].batch.get("localhost").unwrap().code, 1);
    assert_eq!(steps[1].status, StepStatus::Done);
    assert!(f2.exists());
    fleet.close().await.unwrap();
}

#[smol_potat::test]
async fn test_sequence_halts_on_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let f2 = dir.path().join("f2");
    let fleet = local_fleet().await;

    let err = fleet
        .multi_exec(
            &["echo boom >&2".to_string(), format!("touch {}", f2.display())],
            &ExecFilter::all(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.hosts, vec!["localhost"]);
    assert_eq!(err.halted_at(), Some(0));
    assert_eq!(err.steps[0].status, StepStatus::Done);
    assert_eq!(err.steps[1].status, StepStatus::Skipped);
    assert!(err.steps[1].batch.is_empty());
    assert!(!f2.exists());
    fleet.close().await.unwrap();
}

#[smol_potat::test]
async fn test_filter_excluding_every_host_runs_nothing() {
    let fleet = local_fleet().await;

    let batch = fleet
        .exec("true", &ExecFilter::hosts(["elsewhere"]))
        .await
        .unwrap();

    assert!(batch.is_empty());
    fleet.close().await.unwrap();
}
