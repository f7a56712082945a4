//! Common test utilities for CLI integration tests

use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Inventory whose hosts all execute on this machine
pub const LOCAL_INVENTORY: &str = r#"
version: "1.0"
name: "local"
hosts:
  - host: localhost
    groups: [control]
  - host: 127.0.0.1
    groups: [loopback]
variables:
  global:
    greeting: hello
    name: nobody
  hosts:
    localhost:
      name: control
"#;

/// Scratch directory holding an inventory
pub struct CliTestContext {
    pub test_dir: TempDir,
    pub inventory: PathBuf,
}

impl CliTestContext {
    /// Context with the local inventory
    pub fn new() -> Self {
        Self::with_inventory(LOCAL_INVENTORY)
    }

    /// Context with a custom inventory
    pub fn with_inventory(yaml: &str) -> Self {
        let test_dir = TempDir::new().unwrap();
        let inventory = test_dir.path().join("inventory.yaml");
        std::fs::write(&inventory, yaml).unwrap();
        Self {
            test_dir,
            inventory,
        }
    }

    /// A path inside the scratch directory
    pub fn path(&self, name: &str) -> PathBuf {
        self.test_dir.path().join(name)
    }

    /// Run `parallexe` against the context inventory
    pub fn run(&self, args: &[&str]) -> CliOutput {
        run_cli(&self.inventory, args)
    }
}

/// Run the CLI binary with `--inventory`
pub fn run_cli(inventory: &Path, args: &[&str]) -> CliOutput {
    let output = Command::new(env!("CARGO_BIN_EXE_parallexe"))
        .arg("--inventory")
        .arg(inventory)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap();

    CliOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        success: output.status.success(),
        exit_code: output.status.code(),
    }
}

/// Captured CLI output with chaining assertions
#[derive(Debug)]
pub struct CliOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub exit_code: Option<i32>,
}

impl CliOutput {
    pub fn assert_success(&self) -> &Self {
        assert!(
            self.success,
            "command failed with exit code {:?}\nstdout: {}\nstderr: {}",
            self.exit_code, self.stdout, self.stderr
        );
        self
    }

    pub fn assert_failure(&self) -> &Self {
        assert!(
            !self.success,
            "command unexpectedly succeeded\nstdout: {}",
            self.stdout
        );
        assert_eq!(self.exit_code, Some(1));
        self
    }

    pub fn assert_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "stdout does not contain '{}'\nstdout: {}",
            text,
            self.stdout
        );
        self
    }

    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "stderr does not contain '{}'\nstderr: {}",
            text,
            self.stderr
        );
        self
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout).unwrap()
    }
}
