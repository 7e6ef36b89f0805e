#![allow(dead_code)]

use std::fs;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Helper struct to run ownifie commands against an isolated config root
pub struct AdminTest {
    pub temp_dir: TempDir,
    binary_path: String,
    base_url: Option<String>,
    token: Option<String>,
}

impl AdminTest {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        AdminTest {
            temp_dir,
            binary_path: env!("CARGO_BIN_EXE_ownifie").to_string(),
            base_url: None,
            token: None,
        }
    }

    /// Point the binary at a (mock) API server
    pub fn with_server(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Authenticate through the token environment variable
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new(&self.binary_path);
        command
            .args(args)
            .current_dir(self.temp_dir.path())
            .env("OWNIFIE_ROOT", self.temp_dir.path())
            .env("NO_COLOR", "1")
            .env_remove("OWNIFIE_TOKEN")
            .env_remove("OWNIFIE_BASE_URL")
            .env_remove("OWNIFIE_LOG")
            .stdin(Stdio::null());
        if let Some(url) = &self.base_url {
            command.env("OWNIFIE_BASE_URL", url);
        }
        if let Some(token) = &self.token {
            command.env("OWNIFIE_TOKEN", token);
        }
        command
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.command(args)
            .output()
            .expect("Failed to execute ownifie command")
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            panic!(
                "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
                args,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Expected command {:?} to fail, but it succeeded\nstdout: {}",
            args,
            String::from_utf8_lossy(&output.stdout)
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }

    pub fn read_file(&self, name: &str) -> String {
        fs::read_to_string(self.temp_dir.path().join(name)).expect("Failed to read file")
    }

    pub fn file_exists(&self, name: &str) -> bool {
        self.temp_dir.path().join(name).exists()
    }

    pub fn write_config(&self, content: &str) {
        fs::write(self.temp_dir.path().join("config.yaml"), content)
            .expect("Failed to write config.yaml");
    }
}

/// Run a command on the blocking pool so an in-process mock server keeps serving
pub async fn run_async(test: &AdminTest, args: &[&str]) -> Output {
    let mut command = test.command(args);
    tokio::task::spawn_blocking(move || command.output())
        .await
        .expect("blocking task panicked")
        .expect("Failed to execute ownifie command")
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}
