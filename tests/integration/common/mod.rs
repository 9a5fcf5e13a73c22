//! Shared test infrastructure for integration tests.
//!
//! Provides `TestContext` - a test context that handles:
//! - An isolated config directory (`XDG_CONFIG_HOME`) so the user's config never leaks in
//! - Mock GitHub state, written as JSON and picked up by `--mock` runs
//! - A JSON trace file the binary writes its tracing events into
//!
//! # Example
//!
//! ```ignore
//! let ctx = TestContext::new();
//! ctx.setup_mock_state(&json!({ "items": [...] }));
//!
//! let (status, stdout, stderr) = ctx.run(&["close", "42", "-R", "owner/repo"]);
//! assert!(status.success());
//! ```

use std::{
	path::{Path, PathBuf},
	process::{Command, ExitStatus},
};

use tempfile::TempDir;

use crate::tracing_utils::TraceLog;

fn get_binary_path() -> PathBuf {
	PathBuf::from(env!("CARGO_BIN_EXE_gh-close"))
}

pub struct TestContext {
	/// Root of everything the binary may read or write
	pub root: TempDir,
	/// Path to mock GitHub state file
	pub mock_state_path: PathBuf,
	/// Path the binary writes JSON trace events to
	pub trace_file: PathBuf,
}

impl TestContext {
	pub fn new() -> Self {
		let root = tempfile::tempdir().unwrap();
		std::fs::create_dir_all(root.path().join("config/gh-close")).unwrap();
		let mock_state_path = root.path().join("mock_state.json");
		let trace_file = root.path().join("trace.jsonl");
		std::fs::write(&mock_state_path, "{}").unwrap();

		Self { root, mock_state_path, trace_file }
	}

	/// Set up mock GitHub state.
	///
	/// The state parameter should be a serde_json::Value with `items` (and optionally `fail`).
	pub fn setup_mock_state(&self, state: &serde_json::Value) {
		std::fs::write(&self.mock_state_path, serde_json::to_string_pretty(state).unwrap()).unwrap();
	}

	/// Write `$XDG_CONFIG_HOME/gh-close/config.toml`.
	pub fn write_config(&self, content: &str) {
		std::fs::write(self.root.path().join("config/gh-close/config.toml"), content).unwrap();
	}

	/// Run with `--mock` in `cwd` (defaults to the temp root, which is not a git checkout).
	///
	/// Returns (exit_status, stdout, stderr) for easy assertions.
	pub fn run_in(&self, cwd: Option<&Path>, args: &[&str]) -> (ExitStatus, String, String) {
		let mut cmd = Command::new(get_binary_path());
		cmd.arg("--mock").args(args);
		cmd.current_dir(cwd.unwrap_or(self.root.path()));
		cmd.env("XDG_CONFIG_HOME", self.root.path().join("config"));
		cmd.env("GH_CLOSE_MOCK_STATE", &self.mock_state_path);
		cmd.env("GH_CLOSE_TRACE_FILE", &self.trace_file);
		cmd.env_remove("RUST_LOG");
		for key in ["GH_TOKEN", "GITHUB_TOKEN", "GH_CLOSE_TOKEN", "GH_CLOSE_HOST", "GH_CLOSE_DEFAULT_REPO"] {
			cmd.env_remove(key);
		}

		let output = cmd.output().unwrap();
		(
			output.status,
			String::from_utf8_lossy(&output.stdout).into_owned(),
			String::from_utf8_lossy(&output.stderr).into_owned(),
		)
	}

	pub fn run(&self, args: &[&str]) -> (ExitStatus, String, String) {
		self.run_in(None, args)
	}

	pub fn trace(&self) -> TraceLog {
		TraceLog::from_file(&self.trace_file)
	}
}

/// One mock item on github.com
pub fn item(owner: &str, repo: &str, number: u64, title: &str, kind: &str, state: &str) -> serde_json::Value {
	serde_json::json!({
		"owner": owner,
		"repo": repo,
		"number": number,
		"title": title,
		"kind": kind,
		"state": state,
	})
}
