//! Utilities for capturing and verifying tracing output in integration tests.
//!
//! When tests spawn the binary with `GH_CLOSE_TRACE_FILE` set, trace events are
//! written in JSON format to that file. These utilities help parse and verify
//! those traces.
//!
//! The mock implementation emits `tracing::info!` events with target "mock_github"
//! that include method names and arguments. These can be verified using `assert_mock_calls!`.

use std::{fs, path::Path};

use serde::Deserialize;

/// A single trace event from the JSON log
#[derive(Debug, Deserialize)]
pub struct TraceEvent {
	/// The target module (e.g., "mock_github")
	pub target: String,
	/// The fields logged with the event (includes message and any other fields)
	pub fields: TraceFields,
}

#[derive(Debug, Deserialize)]
pub struct TraceFields {
	/// The message field from the trace event
	pub message: Option<String>,
	pub host: Option<String>,
	/// GraphQL operation name (for graphql)
	pub operation: Option<String>,
	/// GraphQL variables, rendered as JSON text
	pub variables: Option<String>,
	pub owner: Option<String>,
	pub repo: Option<String>,
	pub issue_number: Option<u64>,
	/// Comment body (for create_comment)
	pub body: Option<String>,
	/// State field (for update_pull_request_state)
	pub state: Option<String>,
}

/// Parsed trace log that provides verification methods
pub struct TraceLog {
	events: Vec<TraceEvent>,
}

impl TraceLog {
	/// Read and parse a trace log file
	pub fn from_file(path: &Path) -> Self {
		let content = fs::read_to_string(path).unwrap_or_default();
		let events: Vec<TraceEvent> = content.lines().filter(|line| !line.is_empty()).filter_map(|line| serde_json::from_str(line).ok()).collect();

		Self { events }
	}

	/// All mock call events, in order
	pub fn mock_calls(&self) -> Vec<&TraceEvent> {
		self.events.iter().filter(|e| e.target == "mock_github").collect()
	}

	/// Mock calls rendered as `method` or `graphql:Operation`, in order
	pub fn mock_call_names(&self) -> Vec<String> {
		self.mock_calls()
			.into_iter()
			.map(|e| {
				let method = e.fields.message.clone().unwrap_or_default();
				match &e.fields.operation {
					Some(op) => format!("{method}:{op}"),
					None => method,
				}
			})
			.collect()
	}

	/// The first mock call with the given name
	pub fn find_mock_call(&self, method_name: &str) -> Option<&TraceEvent> {
		let names = self.mock_call_names();
		let calls = self.mock_calls();
		names.iter().position(|m| m == method_name).map(|i| calls[i])
	}
}

/// Assert the exact sequence of mock calls
#[macro_export]
macro_rules! assert_mock_calls {
	($log:expr, [$($method:expr),* $(,)?]) => {
		let expected: Vec<&str> = vec![$($method),*];
		assert_eq!($log.mock_call_names(), expected, "unexpected sequence of mock calls:\n{:#?}", $log.mock_calls());
	};
}
