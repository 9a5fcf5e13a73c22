//! Where the base repository comes from: `--repo`, config, git remote, or the URL itself.

use std::process::Command;

use serde_json::json;

use crate::common::{TestContext, item};

fn setup() -> TestContext {
	let ctx = TestContext::new();
	ctx.setup_mock_state(&json!({
		"items": [
			item("owner", "repo", 42, "Fix bug", "issue", "open"),
			item("other", "place", 42, "Different bug", "issue", "open"),
			{ "host": "ghe.corp.io", "owner": "owner", "repo": "repo", "number": 5, "title": "Enterprise", "kind": "issue", "state": "open" },
		]
	}));
	ctx
}

fn git_checkout(ctx: &TestContext, remote: &str) -> std::path::PathBuf {
	let dir = ctx.root.path().join("checkout");
	std::fs::create_dir_all(&dir).unwrap();
	for args in [vec!["init", "-q"], vec!["remote", "add", "origin", remote]] {
		let status = Command::new("git").args(&args).current_dir(&dir).status().unwrap();
		assert!(status.success(), "git {args:?} failed");
	}
	dir
}

#[test]
fn test_url_selector_needs_no_base_repo() {
	let ctx = setup();
	let (status, _stdout, stderr) = ctx.run(&["close", "https://github.com/other/place/issues/42"]);

	assert!(status.success(), "stderr: {stderr}");
	insta::assert_snapshot!(stderr, @"✓ Closed issue #42 (Different bug)");

	let trace = ctx.trace();
	let lookup = trace.find_mock_call("graphql:IssueByNumber").unwrap();
	let variables: serde_json::Value = serde_json::from_str(lookup.fields.variables.as_deref().unwrap()).unwrap();
	assert_eq!(variables, json!({ "owner": "other", "repo": "place", "number": 42 }));
}

#[test]
fn test_url_selector_overrides_repo_flag() {
	let ctx = setup();
	let (status, _stdout, stderr) = ctx.run(&["close", "https://github.com/other/place/issues/42", "-R", "owner/repo"]);

	assert!(status.success(), "stderr: {stderr}");
	assert!(stderr.contains("(Different bug)"), "stderr: {stderr}");
}

#[test]
fn test_url_selector_ignores_invalid_repo_flag() {
	let ctx = setup();
	let (status, _stdout, stderr) = ctx.run(&["close", "https://github.com/other/place/issues/42", "-R", "bad"]);

	assert!(status.success(), "stderr: {stderr}");
	insta::assert_snapshot!(stderr, @"✓ Closed issue #42 (Different bug)");
}

#[test]
fn test_url_selector_ignores_invalid_default_repo() {
	let ctx = setup();
	ctx.write_config(r#"default_repo = "not-a-repo""#);

	let (status, _stdout, stderr) = ctx.run(&["close", "https://github.com/other/place/issues/42"]);

	assert!(status.success(), "stderr: {stderr}");
	insta::assert_snapshot!(stderr, @"✓ Closed issue #42 (Different bug)");
	assert_mock_calls!(ctx.trace(), ["graphql:IssueByNumber", "graphql:IssueClose"]);
}

#[test]
fn test_number_selector_still_rejects_invalid_default_repo() {
	let ctx = setup();
	ctx.write_config(r#"default_repo = "not-a-repo""#);

	let (status, _stdout, stderr) = ctx.run(&["close", "42"]);

	assert!(!status.success());
	assert!(stderr.contains("invalid `default_repo` in config"), "stderr: {stderr}");
	assert!(ctx.trace().mock_calls().is_empty());
}

#[test]
fn test_default_repo_from_config() {
	let ctx = setup();
	ctx.write_config(r#"default_repo = "other/place""#);

	let (status, _stdout, stderr) = ctx.run(&["close", "42"]);

	assert!(status.success(), "stderr: {stderr}");
	insta::assert_snapshot!(stderr, @"✓ Closed issue #42 (Different bug)");
}

#[test]
fn test_repo_flag_beats_config() {
	let ctx = setup();
	ctx.write_config(r#"default_repo = "other/place""#);

	let (status, _stdout, stderr) = ctx.run(&["close", "42", "--repo", "owner/repo"]);

	assert!(status.success(), "stderr: {stderr}");
	insta::assert_snapshot!(stderr, @"✓ Closed issue #42 (Fix bug)");
}

#[test]
fn test_base_repo_from_git_remote() {
	let ctx = setup();
	let checkout = git_checkout(&ctx, "git@github.com:owner/repo.git");

	let (status, _stdout, stderr) = ctx.run_in(Some(&checkout), &["close", "42"]);

	assert!(status.success(), "stderr: {stderr}");
	insta::assert_snapshot!(stderr, @"✓ Closed issue #42 (Fix bug)");
}

#[test]
fn test_enterprise_host_in_repo_flag() {
	let ctx = setup();
	let (status, _stdout, stderr) = ctx.run(&["close", "5", "-R", "ghe.corp.io/owner/repo"]);

	assert!(status.success(), "stderr: {stderr}");
	assert!(stderr.contains("Closed issue #5 (Enterprise)"), "stderr: {stderr}");

	let trace = ctx.trace();
	assert_mock_calls!(trace, ["graphql:IssueByNumber", "graphql:IssueClose"]);
	assert!(trace.mock_calls().iter().all(|call| call.fields.host.as_deref() == Some("ghe.corp.io")));
}

#[test]
fn test_no_base_repo_available() {
	let ctx = setup();
	let (status, _stdout, stderr) = ctx.run(&["close", "42"]);

	assert!(!status.success());
	assert!(stderr.contains("could not determine the base repository"), "stderr: {stderr}");
	assert!(ctx.trace().mock_calls().is_empty());
}

#[test]
fn test_invalid_repo_flag() {
	let ctx = setup();
	let (status, _stdout, stderr) = ctx.run(&["close", "42", "-R", "just-a-name"]);

	assert!(!status.success());
	assert!(stderr.contains("invalid --repo"), "stderr: {stderr}");
	assert!(ctx.trace().mock_calls().is_empty());
}
