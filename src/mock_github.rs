//! Mock GitHub client for testing purposes.
//!
//! This module provides a mock implementation of the GitHubClient trait that stores
//! all data in memory and can be used for integration testing without hitting the real API.
//! The binary uses it under `--mock`, seeded from the JSON file named by `GH_CLOSE_MOCK_STATE`.

use std::{
	collections::{HashMap, HashSet},
	path::Path,
	sync::{
		Mutex,
		atomic::{AtomicU64, Ordering},
	},
};

use async_trait::async_trait;
use color_eyre::eyre::{Result, WrapErr, bail, eyre};
use serde::Deserialize;
use tracing::instrument;

use crate::{
	github::{CreatedComment, GitHubClient},
	graphql::{
		CLOSE_ISSUE_OPERATION, CloseIssueData, CloseIssuePayload, GraphQLError, GraphQLRequest, GraphQLResponse, ITEM_LOOKUP_OPERATION, IdNode, ItemLookupData, ItemNode, RepositoryNode,
	},
	item::{ItemId, ItemKind, ItemState},
	repo::{GITHUB_HOST, RepositoryContext, normalize_host},
};

pub const MOCK_STATE_ENV: &str = "GH_CLOSE_MOCK_STATE";

/// Internal representation of an issue or pull request in the mock
#[derive(Clone, Debug)]
struct MockItemData {
	id: ItemId,
	number: u64,
	title: String,
	kind: ItemKind,
	state: ItemState,
	/// Reported as `MERGED` instead of `CLOSED`
	merged: bool,
}

/// Internal representation of a comment in the mock
#[derive(Clone, Debug)]
struct MockCommentData {
	issue_number: u64,
	body: String,
}

/// Key for looking up items/comments by host/owner/repo
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
struct RepoKey {
	host: String,
	owner: String,
	repo: String,
}

impl RepoKey {
	fn new(host: &str, owner: &str, repo: &str) -> Self {
		Self {
			host: normalize_host(host),
			owner: owner.to_string(),
			repo: repo.to_string(),
		}
	}

	fn of(repo: &RepositoryContext) -> Self {
		Self::new(&repo.host, &repo.owner, &repo.name)
	}
}

/// Seed file format for `--mock` runs.
#[derive(Debug, Default, Deserialize)]
struct MockState {
	#[serde(default)]
	items: Vec<MockStateItem>,
	/// Method names that should fail, e.g. `"create_comment"`
	#[serde(default)]
	fail: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MockStateItem {
	#[serde(default = "default_host")]
	host: String,
	owner: String,
	repo: String,
	number: u64,
	#[serde(default)]
	title: String,
	kind: ItemKind,
	state: ItemState,
}

fn default_host() -> String {
	GITHUB_HOST.to_string()
}

/// Mock GitHub client that stores all state in memory.
/// Thread-safe for use in async contexts.
pub struct MockGitHubClient {
	/// The authenticated user's login
	user_login: String,

	/// Counter for generating unique node IDs
	next_node_id: AtomicU64,

	/// Counter for generating unique comment IDs
	next_comment_id: AtomicU64,

	/// All issues and pull requests, keyed by repo -> number -> item
	items: Mutex<HashMap<RepoKey, HashMap<u64, MockItemData>>>,

	/// All comments, keyed by repo -> comment_id -> comment
	comments: Mutex<HashMap<RepoKey, HashMap<u64, MockCommentData>>>,

	/// Methods that return an error instead of doing anything
	failing: Mutex<HashSet<String>>,

	/// GraphQL operation -> message of the `errors` entry it answers with
	graphql_errors: Mutex<HashMap<String, String>>,

	/// Id `closeIssue` reports back instead of the closed issue's own
	close_confirmation: Mutex<Option<ItemId>>,

	/// Every GraphQL request received, in order
	graphql_requests: Mutex<Vec<GraphQLRequest>>,

	/// Call log for debugging
	call_log: Mutex<Vec<String>>,
}

impl MockGitHubClient {
	/// Create a new mock client with the given authenticated user login
	pub fn new(user_login: &str) -> Self {
		Self {
			user_login: user_login.to_string(),
			next_node_id: AtomicU64::new(1000),
			next_comment_id: AtomicU64::new(5000),
			items: Mutex::new(HashMap::new()),
			comments: Mutex::new(HashMap::new()),
			failing: Mutex::new(HashSet::new()),
			graphql_errors: Mutex::new(HashMap::new()),
			close_confirmation: Mutex::new(None),
			graphql_requests: Mutex::new(Vec::new()),
			call_log: Mutex::new(Vec::new()),
		}
	}

	/// Load initial state from a JSON seed file
	pub fn load_state_file(&self, path: &Path) -> Result<()> {
		let content = std::fs::read_to_string(path).wrap_err_with(|| format!("Failed to read mock state from {}", path.display()))?;
		self.load_state_json(&content)
	}

	/// Load state from JSON content
	pub fn load_state_json(&self, content: &str) -> Result<()> {
		let state: MockState = serde_json::from_str(content).wrap_err("invalid mock state")?;

		for item in state.items {
			self.insert_item(RepoKey::new(&item.host, &item.owner, &item.repo), item.number, &item.title, item.kind, item.state);
		}
		self.failing.lock().unwrap().extend(state.fail);

		Ok(())
	}

	/// Add an item on github.com, returning its node id
	pub fn add_item(&self, owner: &str, repo: &str, number: u64, title: &str, kind: ItemKind, state: ItemState) -> ItemId {
		self.insert_item(RepoKey::new(GITHUB_HOST, owner, repo), number, title, kind, state)
	}

	/// Make every subsequent call to `method` fail
	pub fn fail_on(&self, method: &str) {
		self.failing.lock().unwrap().insert(method.to_string());
	}

	/// Answer every `operation` request with a GraphQL `errors` response
	pub fn respond_with_errors(&self, operation: &str, message: &str) {
		self.graphql_errors.lock().unwrap().insert(operation.to_string(), message.to_string());
	}

	/// Make `closeIssue` confirm `id` instead of the issue it closed
	pub fn confirm_close_as(&self, id: ItemId) {
		*self.close_confirmation.lock().unwrap() = Some(id);
	}

	/// Merge an existing pull request on github.com
	pub fn merge_pull_request(&self, owner: &str, repo: &str, number: u64) {
		let mut items = self.items.lock().unwrap();
		if let Some(pr) = items
			.get_mut(&RepoKey::new(GITHUB_HOST, owner, repo))
			.and_then(|m| m.get_mut(&number))
			.filter(|item| item.kind == ItemKind::PullRequest)
		{
			pr.state = ItemState::Closed;
			pr.merged = true;
		}
	}

	/// Current state of an item, if it exists
	pub fn item_state(&self, owner: &str, repo: &str, number: u64) -> Option<ItemState> {
		let items = self.items.lock().unwrap();
		items.get(&RepoKey::new(GITHUB_HOST, owner, repo)).and_then(|m| m.get(&number)).map(|i| i.state)
	}

	/// Bodies of all comments on an item, in creation order
	pub fn comments_on(&self, owner: &str, repo: &str, number: u64) -> Vec<String> {
		let comments = self.comments.lock().unwrap();
		let Some(repo_comments) = comments.get(&RepoKey::new(GITHUB_HOST, owner, repo)) else {
			return Vec::new();
		};
		let mut matching: Vec<(&u64, &MockCommentData)> = repo_comments.iter().filter(|(_, c)| c.issue_number == number).collect();
		matching.sort_by_key(|(id, _)| **id);
		matching.into_iter().map(|(_, c)| c.body.clone()).collect()
	}

	/// Every GraphQL request received so far
	pub fn graphql_requests(&self) -> Vec<GraphQLRequest> {
		self.graphql_requests.lock().unwrap().clone()
	}

	/// Get the call log for debugging
	pub fn get_call_log(&self) -> Vec<String> {
		self.call_log.lock().unwrap().clone()
	}

	/// Clear the call log
	pub fn clear_call_log(&self) {
		self.call_log.lock().unwrap().clear();
		self.graphql_requests.lock().unwrap().clear();
	}

	fn insert_item(&self, key: RepoKey, number: u64, title: &str, kind: ItemKind, state: ItemState) -> ItemId {
		let prefix = match kind {
			ItemKind::Issue => "I",
			ItemKind::PullRequest => "PR",
		};
		let id = ItemId(format!("{prefix}_mock{}", self.next_node_id.fetch_add(1, Ordering::SeqCst)));

		let item = MockItemData {
			id: id.clone(),
			number,
			title: title.to_string(),
			kind,
			state,
			merged: false,
		};

		let mut items = self.items.lock().unwrap();
		items.entry(key).or_default().insert(number, item);
		id
	}

	fn log_call(&self, call: &str) {
		self.call_log.lock().unwrap().push(call.to_string());
	}

	fn check_failure(&self, method: &str) -> Result<()> {
		if self.failing.lock().unwrap().contains(method) {
			bail!("mock failure injected for {method}");
		}
		Ok(())
	}

	fn lookup_item(&self, host: &str, request: &GraphQLRequest) -> Result<serde_json::Value> {
		let vars = &request.variables;
		let owner = vars["owner"].as_str().ok_or_else(|| eyre!("missing $owner"))?;
		let repo = vars["repo"].as_str().ok_or_else(|| eyre!("missing $repo"))?;
		let number = vars["number"].as_u64().ok_or_else(|| eyre!("missing $number"))?;

		let items = self.items.lock().unwrap();
		let data = match items.get(&RepoKey::new(host, owner, repo)) {
			None => ItemLookupData { repository: None },
			Some(repo_items) => ItemLookupData {
				repository: Some(RepositoryNode {
					item: repo_items.get(&number).map(|data| ItemNode {
						typename: match data.kind {
							ItemKind::Issue => "Issue".to_string(),
							ItemKind::PullRequest => "PullRequest".to_string(),
						},
						id: Some(data.id.clone()),
						number: Some(data.number),
						title: Some(data.title.clone()),
						state: Some(
							match (data.state, data.merged) {
								(_, true) => "MERGED",
								(ItemState::Open, false) => "OPEN",
								(ItemState::Closed, false) => "CLOSED",
							}
							.to_string(),
						),
					}),
				}),
			},
		};
		Ok(serde_json::to_value(data)?)
	}

	fn close_issue(&self, host: &str, request: &GraphQLRequest) -> Result<serde_json::Value> {
		let issue_id = request.variables["input"]["issueId"].as_str().ok_or_else(|| eyre!("missing input.issueId"))?;

		let mut items = self.items.lock().unwrap();
		let issue = items
			.iter_mut()
			.filter(|(key, _)| key.host == normalize_host(host))
			.flat_map(|(_, repo_items)| repo_items.values_mut())
			.find(|item| item.id.as_str() == issue_id && item.kind == ItemKind::Issue)
			.ok_or_else(|| eyre!("GraphQL: Could not resolve to Issue node with the global id of '{issue_id}'"))?;

		issue.state = ItemState::Closed;
		let confirmed = self.close_confirmation.lock().unwrap().clone().unwrap_or_else(|| issue.id.clone());
		let data = CloseIssueData {
			close_issue: CloseIssuePayload {
				issue: IdNode { id: confirmed },
			},
		};
		Ok(serde_json::to_value(data)?)
	}
}

#[async_trait]
impl GitHubClient for MockGitHubClient {
	#[instrument(skip(self, request), name = "MockGitHubClient::graphql")]
	async fn graphql(&self, host: &str, request: &GraphQLRequest) -> Result<serde_json::Value> {
		let operation = request.operation_name.as_str();
		tracing::info!(target: "mock_github", host, operation, variables = %request.variables, "graphql");
		self.log_call(&format!("graphql({host}, {operation})"));
		self.graphql_requests.lock().unwrap().push(request.clone());
		self.check_failure("graphql")?;

		if let Some(message) = self.graphql_errors.lock().unwrap().get(operation).cloned() {
			let response: GraphQLResponse<serde_json::Value> = GraphQLResponse {
				data: None,
				errors: vec![GraphQLError { message }],
			};
			return response.into_data();
		}

		match operation {
			ITEM_LOOKUP_OPERATION => self.lookup_item(host, request),
			CLOSE_ISSUE_OPERATION => {
				self.check_failure("close_issue")?;
				self.close_issue(host, request)
			}
			other => bail!("mock does not implement GraphQL operation {other}"),
		}
	}

	#[instrument(skip(self, body), name = "MockGitHubClient::create_comment")]
	async fn create_comment(&self, repo: &RepositoryContext, issue_number: u64, body: &str) -> Result<CreatedComment> {
		let (owner, repo_name) = (repo.owner.as_str(), repo.name.as_str());
		tracing::info!(target: "mock_github", author = self.user_login.as_str(), owner, repo = repo_name, issue_number, body, "create_comment");
		self.log_call(&format!("create_comment({owner}, {repo_name}, {issue_number}, <body>)"));
		self.check_failure("create_comment")?;

		let key = RepoKey::of(repo);
		let exists = self.items.lock().unwrap().get(&key).is_some_and(|m| m.contains_key(&issue_number));
		if !exists {
			bail!("Failed to create comment: 404 Not Found - issue #{issue_number} not found in {repo}");
		}

		let comment_id = self.next_comment_id.fetch_add(1, Ordering::SeqCst);
		let comment = MockCommentData {
			issue_number,
			body: body.to_string(),
		};
		self.comments.lock().unwrap().entry(key).or_default().insert(comment_id, comment);

		Ok(CreatedComment {
			id: comment_id,
			html_url: format!("https://{}/{owner}/{repo_name}/issues/{issue_number}#issuecomment-{comment_id}", repo.host),
		})
	}

	#[instrument(skip(self), name = "MockGitHubClient::update_pull_request_state")]
	async fn update_pull_request_state(&self, repo: &RepositoryContext, pr_number: u64, state: &str) -> Result<()> {
		let (owner, repo_name) = (repo.owner.as_str(), repo.name.as_str());
		tracing::info!(target: "mock_github", owner, repo = repo_name, issue_number = pr_number, state, "update_pull_request_state");
		self.log_call(&format!("update_pull_request_state({owner}, {repo_name}, {pr_number}, {state})"));
		self.check_failure("update_pull_request_state")?;

		let new_state = match state {
			"open" => ItemState::Open,
			"closed" => ItemState::Closed,
			other => bail!("Failed to update pull request state: 422 Unprocessable Entity - invalid state {other:?}"),
		};

		let mut items = self.items.lock().unwrap();
		let pr = items
			.get_mut(&RepoKey::of(repo))
			.and_then(|m| m.get_mut(&pr_number))
			.filter(|item| item.kind == ItemKind::PullRequest)
			.ok_or_else(|| eyre!("Failed to update pull request state: 404 Not Found - pull request #{pr_number} not found in {repo}"))?;

		pr.state = new_state;
		Ok(())
	}
}
