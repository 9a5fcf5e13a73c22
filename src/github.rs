use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use color_eyre::eyre::{Result, bail, eyre};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tracing::instrument;

use crate::{
	config::AppConfig,
	graphql::{GraphQLRequest, GraphQLResponse},
	repo::{self, RepositoryContext},
};

const USER_AGENT: &str = concat!("gh-close/", env!("CARGO_PKG_VERSION"));

/// Response from GitHub when creating a comment
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct CreatedComment {
	pub id: u64,
	pub html_url: String,
}

//==============================================================================
// GitHub Client Trait
//==============================================================================

/// Trait defining the GitHub API operations the close workflow needs.
/// This allows for both real API calls and mock implementations for testing.
#[async_trait]
pub trait GitHubClient: Send + Sync {
	/// Run a GraphQL query or mutation against `host`, returning the `data` member
	async fn graphql(&self, host: &str, request: &GraphQLRequest) -> Result<serde_json::Value>;

	/// Create a new comment on an issue or pull request
	async fn create_comment(&self, repo: &RepositoryContext, issue_number: u64, body: &str) -> Result<CreatedComment>;

	/// Update a pull request's state (open/closed)
	async fn update_pull_request_state(&self, repo: &RepositoryContext, pr_number: u64, state: &str) -> Result<()>;
}

//==============================================================================
// Real GitHub Client Implementation
//==============================================================================

/// Real GitHub API client that makes HTTP requests
pub struct RealGitHubClient {
	http_client: Client,
	github_token: String,
}

impl RealGitHubClient {
	pub fn new(config: &AppConfig) -> Result<Self> {
		let github_token = config
			.token
			.clone()
			.ok_or_else(|| eyre!("no GitHub token configured. Set GH_TOKEN, or add `token = \"...\"` to {}", AppConfig::default_path_hint()))?;

		let mut builder = Client::builder().user_agent(USER_AGENT);
		if let Some(secs) = config.timeout_secs {
			builder = builder.timeout(Duration::from_secs(secs));
		}

		Ok(Self {
			http_client: builder.build()?,
			github_token,
		})
	}

	fn auth_header(&self) -> String {
		format!("token {}", self.github_token)
	}

	fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
		request.header("Authorization", self.auth_header()).header("Accept", "application/vnd.github+json")
	}
}

#[async_trait]
impl GitHubClient for RealGitHubClient {
	#[instrument(skip(self, request), fields(operation = %request.operation_name))]
	async fn graphql(&self, host: &str, request: &GraphQLRequest) -> Result<serde_json::Value> {
		let api_url = repo::graphql_endpoint(host);

		let res = self.authorized(self.http_client.post(&api_url)).json(request).send().await?;

		if !res.status().is_success() {
			let status = res.status();
			let body = res.text().await.unwrap_or_default();
			bail!("GraphQL request {} failed: {status} - {body}", request.operation_name);
		}

		let response = res.json::<GraphQLResponse<serde_json::Value>>().await?;
		response.into_data()
	}

	#[instrument(skip(self, body))]
	async fn create_comment(&self, repo: &RepositoryContext, issue_number: u64, body: &str) -> Result<CreatedComment> {
		let api_url = format!("{}/repos/{}/{}/issues/{issue_number}/comments", repo.rest_base(), repo.owner, repo.name);

		let res = self
			.authorized(self.http_client.post(&api_url))
			.json(&serde_json::json!({ "body": body }))
			.send()
			.await?;

		if !res.status().is_success() {
			let status = res.status();
			let body = res.text().await.unwrap_or_default();
			bail!("Failed to create comment: {status} - {body}");
		}

		let comment = res.json::<CreatedComment>().await?;
		Ok(comment)
	}

	#[instrument(skip(self))]
	async fn update_pull_request_state(&self, repo: &RepositoryContext, pr_number: u64, state: &str) -> Result<()> {
		let api_url = format!("{}/repos/{}/{}/pulls/{pr_number}", repo.rest_base(), repo.owner, repo.name);

		let res = self
			.authorized(self.http_client.patch(&api_url))
			.json(&serde_json::json!({ "state": state }))
			.send()
			.await?;

		if !res.status().is_success() {
			let status = res.status();
			let body = res.text().await.unwrap_or_default();
			bail!("Failed to update pull request state: {status} - {body}");
		}

		Ok(())
	}
}

//==============================================================================
// Convenience type alias for boxed client
//==============================================================================

pub type BoxedGitHubClient = Arc<dyn GitHubClient>;

/// Create a GitHub client from config.
/// Returns an error if no GitHub token is configured.
pub fn create_client(config: &AppConfig) -> Result<BoxedGitHubClient> {
	Ok(Arc::new(RealGitHubClient::new(config)?))
}
