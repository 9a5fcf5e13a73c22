//! GraphQL documents used by the close workflow, and the shapes of their responses.
//!
//! Queries are built as plain strings: the selection set of the item lookup depends on
//! which [`ItemField`]s the caller asks for, and the issue-close mutation asks for nothing
//! but the id of the closed issue.

use color_eyre::eyre::{Result, bail, eyre};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
	item::{ItemField, ItemId, ItemKind, ItemState, TrackedItem},
	repo::RepositoryContext,
};

pub const ITEM_LOOKUP_OPERATION: &str = "IssueByNumber";
pub const CLOSE_ISSUE_OPERATION: &str = "IssueClose";

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GraphQLRequest {
	pub query: String,
	pub variables: serde_json::Value,
	#[serde(rename = "operationName")]
	pub operation_name: String,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLResponse<T> {
	pub data: Option<T>,
	#[serde(default)]
	pub errors: Vec<GraphQLError>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GraphQLError {
	pub message: String,
}

impl<T> GraphQLResponse<T> {
	/// Turn a response into its data, failing if the server reported any errors.
	pub fn into_data(self) -> Result<T> {
		if !self.errors.is_empty() {
			let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
			bail!("GraphQL: {}", messages.join("; "));
		}
		self.data.ok_or_else(|| eyre!("GraphQL: response contained no data"))
	}
}

//==============================================================================
// Item lookup
//==============================================================================

/// Build the lookup query for one issue or pull request, selecting exactly `fields`.
pub fn item_lookup(repo: &RepositoryContext, number: u64, fields: &[ItemField]) -> GraphQLRequest {
	let selection = fields.iter().map(|f| f.graphql_name()).collect::<Vec<_>>().join(" ");
	let query = format!(
		"query {ITEM_LOOKUP_OPERATION}($owner: String!, $repo: String!, $number: Int!) {{ \
		repository(owner: $owner, name: $repo) {{ \
		issueOrPullRequest(number: $number) {{ __typename ...on Issue {{ {selection} }} ...on PullRequest {{ {selection} }} }} }} }}"
	);

	GraphQLRequest {
		query,
		variables: json!({ "owner": repo.owner, "repo": repo.name, "number": number }),
		operation_name: ITEM_LOOKUP_OPERATION.to_string(),
	}
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ItemLookupData {
	pub repository: Option<RepositoryNode>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RepositoryNode {
	#[serde(rename = "issueOrPullRequest")]
	pub item: Option<ItemNode>,
}

/// Every field is optional: only what was selected comes back.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ItemNode {
	#[serde(rename = "__typename")]
	pub typename: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub id: Option<ItemId>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub number: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub state: Option<String>,
}

impl ItemNode {
	/// Convert into a [`TrackedItem`]. `id` and `state` must have been selected;
	/// `number` falls back to the number that was looked up.
	pub fn into_tracked_item(self, requested_number: u64) -> Result<TrackedItem> {
		let kind = ItemKind::from_typename(&self.typename)?;
		let id = self.id.ok_or_else(|| eyre!("lookup response is missing the `id` field"))?;
		let state = self.state.ok_or_else(|| eyre!("lookup response is missing the `state` field"))?;

		Ok(TrackedItem {
			id,
			number: self.number.unwrap_or(requested_number),
			title: self.title.unwrap_or_default(),
			kind,
			state: ItemState::from_graphql(&state)?,
		})
	}
}

//==============================================================================
// Issue close mutation
//==============================================================================

/// Build the `closeIssue` mutation. The only input is the issue's id, and the only
/// thing read back is the id of the closed issue.
pub fn close_issue(id: &ItemId) -> GraphQLRequest {
	let query = format!("mutation {CLOSE_ISSUE_OPERATION}($input: CloseIssueInput!) {{ closeIssue(input: $input) {{ issue {{ id }} }} }}");

	GraphQLRequest {
		query,
		variables: json!({ "input": { "issueId": id } }),
		operation_name: CLOSE_ISSUE_OPERATION.to_string(),
	}
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CloseIssueData {
	#[serde(rename = "closeIssue")]
	pub close_issue: CloseIssuePayload,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CloseIssuePayload {
	pub issue: IdNode,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct IdNode {
	pub id: ItemId,
}
