//! The close workflow.
//!
//! One invocation runs, strictly in order:
//! 1. resolve the selector to an item (`id`, `number`, `title`, `state` only)
//! 2. stop with [`CloseOutcome::AlreadyClosed`] if the item was already closed
//! 3. post the closing comment, if one was given
//! 4. close the item: pull requests through the REST pulls endpoint, issues through the
//!    `closeIssue` GraphQL mutation
//!
//! Every failure stops the sequence. Nothing is retried, and a comment that was posted
//! before a failed close stays posted.
//!
//! The already-closed check only sees the state captured at resolution time. If someone
//! else closes the item in between, the close transport's answer is what counts.

use std::io;

use color_eyre::eyre::{Report, Result, ensure};
use tracing::{debug, instrument};

use crate::{
	comment::{CommentOptions, post_comment},
	github::GitHubClient,
	graphql::{self, CloseIssueData},
	item::{ItemField, ItemKind, TrackedItem},
	repo::RepositoryContext,
	resolve::resolve_item,
};

/// The fields the close workflow asks for when resolving an item.
pub const CLOSE_FIELDS: &[ItemField] = &[ItemField::Id, ItemField::Number, ItemField::Title, ItemField::State];

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CloseRequest {
	/// Item number or URL
	pub selector: String,
	/// Posted before closing when non-empty
	pub comment: Option<String>,
}

impl CloseRequest {
	pub fn new(selector: impl Into<String>) -> Self {
		Self {
			selector: selector.into(),
			comment: None,
		}
	}

	pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
		self.comment = Some(comment.into());
		self
	}

	fn comment_body(&self) -> Option<&str> {
		self.comment.as_deref().filter(|c| !c.is_empty())
	}
}

/// Which step of the workflow failed. Each variant carries the underlying error as is.
#[derive(Debug, thiserror::Error)]
pub enum CloseError {
	#[error("{0}")]
	Resolution(Report),
	#[error("{0}")]
	Comment(Report),
	#[error("{0}")]
	CloseTransport(Report),
}

impl CloseError {
	pub fn into_report(self) -> Report {
		match self {
			CloseError::Resolution(e) | CloseError::Comment(e) | CloseError::CloseTransport(e) => e,
		}
	}
}

#[derive(Debug)]
pub enum CloseOutcome {
	AlreadyClosed(TrackedItem),
	ClosedWithComment(TrackedItem),
	ClosedNoComment(TrackedItem),
	Failed(CloseError),
}

impl CloseOutcome {
	/// The line reported to the user on success. `None` for failures, which are reported as errors.
	pub fn status_line(&self) -> Option<String> {
		match self {
			CloseOutcome::AlreadyClosed(item) => Some(format!("! {} #{} ({}) is already closed", capitalize(&item.kind.to_string()), item.number, item.title)),
			CloseOutcome::ClosedWithComment(item) | CloseOutcome::ClosedNoComment(item) => Some(format!("✓ Closed {} #{} ({})", item.kind, item.number, item.title)),
			CloseOutcome::Failed(_) => None,
		}
	}

	/// Success outcomes as `Ok`, failures as the underlying error.
	pub fn into_result(self) -> Result<Self> {
		match self {
			CloseOutcome::Failed(e) => Err(e.into_report()),
			outcome => Ok(outcome),
		}
	}
}

fn capitalize(s: &str) -> String {
	let mut chars = s.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}

/// Close the item `request.selector` points at, commenting first if asked to.
#[instrument(skip(gh, base_repo, request), fields(selector = %request.selector))]
pub async fn close_item(gh: &dyn GitHubClient, base_repo: Option<&RepositoryContext>, request: &CloseRequest) -> CloseOutcome {
	let (item, repo) = match resolve_item(gh, &request.selector, base_repo, CLOSE_FIELDS).await {
		Ok(resolved) => resolved,
		Err(e) => return CloseOutcome::Failed(CloseError::Resolution(e)),
	};

	if item.state.is_closed() {
		debug!(number = item.number, "already closed, nothing to do");
		return CloseOutcome::AlreadyClosed(item);
	}

	let comment = request.comment_body();
	if let Some(body) = comment {
		let opts = CommentOptions { body, quiet: true };
		if let Err(e) = post_comment(gh, &item, &repo, opts, &mut io::stderr()).await {
			return CloseOutcome::Failed(CloseError::Comment(e));
		}
	}

	if let Err(e) = close_transport(gh, &repo, &item).await {
		return CloseOutcome::Failed(CloseError::CloseTransport(e));
	}
	debug!(number = item.number, kind = %item.kind, "closed");

	match comment {
		Some(_) => CloseOutcome::ClosedWithComment(item),
		None => CloseOutcome::ClosedNoComment(item),
	}
}

/// Issue exactly one close call for `item`, picked by its kind.
async fn close_transport(gh: &dyn GitHubClient, repo: &RepositoryContext, item: &TrackedItem) -> Result<()> {
	match item.kind {
		ItemKind::PullRequest => gh.update_pull_request_state(repo, item.number, "closed").await,
		ItemKind::Issue => {
			let data = gh.graphql(&repo.host, &graphql::close_issue(&item.id)).await?;
			let closed: CloseIssueData = serde_json::from_value(data)?;
			ensure!(
				closed.close_issue.issue.id == item.id,
				"closeIssue confirmed {} instead of {}",
				closed.close_issue.issue.id,
				item.id
			);
			Ok(())
		}
	}
}
