//! Posting comments on issues and pull requests.

use std::io::Write;

use color_eyre::eyre::{Result, bail};
use tracing::{debug, instrument};

use crate::{
	github::{CreatedComment, GitHubClient},
	item::TrackedItem,
	repo::RepositoryContext,
};

#[derive(Clone, Copy, Debug)]
pub struct CommentOptions<'a> {
	/// Posted verbatim
	pub body: &'a str,
	/// Skip the success report; the caller reports on its own
	pub quiet: bool,
}

/// Post a comment on `item` in `repo`. Unless `quiet`, the comment URL is written to `out`.
#[instrument(skip(gh, item, opts, out), fields(number = item.number))]
pub async fn post_comment<W: Write + Send>(gh: &dyn GitHubClient, item: &TrackedItem, repo: &RepositoryContext, opts: CommentOptions<'_>, out: &mut W) -> Result<CreatedComment> {
	if opts.body.trim().is_empty() {
		bail!("comment body cannot be blank");
	}

	let created = gh.create_comment(repo, item.number, opts.body).await?;
	debug!(comment_id = created.id, "posted comment");

	if !opts.quiet {
		writeln!(out, "{}", created.html_url)?;
	}
	Ok(created)
}
