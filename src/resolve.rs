//! Item resolution: selector + repository context → tracked item.

use color_eyre::eyre::{Result, WrapErr, eyre};
use tracing::{debug, instrument};

use crate::{
	github::GitHubClient,
	graphql::{self, ItemLookupData},
	item::{ItemField, TrackedItem},
	repo::RepositoryContext,
	selector::Selector,
};

/// Resolve `selector` to an issue or pull request, fetching exactly `fields`.
///
/// A URL selector names its own repository and wins over `base_repo`; a bare number
/// needs `base_repo`. Returns the item together with the repository it lives in.
#[instrument(skip(gh, base_repo, fields))]
pub async fn resolve_item(gh: &dyn GitHubClient, selector: &str, base_repo: Option<&RepositoryContext>, fields: &[ItemField]) -> Result<(TrackedItem, RepositoryContext)> {
	let parsed: Selector = selector.parse()?;
	let repo = match parsed.repo().or(base_repo) {
		Some(repo) => repo.clone(),
		None => return Err(eyre!("could not determine the base repository for {selector:?}; pass `--repo OWNER/REPO` or run inside a git checkout")),
	};
	let number = parsed.number();

	let request = graphql::item_lookup(&repo, number, fields);
	let data = gh.graphql(&repo.host, &request).await?;
	let data: ItemLookupData = serde_json::from_value(data).wrap_err("unexpected shape of item lookup response")?;

	let node = data
		.repository
		.ok_or_else(|| eyre!("Could not resolve to a Repository with the name '{}/{}'", repo.owner, repo.name))?
		.item
		.ok_or_else(|| eyre!("Could not resolve to an issue or pull request with the number of {number} in {repo}"))?;
	let item = node.into_tracked_item(number)?;

	debug!(number = item.number, kind = %item.kind, state = %item.state, "resolved item");
	Ok((item, repo))
}
