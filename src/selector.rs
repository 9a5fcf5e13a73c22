//! Parsing of user-supplied item selectors.

use std::str::FromStr;

use color_eyre::eyre::{Report, Result, bail, eyre};
use url::Url;

use crate::repo::RepositoryContext;

/// A parsed selector: either a bare number in the base repository, or an item URL
/// that carries its own repository.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Selector {
	Number(u64),
	Url { repo: RepositoryContext, number: u64 },
}

impl Selector {
	pub fn number(&self) -> u64 {
		match self {
			Selector::Number(n) => *n,
			Selector::Url { number, .. } => *number,
		}
	}

	/// The repository the selector names, if any. Takes precedence over the base repository.
	pub fn repo(&self) -> Option<&RepositoryContext> {
		match self {
			Selector::Number(_) => None,
			Selector::Url { repo, .. } => Some(repo),
		}
	}
}

impl FromStr for Selector {
	type Err = Report;

	fn from_str(s: &str) -> Result<Self> {
		let s = s.trim();
		if s.is_empty() {
			bail!("selector must not be empty");
		}

		if s.starts_with("http://") || s.starts_with("https://") {
			return parse_item_url(s);
		}

		let digits = s.strip_prefix('#').unwrap_or(s);
		let number = parse_number(digits).map_err(|_| eyre!("invalid issue format: {s:?}"))?;
		Ok(Selector::Number(number))
	}
}

fn parse_number(s: &str) -> Result<u64> {
	let number: u64 = s.parse()?;
	if number == 0 {
		bail!("issue numbers start at 1");
	}
	Ok(number)
}

/// Parse URLs like:
/// - https://github.com/owner/repo/issues/123
/// - https://github.com/owner/repo/pull/7/files
/// - https://ghe.corp.io/owner/repo/issues/5#issuecomment-1
fn parse_item_url(s: &str) -> Result<Selector> {
	let url = Url::parse(s).map_err(|e| eyre!("invalid URL {s:?}: {e}"))?;
	let host = url.host_str().ok_or_else(|| eyre!("URL has no host: {s}"))?;
	let segments: Vec<&str> = url.path_segments().map(|it| it.filter(|seg| !seg.is_empty()).collect()).unwrap_or_default();

	// The lookup is by number either way, so `issues/` and `pull/` resolve alike.
	let [owner, name, "issues" | "pull", number, ..] = segments.as_slice() else {
		bail!("invalid issue URL format. Expected: https://github.com/owner/repo/issues/123");
	};
	let number = parse_number(number).map_err(|_| eyre!("invalid issue number: {number}"))?;

	Ok(Selector::Url {
		repo: RepositoryContext::new(host, *owner, *name),
		number,
	})
}
