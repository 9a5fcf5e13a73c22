//! Repository coordinates: which host, owner and name a request is routed to.

use std::{fmt, path::Path, process::Command};

use color_eyre::eyre::{Result, bail, eyre};
use url::Url;

pub const GITHUB_HOST: &str = "github.com";

/// Host plus owner/name coordinates of a repository.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct RepositoryContext {
	pub host: String,
	pub owner: String,
	pub name: String,
}

impl RepositoryContext {
	pub fn new(host: impl Into<String>, owner: impl Into<String>, name: impl Into<String>) -> Self {
		Self {
			host: normalize_host(&host.into()),
			owner: owner.into(),
			name: name.into(),
		}
	}

	/// Parse `OWNER/REPO`, `HOST/OWNER/REPO` or a repository URL.
	/// `OWNER/REPO` lands on `default_host`.
	pub fn parse(s: &str, default_host: &str) -> Result<Self> {
		let s = s.trim();
		if s.contains("://") || s.starts_with("git@") {
			return Self::from_remote_url(s);
		}

		let parts: Vec<&str> = s.split('/').collect();
		if parts.iter().any(|p| p.is_empty()) {
			bail!("expected the \"[HOST/]OWNER/REPO\" format, got {s:?}");
		}
		match parts.as_slice() {
			[owner, name] => Ok(Self::new(default_host, *owner, *name)),
			[host, owner, name] => Ok(Self::new(*host, *owner, *name)),
			_ => bail!("expected the \"[HOST/]OWNER/REPO\" format, got {s:?}"),
		}
	}

	/// Parse a git remote URL. Supports formats like:
	/// - https://github.com/owner/repo(.git)
	/// - git@github.com:owner/repo(.git)
	/// - ssh://git@github.com/owner/repo(.git)
	pub fn from_remote_url(remote: &str) -> Result<Self> {
		let remote = remote.trim();

		// scp-like syntax is not a URL
		if let Some(rest) = remote.strip_prefix("git@")
			&& !rest.contains("://")
		{
			let (host, path) = rest.split_once(':').ok_or_else(|| eyre!("invalid ssh remote: {remote}"))?;
			return Self::from_host_and_path(host, path, remote);
		}

		let url = Url::parse(remote).map_err(|e| eyre!("invalid remote URL {remote:?}: {e}"))?;
		let host = url.host_str().ok_or_else(|| eyre!("remote URL has no host: {remote}"))?;
		Self::from_host_and_path(host, url.path(), remote)
	}

	fn from_host_and_path(host: &str, path: &str, original: &str) -> Result<Self> {
		let mut segments = path.trim_matches('/').split('/').filter(|s| !s.is_empty());
		let (Some(owner), Some(name)) = (segments.next(), segments.next()) else {
			bail!("remote URL does not name a repository: {original}");
		};
		let name = name.strip_suffix(".git").unwrap_or(name);
		Ok(Self::new(host, owner, name))
	}

	/// Infer the repository from the `origin` remote of the git checkout at `dir`.
	pub fn from_git_remote(dir: &Path) -> Result<Self> {
		let output = Command::new("git").args(["config", "--get", "remote.origin.url"]).current_dir(dir).output()?;
		if !output.status.success() {
			bail!("no `origin` remote configured in {}", dir.display());
		}
		let remote = String::from_utf8(output.stdout)?;
		Self::from_remote_url(&remote)
	}

	pub fn is_github_com(&self) -> bool {
		self.host == GITHUB_HOST
	}

	/// Base URL of the REST API for this host.
	pub fn rest_base(&self) -> String {
		rest_base(&self.host)
	}
}

impl fmt::Display for RepositoryContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_github_com() {
			write!(f, "{}/{}", self.owner, self.name)
		} else {
			write!(f, "{}/{}/{}", self.host, self.owner, self.name)
		}
	}
}

/// Lowercase, and fold `www.github.com` into `github.com`.
pub fn normalize_host(host: &str) -> String {
	let host = host.trim().to_ascii_lowercase();
	match host.strip_prefix("www.") {
		Some(rest) => rest.to_string(),
		None => host,
	}
}

pub fn rest_base(host: &str) -> String {
	if host == GITHUB_HOST { "https://api.github.com".to_string() } else { format!("https://{host}/api/v3") }
}

pub fn graphql_endpoint(host: &str) -> String {
	if host == GITHUB_HOST {
		"https://api.github.com/graphql".to_string()
	} else {
		format!("https://{host}/api/graphql")
	}
}
