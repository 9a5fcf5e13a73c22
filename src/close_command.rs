//! Entry point for the close subcommand.

use clap::Args;
use color_eyre::eyre::{Result, WrapErr};
use gh_close::{CloseRequest, RepositoryContext, Selector, close_item, config::AppConfig, github::BoxedGitHubClient};
use tracing::debug;

#[derive(Args)]
pub struct CloseArgs {
	/// {<number> | <url>} of the issue or pull request
	pub selector: String,

	/// Leave a closing comment
	#[arg(short, long)]
	pub comment: Option<String>,

	/// Select another repository using the [HOST/]OWNER/REPO format
	#[arg(short = 'R', long)]
	pub repo: Option<String>,
}

/// Base repository precedence: `--repo`, then `default_repo` from config, then the `origin`
/// remote of the current directory. Failing to read the remote is not an error here; resolution
/// reports the missing base repository if the selector needs one.
fn base_repo(config: &AppConfig, flag: Option<&str>) -> Result<Option<RepositoryContext>> {
	if let Some(flag) = flag {
		return RepositoryContext::parse(flag, &config.host).wrap_err("invalid --repo").map(Some);
	}
	if let Some(repo) = config.default_repo()? {
		return Ok(Some(repo));
	}

	let cwd = std::env::current_dir()?;
	match RepositoryContext::from_git_remote(&cwd) {
		Ok(repo) => Ok(Some(repo)),
		Err(e) => {
			debug!("no base repository from git remote: {e}");
			Ok(None)
		}
	}
}

pub async fn close_command(config: &AppConfig, gh: BoxedGitHubClient, args: CloseArgs) -> Result<()> {
	// A URL names its own repository, so `--repo` and config are not even parsed for it.
	// An unparsable selector is left for `close_item` to report.
	let needs_base_repo = args.selector.parse::<Selector>().is_ok_and(|s| s.repo().is_none());
	let base_repo = if needs_base_repo { base_repo(config, args.repo.as_deref())? } else { None };
	let request = CloseRequest {
		selector: args.selector,
		comment: args.comment,
	};

	let outcome = close_item(gh.as_ref(), base_repo.as_ref(), &request).await.into_result()?;
	if let Some(line) = outcome.status_line() {
		eprintln!("{line}");
	}
	Ok(())
}
