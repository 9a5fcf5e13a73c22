use std::{path::PathBuf, sync::Mutex};

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use gh_close::{config::AppConfig, github, mock_github};
use tracing_subscriber::EnvFilter;

mod close_command;

/// Written as JSON lines to this file instead of stderr when set.
const TRACE_FILE_ENV: &str = "GH_CLOSE_TRACE_FILE";

#[derive(Parser)]
#[command(author, version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")"), about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
	#[command(subcommand)]
	command: Commands,
	/// Config file to use instead of $XDG_CONFIG_HOME/gh-close/config.toml
	#[arg(long, global = true)]
	config: Option<PathBuf>,
	/// Talk to an in-memory GitHub, seeded from $GH_CLOSE_MOCK_STATE
	#[arg(long, global = true, hide = true)]
	mock: bool,
}

#[derive(Subcommand)]
enum Commands {
	/// Close issue
	Close(close_command::CloseArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	init_tracing()?;

	let cli = Cli::parse();
	let config = AppConfig::load(cli.config.as_deref())?;

	let gh: github::BoxedGitHubClient = if cli.mock {
		let mock = mock_github::MockGitHubClient::new("mock_user");
		if let Some(state_file) = std::env::var_os(mock_github::MOCK_STATE_ENV) {
			mock.load_state_file(state_file.as_ref())?;
		}
		std::sync::Arc::new(mock)
	} else {
		github::create_client(&config)?
	};

	match cli.command {
		Commands::Close(args) => close_command::close_command(&config, gh, args).await,
	}
}

fn init_tracing() -> Result<()> {
	let default_directives = option_env!("LOG_DIRECTIVES").unwrap_or("warn");

	match std::env::var_os(TRACE_FILE_ENV) {
		Some(path) => {
			let file = std::fs::File::create(&path)?;
			let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
			tracing_subscriber::fmt().json().with_env_filter(filter).with_writer(Mutex::new(file)).init();
		}
		None => {
			let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));
			tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
		}
	}
	Ok(())
}
