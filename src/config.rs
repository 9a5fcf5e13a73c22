//! Layered configuration: TOML file, then `GH_CLOSE_*` environment, then the usual token variables.

use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr};
use serde::Deserialize;
use smart_default::SmartDefault;

use crate::repo::RepositoryContext;

pub const APP_NAME: &str = "gh-close";
pub const CONFIG_FILENAME: &str = "config.toml";
pub const ENV_PREFIX: &str = "GH_CLOSE";
/// Checked in order when no token was configured otherwise.
pub const TOKEN_ENV_FALLBACKS: [&str; 2] = ["GH_TOKEN", "GITHUB_TOKEN"];

#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct AppConfig {
	pub token: Option<String>,
	#[default = "github.com"]
	pub host: String,
	/// `[HOST/]OWNER/REPO` used when neither `--repo` nor a URL selector names one
	pub default_repo: Option<String>,
	/// Per-request timeout of the HTTP client. No timeout when unset.
	pub timeout_secs: Option<u64>,
}

impl AppConfig {
	/// Load from `path` (or the XDG config file, if one exists) and the process environment.
	pub fn load(path: Option<&Path>) -> Result<Self> {
		Self::load_from(path, std::env::vars().collect())
	}

	/// Same as [`AppConfig::load`], reading environment variables from `env`.
	pub fn load_from(path: Option<&Path>, env: config::Map<String, String>) -> Result<Self> {
		let mut builder = config::Config::builder();

		if let Some(path) = path {
			builder = builder.add_source(config::File::from(path).required(true));
		} else if let Some(found) = xdg_config_file() {
			builder = builder.add_source(config::File::from(found).required(false));
		}

		let token_fallback = TOKEN_ENV_FALLBACKS.iter().find_map(|key| env.get(*key).filter(|v| !v.is_empty()).cloned());

		builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true).source(Some(env)));

		let mut settings: AppConfig = builder
			.build()
			.and_then(|c| c.try_deserialize())
			.wrap_err("The config file is not correctly formatted TOML\nand/or\n is missing some of the required fields")?;

		if settings.token.as_deref().is_none_or(str::is_empty) {
			settings.token = token_fallback;
		}

		Ok(settings)
	}

	/// Parse `default_repo`, if set.
	pub fn default_repo(&self) -> Result<Option<RepositoryContext>> {
		self.default_repo
			.as_deref()
			.map(|s| RepositoryContext::parse(s, &self.host).wrap_err("invalid `default_repo` in config"))
			.transpose()
	}

	/// Where the config file is looked up, for error messages.
	pub fn default_path_hint() -> String {
		match xdg_config_file() {
			Some(path) => path.display().to_string(),
			None => format!("$XDG_CONFIG_HOME/{APP_NAME}/{CONFIG_FILENAME}"),
		}
	}
}

fn xdg_config_file() -> Option<PathBuf> {
	xdg::BaseDirectories::with_prefix(APP_NAME).find_config_file(CONFIG_FILENAME)
}
