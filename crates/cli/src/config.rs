//! Session settings: JSON profiles merged with command-line flags.
//!
//! Profiles live in `<config dir>/wssh/profiles/<name>.json` (`$XDG_CONFIG_HOME`
//! or `~/.config` on Linux) or at an explicit path, and hold the same keys a browser
//! client passes to the connector (`bridgeId`, `username`, `hostname`, `port`,
//! `authenticationMethod`, `password`, `privateKey`, `keyPassphrase`,
//! `command`) plus `gateway`, `secure` and `openTimeout`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;
use wssh_protocol::params::DEFAULT_SSH_PORT;
use wssh_protocol::{AuthenticationMethod, ConnectionParameters, GatewayOrigin, Scheme};
use wssh_runtime::ConnectorOptions;

use crate::cli::Cli;
use crate::error::{CliError, Result};

pub const DEFAULT_GATEWAY: &str = "127.0.0.1:5000";

/// Contents of a profile file.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
	#[serde(default)]
	pub gateway: Option<String>,
	#[serde(default)]
	pub secure: bool,
	/// Seconds.
	#[serde(default, alias = "open_timeout")]
	pub open_timeout: Option<u64>,
	#[serde(flatten)]
	pub params: ConnectionParameters,
}

/// Everything needed to start one session.
#[derive(Debug)]
pub struct SessionSettings {
	pub origin: GatewayOrigin,
	pub params: ConnectionParameters,
	pub options: ConnectorOptions,
}

/// Directory holding named profiles under `config_home`.
pub fn profiles_dir(config_home: &Path) -> PathBuf {
	config_home.join("wssh").join("profiles")
}

fn config_home() -> Result<PathBuf> {
	dirs::config_dir().ok_or_else(|| CliError::Config("cannot determine the user config directory".to_string()))
}

/// Maps a `--profile` value to a file: explicit paths are used as-is, bare
/// names are looked up in [`profiles_dir`].
pub fn profile_path(value: &str, config_home: &Path) -> PathBuf {
	let looks_like_path = value.contains(std::path::MAIN_SEPARATOR) || value.contains('/') || value.ends_with(".json");
	if looks_like_path || Path::new(value).is_file() {
		PathBuf::from(value)
	} else {
		profiles_dir(config_home).join(format!("{value}.json"))
	}
}

pub fn load_profile(path: &Path) -> Result<Profile> {
	let raw = fs::read_to_string(path).map_err(|source| CliError::ReadFile {
		path: path.to_path_buf(),
		source,
	})?;
	let profile = serde_json::from_str(&raw).map_err(|source| CliError::Profile {
		path: path.to_path_buf(),
		source,
	})?;
	debug!(path = %path.display(), "loaded profile");
	Ok(profile)
}

fn read_identity(path: &Path) -> Result<String> {
	fs::read_to_string(path).map_err(|source| CliError::ReadFile {
		path: path.to_path_buf(),
		source,
	})
}

/// Builds session settings from `cli`, reading named profiles relative to
/// the user's config directory.
pub fn resolve_settings(cli: &Cli) -> Result<SessionSettings> {
	match &cli.profile {
		Some(_) => resolve_settings_in(cli, &config_home()?),
		None => resolve_settings_in(cli, Path::new(".")),
	}
}

/// Flags win over the profile. The authentication method is taken from
/// `--auth`, then from which credential flag was given, then from the
/// profile, then from which credential the profile carries.
pub fn resolve_settings_in(cli: &Cli, config_home: &Path) -> Result<SessionSettings> {
	let profile = match &cli.profile {
		Some(value) => load_profile(&profile_path(value, config_home))?,
		None => Profile::default(),
	};
	let Profile {
		gateway,
		secure,
		open_timeout,
		mut params,
	} = profile;

	if let Some(bridge_id) = &cli.bridge_id {
		params.bridge_id = Some(bridge_id.clone());
	}
	if let Some((user, host)) = cli.destination_parts() {
		if let Some(user) = user {
			params.username = user.to_string();
		}
		params.hostname = host.to_string();
	}
	if let Some(username) = &cli.username {
		params.username = username.clone();
	}
	if params.username.is_empty() && !params.is_resume() {
		if let Ok(user) = std::env::var("USER") {
			params.username = user;
		}
	}
	if let Some(port) = cli.port {
		params.port = port;
	}
	if params.port == 0 {
		params.port = DEFAULT_SSH_PORT;
	}

	if let Some(password) = &cli.password {
		params.password = Some(password.clone());
	}
	if let Some(identity) = &cli.identity {
		params.private_key = Some(read_identity(identity)?);
	}
	if let Some(passphrase) = &cli.key_passphrase {
		params.key_passphrase = Some(passphrase.clone());
	}
	if !cli.command.is_empty() {
		params.command = Some(cli.command.join(" "));
	}

	let from_flags = if cli.identity.is_some() {
		Some(AuthenticationMethod::PrivateKey)
	} else if cli.password.is_some() {
		Some(AuthenticationMethod::Password)
	} else {
		None
	};
	let from_profile_credentials = if params.private_key.is_some() {
		Some(AuthenticationMethod::PrivateKey)
	} else if params.password.is_some() {
		Some(AuthenticationMethod::Password)
	} else {
		None
	};
	params.authentication_method = cli
		.auth
		.as_deref()
		.map(AuthenticationMethod::from)
		.or(from_flags)
		.or(params.authentication_method.take())
		.or(from_profile_credentials);

	let authority = cli.gateway.clone().or(gateway).unwrap_or_else(|| DEFAULT_GATEWAY.to_string());
	if authority.trim().is_empty() {
		return Err(CliError::Config("gateway address is empty".to_string()));
	}
	let origin = GatewayOrigin::new(Scheme::for_secure_context(cli.secure || secure), authority);

	let options = ConnectorOptions {
		open_timeout: cli.open_timeout.or(open_timeout).map(Duration::from_secs),
	};

	Ok(SessionSettings {
		origin,
		params,
		options,
	})
}
