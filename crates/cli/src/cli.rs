use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "wssh")]
#[command(about = "Open a terminal on a remote host through a wssh gateway")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Gateway address [default: 127.0.0.1:5000]
	#[arg(short, long, value_name = "HOST[:PORT]")]
	pub gateway: Option<String>,

	/// Connect to the gateway over wss://
	#[arg(long)]
	pub secure: bool,

	/// Load connection settings from a JSON profile (name or path)
	#[arg(long, value_name = "NAME|PATH")]
	pub profile: Option<String>,

	/// Reattach to an existing gateway session instead of starting one
	#[arg(long, value_name = "ID")]
	pub bridge_id: Option<String>,

	/// Remote login name
	#[arg(short = 'l', long)]
	pub username: Option<String>,

	/// Remote SSH port
	#[arg(short, long)]
	pub port: Option<u16>,

	/// Authentication method: password or private_key
	#[arg(long = "auth", value_name = "METHOD")]
	pub auth: Option<String>,

	/// Password for password authentication
	#[arg(long, env = "WSSH_PASSWORD", hide_env_values = true)]
	pub password: Option<String>,

	/// Private key file for key authentication
	#[arg(short, long, value_name = "FILE")]
	pub identity: Option<PathBuf>,

	/// Passphrase protecting the private key
	#[arg(long, env = "WSSH_KEY_PASSPHRASE", hide_env_values = true)]
	pub key_passphrase: Option<String>,

	/// Give up if the gateway does not accept the connection in time
	#[arg(long, value_name = "SECS")]
	pub open_timeout: Option<u64>,

	/// Remote host, optionally prefixed with the login name
	#[arg(value_name = "[USER@]HOSTNAME")]
	pub destination: Option<String>,

	/// Command to run instead of an interactive shell
	#[arg(trailing_var_arg = true, allow_hyphen_values = true, num_args = 1.., value_name = "COMMAND")]
	pub command: Vec<String>,
}

impl Cli {
	/// Splits `destination` into an optional login name and the host.
	pub fn destination_parts(&self) -> Option<(Option<&str>, &str)> {
		let destination = self.destination.as_deref()?;
		Some(match destination.rsplit_once('@') {
			Some((user, host)) => (Some(user), host),
			None => (None, destination),
		})
	}
}

#[cfg(test)]
mod tests;
