use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
	#[error("configuration error: {0}")]
	Config(String),

	#[error("cannot read {}: {source}", path.display())]
	ReadFile {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("invalid profile {}: {source}", path.display())]
	Profile {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},

	#[error(transparent)]
	Io(#[from] std::io::Error),
}

impl CliError {
	/// Check if the error came from a local file rather than the session.
	pub fn is_file_error(&self) -> bool {
		matches!(self, CliError::ReadFile { .. } | CliError::Profile { .. })
	}
}
