//! Error types for the wssh runtime.

use thiserror::Error;
use wssh_protocol::ResolveError;

use crate::connector::ChannelState;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the wssh runtime.
#[derive(Debug, Error)]
pub enum Error {
	/// Connection parameters could not be resolved into an endpoint.
	#[error("Configuration error: {0}")]
	Configuration(#[from] ResolveError),

	/// No transport implementation is usable in this environment.
	#[error("WebSocket Not Supported")]
	Unsupported,

	/// `send` was called while the channel was not open.
	#[error("Channel is not open (state: {0})")]
	NotOpen(ChannelState),

	/// Transport-level error (socket, handshake, runtime).
	#[error("Transport error: {0}")]
	Transport(String),

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	/// The transport task has already gone away.
	#[error("Channel closed unexpectedly")]
	ChannelClosed,
}

impl Error {
	/// Returns true if this error is a contract violation by the caller
	/// rather than a failure of the channel.
	pub fn is_not_open(&self) -> bool {
		matches!(self, Error::NotOpen(_))
	}
}
