//! Endpoint resolution: connection parameters to a gateway WebSocket URL.
//!
//! Two mutually exclusive address shapes exist:
//!
//! - resume: `/websocket?id=<bridge_id>`
//! - new session: `/ssh/connect?username=..&hostname=..&<credentials>&port=..[&run=..]`
//!
//! Resolution is pure. The scheme comes from the [`GatewayOrigin`], which plays
//! the role of the page location a browser client would read.

use std::fmt;

use thiserror::Error;
use url::Url;

use crate::params::{AuthenticationMethod, ConnectionParameters};

pub const RESUME_PATH: &str = "/websocket";
pub const CONNECT_PATH: &str = "/ssh/connect";

/// Reasons [`resolve`] cannot produce an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
	#[error("unsupported authentication method: {0:?}")]
	UnsupportedAuthenticationMethod(String),

	#[error("no authentication method given for a new session")]
	MissingAuthenticationMethod,

	#[error("authentication method requires `{0}`")]
	MissingCredential(&'static str),

	#[error("invalid gateway origin: {0}")]
	InvalidOrigin(String),
}

/// WebSocket scheme, chosen by whether the surrounding context is secure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
	#[default]
	Ws,
	Wss,
}

impl Scheme {
	pub fn for_secure_context(secure: bool) -> Self {
		if secure { Scheme::Wss } else { Scheme::Ws }
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Scheme::Ws => "ws",
			Scheme::Wss => "wss",
		}
	}
}

/// Where the gateway lives: scheme plus `host[:port]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayOrigin {
	pub scheme: Scheme,
	pub authority: String,
}

impl GatewayOrigin {
	pub fn new(scheme: Scheme, authority: impl Into<String>) -> Self {
		Self {
			scheme,
			authority: authority.into(),
		}
	}

	pub fn insecure(authority: impl Into<String>) -> Self {
		Self::new(Scheme::Ws, authority)
	}

	pub fn secure(authority: impl Into<String>) -> Self {
		Self::new(Scheme::Wss, authority)
	}

	fn base(&self) -> Result<String, ResolveError> {
		let authority = self.authority.as_str();
		let structural = |c: char| matches!(c, '/' | '?' | '#' | '@') || c.is_whitespace();
		if authority.is_empty() || authority.contains(structural) {
			return Err(ResolveError::InvalidOrigin(authority.to_string()));
		}
		Ok(format!("{}://{}", self.scheme.as_str(), authority))
	}
}

impl fmt::Display for GatewayOrigin {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}://{}", self.scheme.as_str(), self.authority)
	}
}

/// Which gateway route an endpoint targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
	Resume,
	NewSession,
}

/// A resolved gateway address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
	url: Url,
	mode: SessionMode,
}

impl Endpoint {
	pub fn as_str(&self) -> &str {
		self.url.as_str()
	}

	pub fn url(&self) -> &Url {
		&self.url
	}

	pub fn path(&self) -> &str {
		self.url.path()
	}

	pub fn query(&self) -> Option<&str> {
		self.url.query()
	}

	pub fn mode(&self) -> SessionMode {
		self.mode
	}

	/// Endpoint text with credential values masked, for logs.
	pub fn redacted(&self) -> String {
		let mut url = self.url.clone();
		let pairs: Vec<(String, String)> = self
			.url
			.query_pairs()
			.map(|(k, v)| {
				let masked = matches!(k.as_ref(), "password" | "private_key" | "key_passphrase");
				let value = if masked { "***".to_string() } else { v.into_owned() };
				(k.into_owned(), value)
			})
			.collect();
		if !pairs.is_empty() {
			url.query_pairs_mut().clear().extend_pairs(pairs);
		}
		url.to_string()
	}
}

impl fmt::Display for Endpoint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.url.as_str())
	}
}

/// Appends `key=value` to a query under construction, encoding the value as a
/// URI component.
fn push_param(query: &mut String, key: &str, value: &str) {
	if !query.is_empty() {
		query.push('&');
	}
	query.push_str(key);
	query.push('=');
	query.push_str(&urlencoding::encode(value));
}

/// Resolves `params` into the gateway address under `origin`.
pub fn resolve(origin: &GatewayOrigin, params: &ConnectionParameters) -> Result<Endpoint, ResolveError> {
	let base = origin.base()?;
	let mut query = String::new();

	let (path, mode) = if let Some(bridge_id) = params.resume_id() {
		push_param(&mut query, "id", bridge_id);
		(RESUME_PATH, SessionMode::Resume)
	} else {
		push_param(&mut query, "username", &params.username);
		push_param(&mut query, "hostname", &params.hostname);

		match &params.authentication_method {
			Some(AuthenticationMethod::Password) => {
				let password = params
					.password
					.as_deref()
					.ok_or(ResolveError::MissingCredential("password"))?;
				push_param(&mut query, "password", password);
			}
			Some(AuthenticationMethod::PrivateKey) => {
				let key = params
					.private_key
					.as_deref()
					.ok_or(ResolveError::MissingCredential("private_key"))?;
				push_param(&mut query, "private_key", key);
				if let Some(passphrase) = &params.key_passphrase {
					push_param(&mut query, "key_passphrase", passphrase);
				}
			}
			Some(AuthenticationMethod::Unsupported(other)) => {
				return Err(ResolveError::UnsupportedAuthenticationMethod(other.clone()));
			}
			None => return Err(ResolveError::MissingAuthenticationMethod),
		}

		push_param(&mut query, "port", &params.port.to_string());
		if let Some(command) = params.remote_command() {
			push_param(&mut query, "run", command);
		}
		(CONNECT_PATH, SessionMode::NewSession)
	};

	let url = Url::parse(&format!("{base}{path}?{query}"))
		.map_err(|e| ResolveError::InvalidOrigin(format!("{}: {e}", origin.authority)))?;

	Ok(Endpoint { url, mode })
}

#[cfg(test)]
mod tests;
