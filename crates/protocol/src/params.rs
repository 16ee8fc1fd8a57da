//! Connection parameters supplied by the caller for a single connect attempt.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default SSH port used when a profile omits `port`.
pub const DEFAULT_SSH_PORT: u16 = 22;

/// How the gateway should authenticate the new SSH session.
///
/// Parsing never fails: unknown values are kept as [`Unsupported`](Self::Unsupported)
/// so endpoint resolution can report them with the original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AuthenticationMethod {
	/// Authenticate with [`ConnectionParameters::password`].
	Password,
	/// Authenticate with [`ConnectionParameters::private_key`].
	PrivateKey,
	/// Any other value; resolution rejects it.
	Unsupported(String),
}

impl AuthenticationMethod {
	pub fn as_str(&self) -> &str {
		match self {
			AuthenticationMethod::Password => "password",
			AuthenticationMethod::PrivateKey => "private_key",
			AuthenticationMethod::Unsupported(other) => other,
		}
	}
}

impl From<&str> for AuthenticationMethod {
	fn from(value: &str) -> Self {
		match value {
			"password" => AuthenticationMethod::Password,
			"private_key" | "privateKey" => AuthenticationMethod::PrivateKey,
			other => AuthenticationMethod::Unsupported(other.to_string()),
		}
	}
}

impl From<String> for AuthenticationMethod {
	fn from(value: String) -> Self {
		AuthenticationMethod::from(value.as_str())
	}
}

impl From<AuthenticationMethod> for String {
	fn from(method: AuthenticationMethod) -> Self {
		match method {
			AuthenticationMethod::Unsupported(other) => other,
			known => known.as_str().to_string(),
		}
	}
}

impl FromStr for AuthenticationMethod {
	type Err = std::convert::Infallible;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(AuthenticationMethod::from(s))
	}
}

impl fmt::Display for AuthenticationMethod {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Inputs for one connect call.
///
/// When [`bridge_id`](Self::bridge_id) is set the connector resumes an existing
/// gateway session and every other field is ignored. Otherwise a new session is
/// requested for `username@hostname:port` using [`authentication_method`](Self::authentication_method).
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionParameters {
	/// Gateway-side session to reattach to.
	#[serde(default, alias = "bridge_id", skip_serializing_if = "Option::is_none")]
	pub bridge_id: Option<String>,
	#[serde(default)]
	pub username: String,
	#[serde(default)]
	pub hostname: String,
	#[serde(default = "default_port")]
	pub port: u16,
	#[serde(
		default,
		alias = "authentication_method",
		skip_serializing_if = "Option::is_none"
	)]
	pub authentication_method: Option<AuthenticationMethod>,
	/// Used only with [`AuthenticationMethod::Password`].
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub password: Option<String>,
	/// PEM text, used only with [`AuthenticationMethod::PrivateKey`].
	#[serde(default, alias = "private_key", skip_serializing_if = "Option::is_none")]
	pub private_key: Option<String>,
	#[serde(default, alias = "key_passphrase", skip_serializing_if = "Option::is_none")]
	pub key_passphrase: Option<String>,
	/// Remote command to run instead of an interactive shell. Empty means shell.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub command: Option<String>,
}

fn default_port() -> u16 {
	DEFAULT_SSH_PORT
}

impl ConnectionParameters {
	/// Parameters that reattach to the gateway session `bridge_id`.
	pub fn resume(bridge_id: impl Into<String>) -> Self {
		Self {
			bridge_id: Some(bridge_id.into()),
			port: DEFAULT_SSH_PORT,
			..Self::default()
		}
	}

	/// Parameters for a new session; pick credentials with
	/// [`with_password`](Self::with_password) or [`with_private_key`](Self::with_private_key).
	pub fn new_session(username: impl Into<String>, hostname: impl Into<String>, port: u16) -> Self {
		Self {
			username: username.into(),
			hostname: hostname.into(),
			port,
			..Self::default()
		}
	}

	pub fn with_password(mut self, password: impl Into<String>) -> Self {
		self.authentication_method = Some(AuthenticationMethod::Password);
		self.password = Some(password.into());
		self
	}

	pub fn with_private_key(mut self, private_key: impl Into<String>, passphrase: Option<String>) -> Self {
		self.authentication_method = Some(AuthenticationMethod::PrivateKey);
		self.private_key = Some(private_key.into());
		self.key_passphrase = passphrase;
		self
	}

	pub fn with_method(mut self, method: impl Into<AuthenticationMethod>) -> Self {
		self.authentication_method = Some(method.into());
		self
	}

	pub fn with_command(mut self, command: impl Into<String>) -> Self {
		self.command = Some(command.into());
		self
	}

	/// Returns the command to run, treating an empty string as absent.
	pub fn remote_command(&self) -> Option<&str> {
		self.command.as_deref().filter(|c| !c.is_empty())
	}

	/// The bridge id to reattach to. An empty id counts as absent.
	pub fn resume_id(&self) -> Option<&str> {
		self.bridge_id.as_deref().filter(|id| !id.is_empty())
	}

	pub fn is_resume(&self) -> bool {
		self.resume_id().is_some()
	}
}

impl fmt::Debug for ConnectionParameters {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fn redact(value: &Option<String>) -> Option<&'static str> {
			value.as_ref().map(|_| "<redacted>")
		}

		f.debug_struct("ConnectionParameters")
			.field("bridge_id", &self.bridge_id)
			.field("username", &self.username)
			.field("hostname", &self.hostname)
			.field("port", &self.port)
			.field("authentication_method", &self.authentication_method)
			.field("password", &redact(&self.password))
			.field("private_key", &redact(&self.private_key))
			.field("key_passphrase", &redact(&self.key_passphrase))
			.field("command", &self.command)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn method_parsing_accepts_both_key_spellings() {
		assert_eq!(AuthenticationMethod::from("password"), AuthenticationMethod::Password);
		assert_eq!(AuthenticationMethod::from("private_key"), AuthenticationMethod::PrivateKey);
		assert_eq!(AuthenticationMethod::from("privateKey"), AuthenticationMethod::PrivateKey);
		assert_eq!(
			AuthenticationMethod::from("otp"),
			AuthenticationMethod::Unsupported("otp".to_string())
		);
	}

	#[test]
	fn deserializes_camel_case_profile() {
		let json = r#"{
			"username": "deploy",
			"hostname": "db.internal",
			"authenticationMethod": "privateKey",
			"privateKey": "-----BEGIN KEY-----",
			"keyPassphrase": "hunter2"
		}"#;
		let params: ConnectionParameters = serde_json::from_str(json).unwrap();

		assert_eq!(params.port, DEFAULT_SSH_PORT);
		assert_eq!(params.authentication_method, Some(AuthenticationMethod::PrivateKey));
		assert_eq!(params.key_passphrase.as_deref(), Some("hunter2"));
		assert!(!params.is_resume());
	}

	#[test]
	fn empty_bridge_id_is_not_a_resume() {
		let params: ConnectionParameters = serde_json::from_str(r#"{"bridgeId": "", "hostname": "h"}"#).unwrap();
		assert_eq!(params.resume_id(), None);
		assert!(!params.is_resume());
		assert!(ConnectionParameters::resume("b-1").is_resume());
	}

	#[test]
	fn deserializes_snake_case_aliases() {
		let json = r#"{"bridge_id": "b-17", "authentication_method": "otp"}"#;
		let params: ConnectionParameters = serde_json::from_str(json).unwrap();

		assert_eq!(params.bridge_id.as_deref(), Some("b-17"));
		assert_eq!(
			params.authentication_method,
			Some(AuthenticationMethod::Unsupported("otp".to_string()))
		);
	}

	#[test]
	fn debug_output_redacts_secrets() {
		let params = ConnectionParameters::new_session("u", "h", 22)
			.with_private_key("SECRET-KEY", Some("SECRET-PASS".to_string()));
		let rendered = format!("{params:?}");

		assert!(!rendered.contains("SECRET-KEY"));
		assert!(!rendered.contains("SECRET-PASS"));
		assert!(rendered.contains("<redacted>"));
	}

	#[test]
	fn empty_command_means_interactive_shell() {
		let params = ConnectionParameters::new_session("u", "h", 22).with_command("");
		assert_eq!(params.remote_command(), None);

		let params = params.with_command("uptime");
		assert_eq!(params.remote_command(), Some("uptime"));
	}
}
