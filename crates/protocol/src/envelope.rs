//! JSON envelope carried by every message on an open channel.
//!
//! Client to gateway: `{"data": "<text>"}` for terminal input, or
//! `{"resize": {"width": W, "height": H}}` for terminal geometry.
//!
//! Gateway to client: `{"data": "<text>"}` or `{"error": "<text>"}`. A message
//! carrying neither key is legal and ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Failure to interpret an inbound payload.
#[derive(Debug, Error)]
pub enum EnvelopeError {
	#[error("malformed envelope: {0}")]
	Malformed(#[from] serde_json::Error),
}

/// Terminal geometry in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalSize {
	pub width: u16,
	pub height: u16,
}

/// Message sent from the client to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OutboundEnvelope<'a> {
	/// Terminal input.
	Data { data: &'a str },
	/// Remote pty geometry update.
	Resize { resize: TerminalSize },
}

impl<'a> OutboundEnvelope<'a> {
	pub fn data(data: &'a str) -> Self {
		OutboundEnvelope::Data { data }
	}

	pub fn resize(width: u16, height: u16) -> Self {
		OutboundEnvelope::Resize {
			resize: TerminalSize { width, height },
		}
	}

	pub fn to_json(&self) -> serde_json::Result<String> {
		serde_json::to_string(self)
	}
}

/// Classified message received from the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEnvelope {
	/// The gateway reported a problem. Empty messages are kept.
	Error(String),
	/// Terminal output. Never empty.
	Data(String),
	/// Neither key carried anything actionable.
	Empty,
}

impl InboundEnvelope {
	/// Parses and classifies one payload.
	///
	/// An `error` key wins over `data` whatever its value. `data` only counts
	/// when it is a non-empty string.
	pub fn parse(text: &str) -> Result<Self, EnvelopeError> {
		let value: Value = serde_json::from_str(text)?;
		Ok(Self::classify(value))
	}

	fn classify(value: Value) -> Self {
		let Value::Object(mut map) = value else {
			return InboundEnvelope::Empty;
		};

		if let Some(error) = map.remove("error") {
			return InboundEnvelope::Error(match error {
				Value::String(message) => message,
				other => other.to_string(),
			});
		}

		match map.remove("data") {
			Some(Value::String(data)) if !data.is_empty() => InboundEnvelope::Data(data),
			_ => InboundEnvelope::Empty,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn data_envelope_has_exactly_one_key() {
		let json = OutboundEnvelope::data("ls -la").to_json().unwrap();
		assert_eq!(json, r#"{"data":"ls -la"}"#);
	}

	#[test]
	fn data_envelope_escapes_control_characters() {
		let json = OutboundEnvelope::data("\u{3}\r\n\"").to_json().unwrap();
		assert_eq!(json, r#"{"data":"\u0003\r\n\""}"#);
	}

	#[test]
	fn resize_envelope_shape() {
		let json = OutboundEnvelope::resize(120, 40).to_json().unwrap();
		assert_eq!(json, r#"{"resize":{"width":120,"height":40}}"#);
	}

	#[test]
	fn inbound_classification() {
		let cases = [
			(r#"{"data":"ok"}"#, InboundEnvelope::Data("ok".to_string())),
			(r#"{"error":"denied"}"#, InboundEnvelope::Error("denied".to_string())),
			(r#"{}"#, InboundEnvelope::Empty),
			(r#"{"data":""}"#, InboundEnvelope::Empty),
			(r#"{"error":""}"#, InboundEnvelope::Error(String::new())),
			(r#"{"error":"late","data":"x"}"#, InboundEnvelope::Error("late".to_string())),
			(r#"{"error":null}"#, InboundEnvelope::Error("null".to_string())),
			(r#"{"data":42}"#, InboundEnvelope::Empty),
			(r#"[1,2]"#, InboundEnvelope::Empty),
			(r#"{"resize":{"width":1}}"#, InboundEnvelope::Empty),
		];

		for (payload, expected) in cases {
			assert_eq!(InboundEnvelope::parse(payload).unwrap(), expected, "payload {payload}");
		}
	}

	#[test]
	fn malformed_payload_is_an_error() {
		let err = InboundEnvelope::parse("not json").unwrap_err();
		assert!(err.to_string().starts_with("malformed envelope"));
	}
}
