//! Transport layer for gateway channels.
//!
//! A transport carries text frames between the client and the gateway and
//! reports its lifecycle as [`TransportEvent`]s. Implementations are picked
//! through [`TransportFactory`] candidates so the connector can be driven by a
//! fake transport in tests.
//!
//! # Event order
//!
//! Every transport produces, in order:
//!
//! 1. zero or one [`TransportEvent::Open`]
//! 2. any number of [`TransportEvent::Message`] / [`TransportEvent::Error`]
//! 3. exactly one [`TransportEvent::Close`]

use std::sync::Arc;

use tokio::sync::mpsc;
use wssh_protocol::Endpoint;

use crate::error::Result;

mod websocket;

pub use websocket::{ThreadedWebSocketFactory, WebSocketTransport, WebSocketTransportFactory};

/// Lifecycle and data notifications from a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
	/// The channel is established and may carry frames.
	Open,
	/// One inbound text frame.
	Message(String),
	/// A transport-level failure. A [`Close`](Self::Close) follows if the
	/// failure ended the channel.
	Error(String),
	/// The channel is gone. Always the last event.
	Close,
}

/// Sending half of a transport.
pub trait Transport: Send {
	/// Queues one outbound text frame. Does not wait for the write.
	fn send(&mut self, text: String) -> Result<()>;
}

/// An opened (or opening) transport: its sending half and event stream.
pub struct TransportParts {
	pub sender: Box<dyn Transport>,
	pub events: mpsc::UnboundedReceiver<TransportEvent>,
}

/// Creates transports for a resolved endpoint.
pub trait TransportFactory: Send + Sync {
	/// Short name used in logs.
	fn name(&self) -> &'static str;

	/// Whether this implementation can run in the current environment.
	fn is_available(&self) -> bool;

	/// Starts opening a transport to `endpoint` without waiting for it.
	fn open(&self, endpoint: &Endpoint) -> Result<TransportParts>;
}

/// Transport candidates in preference order: the tokio WebSocket transport,
/// then the dedicated-thread fallback.
pub fn default_transports() -> Vec<Arc<dyn TransportFactory>> {
	vec![
		Arc::new(WebSocketTransportFactory::default()),
		Arc::new(ThreadedWebSocketFactory::default()),
	]
}

/// Returns the first available candidate.
pub fn select_transport(candidates: &[Arc<dyn TransportFactory>]) -> Option<Arc<dyn TransportFactory>> {
	let selected = candidates.iter().find(|factory| factory.is_available()).cloned();
	match &selected {
		Some(factory) => tracing::debug!(transport = factory.name(), "selected transport"),
		None => tracing::debug!(candidates = candidates.len(), "no transport available"),
	}
	selected
}
