//! Channel controller: one gateway session per connector.
//!
//! [`SessionConnector`] resolves [`ConnectionParameters`] into an endpoint,
//! opens a transport through the first available [`TransportFactory`], and
//! turns transport events into [`SessionEvent`]s:
//!
//! ```text
//! Idle ──connect──▶ Connecting ──Open──▶ Open ──Close──▶ Closed
//!   │                   │                                  ▲
//!   └─ resolve/capability failure: stays Idle              │
//!                       └──────────── Close ───────────────┘
//! ```
//!
//! Failures never escape `connect`; they are queued as
//! [`SessionEvent::Failed`] and delivered through [`SessionConnector::next_event`]
//! in order with everything else. `Connected` and `Closed` are each produced at
//! most once and nothing follows `Closed`.
//!
//! There is no disconnect operation. Dropping the connector drops the
//! transport sender, which closes the socket.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use wssh_protocol::{ConnectionParameters, Endpoint, GatewayOrigin, InboundEnvelope, OutboundEnvelope, resolve};

use crate::error::{Error, Result};
use crate::transport::{Transport, TransportEvent, TransportFactory, default_transports, select_transport};

/// Lifecycle of the single channel a connector owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
	Idle,
	Connecting,
	Open,
	Closed,
}

impl fmt::Display for ChannelState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			ChannelState::Idle => "idle",
			ChannelState::Connecting => "connecting",
			ChannelState::Open => "open",
			ChannelState::Closed => "closed",
		})
	}
}

/// Category of a reported failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
	/// Parameters could not be resolved; no transport was attempted.
	Configuration,
	/// No transport implementation is available.
	Capability,
	/// The gateway sent an `error` envelope or an unparseable payload.
	Protocol,
	/// The socket failed (handshake, read or write).
	Transport,
	/// The channel did not open within [`ConnectorOptions::open_timeout`].
	Timeout,
}

/// A failure delivered to the caller. Only the message reaches
/// [`SessionHandler::on_error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFailure {
	pub kind: FailureKind,
	pub message: String,
}

impl SessionFailure {
	pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
		Self {
			kind,
			message: message.into(),
		}
	}
}

impl fmt::Display for SessionFailure {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.message)
	}
}

/// Events produced by a connector, in delivery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
	Connected,
	Data(String),
	Failed(SessionFailure),
	Closed,
}

impl SessionEvent {
	/// Invokes the matching handler callback.
	pub fn dispatch<H: SessionHandler + ?Sized>(self, handler: &mut H) {
		match self {
			SessionEvent::Connected => handler.on_connect(),
			SessionEvent::Data(text) => handler.on_data(&text),
			SessionEvent::Failed(failure) => handler.on_error(&failure.message),
			SessionEvent::Closed => handler.on_close(),
		}
	}
}

/// Callback interface for [`SessionConnector::run`].
pub trait SessionHandler {
	fn on_connect(&mut self);
	fn on_data(&mut self, text: &str);
	fn on_error(&mut self, message: &str);
	fn on_close(&mut self);
}

/// Tuning for a connector.
#[derive(Debug, Clone, Default)]
pub struct ConnectorOptions {
	/// Give up if the transport has not opened after this long. `None` waits
	/// forever. Enforced with tokio timers, so `next_event` must be polled
	/// inside a tokio runtime when set.
	pub open_timeout: Option<Duration>,
}

/// Owns one gateway channel for its whole life.
pub struct SessionConnector {
	origin: GatewayOrigin,
	transports: Vec<Arc<dyn TransportFactory>>,
	options: ConnectorOptions,
	state: ChannelState,
	used: bool,
	endpoint: Option<Endpoint>,
	sender: Option<Box<dyn Transport>>,
	events: Option<mpsc::UnboundedReceiver<TransportEvent>>,
	pending: VecDeque<SessionEvent>,
	deadline: Option<Instant>,
}

impl SessionConnector {
	/// Creates a connector using [`default_transports`].
	pub fn new(origin: GatewayOrigin) -> Self {
		Self::with_transports(origin, default_transports())
	}

	/// Creates a connector choosing among `transports`, in order.
	pub fn with_transports(origin: GatewayOrigin, transports: Vec<Arc<dyn TransportFactory>>) -> Self {
		Self {
			origin,
			transports,
			options: ConnectorOptions::default(),
			state: ChannelState::Idle,
			used: false,
			endpoint: None,
			sender: None,
			events: None,
			pending: VecDeque::new(),
			deadline: None,
		}
	}

	pub fn with_options(mut self, options: ConnectorOptions) -> Self {
		self.options = options;
		self
	}

	pub fn state(&self) -> ChannelState {
		self.state
	}

	/// The endpoint the transport was opened at, once `connect` got that far.
	pub fn endpoint(&self) -> Option<&Endpoint> {
		self.endpoint.as_ref()
	}

	pub fn origin(&self) -> &GatewayOrigin {
		&self.origin
	}

	/// Starts connecting. Returns immediately; progress and failures arrive
	/// through [`next_event`](Self::next_event).
	pub fn connect(&mut self, params: &ConnectionParameters) {
		if self.used {
			warn!(state = %self.state, "connect called twice on one connector");
			self.fail(FailureKind::Configuration, "connector already used; create a new one to reconnect");
			return;
		}
		self.used = true;

		let endpoint = match resolve(&self.origin, params) {
			Ok(endpoint) => endpoint,
			Err(e) => {
				warn!(error = %e, "cannot resolve gateway endpoint");
				self.fail(FailureKind::Configuration, Error::from(e).to_string());
				return;
			}
		};

		let Some(factory) = select_transport(&self.transports) else {
			self.fail(FailureKind::Capability, Error::Unsupported.to_string());
			return;
		};

		match factory.open(&endpoint) {
			Ok(parts) => {
				info!(
					endpoint = %endpoint.redacted(),
					transport = factory.name(),
					"connecting to gateway"
				);
				self.sender = Some(parts.sender);
				self.events = Some(parts.events);
				self.endpoint = Some(endpoint);
				self.deadline = self.options.open_timeout.map(|timeout| Instant::now() + timeout);
				self.set_state(ChannelState::Connecting);
			}
			Err(e) => {
				warn!(error = %e, transport = factory.name(), "failed to start transport");
				self.fail(FailureKind::Transport, e.to_string());
			}
		}
	}

	/// Waits for the next event. Returns `None` once the channel is closed
	/// (after `Closed` has been yielded) or when nothing was ever opened.
	pub async fn next_event(&mut self) -> Option<SessionEvent> {
		loop {
			if let Some(event) = self.pending.pop_front() {
				return Some(event);
			}
			if self.state == ChannelState::Closed {
				return None;
			}

			let deadline = match self.state {
				ChannelState::Connecting => self.deadline,
				_ => None,
			};
			let events = self.events.as_mut()?;

			let received = match deadline {
				Some(deadline) => {
					let outcome = tokio::time::timeout_at(deadline, events.recv()).await;
					match outcome {
						Ok(received) => received,
						Err(_) => {
							self.time_out();
							continue;
						}
					}
				}
				None => events.recv().await,
			};

			match received {
				Some(event) => {
					if let Some(event) = self.translate(event) {
						return Some(event);
					}
				}
				None => {
					debug!("transport event stream ended without close");
					self.shut_down();
					return Some(SessionEvent::Closed);
				}
			}
		}
	}

	/// Delivers every remaining event to `handler` until the channel closes.
	pub async fn run<H: SessionHandler + ?Sized>(&mut self, handler: &mut H) {
		while let Some(event) = self.next_event().await {
			event.dispatch(handler);
		}
	}

	/// Sends terminal input. The channel must be [`ChannelState::Open`].
	pub fn send(&mut self, text: &str) -> Result<()> {
		self.write(OutboundEnvelope::data(text))
	}

	/// Tells the gateway the local terminal size. The channel must be open.
	pub fn resize(&mut self, width: u16, height: u16) -> Result<()> {
		self.write(OutboundEnvelope::resize(width, height))
	}

	fn write(&mut self, envelope: OutboundEnvelope<'_>) -> Result<()> {
		if self.state != ChannelState::Open {
			return Err(Error::NotOpen(self.state));
		}
		let sender = self.sender.as_mut().ok_or(Error::ChannelClosed)?;
		let json = envelope.to_json()?;
		debug!(bytes = json.len(), "sending envelope");
		sender.send(json)
	}

	fn translate(&mut self, event: TransportEvent) -> Option<SessionEvent> {
		match event {
			TransportEvent::Open => {
				if self.state != ChannelState::Connecting {
					debug!(state = %self.state, "ignoring repeated open");
					return None;
				}
				self.deadline = None;
				self.set_state(ChannelState::Open);
				Some(SessionEvent::Connected)
			}
			TransportEvent::Message(text) => match InboundEnvelope::parse(&text) {
				Ok(InboundEnvelope::Error(message)) => {
					debug!(%message, "gateway reported error");
					Some(SessionEvent::Failed(SessionFailure::new(FailureKind::Protocol, message)))
				}
				Ok(InboundEnvelope::Data(data)) => Some(SessionEvent::Data(data)),
				Ok(InboundEnvelope::Empty) => {
					debug!("dropping envelope without error or data");
					None
				}
				Err(e) => {
					warn!(error = %e, "gateway sent an unparseable message");
					Some(SessionEvent::Failed(SessionFailure::new(FailureKind::Protocol, e.to_string())))
				}
			},
			TransportEvent::Error(reason) => Some(SessionEvent::Failed(SessionFailure::new(FailureKind::Transport, reason))),
			TransportEvent::Close => {
				self.shut_down();
				Some(SessionEvent::Closed)
			}
		}
	}

	fn time_out(&mut self) {
		let waited = self.options.open_timeout.unwrap_or_default();
		warn!(?waited, "gateway did not open in time");
		self.shut_down();
		self.pending.push_back(SessionEvent::Failed(SessionFailure::new(
			FailureKind::Timeout,
			format!("Timed out after {}ms waiting for the gateway", waited.as_millis()),
		)));
		self.pending.push_back(SessionEvent::Closed);
	}

	fn fail(&mut self, kind: FailureKind, message: impl Into<String>) {
		self.pending
			.push_back(SessionEvent::Failed(SessionFailure::new(kind, message)));
	}

	fn shut_down(&mut self) {
		self.sender = None;
		self.events = None;
		self.deadline = None;
		self.set_state(ChannelState::Closed);
	}

	fn set_state(&mut self, next: ChannelState) {
		if self.state != next {
			debug!(from = %self.state, to = %next, "channel state");
			self.state = next;
		}
	}
}

impl fmt::Debug for SessionConnector {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SessionConnector")
			.field("origin", &self.origin)
			.field("state", &self.state)
			.field("transports", &self.transports.iter().map(|t| t.name()).collect::<Vec<_>>())
			.field("pending", &self.pending.len())
			.finish()
	}
}
