//! wssh runtime - gateway channel lifecycle and transport
//!
//! This crate opens the single bidirectional terminal channel a client holds
//! with a wssh gateway:
//!
//! - **Transport**: text frames over WebSocket (tokio-tungstenite), chosen from
//!   an ordered list of [`TransportFactory`] candidates
//! - **Connector**: endpoint resolution, the `Idle → Connecting → Open → Closed`
//!   lifecycle, and translation of envelopes into [`SessionEvent`]s
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────┐
//! │   caller      │  SessionHandler / next_event()
//! └──────┬────────┘
//! ┌──────▼────────┐
//! │ wssh-runtime  │  This crate
//! │  ┌─────────┐  │
//! │  │Connector│  │  state machine, envelopes
//! │  └─────────┘  │
//! │  ┌─────────┐  │
//! │  │Transport│  │  WebSocket driver task
//! │  └─────────┘  │
//! └──────┬────────┘
//!        │ ws:// or wss://
//! ┌──────▼────────┐
//! │   gateway     │  runs the actual SSH session
//! └───────────────┘
//! ```

pub mod connector;
pub mod error;
pub mod transport;

pub use connector::{
	ChannelState, ConnectorOptions, FailureKind, SessionConnector, SessionEvent, SessionFailure, SessionHandler,
};
pub use error::{Error, Result};
pub use transport::{
	ThreadedWebSocketFactory, Transport, TransportEvent, TransportFactory, TransportParts, WebSocketTransport,
	WebSocketTransportFactory, default_transports, select_transport,
};
pub use wssh_protocol as protocol;
pub use wssh_protocol::{AuthenticationMethod, ConnectionParameters, Endpoint, GatewayOrigin, Scheme};
