//! Wire types for the wssh gateway protocol.
//!
//! The gateway terminates the SSH session on behalf of the client; this crate
//! only describes how a client addresses it and what travels over the channel:
//!
//! - [`ConnectionParameters`] - caller-owned inputs for one connect attempt
//! - [`resolve`] - pure mapping from parameters to a transport [`Endpoint`]
//! - [`OutboundEnvelope`] / [`InboundEnvelope`] - the JSON wrapper carried by
//!   every message in either direction
//!
//! Nothing here performs I/O. Transport and lifecycle handling live in
//! `wssh-runtime`.

pub mod endpoint;
pub mod envelope;
pub mod params;

pub use endpoint::{Endpoint, GatewayOrigin, ResolveError, Scheme, SessionMode, resolve};
pub use envelope::{EnvelopeError, InboundEnvelope, OutboundEnvelope, TerminalSize};
pub use params::{AuthenticationMethod, ConnectionParameters};
