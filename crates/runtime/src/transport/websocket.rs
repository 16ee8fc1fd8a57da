//! WebSocket transport built on tokio-tungstenite.

use std::sync::Once;
use std::thread;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};
use wssh_protocol::Endpoint;

use super::{Transport, TransportEvent, TransportFactory, TransportParts};
use crate::error::{Error, Result};

/// Sending half of a WebSocket transport.
///
/// Frames are handed to the driver task over an unbounded channel; dropping
/// this value makes the driver send a close frame and finish.
pub struct WebSocketTransport {
	outbound: mpsc::UnboundedSender<String>,
}

impl Transport for WebSocketTransport {
	fn send(&mut self, text: String) -> Result<()> {
		self.outbound.send(text).map_err(|_| Error::ChannelClosed)
	}
}

/// Channels shared by both factories.
struct DriverChannels {
	outbound_rx: mpsc::UnboundedReceiver<String>,
	events_tx: mpsc::UnboundedSender<TransportEvent>,
}

fn split_parts() -> (TransportParts, DriverChannels) {
	let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
	let (events_tx, events_rx) = mpsc::unbounded_channel();
	let parts = TransportParts {
		sender: Box::new(WebSocketTransport {
			outbound: outbound_tx,
		}),
		events: events_rx,
	};
	(
		parts,
		DriverChannels {
			outbound_rx,
			events_tx,
		},
	)
}

/// Primary transport: a driver task spawned on the caller's tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketTransportFactory;

impl TransportFactory for WebSocketTransportFactory {
	fn name(&self) -> &'static str {
		"websocket"
	}

	fn is_available(&self) -> bool {
		tokio::runtime::Handle::try_current().is_ok()
	}

	fn open(&self, endpoint: &Endpoint) -> Result<TransportParts> {
		let handle = tokio::runtime::Handle::try_current().map_err(|e| Error::Transport(e.to_string()))?;
		let (parts, channels) = split_parts();
		handle.spawn(drive(endpoint.as_str().to_string(), channels));
		Ok(parts)
	}
}

/// Fallback transport for callers outside a tokio runtime: the driver runs
/// on its own thread with a current-thread runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadedWebSocketFactory;

impl TransportFactory for ThreadedWebSocketFactory {
	fn name(&self) -> &'static str {
		"websocket-thread"
	}

	fn is_available(&self) -> bool {
		true
	}

	fn open(&self, endpoint: &Endpoint) -> Result<TransportParts> {
		let url = endpoint.as_str().to_string();
		let (parts, channels) = split_parts();

		thread::Builder::new()
			.name("wssh-transport".to_string())
			.spawn(move || {
				let runtime = tokio::runtime::Builder::new_current_thread()
					.enable_all()
					.build();
				match runtime {
					Ok(runtime) => runtime.block_on(drive(url, channels)),
					Err(e) => {
						let _ = channels.events_tx.send(TransportEvent::Error(e.to_string()));
						let _ = channels.events_tx.send(TransportEvent::Close);
					}
				}
			})
			.map_err(|e| Error::Transport(format!("failed to spawn transport thread: {e}")))?;

		Ok(parts)
	}
}

/// Installs the ring provider as the process-wide rustls default. `wss://`
/// handshakes panic without one.
fn install_crypto_provider() {
	static INSTALL: Once = Once::new();
	INSTALL.call_once(|| {
		if rustls::crypto::ring::default_provider().install_default().is_err() {
			debug!("rustls crypto provider already installed");
		}
	});
}

/// Owns the socket for its whole life: handshake, then pumps frames both ways
/// until either side goes away. Emits exactly one `Close` at the end.
async fn drive(url: String, channels: DriverChannels) {
	let DriverChannels {
		mut outbound_rx,
		events_tx,
	} = channels;
	let emit = |event: TransportEvent| {
		let _ = events_tx.send(event);
	};

	install_crypto_provider();
	let stream = match connect_async(url.as_str()).await {
		Ok((stream, response)) => {
			debug!(status = %response.status(), "websocket handshake complete");
			stream
		}
		Err(e) => {
			warn!(error = %e, "websocket handshake failed");
			emit(TransportEvent::Error(e.to_string()));
			emit(TransportEvent::Close);
			return;
		}
	};

	info!("websocket open");
	emit(TransportEvent::Open);

	let (mut sink, mut source) = stream.split();

	loop {
		tokio::select! {
			inbound = source.next() => match inbound {
				Some(Ok(Message::Text(text))) => emit(TransportEvent::Message(text)),
				Some(Ok(Message::Binary(bytes))) => {
					emit(TransportEvent::Message(String::from_utf8_lossy(&bytes).into_owned()))
				}
				Some(Ok(Message::Close(frame))) => {
					debug!(?frame, "websocket closed by peer");
					break;
				}
				Some(Ok(_)) => {}
				Some(Err(e)) => {
					warn!(error = %e, "websocket read error");
					emit(TransportEvent::Error(e.to_string()));
					break;
				}
				None => break,
			},
			outbound = outbound_rx.recv() => match outbound {
				Some(text) => {
					if let Err(e) = sink.send(Message::Text(text)).await {
						warn!(error = %e, "websocket write error");
						emit(TransportEvent::Error(e.to_string()));
						break;
					}
				}
				None => {
					debug!("transport sender dropped, closing websocket");
					let _ = sink.send(Message::Close(None)).await;
					break;
				}
			},
		}
	}

	info!("websocket closed");
	emit(TransportEvent::Close);
}
