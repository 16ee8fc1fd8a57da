//! Interactive terminal session over a gateway channel.
//!
//! Local keystrokes go out as `data` envelopes, remote output is written to
//! stdout, and the terminal size is sent once on connect and again whenever it
//! changes. The session ends on the first reported failure, when the gateway
//! closes the channel, or when stdin reaches end of file.

use std::io::{Read, Write};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use wssh_runtime::{ChannelState, SessionConnector, SessionEvent, SessionFailure};

use crate::cli::Cli;
use crate::config::resolve_settings;
use crate::error::Result;
use crate::terminal::{self, RawModeGuard};

const RESIZE_POLL: Duration = Duration::from_millis(250);
const STDIN_CHUNK: usize = 1024;

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
	/// Whether the channel ever reached the open state.
	pub connected: bool,
	/// The failure that ended the session, if any.
	pub failure: Option<SessionFailure>,
}

impl SessionOutcome {
	pub fn is_success(&self) -> bool {
		self.failure.is_none()
	}
}

/// Decodes stdin bytes into text without splitting multi-byte characters
/// across reads. Invalid bytes become U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8Chunker {
	pending: Vec<u8>,
}

impl Utf8Chunker {
	pub fn push(&mut self, bytes: &[u8]) -> String {
		self.pending.extend_from_slice(bytes);
		let mut out = String::new();
		loop {
			match std::str::from_utf8(&self.pending) {
				Ok(text) => {
					out.push_str(text);
					self.pending.clear();
					return out;
				}
				Err(e) => {
					let valid = e.valid_up_to();
					out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
					match e.error_len() {
						Some(len) => {
							out.push(char::REPLACEMENT_CHARACTER);
							self.pending.drain(..valid + len);
						}
						None => {
							self.pending.drain(..valid);
							return out;
						}
					}
				}
			}
		}
	}

	/// Bytes held back waiting for the rest of a character.
	pub fn pending(&self) -> usize {
		self.pending.len()
	}
}

/// Reads stdin on a dedicated thread. The receiver yields `None` at end of
/// file or on a read error.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<Vec<u8>> {
	let (tx, rx) = mpsc::unbounded_channel();
	let spawned = std::thread::Builder::new().name("wssh-stdin".into()).spawn(move || {
		let mut stdin = std::io::stdin().lock();
		let mut buf = [0u8; STDIN_CHUNK];
		loop {
			match stdin.read(&mut buf) {
				Ok(0) => break,
				Ok(n) => {
					if tx.send(buf[..n].to_vec()).is_err() {
						break;
					}
				}
				Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
				Err(e) => {
					debug!(error = %e, "stdin read failed");
					break;
				}
			}
		}
	});
	if let Err(e) = spawned {
		warn!(error = %e, "cannot start stdin reader; input disabled");
	}
	rx
}

fn write_stdout(text: &str) -> Result<()> {
	let mut stdout = std::io::stdout().lock();
	stdout.write_all(text.as_bytes())?;
	stdout.flush()?;
	Ok(())
}

fn send_size(connector: &mut SessionConnector, size: (u16, u16)) {
	let (width, height) = size;
	if let Err(e) = connector.resize(width, height) {
		debug!(error = %e, width, height, "resize not sent");
	}
}

/// Connects with the settings from `cli` and runs the session until it ends.
///
/// Errors are returned only for local problems (unreadable profile or key
/// file, broken stdout). Gateway and transport failures end up in
/// [`SessionOutcome::failure`] after being printed.
pub async fn run(cli: &Cli) -> Result<SessionOutcome> {
	let settings = resolve_settings(cli)?;
	let gateway = settings.origin.to_string();

	let mut connector = SessionConnector::new(settings.origin).with_options(settings.options);
	connector.connect(&settings.params);

	let raw = RawModeGuard::new();
	let newline = raw.newline();
	let mut input = spawn_stdin_reader();
	let mut chunker = Utf8Chunker::default();
	let mut last_size = None;
	let mut resize_tick = tokio::time::interval(RESIZE_POLL);

	let mut outcome = SessionOutcome {
		connected: false,
		failure: None,
	};

	loop {
		let open = connector.state() == ChannelState::Open;
		tokio::select! {
			event = connector.next_event() => {
				let Some(event) = event else { break };
				match event {
					SessionEvent::Connected => {
						info!(%gateway, "session open");
						outcome.connected = true;
						last_size = terminal::size();
						if let Some(size) = last_size {
							send_size(&mut connector, size);
						}
					}
					SessionEvent::Data(text) => write_stdout(&text)?,
					SessionEvent::Failed(failure) => {
						eprint!("wssh: {failure}{newline}");
						outcome.failure = Some(failure);
						break;
					}
					SessionEvent::Closed => break,
				}
			}
			chunk = input.recv(), if open => {
				let Some(bytes) = chunk else {
					debug!("stdin closed");
					break;
				};
				let text = chunker.push(&bytes);
				if text.is_empty() {
					continue;
				}
				if let Err(e) = connector.send(&text) {
					debug!(error = %e, "input not sent");
				}
			}
			_ = resize_tick.tick(), if open => {
				let size = terminal::size();
				if size.is_some() && size != last_size {
					last_size = size;
					if let Some(size) = size {
						send_size(&mut connector, size);
					}
				}
			}
		}
	}

	drop(connector);
	if outcome.is_success() {
		eprint!("wssh: connection to {gateway} closed.{newline}");
	}
	drop(raw);
	Ok(outcome)
}
