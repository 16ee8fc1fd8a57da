//! Local terminal handling for interactive sessions.

use std::io::IsTerminal;

use crossterm::terminal;
use tracing::{debug, warn};

/// Puts the local terminal in raw mode for as long as it lives.
///
/// Does nothing when stdin is not a terminal, so piped input still works.
pub struct RawModeGuard {
	enabled: bool,
}

impl RawModeGuard {
	pub fn new() -> Self {
		Self::enable_if(std::io::stdin().is_terminal())
	}

	fn enable_if(interactive: bool) -> Self {
		if !interactive {
			return Self { enabled: false };
		}
		match terminal::enable_raw_mode() {
			Ok(()) => {
				debug!("raw mode enabled");
				Self { enabled: true }
			}
			Err(e) => {
				warn!(error = %e, "failed to enable raw mode");
				Self { enabled: false }
			}
		}
	}

	pub fn is_enabled(&self) -> bool {
		self.enabled
	}

	/// Line ending to use for local messages while the guard is active.
	pub fn newline(&self) -> &'static str {
		if self.enabled { "\r\n" } else { "\n" }
	}
}

impl Default for RawModeGuard {
	fn default() -> Self {
		Self::new()
	}
}

impl Drop for RawModeGuard {
	fn drop(&mut self) {
		if self.enabled {
			let _ = terminal::disable_raw_mode();
		}
	}
}

/// Current `(width, height)` of the local terminal, if there is one.
pub fn size() -> Option<(u16, u16)> {
	if !std::io::stdout().is_terminal() {
		return None;
	}
	terminal::size().ok().filter(|(w, h)| *w > 0 && *h > 0)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn non_interactive_guard_is_inert() {
		let guard = RawModeGuard::enable_if(false);
		assert!(!guard.is_enabled());
		assert_eq!(guard.newline(), "\n");
	}
}
