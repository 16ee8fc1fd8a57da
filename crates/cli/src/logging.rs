use tracing_subscriber::EnvFilter;

/// Filter directives for a `-v` count. The terminal belongs to the remote
/// session, so the default only shows errors and socket libraries stay
/// quiet until `-vvv`.
pub fn filter_for(verbosity: u8) -> &'static str {
	match verbosity {
		0 => "error",
		1 => "warn,wssh_runtime=info,wssh_cli=info,tungstenite=off,tokio_tungstenite=off,rustls=off",
		2 => "info,wssh_runtime=debug,wssh_cli=debug,tungstenite=warn,tokio_tungstenite=warn,rustls=warn",
		_ => "debug",
	}
}

pub fn init_logging(verbosity: u8) {
	let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_for(verbosity)));

	tracing_subscriber::fmt()
		.with_env_filter(env_filter)
		.with_writer(std::io::stderr)
		.without_time()
		.with_target(verbosity > 1)
		.compact()
		.init();
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn every_level_parses() {
		for verbosity in 0..4 {
			assert!(EnvFilter::try_new(filter_for(verbosity)).is_ok(), "verbosity {verbosity}");
		}
	}

	#[test]
	fn socket_libraries_are_quiet_at_first_level() {
		let filter = filter_for(1);
		assert!(filter.contains("tungstenite=off"));
		assert!(filter.contains("wssh_runtime=info"));
	}
}
