//! End-to-end checks of the `wssh` binary that need no gateway.

use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn wssh(args: &[&str], config_home: &TempDir) -> Output {
	Command::new(env!("CARGO_BIN_EXE_wssh"))
		.args(args)
		.env("XDG_CONFIG_HOME", config_home.path())
		.env_remove("WSSH_PASSWORD")
		.env_remove("WSSH_KEY_PASSPHRASE")
		.env_remove("RUST_LOG")
		.stdin(Stdio::null())
		.output()
		.expect("failed to execute wssh")
}

fn stderr(output: &Output) -> String {
	String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn help_lists_gateway_flag() {
	let home = TempDir::new().unwrap();
	let output = wssh(&["--help"], &home);

	assert!(output.status.success());
	assert!(String::from_utf8_lossy(&output.stdout).contains("--gateway"));
}

#[test]
fn missing_credentials_are_reported_before_connecting() {
	let home = TempDir::new().unwrap();
	let output = wssh(&["-g", "127.0.0.1:1", "ops@web01"], &home);

	assert_eq!(output.status.code(), Some(1));
	let err = stderr(&output);
	assert!(err.contains("wssh: Configuration error"), "{err}");
	assert!(!err.contains("closed."), "{err}");
}

#[test]
fn unsupported_method_is_reported() {
	let home = TempDir::new().unwrap();
	let output = wssh(&["-g", "127.0.0.1:1", "--auth", "otp", "ops@web01"], &home);

	assert_eq!(output.status.code(), Some(1));
	assert!(stderr(&output).contains("unsupported authentication method"));
}

#[test]
fn unreachable_gateway_fails() {
	let home = TempDir::new().unwrap();
	let output = wssh(&["-g", "127.0.0.1:1", "--password", "pw", "ops@web01"], &home);

	assert_eq!(output.status.code(), Some(1));
	assert!(stderr(&output).starts_with("wssh: "));
}

#[test]
fn missing_profile_exits_with_file_error() {
	let home = TempDir::new().unwrap();
	let output = wssh(&["--profile", "staging"], &home);

	assert_eq!(output.status.code(), Some(2));
	let err = stderr(&output);
	assert!(err.contains("cannot read"), "{err}");
	assert!(err.contains("staging.json"), "{err}");
}
