use clap::Parser;

use super::Cli;

#[test]
fn parses_destination_and_command() {
	let cli = Cli::try_parse_from(["wssh", "-p", "2222", "deploy@db.internal", "tail", "-f", "/var/log/syslog"]).unwrap();

	assert_eq!(cli.port, Some(2222));
	assert_eq!(cli.destination_parts(), Some((Some("deploy"), "db.internal")));
	assert_eq!(cli.command, vec!["tail", "-f", "/var/log/syslog"]);
}

#[test]
fn destination_without_user() {
	let cli = Cli::try_parse_from(["wssh", "db.internal"]).unwrap();

	assert_eq!(cli.destination_parts(), Some((None, "db.internal")));
	assert!(cli.command.is_empty());
}

#[test]
fn resume_needs_no_destination() {
	let cli = Cli::try_parse_from(["wssh", "--bridge-id", "b-42", "--secure", "-g", "gw.example:443"]).unwrap();

	assert_eq!(cli.bridge_id.as_deref(), Some("b-42"));
	assert!(cli.secure);
	assert_eq!(cli.gateway.as_deref(), Some("gw.example:443"));
	assert_eq!(cli.destination_parts(), None);
}

#[test]
fn verbosity_counts() {
	let cli = Cli::try_parse_from(["wssh", "-vv", "host"]).unwrap();
	assert_eq!(cli.verbose, 2);
}

#[test]
fn auth_method_is_free_text() {
	let cli = Cli::try_parse_from(["wssh", "--auth", "otp", "host"]).unwrap();
	assert_eq!(cli.auth.as_deref(), Some("otp"));
}

#[test]
fn rejects_invalid_port() {
	assert!(Cli::try_parse_from(["wssh", "-p", "70000", "host"]).is_err());
}
