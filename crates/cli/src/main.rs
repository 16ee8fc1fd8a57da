use clap::Parser;
use wssh_cli::{cli::Cli, error::CliError, logging, session};

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	let code = match session::run(&cli).await {
		Ok(outcome) if outcome.is_success() => 0,
		Ok(_) => 1,
		Err(err) => handle_error(err),
	};
	// The stdin reader thread may still be blocked on a read.
	std::process::exit(code);
}

fn handle_error(err: CliError) -> i32 {
	eprintln!("wssh: {err}");
	if err.is_file_error() { 2 } else { 1 }
}
