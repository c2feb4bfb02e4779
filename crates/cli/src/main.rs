use clap::Parser;
use uia_cli::{cli::Cli, commands, logging, output};

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	let json = cli.json;
	if let Err(err) = commands::dispatch(cli).await {
		output::emit_error(json, err.code(), &err.to_string());
		std::process::exit(1);
	}
}
