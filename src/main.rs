use clap::Parser;
use dxpm_cli::cli::Cli;
use dxpm_cli::core::user_friendly_error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(cli.verbose)
        .init();

    if let Err(error) = cli.execute().await {
        user_friendly_error(error).display();
        std::process::exit(1);
    }
}
