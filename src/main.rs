use clap::Parser;
use sqlite_tables::cli::{self, Cli};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over -v; logs go to stderr so stdout stays the preview
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = cli::run(&cli, &mut stdout) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
