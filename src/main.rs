use anyhow::Result;
use clap::Parser;
use rtrash::cli::Cli;
use tracing::{debug, Level};

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing(&cli);
    debug!("Parsed CLI arguments: {cli:?}");

    cli.run()
}

fn setup_tracing(cli: &Cli) {
    let level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            _ => Level::DEBUG,
        }
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .without_time()
        .compact()
        .init();
}
