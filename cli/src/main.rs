mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{cities, grade};

/// Install the stderr log subscriber; `-v` enables info, `-vv` debug.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Cities => cities::run(&cli),
        Commands::Grade(args) => grade::run(&cli, args),
        Commands::Drop(args) => grade::run_drop(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
