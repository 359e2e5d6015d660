//! Nattiq braille display driver CLI

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
use cli::{Cli, Commands};

mod commands;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let ctx = commands::Context::new(&cli).context("loading configuration")?;

    match cli.command {
        None | Some(Commands::Info) => commands::query::info(&ctx)?,
        Some(Commands::List) => commands::utility::list(&ctx)?,
        Some(Commands::Profiles { json }) => commands::query::profiles(&ctx, json)?,
        Some(Commands::Write { cells }) => commands::display::write(&ctx, &cells)?,
        Some(Commands::Clear) => commands::display::clear(&ctx)?,
        Some(Commands::Keys { count, json }) => commands::input::keys(&ctx, count, json)?,
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` wins over `-v`
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let default = format!(
        "warn,nattiq_driver={level},nattiq_braille={level},nattiq_transport={level}"
    );
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
