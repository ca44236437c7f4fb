mod cli;
mod commands;
mod config;
mod file_io;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::*;
use commands::configure::Changes;

fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "viewstate=debug,markup=debug,pscan=debug",
        _ => "viewstate=trace,markup=trace,pscan=trace",
    }
}

fn init_tracing(verbose: u8) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(verbose).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Viewstate {
            value,
            file,
            format,
            max_depth,
        } => commands::decode::value(value, file.as_deref(), format, max_depth),

        Commands::Object {
            hex,
            pretty,
            max_depth,
        } => commands::decode::object(&hex, pretty, max_depth),

        Commands::Page {
            input,
            format,
            max_depth,
        } => commands::decode::page(input.as_deref(), format, max_depth),

        Commands::Tags { input, all } => commands::inspect::tags(input.as_deref(), all),

        Commands::Attrs { text } => commands::inspect::attrs(&text),

        Commands::Context { target, input } => {
            commands::inspect::context(&target, input.as_deref())
        }

        Commands::Configure {
            max_depth,
            format,
            pretty,
            show,
        } => commands::configure::handle(
            Changes {
                max_depth,
                format,
                pretty,
            },
            show,
        ),
    }
}
