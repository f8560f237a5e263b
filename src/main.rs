//! Demonstration binary for `ondemand`.
//!
//! Links two logging layers and sends every operation to `next`, `prev`
//! and `self`, printing the outcome of each call.

mod cli;

use clap::Parser;
use ondemand::{ChainConfig, demo};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Layer calls are reported through `tracing`; applications embedding the
    // library should install their own subscriber.
    tracing_subscriber::fmt::init();

    let cli = cli::Cli::parse();
    let config = ChainConfig::default().with_diagnostics(!cli.no_diagnostics);
    for step in demo::run(&cli.user_data, cli.payload.as_bytes(), config)? {
        println!("{step}");
    }
    Ok(())
}
