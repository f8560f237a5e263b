//! Command line interface for the `ondemand` demonstration binary.
//!
//! Shared with the build script, which renders a man page from it.

use clap::Parser;

/// Command line arguments for the `ondemand` binary.
#[derive(Debug, Parser)]
#[command(
    name = "ondemand",
    version,
    about = "Drive a two-layer chain through every call route"
)]
pub struct Cli {
    /// Value handed to both layers as user data.
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    pub user_data: i64,

    /// Bytes placed in the buffer passed to data calls.
    #[arg(short, long, default_value = "")]
    pub payload: String,

    /// Skip recording creation, link and call sites.
    #[arg(long)]
    pub no_diagnostics: bool,
}
