//! Renders the `ondemand(1)` man page from the CLI definition.
//!
//! The page lands in `target/generated-man` unless `ONDEMAND_MAN_DIR` names
//! another directory.

use std::{env, fs, io, path::PathBuf};

use clap::CommandFactory;
use clap_mangen::Man;

#[path = "src/cli.rs"]
mod cli;

fn main() -> io::Result<()> {
    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-env-changed=ONDEMAND_MAN_DIR");

    let out_dir = env::var_os("ONDEMAND_MAN_DIR")
        .map_or_else(|| PathBuf::from("target/generated-man"), PathBuf::from);
    fs::create_dir_all(&out_dir)?;

    let page = Man::new(cli::Cli::command())
        .section("1")
        .manual("ondemand manual");
    let mut rendered = Vec::new();
    page.render(&mut rendered)?;
    fs::write(out_dir.join("ondemand.1"), rendered)
}
