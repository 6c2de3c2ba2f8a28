use anyhow::Result;
use clap::Parser;
use debug_gate::cli::{self, Cli};

fn main() -> Result<()> {
    cli::run(Cli::parse())
}
