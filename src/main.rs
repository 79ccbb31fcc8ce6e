use anyhow::Result;
use clap::Parser;

use parapat::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run()
}
