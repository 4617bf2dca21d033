//! CLI entry point for weighted Voronoi stippling

use clap::Parser;
use stippler::io::cli::{Cli, FileProcessor};

fn main() -> stippler::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let mut processor = FileProcessor::new(cli);
    processor.process()
}
