//! Plantscribe CLI - Turn free-text design descriptions into PlantUML

mod cli;
mod colorizer;
mod edit;

use clap::Parser;

fn main() {
    // Logging is initialised inside run() once the flags are known
    let cli_args = cli::Cli::parse();

    let app = cli::PlantscribeApp::new();

    if let Err(e) = app.run(cli_args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
