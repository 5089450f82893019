//! Diagrammer CLI - Parse, validate and regenerate Mermaid-style diagrams

mod cli;
mod colorizer;

use clap::Parser;

fn main() {
    let cli_args = cli::Cli::parse();

    let mut app = cli::DiagrammerApp::new();

    if let Err(e) = app.run(cli_args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
