//! Coursesed CLI entrypoint

use clap::Parser;

use coursesed::cli::Cli;
use coursesed::output;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = cli.execute() {
        // Display error in red with clean formatting
        output::error(&format!("Error: {:#}", e));
        std::process::exit(1);
    }
}
