//! thermocurate CLI - curate physical-property measurement data.

mod cli;
mod commands;
mod logging;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.clone()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Apply {
            file,
            workflow,
            annotations,
            output,
            processes,
            report,
        } => commands::apply::run(file, workflow, annotations, output, processes, report),

        Commands::Validate { workflow, json } => commands::validate::run(workflow, json),

        Commands::Summary { file, json } => commands::summary::run(file, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
