//! CLI argument definitions using clap.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// thermocurate: declarative curation of physical-property data sets
#[derive(Parser)]
#[command(name = "thermocurate")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Silence all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Also write logs to a file
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a curation workflow over a measurement table
    Apply {
        /// Path to the measurement table (CSV/TSV)
        #[arg(value_name = "TABLE")]
        file: PathBuf,

        /// Path to the workflow schema (JSON)
        #[arg(short, long)]
        workflow: PathBuf,

        /// Molecule annotations used by chemistry-aware stages (JSON)
        #[arg(short, long)]
        annotations: Option<PathBuf>,

        /// Output path for the curated table (default: <table>_curated.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of worker threads stages may use
        #[arg(short = 'j', long, default_value = "1")]
        processes: usize,

        /// Write a JSON report of the rows each stage removed
        #[arg(long, value_name = "PATH")]
        report: Option<PathBuf>,
    },

    /// Check a workflow schema without running it
    Validate {
        /// Path to the workflow schema (JSON)
        #[arg(value_name = "WORKFLOW")]
        workflow: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Summarize the contents of a measurement table
    Summary {
        /// Path to the measurement table (CSV/TSV)
        #[arg(value_name = "TABLE")]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_apply() {
        let cli = Cli::parse_from([
            "thermocurate",
            "-vv",
            "apply",
            "data.csv",
            "--workflow",
            "workflow.json",
            "-j",
            "4",
        ]);

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Apply {
                file,
                workflow,
                processes,
                output,
                ..
            } => {
                assert_eq!(file, PathBuf::from("data.csv"));
                assert_eq!(workflow, PathBuf::from("workflow.json"));
                assert_eq!(processes, 4);
                assert!(output.is_none());
            }
            _ => panic!("expected apply"),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["thermocurate", "-q", "-v", "summary", "data.csv"]).is_err());
    }
}
