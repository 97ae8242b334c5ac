use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(version, about = "Interpreter for the morklerork language")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run source files, concatenated in the order given
    Run {
        /// Paths to the source files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Check source files for syntax errors and print the parsed program
    Check {
        /// Paths to the source files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Start an interactive REPL session
    Repl,
}
