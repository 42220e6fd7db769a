mod commands;
mod config;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use commands::DocumentOptions;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Requirement sentence parser and constraint translator.
#[derive(Parser)]
#[command(
    name = "crucible",
    version,
    about = "Requirement sentence parser and constraint translator"
)]
struct Cli {
    /// Output format (text or json) [default: text]
    #[arg(long, global = true, value_enum)]
    output: Option<OutputFormat>,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Enable debug logging on stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Path to a crucible.toml config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the token stream of every requirement line
    Tokens {
        /// Requirements file, or - for stdin
        file: PathBuf,
    },

    /// Print the syntax tree outline of every requirement line
    Tree {
        /// Requirements file, or - for stdin
        file: PathBuf,
    },

    /// Parse requirements into intent records
    Parse {
        /// Requirements file, or - for stdin
        file: PathBuf,
        /// Keep going past lines that fail to parse
        #[arg(long)]
        recover: bool,
        /// Stop after this many failing lines (with --recover)
        #[arg(long)]
        max_errors: Option<usize>,
    },

    /// Translate requirements into one constraint set (an SMT-LIB v2 script in text mode)
    Translate {
        /// Requirements file, or - for stdin
        file: PathBuf,
        /// Keep going past lines that fail to parse
        #[arg(long)]
        recover: bool,
        /// Stop after this many failing lines (with --recover)
        #[arg(long)]
        max_errors: Option<usize>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize tracing (--verbose enables debug-level output)
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match config::load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            commands::report_error(
                &format!("error: {}", e),
                cli.output.unwrap_or(OutputFormat::Text),
                cli.quiet,
            );
            process::exit(1);
        }
    };
    let output = cli
        .output
        .or(config.output.format)
        .unwrap_or(OutputFormat::Text);
    let document_options = |recover: bool, max_errors: Option<usize>| DocumentOptions {
        recover: recover || config.document.recover,
        max_errors: max_errors.unwrap_or(config.document.max_errors),
    };

    match cli.command {
        Commands::Tokens { file } => {
            commands::tokens::cmd_tokens(&file, output, cli.quiet);
        }
        Commands::Tree { file } => {
            commands::tree::cmd_tree(&file, output, cli.quiet);
        }
        Commands::Parse {
            file,
            recover,
            max_errors,
        } => {
            let options = document_options(recover, max_errors);
            commands::parse::cmd_parse(&file, options, output, cli.quiet);
        }
        Commands::Translate {
            file,
            recover,
            max_errors,
        } => {
            let options = document_options(recover, max_errors);
            commands::translate::cmd_translate(&file, options, output, cli.quiet);
        }
    }
}
