//! The `examrunner` command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod console;
mod render;

#[derive(Parser)]
#[command(
    name = "examrunner",
    version,
    about = "Interactive multiple-choice exam runner"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take an exam (resumes the saved session when there is one)
    Take {
        /// Question bank JSON file
        #[arg(long, conflicts_with_all = ["paste", "builtin"])]
        bank: Option<PathBuf>,

        /// Read the question bank JSON from stdin, up to a line containing only `---`
        #[arg(long, conflicts_with = "builtin")]
        paste: bool,

        /// Use the built-in questions
        #[arg(long)]
        builtin: bool,

        /// Session file to save progress to
        #[arg(long)]
        state: Option<PathBuf>,

        /// Ignore any saved session and start over
        #[arg(long)]
        fresh: bool,

        /// RNG seed for a reproducible question order
        #[arg(long)]
        seed: Option<u64>,

        /// Keep the bank's question order
        #[arg(long)]
        no_shuffle: bool,

        /// Report format when the exam is finished: text, markdown, json, html, all
        #[arg(long, default_value = "text")]
        format: String,

        /// Output directory for json/html reports
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate a question bank file
    Validate {
        /// Path to the question bank JSON
        #[arg(long)]
        bank: PathBuf,
    },

    /// Copy a question bank to the local bank path so it loads by default
    Import {
        /// Path to the question bank JSON
        #[arg(long)]
        bank: PathBuf,

        /// Destination (defaults to the configured bank path)
        #[arg(long)]
        dest: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show progress of the saved session
    Status {
        /// Session file
        #[arg(long)]
        state: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Produce a report for the saved session
    Report {
        /// Session file
        #[arg(long)]
        state: Option<PathBuf>,

        /// Output format: text, markdown, json, html, all
        #[arg(long, default_value = "text")]
        format: String,

        /// Output directory for json/html reports
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List the topics of a question bank
    Topics {
        /// Question bank JSON (defaults to the local bank or the built-in set)
        #[arg(long)]
        bank: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and sample question bank
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("examrunner=warn".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Take {
            bank,
            paste,
            builtin,
            state,
            fresh,
            seed,
            no_shuffle,
            format,
            output,
            config,
        } => commands::take::execute(commands::take::TakeArgs {
            bank,
            paste,
            builtin,
            state,
            fresh,
            seed,
            no_shuffle,
            format,
            output,
            config,
        }),
        Commands::Validate { bank } => commands::validate::execute(bank),
        Commands::Import {
            bank,
            dest,
            force,
            config,
        } => commands::import::execute(bank, dest, force, config),
        Commands::Status { state, config } => commands::status::execute(state, config),
        Commands::Report {
            state,
            format,
            output,
            config,
        } => commands::report::execute(state, format, output, config),
        Commands::Topics { bank, config } => commands::topics::execute(bank, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
