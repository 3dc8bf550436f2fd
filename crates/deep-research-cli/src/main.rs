use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;
mod progress;
mod settings;

use commands::{Context, Overrides};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding `.env`, `deep-research.toml` and the output folder
    #[arg(long, global = true, default_value = ".")]
    project_dir: PathBuf,

    /// Gemini API key (otherwise read from the environment or `.env`)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Research agent to run
    #[arg(long, global = true)]
    agent: Option<String>,

    /// Seconds between status checks
    #[arg(
        long,
        global = true,
        value_name = "SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    poll_interval: Option<u64>,

    /// Seconds to keep polling before giving up
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    /// Prompt template to render instead of the built-in one
    #[arg(long, global = true, value_name = "FILE")]
    prompt_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Research a topic and save a markdown report
    Report {
        topic: String,

        /// Render the saved report in the terminal
        #[arg(long)]
        print: bool,
    },

    /// Research a topic and save a structured narrative as JSON
    Narrative { topic: String },

    /// Query an interaction once and print its status
    Status { interaction_id: String },

    /// Check a saved narrative file against the schema
    Validate {
        /// Defaults to the narrative in the output directory
        file: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match init_logging().and_then(|()| run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", error_message(&err));
            ExitCode::FAILURE
        }
    }
}

/// The full error chain on one line, as printed before a failing exit.
fn error_message(err: &anyhow::Error) -> String {
    format!("{} {:#}", style("Error:").red().bold(), err)
}

/// Logs go to stderr at `warn` unless `RUST_LOG` says otherwise.
fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))
}

fn run(cli: Cli) -> Result<()> {
    if let Command::Version = cli.command {
        return commands::version::execute();
    }

    let overrides = Overrides {
        api_key: cli.api_key,
        agent: cli.agent,
        poll_interval: cli.poll_interval,
        timeout: cli.timeout,
        prompt_file: cli.prompt_file,
    };
    let ctx = Context::new(cli.project_dir, overrides)?;

    match cli.command {
        Command::Report { topic, print } => commands::report::execute(&ctx, &topic, print),
        Command::Narrative { topic } => commands::narrative::execute(&ctx, &topic),
        Command::Status { interaction_id } => commands::status::execute(&ctx, &interaction_id),
        Command::Validate { file } => commands::validate::execute(&ctx, file.as_deref()),
        Command::Version => commands::version::execute(),
    }
}
