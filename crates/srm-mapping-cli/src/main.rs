//! SRM mapping CLI
//!
//! Command-line front end for a mapping session:
//! - `show`: print the mapping table and the assignable pool
//! - `apply`: run shell commands from flags or a script, print the result on `done`
//! - `shell`: interactive editing session

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use srm_mapping::{MappingSession, SessionFile};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod render;
mod shell;

#[derive(Parser)]
#[command(name = "srm-map")]
#[command(author, version, about = "Map SRM classes and relations onto ontology ids")]
struct Cli {
    /// Log mapping updates (equivalent to RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the mapping table and assignable ontology ids.
    Show {
        #[command(flatten)]
        session: SessionArgs,
    },

    /// Run shell commands non-interactively.
    ///
    /// Commands come from `--script` (use `-` for stdin) followed by every
    /// `-c` flag in order. The final mapping is printed as JSON on `done`.
    Apply {
        #[command(flatten)]
        session: SessionArgs,
        /// Script file with one command per line
        #[arg(long)]
        script: Option<PathBuf>,
        /// Command to run (repeatable)
        #[arg(short = 'c', long = "cmd")]
        commands: Vec<String>,
        /// Report failing commands and keep going
        #[arg(long)]
        continue_on_error: bool,
        /// Do not echo commands
        #[arg(short, long)]
        quiet: bool,
    },

    /// Interactive editing shell.
    Shell {
        #[command(flatten)]
        session: SessionArgs,
    },
}

#[derive(Args)]
struct SessionArgs {
    /// Session file (catalog, ontology ids, initial mapping, labels)
    file: PathBuf,
    /// Override the heading label
    #[arg(long)]
    heading: Option<String>,
    /// Override the done action label
    #[arg(long)]
    done_label: Option<String>,
    /// Override the cancel action label
    #[arg(long)]
    cancel_label: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Show { session } => {
            let session = load_session(&session)?;
            print!("{}", render::render_session(&session));
            Ok(())
        }
        Commands::Apply {
            session,
            script,
            commands,
            continue_on_error,
            quiet,
        } => {
            let session = load_session(&session)?;
            shell::cmd_script(session, script.as_deref(), &commands, continue_on_error, quiet)
        }
        Commands::Shell { session } => {
            let session = load_session(&session)?;
            shell::cmd_shell(session)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_session(args: &SessionArgs) -> Result<MappingSession> {
    let mut file = read_session_file(&args.file)?;
    if let Some(heading) = &args.heading {
        file.labels.heading = heading.clone();
    }
    if let Some(done) = &args.done_label {
        file.labels.done_button = done.clone();
    }
    if let Some(cancel) = &args.cancel_label {
        file.labels.cancel_button = cancel.clone();
    }
    let session = MappingSession::from_file(file)
        .with_context(|| format!("invalid session in {}", args.file.display()))?;
    tracing::debug!(
        file = %args.file.display(),
        elements = session.catalog().len(),
        ontology_ids = session.store().ontology_ids().len(),
        "session loaded"
    );
    Ok(session)
}

fn read_session_file(path: &Path) -> Result<SessionFile> {
    SessionFile::load(path).with_context(|| format!("failed to load {}", path.display()))
}
