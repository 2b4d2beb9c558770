use clap::{ArgAction, Parser};
use colored::Colorize;
use gorest::config::Config;
use gorest::users::UsersClient;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

mod dispatch;
mod event;
mod handlers;
mod registry;

use dispatch::DispatchError;
use registry::HandlerRegistry;

/// lambda - AWS Lambda command-line application for testing handlers
#[derive(Debug, Parser)]
#[command(name = "lambda")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// AWS Lambda handler name
    pub lambda_handler: String,

    /// AWS Event JSON object string or file path. For example: '{ "id": 1610 }'
    #[arg(short, long)]
    pub event: Option<String>,

    /// AWS Context JSON object string or file path. For example: '{ "meta": "multiverse" }'
    #[arg(short, long)]
    pub context: Option<String>,

    /// Increase verbosity (debug logging)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Load API settings from this TOML file instead of the default search paths
    #[arg(long, value_name = "PATH", env = "LAMBDA_CONFIG")]
    pub config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();
    let _logging = gorest::observability::init_logging(cli.verbose);

    let code = match run(&cli).await {
        Ok(()) => 0,
        Err(e) => report(&e, &mut std::io::stderr()),
    };

    std::process::exit(code);
}

/// Print a failed run to `err_out` and pick the process exit code
fn report<W: Write>(e: &anyhow::Error, err_out: &mut W) -> i32 {
    // Already logged by the dispatcher
    if let Some(DispatchError::UnknownHandler { .. }) = e.downcast_ref::<DispatchError>() {
        return 1;
    }

    let _ = writeln!(err_out, "{} {}", "Error:".red().bold(), e);
    for cause in e.chain().skip(1) {
        let _ = writeln!(err_out, "\n{} {}", "Caused by:".yellow(), cause);
    }

    1
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let api = Arc::new(UsersClient::new(&config)?);
    let registry = HandlerRegistry::users(api);

    let mut stdout = std::io::stdout();
    dispatch::dispatch(cli, &registry, &mut stdout).await?;
    Ok(())
}
