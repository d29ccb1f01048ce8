#![warn(clippy::all)]
use clap::{CommandFactory, Parser};
use commands::*;
use config::Config;
use prelude::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod prelude;
mod select;

const LOG_ENV: &str = "EC2_MODEL_LOG";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (default: ~/.config/ec2-model/ec2-model.config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log debug events to stderr
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), env!("CARGO_BIN_NAME"), &mut std::io::stdout());
        return Ok(());
    }
    let cfg = Config::load(cli.config.as_deref()).wrap_err("Can't load config")?;
    match &cli.command {
        Commands::Shapes(args) => Shapes::new(args)?.exec(),
        Commands::Encode(args) => Encode::new(args, &cfg)?.exec(),
        Commands::Decode(args) => Decode::new(args, &cfg)?.exec(),
        Commands::Completions { .. } => Ok(()),
    }
}
