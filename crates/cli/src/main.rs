// cceval - evaluate Compton event reconstruction against simulated truth

mod eval;
mod exit_codes;
mod report;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exit_codes::EXIT_SUCCESS;

#[derive(Parser)]
#[command(name = "cceval")]
#[command(about = "Evaluates the reconstructed events of a Compton camera against the simulation")]
#[command(version)]
struct Cli {
    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match reconstructed events against truth and print accuracy statistics
    #[command(after_help = "\
Examples:
  cceval run -f recon/ -s sims/
  cceval run -f recon/ -s sims/run7.csv --e_pos_y 8 --e_energy 0.1
  cceval run -f recon/ --config eval.toml --json
  cceval run -f recon/ --frame=-z,x,-y --output result.json")]
    Run(eval::RunArgs),

    /// Validate reconstruction tables without reading the truth source
    #[command(after_help = "\
Examples:
  cceval check -f recon/")]
    Check(eval::ReconArgs),
}

pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("warn,sificc_eval={level},cceval={level}"))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Run(args) => eval::cmd_run(args),
        Commands::Check(args) => eval::cmd_check(args),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {hint}");
            }
            ExitCode::from(err.code)
        }
    }
}
