//! `cceval run` / `cceval check` — evaluate a reconstruction against truth.

use std::path::{Path, PathBuf};

use clap::Args;
use sificc_eval::config::{AxisMapping, EvalConfig};
use sificc_eval::engine::{check_table, run};
use sificc_eval::model::Criterion;
use sificc_eval::source::{load_recon_table, resolve_truth_path};
use sificc_eval::{CsvTruthSource, EvalError};

use crate::exit_codes::{eval_exit_code, EXIT_ERROR, EXIT_USAGE};
use crate::report::render_text;
use crate::CliError;

#[derive(Args)]
pub struct ReconArgs {
    /// Directory holding the reconstruction tables (TreeStat.csv, ConeList.csv)
    #[arg(short = 'f', long, value_name = "DIR")]
    pub file: PathBuf,

    /// TOML file with [tolerance] limits and the frame mapping
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Cone-list to truth frame: "detector", "identity", or a list like "-z,x,-y"
    #[arg(long, value_name = "FRAME", allow_hyphen_values = true)]
    pub frame: Option<String>,
}

#[derive(Args)]
pub struct ToleranceArgs {
    /// The distance limit for the x-axis of the electron [default: 2.6 mm]
    #[arg(long = "e_pos_x", value_name = "VALUE")]
    pub e_pos_x: Option<f64>,

    /// The distance limit for the y-axis of the electron [default: 10 mm]
    #[arg(long = "e_pos_y", value_name = "VALUE")]
    pub e_pos_y: Option<f64>,

    /// The distance limit for the z-axis of the electron [default: 2.6 mm]
    #[arg(long = "e_pos_z", value_name = "VALUE")]
    pub e_pos_z: Option<f64>,

    /// The distance limit for the x-axis of the photon [default: 2.6 mm]
    #[arg(long = "p_pos_x", value_name = "VALUE")]
    pub p_pos_x: Option<f64>,

    /// The distance limit for the y-axis of the photon [default: 10 mm]
    #[arg(long = "p_pos_y", value_name = "VALUE")]
    pub p_pos_y: Option<f64>,

    /// The distance limit for the z-axis of the photon [default: 2.6 mm]
    #[arg(long = "p_pos_z", value_name = "VALUE")]
    pub p_pos_z: Option<f64>,

    /// The energy difference limit relative to the electron energy [default: 0.12]
    #[arg(long = "e_energy", value_name = "VALUE")]
    pub e_energy: Option<f64>,

    /// The energy difference limit relative to the photon energy [default: 0.12]
    #[arg(long = "p_energy", value_name = "VALUE")]
    pub p_energy: Option<f64>,
}

impl ToleranceArgs {
    fn overrides(&self) -> [(Criterion, Option<f64>); 8] {
        [
            (Criterion::EPosX, self.e_pos_x),
            (Criterion::EPosY, self.e_pos_y),
            (Criterion::EPosZ, self.e_pos_z),
            (Criterion::PPosX, self.p_pos_x),
            (Criterion::PPosY, self.p_pos_y),
            (Criterion::PPosZ, self.p_pos_z),
            (Criterion::EEnergy, self.e_energy),
            (Criterion::PEnergy, self.p_energy),
        ]
    }
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub recon: ReconArgs,

    /// The path of the truth simulation source (directory when TreeStat names the file)
    #[arg(short = 's', long, value_name = "PATH", default_value = ".")]
    pub source: PathBuf,

    #[command(flatten)]
    pub tolerance: ToleranceArgs,

    /// Output JSON to stdout instead of the text report
    #[arg(long)]
    pub json: bool,

    /// Write JSON output to file
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

fn eval_err(err: EvalError) -> CliError {
    CliError {
        code: eval_exit_code(&err),
        message: err.to_string(),
        hint: match &err {
            EvalError::InvalidBounds { .. } => {
                Some("TreeStat/TotalSimNev must equal StopEvent - StartEvent + 1".to_string())
            }
            EvalError::SourceOpen { .. } => {
                Some("use --source to point at the truth simulation file or its directory".to_string())
            }
            _ => None,
        },
    }
}

/// Defaults, then the optional config file, then the frame flag.
fn resolve_config(args: &ReconArgs) -> Result<EvalConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| CliError {
                code: EXIT_USAGE,
                message: format!("cannot read config {}: {e}", path.display()),
                hint: None,
            })?;
            EvalConfig::from_toml(&text).map_err(eval_err)?
        }
        None => EvalConfig::default(),
    };

    if let Some(frame) = &args.frame {
        config.frame = frame.parse::<AxisMapping>().map_err(eval_err)?;
    }

    Ok(config)
}

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let mut config = resolve_config(&args.recon)?;
    for (criterion, value) in args.tolerance.overrides() {
        if let Some(v) = value {
            *config.tolerance.limit_mut(criterion) = v;
        }
    }
    config.validate().map_err(eval_err)?;

    tracing::info!(frame = %config.frame, "cone list positions mapped into truth frame");

    let table = load_recon_table(&args.recon.file, &config.frame).map_err(eval_err)?;
    let truth_path = resolve_truth_path(&args.source, &table.meta);
    let report = run(&config, table, CsvTruthSource::new(truth_path)).map_err(eval_err)?;

    if args.json || args.output.is_some() {
        let json_str = serde_json::to_string_pretty(&report).map_err(|e| CliError {
            code: EXIT_ERROR,
            message: format!("JSON serialization error: {e}"),
            hint: None,
        })?;

        if let Some(ref path) = args.output {
            write_output(path, &json_str)?;
            tracing::info!("wrote {}", path.display());
        }
        if args.json {
            println!("{json_str}");
            return Ok(());
        }
    }

    print!("\n{}", render_text(&report));
    Ok(())
}

pub fn cmd_check(args: ReconArgs) -> Result<(), CliError> {
    let config = resolve_config(&args)?;
    let table = load_recon_table(&args.file, &config.frame).map_err(eval_err)?;
    let (start, stop) = check_table(&table).map_err(eval_err)?;

    let meta = &table.meta;
    println!("Input file:       {}", meta.input_filename.as_deref().unwrap_or("-"));
    println!("Entries:          {start}..{stop}");
    println!("TotalSimNev:      {}", meta.total_sim_nev);
    println!("Candidates:       {}", table.candidates.len());
    println!("Frame:            {}", config.frame);
    Ok(())
}

fn write_output(path: &Path, contents: &str) -> Result<(), CliError> {
    std::fs::write(path, contents).map_err(|e| CliError {
        code: EXIT_ERROR,
        message: format!("cannot write output: {e}"),
        hint: None,
    })
}
