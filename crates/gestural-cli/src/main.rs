//! Gestural CLI - Command-line interface for gestural scores
//!
//! This binary provides commands for inspecting, validating, editing,
//! transforming and rendering `.ges` gestural scores.

use clap::{ArgGroup, Parser, Subcommand};
use colored::Colorize;
use gestural_score::GlottisKind;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use gestural_cli::commands;
use gestural_cli::commands::edit::{EditArgs, EditKind};
use gestural_cli::commands::transform::TransformArgs;

/// Gestural - Articulatory gestural score tool
#[derive(Parser)]
#[command(name = "gestural")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Glottis model used to interpret glottal shape names
    #[arg(long, global = true, default_value = "geometric")]
    glottis: GlottisKind,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a summary of a score
    Info {
        /// Path to the .ges file
        #[arg(short, long)]
        score: String,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Validate a score against the channel bounds
    Validate {
        /// Path to the .ges file
        #[arg(short, long)]
        score: String,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Lengthen or shorten all sequences at a time mark
    #[command(group(ArgGroup::new("direction").required(true).args(["lengthen", "shorten"])))]
    Edit {
        /// Path to the .ges file
        #[arg(short, long)]
        score: String,

        /// Time mark in seconds
        #[arg(long)]
        at: f64,

        /// Insert time at the mark
        #[arg(long)]
        lengthen: bool,

        /// Remove time at the mark
        #[arg(long)]
        shorten: bool,

        /// Amount of time in seconds (default: the edit step of the settings)
        #[arg(long)]
        step: Option<f64>,

        /// Settings profile (default, control, preview)
        #[arg(short, long, conflicts_with = "config")]
        profile: Option<String>,

        /// Settings JSON file
        #[arg(short, long)]
        config: Option<String>,

        /// Output file (default: overwrite the input)
        #[arg(short, long)]
        out: Option<String>,
    },

    /// Apply global transforms to a score
    Transform {
        /// Path to the .ges file
        #[arg(short, long)]
        score: String,

        /// Shift all F0 targets by this many semitones
        #[arg(long, allow_negative_numbers = true)]
        f0_offset: Option<f64>,

        /// Scale F0 targets around their mean by this factor
        #[arg(long)]
        f0_range: Option<f64>,

        /// Add this slope (st/s) to all F0 targets
        #[arg(long, allow_negative_numbers = true)]
        f0_slope: Option<f64>,

        /// Scale lung pressure targets by this factor
        #[arg(long)]
        pressure: Option<f64>,

        /// Scale all durations by this factor
        #[arg(long)]
        duration: Option<f64>,

        /// Scale all time constants except F0 by this factor
        #[arg(long)]
        time_constants: Option<f64>,

        /// Rename a glottal shape (OLD=NEW, repeatable)
        #[arg(long)]
        substitute: Vec<String>,

        /// Output file (default: overwrite the input)
        #[arg(short, long)]
        out: Option<String>,
    },

    /// Render control curves to CSV on the synthesis worker
    Curves {
        /// Path to the .ges file
        #[arg(short, long)]
        score: String,

        /// Settings profile (default, control, preview)
        #[arg(short, long, conflicts_with = "config")]
        profile: Option<String>,

        /// Settings JSON file
        #[arg(short, long)]
        config: Option<String>,

        /// CSV rows per second
        #[arg(long, default_value_t = commands::curves::DEFAULT_FRAME_RATE_HZ)]
        frame_rate: f64,

        /// Output CSV file
        #[arg(short, long)]
        out: String,
    },

    /// Write the demo score to a new file
    Init {
        /// Output file
        #[arg(short, long)]
        out: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let glottis = cli.glottis;

    let result = match cli.command {
        Commands::Info { score, json } => commands::info::run(&score, glottis, json),
        Commands::Validate { score, json } => commands::validate::run(&score, glottis, json),
        Commands::Edit {
            score,
            at,
            lengthen,
            shorten: _,
            step,
            profile,
            config,
            out,
        } => {
            let args = EditArgs {
                at_s: at,
                kind: if lengthen {
                    EditKind::Lengthen
                } else {
                    EditKind::Shorten
                },
                step_s: step,
                profile,
                config,
            };
            commands::edit::run(&score, glottis, &args, out.as_deref())
        }
        Commands::Transform {
            score,
            f0_offset,
            f0_range,
            f0_slope,
            pressure,
            duration,
            time_constants,
            substitute,
            out,
        } => {
            let args = TransformArgs {
                f0_offset,
                f0_range,
                f0_slope,
                pressure,
                duration,
                time_constants,
                substitute,
            };
            commands::transform::run(&score, glottis, &args, out.as_deref())
        }
        Commands::Curves {
            score,
            profile,
            config,
            frame_rate,
            out,
        } => commands::curves::run(
            &score,
            glottis,
            profile.as_deref(),
            config.as_deref(),
            frame_rate,
            &out,
        ),
        Commands::Init { out, force } => commands::init::run(&out, glottis, force),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            ExitCode::from(1)
        }
    }
}
