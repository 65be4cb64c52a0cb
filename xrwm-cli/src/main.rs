//! xrwm - headless driver for the spatial window manager

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use xrwm_core::config::{default_config_path, load_config, save_config};
use xrwm_core::{grid_dimensions, math, sphere_poses, WmConfig};

mod simulation;

use simulation::SceneOptions;

#[derive(Parser)]
#[command(name = "xrwm")]
#[command(about = "Spatial window manager simulator", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, env = "XRWM_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay scripted controller input against the demo scene
    Simulate {
        /// Windows per grid row
        #[arg(long, default_value = "6")]
        columns: usize,

        /// Grid rows
        #[arg(long, default_value = "5")]
        rows: usize,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print the sphere layout for a number of windows
    Layout {
        /// Number of managed windows
        count: usize,

        /// Sphere radius, overriding the configuration
        #[arg(long)]
        radius: Option<f32>,
    },

    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write the default configuration
    Init {
        /// Destination, defaults to ~/.xrwm/config.toml
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Load configuration
    let config = load_config(cli.config).context("loading configuration")?;

    match cli.command {
        Commands::Simulate {
            columns,
            rows,
            format,
        } => {
            let report = simulation::run(config, SceneOptions { columns, rows })?;
            match format {
                OutputFormat::Text => simulation::print_report(&report),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            }
        }

        Commands::Layout { count, radius } => {
            let radius = radius.unwrap_or(config.sphere_radius);
            let (width, height) = grid_dimensions(count);
            println!("{} windows: {} x {} grid, radius {}", count, width, height, radius);
            for (slot, pose) in sphere_poses(width, height, radius).iter().enumerate() {
                let position = math::translation(pose);
                let marker = if slot < count { "" } else { " (empty)" };
                println!(
                    "  slot {:>3}: ({:>7.3}, {:>7.3}, {:>7.3}){}",
                    slot, position.x, position.y, position.z, marker
                );
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
            ConfigAction::Init { path, force } => {
                let path = path
                    .or_else(default_config_path)
                    .context("no home directory to place the configuration in")?;
                if path.exists() && !force {
                    anyhow::bail!(
                        "{} already exists, pass --force to overwrite",
                        path.display()
                    );
                }
                save_config(&WmConfig::default(), &path)?;
                println!("Wrote {}", path.display());
            }
        },
    }

    Ok(())
}
