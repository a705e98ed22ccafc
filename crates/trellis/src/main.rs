//! Trellis CLI - asset pass and preview server for static sites.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};
use trellis_static::Profile;

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "trellis")]
#[command(about = "Asset pass and preview server for static sites")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to trellis.toml config file
    #[arg(short, long, default_value = "trellis.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the site into the profile's output directory
    Build {
        /// Build profile (dev or docs)
        #[arg(short, long, default_value = "dev")]
        profile: Profile,

        /// Output directory (defaults to build/ or docs/ by profile)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip stylesheet minification
        #[arg(long)]
        no_minify: bool,
    },

    /// Copy fonts and regenerate the font-face stylesheet
    Fonts {
        /// Build profile (dev or docs)
        #[arg(short, long, default_value = "dev")]
        profile: Profile,
    },

    /// Preview a built site
    Serve {
        /// Port to listen on (defaults to config or 4000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory to serve
        #[arg(short, long, default_value = "build")]
        dir: PathBuf,
    },

    /// Build the dev profile and preview it
    Dev {
        /// Port to listen on (defaults to config or 7777)
        #[arg(short, long)]
        port: Option<u16>,

        /// Do not open browser
        #[arg(long)]
        no_open: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Build {
            profile,
            output,
            no_minify,
        } => {
            commands::build::run(&cli.config, profile, output, no_minify).await?;
        }
        Commands::Fonts { profile } => {
            commands::fonts::run(&cli.config, profile).await?;
        }
        Commands::Serve { port, dir } => {
            let port = match port {
                Some(port) => port,
                None => config::ConfigFile::load(&cli.config)?
                    .serve
                    .port
                    .unwrap_or(4000),
            };
            commands::serve::run(port, dir, true).await?;
        }
        Commands::Dev { port, no_open } => {
            commands::dev::run(&cli.config, port, !no_open).await?;
        }
    }

    Ok(())
}
