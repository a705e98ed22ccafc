//! Asset pass build command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use trellis_static::{BuildResult, Profile, StaticBuilder};

use crate::config::ConfigFile;

/// Run the build command.
pub async fn run(
    config_path: &Path,
    profile: Profile,
    output: Option<PathBuf>,
    no_minify: bool,
) -> Result<BuildResult> {
    tracing::info!("Building {} profile...", profile);

    let file_config = ConfigFile::load(config_path)?;

    let mut config = file_config.build_config(profile);
    if let Some(output) = output {
        config.output_dir = output;
    }
    if no_minify {
        config.minify = false;
    }

    let builder = StaticBuilder::new(config);
    let result = builder.build().await?;
    let fonts = builder.build_fonts().await?;

    tracing::info!(
        "Built {} pages, {} stylesheets, {} scripts, {} assets, {} icons in {}ms",
        result.pages,
        result.styles,
        result.scripts,
        result.assets,
        result.icons,
        result.duration_ms
    );
    if fonts.files > 0 {
        tracing::info!("Copied {} font files", fonts.files);
    }
    if !result.failures.is_empty() {
        tracing::warn!("{} files failed to build", result.failures.len());
    }

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(result)
}
