//! Font copy and font-face stylesheet command.

use std::path::Path;

use anyhow::Result;
use trellis_static::{Profile, StaticBuilder};

use crate::config::ConfigFile;

/// Run the fonts command.
pub async fn run(config_path: &Path, profile: Profile) -> Result<()> {
    let config = ConfigFile::load(config_path)?.build_config(profile);

    let result = StaticBuilder::new(config).build_fonts().await?;

    match result.stylesheet {
        Some(path) => tracing::info!(
            "Copied {} font files, wrote {} faces to {}",
            result.files,
            result.faces,
            path.display()
        ),
        None => tracing::info!("No fonts to declare"),
    }

    Ok(())
}
