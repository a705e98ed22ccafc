//! Development build and preview command.

use std::path::Path;

use anyhow::Result;
use trellis_static::Profile;

use crate::config::ConfigFile;

/// Build the dev profile, then serve it.
pub async fn run(config_path: &Path, port: Option<u16>, open: bool) -> Result<()> {
    let result = super::build::run(config_path, Profile::Dev, None, false).await?;

    let port = match port {
        Some(port) => port,
        None => ConfigFile::load(config_path)?.serve.port.unwrap_or(7777),
    };

    tracing::info!("Starting development server on port {}", port);

    super::serve::run(port, result.output_dir, open).await
}
