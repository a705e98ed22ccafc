//! Project configuration file (trellis.toml).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;
use trellis_static::{BuildConfig, Profile};

/// Configuration file structure.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub build: BuildSettings,
    #[serde(default)]
    pub serve: ServeSettings,
}

#[derive(Debug, Deserialize)]
pub struct BuildSettings {
    /// Source directory
    #[serde(default = "default_src")]
    pub src: PathBuf,
    /// Generated font-face stylesheet
    #[serde(default = "default_fonts_stylesheet")]
    pub fonts_stylesheet: PathBuf,
    /// Remove the output directory before building
    #[serde(default = "default_clean")]
    pub clean: bool,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            src: default_src(),
            fonts_stylesheet: default_fonts_stylesheet(),
            clean: default_clean(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct ServeSettings {
    pub port: Option<u16>,
}

fn default_src() -> PathBuf {
    PathBuf::from("src")
}
fn default_fonts_stylesheet() -> PathBuf {
    PathBuf::from("src/scss/base/_fontsAutoGen.scss")
}
fn default_clean() -> bool {
    true
}

impl ConfigFile {
    /// Load configuration from `path` if it exists.
    /// Returns an error if the file exists but is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let config = Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Builder configuration for `profile` with file settings applied.
    pub fn build_config(&self, profile: Profile) -> BuildConfig {
        BuildConfig {
            src_dir: self.build.src.clone(),
            clean: self.build.clean,
            fonts_stylesheet: self.build.fonts_stylesheet.clone(),
            ..BuildConfig::for_profile(profile)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = ConfigFile::parse("").unwrap();

        assert_eq!(config.build.src, PathBuf::from("src"));
        assert!(config.build.clean);
        assert_eq!(config.serve.port, None);
    }

    #[test]
    fn reads_sections() {
        let config = ConfigFile::parse(
            r#"
[build]
src = "site"
clean = false

[serve]
port = 8080
"#,
        )
        .unwrap();

        assert_eq!(config.build.src, PathBuf::from("site"));
        assert!(!config.build.clean);
        assert_eq!(
            config.build.fonts_stylesheet,
            PathBuf::from("src/scss/base/_fontsAutoGen.scss")
        );
        assert_eq!(config.serve.port, Some(8080));

        let build = config.build_config(Profile::Docs);
        assert_eq!(build.src_dir, PathBuf::from("site"));
        assert_eq!(build.output_dir, PathBuf::from("docs"));
        assert!(build.minify);
        assert!(!build.clean);
    }

    #[test]
    fn rejects_malformed_file() {
        assert!(ConfigFile::parse("[build\nsrc = 1").is_err());
        assert!(ConfigFile::parse("[build]\nclean = \"yes\"").is_err());
    }

    #[test]
    fn missing_file_is_default() {
        let config = ConfigFile::load(Path::new("does/not/exist/trellis.toml")).unwrap();

        assert_eq!(config.build.src, PathBuf::from("src"));
    }
}
