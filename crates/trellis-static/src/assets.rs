//! Asset pipeline for stylesheets and copied trees.

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::builder::BuildError;
use crate::paths::rewrite_css_paths;

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// Normalize asset paths in a stylesheet and minify it when asked.
    pub fn process_stylesheet(css: &str, minify: bool) -> Result<String, String> {
        let css = rewrite_css_paths(css);
        if minify {
            Self::minify_css(&css)
        } else {
            Ok(css)
        }
    }

    /// Compile an SCSS entry point with grass. `@use` paths resolve against
    /// the entry's directory and then `load_path`.
    pub fn compile_scss(path: &Path, load_path: &Path) -> Result<String, String> {
        let options = grass::Options::default().load_path(load_path);
        grass::from_path(path, &options).map_err(|e| format!("SCSS compile error: {}", e))
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, String> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS minify error: {}", e))?;

        Ok(minified.code)
    }

    /// Copy every file under `src` into `dest`, keeping relative paths.
    ///
    /// Paths for which `skip` returns true (relative to `src`) are left out.
    /// A missing `src` copies nothing. Returns the number of files copied.
    pub fn copy_tree<F>(src: &Path, dest: &Path, skip: F) -> Result<usize, BuildError>
    where
        F: Fn(&Path) -> bool,
    {
        if !src.is_dir() {
            return Ok(0);
        }

        let mut copied = 0;
        for entry in WalkDir::new(src)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(src).unwrap_or(path);
            if skip(relative) {
                continue;
            }

            let target = dest.join(relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| BuildError::WriteError(e.to_string()))?;
            }
            fs::copy(path, &target)
                .map_err(|e| BuildError::WriteError(format!("{}: {}", target.display(), e)))?;
            copied += 1;
        }

        Ok(copied)
    }
}
