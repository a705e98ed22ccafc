//! Static asset pass builder.

use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::assets::AssetPipeline;
use crate::fonts::{discover_faces, render_stylesheet, FontFormat};
use crate::paths::{collapse_webp_dirs, rewrite_html_paths};
use crate::sprite::{load_icons, render_sprite};
use crate::templates::{load_data, TemplateEngine};

/// Sprite location inside the output directory.
pub const SPRITE_PATH: &str = "img/svgsprite/sprite.symbol.svg";

/// Build profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Profile {
    /// Readable output in `build/`
    #[default]
    Dev,
    /// Publishable output in `docs/` with minified stylesheets
    Docs,
}

impl Profile {
    /// Default output directory for this profile.
    pub fn output_dir(self) -> PathBuf {
        match self {
            Profile::Dev => PathBuf::from("build"),
            Profile::Docs => PathBuf::from("docs"),
        }
    }

    /// Whether stylesheets are minified by default.
    pub fn minify(self) -> bool {
        matches!(self, Profile::Docs)
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dev" => Ok(Profile::Dev),
            "docs" => Ok(Profile::Docs),
            other => Err(format!("Unknown profile: {} (expected dev or docs)", other)),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Dev => write!(f, "dev"),
            Profile::Docs => write!(f, "docs"),
        }
    }
}

/// Configuration for an asset pass.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Source directory (`html/`, `css/`, `js/`, `img/`, `fonts/`, `files/`)
    pub src_dir: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    pub profile: Profile,

    /// Minify stylesheets
    pub minify: bool,

    /// Remove the output directory before building
    pub clean: bool,

    /// Where the generated `@font-face` stylesheet is written
    pub fonts_stylesheet: PathBuf,
}

impl BuildConfig {
    /// Defaults for `profile`, relative to the working directory.
    pub fn for_profile(profile: Profile) -> Self {
        Self {
            src_dir: PathBuf::from("src"),
            output_dir: profile.output_dir(),
            profile,
            minify: profile.minify(),
            clean: true,
            fonts_stylesheet: PathBuf::from("src/scss/base/_fontsAutoGen.scss"),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self::for_profile(Profile::Dev)
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of pages rendered
    pub pages: usize,

    /// Number of stylesheets written
    pub styles: usize,

    /// Number of scripts copied
    pub scripts: usize,

    /// Number of images and files copied
    pub assets: usize,

    /// Number of icons in the sprite
    pub icons: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,

    /// Per-file failures that did not stop the build
    pub failures: Vec<BuildError>,
}

/// Result of the fonts pass.
#[derive(Debug)]
pub struct FontsResult {
    /// Font files copied into the output
    pub files: usize,

    /// `@font-face` rules written
    pub faces: usize,

    /// Stylesheet path, if one was written
    pub stylesheet: Option<PathBuf>,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to read sources: {0}")]
    ReadError(String),

    #[error("Failed to render template: {path}: {message}")]
    TemplateError { path: String, message: String },

    #[error("Failed to process stylesheet: {path}: {message}")]
    CssError { path: String, message: String },

    #[error("Failed to write output: {0}")]
    WriteError(String),
}

/// A page to be rendered.
#[derive(Debug)]
struct PageInfo {
    /// Template name, the path relative to `src/html` with `/` separators
    name: String,

    /// Output path
    output_path: PathBuf,
}

/// Static asset builder.
pub struct StaticBuilder {
    config: BuildConfig,
}

impl StaticBuilder {
    /// Create a new builder.
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Run every stage: clean, images, pages, styles, scripts, files, sprite.
    ///
    /// A file that fails to render or minify is recorded in
    /// [`BuildResult::failures`] and the remaining files are still built.
    pub async fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        if !self.config.src_dir.is_dir() {
            return Err(BuildError::ReadError(format!(
                "Source directory not found: {}",
                self.config.src_dir.display()
            )));
        }

        if self.config.clean {
            self.clean()?;
        }

        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let mut failures = Vec::new();

        let images = self.copy_images()?;
        let pages = self.build_pages(&mut failures)?;
        let styles = self.build_styles(&mut failures)?;
        let scripts = AssetPipeline::copy_tree(
            &self.config.src_dir.join("js"),
            &self.config.output_dir.join("js"),
            |_| false,
        )?;
        let files = AssetPipeline::copy_tree(
            &self.config.src_dir.join("files"),
            &self.config.output_dir.join("files"),
            |_| false,
        )?;
        let icons = self.build_sprite()?;

        for failure in &failures {
            tracing::error!("{}", failure);
        }

        let duration = start.elapsed();

        Ok(BuildResult {
            pages,
            styles,
            scripts,
            assets: images + files,
            icons,
            duration_ms: duration.as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
            failures,
        })
    }

    /// Copy fonts into `<out>/fonts` and regenerate the font-face stylesheet
    /// from what landed there.
    pub async fn build_fonts(&self) -> Result<FontsResult, BuildError> {
        let fonts_out = self.config.output_dir.join("fonts");

        let files = AssetPipeline::copy_tree(&self.config.src_dir.join("fonts"), &fonts_out, |p| {
            p.components().count() > 1 || !is_font(p)
        })?;

        let mut names: Vec<String> = match fs::read_dir(&fonts_out) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .filter(|e| e.path().is_file())
                .filter_map(|e| e.file_name().to_str().map(str::to_string))
                .collect(),
            Err(_) => Vec::new(),
        };
        names.sort();

        let faces = discover_faces(&names);
        if faces.is_empty() {
            tracing::info!("No font files found in {}", fonts_out.display());
            return Ok(FontsResult {
                files,
                faces: 0,
                stylesheet: None,
            });
        }

        let stylesheet = &self.config.fonts_stylesheet;
        if let Some(parent) = stylesheet.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::WriteError(e.to_string()))?;
        }
        fs::write(stylesheet, render_stylesheet(&faces, "../fonts/"))
            .map_err(|e| BuildError::WriteError(format!("{}: {}", stylesheet.display(), e)))?;

        tracing::info!(
            "Wrote {} font faces to {}",
            faces.len(),
            stylesheet.display()
        );

        Ok(FontsResult {
            files,
            faces: faces.len(),
            stylesheet: Some(stylesheet.clone()),
        })
    }

    /// Remove the output directory, refusing when it would take the sources
    /// with it.
    fn clean(&self) -> Result<(), BuildError> {
        let out = &self.config.output_dir;
        if !out.exists() {
            return Ok(());
        }
        if self.config.src_dir.starts_with(out) {
            tracing::warn!(
                "Not cleaning {}: it contains the source directory",
                out.display()
            );
            return Ok(());
        }

        tracing::debug!("Cleaning {}", out.display());
        fs::remove_dir_all(out).map_err(|e| BuildError::WriteError(e.to_string()))
    }

    fn copy_images(&self) -> Result<usize, BuildError> {
        AssetPipeline::copy_tree(
            &self.config.src_dir.join("img"),
            &self.config.output_dir.join("img"),
            |p| p.starts_with("svgicons"),
        )
    }

    /// Discover page sources, skipping partials under `blocks/` and the
    /// `docs/` subtree.
    fn discover_pages(&self, html_dir: &Path) -> Vec<PageInfo> {
        let mut pages = Vec::new();

        for entry in WalkDir::new(html_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();

            if !path.is_file() {
                continue;
            }

            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if !ext.eq_ignore_ascii_case("html") {
                continue;
            }

            let relative = path.strip_prefix(html_dir).unwrap_or(path);
            if is_partial(relative) {
                continue;
            }

            let name = relative
                .components()
                .filter_map(|c| match c {
                    Component::Normal(s) => s.to_str(),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("/");

            pages.push(PageInfo {
                name,
                output_path: self.config.output_dir.join(relative),
            });
        }

        pages.sort_by(|a, b| a.name.cmp(&b.name));
        pages
    }

    fn build_pages(&self, failures: &mut Vec<BuildError>) -> Result<usize, BuildError> {
        let html_dir = self.config.src_dir.join("html");
        if !html_dir.is_dir() {
            tracing::debug!("No pages directory at {}", html_dir.display());
            return Ok(0);
        }

        let data = load_data(&html_dir.join("data.json"))?;
        let templates = TemplateEngine::new(&html_dir);
        let pages = self.discover_pages(&html_dir);

        let results: Vec<Result<(), BuildError>> = pages
            .par_iter()
            .map(|page| self.build_page(&templates, page, &data))
            .collect();

        let mut built = 0;
        for result in results {
            match result {
                Ok(()) => built += 1,
                Err(e @ BuildError::TemplateError { .. }) => failures.push(e),
                Err(e) => return Err(e),
            }
        }

        tracing::debug!("Rendered {} of {} pages", built, pages.len());
        Ok(built)
    }

    fn build_page(
        &self,
        templates: &TemplateEngine,
        page: &PageInfo,
        data: &serde_json::Value,
    ) -> Result<(), BuildError> {
        let html = templates
            .render_page(&page.name, data)
            .map_err(|e| BuildError::TemplateError {
                path: page.name.clone(),
                message: e.to_string(),
            })?;

        let html = collapse_webp_dirs(&rewrite_html_paths(&html));

        if let Some(parent) = page.output_path.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::WriteError(e.to_string()))?;
        }

        fs::write(&page.output_path, html).map_err(|e| BuildError::WriteError(e.to_string()))
    }

    fn build_styles(&self, failures: &mut Vec<BuildError>) -> Result<usize, BuildError> {
        let mut sheets = Vec::new();

        for source in stylesheet_sources(&self.config.src_dir.join("css"), "css")? {
            let css = fs::read_to_string(&source)
                .map_err(|e| BuildError::ReadError(format!("{}: {}", source.display(), e)))?;
            sheets.push((source, css));
        }

        let scss_dir = self.config.src_dir.join("scss");
        for source in stylesheet_sources(&scss_dir, "scss")? {
            let is_partial = source
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with('_'));
            if is_partial {
                continue;
            }

            match AssetPipeline::compile_scss(&source, &scss_dir) {
                Ok(css) => sheets.push((source, css)),
                Err(message) => failures.push(BuildError::CssError {
                    path: source.display().to_string(),
                    message,
                }),
            }
        }

        let out_dir = self.config.output_dir.join("css");
        let mut written = 0;

        for (source, css) in sheets {
            let processed = match AssetPipeline::process_stylesheet(&css, self.config.minify) {
                Ok(processed) => processed,
                Err(message) => {
                    failures.push(BuildError::CssError {
                        path: source.display().to_string(),
                        message,
                    });
                    continue;
                }
            };

            let Some(stem) = source.file_stem() else {
                continue;
            };
            let mut file_name = stem.to_os_string();
            file_name.push(".css");
            let target = out_dir.join(file_name);
            fs::create_dir_all(&out_dir).map_err(|e| BuildError::WriteError(e.to_string()))?;
            fs::write(&target, processed)
                .map_err(|e| BuildError::WriteError(format!("{}: {}", target.display(), e)))?;
            written += 1;
        }

        Ok(written)
    }

    fn build_sprite(&self) -> Result<usize, BuildError> {
        let symbols = load_icons(&self.config.src_dir.join("img").join("svgicons"))?;
        if symbols.is_empty() {
            return Ok(0);
        }

        let target = self.config.output_dir.join(SPRITE_PATH);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::WriteError(e.to_string()))?;
        }
        fs::write(&target, render_sprite(&symbols))
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        tracing::debug!("Wrote {} icons to {}", symbols.len(), target.display());
        Ok(symbols.len())
    }
}

/// Top-level files in `dir` with extension `ext`, sorted. A missing
/// directory yields nothing.
fn stylesheet_sources(dir: &Path, ext: &str) -> Result<Vec<PathBuf>, BuildError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut sources: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| BuildError::ReadError(format!("{}: {}", dir.display(), e)))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case(ext))
        })
        .collect();
    sources.sort();

    Ok(sources)
}

/// Partials live under any `blocks/` directory; `docs/` holds reference pages.
fn is_partial(relative: &Path) -> bool {
    relative.starts_with("docs")
        || relative
            .parent()
            .is_some_and(|dir| dir.components().any(|c| c.as_os_str() == "blocks"))
}

fn is_font(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(FontFormat::from_extension)
        .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn config(root: &Path, profile: Profile) -> BuildConfig {
        BuildConfig {
            src_dir: root.join("src"),
            output_dir: root.join(profile.output_dir()),
            fonts_stylesheet: root.join("src/scss/base/_fontsAutoGen.scss"),
            ..BuildConfig::for_profile(profile)
        }
    }

    #[test]
    fn parses_profiles() {
        assert_eq!("dev".parse::<Profile>().unwrap(), Profile::Dev);
        assert_eq!("DOCS".parse::<Profile>().unwrap(), Profile::Docs);
        assert!("prod".parse::<Profile>().is_err());
        assert_eq!(Profile::Docs.to_string(), "docs");
        assert!(Profile::Docs.minify());
        assert!(!Profile::Dev.minify());
        assert_eq!(BuildConfig::default().output_dir, PathBuf::from("build"));
    }

    #[test]
    fn detects_partials() {
        assert!(is_partial(Path::new("blocks/header.html")));
        assert!(is_partial(Path::new("pages/blocks/card.html")));
        assert!(is_partial(Path::new("docs/guide.html")));
        assert!(!is_partial(Path::new("index.html")));
        assert!(!is_partial(Path::new("blocks.html")));
    }

    #[tokio::test]
    async fn builds_simple_site() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("src");

        write(
            &src.join("html/index.html"),
            "{% include \"blocks/head.html\" %}<img src=\"../img/logo.png\"><p>{{ company }}</p>",
        );
        write(
            &src.join("html/blocks/head.html"),
            "<link rel=\"stylesheet\" href=\"../../css/main.css\">",
        );
        write(&src.join("html/docs/notes.html"), "reference");
        write(&src.join("html/data.json"), r#"{ "company": "Acme" }"#);
        write(&src.join("css/main.css"), ".a { background: url(../../img/bg.png); }\n");
        write(&src.join("js/index.js"), "console.log(1);\n");
        write(&src.join("img/logo.png"), "png");
        write(&src.join("files/brochure.pdf"), "pdf");
        write(
            &src.join("img/svgicons/arrow.svg"),
            "<svg viewBox=\"0 0 8 8\"><path fill=\"#000\" d=\"M0 0\"/></svg>",
        );

        let builder = StaticBuilder::new(config(temp.path(), Profile::Dev));
        let result = builder.build().await.unwrap();
        let out = temp.path().join("build");

        assert_eq!(result.pages, 1);
        assert_eq!(result.styles, 1);
        assert_eq!(result.scripts, 1);
        assert_eq!(result.assets, 2);
        assert_eq!(result.icons, 1);
        assert!(result.failures.is_empty());

        assert_eq!(
            fs::read_to_string(out.join("index.html")).unwrap(),
            "<link rel=\"stylesheet\" href=\"./css/main.css\"><img src=\"./img/logo.png\"><p>Acme</p>"
        );
        assert!(!out.join("blocks").exists());
        assert!(!out.join("docs").exists());
        assert_eq!(
            fs::read_to_string(out.join("css/main.css")).unwrap(),
            ".a { background: url(../img/bg.png); }\n"
        );
        assert_eq!(
            fs::read_to_string(out.join("js/index.js")).unwrap(),
            "console.log(1);\n"
        );
        assert!(out.join("img/logo.png").exists());
        assert!(!out.join("img/svgicons").exists());
        assert!(out.join("files/brochure.pdf").exists());

        let sprite = fs::read_to_string(out.join(SPRITE_PATH)).unwrap();
        assert!(sprite.contains("<symbol id=\"arrow\" viewBox=\"0 0 8 8\"><path d=\"M0 0\"/></symbol>"));
    }

    #[tokio::test]
    async fn docs_profile_minifies_styles() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("src");
        write(&src.join("css/main.css"), ".a {\n  color: red;\n}\n");

        let builder = StaticBuilder::new(config(temp.path(), Profile::Docs));
        let result = builder.build().await.unwrap();

        assert_eq!(result.output_dir, temp.path().join("docs"));
        let css = fs::read_to_string(temp.path().join("docs/css/main.css")).unwrap();
        assert!(!css.contains('\n'));
        assert!(css.contains(".a{color:red}"));
    }

    #[tokio::test]
    async fn compiles_scss_entry_points() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("src");
        write(&src.join("scss/base/_vars.scss"), "$accent: #ff0000;\n");
        write(
            &src.join("scss/main.scss"),
            "@use \"base/vars\";\n.hero {\n  color: vars.$accent;\n  .title { background: url(../../img/hero.jpg); }\n}\n",
        );
        write(&src.join("scss/_mixins.scss"), "@mixin none {}\n");
        write(&src.join("scss/broken.scss"), ".a { color: $missing; }\n");

        let builder = StaticBuilder::new(config(temp.path(), Profile::Dev));
        let result = builder.build().await.unwrap();

        assert_eq!(result.styles, 1);
        let css = fs::read_to_string(temp.path().join("build/css/main.css")).unwrap();
        assert!(css.contains(".hero .title"));
        assert!(css.contains("#ff0000") || css.contains("red"));
        assert!(css.contains("url(../img/hero.jpg)"));
        assert!(!temp.path().join("build/css/_mixins.css").exists());
        assert!(result
            .failures
            .iter()
            .any(|f| matches!(f, BuildError::CssError { path, .. } if path.ends_with("broken.scss"))));
    }

    #[tokio::test]
    async fn records_failures_and_keeps_going() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("src");
        write(&src.join("html/broken.html"), "{% include \"blocks/missing.html\" %}");
        write(&src.join("html/index.html"), "<p>ok</p>");
        write(&src.join("css/bad.css"), "..nope { color: red; }");
        write(&src.join("css/good.css"), ".b { color: blue; }");

        let builder = StaticBuilder::new(config(temp.path(), Profile::Docs));
        let result = builder.build().await.unwrap();

        assert_eq!(result.pages, 1);
        assert_eq!(result.styles, 1);
        assert_eq!(result.failures.len(), 2);
        assert!(result
            .failures
            .iter()
            .any(|f| matches!(f, BuildError::TemplateError { path, .. } if path == "broken.html")));
        assert!(result
            .failures
            .iter()
            .any(|f| matches!(f, BuildError::CssError { .. })));
        assert!(temp.path().join("docs/index.html").exists());
    }

    #[tokio::test]
    async fn cleans_stale_output() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("src")).unwrap();
        write(&temp.path().join("build/stale.html"), "old");

        let builder = StaticBuilder::new(config(temp.path(), Profile::Dev));
        builder.build().await.unwrap();

        assert!(!temp.path().join("build/stale.html").exists());
        assert!(temp.path().join("build").exists());
    }

    #[test]
    fn missing_source_is_an_error() {
        let temp = tempdir().unwrap();

        let builder = StaticBuilder::new(config(temp.path(), Profile::Dev));

        assert!(matches!(
            tokio_test::block_on(builder.build()),
            Err(BuildError::ReadError(_))
        ));
    }

    #[tokio::test]
    async fn generates_font_stylesheet() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("src");
        write(&src.join("fonts/Inter-Bold.woff2"), "w2");
        write(&src.join("fonts/Inter-Bold.ttf"), "ttf");
        write(&src.join("fonts/Inter-Regular.woff"), "w1");
        write(&src.join("fonts/LICENSE.txt"), "license");

        let builder = StaticBuilder::new(config(temp.path(), Profile::Dev));
        let result = builder.build_fonts().await.unwrap();

        assert_eq!(result.files, 3);
        assert_eq!(result.faces, 2);
        assert!(temp.path().join("build/fonts/Inter-Bold.woff2").exists());
        assert!(!temp.path().join("build/fonts/LICENSE.txt").exists());

        let css = fs::read_to_string(result.stylesheet.unwrap()).unwrap();
        assert!(css.contains(
            "src: url(\"../fonts/Inter-Bold.woff2\") format(\"woff2\"), url(\"../fonts/Inter-Bold.ttf\") format(\"truetype\");"
        ));
        assert!(css.contains("font-weight: 400;"));
    }

    #[tokio::test]
    async fn fonts_without_files_leave_stylesheet_alone() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("src")).unwrap();
        let stylesheet = temp.path().join("src/scss/base/_fontsAutoGen.scss");
        write(&stylesheet, "/* hand written */");

        let builder = StaticBuilder::new(config(temp.path(), Profile::Dev));
        let result = builder.build_fonts().await.unwrap();

        assert_eq!(result.faces, 0);
        assert!(result.stylesheet.is_none());
        assert_eq!(fs::read_to_string(stylesheet).unwrap(), "/* hand written */");
    }
}
