//! Relative asset path normalization for rendered pages and stylesheets.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Top-level directories of the output tree that pages link into.
pub const ASSET_DIRS: &[&str] = &[
    "img", "images", "fonts", "css", "scss", "sass", "js", "files", "audio", "video",
];

static HTML_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(src|href|srcset)=("[^"]*"|'[^']*')"#)
        .expect("Invalid attribute regex")
});

static CSS_PARENT_DIRS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)(?:\.\./)+((?:{})/)", ASSET_DIRS.join("|")))
        .expect("Invalid CSS path regex")
});

static WEBP_DIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(img|images)/([^"'\s/]+)\.webp/([^"'\s)]+\.webp)"#)
        .expect("Invalid webp regex")
});

/// Rewrite `src`, `href` and `srcset` values that point into an asset
/// directory so they are relative to the page: `../img/a.png` -> `./img/a.png`.
pub fn rewrite_html_paths(html: &str) -> String {
    HTML_ATTR
        .replace_all(html, |caps: &Captures| {
            let attr = &caps[1];
            let quoted = &caps[2];
            let quote = &quoted[..1];
            let value = &quoted[1..quoted.len() - 1];

            match normalize_asset_path(value) {
                Some(path) => format!("{}={}{}{}", attr, quote, path, quote),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Fold the `img/<dir>.webp/<name>.webp` artefact left by image conversion
/// back into `img/<dir>/<name>.webp` (also under `images/`).
pub fn collapse_webp_dirs(html: &str) -> String {
    WEBP_DIR.replace_all(html, "$1/$2/$3").into_owned()
}

/// Collapse repeated `../` before an asset directory in stylesheets:
/// `../../img/bg.png` -> `../img/bg.png`.
pub fn rewrite_css_paths(css: &str) -> String {
    CSS_PARENT_DIRS.replace_all(css, "../$1").into_owned()
}

/// Strip leading `./` and `../` segments and re-anchor the path at `./`
/// when it starts with an asset directory.
pub fn normalize_asset_path(value: &str) -> Option<String> {
    let mut rest = value;
    loop {
        if let Some(stripped) = rest.strip_prefix("./") {
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix("../") {
            rest = stripped;
        } else {
            break;
        }
    }

    let (dir, _) = rest.split_once('/')?;
    if ASSET_DIRS.iter().any(|d| d.eq_ignore_ascii_case(dir)) {
        Some(format!("./{}", rest))
    } else {
        None
    }
}
