//! SVG symbol sprite assembly.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::builder::BuildError;

static SVG_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<svg\b([^>]*)>").expect("Invalid svg tag regex"));

static VIEW_BOX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bviewBox=("([^"]*)"|'([^']*)')"#).expect("Invalid viewBox regex")
});

static PAINT_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s(?:fill|stroke)=("[^"]*"|'[^']*')"#).expect("Invalid paint regex")
});

/// One icon converted to a `<symbol>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Symbol id, the icon file stem
    pub id: String,
    pub view_box: Option<String>,
    /// Inner markup with paint attributes removed
    pub body: String,
}

impl Symbol {
    /// Parse an icon document. Returns `None` when there is no `<svg>` root.
    pub fn parse(id: &str, svg: &str) -> Option<Self> {
        let open = SVG_OPEN.captures(svg)?;
        let attrs = open.get(1).map_or("", |m| m.as_str());
        let start = open.get(0)?.end();

        let end = svg.rfind("</svg>").filter(|&end| end >= start)?;
        let inner = &svg[start..end];

        let view_box = VIEW_BOX.captures(attrs).and_then(|caps| {
            caps.get(2)
                .or_else(|| caps.get(3))
                .map(|m| m.as_str().to_string())
        });

        Some(Self {
            id: id.to_string(),
            view_box,
            body: PAINT_ATTR.replace_all(inner.trim(), "").into_owned(),
        })
    }

    fn render(&self) -> String {
        match &self.view_box {
            Some(view_box) => format!(
                "<symbol id=\"{}\" viewBox=\"{}\">{}</symbol>",
                self.id, view_box, self.body
            ),
            None => format!("<symbol id=\"{}\">{}</symbol>", self.id, self.body),
        }
    }
}

/// Wrap symbols in a single hidden sprite document.
pub fn render_sprite(symbols: &[Symbol]) -> String {
    let mut out = String::from(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" style=\"position:absolute;width:0;height:0\">",
    );
    for symbol in symbols {
        out.push_str(&symbol.render());
    }
    out.push_str("</svg>");
    out
}

/// Load every `*.svg` directly inside `dir`, sorted by file name.
///
/// A missing directory yields no symbols. Files that are not SVG documents
/// are skipped with a warning.
pub fn load_icons(dir: &Path) -> Result<Vec<Symbol>, BuildError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut paths: Vec<_> = fs::read_dir(dir)
        .map_err(|e| BuildError::ReadError(format!("{}: {}", dir.display(), e)))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("svg"))
        })
        .collect();
    paths.sort();

    let mut symbols = Vec::with_capacity(paths.len());
    for path in paths {
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("icon");
        let source = fs::read_to_string(&path)
            .map_err(|e| BuildError::ReadError(format!("{}: {}", path.display(), e)))?;

        match Symbol::parse(stem, &source) {
            Some(symbol) => symbols.push(symbol),
            None => tracing::warn!("Skipping {}: no <svg> element", path.display()),
        }
    }

    Ok(symbols)
}
