//! `@font-face` stylesheet generation from the fonts present in the output.

use std::collections::BTreeMap;
use std::fmt::Write as _;

/// A web font container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FontFormat {
    Woff2,
    Woff,
    TrueType,
    OpenType,
}

impl FontFormat {
    /// Detect the format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "woff2" => Some(Self::Woff2),
            "woff" => Some(Self::Woff),
            "ttf" => Some(Self::TrueType),
            "otf" => Some(Self::OpenType),
            _ => None,
        }
    }

    /// Value of the CSS `format()` hint.
    pub fn css_name(self) -> &'static str {
        match self {
            Self::Woff2 => "woff2",
            Self::Woff => "woff",
            Self::TrueType => "truetype",
            Self::OpenType => "opentype",
        }
    }
}

/// One `src` entry of a font face.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontSource {
    /// File name as found on disk
    pub file: String,
    pub format: FontFormat,
}

/// A font face assembled from files sharing a basename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFace {
    /// File name without extension, e.g. `Inter-Bold`
    pub basename: String,
    pub family: String,
    pub weight: u16,
    /// Sources ordered woff2, woff, ttf, otf
    pub sources: Vec<FontSource>,
}

/// Map a weight name such as `semibold` or `extra-bold` to its numeric
/// weight. Unknown names map to 400.
pub fn weight_for(name: &str) -> u16 {
    match name.trim().to_ascii_lowercase().as_str() {
        "thin" => 100,
        "extralight" | "extra-light" | "ultralight" => 200,
        "light" => 300,
        "regular" | "book" | "normal" => 400,
        "medium" => 500,
        "semibold" | "semi-bold" | "demibold" | "demi-bold" => 600,
        "bold" => 700,
        "extrabold" | "extra-bold" | "heavy" => 800,
        "black" => 900,
        _ => 400,
    }
}

/// Group font file names into faces. Files that are not fonts are ignored.
///
/// The family is the first `-` separated segment of the basename and the
/// weight comes from the second (`Inter-Bold.woff2` -> `Inter`, 700; no second
/// segment means regular).
pub fn discover_faces<S: AsRef<str>>(files: &[S]) -> Vec<FontFace> {
    let mut grouped: BTreeMap<String, Vec<FontSource>> = BTreeMap::new();

    for file in files {
        let file = file.as_ref();
        let Some((basename, ext)) = file.rsplit_once('.') else {
            continue;
        };
        let Some(format) = FontFormat::from_extension(ext) else {
            continue;
        };
        if basename.is_empty() {
            continue;
        }
        grouped
            .entry(basename.to_string())
            .or_default()
            .push(FontSource {
                file: file.to_string(),
                format,
            });
    }

    grouped
        .into_iter()
        .map(|(basename, mut sources)| {
            sources.sort_by_key(|s| s.format);
            sources.dedup_by_key(|s| s.format);

            let parts: Vec<&str> = basename.split('-').collect();
            let family = match parts[0] {
                "" => "Font".to_string(),
                name => name.to_string(),
            };
            let weight = weight_for(parts.get(1).copied().unwrap_or("regular"));

            FontFace {
                basename,
                family,
                weight,
                sources,
            }
        })
        .collect()
}

/// Render faces as `@font-face` rules with URLs under `url_prefix`.
pub fn render_stylesheet(faces: &[FontFace], url_prefix: &str) -> String {
    let mut out = String::new();

    for face in faces {
        let sources = face
            .sources
            .iter()
            .map(|s| {
                format!(
                    "url(\"{}{}\") format(\"{}\")",
                    url_prefix,
                    s.file,
                    s.format.css_name()
                )
            })
            .collect::<Vec<_>>()
            .join(", ");

        let _ = write!(
            out,
            "@font-face {{\n  font-family: \"{}\";\n  font-display: swap;\n  src: {};\n  font-weight: {};\n  font-style: normal;\n}}\n\n",
            face.family, sources, face.weight
        );
    }

    out
}
