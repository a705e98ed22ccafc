//! Static asset pass for trellis sites.
//!
//! Renders page templates, normalizes asset paths, processes stylesheets,
//! copies scripts, images and files, and assembles the SVG icon sprite.

pub mod assets;
pub mod builder;
pub mod fonts;
pub mod paths;
pub mod sprite;
pub mod templates;

pub use builder::{BuildConfig, BuildError, BuildResult, FontsResult, Profile, StaticBuilder};
