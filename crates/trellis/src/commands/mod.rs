pub mod build;
pub mod dev;
pub mod fonts;
pub mod serve;
