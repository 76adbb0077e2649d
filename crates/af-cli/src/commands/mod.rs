//! CLI subcommand implementations.

pub mod demo;
pub mod heatmap;
pub mod presets;
pub mod replay;
pub mod util;
