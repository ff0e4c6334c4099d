//! CLI command handling

pub mod output;
pub mod show_config;
pub mod simulate;

pub use output::*;
pub use show_config::*;
pub use simulate::*;
