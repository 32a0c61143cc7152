pub mod args;
pub mod commands;
pub mod output;

pub use args::{Cli, Commands, OutputFormat};
pub use commands::run;
