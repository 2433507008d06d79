pub mod args;
pub mod commands;

pub use args::{Cli, Commands, EncodeOptions};
pub use commands::{run, setup_logging};
