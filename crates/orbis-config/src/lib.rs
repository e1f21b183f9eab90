//! Configuration for the Orbis planet generator.
//!
//! Settings persist to disk as RON and can be overridden from the command
//! line. Missing sections and fields fall back to defaults, so older config
//! files keep loading as new options appear.

mod cli;
mod config;
mod error;

pub use cli::{CliArgs, TriangulationArg};
pub use config::{CONFIG_FILE_NAME, Config, DebugConfig, GenerationConfig, default_config_dir};
pub use error::ConfigError;
