//! Configuration file loading for tutor-reasoning
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `TUTOR_*` environment variables (`__` separates nested keys)
//! 2. `--config <path>` specified file
//! 3. Project root: `./reasoning.toml` or `./.reasoning.toml`
//! 4. Global: `~/.config/tutor-reasoning/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileGeminiConfig, FileLoggingConfig, FileOllamaConfig,
    FileOpenAiConfig, FileOrchestrationConfig, FileOutputConfig, FileProvidersConfig,
    FileRoutingConfig, FileToolsConfig,
};
pub use loader::ConfigLoader;
