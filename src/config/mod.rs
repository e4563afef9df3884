//! Configuration management for ugen

pub mod config;
pub mod coverage;
pub mod generation;
pub mod history;
pub mod llm;

#[cfg(test)]
mod tests;

// Re-export main types for convenience
pub use config::{Config, CONFIG_FILE_NAMES};
pub use coverage::CoverageConfig;
pub use generation::GenerationConfig;
pub use history::HistoryConfig;
pub use llm::LlmConfig;
