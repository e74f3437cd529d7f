// Core data types
pub mod core;

// Analysis pipeline
pub mod analysis;
pub mod cache;
pub mod client;
pub mod config;
pub mod util;

// Re-export commonly used types for convenience
pub use analysis::{AnalysisReport, TokenAnalyzer};
pub use client::HeliusClient;
pub use config::AnalyzerConfig;
pub use self::core::*;
