//! Infrastructure layer for HTTP access, parsing, flat-file storage and configuration
//!
//! This module provides the reqwest page fetcher, the retry/backoff engine,
//! ufcstats.com page parsers, the CSV-backed frontier and dataset stores,
//! configuration management and logging.

pub mod config;  // Configuration constants and helpers
pub mod logging;  // Logging infrastructure
pub mod http_client;
pub mod retry_manager;
pub mod parsing;
pub mod frontier_store;
pub mod dataset_store;

// Re-export commonly used items
pub use config::{AppConfig, ConfigManager, LoggingConfig};
pub use http_client::{FetchError, FetchedPage, HttpClient, PageFetcher};
pub use retry_manager::{FailureKind, RetryEngine, RetryError, RetryPolicy};
pub use frontier_store::{pending, FrontierStore};
pub use dataset_store::{DatasetStore, DatasetWriter, StoreError};
pub use logging::init_logging_with_config;
