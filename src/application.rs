//! Application layer module
//!
//! Use cases that orchestrate fetching, parsing and storage: link discovery,
//! the per-entity scrape loop, the normalisation stage and the pipeline that
//! sequences them.

pub mod scrape_loop;
pub mod url_discovery;
pub mod normalization;
pub mod pipeline;

pub use scrape_loop::{ScrapeContext, ScrapeError, ScrapeSummary};
pub use url_discovery::{DiscoverySummary, LinkDiscovery};
pub use normalization::{
    Datasets, NormalizationError, NormalizationReport, NormalizationStage, UnresolvedReference,
};
pub use pipeline::Pipeline;
