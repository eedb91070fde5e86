//! Entity scrape loop
//!
//! For one entity: pending URLs from the frontier, then fetch (through a fresh
//! retry engine per URL), pace, parse and append. Parse failures skip the URL;
//! an exhausted retry budget or a storage failure ends the run for that entity.
//! Rows appended before a fatal error stay on disk.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{DatasetRecord, EntityKind, FrontierKind, TableError};
use crate::infrastructure::parsing::{EntityParser, ParsingError};
use crate::infrastructure::{
    pending, DatasetStore, FrontierStore, PageFetcher, RetryEngine, RetryError, RetryPolicy,
    StoreError,
};

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("{entity} scrape stopped after {scraped} pages: {source}")]
    Fetch {
        entity: EntityKind,
        scraped: usize,
        #[source]
        source: RetryError,
    },

    #[error("link discovery for {frontier} stopped: {source}")]
    Discovery {
        frontier: FrontierKind,
        #[source]
        source: RetryError,
    },

    #[error("invalid base URL '{url}': {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("parser setup failed: {0}")]
    Parser(#[from] ParsingError),
}

/// Outcome of one entity run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeSummary {
    pub entity: EntityKind,
    /// URLs left after dedup
    pub pending: usize,
    /// Pages parsed and appended
    pub scraped: usize,
    /// Pages whose parse failed
    pub skipped: usize,
    pub rows_appended: usize,
}

impl ScrapeSummary {
    pub fn empty(entity: EntityKind) -> Self {
        Self {
            entity,
            pending: 0,
            scraped: 0,
            skipped: 0,
            rows_appended: 0,
        }
    }
}

/// Collaborators shared by every entity loop
#[derive(Clone)]
pub struct ScrapeContext {
    fetcher: Arc<dyn PageFetcher>,
    frontiers: FrontierStore,
    datasets: DatasetStore,
    policy: RetryPolicy,
    pacing: Duration,
}

impl ScrapeContext {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        frontiers: FrontierStore,
        datasets: DatasetStore,
        policy: RetryPolicy,
        pacing: Duration,
    ) -> Self {
        Self {
            fetcher,
            frontiers,
            datasets,
            policy,
            pacing,
        }
    }

    pub fn datasets(&self) -> &DatasetStore {
        &self.datasets
    }

    /// URLs of `kind` not yet present in its dataset
    pub fn pending_urls(&self, kind: EntityKind) -> Result<Vec<String>, ScrapeError> {
        let candidates = self.frontiers.load(kind.frontier())?;
        let existing = self.datasets.load(kind)?;
        Ok(pending(&candidates, existing.as_ref(), kind.natural_key())?)
    }

    /// Run the loop for the entity `parser` produces
    pub async fn run<P: EntityParser>(&self, parser: &P) -> Result<ScrapeSummary, ScrapeError> {
        let kind = <P::Record as DatasetRecord>::KIND;
        let urls = self.pending_urls(kind)?;
        let mut summary = ScrapeSummary {
            pending: urls.len(),
            ..ScrapeSummary::empty(kind)
        };

        if urls.is_empty() {
            info!("✅ {} data already scraped or frontier is empty", kind);
            return Ok(summary);
        }

        let mut writer = self.datasets.open_writer(kind)?;
        info!("🚀 Scraping {} {} URLs...", urls.len(), kind);

        for (index, url) in urls.iter().enumerate() {
            debug!("[{}/{}] {}", index + 1, urls.len(), url);

            let page = RetryEngine::new(self.policy)
                .fetch(self.fetcher.as_ref(), url)
                .await
                .map_err(|source| ScrapeError::Fetch {
                    entity: kind,
                    scraped: summary.scraped,
                    source,
                })?;
            tokio::time::sleep(self.pacing).await;

            if page.status != 200 {
                debug!("HTTP {} for {}, handing to parser anyway", page.status, url);
            }

            match parser.parse(url, &page.body) {
                Ok(records) => {
                    for record in &records {
                        writer.append(record)?;
                    }
                    writer.flush()?;
                    summary.scraped += 1;
                    summary.rows_appended += records.len();
                }
                Err(e) => {
                    warn!("⚠️ Error scraping {} page {}: {}", kind, url, e);
                    summary.skipped += 1;
                }
            }
        }

        info!(
            "📊 {}/{} {} pages successfully scraped ({} rows)",
            summary.scraped, summary.pending, kind, summary.rows_appended
        );
        Ok(summary)
    }
}
