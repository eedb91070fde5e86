//! Pipeline: link discovery → entity scrape loops → normalisation

use anyhow::{Context, Result};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::normalization::{NormalizationError, NormalizationReport, NormalizationStage};
use crate::application::scrape_loop::{ScrapeContext, ScrapeError, ScrapeSummary};
use crate::application::url_discovery::{DiscoverySummary, LinkDiscovery};
use crate::domain::EntityKind;
use crate::infrastructure::parsing::{EventParser, FightParser, FightStatParser, FighterParser};
use crate::infrastructure::{AppConfig, DatasetStore, FrontierStore, PageFetcher};

pub struct Pipeline {
    config: AppConfig,
    fetcher: Arc<dyn PageFetcher>,
}

impl Pipeline {
    pub fn new(config: AppConfig, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { config, fetcher }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn frontiers(&self) -> FrontierStore {
        FrontierStore::new(self.config.storage.urls_dir())
    }

    fn datasets(&self) -> DatasetStore {
        DatasetStore::new(self.config.storage.scraped_dir())
    }

    pub fn scrape_context(&self) -> ScrapeContext {
        ScrapeContext::new(
            Arc::clone(&self.fetcher),
            self.frontiers(),
            self.datasets(),
            self.config.retry.policy(),
            self.config.scrape.request_delay(),
        )
    }

    pub async fn discover_urls(&self) -> Result<DiscoverySummary, ScrapeError> {
        let discovery = LinkDiscovery::new(
            Arc::clone(&self.fetcher),
            self.frontiers(),
            self.config.retry.policy(),
            self.config.scrape.request_delay(),
            self.config.source.base_url.as_str(),
        )?;
        discovery.run().await
    }

    /// Scrape one entity, or all four in pipeline order
    pub async fn scrape(&self, only: Option<EntityKind>) -> Result<Vec<ScrapeSummary>, ScrapeError> {
        let kinds: Vec<EntityKind> = match only {
            Some(kind) => vec![kind],
            None => EntityKind::ALL.to_vec(),
        };
        let ctx = self.scrape_context();

        if self.config.scrape.concurrent_entities && kinds.len() > 1 {
            info!("⚡ Scraping {} entities concurrently", kinds.len());
            let results = join_all(kinds.iter().map(|&kind| scrape_entity(&ctx, kind))).await;

            let mut summaries = Vec::with_capacity(results.len());
            let mut first_error = None;
            for result in results {
                match result {
                    Ok(summary) => summaries.push(summary),
                    Err(e) => {
                        warn!("❌ {}", e);
                        first_error.get_or_insert(e);
                    }
                }
            }
            return match first_error {
                Some(e) => Err(e),
                None => Ok(summaries),
            };
        }

        let mut summaries = Vec::with_capacity(kinds.len());
        for kind in kinds {
            summaries.push(scrape_entity(&ctx, kind).await?);
        }
        Ok(summaries)
    }

    /// Runs on the blocking pool; the stage is synchronous file and CPU work
    pub async fn normalize(&self) -> Result<NormalizationReport, NormalizationError> {
        let stage = NormalizationStage::new(self.datasets(), self.config.storage.normalized_dir());
        tokio::task::spawn_blocking(move || stage.run())
            .await
            .map_err(|e| NormalizationError::Task(e.to_string()))?
    }

    pub async fn run_all(&self) -> Result<()> {
        info!("🚀 Scrapes all urls from {}", self.config.source.base_url);
        let discovered = self.discover_urls().await.context("link discovery failed")?;
        info!(
            "Frontiers: {} events, {} fights, {} fighters",
            discovered.events, discovered.fights, discovered.fighters
        );

        info!("Iterates through urls and scrapes key data into csv files");
        self.scrape(None).await.context("scraping failed")?;

        info!("Normalises tables for clean final output");
        self.normalize().await.context("normalisation failed")?;
        Ok(())
    }
}

async fn scrape_entity(ctx: &ScrapeContext, kind: EntityKind) -> Result<ScrapeSummary, ScrapeError> {
    match kind {
        EntityKind::Event => ctx.run(&EventParser::new()?).await,
        EntityKind::Fight => ctx.run(&FightParser::new()?).await,
        EntityKind::FightStat => ctx.run(&FightStatParser::new()?).await,
        EntityKind::Fighter => ctx.run(&FighterParser::new()?).await,
    }
}
