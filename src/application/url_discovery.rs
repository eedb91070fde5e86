//! Link discovery: builds the three frontier files from the listing pages
//!
//! 1. completed events listing → event frontier
//! 2. each event page → fight frontier (shared with fight stats)
//! 3. alphabetical fighter listings `a..z` → fighter frontier

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

use crate::application::scrape_loop::ScrapeError;
use crate::domain::FrontierKind;
use crate::infrastructure::parsing::LinkParser;
use crate::infrastructure::{FetchedPage, FrontierStore, PageFetcher, RetryEngine, RetryError, RetryPolicy};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscoverySummary {
    pub events: usize,
    pub fights: usize,
    pub fighters: usize,
}

pub struct LinkDiscovery {
    fetcher: Arc<dyn PageFetcher>,
    frontiers: FrontierStore,
    links: LinkParser,
    policy: RetryPolicy,
    pacing: Duration,
    base_url: String,
}

/// Drop repeated links, keeping first occurrences in order
fn dedup_in_order(links: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    links.into_iter().filter(|link| seen.insert(link.clone())).collect()
}

impl LinkDiscovery {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        frontiers: FrontierStore,
        policy: RetryPolicy,
        pacing: Duration,
        base_url: impl Into<String>,
    ) -> Result<Self, ScrapeError> {
        let base_url = base_url.into();
        Url::parse(&base_url).map_err(|source| ScrapeError::BaseUrl {
            url: base_url.clone(),
            source,
        })?;

        Ok(Self {
            fetcher,
            frontiers,
            links: LinkParser::new()?,
            policy,
            pacing,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn events_listing_url(&self) -> String {
        format!("{}/statistics/events/completed?page=all", self.base_url)
    }

    pub fn fighters_listing_url(&self, letter: char) -> String {
        format!("{}/statistics/fighters?char={}&page=all", self.base_url, letter)
    }

    async fn fetch(&self, url: &str) -> Result<FetchedPage, RetryError> {
        RetryEngine::new(self.policy).fetch(self.fetcher.as_ref(), url).await
    }

    pub async fn discover_events(&self) -> Result<Vec<String>, ScrapeError> {
        info!("🔍 Scraping event links from {}", self.base_url);
        let page = self
            .fetch(&self.events_listing_url())
            .await
            .map_err(|source| ScrapeError::Discovery {
                frontier: FrontierKind::Events,
                source,
            })?;

        let events = dedup_in_order(self.links.event_links(&page.body));
        self.frontiers.save(FrontierKind::Events, &events)?;
        info!("{} event links successfully scraped", events.len());
        Ok(events)
    }

    pub async fn discover_fights(&self, event_urls: &[String]) -> Result<Vec<String>, ScrapeError> {
        info!("🔍 Scraping fight links from {} event pages", event_urls.len());
        let mut fights = Vec::new();
        for url in event_urls {
            let page = self.fetch(url).await.map_err(|source| ScrapeError::Discovery {
                frontier: FrontierKind::Fights,
                source,
            })?;
            fights.extend(self.links.fight_links(&page.body));
            tokio::time::sleep(self.pacing).await;
        }

        let fights = dedup_in_order(fights);
        self.frontiers.save(FrontierKind::Fights, &fights)?;
        info!("{} fight links successfully scraped", fights.len());
        Ok(fights)
    }

    /// A letter that stays rate limited is skipped; connection loss is fatal
    pub async fn discover_fighters(&self) -> Result<Vec<String>, ScrapeError> {
        info!("🔍 Scraping fighter links from {}", self.base_url);
        let mut fighters = Vec::new();
        for letter in 'a'..='z' {
            match self.fetch(&self.fighters_listing_url(letter)).await {
                Ok(page) => {
                    fighters.extend(self.links.fighter_links(&page.body));
                    tokio::time::sleep(self.pacing).await;
                }
                Err(e @ RetryError::RateLimited { .. }) => {
                    warn!("Too many 429 responses for letter '{}', skipping: {}", letter, e);
                }
                Err(source) => {
                    return Err(ScrapeError::Discovery {
                        frontier: FrontierKind::Fighters,
                        source,
                    });
                }
            }
        }

        let fighters = dedup_in_order(fighters);
        self.frontiers.save(FrontierKind::Fighters, &fighters)?;
        info!("{} fighter links successfully scraped", fighters.len());
        Ok(fighters)
    }

    pub async fn run(&self) -> Result<DiscoverySummary, ScrapeError> {
        let events = self.discover_events().await?;
        let fights = self.discover_fights(&events).await?;
        let fighters = self.discover_fighters().await?;
        Ok(DiscoverySummary {
            events: events.len(),
            fights: fights.len(),
            fighters: fighters.len(),
        })
    }
}
