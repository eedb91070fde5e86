//! 재시도 관리자 - per-identifier retry/backoff engine
//!
//! Each URL gets a fresh [`RetryEngine`]. Failures are classified into two
//! kinds with independent budgets and fixed sleeps; the (budget + 1)-th
//! occurrence of a kind is fatal. Parse failures are not seen here.

use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::infrastructure::http_client::{FetchError, FetchedPage, PageFetcher};

/// 실패 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Transport-level connection failure
    ConnectionLost,
    /// HTTP 429 Too Many Requests
    RateLimited,
}

impl FailureKind {
    /// Classify one fetch outcome; `None` means the page goes on to the parser
    pub fn classify(outcome: &Result<FetchedPage, FetchError>) -> Option<Self> {
        match outcome {
            Ok(page) if page.is_rate_limited() => Some(Self::RateLimited),
            Ok(_) => None,
            Err(_) => Some(Self::ConnectionLost),
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionLost => f.write_str("connection lost"),
            Self::RateLimited => f.write_str("rate limited"),
        }
    }
}

/// Budgets and fixed sleeps for both failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub connection_lost_budget: u32,
    pub connection_lost_delay: Duration,
    pub rate_limited_budget: u32,
    pub rate_limited_delay: Duration,
}

impl RetryPolicy {
    pub fn budget(&self, kind: FailureKind) -> u32 {
        match kind {
            FailureKind::ConnectionLost => self.connection_lost_budget,
            FailureKind::RateLimited => self.rate_limited_budget,
        }
    }

    pub fn delay(&self, kind: FailureKind) -> Duration {
        match kind {
            FailureKind::ConnectionLost => self.connection_lost_delay,
            FailureKind::RateLimited => self.rate_limited_delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        crate::infrastructure::config::RetryConfig::default().policy()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Idle,
    Attempting,
    Retrying { kind: FailureKind, attempt: u32 },
    Success,
    Fatal { kind: FailureKind },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter(Duration),
    Exhausted,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RetryError {
    #[error("connection lost {attempts} times fetching {url}: {last_error}")]
    ConnectionLost {
        url: String,
        attempts: u32,
        last_error: String,
    },

    #[error("rate limited {attempts} times fetching {url}")]
    RateLimited { url: String, attempts: u32 },
}

impl RetryError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::ConnectionLost { .. } => FailureKind::ConnectionLost,
            Self::RateLimited { .. } => FailureKind::RateLimited,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::ConnectionLost { url, .. } | Self::RateLimited { url, .. } => url,
        }
    }
}

/// Retry state for a single identifier
#[derive(Debug, Clone)]
pub struct RetryEngine {
    policy: RetryPolicy,
    connection_lost: u32,
    rate_limited: u32,
    state: AttemptState,
}

impl RetryEngine {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            connection_lost: 0,
            rate_limited: 0,
            state: AttemptState::Idle,
        }
    }

    pub fn state(&self) -> AttemptState {
        self.state
    }

    /// Retries already spent on `kind`
    pub fn retries(&self, kind: FailureKind) -> u32 {
        match kind {
            FailureKind::ConnectionLost => self.connection_lost,
            FailureKind::RateLimited => self.rate_limited,
        }
    }

    pub fn begin_attempt(&mut self) {
        self.state = AttemptState::Attempting;
    }

    pub fn record_success(&mut self) {
        self.state = AttemptState::Success;
    }

    /// Count one failure and decide whether to retry
    pub fn record_failure(&mut self, kind: FailureKind) -> RetryDecision {
        let budget = self.policy.budget(kind);
        let counter = match kind {
            FailureKind::ConnectionLost => &mut self.connection_lost,
            FailureKind::RateLimited => &mut self.rate_limited,
        };

        if *counter >= budget {
            self.state = AttemptState::Fatal { kind };
            return RetryDecision::Exhausted;
        }

        *counter += 1;
        self.state = AttemptState::Retrying {
            kind,
            attempt: *counter,
        };
        RetryDecision::RetryAfter(self.policy.delay(kind))
    }

    /// Fetch `url`, sleeping and retrying on classified failures until the
    /// page arrives or a budget runs out.
    pub async fn fetch<F>(mut self, fetcher: &F, url: &str) -> Result<FetchedPage, RetryError>
    where
        F: PageFetcher + ?Sized,
    {
        loop {
            self.begin_attempt();
            let (kind, last_error) = match fetcher.fetch(url).await {
                Ok(page) if !page.is_rate_limited() => {
                    self.record_success();
                    return Ok(page);
                }
                Ok(page) => (FailureKind::RateLimited, format!("HTTP {}", page.status)),
                Err(e) => (FailureKind::ConnectionLost, e.to_string()),
            };

            match self.record_failure(kind) {
                RetryDecision::RetryAfter(delay) => {
                    warn!(
                        "🔄 {} for {} ({}/{}), retrying in {:?}",
                        kind,
                        url,
                        self.retries(kind),
                        self.policy.budget(kind),
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::Exhausted => {
                    warn!("❌ {} budget exhausted for {}", kind, url);
                    return Err(self.exhausted(url, kind, &last_error));
                }
            }
            debug!("Retrying {} (state: {:?})", url, self.state);
        }
    }

    fn exhausted(&self, url: &str, kind: FailureKind, last_error: &str) -> RetryError {
        let attempts = self.retries(kind) + 1;
        match kind {
            FailureKind::ConnectionLost => RetryError::ConnectionLost {
                url: url.to_string(),
                attempts,
                last_error: last_error.to_string(),
            },
            FailureKind::RateLimited => RetryError::RateLimited {
                url: url.to_string(),
                attempts,
            },
        }
    }
}
