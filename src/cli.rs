//! Command line entry point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::application::Pipeline;
use crate::domain::EntityKind;
use crate::infrastructure::{init_logging_with_config, AppConfig, ConfigManager, HttpClient};

/// Incremental ufcstats.com harvester
#[derive(Parser, Debug)]
#[command(name = "ufcstats-harvester", version)]
#[command(about = "Scrape ufcstats.com into CSV datasets and normalise them into relational tables")]
pub struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Root directory for urls/, scraped_files/ and normalized/
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Discover event, fight and fighter URLs
    Urls,

    /// Scrape pending pages into the staging datasets
    Scrape {
        /// Only this entity (event, fight, fight_stat, fighter)
        #[arg(short, long)]
        entity: Option<EntityKind>,
    },

    /// Assign keys and write the final tables
    Normalize,

    /// urls, scrape and normalize in order
    Run,
}

impl Cli {
    /// Load the configuration file and apply command line overrides
    pub async fn load_config(&self) -> Result<AppConfig> {
        let manager = match &self.config {
            Some(path) => ConfigManager::with_path(path),
            None => ConfigManager::new()?,
        };
        let mut config = manager
            .load_config()
            .await
            .with_context(|| format!("failed to load {}", manager.config_path().display()))?;

        if let Some(dir) = &self.data_dir {
            config.storage.data_dir.clone_from(dir);
        }
        Ok(config)
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config().await?;

    let log_dir = config.logging.resolved_log_dir(&config.storage.data_dir);
    init_logging_with_config(&config.logging, &log_dir)?;

    let client = HttpClient::from_source_config(&config.source).context("failed to build HTTP client")?;
    let pipeline = Pipeline::new(config, Arc::new(client));

    match cli.command.unwrap_or(Command::Run) {
        Command::Urls => {
            let summary = pipeline.discover_urls().await?;
            info!(
                "Discovered {} events, {} fights, {} fighters",
                summary.events, summary.fights, summary.fighters
            );
        }
        Command::Scrape { entity } => {
            for summary in pipeline.scrape(entity).await? {
                info!(
                    "{}: {}/{} pages, {} rows, {} skipped",
                    summary.entity, summary.scraped, summary.pending, summary.rows_appended, summary.skipped
                );
            }
        }
        Command::Normalize => {
            let report = pipeline.normalize().await?;
            for (kind, assigned) in &report.keys_assigned {
                info!("{}: {} new keys", kind, assigned);
            }
        }
        Command::Run => pipeline.run_all().await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_run() {
        let cli = Cli::try_parse_from(["ufcstats-harvester"]).unwrap();
        assert_eq!(cli.command, None);
    }

    #[test]
    fn scrape_accepts_an_entity_filter() {
        let cli = Cli::try_parse_from(["ufcstats-harvester", "--data-dir", "/tmp/x", "scrape", "--entity", "fight-stats"])
            .unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Scrape {
                entity: Some(EntityKind::FightStat)
            })
        );
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
    }

    #[test]
    fn unknown_entity_is_rejected() {
        assert!(Cli::try_parse_from(["ufcstats-harvester", "scrape", "--entity", "referee"]).is_err());
    }

    #[tokio::test]
    async fn data_dir_flag_overrides_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        let cli = Cli::try_parse_from([
            "ufcstats-harvester",
            "--config",
            config_path.to_str().unwrap(),
            "--data-dir",
            "elsewhere",
            "normalize",
        ])
        .unwrap();

        let config = cli.load_config().await.unwrap();
        assert_eq!(config.storage.data_dir, PathBuf::from("elsewhere"));
        assert!(config_path.exists());
    }
}
