//! End-to-end pipeline runs against an in-memory ufcstats.com

mod common;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

use common::{
    config, connection_lost, event_page, event_url, events_listing, fight_page, fight_url,
    fighter_page, fighter_url, fighters_listing, rate_limited, FakeSite, BASE,
};
use ufcstats_harvester::application::{Pipeline, ScrapeError};
use ufcstats_harvester::domain::{EntityKind, FrontierKind, Table};
use ufcstats_harvester::infrastructure::dataset_store::read_table;
use ufcstats_harvester::infrastructure::{AppConfig, FrontierStore, RetryError};

fn events_listing_url() -> String {
    format!("{BASE}/statistics/events/completed?page=all")
}

fn letter_url(letter: char) -> String {
    format!("{BASE}/statistics/fighters?char={letter}&page=all")
}

/// UFC 1 with a single fight, Royce Gracie over Gerard Gordeau
fn ufc_1_site() -> FakeSite {
    FakeSite::new()
        .page(events_listing_url(), events_listing(&[event_url("e1")]))
        .page(
            event_url("e1"),
            event_page("UFC 1", "November 12, 1993", "Denver, Colorado, USA", &[fight_url("f1")]),
        )
        .page(fight_url("f1"), fight_page("UFC 1", "Royce Gracie", "Gerard Gordeau"))
        .page(letter_url('g'), fighters_listing(&[fighter_url("gg")]))
        .page(letter_url('r'), fighters_listing(&[fighter_url("rg")]))
        .page(fighter_url("gg"), fighter_page("Gerard Gordeau", "10-2-0"))
        .page(fighter_url("rg"), fighter_page("Royce Gracie", "15-2-3 (1 NC)"))
}

fn output(data_dir: &Path, kind: EntityKind) -> Table {
    read_table(kind, &data_dir.join("normalized").join(kind.dataset_file_name())).unwrap()
}

fn staging(data_dir: &Path, kind: EntityKind) -> Table {
    read_table(kind, &data_dir.join("scraped_files").join(kind.dataset_file_name())).unwrap()
}

fn column<'a>(table: &'a Table, name: &str) -> Vec<Option<&'a str>> {
    let index = table.column_index(name).unwrap();
    (0..table.len()).map(|row| table.cell(row, index)).collect()
}

fn pipeline(config: AppConfig, site: &Arc<FakeSite>) -> Pipeline {
    let fetcher: Arc<FakeSite> = Arc::clone(site);
    Pipeline::new(config, fetcher)
}

#[tokio::test(start_paused = true)]
async fn full_run_produces_linked_tables() {
    let dir = tempdir().unwrap();
    let site = Arc::new(ufc_1_site());

    pipeline(config(dir.path()), &site).run_all().await.unwrap();

    let fighters = output(dir.path(), EntityKind::Fighter);
    assert_eq!(column(&fighters, "fighter_l_name"), vec![Some("Gordeau"), Some("Gracie")]);
    assert_eq!(column(&fighters, "fighter_id"), vec![Some("2"), Some("1")]);

    let events = output(dir.path(), EntityKind::Event);
    assert_eq!(column(&events, "event_id"), vec![Some("1")]);
    assert_eq!(column(&events, "event_state"), vec![Some("Colorado")]);

    let fights = output(dir.path(), EntityKind::Fight);
    assert_eq!(column(&fights, "fight_id"), vec![Some("1")]);
    assert_eq!(column(&fights, "event_id"), vec![Some("1")]);
    assert_eq!(column(&fights, "f_1"), vec![Some("1")]);
    assert_eq!(column(&fights, "f_2"), vec![Some("2")]);
    assert_eq!(column(&fights, "winner"), vec![Some("1")]);
    assert_eq!(column(&fights, "result"), vec![Some("Submission")]);

    let stats = output(dir.path(), EntityKind::FightStat);
    assert_eq!(column(&stats, "fight_id"), vec![Some("1"), Some("1")]);
    assert_eq!(column(&stats, "fighter_id"), vec![Some("1"), Some("2")]);

    let frontier = FrontierStore::new(dir.path().join("urls"));
    assert_eq!(frontier.load(FrontierKind::Fighters).unwrap(), vec![fighter_url("gg"), fighter_url("rg")]);
}

#[tokio::test(start_paused = true)]
async fn second_scrape_fetches_nothing_new() {
    let dir = tempdir().unwrap();
    let site = Arc::new(ufc_1_site());
    let pipeline = pipeline(config(dir.path()), &site);

    pipeline.run_all().await.unwrap();
    let calls = site.total_calls();

    let summaries = pipeline.scrape(None).await.unwrap();

    assert_eq!(site.total_calls(), calls);
    assert_eq!(summaries.len(), 4);
    assert!(summaries.iter().all(|s| s.pending == 0 && s.rows_appended == 0));
    assert_eq!(staging(dir.path(), EntityKind::FightStat).len(), 2);
}

#[tokio::test(start_paused = true)]
async fn concurrent_entity_loops_fill_every_dataset() {
    let dir = tempdir().unwrap();
    let site = Arc::new(ufc_1_site());
    let mut config = config(dir.path());
    config.scrape.concurrent_entities = true;
    let pipeline = pipeline(config, &site);

    pipeline.discover_urls().await.unwrap();
    let summaries = pipeline.scrape(None).await.unwrap();

    let rows: Vec<(EntityKind, usize)> = summaries.iter().map(|s| (s.entity, s.rows_appended)).collect();
    assert_eq!(
        rows,
        vec![
            (EntityKind::Event, 1),
            (EntityKind::Fight, 1),
            (EntityKind::FightStat, 2),
            (EntityKind::Fighter, 2),
        ]
    );
    // fights and fight stats each fetch the fight page once
    assert_eq!(site.calls_to(&fight_url("f1")), 2);
}

#[tokio::test(start_paused = true)]
async fn exhausted_connection_budget_stops_but_keeps_earlier_rows() {
    let dir = tempdir().unwrap();
    let site = Arc::new(
        FakeSite::new()
            .page(
                event_url("e1"),
                event_page("UFC 1", "November 12, 1993", "Denver, Colorado, USA", &[]),
            )
            .unreachable(&event_url("e2")),
    );
    let mut config = config(dir.path());
    config.retry.connection_lost_retries = 2;
    FrontierStore::new(config.storage.urls_dir())
        .save(FrontierKind::Events, &[event_url("e1"), event_url("e2")])
        .unwrap();

    let err = pipeline(config, &site)
        .scrape(Some(EntityKind::Event))
        .await
        .unwrap_err();

    match err {
        ScrapeError::Fetch {
            entity,
            scraped,
            source: RetryError::ConnectionLost { attempts, .. },
        } => {
            assert_eq!(entity, EntityKind::Event);
            assert_eq!(scraped, 1);
            assert_eq!(attempts, 3);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(site.calls_to(&event_url("e2")), 3);
    assert_eq!(column(&staging(dir.path(), EntityKind::Event), "event_url"), vec![Some(event_url("e1").as_str())]);
}

#[tokio::test(start_paused = true)]
async fn rate_limited_page_is_retried_after_the_configured_sleep() {
    let dir = tempdir().unwrap();
    let site = Arc::new(
        FakeSite::new()
            .page(
                event_url("e1"),
                event_page("UFC 1", "November 12, 1993", "Denver, Colorado, USA", &[]),
            )
            .script(&event_url("e1"), vec![rate_limited(), rate_limited()]),
    );
    let mut config = config(dir.path());
    config.retry.rate_limited_retries = 2;
    config.retry.rate_limited_delay_seconds = 30;
    FrontierStore::new(config.storage.urls_dir())
        .save(FrontierKind::Events, &[event_url("e1")])
        .unwrap();

    let start = tokio::time::Instant::now();
    let summaries = pipeline(config, &site).scrape(Some(EntityKind::Event)).await.unwrap();

    assert!(start.elapsed() >= Duration::from_secs(60));
    assert_eq!(site.calls_to(&event_url("e1")), 3);
    assert_eq!(summaries[0].scraped, 1);
}

#[tokio::test(start_paused = true)]
async fn connection_drops_within_budget_are_recovered() {
    let dir = tempdir().unwrap();
    let fight = fight_url("f1");
    let site = Arc::new(
        FakeSite::new()
            .page(fight.clone(), fight_page("UFC 1", "Royce Gracie", "Gerard Gordeau"))
            .script(&fight, vec![connection_lost(&fight)]),
    );
    let config = config(dir.path());
    FrontierStore::new(config.storage.urls_dir())
        .save(FrontierKind::Fights, &[fight.clone()])
        .unwrap();

    let summaries = pipeline(config, &site).scrape(Some(EntityKind::FightStat)).await.unwrap();

    assert_eq!(summaries[0].rows_appended, 2);
    assert_eq!(site.calls_to(&fight), 2);
}

#[tokio::test(start_paused = true)]
async fn pages_that_fail_to_parse_are_skipped() {
    let dir = tempdir().unwrap();
    // e1 is not registered and answers 404 with an empty body
    let site = Arc::new(FakeSite::new().page(
        event_url("e2"),
        event_page("UFC 2", "March 11, 1994", "Denver, Colorado, USA", &[]),
    ));
    let config = config(dir.path());
    FrontierStore::new(config.storage.urls_dir())
        .save(FrontierKind::Events, &[event_url("e1"), event_url("e2")])
        .unwrap();

    let summaries = pipeline(config, &site).scrape(Some(EntityKind::Event)).await.unwrap();

    assert_eq!(summaries[0].pending, 2);
    assert_eq!(summaries[0].scraped, 1);
    assert_eq!(summaries[0].skipped, 1);
    assert_eq!(site.calls_to(&event_url("e1")), 1);
    assert_eq!(column(&staging(dir.path(), EntityKind::Event), "event_name"), vec![Some("UFC 2")]);
}

#[tokio::test(start_paused = true)]
async fn rate_limited_fighter_letter_is_skipped_during_discovery() {
    let dir = tempdir().unwrap();
    let mut config = config(dir.path());
    config.retry.rate_limited_retries = 1;
    let site = Arc::new(
        ufc_1_site()
            .page(letter_url('q'), fighters_listing(&[fighter_url("qq")]))
            .script(&letter_url('q'), vec![rate_limited(), rate_limited()]),
    );

    let summary = pipeline(config, &site).discover_urls().await.unwrap();

    assert_eq!(summary.events, 1);
    assert_eq!(summary.fights, 1);
    assert_eq!(summary.fighters, 2);
    assert_eq!(site.calls_to(&letter_url('q')), 2);
}

#[tokio::test(start_paused = true)]
async fn lost_connection_on_a_fighter_letter_ends_discovery() {
    let dir = tempdir().unwrap();
    let mut config = config(dir.path());
    config.retry.connection_lost_retries = 0;
    let site = Arc::new(ufc_1_site().unreachable(&letter_url('m')));

    let err = pipeline(config, &site).discover_urls().await.unwrap_err();

    assert!(matches!(
        err,
        ScrapeError::Discovery {
            frontier: FrontierKind::Fighters,
            source: RetryError::ConnectionLost { .. },
        }
    ));
    // events and fights were already saved
    let frontier = FrontierStore::new(dir.path().join("urls"));
    assert_eq!(frontier.load(FrontierKind::Fights).unwrap(), vec![fight_url("f1")]);
    assert!(!frontier.path(FrontierKind::Fighters).exists());
}
