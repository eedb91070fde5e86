//! Shared fixtures: an in-memory ufcstats.com and page builders
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use std::sync::Mutex;

use ufcstats_harvester::infrastructure::{AppConfig, FetchError, FetchedPage, PageFetcher};

pub const BASE: &str = "http://ufc.test";

/// Serves registered pages; unknown URLs answer 404 with an empty body
#[derive(Default)]
pub struct FakeSite {
    pages: HashMap<String, String>,
    scripted: Mutex<HashMap<String, VecDeque<Result<FetchedPage, FetchError>>>>,
    unreachable: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), body.into());
        self
    }

    /// Outcomes served before the registered page
    pub fn script(self, url: &str, outcomes: Vec<Result<FetchedPage, FetchError>>) -> Self {
        self.scripted.lock().unwrap().insert(url.to_string(), outcomes.into());
        self
    }

    /// Every fetch of `url` is a transport failure
    pub fn unreachable(mut self, url: &str) -> Self {
        self.unreachable.insert(url.to_string());
        self
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl PageFetcher for FakeSite {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());

        if self.unreachable.contains(url) {
            return Err(FetchError::transport(url, "connection refused"));
        }
        if let Some(outcome) = self
            .scripted
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(VecDeque::pop_front)
        {
            return outcome;
        }
        Ok(match self.pages.get(url) {
            Some(body) => FetchedPage::ok(body.clone()),
            None => FetchedPage {
                status: 404,
                body: String::new(),
            },
        })
    }
}

pub fn rate_limited() -> Result<FetchedPage, FetchError> {
    Ok(FetchedPage {
        status: 429,
        body: String::new(),
    })
}

pub fn connection_lost(url: &str) -> Result<FetchedPage, FetchError> {
    Err(FetchError::transport(url, "connection reset by peer"))
}

pub fn event_url(id: &str) -> String {
    format!("{BASE}/event-details/{id}")
}

pub fn fight_url(id: &str) -> String {
    format!("{BASE}/fight-details/{id}")
}

pub fn fighter_url(id: &str) -> String {
    format!("{BASE}/fighter-details/{id}")
}

/// Config rooted at `data_dir`, without pacing or file logging
pub fn config(data_dir: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.source.base_url = BASE.to_string();
    config.storage.data_dir = data_dir.to_path_buf();
    config.scrape.request_delay_ms = 0;
    config.logging.file_output = false;
    config
}

pub fn events_listing(event_urls: &[String]) -> String {
    let rows: String = event_urls
        .iter()
        .map(|url| {
            format!(
                r#"<tr class="b-statistics__table-row"><td><i class="b-statistics__table-content">
                <a href="{url}" class="b-link b-link_style_black">Event</a></i></td></tr>"#
            )
        })
        .collect();
    format!(r#"<html><body><table class="b-statistics__table-events"><tbody>{rows}</tbody></table></body></html>"#)
}

pub fn event_page(name: &str, date: &str, location: &str, fight_urls: &[String]) -> String {
    let fights: String = fight_urls
        .iter()
        .map(|url| {
            format!(
                r#"<tr><td><p><a class="b-flag b-flag_style_green" href="{url}"><i class="b-flag__inner">win</i></a></p></td></tr>"#
            )
        })
        .collect();
    format!(
        r#"<html><body>
        <h2 class="b-content__title"><span class="b-content__title-highlight">{name}</span></h2>
        <ul class="b-list__box-list">
          <li class="b-list__box-list-item"><i class="b-list__box-item-title">Date:</i> {date}</li>
          <li class="b-list__box-list-item"><i class="b-list__box-item-title">Location:</i> {location}</li>
        </ul>
        <table class="b-fight-details__table"><tbody>{fights}</tbody></table>
        </body></html>"#
    )
}

/// Fight page won by `fighter_1`, with a full totals table
pub fn fight_page(event: &str, fighter_1: &str, fighter_2: &str) -> String {
    format!(
        r#"<html><body>
        <h2 class="b-content__title"><a class="b-link" href="{BASE}/event-details/x">{event}</a></h2>
        <div class="b-fight-details__person">
          <i class="b-fight-details__person-status b-fight-details__person-status_style_green">W</i>
          <h3><a class="b-link b-fight-details__person-link" href="{BASE}/fighter-details/p1">{fighter_1}</a></h3>
        </div>
        <div class="b-fight-details__person">
          <i class="b-fight-details__person-status b-fight-details__person-status_style_gray">L</i>
          <h3><a class="b-link b-fight-details__person-link" href="{BASE}/fighter-details/p2">{fighter_2}</a></h3>
        </div>
        <i class="b-fight-details__fight-title">UFC 1 Tournament Title Bout</i>
        <p class="b-fight-details__text">
          <i class="b-fight-details__text-item_first"><i class="b-fight-details__label">Method:</i> Submission</i>
          <i class="b-fight-details__text-item"><i class="b-fight-details__label">Round:</i> 1</i>
          <i class="b-fight-details__text-item"><i class="b-fight-details__label">Time:</i> 1:44</i>
          <i class="b-fight-details__text-item"><i class="b-fight-details__label">Time format:</i> No Time Limit</i>
          <i class="b-fight-details__text-item"><i class="b-fight-details__label">Referee:</i> Joao Alberto Barreto</i>
        </p>
        <p class="b-fight-details__text"><i class="b-fight-details__label">Details:</i> Rear Naked Choke</p>
        <table><tbody><tr>
          <td><p class="b-fight-details__table-text">{fighter_1}</p><p class="b-fight-details__table-text">{fighter_2}</p></td>
          <td><p class="b-fight-details__table-text">0</p><p class="b-fight-details__table-text">0</p></td>
          <td><p class="b-fight-details__table-text">1 of 6</p><p class="b-fight-details__table-text">0 of 3</p></td>
          <td><p class="b-fight-details__table-text">16%</p><p class="b-fight-details__table-text">0%</p></td>
          <td><p class="b-fight-details__table-text">4 of 11</p><p class="b-fight-details__table-text">3 of 9</p></td>
          <td><p class="b-fight-details__table-text">1 of 3</p><p class="b-fight-details__table-text">0 of 0</p></td>
          <td><p class="b-fight-details__table-text">33%</p><p class="b-fight-details__table-text">---</p></td>
          <td><p class="b-fight-details__table-text">1</p><p class="b-fight-details__table-text">0</p></td>
          <td><p class="b-fight-details__table-text">0</p><p class="b-fight-details__table-text">0</p></td>
          <td><p class="b-fight-details__table-text">1:05</p><p class="b-fight-details__table-text">0:00</p></td>
        </tr></tbody></table>
        </body></html>"#
    )
}

pub fn fighters_listing(fighter_urls: &[String]) -> String {
    let rows: String = fighter_urls
        .iter()
        .map(|url| {
            format!(
                r#"<tr class="b-statistics__table-row">
                <td><a href="{url}" class="b-link b-link_style_black">First</a></td>
                <td><a href="{url}" class="b-link b-link_style_black">Last</a></td>
                <td><a href="{url}" class="b-link b-link_style_black">Nick</a></td>
                </tr>"#
            )
        })
        .collect();
    format!(
        r#"<html><body>
        <a class="b-link b-link_style_white" href="{BASE}/statistics/fighters">Fighters</a>
        <table class="b-statistics__table"><tbody>{rows}</tbody></table></body></html>"#
    )
}

pub fn fighter_page(name: &str, record: &str) -> String {
    format!(
        r#"<html><body>
        <h2 class="b-content__title">
          <span class="b-content__title-highlight">{name}</span>
          <span class="b-content__title-record">Record: {record}</span>
        </h2>
        <p class="b-content__Nickname"></p>
        <ul>
          <li class="b-list__box-list-item"><i class="b-list__box-item-title">Height:</i> 6' 1"</li>
          <li class="b-list__box-list-item"><i class="b-list__box-item-title">Weight:</i> 175 lbs.</li>
          <li class="b-list__box-list-item"><i class="b-list__box-item-title">Reach:</i> --</li>
          <li class="b-list__box-list-item"><i class="b-list__box-item-title">STANCE:</i> Southpaw</li>
          <li class="b-list__box-list-item"><i class="b-list__box-item-title">DOB:</i> Dec 12, 1966</li>
        </ul></body></html>"#
    )
}

/// Write a CSV with the given header and raw rows (empty string = null)
pub fn write_csv(path: &Path, header: &[&str], rows: &[&[&str]]) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut writer = csv::Writer::from_path(path).unwrap();
    writer.write_record(header).unwrap();
    for row in rows {
        writer.write_record(*row).unwrap();
    }
    writer.flush().unwrap();
}
