//! Link extraction for the three listing page types

use scraper::{Html, Selector};

use super::{compile, ParsingResult};

pub struct LinkParser {
    anchors: Selector,
    fight_links: Selector,
    fighter_links: Selector,
}

impl LinkParser {
    pub fn new() -> ParsingResult<Self> {
        Ok(Self {
            anchors: compile("a[href]")?,
            fight_links: compile("a.b-flag.b-flag_style_green")?,
            fighter_links: compile("a.b-link")?,
        })
    }

    /// Every event details link on the completed-events listing
    pub fn event_links(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        document
            .select(&self.anchors)
            .filter_map(|a| a.value().attr("href"))
            .filter(|href| href.contains("event-details"))
            .map(str::to_string)
            .collect()
    }

    /// Fight details links from one event page
    pub fn fight_links(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        document
            .select(&self.fight_links)
            .filter_map(|a| a.value().attr("href"))
            .map(str::to_string)
            .collect()
    }

    /// Fighter details links from one alphabetical listing page.
    ///
    /// Each table row links the first name, last name and nickname; the
    /// first-name link of every row is kept (indices 1, 4, 7, ...).
    pub fn fighter_links(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        document
            .select(&self.fighter_links)
            .skip(1)
            .step_by(3)
            .filter_map(|a| a.value().attr("href"))
            .map(str::to_string)
            .collect()
    }
}
