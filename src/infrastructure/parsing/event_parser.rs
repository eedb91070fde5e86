//! Event details page parser

use chrono::NaiveDate;
use scraper::{Html, Selector};
use tracing::debug;

use super::{compile, first_text, labelled_value, select_texts, EntityParser, ParsingError, ParsingResult};
use crate::domain::Event;

const DATE_FORMAT: &str = "%B %d, %Y";

pub struct EventParser {
    title: Selector,
    info_items: Selector,
}

impl EventParser {
    pub fn new() -> ParsingResult<Self> {
        Ok(Self {
            title: compile("h2")?,
            info_items: compile("li.b-list__box-list-item")?,
        })
    }
}

/// `City, State, Country` or `City, Country`
fn split_location(location: &str) -> (String, Option<String>, String) {
    let parts: Vec<&str> = location.split(',').map(str::trim).collect();
    let city = parts.first().copied().unwrap_or_default().to_string();
    let country = parts.last().copied().unwrap_or_default().to_string();
    let state = (parts.len() > 2).then(|| parts[1].to_string());
    (city, state, country)
}

impl EntityParser for EventParser {
    type Record = Event;

    fn parse(&self, url: &str, html: &str) -> ParsingResult<Vec<Event>> {
        let document = Html::parse_document(html);

        let name = first_text(&document, &self.title)
            .ok_or_else(|| ParsingError::required_field_missing("event_name", url))?;
        let items = select_texts(&document, &self.info_items);

        let date_text = labelled_value(&items, "Date:")
            .ok_or_else(|| ParsingError::required_field_missing("event_date", url))?;
        let date = NaiveDate::parse_from_str(&date_text, DATE_FORMAT)
            .map_err(|_| ParsingError::invalid_value("event_date", &date_text, url))?;

        let location = labelled_value(&items, "Location:")
            .filter(|l| !l.is_empty())
            .ok_or_else(|| ParsingError::required_field_missing("event_location", url))?;
        let (city, state, country) = split_location(&location);

        debug!("Parsed event '{}' ({})", name, date);
        Ok(vec![Event {
            name,
            date,
            city,
            state,
            country,
            url: url.to_string(),
        }])
    }
}
