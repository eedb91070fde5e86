//! Fight details page parser (bout overview)

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use super::{compile, element_text, first_text, labelled_value, select_texts, EntityParser, ParsingError, ParsingResult};
use crate::domain::{Fight, Gender};

static FINISH_TIME: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d:\d\d").expect("valid regex"));
static WEIGHT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w*weight").expect("valid regex"));

pub struct FightParser {
    event_title: Selector,
    person_links: Selector,
    person_status: Selector,
    overview_items: Selector,
    method: Selector,
    detail_paragraphs: Selector,
    fight_title: Selector,
}

impl FightParser {
    pub fn new() -> ParsingResult<Self> {
        Ok(Self {
            event_title: compile("h2")?,
            person_links: compile("a.b-fight-details__person-link")?,
            person_status: compile("i.b-fight-details__person-status")?,
            overview_items: compile("i.b-fight-details__text-item")?,
            method: compile("i.b-fight-details__text-item_first")?,
            detail_paragraphs: compile("p.b-fight-details__text")?,
            fight_title: compile("i.b-fight-details__fight-title")?,
        })
    }
}

/// Title flag, gender and weight class from e.g. `UFC Women's Strawweight Title Bout`
pub(crate) fn classify_bout(title: &str) -> (bool, Gender, Option<String>) {
    let title_fight = title.contains("Title");
    let gender = if title.contains("Women") {
        Gender::Female
    } else {
        Gender::Male
    };
    (title_fight, gender, weight_class(title))
}

fn weight_class(title: &str) -> Option<String> {
    if title.contains("Light Heavyweight") {
        return Some("Light Heavyweight".to_string());
    }
    if title.contains("Women") {
        return WEIGHT
            .find(title)
            .map(|m| format!("Women's {}", m.as_str()));
    }
    if title.contains("Catch Weight") {
        return Some("Catch Weight".to_string());
    }
    if title.contains("Open Weight") {
        return Some("Open Weight".to_string());
    }
    WEIGHT.find(title).map(|m| m.as_str().to_string())
}

/// (result, details). Decisions carry their kind (`Unanimous`, `Split`, ...) as details.
fn split_method(method: &str, details_paragraph: Option<&str>) -> (String, Option<String>) {
    if method.contains("Decision") {
        let mut words = method.split_whitespace();
        let first = words.next().unwrap_or_default().to_string();
        return (first, words.last().map(str::to_string));
    }

    let details = details_paragraph
        .and_then(|p| p.rsplit(':').next())
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);
    (method.trim().to_string(), details)
}

impl EntityParser for FightParser {
    type Record = Fight;

    fn parse(&self, url: &str, html: &str) -> ParsingResult<Vec<Fight>> {
        let document = Html::parse_document(html);

        let event_name = first_text(&document, &self.event_title)
            .ok_or_else(|| ParsingError::required_field_missing("event_name", url))?;

        let fighters = select_texts(&document, &self.person_links);
        let (fighter_1, fighter_2) = match fighters.as_slice() {
            [first, second, ..] if !first.is_empty() && !second.is_empty() => {
                (first.clone(), second.clone())
            }
            _ => return Err(ParsingError::required_field_missing("fighters", url)),
        };

        let statuses = select_texts(&document, &self.person_status);
        let winner = match statuses.as_slice() {
            [first, ..] if first == "W" => Some(fighter_1.clone()),
            [_, second, ..] if second == "W" => Some(fighter_2.clone()),
            _ => None,
        };

        let overview = select_texts(&document, &self.overview_items);
        let finish_round = labelled_value(&overview, "Round:").and_then(|r| r.parse().ok());
        let finish_time = labelled_value(&overview, "Time:")
            .and_then(|t| FINISH_TIME.find(&t).map(|m| m.as_str().to_string()));
        let num_rounds = labelled_value(&overview, "Time format:")
            .and_then(|f| f.chars().next())
            .and_then(|c| c.to_digit(10));
        let referee = labelled_value(&overview, "Referee:").filter(|r| !r.is_empty());

        let method_text = first_text(&document, &self.method)
            .ok_or_else(|| ParsingError::required_field_missing("result", url))?;
        let method = method_text
            .split_once(':')
            .map_or(method_text.as_str(), |(_, value)| value)
            .trim()
            .to_string();
        if method.is_empty() {
            return Err(ParsingError::required_field_missing("result", url));
        }
        let details_paragraph = document.select(&self.detail_paragraphs).nth(1).map(element_text);
        let (result, result_details) = split_method(&method, details_paragraph.as_deref());

        let bout = first_text(&document, &self.fight_title).unwrap_or_default();
        let (title_fight, gender, weight_class) = classify_bout(&bout);

        debug!("Parsed fight {} vs {} ({})", fighter_1, fighter_2, result);
        Ok(vec![Fight {
            event_name,
            referee,
            fighter_1,
            fighter_2,
            winner,
            num_rounds,
            title_fight,
            weight_class,
            gender,
            result,
            result_details,
            finish_round,
            finish_time,
            url: url.to_string(),
        }])
    }
}
