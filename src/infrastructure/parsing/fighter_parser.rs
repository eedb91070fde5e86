//! Fighter details page parser

use chrono::NaiveDate;
use scraper::{Html, Selector};
use tracing::debug;

use super::{compile, first_text, labelled_value, non_placeholder, select_texts, EntityParser, ParsingError, ParsingResult};
use crate::domain::Fighter;

const DOB_FORMAT: &str = "%b %d, %Y";
const CM_PER_INCH: f64 = 2.54;

pub struct FighterParser {
    name: Selector,
    nickname: Selector,
    info_items: Selector,
    record: Selector,
}

impl FighterParser {
    pub fn new() -> ParsingResult<Self> {
        Ok(Self {
            name: compile("span.b-content__title-highlight")?,
            nickname: compile("p.b-content__Nickname")?,
            info_items: compile("li.b-list__box-list-item")?,
            record: compile("span.b-content__title-record")?,
        })
    }
}

/// First token, and the remaining 1–3 tokens as the last name.
/// Longer names keep only the first name.
fn split_name(full: &str) -> Option<(String, Option<String>)> {
    let tokens: Vec<&str> = full.split_whitespace().collect();
    let first = (*tokens.first()?).to_string();
    let last = match tokens.len() {
        2..=4 => Some(tokens[1..].join(" ")),
        _ => None,
    };
    Some((first, last))
}

/// `5' 11"` → centimetres
fn height_cm(value: &str, url: &str) -> ParsingResult<Option<f64>> {
    let Some(value) = non_placeholder(value) else {
        return Ok(None);
    };
    let invalid = || ParsingError::invalid_value("fighter_height_cm", &value, url);

    let (feet, inches) = value.split_once('\'').ok_or_else(invalid)?;
    let feet: u32 = feet.trim().parse().map_err(|_| invalid())?;
    let inches: u32 = inches.trim().trim_end_matches('"').trim().parse().map_err(|_| invalid())?;
    Ok(Some(f64::from(feet * 12 + inches) * CM_PER_INCH))
}

/// `155 lbs.` → 155
fn weight_lbs(value: &str, url: &str) -> ParsingResult<Option<u32>> {
    let Some(value) = non_placeholder(value) else {
        return Ok(None);
    };
    value
        .split_whitespace()
        .next()
        .and_then(|w| w.parse().ok())
        .map(Some)
        .ok_or_else(|| ParsingError::invalid_value("fighter_weight_lbs", &value, url))
}

/// `72"` → centimetres, 2 dp
fn reach_cm(value: &str, url: &str) -> ParsingResult<Option<f64>> {
    let Some(value) = non_placeholder(value) else {
        return Ok(None);
    };
    let inches: u32 = value
        .trim_end_matches('"')
        .trim()
        .parse()
        .map_err(|_| ParsingError::invalid_value("fighter_reach_cm", &value, url))?;
    Ok(Some((f64::from(inches) * CM_PER_INCH * 100.0).round() / 100.0))
}

fn dob(value: &str, url: &str) -> ParsingResult<Option<NaiveDate>> {
    let Some(value) = non_placeholder(value) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(&value, DOB_FORMAT)
        .map(Some)
        .map_err(|_| ParsingError::invalid_value("fighter_dob", &value, url))
}

fn leading_number(text: &str) -> Option<u32> {
    let digits: String = text.trim().chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// `Record: 22-6-0 (1 NC)` → (wins, losses, draws, no contests)
fn record(text: &str, url: &str) -> ParsingResult<(u32, u32, u32, Option<u32>)> {
    let invalid = || ParsingError::invalid_value("fighter_record", text, url);
    let value = text.split_once(':').map_or(text, |(_, v)| v).trim();

    let parts: Vec<&str> = value.split('-').collect();
    let [wins, losses, rest] = parts.as_slice() else {
        return Err(invalid());
    };
    let wins = leading_number(wins).ok_or_else(invalid)?;
    let losses = leading_number(losses).ok_or_else(invalid)?;
    let draws = leading_number(rest).ok_or_else(invalid)?;
    let no_contest = rest.split_once('(').and_then(|(_, nc)| leading_number(nc));
    Ok((wins, losses, draws, no_contest))
}

impl EntityParser for FighterParser {
    type Record = Fighter;

    fn parse(&self, url: &str, html: &str) -> ParsingResult<Vec<Fighter>> {
        let document = Html::parse_document(html);

        let (first_name, last_name) = first_text(&document, &self.name)
            .as_deref()
            .and_then(split_name)
            .ok_or_else(|| ParsingError::required_field_missing("fighter_f_name", url))?;
        let nickname = first_text(&document, &self.nickname).and_then(|n| non_placeholder(&n));

        let items = select_texts(&document, &self.info_items);
        let field = |label: &str| labelled_value(&items, label).unwrap_or_default();

        let record_text = first_text(&document, &self.record)
            .ok_or_else(|| ParsingError::required_field_missing("fighter_record", url))?;
        let (wins, losses, draws, no_contest_dq) = record(&record_text, url)?;

        let fighter = Fighter {
            first_name,
            last_name,
            nickname,
            height_cm: height_cm(&field("Height:"), url)?,
            weight_lbs: weight_lbs(&field("Weight:"), url)?,
            reach_cm: reach_cm(&field("Reach:"), url)?,
            stance: non_placeholder(&field("STANCE:")),
            dob: dob(&field("DOB:"), url)?,
            wins,
            losses,
            draws,
            no_contest_dq,
            url: url.to_string(),
        };
        debug!("Parsed fighter {}", fighter.full_name());
        Ok(vec![fighter])
    }
}
