//! HTML parsing for ufcstats.com pages
//!
//! Each entity has a parser holding its compiled `scraper` selectors. Parsers are
//! synchronous; the `Html` document never outlives a single `parse` call.
//! Field positions on the page are only known here.

pub mod error;
pub mod event_parser;
pub mod fight_parser;
pub mod fight_stat_parser;
pub mod fighter_parser;
pub mod link_parser;

pub use error::{ParsingError, ParsingResult};
pub use event_parser::EventParser;
pub use fight_parser::FightParser;
pub use fight_stat_parser::FightStatParser;
pub use fighter_parser::FighterParser;
pub use link_parser::LinkParser;

use scraper::{ElementRef, Html, Selector};

use crate::domain::DatasetRecord;

/// Turns one fetched page into the records it contributes to a dataset
pub trait EntityParser: Send + Sync {
    type Record: DatasetRecord + Send;

    fn parse(&self, url: &str, html: &str) -> ParsingResult<Vec<Self::Record>>;
}

/// Compile a CSS selector, mapping failures to [`ParsingError::InvalidSelector`]
pub(crate) fn compile(selector: &str) -> ParsingResult<Selector> {
    Selector::parse(selector).map_err(|e| ParsingError::invalid_selector(selector, format!("{e:?}")))
}

/// Element text with whitespace runs collapsed to single spaces
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cleaned text of every match, in document order
pub(crate) fn select_texts(document: &Html, selector: &Selector) -> Vec<String> {
    document.select(selector).map(element_text).collect()
}

pub(crate) fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty())
}

/// Value of the first `Label: value` item whose label matches (case-insensitive)
pub(crate) fn labelled_value(items: &[String], label: &str) -> Option<String> {
    let label = label.to_lowercase();
    items.iter().find_map(|item| {
        if item.to_lowercase().starts_with(&label) {
            item.get(label.len()..).map(|value| value.trim().to_string())
        } else {
            None
        }
    })
}

/// `--` and empty strings mean "not recorded"
pub(crate) fn non_placeholder(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value.chars().all(|c| c == '-') {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_markup_whitespace() {
        let document = Html::parse_fragment(
            "<li class='item'>\n  <i>Date:</i>\n      April 13, 2024\n</li>",
        );
        let selector = compile("li.item").unwrap();
        assert_eq!(select_texts(&document, &selector), vec!["Date: April 13, 2024"]);
    }

    #[test]
    fn labelled_value_ignores_case_and_order() {
        let items = vec!["Height: 5' 11\"".to_string(), "STANCE: Orthodox".to_string()];
        assert_eq!(labelled_value(&items, "Stance:").as_deref(), Some("Orthodox"));
        assert_eq!(labelled_value(&items, "Height:").as_deref(), Some("5' 11\""));
        assert_eq!(labelled_value(&items, "Reach:"), None);
    }

    #[test]
    fn dashes_are_placeholders() {
        assert_eq!(non_placeholder("--"), None);
        assert_eq!(non_placeholder("  "), None);
        assert_eq!(non_placeholder(" Southpaw ").as_deref(), Some("Southpaw"));
    }

    #[test]
    fn bad_selector_is_reported() {
        assert!(matches!(compile("a[["), Err(ParsingError::InvalidSelector { .. })));
    }
}
