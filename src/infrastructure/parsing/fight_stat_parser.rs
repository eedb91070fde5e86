//! Fight details page parser (per-fighter totals table)
//!
//! The totals table is a flat list of `p.b-fight-details__table-text` cells,
//! two per column (fighter 1 then fighter 2):
//!
//! | cells  | column            |
//! |--------|-------------------|
//! | 0, 1   | fighter           |
//! | 2, 3   | KD                |
//! | 4, 5   | Sig. str. `x of y`|
//! | 6, 7   | Sig. str. %       |
//! | 8, 9   | Total str. `x of y`|
//! | 10, 11 | Td `x of y`       |
//! | 12, 13 | Td %              |
//! | 14, 15 | Sub. att          |
//! | 16, 17 | Rev.              |
//! | 18, 19 | Ctrl              |

use scraper::{Html, Selector};
use tracing::debug;

use super::{compile, non_placeholder, select_texts, EntityParser, ParsingError, ParsingResult};
use crate::domain::FightStat;

const NAME: usize = 0;
const KNOCKDOWNS: usize = 2;
const SIG_STRIKES: usize = 4;
const TOTAL_STRIKES: usize = 8;
const TAKEDOWNS: usize = 10;
const SUBMISSIONS: usize = 14;
const REVERSALS: usize = 16;
const CONTROL: usize = 18;

pub struct FightStatParser {
    table_cells: Selector,
    person_links: Selector,
}

impl FightStatParser {
    pub fn new() -> ParsingResult<Self> {
        Ok(Self {
            table_cells: compile("p.b-fight-details__table-text")?,
            person_links: compile("a.b-fight-details__person-link")?,
        })
    }
}

fn count(cell: Option<&String>) -> Option<u32> {
    cell.and_then(|c| c.trim().parse().ok())
}

/// `"17 of 35"` → (succeeded, attempted)
fn landed_of_attempted(cell: Option<&String>) -> (Option<u32>, Option<u32>) {
    match cell.and_then(|c| c.split_once(" of ")) {
        Some((landed, attempted)) => (landed.trim().parse().ok(), attempted.trim().parse().ok()),
        None => (None, None),
    }
}

fn fighter_totals(cells: &[String], side: usize, fighter: String, url: &str) -> FightStat {
    let (sig_strikes_succ, sig_strikes_att) = landed_of_attempted(cells.get(SIG_STRIKES + side));
    let (total_strikes_succ, total_strikes_att) =
        landed_of_attempted(cells.get(TOTAL_STRIKES + side));
    let (takedown_succ, takedown_att) = landed_of_attempted(cells.get(TAKEDOWNS + side));

    FightStat {
        fighter,
        knockdowns: count(cells.get(KNOCKDOWNS + side)),
        total_strikes_att,
        total_strikes_succ,
        sig_strikes_att,
        sig_strikes_succ,
        takedown_att,
        takedown_succ,
        submission_att: count(cells.get(SUBMISSIONS + side)),
        reversals: count(cells.get(REVERSALS + side)),
        ctrl_time: cells.get(CONTROL + side).and_then(|c| non_placeholder(c)),
        fight_url: url.to_string(),
    }
}

impl EntityParser for FightStatParser {
    type Record = FightStat;

    fn parse(&self, url: &str, html: &str) -> ParsingResult<Vec<FightStat>> {
        let document = Html::parse_document(html);
        let cells = select_texts(&document, &self.table_cells);

        // Fights without recorded statistics have no table; fall back to the header links
        let names = match cells.get(NAME..NAME + 2) {
            Some([first, second]) if !first.is_empty() && !second.is_empty() => {
                [first.clone(), second.clone()]
            }
            _ => match select_texts(&document, &self.person_links).as_slice() {
                [first, second, ..] => [first.clone(), second.clone()],
                _ => return Err(ParsingError::required_field_missing("fighter_id", url)),
            },
        };

        let [first, second] = names;
        let stats = vec![
            fighter_totals(&cells, 0, first, url),
            fighter_totals(&cells, 1, second, url),
        ];
        debug!("Parsed fight stats for {} and {}", stats[0].fighter, stats[1].fighter);
        Ok(stats)
    }
}
