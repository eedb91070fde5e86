use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::entity_kind::EntityKind;

/// A parsed record that can be appended to its entity dataset.
///
/// `values` must follow `Self::KIND.raw_columns()` one-to-one.
pub trait DatasetRecord {
    const KIND: EntityKind;

    fn values(&self) -> Vec<Option<String>>;

    /// Natural key the record was scraped from
    fn source_url(&self) -> &str;
}

/// Event basic information from the event details page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    pub date: NaiveDate,
    pub city: String,
    pub state: Option<String>,
    pub country: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn code(self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
        }
    }
}

/// One bout. Fighter identities are names until normalisation swaps them for keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fight {
    pub event_name: String,
    pub referee: Option<String>,
    pub fighter_1: String,
    pub fighter_2: String,
    pub winner: Option<String>,
    pub num_rounds: Option<u32>,
    pub title_fight: bool,
    pub weight_class: Option<String>,
    pub gender: Gender,
    pub result: String,
    pub result_details: Option<String>,
    pub finish_round: Option<u32>,
    pub finish_time: Option<String>,
    pub url: String,
}

/// Totals for one fighter in one fight (two per fight page)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FightStat {
    pub fighter: String,
    pub knockdowns: Option<u32>,
    pub total_strikes_att: Option<u32>,
    pub total_strikes_succ: Option<u32>,
    pub sig_strikes_att: Option<u32>,
    pub sig_strikes_succ: Option<u32>,
    pub takedown_att: Option<u32>,
    pub takedown_succ: Option<u32>,
    pub submission_att: Option<u32>,
    pub reversals: Option<u32>,
    pub ctrl_time: Option<String>,
    pub fight_url: String,
}

/// Fighter profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fighter {
    pub first_name: String,
    pub last_name: Option<String>,
    pub nickname: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_lbs: Option<u32>,
    pub reach_cm: Option<f64>,
    pub stance: Option<String>,
    pub dob: Option<NaiveDate>,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub no_contest_dq: Option<u32>,
    pub url: String,
}

impl Fighter {
    /// Name the fight pages refer to this fighter by
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        }
    }
}

fn num<T: ToString>(value: Option<T>) -> Option<String> {
    value.map(|v| v.to_string())
}

fn date(value: NaiveDate) -> String {
    value.format("%Y-%m-%d").to_string()
}

fn centimetres(value: Option<f64>) -> Option<String> {
    value.map(|v| format!("{v:.2}"))
}

impl DatasetRecord for Event {
    const KIND: EntityKind = EntityKind::Event;

    fn values(&self) -> Vec<Option<String>> {
        vec![
            Some(self.name.clone()),
            Some(date(self.date)),
            Some(self.city.clone()),
            self.state.clone(),
            Some(self.country.clone()),
            Some(self.url.clone()),
        ]
    }

    fn source_url(&self) -> &str {
        &self.url
    }
}

impl DatasetRecord for Fight {
    const KIND: EntityKind = EntityKind::Fight;

    fn values(&self) -> Vec<Option<String>> {
        vec![
            Some(self.event_name.clone()),
            self.referee.clone(),
            Some(self.fighter_1.clone()),
            Some(self.fighter_2.clone()),
            self.winner.clone(),
            num(self.num_rounds),
            Some(if self.title_fight { "T" } else { "F" }.to_string()),
            self.weight_class.clone(),
            Some(self.gender.code().to_string()),
            Some(self.result.clone()),
            self.result_details.clone(),
            num(self.finish_round),
            self.finish_time.clone(),
            Some(self.url.clone()),
        ]
    }

    fn source_url(&self) -> &str {
        &self.url
    }
}

impl DatasetRecord for FightStat {
    const KIND: EntityKind = EntityKind::FightStat;

    fn values(&self) -> Vec<Option<String>> {
        vec![
            Some(self.fighter.clone()),
            num(self.knockdowns),
            num(self.total_strikes_att),
            num(self.total_strikes_succ),
            num(self.sig_strikes_att),
            num(self.sig_strikes_succ),
            num(self.takedown_att),
            num(self.takedown_succ),
            num(self.submission_att),
            num(self.reversals),
            self.ctrl_time.clone(),
            Some(self.fight_url.clone()),
        ]
    }

    fn source_url(&self) -> &str {
        &self.fight_url
    }
}

impl DatasetRecord for Fighter {
    const KIND: EntityKind = EntityKind::Fighter;

    fn values(&self) -> Vec<Option<String>> {
        vec![
            Some(self.first_name.clone()),
            self.last_name.clone(),
            self.nickname.clone(),
            centimetres(self.height_cm),
            num(self.weight_lbs),
            centimetres(self.reach_cm),
            self.stance.clone(),
            self.dob.map(date),
            Some(self.wins.to_string()),
            Some(self.losses.to_string()),
            Some(self.draws.to_string()),
            num(self.no_contest_dq),
            Some(self.url.clone()),
        ]
    }

    fn source_url(&self) -> &str {
        &self.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fighter() -> Fighter {
        Fighter {
            first_name: "Jon".into(),
            last_name: Some("Jones".into()),
            nickname: Some("Bones".into()),
            height_cm: Some(193.04),
            weight_lbs: Some(248),
            reach_cm: Some(215.9),
            stance: Some("Orthodox".into()),
            dob: NaiveDate::from_ymd_opt(1987, 7, 19),
            wins: 27,
            losses: 1,
            draws: 0,
            no_contest_dq: Some(1),
            url: "http://ufcstats.com/fighter-details/07f72a2a7591b409".into(),
        }
    }

    #[test]
    fn values_line_up_with_raw_columns() {
        let fighter = sample_fighter();
        assert_eq!(fighter.values().len(), EntityKind::Fighter.raw_columns().len());
        assert_eq!(FightStat::default().values().len(), EntityKind::FightStat.raw_columns().len());
    }

    #[test]
    fn fighter_values_are_formatted_for_csv() {
        let values = sample_fighter().values();
        assert_eq!(values[3].as_deref(), Some("193.04"));
        assert_eq!(values[5].as_deref(), Some("215.90"));
        assert_eq!(values[7].as_deref(), Some("1987-07-19"));
    }

    #[test]
    fn full_name_falls_back_to_first_name() {
        let mut fighter = sample_fighter();
        assert_eq!(fighter.full_name(), "Jon Jones");
        fighter.last_name = None;
        assert_eq!(fighter.full_name(), "Jon");
    }
}
