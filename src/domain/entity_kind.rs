//! The four harvested entity types and the fixed shape of their datasets

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Entity type harvested from ufcstats.com
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Event,
    Fight,
    FightStat,
    Fighter,
}

/// URL list a scrape loop draws its candidates from.
///
/// Fight statistics live on the fight details page, so `Fight` and
/// `FightStat` share the fight frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrontierKind {
    Events,
    Fights,
    Fighters,
}

const EVENT_COLUMNS: &[&str] = &[
    "event_name",
    "event_date",
    "event_city",
    "event_state",
    "event_country",
    "event_url",
];

const FIGHT_COLUMNS: &[&str] = &[
    "event_name",
    "referee",
    "f_1",
    "f_2",
    "winner",
    "num_rounds",
    "title_fight",
    "weight_class",
    "gender",
    "result",
    "result_details",
    "finish_round",
    "finish_time",
    "fight_url",
];

const FIGHT_STAT_COLUMNS: &[&str] = &[
    "fighter_id",
    "knockdowns",
    "total_strikes_att",
    "total_strikes_succ",
    "sig_strikes_att",
    "sig_strikes_succ",
    "takedown_att",
    "takedown_succ",
    "submission_att",
    "reversals",
    "ctrl_time",
    "fight_url",
];

const FIGHTER_COLUMNS: &[&str] = &[
    "fighter_f_name",
    "fighter_l_name",
    "fighter_nickname",
    "fighter_height_cm",
    "fighter_weight_lbs",
    "fighter_reach_cm",
    "fighter_stance",
    "fighter_dob",
    "fighter_w",
    "fighter_l",
    "fighter_d",
    "fighter_nc_dq",
    "fighter_url",
];

const EVENT_FINAL_COLUMNS: &[&str] = &[
    "event_id",
    "event_name",
    "event_date",
    "event_city",
    "event_state",
    "event_country",
    "event_url",
];

const FIGHT_FINAL_COLUMNS: &[&str] = &[
    "fight_id",
    "event_id",
    "referee",
    "f_1",
    "f_2",
    "winner",
    "num_rounds",
    "title_fight",
    "weight_class",
    "gender",
    "result",
    "result_details",
    "finish_round",
    "finish_time",
    "fight_url",
];

const FIGHT_STAT_FINAL_COLUMNS: &[&str] = &[
    "fight_stat_id",
    "fight_id",
    "fighter_id",
    "knockdowns",
    "total_strikes_att",
    "total_strikes_succ",
    "sig_strikes_att",
    "sig_strikes_succ",
    "takedown_att",
    "takedown_succ",
    "submission_att",
    "reversals",
    "ctrl_time",
    "fight_url",
];

const FIGHTER_FINAL_COLUMNS: &[&str] = &[
    "fighter_id",
    "fighter_f_name",
    "fighter_l_name",
    "fighter_nickname",
    "fighter_height_cm",
    "fighter_weight_lbs",
    "fighter_reach_cm",
    "fighter_stance",
    "fighter_dob",
    "fighter_w",
    "fighter_l",
    "fighter_d",
    "fighter_nc_dq",
    "fighter_url",
];

impl EntityKind {
    /// Scrape order used by the pipeline
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Event,
        EntityKind::Fight,
        EntityKind::FightStat,
        EntityKind::Fighter,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Fight => "fight",
            Self::FightStat => "fight_stat",
            Self::Fighter => "fighter",
        }
    }

    /// Columns of the scraped dataset header, in write order
    pub fn raw_columns(self) -> &'static [&'static str] {
        match self {
            Self::Event => EVENT_COLUMNS,
            Self::Fight => FIGHT_COLUMNS,
            Self::FightStat => FIGHT_STAT_COLUMNS,
            Self::Fighter => FIGHTER_COLUMNS,
        }
    }

    /// Columns of the normalised output table, surrogate key first
    pub fn final_columns(self) -> &'static [&'static str] {
        match self {
            Self::Event => EVENT_FINAL_COLUMNS,
            Self::Fight => FIGHT_FINAL_COLUMNS,
            Self::FightStat => FIGHT_STAT_FINAL_COLUMNS,
            Self::Fighter => FIGHTER_FINAL_COLUMNS,
        }
    }

    /// Column holding the source URL. Unique except for `FightStat` (2 rows per URL).
    pub fn natural_key(self) -> &'static str {
        match self {
            Self::Event => "event_url",
            Self::Fight | Self::FightStat => "fight_url",
            Self::Fighter => "fighter_url",
        }
    }

    pub fn surrogate_key(self) -> &'static str {
        match self {
            Self::Event => "event_id",
            Self::Fight => "fight_id",
            Self::FightStat => "fight_stat_id",
            Self::Fighter => "fighter_id",
        }
    }

    /// Foreign-key columns of the final table, used to null out unresolved names
    pub fn foreign_key_columns(self) -> &'static [&'static str] {
        match self {
            Self::Event | Self::Fighter => &[],
            Self::Fight => &["event_id", "f_1", "f_2", "winner"],
            Self::FightStat => &["fight_id", "fighter_id"],
        }
    }

    pub fn dataset_file_name(self) -> &'static str {
        match self {
            Self::Event => "ufc_event_data.csv",
            Self::Fight => "ufc_fight_data.csv",
            Self::FightStat => "ufc_fight_stat_data.csv",
            Self::Fighter => "ufc_fighter_data.csv",
        }
    }

    pub fn frontier(self) -> FrontierKind {
        match self {
            Self::Event => FrontierKind::Events,
            Self::Fight | Self::FightStat => FrontierKind::Fights,
            Self::Fighter => FrontierKind::Fighters,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "event" | "events" => Ok(Self::Event),
            "fight" | "fights" => Ok(Self::Fight),
            "fight_stat" | "fight_stats" | "fightstat" | "fightstats" => Ok(Self::FightStat),
            "fighter" | "fighters" => Ok(Self::Fighter),
            other => Err(format!(
                "unknown entity '{other}' (expected event, fight, fight_stat or fighter)"
            )),
        }
    }
}

impl FrontierKind {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Events => "event_urls.csv",
            Self::Fights => "fight_urls.csv",
            Self::Fighters => "fighter_urls.csv",
        }
    }
}

impl fmt::Display for FrontierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Events => "event urls",
            Self::Fights => "fight urls",
            Self::Fighters => "fighter urls",
        };
        f.write_str(label)
    }
}
