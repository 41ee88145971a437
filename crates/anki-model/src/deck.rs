use crate::ids::{DeckConfigId, DeckId, Usn};
use serde::{Deserialize, Serialize};

/// One (day_index, count) pair backing a deck's four today-counters
/// (`newToday`, `revToday`, `lrnToday`, `timeToday`). v2 collections default
/// every counter to `(0, 0)`; v21 collections carry the real values.
/// Serializes as the 2-element `[day, count]` array the real schema and
/// `loader::build_decks` both use, not as a `{"day":_,"count":_}` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DayCount {
    pub day: i64,
    pub count: i64,
}

impl Serialize for DayCount {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        (self.day, self.count).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DayCount {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let (day, count) = <(i64, i64)>::deserialize(deserializer)?;
        Ok(DayCount { day, count })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub id: DeckId,
    pub name: String,
    #[serde(rename = "desc")]
    pub description: String,
    #[serde(rename = "mod")]
    pub mod_time_secs: i64,
    pub usn: Usn,
    pub collapsed: bool,
    #[serde(rename = "browserCollapsed")]
    pub browser_collapsed: bool,
    /// Stored as the `0`/`1` integer `loader::build_decks` reads via
    /// `data["dyn"].as_i64()`, not as a JSON boolean — `as_i64()` on a `bool`
    /// value returns `None`, which would silently turn every dynamic deck
    /// back into a regular one on the next load.
    #[serde(rename = "dyn", serialize_with = "bool_as_i64", deserialize_with = "bool_from_i64")]
    pub dynamic: bool,
    #[serde(rename = "newToday")]
    pub new_today: DayCount,
    #[serde(rename = "revToday")]
    pub review_today: DayCount,
    #[serde(rename = "lrnToday")]
    pub learn_today: DayCount,
    #[serde(rename = "timeToday")]
    pub time_today: DayCount,
    #[serde(rename = "conf")]
    pub conf_id: DeckConfigId,
}

fn bool_as_i64<S>(value: &bool, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_i64(if *value { 1 } else { 0 })
}

fn bool_from_i64<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(i64::deserialize(deserializer)? != 0)
}

impl Deck {
    pub fn new(id: DeckId, name: impl Into<String>, conf_id: DeckConfigId) -> Self {
        Deck {
            id,
            name: name.into(),
            description: String::new(),
            mod_time_secs: 0,
            usn: Usn(-1),
            collapsed: false,
            browser_collapsed: false,
            dynamic: false,
            new_today: DayCount::default(),
            review_today: DayCount::default(),
            learn_today: DayCount::default(),
            time_today: DayCount::default(),
            conf_id,
        }
    }
}

/// `new` parameter block, with the defaults the original applies when a
/// `dconf` entry omits the block entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCardsConfig {
    pub bury: bool,
    pub delays: Vec<f64>,
    #[serde(rename = "initialFactor")]
    pub initial_factor: i64,
    #[serde(rename = "ints")]
    pub intervals: Vec<i64>,
    pub order: i64,
    #[serde(rename = "perDay")]
    pub per_day: i64,
}

impl Default for NewCardsConfig {
    fn default() -> Self {
        NewCardsConfig {
            bury: false,
            delays: vec![1.0, 10.0],
            initial_factor: 2500,
            intervals: vec![1, 4, 0],
            order: 1,
            per_day: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewCardsConfig {
    pub bury: bool,
    pub ease4: f64,
    #[serde(rename = "ivlFct")]
    pub interval_factor: f64,
    #[serde(rename = "maxIvl")]
    pub max_interval: i64,
    #[serde(rename = "perDay")]
    pub per_day: i64,
    #[serde(rename = "hardFactor")]
    pub hard_factor: f64,
}

impl Default for ReviewCardsConfig {
    fn default() -> Self {
        ReviewCardsConfig {
            bury: false,
            ease4: 1.3,
            interval_factor: 1.0,
            max_interval: 36500,
            per_day: 200,
            hard_factor: 1.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapseCardsConfig {
    pub delays: Vec<f64>,
    #[serde(rename = "leechAction")]
    pub leech_action: i64,
    #[serde(rename = "leechFails")]
    pub leech_fails: i64,
    #[serde(rename = "minInt")]
    pub min_interval: i64,
    pub mult: f64,
}

impl Default for LapseCardsConfig {
    fn default() -> Self {
        LapseCardsConfig {
            delays: vec![10.0],
            leech_action: 1,
            leech_fails: 8,
            min_interval: 1,
            mult: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckConfig {
    pub id: DeckConfigId,
    pub name: String,
    #[serde(rename = "mod")]
    pub mod_time_secs: i64,
    pub usn: Usn,
    pub new: NewCardsConfig,
    #[serde(rename = "rev")]
    pub review: ReviewCardsConfig,
    pub lapse: LapseCardsConfig,
}

impl DeckConfig {
    pub fn new(id: DeckConfigId, name: impl Into<String>) -> Self {
        DeckConfig {
            id,
            name: name.into(),
            mod_time_secs: 0,
            usn: Usn(-1),
            new: NewCardsConfig::default(),
            review: ReviewCardsConfig::default(),
            lapse: LapseCardsConfig::default(),
        }
    }
}
