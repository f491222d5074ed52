//! Wire types for the report API.
//!
//! The GraphQL envelope mirrors the service's response shape; everything is
//! optional on the wire, so accessors on the client unwrap the nesting into
//! `MissingData` errors at one place.

use serde::Deserialize;

/// Any participant in a report: player, NPC or pet.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Actor {
    pub id: i64,
    pub name: String,
    /// Actor category as reported by the service ("Player", "NPC", "Pet").
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Class (players) or NPC sub-category.
    #[serde(rename = "subType", default)]
    pub sub_type: String,
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default)]
    pub icon: String,
}

impl Actor {
    pub fn is_player(&self) -> bool {
        self.kind == "Player"
    }
}

/// One encounter attempt within a report. Timestamps are absolute
/// milliseconds on the report clock; this core only uses them to convert
/// event timestamps into fight-relative time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Fight {
    pub id: i64,
    pub name: String,
    #[serde(rename = "startTime")]
    pub start_time: f64,
    #[serde(rename = "endTime")]
    pub end_time: f64,
    #[serde(default)]
    pub kill: bool,
    /// Boss health percentage when the fight ended (wipes).
    #[serde(rename = "fightPercentage", default)]
    pub fight_percentage: f64,
}

impl Fight {
    pub fn duration_ms(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// Report metadata plus its fight list.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportOverview {
    #[serde(default)]
    pub title: String,
    /// Unix milliseconds.
    #[serde(rename = "startTime", default)]
    pub start_time: f64,
    #[serde(rename = "endTime", default)]
    pub end_time: f64,
    #[serde(default)]
    pub fights: Vec<Fight>,
}

/// A single entry from the game-data ability dictionary.
#[derive(Debug, Clone, Deserialize)]
pub struct AbilityInfo {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub icon: String,
}

/// Server-side event query categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDataType {
    Interrupts,
    Casts,
    Deaths,
    Healing,
    DamageDone,
}

impl EventDataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventDataType::Interrupts => "Interrupts",
            EventDataType::Casts => "Casts",
            EventDataType::Deaths => "Deaths",
            EventDataType::Healing => "Healing",
            EventDataType::DamageDone => "DamageDone",
        }
    }
}

/// Hostility filter for event queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hostility {
    Friendlies,
    Enemies,
}

impl Hostility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Hostility::Friendlies => "Friendlies",
            Hostility::Enemies => "Enemies",
        }
    }
}

/// Filters for one event query. Only `fight_id` is mandatory; everything
/// else is passed through to the service when set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFilter {
    pub fight_id: i64,
    pub data_type: Option<EventDataType>,
    pub hostility: Option<Hostility>,
    pub source_id: Option<i64>,
    pub target_id: Option<i64>,
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
    pub limit: Option<i64>,
}

impl EventFilter {
    /// Interrupt events for a fight, optionally narrowed to one player.
    pub fn interrupts(fight_id: i64) -> Self {
        Self {
            fight_id,
            data_type: Some(EventDataType::Interrupts),
            ..Default::default()
        }
    }

    /// Every cast performed by hostile actors in a fight.
    pub fn hostile_casts(fight_id: i64) -> Self {
        Self {
            fight_id,
            data_type: Some(EventDataType::Casts),
            hostility: Some(Hostility::Enemies),
            ..Default::default()
        }
    }

    /// Death events for a fight.
    pub fn deaths(fight_id: i64) -> Self {
        Self {
            fight_id,
            data_type: Some(EventDataType::Deaths),
            ..Default::default()
        }
    }

    /// Everything targeting one actor inside a bounded time window.
    pub fn target_window(fight_id: i64, target_id: i64, start: f64, end: f64) -> Self {
        Self {
            fight_id,
            target_id: Some(target_id),
            start_time: Some(start),
            end_time: Some(end),
            limit: Some(100),
            ..Default::default()
        }
    }
}

// ─── GraphQL envelope ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse {
    pub data: Option<ResponseData>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ResponseData {
    #[serde(rename = "reportData")]
    pub report_data: Option<ReportData>,
    #[serde(rename = "gameData")]
    pub game_data: Option<GameData>,
}

#[derive(Debug, Deserialize)]
pub struct ReportData {
    pub report: Option<ReportNode>,
}

#[derive(Debug, Deserialize)]
pub struct ReportNode {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "startTime", default)]
    pub start_time: f64,
    #[serde(rename = "endTime", default)]
    pub end_time: f64,
    #[serde(default)]
    pub fights: Vec<Fight>,
    #[serde(rename = "masterData")]
    pub master_data: Option<MasterData>,
    pub events: Option<EventsPage>,
}

#[derive(Debug, Deserialize)]
pub struct MasterData {
    #[serde(default)]
    pub actors: Vec<Actor>,
}

/// One page of the events API; `data` is the raw event array and
/// `next_page_timestamp` is the cursor to loop on.
#[derive(Debug, Deserialize)]
pub struct EventsPage {
    pub data: Option<serde_json::Value>,
    #[serde(rename = "nextPageTimestamp")]
    pub next_page_timestamp: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct GameData {
    pub ability: Option<AbilityInfo>,
}
