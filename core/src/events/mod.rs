//! Normalized combat-log event model.
//!
//! The events API returns a flat JSON array where the `type` field decides
//! which of the other fields carry meaning. Events are parsed once per
//! analysis call, are immutable afterwards, and are never cached across
//! calls (only resolved *names* are).

use serde::Deserialize;

use crate::error::Result;

/// Event discriminator, straight from the `type` field of the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Damage,
    Heal,
    Cast,
    BeginCast,
    Death,
    Interrupt,
    /// Any event type this tool does not analyze (buffs, resources, ...).
    #[serde(other)]
    Other,
}

/// A single combat-log record.
///
/// Field validity per kind:
/// - `damage`/`heal`: `amount` (a damage event without an amount counts as
///   zero effect, not as malformed data)
/// - `cast`/`begincast`: `ability_id`, `source_id`
/// - `interrupt`: `source_id` = the interrupting player, `target_id` = the
///   NPC whose cast was stopped
/// - `death`: `target_id` = the dying actor, plus `killer_id` and
///   `killing_ability_id` when the service could attribute the blow
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Event {
    /// Milliseconds on the report's clock, monotonic within a fight.
    pub timestamp: f64,
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(rename = "sourceID")]
    pub source_id: Option<i64>,
    #[serde(rename = "targetID")]
    pub target_id: Option<i64>,
    #[serde(rename = "abilityGameID")]
    pub ability_id: Option<i64>,
    pub amount: Option<i64>,
    #[serde(rename = "killerID")]
    pub killer_id: Option<i64>,
    #[serde(rename = "killingAbilityGameID")]
    pub killing_ability_id: Option<i64>,
}

impl Event {
    /// True for both cast variants (`cast` and `begincast`).
    pub fn is_cast(&self) -> bool {
        matches!(self.kind, EventKind::Cast | EventKind::BeginCast)
    }

    pub fn amount_or_zero(&self) -> i64 {
        self.amount.unwrap_or(0)
    }
}

/// Decode a raw events payload (the `data` field of an events page).
pub fn parse_events(data: serde_json::Value) -> Result<Vec<Event>> {
    Ok(serde_json::from_value(data)?)
}

/// Narrow a mixed stream to a single kind.
pub fn of_kind(events: &[Event], kind: EventKind) -> Vec<Event> {
    events.iter().filter(|e| e.kind == kind).cloned().collect()
}

/// Narrow a mixed stream to interrupt events.
pub fn interrupts(events: &[Event]) -> Vec<Event> {
    of_kind(events, EventKind::Interrupt)
}

/// Narrow a mixed stream to cast events (both `cast` and `begincast`).
pub fn casts(events: &[Event]) -> Vec<Event> {
    events.iter().filter(|e| e.is_cast()).cloned().collect()
}

/// Narrow a mixed stream to death events.
pub fn deaths(events: &[Event]) -> Vec<Event> {
    of_kind(events, EventKind::Death)
}
