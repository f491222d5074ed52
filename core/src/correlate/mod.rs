//! Interrupt-to-cast correlation.
//!
//! Interrupt events and hostile cast events arrive as two independently
//! fetched, unsynchronized streams with no causal link between them. The
//! only evidence that a particular cast was stopped by a particular
//! interrupt is actor identity plus timestamp proximity, so the engine
//! reconstructs causality from those alone: a cast counts as stopped when an
//! interrupt landed on the casting NPC within [`INTERRUPT_TOLERANCE_MS`] of
//! the cast's timestamp.

use hashbrown::{HashMap, HashSet};

use crate::api::ReportApi;
use crate::events::Event;
use crate::lookup::LookupService;


/// Maximum |cast − interrupt| timestamp distance for the two records to be
/// treated as the same attempt.
pub const INTERRUPT_TOLERANCE_MS: f64 = 300.0;

/// A cast that an interrupt stopped.
#[derive(Debug, Clone, PartialEq)]
pub struct StoppedCast {
    pub caster_name: String,
    pub interrupted_by: String,
    /// Fight-relative milliseconds.
    pub timestamp: f64,
}

/// A cast that completed uncontested.
#[derive(Debug, Clone, PartialEq)]
pub struct MissedCast {
    pub caster_name: String,
    /// Fight-relative milliseconds.
    pub timestamp: f64,
}

/// Per-ability correlation outcome.
///
/// `total_casts == stopped + missed` always holds; `stopped_casts` and
/// `missed_casts` preserve input cast order.
#[derive(Debug, Clone, Default)]
pub struct CastAnalysis {
    pub ability_name: String,
    pub total_casts: u32,
    pub stopped: u32,
    pub missed: u32,
    /// Interrupter display name -> casts credited to them.
    pub interrupted_by: HashMap<String, u32>,
    pub stopped_casts: Vec<StoppedCast>,
    pub missed_casts: Vec<MissedCast>,
}

impl CastAnalysis {
    fn new(ability_name: String) -> Self {
        Self {
            ability_name,
            ..Default::default()
        }
    }

    /// Share of this ability's casts that were stopped, 0-100.
    pub fn stopped_pct(&self) -> f64 {
        if self.total_casts == 0 {
            return 0.0;
        }
        self.stopped as f64 / self.total_casts as f64 * 100.0
    }
}

/// Correlate interrupts with the hostile casts they may have stopped,
/// keyed by resolved ability name.
///
/// Casts from NPCs that no interrupt ever targeted are excluded entirely:
/// they cannot correlate with anything and are not reported as missed.
/// Interrupts on each NPC are matched earliest-first, so when several land
/// inside the tolerance window the earliest one gets the credit.
///
/// Zero interrupts (or zero relevant casts) produce an empty map, which is
/// a valid result, not an error; the matching itself cannot fail. All
/// ability IDs are preloaded in one pass before resolution to keep
/// round-trips down.
pub async fn correlate<A: ReportApi>(
    lookup: &LookupService<A>,
    interrupt_events: &[Event],
    hostile_casts: &[Event],
    fight_start: f64,
) -> HashMap<String, CastAnalysis> {
    // NPCs that were actually interrupted at least once
    let interrupted_npcs: HashSet<i64> = interrupt_events
        .iter()
        .filter_map(|e| e.target_id)
        .collect();

    let relevant: Vec<&Event> = hostile_casts
        .iter()
        .filter(|cast| {
            cast.source_id
                .is_some_and(|id| interrupted_npcs.contains(&id))
        })
        .collect();

    if relevant.is_empty() {
        return HashMap::new();
    }

    // Index interrupts by target NPC, earliest first, so tolerance-window
    // ties resolve deterministically to the earliest interrupt.
    let mut interrupts_by_npc: HashMap<i64, Vec<&Event>> = HashMap::new();
    for interrupt in interrupt_events {
        if let Some(target) = interrupt.target_id {
            interrupts_by_npc.entry(target).or_default().push(interrupt);
        }
    }
    for list in interrupts_by_npc.values_mut() {
        list.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
    }

    let ability_ids: Vec<i64> = relevant.iter().filter_map(|cast| cast.ability_id).collect();
    lookup.preload_abilities(&ability_ids).await;

    let mut analysis: HashMap<String, CastAnalysis> = HashMap::new();

    for cast in relevant {
        let (Some(ability_id), Some(caster_id)) = (cast.ability_id, cast.source_id) else {
            continue;
        };

        let ability_name = lookup.ability_name(ability_id).await;
        let caster_name = lookup.actor_name(caster_id).await;
        let timestamp = fight_relative(cast.timestamp, fight_start);

        let matched = interrupts_by_npc.get(&caster_id).and_then(|list| {
            list.iter()
                .find(|i| (cast.timestamp - i.timestamp).abs() <= INTERRUPT_TOLERANCE_MS)
        });
        let interrupter = match matched {
            Some(interrupt) => Some(match interrupt.source_id {
                Some(id) => lookup.actor_name(id).await,
                None => "Unknown".to_string(),
            }),
            None => None,
        };

        let entry = analysis
            .entry(ability_name.clone())
            .or_insert_with(|| CastAnalysis::new(ability_name));
        entry.total_casts += 1;

        match interrupter {
            Some(interrupter) => {
                entry.stopped += 1;
                *entry.interrupted_by.entry(interrupter.clone()).or_insert(0) += 1;
                entry.stopped_casts.push(StoppedCast {
                    caster_name,
                    interrupted_by: interrupter,
                    timestamp,
                });
            }
            None => {
                entry.missed += 1;
                entry.missed_casts.push(MissedCast {
                    caster_name,
                    timestamp,
                });
            }
        }
    }

    analysis
}

/// Convert a timestamp to fight-relative time.
///
/// A negative result means the two event streams disagree about the clock
/// base; the raw timestamp is kept as a fallback, and the mismatch is logged
/// because it is a data-quality signal, not a normal condition.
fn fight_relative(timestamp: f64, fight_start: f64) -> f64 {
    let relative = timestamp - fight_start;
    if relative < 0.0 {
        tracing::warn!(
            "[CORRELATE] event timestamp {timestamp} precedes fight start {fight_start}; \
             keeping raw timestamp"
        );
        return timestamp;
    }
    relative
}
