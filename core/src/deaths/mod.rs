//! Death-context aggregation.
//!
//! Summarizes combat activity in a bounded window around a single death:
//! incoming damage (with resolved source/ability names), healing received,
//! and defensive ability usage by the dying player.

use crate::api::ReportApi;
use crate::events::{Event, EventKind};
use crate::lookup::LookupService;

/// Window bounds around the death timestamp.
pub const DEATH_WINDOW_BEFORE_MS: f64 = 5_000.0;
pub const DEATH_WINDOW_AFTER_MS: f64 = 1_000.0;

/// One damage hit inside the window, with resolved names.
#[derive(Debug, Clone, PartialEq)]
pub struct DamageHit {
    pub amount: i64,
    pub source_name: String,
    pub ability_name: String,
    /// Milliseconds before the death; negative means after it.
    pub ms_before_death: f64,
}

/// Aggregated activity inside the window around one death.
///
/// All-zero totals are a legitimate, reportable outcome (typically an
/// instant-death or environmental mechanic), not an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeathWindow {
    pub total_damage: i64,
    pub damage_event_count: u32,
    pub total_healing: i64,
    pub defensive_cast_count: u32,
    pub damage_events: Vec<DamageHit>,
}

impl DeathWindow {
    pub fn is_empty(&self) -> bool {
        self.damage_event_count == 0
            && self.total_healing == 0
            && self.defensive_cast_count == 0
    }
}

/// Classify and aggregate the events of one death window.
///
/// Damage events without an amount are zero-effect records and are skipped;
/// cast/begincast events are read as defensive ability usage (the fetch is
/// already scoped to the dying player's window).
pub async fn summarize_window<A: ReportApi>(
    lookup: &LookupService<A>,
    events: &[Event],
    death_timestamp: f64,
) -> DeathWindow {
    let mut window = DeathWindow::default();

    for event in events {
        match event.kind {
            EventKind::Damage => {
                let Some(amount) = event.amount else { continue };
                window.damage_event_count += 1;
                window.total_damage += amount;

                let source_name = match event.source_id {
                    Some(id) => lookup.actor_name(id).await,
                    None => "Unknown".to_string(),
                };
                let ability_name = match event.ability_id {
                    Some(id) => lookup.ability_name(id).await,
                    None => "Unknown".to_string(),
                };
                window.damage_events.push(DamageHit {
                    amount,
                    source_name,
                    ability_name,
                    ms_before_death: death_timestamp - event.timestamp,
                });
            }
            EventKind::Heal => {
                window.total_healing += event.amount_or_zero();
            }
            EventKind::Cast | EventKind::BeginCast => {
                window.defensive_cast_count += 1;
            }
            _ => {}
        }
    }

    window
}

/// Scalar healing total over an already-fetched window.
pub fn healing_total(events: &[Event]) -> i64 {
    events
        .iter()
        .filter(|e| e.kind == EventKind::Heal)
        .map(Event::amount_or_zero)
        .sum()
}

/// Scalar defensive-cast count over an already-fetched window.
pub fn defensive_cast_count(events: &[Event]) -> u32 {
    events.iter().filter(|e| e.is_cast()).count() as u32
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::fake::{FakeApi, event};

    async fn lookup() -> LookupService<FakeApi> {
        let api = FakeApi {
            abilities: [(42_i64, "Fireball".to_string())].into_iter().collect(),
            actors: vec![FakeApi::actor(20, "Cultist", "NPC")],
            ..Default::default()
        };
        let service = LookupService::new(Arc::new(api));
        service.preload_actors("AbCd1234").await.expect("preload");
        service
    }

    fn damage(source_id: i64, ability_id: i64, amount: i64, timestamp: f64) -> Event {
        Event {
            source_id: Some(source_id),
            ability_id: Some(ability_id),
            amount: Some(amount),
            ..event(EventKind::Damage, timestamp)
        }
    }

    #[tokio::test]
    async fn test_empty_window_is_all_zeros_not_an_error() {
        let lookup = lookup().await;
        let window = summarize_window(&lookup, &[], 10_000.0).await;
        assert_eq!(window, DeathWindow::default());
        assert!(window.is_empty());
    }

    #[tokio::test]
    async fn test_window_with_no_relevant_kinds_is_all_zeros() {
        let lookup = lookup().await;
        let events = vec![event(EventKind::Other, 9_500.0)];
        let window = summarize_window(&lookup, &events, 10_000.0).await;
        assert!(window.is_empty());
    }

    #[tokio::test]
    async fn test_window_aggregates_by_kind() {
        let lookup = lookup().await;
        let mut heal = event(EventKind::Heal, 9_000.0);
        heal.amount = Some(500);
        let events = vec![
            damage(20, 42, 1_200, 8_000.0),
            damage(20, 42, 2_000, 9_500.0),
            heal,
            event(EventKind::Cast, 9_800.0),
            event(EventKind::BeginCast, 9_900.0),
        ];

        let window = summarize_window(&lookup, &events, 10_000.0).await;

        assert_eq!(window.total_damage, 3_200);
        assert_eq!(window.damage_event_count, 2);
        assert_eq!(window.total_healing, 500);
        assert_eq!(window.defensive_cast_count, 2);

        assert_eq!(window.damage_events[0].source_name, "Cultist");
        assert_eq!(window.damage_events[0].ability_name, "Fireball");
        assert_eq!(window.damage_events[0].ms_before_death, 2_000.0);
    }

    #[tokio::test]
    async fn test_damage_without_amount_is_skipped() {
        let lookup = lookup().await;
        let events = vec![event(EventKind::Damage, 9_000.0)];
        let window = summarize_window(&lookup, &events, 10_000.0).await;
        assert_eq!(window.damage_event_count, 0);
        assert_eq!(window.total_damage, 0);
    }

    #[tokio::test]
    async fn test_environment_source_resolves_to_sentinel() {
        let lookup = lookup().await;
        let window = summarize_window(&lookup, &[damage(-1, 42, 900, 9_999.0)], 10_000.0).await;
        assert_eq!(window.damage_events[0].source_name, "Environment");
    }

    #[test]
    fn test_scalar_helpers() {
        let mut heal_a = event(EventKind::Heal, 1.0);
        heal_a.amount = Some(300);
        let heal_b = event(EventKind::Heal, 2.0); // no amount -> zero effect
        let events = vec![
            heal_a,
            heal_b,
            event(EventKind::Cast, 3.0),
            event(EventKind::Damage, 4.0),
        ];

        assert_eq!(healing_total(&events), 300);
        assert_eq!(defensive_cast_count(&events), 1);
    }
}
