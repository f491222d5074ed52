//! In-memory fake of the report API for unit tests.
//!
//! Call counters let tests assert that short-circuit paths (ID 0, ID -1,
//! cache hits) never reach the remote service.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use hashbrown::HashMap;

use super::types::{AbilityInfo, Actor, EventFilter, Fight, ReportOverview};
use super::ReportApi;
use crate::error::{Error, Result};
use crate::events::Event;

/// Scripted response for one `fetch_events` call: `None` fails the call.
pub type EventBatch = Option<Vec<Event>>;

#[derive(Default)]
pub struct FakeApi {
    pub title: String,
    pub fights: Vec<Fight>,
    pub actors: Vec<Actor>,
    pub abilities: HashMap<i64, String>,
    /// Responses for successive `fetch_events` calls, consumed in order.
    /// An exhausted queue answers with an empty event list.
    pub event_batches: Mutex<VecDeque<EventBatch>>,
    pub fail_abilities: bool,
    pub fail_actors: bool,

    pub report_calls: AtomicUsize,
    pub actor_calls: AtomicUsize,
    pub ability_calls: AtomicUsize,
    pub event_calls: AtomicUsize,
}

impl FakeApi {
    pub fn with_abilities(entries: &[(i64, &str)]) -> Self {
        Self {
            abilities: entries
                .iter()
                .map(|(id, name)| (*id, name.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    pub fn push_events(&self, batch: Vec<Event>) {
        self.event_batches
            .lock()
            .expect("event queue lock")
            .push_back(Some(batch));
    }

    pub fn push_event_failure(&self) {
        self.event_batches
            .lock()
            .expect("event queue lock")
            .push_back(None);
    }

    pub fn actor(id: i64, name: &str, kind: &str) -> Actor {
        Actor {
            id,
            name: name.to_string(),
            kind: kind.to_string(),
            sub_type: String::new(),
            server: None,
            icon: String::new(),
        }
    }

    pub fn fight(id: i64, name: &str, start: f64, end: f64, kill: bool) -> Fight {
        Fight {
            id,
            name: name.to_string(),
            start_time: start,
            end_time: end,
            kill,
            fight_percentage: 0.0,
        }
    }
}

impl ReportApi for FakeApi {
    async fn fetch_report(&self, _code: &str) -> Result<ReportOverview> {
        self.report_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ReportOverview {
            title: self.title.clone(),
            start_time: 0.0,
            end_time: 0.0,
            fights: self.fights.clone(),
        })
    }

    async fn fetch_actors(&self, _code: &str) -> Result<Vec<Actor>> {
        self.actor_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_actors {
            return Err(Error::Api("master data unavailable".into()));
        }
        Ok(self.actors.clone())
    }

    async fn fetch_ability(&self, ability_id: i64) -> Result<Option<AbilityInfo>> {
        self.ability_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_abilities {
            return Err(Error::Api("game data unavailable".into()));
        }
        Ok(self.abilities.get(&ability_id).map(|name| AbilityInfo {
            id: ability_id,
            name: name.clone(),
            icon: String::new(),
        }))
    }

    async fn fetch_events(&self, _code: &str, _filter: &EventFilter) -> Result<Vec<Event>> {
        self.event_calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .event_batches
            .lock()
            .expect("event queue lock")
            .pop_front();
        match next {
            Some(Some(batch)) => Ok(batch),
            Some(None) => Err(Error::Api("events unavailable".into())),
            None => Ok(Vec::new()),
        }
    }
}

/// Shorthand for building events in tests.
pub fn event(kind: crate::events::EventKind, timestamp: f64) -> Event {
    Event {
        timestamp,
        kind,
        source_id: None,
        target_id: None,
        ability_id: None,
        amount: None,
        killer_id: None,
        killing_ability_id: None,
    }
}
