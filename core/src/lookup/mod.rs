//! Name resolution cache.
//!
//! Maps opaque ability and actor IDs to display names, backed by on-demand
//! and bulk remote lookups. The cache is the only state shared across
//! analysis calls within one command execution; entries are never
//! invalidated once written (names are stable for the life of a report).

use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use tokio::sync::RwLock;

use crate::api::ReportApi;
use crate::error::Result;

pub const UNKNOWN_ABILITY: &str = "Unknown Ability";
pub const ENVIRONMENT: &str = "Environment";

/// Both namespaces live behind one lock; reads take it shared, inserts
/// exclusive.
#[derive(Debug, Default)]
struct NameMaps {
    abilities: HashMap<i64, String>,
    actors: HashMap<i64, String>,
}

/// Concurrency-safe, lazily populated ID-to-name cache.
///
/// The check/fetch/insert sequence in [`ability_name`](Self::ability_name)
/// is deliberately not atomic end to end: two concurrent misses on the same
/// ID may both hit the remote service. That is wasteful but harmless: both
/// writers store the same value, and the cache never ends up blank or
/// corrupted.
#[derive(Debug)]
pub struct LookupService<A> {
    api: Arc<A>,
    maps: RwLock<NameMaps>,
}

impl<A: ReportApi> LookupService<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            maps: RwLock::new(NameMaps::default()),
        }
    }

    /// Resolve an ability ID, fetching on a cache miss.
    ///
    /// ID 0 short-circuits to a fixed label without touching the remote
    /// service. Resolution never fails: a remote error or empty answer
    /// degrades to an `"Ability ID {id}"` placeholder, which is cached so
    /// the same ID does not trigger repeated failing round-trips.
    pub async fn ability_name(&self, ability_id: i64) -> String {
        if ability_id == 0 {
            return UNKNOWN_ABILITY.to_string();
        }

        if let Some(name) = self.maps.read().await.abilities.get(&ability_id) {
            return name.clone();
        }

        let name = self.fetch_ability_name(ability_id).await;
        self.maps
            .write()
            .await
            .abilities
            .insert(ability_id, name.clone());
        name
    }

    async fn fetch_ability_name(&self, ability_id: i64) -> String {
        match self.api.fetch_ability(ability_id).await {
            Ok(Some(ability)) if !ability.name.is_empty() => ability.name,
            Ok(_) => format!("Ability ID {ability_id}"),
            Err(err) => {
                tracing::debug!("[LOOKUP] ability {ability_id} lookup failed: {err}");
                format!("Ability ID {ability_id}")
            }
        }
    }

    /// Resolve an actor ID from the preloaded cache.
    ///
    /// ID -1 is the environment sentinel (floor mechanics and other
    /// non-actor damage sources). An unknown ID returns a placeholder that
    /// is NOT cached: actor resolution is not expected to miss after
    /// [`preload_actors`](Self::preload_actors), so a persistent miss is a
    /// data-completeness gap rather than a transient error.
    pub async fn actor_name(&self, actor_id: i64) -> String {
        if actor_id == -1 {
            return ENVIRONMENT.to_string();
        }

        match self.maps.read().await.actors.get(&actor_id) {
            Some(name) => name.clone(),
            None => format!("Unknown Actor (ID {actor_id})"),
        }
    }

    /// Bulk-load every actor in the report (players, NPCs, pets) in one
    /// pass. Must run before [`actor_name`](Self::actor_name) for accurate
    /// attribution; skipping it degrades to placeholders instead of failing
    /// later.
    pub async fn preload_actors(&self, code: &str) -> Result<()> {
        let actors = self.api.fetch_actors(code).await?;
        let mut maps = self.maps.write().await;
        for actor in actors {
            maps.actors.insert(actor.id, actor.name);
        }
        Ok(())
    }

    /// Fetch a batch of ability names ahead of a resolution loop.
    ///
    /// Already-cached IDs are skipped; the service offers no multi-ID query,
    /// so each remaining ID costs one lookup. Concurrent preloads with
    /// overlapping sets are safe.
    pub async fn preload_abilities(&self, ability_ids: &[i64]) {
        let to_fetch: Vec<i64> = {
            let maps = self.maps.read().await;
            let mut seen = HashSet::new();
            ability_ids
                .iter()
                .copied()
                .filter(|id| *id != 0 && !maps.abilities.contains_key(id) && seen.insert(*id))
                .collect()
        };

        for ability_id in to_fetch {
            let name = self.fetch_ability_name(ability_id).await;
            self.maps.write().await.abilities.insert(ability_id, name);
        }
    }

    /// Case-insensitive actor search over the preloaded cache.
    pub async fn find_actor(&self, name: &str) -> Option<(i64, String)> {
        let maps = self.maps.read().await;
        maps.actors
            .iter()
            .find(|(_, actor_name)| actor_name.eq_ignore_ascii_case(name))
            .map(|(id, actor_name)| (*id, actor_name.clone()))
    }

    /// Resolve both halves of a killing blow, tolerating missing IDs.
    pub async fn killing_info(
        &self,
        killer_id: Option<i64>,
        ability_id: Option<i64>,
    ) -> (String, String) {
        let ability = match ability_id {
            Some(id) => self.ability_name(id).await,
            None => UNKNOWN_ABILITY.to_string(),
        };
        let source = match killer_id {
            Some(id) => self.actor_name(id).await,
            None => "Unknown Source".to_string(),
        };
        (ability, source)
    }

    /// Cached entry counts (abilities, actors), for debug logging.
    pub async fn cache_sizes(&self) -> (usize, usize) {
        let maps = self.maps.read().await;
        (maps.abilities.len(), maps.actors.len())
    }
}
