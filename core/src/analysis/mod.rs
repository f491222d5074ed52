//! Analysis orchestration.
//!
//! Sequences fight lookup, actor/name preloading, event fetching and the
//! correlation/aggregation passes, and owns the degraded fallbacks when an
//! optional fetch fails. No algorithmic complexity lives here; the call
//! order and the error short-circuiting are the contract.

use std::sync::Arc;

use hashbrown::HashMap;

use crate::api::{Actor, EventFilter, Fight, ReportApi, ReportOverview};
use crate::correlate::{self, CastAnalysis};
use crate::deaths::{self, DEATH_WINDOW_AFTER_MS, DEATH_WINDOW_BEFORE_MS, DeathWindow};
use crate::error::{Error, Result};
use crate::events::{self, Event};
use crate::lookup::LookupService;

/// One interrupt as performed, for the per-player timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct InterruptRecord {
    /// Fight-relative milliseconds (raw timestamp minus fight start).
    pub fight_time_ms: f64,
    pub player_name: String,
    /// The ability the player used to interrupt (their kick).
    pub ability_name: String,
    /// Who got interrupted.
    pub target_name: String,
}

/// Interrupt analysis for one fight, ready for presentation.
#[derive(Debug)]
pub struct InterruptAnalysis {
    pub fight: Fight,
    pub total_interrupts: usize,
    /// Interrupter name -> count, sorted by count descending.
    pub interrupts_by_player: Vec<(String, u32)>,
    /// Timeline of individual interrupts in event order.
    pub timeline: Vec<InterruptRecord>,
    /// Per-ability correlation; `None` when the hostile-cast fetch failed
    /// and only the degraded summary below is available.
    pub correlation: Option<HashMap<String, CastAnalysis>>,
    /// Why correlation is unavailable, for reporting.
    pub correlation_error: Option<String>,
    /// Interrupt abilities used, sorted by count descending. Rendered when
    /// correlation is unavailable or empty.
    pub abilities_used: Vec<(String, u32)>,
}

/// One death with its surrounding context.
#[derive(Debug)]
pub struct DeathRecord {
    pub player_name: String,
    /// Milliseconds survived from fight start.
    pub survival_ms: f64,
    pub killing_ability: String,
    pub killing_source: String,
    /// Windowed context around the death; `None` when the per-death fetch
    /// failed (the death itself is still reported).
    pub window: Option<DeathWindow>,
}

/// Death analysis for one fight.
#[derive(Debug)]
pub struct DeathAnalysis {
    pub fight: Fight,
    pub deaths: Vec<DeathRecord>,
    /// Killing ability name -> death count, sorted by count descending.
    pub killing_abilities: Vec<(String, u32)>,
}

/// Orchestrates one report analysis end to end.
///
/// Owns the API handle and the name cache; both live for one command
/// execution and are dropped afterwards.
pub struct ReportAnalyzer<A> {
    api: Arc<A>,
    lookup: LookupService<A>,
}

impl<A: ReportApi> ReportAnalyzer<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            lookup: LookupService::new(Arc::clone(&api)),
            api,
        }
    }

    pub fn lookup(&self) -> &LookupService<A> {
        &self.lookup
    }

    pub async fn report_overview(&self, code: &str) -> Result<ReportOverview> {
        self.api.fetch_report(code).await
    }

    /// Find one fight in the report.
    pub async fn fight(&self, code: &str, fight_id: i64) -> Result<Fight> {
        let overview = self.api.fetch_report(code).await?;
        overview
            .fights
            .into_iter()
            .find(|f| f.id == fight_id)
            .ok_or(Error::FightNotFound(fight_id))
    }

    /// Players present in the report master data.
    pub async fn players(&self, code: &str) -> Result<Vec<Actor>> {
        let actors = self.api.fetch_actors(code).await?;
        Ok(actors.into_iter().filter(Actor::is_player).collect())
    }

    /// Resolve a player name (case-insensitive) against the preloaded actor
    /// cache.
    async fn player_id(&self, name: &str) -> Result<i64> {
        self.lookup
            .find_actor(name)
            .await
            .map(|(id, _)| id)
            .ok_or_else(|| Error::PlayerNotFound(name.to_string()))
    }

    /// Correlate already-fetched interrupt events with the fight's hostile
    /// casts. Errors only when the hostile-cast fetch itself fails; an empty
    /// map means nothing correlated.
    pub async fn correlate_interrupts_and_casts(
        &self,
        code: &str,
        fight_id: i64,
        interrupts: &[Event],
        fight_start: f64,
    ) -> Result<HashMap<String, CastAnalysis>> {
        let fetched = self
            .api
            .fetch_events(code, &EventFilter::hostile_casts(fight_id))
            .await?;
        let casts = events::casts(&fetched);
        tracing::debug!(
            "[ANALYSIS] correlating {} interrupts against {} hostile casts",
            interrupts.len(),
            casts.len()
        );
        Ok(correlate::correlate(&self.lookup, interrupts, &casts, fight_start).await)
    }

    /// Full interrupt analysis for a fight, optionally narrowed to one
    /// player's interrupts.
    pub async fn interrupt_analysis(
        &self,
        code: &str,
        fight_id: i64,
        player: Option<&str>,
    ) -> Result<InterruptAnalysis> {
        let fight = self.fight(code, fight_id).await?;
        self.lookup.preload_actors(code).await?;

        let source_id = match player {
            Some(name) => Some(self.player_id(name).await?),
            None => None,
        };

        let mut filter = EventFilter::interrupts(fight_id);
        filter.source_id = source_id;
        let fetched = self.api.fetch_events(code, &filter).await?;
        let interrupts = events::interrupts(&fetched);

        // Kick abilities show up in the timeline and the degraded summary
        let ability_ids: Vec<i64> = interrupts.iter().filter_map(|e| e.ability_id).collect();
        self.lookup.preload_abilities(&ability_ids).await;

        let mut by_player: HashMap<String, u32> = HashMap::new();
        let mut abilities_used: HashMap<String, u32> = HashMap::new();
        let mut timeline = Vec::with_capacity(interrupts.len());
        for event in &interrupts {
            let player_name = match event.source_id {
                Some(id) => self.lookup.actor_name(id).await,
                None => "Unknown".to_string(),
            };
            let ability_name = match event.ability_id {
                Some(id) => self.lookup.ability_name(id).await,
                None => crate::lookup::UNKNOWN_ABILITY.to_string(),
            };
            let target_name = match event.target_id {
                Some(id) => self.lookup.actor_name(id).await,
                None => "Unknown Target".to_string(),
            };

            *by_player.entry(player_name.clone()).or_insert(0) += 1;
            *abilities_used.entry(ability_name.clone()).or_insert(0) += 1;
            timeline.push(InterruptRecord {
                fight_time_ms: event.timestamp - fight.start_time,
                player_name,
                ability_name,
                target_name,
            });
        }

        // Correlation failure degrades to the abilities-used summary instead
        // of aborting the whole command.
        let (correlation, correlation_error) = if interrupts.is_empty() {
            (Some(HashMap::new()), None)
        } else {
            match self
                .correlate_interrupts_and_casts(code, fight_id, &interrupts, fight.start_time)
                .await
            {
                Ok(map) => (Some(map), None),
                Err(err) => {
                    tracing::warn!("[ANALYSIS] cast correlation unavailable: {err}");
                    (None, Some(err.to_string()))
                }
            }
        };

        Ok(InterruptAnalysis {
            fight,
            total_interrupts: interrupts.len(),
            interrupts_by_player: sorted_desc(by_player),
            timeline,
            correlation,
            correlation_error,
            abilities_used: sorted_desc(abilities_used),
        })
    }

    /// Fetch and summarize the fixed window around one death.
    pub async fn analyze_death_window(
        &self,
        code: &str,
        fight_id: i64,
        player_id: i64,
        death_timestamp: f64,
    ) -> Result<DeathWindow> {
        let filter = EventFilter::target_window(
            fight_id,
            player_id,
            death_timestamp - DEATH_WINDOW_BEFORE_MS,
            death_timestamp + DEATH_WINDOW_AFTER_MS,
        );
        let events = self.api.fetch_events(code, &filter).await?;
        Ok(deaths::summarize_window(&self.lookup, &events, death_timestamp).await)
    }

    /// Scalar healing-received total over a caller-supplied window.
    pub async fn healing_received(
        &self,
        code: &str,
        fight_id: i64,
        player_id: i64,
        start: f64,
        end: f64,
    ) -> Result<i64> {
        let mut filter = EventFilter::target_window(fight_id, player_id, start, end);
        filter.data_type = Some(crate::api::EventDataType::Healing);
        let events = self.api.fetch_events(code, &filter).await?;
        Ok(deaths::healing_total(&events))
    }

    /// Scalar defensive-cast count over a caller-supplied window.
    pub async fn defensive_casts(
        &self,
        code: &str,
        fight_id: i64,
        player_id: i64,
        start: f64,
        end: f64,
    ) -> Result<u32> {
        let filter = EventFilter {
            fight_id,
            data_type: Some(crate::api::EventDataType::Casts),
            source_id: Some(player_id),
            start_time: Some(start),
            end_time: Some(end),
            ..Default::default()
        };
        let events = self.api.fetch_events(code, &filter).await?;
        Ok(deaths::defensive_cast_count(&events))
    }

    /// Full death analysis for a fight, optionally narrowed to one player.
    ///
    /// Windowed per-death context is fetched only for a player-scoped
    /// analysis (one extra query per death); a failed window fetch degrades
    /// to `window: None` rather than failing the analysis.
    pub async fn death_analysis(
        &self,
        code: &str,
        fight_id: i64,
        player: Option<&str>,
    ) -> Result<DeathAnalysis> {
        let fight = self.fight(code, fight_id).await?;
        self.lookup.preload_actors(code).await?;

        let target_id = match player {
            Some(name) => Some(self.player_id(name).await?),
            None => None,
        };

        let mut filter = EventFilter::deaths(fight_id);
        filter.target_id = target_id;
        let fetched = self.api.fetch_events(code, &filter).await?;
        let death_events = events::deaths(&fetched);

        let ability_ids: Vec<i64> = death_events
            .iter()
            .filter_map(|e| e.killing_ability_id)
            .collect();
        self.lookup.preload_abilities(&ability_ids).await;

        let mut killing_abilities: HashMap<String, u32> = HashMap::new();
        let mut records = Vec::with_capacity(death_events.len());
        for event in &death_events {
            let (killing_ability, killing_source) = self
                .lookup
                .killing_info(event.killer_id, event.killing_ability_id)
                .await;
            let player_name = match event.target_id {
                Some(id) => self.lookup.actor_name(id).await,
                None => "Unknown".to_string(),
            };

            if event.killing_ability_id.is_some() {
                *killing_abilities.entry(killing_ability.clone()).or_insert(0) += 1;
            }

            let window = match (target_id, event.target_id) {
                (Some(_), Some(victim_id)) => {
                    match self
                        .analyze_death_window(code, fight_id, victim_id, event.timestamp)
                        .await
                    {
                        Ok(window) => Some(window),
                        Err(err) => {
                            tracing::warn!("[ANALYSIS] death window unavailable: {err}");
                            None
                        }
                    }
                }
                _ => None,
            };

            records.push(DeathRecord {
                player_name,
                survival_ms: event.timestamp - fight.start_time,
                killing_ability,
                killing_source,
                window,
            });
        }

        Ok(DeathAnalysis {
            fight,
            deaths: records,
            killing_abilities: sorted_desc(killing_abilities),
        })
    }
}

/// Map of counts -> vec sorted by count descending, name ascending on ties.
fn sorted_desc(counts: HashMap<String, u32>) -> Vec<(String, u32)> {
    let mut entries: Vec<(String, u32)> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::api::fake::{FakeApi, event};
    use crate::events::EventKind;

    fn interrupt(source_id: i64, target_id: i64, ability_id: i64, timestamp: f64) -> Event {
        Event {
            source_id: Some(source_id),
            target_id: Some(target_id),
            ability_id: Some(ability_id),
            ..event(EventKind::Interrupt, timestamp)
        }
    }

    fn hostile_cast(source_id: i64, ability_id: i64, timestamp: f64) -> Event {
        Event {
            source_id: Some(source_id),
            ability_id: Some(ability_id),
            ..event(EventKind::Cast, timestamp)
        }
    }

    fn death(target_id: i64, killer_id: i64, ability_id: i64, timestamp: f64) -> Event {
        Event {
            target_id: Some(target_id),
            killer_id: Some(killer_id),
            killing_ability_id: Some(ability_id),
            ..event(EventKind::Death, timestamp)
        }
    }

    fn raid_api() -> FakeApi {
        FakeApi {
            title: "Weekly clear".to_string(),
            fights: vec![FakeApi::fight(3, "Broodtwister", 10_000.0, 190_000.0, true)],
            actors: vec![
                FakeApi::actor(5, "Kicker", "Player"),
                FakeApi::actor(6, "Backup", "Player"),
                FakeApi::actor(20, "Cultist", "NPC"),
            ],
            abilities: [
                (42_i64, "Fireball".to_string()),
                (57994_i64, "Wind Shear".to_string()),
            ]
            .into_iter()
            .collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_fight_lookup_finds_by_id() {
        let analyzer = ReportAnalyzer::new(Arc::new(raid_api()));
        let fight = analyzer.fight("AbCd1234", 3).await.expect("fight");
        assert_eq!(fight.name, "Broodtwister");
    }

    #[tokio::test]
    async fn test_fight_lookup_unknown_id_errors() {
        let analyzer = ReportAnalyzer::new(Arc::new(raid_api()));
        let err = analyzer.fight("AbCd1234", 99).await.unwrap_err();
        assert!(matches!(err, Error::FightNotFound(99)));
    }

    #[tokio::test]
    async fn test_players_filters_to_player_actors() {
        let analyzer = ReportAnalyzer::new(Arc::new(raid_api()));
        let players = analyzer.players("AbCd1234").await.expect("players");
        assert_eq!(players.len(), 2);
        assert!(players.iter().all(|p| p.is_player()));
    }

    #[tokio::test]
    async fn test_interrupt_analysis_with_correlation() {
        let api = Arc::new(raid_api());
        // First fetch: interrupt events; second: hostile casts
        api.push_events(vec![
            interrupt(5, 20, 57994, 20_000.0),
            interrupt(5, 20, 57994, 40_000.0),
            interrupt(6, 20, 57994, 60_000.0),
        ]);
        api.push_events(vec![
            hostile_cast(20, 42, 20_100.0), // stopped
            hostile_cast(20, 42, 50_000.0), // missed
        ]);

        let analyzer = ReportAnalyzer::new(Arc::clone(&api));
        let analysis = analyzer
            .interrupt_analysis("AbCd1234", 3, None)
            .await
            .expect("analysis");

        assert_eq!(analysis.total_interrupts, 3);
        assert_eq!(
            analysis.interrupts_by_player,
            vec![("Kicker".to_string(), 2), ("Backup".to_string(), 1)]
        );
        assert_eq!(analysis.timeline[0].fight_time_ms, 10_000.0);
        assert_eq!(analysis.timeline[0].ability_name, "Wind Shear");
        assert_eq!(analysis.timeline[0].target_name, "Cultist");

        let correlation = analysis.correlation.expect("correlation");
        let fireball = &correlation["Fireball"];
        assert_eq!(fireball.total_casts, 2);
        assert_eq!(fireball.stopped, 1);
        assert_eq!(fireball.missed, 1);
        assert!(analysis.correlation_error.is_none());
    }

    #[tokio::test]
    async fn test_interrupt_analysis_degrades_when_cast_fetch_fails() {
        let api = Arc::new(raid_api());
        api.push_events(vec![interrupt(5, 20, 57994, 20_000.0)]);
        api.push_event_failure(); // hostile-cast fetch fails

        let analyzer = ReportAnalyzer::new(Arc::clone(&api));
        let analysis = analyzer
            .interrupt_analysis("AbCd1234", 3, None)
            .await
            .expect("degraded analysis, not an error");

        assert!(analysis.correlation.is_none());
        assert!(analysis.correlation_error.is_some());
        // Degraded summary still names the kick that was used
        assert_eq!(analysis.abilities_used, vec![("Wind Shear".to_string(), 1)]);
    }

    #[tokio::test]
    async fn test_interrupt_analysis_zero_interrupts_is_empty_not_error() {
        let api = Arc::new(raid_api());
        api.push_events(Vec::new());

        let analyzer = ReportAnalyzer::new(Arc::clone(&api));
        let analysis = analyzer
            .interrupt_analysis("AbCd1234", 3, None)
            .await
            .expect("empty analysis");

        assert_eq!(analysis.total_interrupts, 0);
        assert_eq!(analysis.correlation.map(|c| c.len()), Some(0));
        // No correlation fetch was issued for zero interrupts
        assert_eq!(api.event_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_interrupt_analysis_unknown_player_errors() {
        let api = Arc::new(raid_api());
        let analyzer = ReportAnalyzer::new(api);
        let err = analyzer
            .interrupt_analysis("AbCd1234", 3, Some("Nobody"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PlayerNotFound(_)));
    }

    #[tokio::test]
    async fn test_death_analysis_summary() {
        let api = Arc::new(raid_api());
        api.push_events(vec![
            death(5, 20, 42, 70_000.0),
            death(6, 20, 42, 70_500.0),
        ]);

        let analyzer = ReportAnalyzer::new(Arc::clone(&api));
        let analysis = analyzer
            .death_analysis("AbCd1234", 3, None)
            .await
            .expect("analysis");

        assert_eq!(analysis.deaths.len(), 2);
        assert_eq!(analysis.deaths[0].player_name, "Kicker");
        assert_eq!(analysis.deaths[0].survival_ms, 60_000.0);
        assert_eq!(analysis.deaths[0].killing_ability, "Fireball");
        assert_eq!(analysis.deaths[0].killing_source, "Cultist");
        assert_eq!(analysis.killing_abilities, vec![("Fireball".to_string(), 2)]);
        // No per-death window fetches without a player filter
        assert_eq!(api.event_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_death_analysis_player_scope_fetches_windows() {
        let api = Arc::new(raid_api());
        api.push_events(vec![death(5, 20, 42, 70_000.0)]);
        api.push_events(vec![Event {
            source_id: Some(20),
            ability_id: Some(42),
            amount: Some(9_000),
            ..event(EventKind::Damage, 68_000.0)
        }]);

        let analyzer = ReportAnalyzer::new(Arc::clone(&api));
        let analysis = analyzer
            .death_analysis("AbCd1234", 3, Some("Kicker"))
            .await
            .expect("analysis");

        let window = analysis.deaths[0].window.as_ref().expect("window");
        assert_eq!(window.total_damage, 9_000);
        assert_eq!(window.damage_events[0].ms_before_death, 2_000.0);
    }

    #[tokio::test]
    async fn test_death_window_fetch_failure_degrades_to_none() {
        let api = Arc::new(raid_api());
        api.push_events(vec![death(5, 20, 42, 70_000.0)]);
        api.push_event_failure();

        let analyzer = ReportAnalyzer::new(Arc::clone(&api));
        let analysis = analyzer
            .death_analysis("AbCd1234", 3, Some("Kicker"))
            .await
            .expect("death still reported");

        assert_eq!(analysis.deaths.len(), 1);
        assert!(analysis.deaths[0].window.is_none());
    }

    #[tokio::test]
    async fn test_scalar_window_queries() {
        let api = Arc::new(raid_api());
        let mut heal = event(EventKind::Heal, 66_000.0);
        heal.amount = Some(4_000);
        api.push_events(vec![heal]);
        api.push_events(vec![event(EventKind::Cast, 67_000.0)]);

        let analyzer = ReportAnalyzer::new(Arc::clone(&api));
        let healing = analyzer
            .healing_received("AbCd1234", 3, 5, 65_000.0, 70_000.0)
            .await
            .expect("healing");
        let casts = analyzer
            .defensive_casts("AbCd1234", 3, 5, 65_000.0, 70_000.0)
            .await
            .expect("casts");

        assert_eq!(healing, 4_000);
        assert_eq!(casts, 1);
    }
}
