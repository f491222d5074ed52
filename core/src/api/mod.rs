//! Remote report API: the contract this core consumes, and its GraphQL
//! implementation.
//!
//! Everything downstream (name cache, correlation, death windows) talks to
//! the service through [`ReportApi`], so tests substitute an in-memory fake.

pub mod client;
pub mod queries;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use client::GraphQlClient;
pub use types::{
    AbilityInfo, Actor, EventDataType, EventFilter, Fight, Hostility, ReportOverview,
};

use crate::error::Result;
use crate::events::Event;

/// The remote operations the analysis core depends on.
///
/// Implementations own transport, pagination and payload decoding; callers
/// receive fully parsed values or a transport/API error.
#[allow(async_fn_in_trait)]
pub trait ReportApi {
    /// Report metadata and its fight list.
    async fn fetch_report(&self, code: &str) -> Result<ReportOverview>;

    /// All actors (players, NPCs, pets) in a report's master data.
    async fn fetch_actors(&self, code: &str) -> Result<Vec<Actor>>;

    /// Single-ability dictionary lookup; `None` when the service has no
    /// entry for the ID.
    async fn fetch_ability(&self, ability_id: i64) -> Result<Option<AbilityInfo>>;

    /// Events matching `filter`, fully depaginated.
    async fn fetch_events(&self, code: &str, filter: &EventFilter) -> Result<Vec<Event>>;
}
