//! GraphQL HTTP client for the report API.

use raidlens_types::ApiConfig;
use serde_json::Value;

use super::queries;
use super::types::{
    AbilityInfo, Actor, EventFilter, EventsPage, GraphQlResponse, ReportNode, ReportOverview,
    ResponseData,
};
use super::ReportApi;
use crate::error::{Error, Result};
use crate::events::{self, Event};

/// Client for the remote analytics service.
///
/// Carries a pre-obtained bearer token; obtaining and refreshing tokens is
/// the caller's concern. One instance is shared per command execution.
#[derive(Debug, Clone)]
pub struct GraphQlClient {
    http: reqwest::Client,
    endpoint: String,
    access_token: String,
}

impl GraphQlClient {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            access_token: config.access_token.clone(),
        }
    }

    /// Execute one GraphQL request and unwrap the envelope.
    ///
    /// GraphQL-level errors surface as [`Error::Api`] with the first error
    /// message; HTTP-level failures as [`Error::Http`].
    async fn query(&self, query: &str, variables: Value) -> Result<ResponseData> {
        let body = serde_json::json!({ "query": query, "variables": variables });

        tracing::debug!("[API] POST {}", self.endpoint);
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let envelope: GraphQlResponse = response.json().await?;
        if let Some(err) = envelope.errors.first() {
            return Err(Error::Api(err.message.clone()));
        }
        envelope.data.ok_or(Error::MissingData("response"))
    }

    fn report_node(data: ResponseData) -> Result<ReportNode> {
        data.report_data
            .and_then(|rd| rd.report)
            .ok_or(Error::MissingData("report"))
    }

    async fn fetch_events_page(
        &self,
        code: &str,
        filter: &EventFilter,
        cursor: Option<f64>,
    ) -> Result<EventsPage> {
        let vars = queries::event_variables(code, filter, cursor);
        let data = self.query(queries::EVENTS, vars).await?;
        Self::report_node(data)?
            .events
            .ok_or(Error::MissingData("events"))
    }
}

impl ReportApi for GraphQlClient {
    async fn fetch_report(&self, code: &str) -> Result<ReportOverview> {
        let data = self
            .query(queries::REPORT_OVERVIEW, queries::report_variables(code))
            .await?;
        let report = Self::report_node(data)?;
        Ok(ReportOverview {
            title: report.title,
            start_time: report.start_time,
            end_time: report.end_time,
            fights: report.fights,
        })
    }

    async fn fetch_actors(&self, code: &str) -> Result<Vec<Actor>> {
        let data = self
            .query(queries::MASTER_DATA, queries::report_variables(code))
            .await?;
        let master = Self::report_node(data)?
            .master_data
            .ok_or(Error::MissingData("actor"))?;
        Ok(master.actors)
    }

    async fn fetch_ability(&self, ability_id: i64) -> Result<Option<AbilityInfo>> {
        let data = self
            .query(
                queries::ABILITY_LOOKUP,
                queries::ability_variables(ability_id),
            )
            .await?;
        Ok(data.game_data.and_then(|gd| gd.ability))
    }

    /// Fetch events, looping on the page cursor until the service reports no
    /// further pages.
    async fn fetch_events(&self, code: &str, filter: &EventFilter) -> Result<Vec<Event>> {
        let mut all = Vec::new();
        let mut cursor: Option<f64> = None;

        loop {
            let page = self.fetch_events_page(code, filter, cursor).await?;
            if let Some(data) = page.data {
                all.extend(events::parse_events(data)?);
            }
            match page.next_page_timestamp {
                Some(next) => {
                    tracing::debug!("[API] events page cursor -> {next}");
                    cursor = Some(next);
                }
                None => break,
            }
        }

        Ok(all)
    }
}
