//! Shared configuration types.
//!
//! The CLI persists these via `confy`; core builds its API client from them.

use serde::{Deserialize, Serialize};

/// Default GraphQL endpoint of the public client API.
pub const DEFAULT_ENDPOINT: &str = "https://www.warcraftlogs.com/api/v2/client";

/// API connection settings, stored as TOML in the user's config directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// GraphQL endpoint to query.
    pub endpoint: String,
    /// OAuth bearer token. Obtaining/refreshing it is the caller's problem;
    /// an empty token is treated as "not configured".
    pub access_token: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            access_token: String::new(),
        }
    }
}

impl ApiConfig {
    pub fn has_token(&self) -> bool {
        !self.access_token.trim().is_empty()
    }
}
