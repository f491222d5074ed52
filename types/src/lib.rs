pub mod config;
pub mod formatting;

pub use config::{ApiConfig, DEFAULT_ENDPOINT};
