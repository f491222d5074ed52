pub mod analysis;
pub mod api;
pub mod config;
pub mod correlate;
pub mod deaths;
pub mod error;
pub mod events;
pub mod lookup;

// Re-exports for convenience
pub use analysis::{DeathAnalysis, InterruptAnalysis, ReportAnalyzer};
pub use api::{GraphQlClient, ReportApi};
pub use error::{Error, Result};
pub use events::{Event, EventKind};
pub use lookup::LookupService;
