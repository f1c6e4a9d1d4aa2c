//! Data Nova - inclusive growth score (IGS) analytics for Lonoke County, Arkansas
//!
//! This library provides:
//! - Historical IGS observations from pluggable providers with a fallback series
//! - Policy-intervention projections to a target year against a success threshold
//! - Batch and parallel grid sweeps over intervention sets
//! - Report assembly with CSV, JSON and PDF-table exports
//! - The policy simulation endpoint and persisted dashboard settings

pub mod api;
pub mod history;
pub mod projection;
pub mod report;
pub mod scenario;
pub mod settings;

// Re-export commonly used types
pub use history::{FallbackProvider, HistoricalDataProvider, YearlyObservation};
pub use projection::{InterventionParameters, ProjectionEngine, ProjectionError, ProjectionResult};
pub use report::{ExportFormat, ReportData, ReportType};
pub use scenario::ScenarioRunner;
pub use settings::DashboardSettings;
