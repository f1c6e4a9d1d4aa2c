//! Historical IGS observations and the providers that supply them

mod data;
mod importance;
pub mod loader;
mod provider;

pub use data::{
    latest_pair, normalize_series, observation_for_year, reference_series, YearlyObservation,
    LONOKE_DISPLAY_NAME, LONOKE_REGION,
};
pub use importance::{
    fallback_importance, load_importance_from_reader, load_importance_or_fallback, FeatureImportance,
};
pub use loader::{load_series, load_series_from_reader};
pub use provider::{
    CommandProvider, CsvProvider, EmbeddedProvider, FallbackProvider, HistoricalDataProvider,
    SeriesOrigin, DEFAULT_COMMAND_TIMEOUT,
};

use std::path::PathBuf;
use std::time::Duration;

/// Errors that can occur while loading historical data
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// Reading a data file failed.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV parsing failed.
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A row has a year but lacks a required score.
    #[error("{year}: missing or non-finite {column}")]
    MissingValue { year: i32, column: &'static str },

    /// Two records share the same year.
    #[error("duplicate observation for year {0}")]
    DuplicateYear(i32),

    /// The provider holds no data for this region.
    #[error("no data for region `{0}`")]
    UnknownRegion(String),

    /// The external data command could not be started or awaited.
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The external data command exited unsuccessfully.
    #[error("`{program}` exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },

    /// The external data command ran past its deadline and was killed.
    #[error("`{program}` timed out after {timeout:?}")]
    Timeout { program: String, timeout: Duration },
}
