//! Load yearly IGS observations from trend CSV exports
//!
//! Column headers vary between exports (`igs`, `IGS`, `igs_score`, `IGS Score`, ...),
//! so every field accepts the known aliases.

use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use log::debug;

use super::data::{normalize_series, YearlyObservation};
use super::HistoryError;

/// Raw CSV row; every column optional so aliases and gaps can be checked explicitly
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(default, alias = "Year", alias = "DATE", alias = "date")]
    year: Option<String>,
    #[serde(default, alias = "igs", alias = "IGS", alias = "IGS Score")]
    igs_score: Option<f64>,
    #[serde(default, alias = "place", alias = "Place")]
    place_score: Option<f64>,
    #[serde(default, alias = "economy", alias = "Economy")]
    economy_score: Option<f64>,
    #[serde(default, alias = "community", alias = "Community")]
    community_score: Option<f64>,
    #[serde(default, alias = "Median_Income")]
    median_income: Option<f64>,
    #[serde(default, alias = "Broadband_Access_Pct")]
    broadband_access_pct: Option<f64>,
    #[serde(default, alias = "Housing_Burden_Pct")]
    housing_cost_burden_pct: Option<f64>,
    #[serde(default, alias = "Early_Education_Pct")]
    early_education_enrollment_pct: Option<f64>,
    #[serde(default, alias = "minority_owned_businesses_pct", alias = "Minority_Business_Pct")]
    minority_owned_business_pct: Option<f64>,
}

impl CsvRow {
    /// `Ok(None)` for rows without a usable year, which are skipped
    fn to_observation(self) -> Result<Option<YearlyObservation>, HistoryError> {
        let year = match self.year.as_deref().map(str::trim).and_then(|y| y.parse::<f64>().ok()) {
            Some(y) if y.is_finite() && y.fract() == 0.0 => y as i32,
            _ => {
                debug!("Skipping trend row without a usable year: {:?}", self.year);
                return Ok(None);
            }
        };

        let require = |column: &'static str, value: Option<f64>| match value {
            Some(v) if v.is_finite() => Ok(v),
            _ => Err(HistoryError::MissingValue { year, column }),
        };

        Ok(Some(YearlyObservation {
            year,
            igs_score: require("igs_score", self.igs_score)?,
            place_score: require("place_score", self.place_score)?,
            economy_score: require("economy_score", self.economy_score)?,
            community_score: require("community_score", self.community_score)?,
            median_income: self.median_income,
            broadband_access_pct: self.broadband_access_pct,
            housing_cost_burden_pct: self.housing_cost_burden_pct,
            early_education_enrollment_pct: self.early_education_enrollment_pct,
            minority_owned_business_pct: self.minority_owned_business_pct,
        }))
    }
}

/// Load a yearly series from a CSV file
pub fn load_series<P: AsRef<Path>>(path: P) -> Result<Vec<YearlyObservation>, HistoryError> {
    let file = std::fs::File::open(path.as_ref()).map_err(|source| HistoryError::Io {
        path: path.as_ref().to_path_buf(),
        source,
    })?;
    load_series_from_reader(file)
}

/// Load a yearly series from any reader (e.g., string buffer, network stream)
pub fn load_series_from_reader<R: Read>(reader: R) -> Result<Vec<YearlyObservation>, HistoryError> {
    let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let mut series = Vec::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        if let Some(observation) = row.to_observation()? {
            series.push(observation);
        }
    }

    normalize_series(series)
}
