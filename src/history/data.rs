//! Yearly IGS observations and the county reference table

use serde::{Deserialize, Serialize};

use super::HistoryError;

/// Region id of the single county the dashboard covers (Lonoke County, tract 20800)
pub const LONOKE_REGION: &str = "lonoke-20800";
pub const LONOKE_DISPLAY_NAME: &str = "Lonoke County, Arkansas";

/// One record per (region, year)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyObservation {
    pub year: i32,
    pub igs_score: f64,
    pub place_score: f64,
    pub economy_score: f64,
    pub community_score: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub median_income: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broadband_access_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub housing_cost_burden_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub early_education_enrollment_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minority_owned_business_pct: Option<f64>,
}

impl YearlyObservation {
    /// Scores only, no raw indicators
    pub fn scores(year: i32, igs: f64, place: f64, economy: f64, community: f64) -> Self {
        Self {
            year,
            igs_score: igs,
            place_score: place,
            economy_score: economy,
            community_score: community,
            median_income: None,
            broadband_access_pct: None,
            housing_cost_burden_pct: None,
            early_education_enrollment_pct: None,
            minority_owned_business_pct: None,
        }
    }

    pub fn with_indicators(
        mut self,
        median_income: f64,
        broadband_access_pct: f64,
        housing_cost_burden_pct: f64,
        early_education_enrollment_pct: f64,
        minority_owned_business_pct: f64,
    ) -> Self {
        self.median_income = Some(median_income);
        self.broadband_access_pct = Some(broadband_access_pct);
        self.housing_cost_burden_pct = Some(housing_cost_burden_pct);
        self.early_education_enrollment_pct = Some(early_education_enrollment_pct);
        self.minority_owned_business_pct = Some(minority_owned_business_pct);
        self
    }

    /// True when every raw indicator is present
    pub fn has_indicators(&self) -> bool {
        self.median_income.is_some()
            && self.broadband_access_pct.is_some()
            && self.housing_cost_burden_pct.is_some()
            && self.early_education_enrollment_pct.is_some()
            && self.minority_owned_business_pct.is_some()
    }
}

/// 2019-2024 county scores joined with the raw indicators of the same year.
///
/// Also serves as the fallback series whenever a provider fails.
pub fn reference_series() -> Vec<YearlyObservation> {
    vec![
        YearlyObservation::scores(2019, 40.0, 49.0, 42.0, 28.0).with_indicators(48_500.0, 44.1, 91.0, 50.0, 8.0),
        YearlyObservation::scores(2020, 34.0, 30.0, 30.0, 41.0).with_indicators(45_200.0, 47.3, 89.2, 45.8, 8.1),
        YearlyObservation::scores(2021, 31.0, 23.0, 29.0, 42.0).with_indicators(42_800.0, 51.5, 88.5, 41.2, 8.2),
        YearlyObservation::scores(2022, 29.0, 20.0, 25.0, 43.0).with_indicators(39_600.0, 54.8, 87.8, 37.5, 8.25),
        YearlyObservation::scores(2023, 28.0, 21.0, 22.0, 41.0).with_indicators(37_800.0, 56.9, 87.0, 35.2, 8.28),
        YearlyObservation::scores(2024, 27.0, 21.0, 20.0, 40.0).with_indicators(36_500.0, 58.7, 86.5, 33.4, 8.3),
    ]
}

/// Sort ascending by year and reject duplicate years
pub fn normalize_series(mut series: Vec<YearlyObservation>) -> Result<Vec<YearlyObservation>, HistoryError> {
    series.sort_by_key(|o| o.year);
    if let Some(pair) = series.windows(2).find(|w| w[0].year == w[1].year) {
        return Err(HistoryError::DuplicateYear(pair[0].year));
    }
    Ok(series)
}

/// Look up the observation for an explicit year
pub fn observation_for_year(series: &[YearlyObservation], year: i32) -> Option<&YearlyObservation> {
    series.iter().find(|o| o.year == year)
}

/// The most recent observation and the one for the year before it, if present
pub fn latest_pair(series: &[YearlyObservation]) -> Option<(&YearlyObservation, Option<&YearlyObservation>)> {
    let latest = series.iter().max_by_key(|o| o.year)?;
    Some((latest, observation_for_year(series, latest.year - 1)))
}
