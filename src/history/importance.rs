//! Feature importance of the IGS model, for the indicator breakdown view

use std::io::Read;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use super::HistoryError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

impl FeatureImportance {
    fn new(feature: &str, importance: f64) -> Self {
        Self {
            feature: feature.to_string(),
            importance,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default, alias = "Feature", alias = "variable", alias = "Feature Name")]
    feature: Option<String>,
    #[serde(default, alias = "Importance", alias = "value", alias = "Importance Score")]
    importance: Option<f64>,
}

/// Shown whenever the importance export can't be read
pub fn fallback_importance() -> Vec<FeatureImportance> {
    vec![
        FeatureImportance::new("Broadband Access", 0.22),
        FeatureImportance::new("Median Income Growth", 0.18),
        FeatureImportance::new("Business Formation", 0.15),
        FeatureImportance::new("Labor Participation", 0.14),
        FeatureImportance::new("Housing Affordability", 0.12),
        FeatureImportance::new("Commute Time", 0.08),
        FeatureImportance::new("Green Space", 0.06),
        FeatureImportance::new("Crime Rate", 0.05),
    ]
}

/// Read `feature,importance` rows, dropping blank names and non-finite values,
/// most important first
pub fn load_importance_from_reader<R: Read>(reader: R) -> Result<Vec<FeatureImportance>, HistoryError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut rows = Vec::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        match (row.feature, row.importance) {
            (Some(feature), Some(importance)) if !feature.is_empty() && importance.is_finite() => {
                rows.push(FeatureImportance { feature, importance });
            }
            _ => continue,
        }
    }

    rows.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    Ok(rows)
}

/// Load from disk; any failure or an empty file yields [`fallback_importance`]
pub fn load_importance_or_fallback<P: AsRef<Path>>(path: P) -> Vec<FeatureImportance> {
    let path = path.as_ref();
    let loaded = std::fs::File::open(path)
        .map_err(|source| HistoryError::Io {
            path: path.to_path_buf(),
            source,
        })
        .and_then(load_importance_from_reader);

    match loaded {
        Ok(rows) if !rows.is_empty() => rows,
        Ok(_) => {
            warn!("{} has no usable feature importance rows, using fallback", path.display());
            fallback_importance()
        }
        Err(e) => {
            warn!("Failed to read feature importance: {}; using fallback", e);
            fallback_importance()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_sorted_descending() {
        let csv = "\
Feature,Importance
Housing Cost Burden %,0.0765
Median Household Income,0.1245
,0.5
Broadband Access %,0.0987
";
        let rows = load_importance_from_reader(csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].feature, "Median Household Income");
        assert_eq!(rows[2].importance, 0.0765);
    }

    #[test]
    fn test_missing_file_uses_fallback() {
        let rows = load_importance_or_fallback("/nonexistent/igs_score_feature_importance.csv");
        assert_eq!(rows, fallback_importance());
        assert_eq!(rows[0].feature, "Broadband Access");
    }
}
