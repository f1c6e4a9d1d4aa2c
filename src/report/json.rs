//! JSON exports with an `export_metadata` envelope

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{ReportData, ReportError, ReportType};

pub const EXPORT_DATA_SOURCE: &str = "Lonoke County IGS Analysis";
pub const EXPORT_VERSION: &str = "2.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub date_range: String,
    /// RFC 3339 UTC timestamp with milliseconds
    pub export_date: String,
    pub report_type: ReportType,
    pub data_source: String,
    pub version: String,
}

impl ExportMetadata {
    pub fn new(report_type: ReportType, date_range: &str, exported_at: DateTime<Utc>) -> Self {
        Self {
            date_range: date_range.to_string(),
            export_date: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            report_type,
            data_source: EXPORT_DATA_SOURCE.to_string(),
            version: EXPORT_VERSION.to_string(),
        }
    }
}

/// Report body for `report_type` with `export_metadata` attached.
///
/// `date_range` is a label only; it does not filter the data.
pub fn build_json_export(
    data: &ReportData,
    report_type: ReportType,
    date_range: &str,
    exported_at: DateTime<Utc>,
) -> Result<Value, ReportError> {
    let mut body = match report_type {
        ReportType::Comprehensive => serde_json::to_value(data)?,
        ReportType::Summary => json!({
            "metadata": data.metadata,
            "executive_summary": data.executive_summary,
            "key_metrics": data.key_metrics(),
        }),
        ReportType::Trends => json!({
            "metadata": data.metadata,
            "yearly_trends": data.yearly_trends(),
        }),
        ReportType::Pillars => json!({
            "metadata": data.metadata,
            "pillars": data.pillars(),
        }),
        ReportType::Predictions => json!({
            "metadata": data.metadata,
            "projection": data.projection,
            "impacts": data.projection.impact_summary,
            "summary": data.projection.summary(),
            "scenario": data.scenario,
            "model_info": data.model_info,
            "feature_importance": data.feature_importance,
        }),
    };

    let metadata = ExportMetadata::new(report_type, date_range, exported_at);
    if let Value::Object(map) = &mut body {
        map.insert("export_metadata".to_string(), serde_json::to_value(metadata)?);
    }
    Ok(body)
}

/// Pretty-printed [`build_json_export`]
pub fn to_json_string(
    data: &ReportData,
    report_type: ReportType,
    date_range: &str,
    exported_at: DateTime<Utc>,
) -> Result<String, ReportError> {
    let value = build_json_export(data, report_type, date_range, exported_at)?;
    Ok(serde_json::to_string_pretty(&value)?)
}
