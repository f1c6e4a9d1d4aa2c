//! Flat CSV exports

use std::io::Write;

use ::csv::Writer;

use super::{cell2, opt_cell, ReportData, ReportError, ReportType, Table};

/// Build the flat row-set for `report_type`
pub fn csv_table(data: &ReportData, report_type: ReportType) -> Table {
    match report_type {
        ReportType::Comprehensive => {
            let mut table = Table::new(&[
                "Year",
                "IGS_Score",
                "Place_Score",
                "Economy_Score",
                "Community_Score",
                "Median_Income",
                "Broadband_Access_Pct",
                "Housing_Burden_Pct",
                "Early_Education_Pct",
                "Minority_Business_Pct",
            ]);
            for o in &data.historical_data {
                table.push(vec![
                    o.year.to_string(),
                    cell2(o.igs_score),
                    cell2(o.place_score),
                    cell2(o.economy_score),
                    cell2(o.community_score),
                    opt_cell(o.median_income, 0),
                    opt_cell(o.broadband_access_pct, 1),
                    opt_cell(o.housing_cost_burden_pct, 1),
                    opt_cell(o.early_education_enrollment_pct, 1),
                    opt_cell(o.minority_owned_business_pct, 2),
                ]);
            }
            table
        }
        ReportType::Summary => {
            let mut table = Table::new(&["Metric", "Current_Value", "Previous_Value", "Change_Pct"]);
            for m in data.key_metrics() {
                table.push(vec![
                    m.metric,
                    cell2(m.current),
                    opt_cell(m.previous, 2),
                    opt_cell(m.change_pct, 2),
                ]);
            }
            table
        }
        ReportType::Trends => {
            let mut table = Table::new(&[
                "Year",
                "IGS_Score",
                "Growth_Rate_Pct",
                "Place_Score",
                "Economy_Score",
                "Community_Score",
            ]);
            for t in data.yearly_trends() {
                table.push(vec![
                    t.year.to_string(),
                    cell2(t.igs_score),
                    opt_cell(t.growth_rate_pct, 2),
                    cell2(t.place_score),
                    cell2(t.economy_score),
                    cell2(t.community_score),
                ]);
            }
            table
        }
        ReportType::Pillars => {
            let mut table = Table::new(&["Pillar", "Score", "Weight_Pct", "Status"]);
            for p in data.pillars() {
                table.push(vec![p.pillar, cell2(p.score), format!("{:.1}", p.weight_pct), p.status]);
            }
            table
        }
        ReportType::Predictions => {
            let mut table = Table::new(&[
                "Year",
                "Baseline_Scenario",
                "Housing_Intervention",
                "Education_Intervention",
                "Business_Intervention",
                "Combined_Intervention",
                "Threshold_Target",
                "Model_R2_Accuracy",
            ]);
            for r in &data.projection.rows {
                table.push(vec![
                    r.year.to_string(),
                    cell2(r.baseline_score),
                    cell2(r.housing_scenario_score),
                    cell2(r.education_scenario_score),
                    cell2(r.business_scenario_score),
                    cell2(r.combined_scenario_score),
                    cell2(data.projection.threshold_value),
                    cell2(data.model_info.r2_score),
                ]);
            }
            table
        }
    }
}

/// Write the report as CSV with a header row
pub fn write_csv<W: Write>(data: &ReportData, report_type: ReportType, writer: W) -> Result<(), ReportError> {
    let table = csv_table(data, report_type);
    if table.is_empty() {
        return Err(ReportError::Empty(report_type));
    }

    let mut csv_writer = Writer::from_writer(writer);
    csv_writer.write_record(&table.head)?;
    for row in &table.body {
        csv_writer.write_record(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn to_csv_string(data: &ReportData, report_type: ReportType) -> Result<String, ReportError> {
    let mut buf = Vec::new();
    write_csv(data, report_type, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}
