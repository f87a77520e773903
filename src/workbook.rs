//! Workbook serialization - the tabular file boundary.
//!
//! One CSV file per calendar year, laid out like the original PiA sheet:
//! eleven columns, one row per month Januar..Dezember, then a separator,
//! a year overview marker, a totals row and an average row.

use crate::core::{month_from_name, month_name, MonthlyRecord, RateSettings, YearSummary};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::{Read, Write};
use std::path::Path;

/// Workbook column headers, matching the original PiA sheet
pub const HEADERS: [&str; 11] = [
    "Monat",
    "ALG I (€)",
    "Nebeneinkommen / PiA-Vergütung (€)",
    "Bruttogesamteinkommen (€)",
    "Einkommenssteuer (€)",
    "Rentenversicherung (€)",
    "Kranken-/Pflegeversicherung (€)",
    "Arbeitslosenversicherung (€)",
    "Gesamtabzüge (€)",
    "Nettoeinkommen (€)",
    "Bemerkungen",
];

#[derive(Debug, thiserror::Error)]
pub enum WorkbookError {
    #[error("workbook read/write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("workbook i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

/// One workbook row. Amount cells are blank for months without a record and
/// in the separator row, so every amount is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RowRecord {
    /// Month name (Januar..Dezember) or a footer label
    #[serde(rename = "Monat")]
    pub month: String,
    /// ALG I income
    #[serde(rename = "ALG I (€)")]
    #[schemars(with = "Option<f64>")]
    pub alg1_income: Option<Decimal>,
    /// Secondary / PiA income
    #[serde(rename = "Nebeneinkommen / PiA-Vergütung (€)")]
    #[schemars(with = "Option<f64>")]
    pub pia_income: Option<Decimal>,
    /// Total gross income
    #[serde(rename = "Bruttogesamteinkommen (€)")]
    #[schemars(with = "Option<f64>")]
    pub gross_salary: Option<Decimal>,
    /// Income tax (manually entered)
    #[serde(rename = "Einkommenssteuer (€)")]
    #[schemars(with = "Option<f64>")]
    pub income_tax: Option<Decimal>,
    /// Pension insurance
    #[serde(rename = "Rentenversicherung (€)")]
    #[schemars(with = "Option<f64>")]
    pub pension_insurance: Option<Decimal>,
    /// Health/care insurance
    #[serde(rename = "Kranken-/Pflegeversicherung (€)")]
    #[schemars(with = "Option<f64>")]
    pub health_insurance: Option<Decimal>,
    /// Unemployment insurance
    #[serde(rename = "Arbeitslosenversicherung (€)")]
    #[schemars(with = "Option<f64>")]
    pub unemployment_insurance: Option<Decimal>,
    /// Total deductions
    #[serde(rename = "Gesamtabzüge (€)")]
    #[schemars(with = "Option<f64>")]
    pub total_deductions: Option<Decimal>,
    /// Net income
    #[serde(rename = "Nettoeinkommen (€)")]
    #[schemars(with = "Option<f64>")]
    pub net_income: Option<Decimal>,
    /// Free text
    #[serde(rename = "Bemerkungen")]
    pub notes: Option<String>,
}

impl RowRecord {
    fn from_record(record: &MonthlyRecord) -> Self {
        RowRecord {
            month: month_name(record.month).to_string(),
            alg1_income: Some(record.alg1_income),
            pia_income: Some(record.pia_income),
            gross_salary: Some(record.gross_salary),
            income_tax: Some(record.income_tax),
            pension_insurance: Some(record.pension_insurance),
            health_insurance: Some(record.health_insurance),
            unemployment_insurance: Some(record.unemployment_insurance),
            total_deductions: Some(record.total_deductions),
            net_income: Some(record.net_income),
            notes: record.notes.clone(),
        }
    }

    fn blank(month: u32) -> Self {
        RowRecord {
            month: month_name(month).to_string(),
            ..Default::default()
        }
    }

    /// Whether any of the three source income cells carries data; rows
    /// without any are months that were never recorded
    fn has_income(&self) -> bool {
        [self.alg1_income, self.pia_income, self.gross_salary]
            .iter()
            .any(|v| v.unwrap_or_default() > Decimal::ZERO)
    }
}

/// Write the year's records as a workbook
pub fn write_workbook<W: Write>(
    writer: W,
    records: &[MonthlyRecord],
    year: i32,
) -> Result<(), WorkbookError> {
    let mut wtr = csv::Writer::from_writer(writer);
    let summary = YearSummary::of(records, year);

    for month in 1..=12 {
        let row = records
            .iter()
            .find(|r| r.month == month && r.year == year)
            .map(RowRecord::from_record)
            .unwrap_or_else(|| RowRecord::blank(month));
        wtr.serialize(row)?;
    }

    // Separator, then the year overview block
    wtr.serialize(RowRecord::default())?;
    wtr.serialize(RowRecord {
        month: "JAHRESÜBERSICHT".to_string(),
        notes: Some(format!("{} Monate erfasst", summary.record_count)),
        ..Default::default()
    })?;
    wtr.serialize(RowRecord {
        month: format!("Gesamt {}", year),
        alg1_income: Some(summary.total_alg1),
        pia_income: Some(summary.total_pia),
        gross_salary: Some(summary.total_gross),
        income_tax: Some(summary.total_income_tax),
        pension_insurance: Some(summary.total_pension),
        health_insurance: Some(summary.total_health),
        unemployment_insurance: Some(summary.total_unemployment),
        total_deductions: Some(summary.total_deductions),
        net_income: Some(summary.total_net),
        notes: None,
    })?;
    if summary.record_count > 0 {
        wtr.serialize(RowRecord {
            month: "Durchschnitt/Monat".to_string(),
            alg1_income: Some(summary.monthly_average(summary.total_alg1)),
            pia_income: Some(summary.monthly_average(summary.total_pia)),
            gross_salary: Some(summary.monthly_average(summary.total_gross)),
            income_tax: Some(summary.monthly_average(summary.total_income_tax)),
            pension_insurance: Some(summary.monthly_average(summary.total_pension)),
            health_insurance: Some(summary.monthly_average(summary.total_health)),
            unemployment_insurance: Some(summary.monthly_average(summary.total_unemployment)),
            total_deductions: Some(summary.monthly_average(summary.total_deductions)),
            net_income: Some(summary.monthly_average(summary.total_net)),
            notes: None,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read a year's records back from a workbook.
///
/// Only rows labelled with a month name count; the footer block and blank
/// months are skipped. Each imported record gets a fresh identity and runs
/// the full recompute under the given settings - a failed parse aborts the
/// whole import with nothing applied.
pub fn read_workbook<R: Read>(
    reader: R,
    year: i32,
    settings: &RateSettings,
) -> Result<Vec<MonthlyRecord>, WorkbookError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let rows: Result<Vec<RowRecord>, _> = rdr.deserialize().collect();
    let rows = rows?;

    let mut seen: HashSet<u32> = HashSet::new();
    let mut records = Vec::new();
    for row in &rows {
        let Some(month) = month_from_name(&row.month) else {
            continue;
        };
        if !seen.insert(month) || !row.has_income() {
            continue;
        }
        records.push(MonthlyRecord::from_import(
            month,
            year,
            row.alg1_income.unwrap_or_default(),
            row.pia_income.unwrap_or_default(),
            row.gross_salary.unwrap_or_default(),
            row.income_tax.unwrap_or_default(),
            row.pension_insurance.unwrap_or_default(),
            row.health_insurance.unwrap_or_default(),
            row.unemployment_insurance.unwrap_or_default(),
            row.notes.clone(),
            settings,
        ));
    }
    log::info!("Read {} records for {} from workbook", records.len(), year);
    Ok(records)
}

/// First four-digit run in the file name, as the original parses sheet and
/// file names for the year
pub fn year_from_filename(path: &Path) -> Option<i32> {
    let name = path.file_name()?.to_string_lossy().into_owned();
    let bytes = name.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i - start >= 4 {
                return name[start..start + 4].parse().ok();
            }
        } else {
            i += 1;
        }
    }
    None
}

/// Default workbook file name for a year
pub fn default_file_name(year: i32) -> String {
    format!("PiA_Abrechnung_{}.csv", year)
}
