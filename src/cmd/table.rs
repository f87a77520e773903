//! Table command - year overview with totals and averages

use crate::cmd::{self, RateArgs};
use crate::core::{month_name, MonthlyRecord, YearSummary};
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct TableCommand {
    /// Workbook file
    #[arg(short, long)]
    file: PathBuf,

    /// Calendar year (defaults to the year in the file name)
    #[arg(short, long)]
    year: Option<i32>,

    /// Output as JSON instead of a formatted table
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    rates: RateArgs,
}

/// Row for the month table output
#[derive(Debug, Clone, Tabled)]
struct MonthRow {
    #[tabled(rename = "Monat")]
    month: String,
    #[tabled(rename = "ALG I")]
    alg1: String,
    #[tabled(rename = "PiA")]
    pia: String,
    #[tabled(rename = "Brutto")]
    gross: String,
    #[tabled(rename = "Steuer")]
    tax: String,
    #[tabled(rename = "Rente")]
    pension: String,
    #[tabled(rename = "KV/PV")]
    health: String,
    #[tabled(rename = "AV")]
    unemployment: String,
    #[tabled(rename = "Abzüge")]
    deductions: String,
    #[tabled(rename = "Netto")]
    net: String,
    #[tabled(rename = "Bemerkungen")]
    notes: String,
}

impl MonthRow {
    fn from_record(record: &MonthlyRecord) -> Self {
        MonthRow {
            month: month_name(record.month).to_string(),
            alg1: format_eur(record.alg1_income),
            pia: format_eur(record.pia_income),
            gross: format_eur(record.gross_salary),
            tax: format_eur(record.income_tax),
            pension: format_eur(record.pension_insurance),
            health: format_eur(record.health_insurance),
            unemployment: format_eur(record.unemployment_insurance),
            deductions: format_eur(record.total_deductions),
            net: format_eur(record.net_income),
            notes: record.notes.clone().unwrap_or_default(),
        }
    }
}

/// Year data for JSON output
#[derive(Debug, Serialize)]
struct TableData {
    year: i32,
    record_count: usize,
    months: Vec<MonthData>,
    totals: Totals,
    averages: Totals,
}

#[derive(Debug, Serialize)]
struct MonthData {
    month: u32,
    month_name: String,
    alg1_income: String,
    pia_income: String,
    gross_salary: String,
    income_tax: String,
    pension_insurance: String,
    health_insurance: String,
    unemployment_insurance: String,
    total_deductions: String,
    net_income: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
}

#[derive(Debug, Serialize)]
struct Totals {
    gross_salary: String,
    total_deductions: String,
    net_income: String,
}

impl TableCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let settings = self.rates.to_settings()?;
        let session = cmd::load_session(&self.file, self.year, settings)?;
        let year = session.year();
        let records = session.records_for_year(year);
        let summary = YearSummary::of(session.records(), year);

        if self.json {
            self.print_json(&records, &summary)
        } else {
            self.print_table(&records, &summary);
            Ok(())
        }
    }

    fn print_table(&self, records: &[&MonthlyRecord], summary: &YearSummary) {
        if records.is_empty() {
            println!("No records found for {}", summary.year);
            return;
        }

        println!();
        println!("JAHRESÜBERSICHT {}", summary.year);
        println!();

        let rows: Vec<MonthRow> = records.iter().map(|r| MonthRow::from_record(r)).collect();
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
        println!();

        println!("Monate erfasst: {}", summary.record_count);
        println!(
            "Gesamt:             Brutto {} | Abzüge {} | Netto {}",
            format_eur(summary.total_gross),
            format_eur(summary.total_deductions),
            format_eur(summary.total_net)
        );
        println!(
            "Durchschnitt/Monat: Brutto {} | Abzüge {} | Netto {}",
            format_eur(summary.monthly_average(summary.total_gross)),
            format_eur(summary.monthly_average(summary.total_deductions)),
            format_eur(summary.monthly_average(summary.total_net))
        );
        println!();
    }

    fn print_json(&self, records: &[&MonthlyRecord], summary: &YearSummary) -> anyhow::Result<()> {
        let data = TableData {
            year: summary.year,
            record_count: summary.record_count,
            months: records
                .iter()
                .map(|r| MonthData {
                    month: r.month,
                    month_name: month_name(r.month).to_string(),
                    alg1_income: format!("{:.2}", r.alg1_income),
                    pia_income: format!("{:.2}", r.pia_income),
                    gross_salary: format!("{:.2}", r.gross_salary),
                    income_tax: format!("{:.2}", r.income_tax),
                    pension_insurance: format!("{:.2}", r.pension_insurance),
                    health_insurance: format!("{:.2}", r.health_insurance),
                    unemployment_insurance: format!("{:.2}", r.unemployment_insurance),
                    total_deductions: format!("{:.2}", r.total_deductions),
                    net_income: format!("{:.2}", r.net_income),
                    notes: r.notes.clone(),
                })
                .collect(),
            totals: Totals {
                gross_salary: format!("{:.2}", summary.total_gross),
                total_deductions: format!("{:.2}", summary.total_deductions),
                net_income: format!("{:.2}", summary.total_net),
            },
            averages: Totals {
                gross_salary: format!("{:.2}", summary.monthly_average(summary.total_gross)),
                total_deductions: format!(
                    "{:.2}",
                    summary.monthly_average(summary.total_deductions)
                ),
                net_income: format!("{:.2}", summary.monthly_average(summary.total_net)),
            },
        };

        println!("{}", serde_json::to_string_pretty(&data)?);
        Ok(())
    }
}

fn format_eur(amount: Decimal) -> String {
    format!("€{:.2}", amount)
}
