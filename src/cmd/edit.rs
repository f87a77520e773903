//! Edit command - partial update of an existing month's record

use crate::cmd::{self, RateArgs};
use crate::core::{month_name, RecordPatch};
use clap::Args;
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct EditCommand {
    /// Workbook file
    #[arg(short, long)]
    file: PathBuf,

    /// Month number 1-12
    #[arg(short, long)]
    month: u32,

    /// Calendar year (defaults to the year in the file name)
    #[arg(short, long)]
    year: Option<i32>,

    /// New ALG I income
    #[arg(long)]
    alg1: Option<Decimal>,

    /// New secondary / PiA income
    #[arg(long)]
    pia: Option<Decimal>,

    /// New income tax
    #[arg(long)]
    tax: Option<Decimal>,

    /// New pension insurance amount (manual mode)
    #[arg(long)]
    pension: Option<Decimal>,

    /// New health/care insurance amount (manual mode)
    #[arg(long)]
    health: Option<Decimal>,

    /// New unemployment insurance amount (manual mode)
    #[arg(long)]
    unemployment: Option<Decimal>,

    /// Replace the note
    #[arg(long)]
    notes: Option<String>,

    #[command(flatten)]
    rates: RateArgs,
}

impl EditCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let settings = self.rates.to_settings()?;
        let mut session = cmd::load_session(&self.file, self.year, settings)?;

        let patch = RecordPatch {
            alg1_income: self.alg1,
            pia_income: self.pia,
            income_tax: self.tax,
            pension_insurance: self.pension,
            health_insurance: self.health,
            unemployment_insurance: self.unemployment,
            notes: self.notes.clone(),
        };
        anyhow::ensure!(!patch.is_empty(), "nothing to change - pass at least one field");

        let id = session.update_record(self.month, &patch)?;
        cmd::save_session(&mut session)?;
        println!(
            "Updated {} {} (record {})",
            month_name(self.month),
            session.year(),
            id
        );

        if let Some(record) = session
            .records_for_year(session.year())
            .into_iter()
            .find(|r| r.month == self.month)
        {
            println!(
                "  Brutto €{:.2} | Abzüge €{:.2} | Netto €{:.2}",
                record.gross_salary, record.total_deductions, record.net_income
            );
        }
        Ok(())
    }
}
