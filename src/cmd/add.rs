//! Add command - record one month's income and deductions

use crate::cmd::{self, RateArgs};
use crate::core::{month_name, CreateOutcome, MonthlyRecord, RecordForm};
use clap::Args;
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct AddCommand {
    /// Workbook file (created if missing)
    #[arg(short, long)]
    file: PathBuf,

    /// Month number 1-12
    #[arg(short, long)]
    month: u32,

    /// Calendar year (defaults to the year in the file name)
    #[arg(short, long)]
    year: Option<i32>,

    /// ALG I income for the month
    #[arg(long, default_value = "0")]
    alg1: Decimal,

    /// Secondary / PiA income for the month
    #[arg(long, default_value = "0")]
    pia: Decimal,

    /// Income tax (always entered manually, tax class dependent)
    #[arg(long, default_value = "0")]
    tax: Decimal,

    /// Pension insurance amount (manual mode)
    #[arg(long)]
    pension: Option<Decimal>,

    /// Health/care insurance amount (manual mode)
    #[arg(long)]
    health: Option<Decimal>,

    /// Unemployment insurance amount (manual mode)
    #[arg(long)]
    unemployment: Option<Decimal>,

    /// Free-text note
    #[arg(long)]
    notes: Option<String>,

    /// Update the existing record if the month is already taken
    #[arg(long)]
    overwrite: bool,

    #[command(flatten)]
    rates: RateArgs,
}

impl AddCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let settings = self.rates.to_settings()?;
        let mut session = cmd::load_or_create_session(&self.file, self.year, settings)?;

        let form = RecordForm {
            alg1_income: self.alg1,
            pia_income: self.pia,
            income_tax: self.tax,
            pension_insurance: self.pension,
            health_insurance: self.health,
            unemployment_insurance: self.unemployment,
            notes: self.notes.clone(),
        };

        let outcome = session.add_record(self.month, &form, self.overwrite)?;
        let year = session.year();
        match outcome {
            CreateOutcome::Created { id } => {
                cmd::save_session(&mut session)?;
                println!("Added {} {} (record {})", month_name(self.month), year, id);
            }
            CreateOutcome::Updated { id } => {
                cmd::save_session(&mut session)?;
                println!("Updated {} {} (record {})", month_name(self.month), year, id);
            }
            CreateOutcome::WouldCollide { existing_id } => {
                anyhow::bail!(
                    "{} {} already has record {} - pass --overwrite to update it in place \
                     or pick a different month",
                    month_name(self.month),
                    year,
                    existing_id
                );
            }
        }

        if let Some(record) = session
            .records_for_year(year)
            .into_iter()
            .find(|r| r.month == self.month)
        {
            print_derived(record);
        }
        Ok(())
    }
}

fn print_derived(record: &MonthlyRecord) {
    println!(
        "  Brutto {} | Abzüge {} | Netto {}",
        format_eur(record.gross_salary),
        format_eur(record.total_deductions),
        format_eur(record.net_income)
    );
}

fn format_eur(amount: Decimal) -> String {
    format!("€{:.2}", amount)
}
