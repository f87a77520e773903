pub mod add;
pub mod chart;
pub mod edit;
pub mod new;
pub mod remove;
pub mod schema;
pub mod table;

use crate::core::{percentage_to_rate, RateSettings, Session};
use crate::workbook;
use anyhow::Context;
use chrono::{Datelike, Utc};
use clap::Args;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Deduction settings flags shared by every command that derives amounts.
///
/// Rates are human-facing percentages; the conversion to internal fractions
/// happens here and nowhere else.
#[derive(Args, Debug)]
pub struct RateArgs {
    /// Enter the three insurance amounts manually instead of deriving them
    #[arg(long)]
    pub manual: bool,

    /// Pension insurance rate in percent
    #[arg(long, default_value = "9.3")]
    pub pension_rate: Decimal,

    /// Health/care insurance rate in percent
    #[arg(long, default_value = "9.0")]
    pub health_rate: Decimal,

    /// Unemployment insurance rate in percent
    #[arg(long, default_value = "1.3")]
    pub unemployment_rate: Decimal,
}

impl RateArgs {
    pub fn to_settings(&self) -> anyhow::Result<RateSettings> {
        for (name, value) in [
            ("pension-rate", self.pension_rate),
            ("health-rate", self.health_rate),
            ("unemployment-rate", self.unemployment_rate),
        ] {
            anyhow::ensure!(value >= Decimal::ZERO, "--{} must not be negative", name);
        }
        Ok(RateSettings {
            auto_calculate_deductions: !self.manual,
            pension_rate: percentage_to_rate(self.pension_rate),
            health_care_rate: percentage_to_rate(self.health_rate),
            unemployment_rate: percentage_to_rate(self.unemployment_rate),
        })
    }
}

/// Resolve the working year: explicit flag, the file name, or today
pub fn resolve_year(file: &Path, year: Option<i32>) -> i32 {
    year.or_else(|| workbook::year_from_filename(file))
        .unwrap_or_else(|| Utc::now().year())
}

/// Load a session from a workbook file and bind it for save-back
pub fn load_session(
    file: &Path,
    year: Option<i32>,
    settings: RateSettings,
) -> anyhow::Result<Session> {
    let year = resolve_year(file, year);
    let handle = File::open(file)
        .with_context(|| format!("failed to open workbook {}", file.display()))?;
    let records = workbook::read_workbook(BufReader::new(handle), year, &settings)?;
    let mut session = Session::new(year, settings);
    session.replace_records(records);
    session.attach_file(file);
    Ok(session)
}

/// Load a session, starting an empty one if the workbook does not exist yet
pub fn load_or_create_session(
    file: &Path,
    year: Option<i32>,
    settings: RateSettings,
) -> anyhow::Result<Session> {
    if file.exists() {
        load_session(file, year, settings)
    } else {
        log::info!("Workbook {} not found, starting empty", file.display());
        let mut session = Session::new(resolve_year(file, year), settings);
        session.attach_file(file);
        Ok(session)
    }
}

/// Write the session's records back to its bound workbook file
pub fn save_session(session: &mut Session) -> anyhow::Result<()> {
    let path = session
        .file()
        .context("session has no bound workbook file")?
        .to_path_buf();
    let handle = File::create(&path)
        .with_context(|| format!("failed to write workbook {}", path.display()))?;
    workbook::write_workbook(BufWriter::new(handle), session.records(), session.year())?;
    session.mark_saved();
    Ok(())
}
