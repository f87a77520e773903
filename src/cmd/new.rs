//! New command - start an empty workbook for a year

use crate::cmd;
use crate::core::{RateSettings, Session};
use crate::workbook;
use chrono::{Datelike, Utc};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct NewCommand {
    /// Workbook file to create (default: PiA_Abrechnung_<year>.csv)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Calendar year
    #[arg(short, long)]
    year: Option<i32>,

    /// Replace an existing file
    #[arg(long)]
    force: bool,
}

impl NewCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let year = self
            .year
            .or_else(|| {
                self.file
                    .as_deref()
                    .and_then(workbook::year_from_filename)
            })
            .unwrap_or_else(|| Utc::now().year());
        let file = self
            .file
            .clone()
            .unwrap_or_else(|| PathBuf::from(workbook::default_file_name(year)));

        if file.exists() && !self.force {
            anyhow::bail!(
                "{} already exists - pass --force to replace it",
                file.display()
            );
        }

        let mut session = Session::new(year, RateSettings::default());
        session.attach_file(&file);
        cmd::save_session(&mut session)?;
        println!("Started empty workbook {} for {}", file.display(), year);
        Ok(())
    }
}
