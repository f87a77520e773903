//! Remove command - delete one month's record

use crate::cmd::{self, RateArgs};
use crate::core::month_name;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct RemoveCommand {
    /// Workbook file
    #[arg(short, long)]
    file: PathBuf,

    /// Month number 1-12
    #[arg(short, long)]
    month: u32,

    /// Calendar year (defaults to the year in the file name)
    #[arg(short, long)]
    year: Option<i32>,

    #[command(flatten)]
    rates: RateArgs,
}

impl RemoveCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let settings = self.rates.to_settings()?;
        let mut session = cmd::load_session(&self.file, self.year, settings)?;
        session.delete_record(self.month)?;
        cmd::save_session(&mut session)?;
        println!("Removed {} {}", month_name(self.month), session.year());
        Ok(())
    }
}
