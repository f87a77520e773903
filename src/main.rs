//! lohnbuch - personal salary and deduction tracker.
//!
//! Records monthly ALG I / PiA income and statutory deductions in a CSV
//! workbook, one file per calendar year, and derives insurance amounts,
//! total deductions and net income from configurable rates.

use clap::{Parser, Subcommand};

mod cmd;
mod core;
mod workbook;

#[derive(Parser, Debug)]
#[command(name = "lohnbuch", version, about = "Personal salary and deduction tracker")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start an empty workbook for a year
    New(cmd::new::NewCommand),
    /// Record one month's income and deductions
    Add(cmd::add::AddCommand),
    /// Change fields of an existing month's record
    Edit(cmd::edit::EditCommand),
    /// Delete one month's record
    Remove(cmd::remove::RemoveCommand),
    /// Print the year overview table
    Table(cmd::table::TableCommand),
    /// Render the net income chart
    Chart(cmd::chart::ChartCommand),
    /// Print expected workbook formats
    Schema(cmd::schema::SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::New(cmd) => cmd.exec(),
        Command::Add(cmd) => cmd.exec(),
        Command::Edit(cmd) => cmd.exec(),
        Command::Remove(cmd) => cmd.exec(),
        Command::Table(cmd) => cmd.exec(),
        Command::Chart(cmd) => cmd.exec(),
        Command::Schema(cmd) => cmd.exec(),
    }
}
