//! Schema command - print expected workbook formats

use crate::workbook::{RowRecord, HEADERS};
use clap::Args;
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Output format
    #[arg(value_enum, default_value = "csv-header")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// Workbook header row with column names
    CsvHeader,
    /// Workbook column descriptions
    CsvFields,
    /// JSON Schema for one workbook row
    JsonSchema,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::CsvHeader => self.print_csv_header(),
            SchemaFormat::CsvFields => self.print_csv_fields(),
            SchemaFormat::JsonSchema => self.print_json_schema(),
        }
    }

    fn print_csv_header(&self) -> anyhow::Result<()> {
        println!("{}", HEADERS.join(","));
        Ok(())
    }

    fn print_csv_fields(&self) -> anyhow::Result<()> {
        println!("Workbook columns");
        println!("================");
        println!();
        for (name, required, description) in CSV_FIELD_DESCRIPTIONS {
            let req = if *required { "required" } else { "optional" };
            println!("{:36} ({:8})  {}", name, req, description);
        }
        println!();
        println!("One row per month Januar..Dezember; the year comes from the file name.");
        Ok(())
    }

    fn print_json_schema(&self) -> anyhow::Result<()> {
        let schema = schema_for!(RowRecord);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        Ok(())
    }
}

const CSV_FIELD_DESCRIPTIONS: &[(&str, bool, &str)] = &[
    ("Monat", true, "German month name (Januar..Dezember)"),
    ("ALG I (€)", false, "Unemployment benefit income"),
    (
        "Nebeneinkommen / PiA-Vergütung (€)",
        false,
        "Secondary / training income",
    ),
    (
        "Bruttogesamteinkommen (€)",
        false,
        "Gross income; recomputed as ALG I + PiA when either is present",
    ),
    ("Einkommenssteuer (€)", false, "Income tax, entered manually"),
    (
        "Rentenversicherung (€)",
        false,
        "Pension insurance; derived from the pension rate in auto mode",
    ),
    (
        "Kranken-/Pflegeversicherung (€)",
        false,
        "Health/care insurance; derived from the health rate in auto mode",
    ),
    (
        "Arbeitslosenversicherung (€)",
        false,
        "Unemployment insurance; derived from the unemployment rate in auto mode",
    ),
    (
        "Gesamtabzüge (€)",
        false,
        "Tax plus the three insurance amounts; always recomputed on import",
    ),
    (
        "Nettoeinkommen (€)",
        false,
        "Gross minus total deductions; always recomputed on import",
    ),
    ("Bemerkungen", false, "Free text"),
];
