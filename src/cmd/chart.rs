//! Chart command - SVG bar chart of monthly net income

use crate::cmd::{self, RateArgs};
use crate::core::{month_name, MonthlyRecord};
use clap::Args;
use rust_decimal::prelude::ToPrimitive;
use std::path::PathBuf;
use svg::node::element::{Line, Rectangle, Text};
use svg::node::Text as TextContent;
use svg::Document;

#[derive(Args, Debug)]
pub struct ChartCommand {
    /// Workbook file
    #[arg(short, long)]
    file: PathBuf,

    /// Calendar year (defaults to the year in the file name)
    #[arg(short, long)]
    year: Option<i32>,

    /// Output SVG file (default: Nettoeinkommen_<year>.svg)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Open the rendered chart afterwards
    #[arg(long)]
    open: bool,

    #[command(flatten)]
    rates: RateArgs,
}

impl ChartCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let settings = self.rates.to_settings()?;
        let session = cmd::load_session(&self.file, self.year, settings)?;
        let year = session.year();
        let records = session.records_for_year(year);
        anyhow::ensure!(!records.is_empty(), "no records found for {}", year);

        let output = self
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("Nettoeinkommen_{}.svg", year)));

        let document = render(&records, year);
        svg::save(&output, &document)?;
        println!("Chart written to {}", output.display());

        if self.open {
            opener::open(&output)?;
        }
        Ok(())
    }
}

const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 620.0;
const MARGIN: f64 = 60.0;
const BAR_FILL: &str = "#3a7ca5";

/// Lay out twelve month slots; months without a record stay empty
fn render(records: &[&MonthlyRecord], year: i32) -> Document {
    let max_net = records
        .iter()
        .map(|r| r.net_income.to_f64().unwrap_or(0.0))
        .fold(0.0_f64, f64::max)
        .max(1.0);
    let min_net = records
        .iter()
        .map(|r| r.net_income.to_f64().unwrap_or(0.0))
        .fold(0.0_f64, f64::min);

    let slot = WIDTH / 12.0;
    let bar_width = slot * 0.7;
    let span = max_net - min_net;
    let scale_y = |value: f64| HEIGHT - (value - min_net) / span * HEIGHT;
    let baseline = scale_y(0.0);

    let mut document = Document::new()
        .set("viewBox", (
            -MARGIN,
            -MARGIN,
            WIDTH + 2.0 * MARGIN,
            HEIGHT + 2.0 * MARGIN,
        ))
        .add(
            Text::new()
                .set("x", WIDTH / 2.0)
                .set("y", -MARGIN / 2.0)
                .set("text-anchor", "middle")
                .set("font-size", 20)
                .add(TextContent::new(format!("Nettoeinkommen {}", year))),
        );

    for month in 1..=12u32 {
        let x = (month - 1) as f64 * slot;
        if let Some(record) = records.iter().find(|r| r.month == month) {
            let value = record.net_income.to_f64().unwrap_or(0.0);
            let y = scale_y(value);
            let (top, height) = if value >= 0.0 {
                (y, baseline - y)
            } else {
                (baseline, y - baseline)
            };
            document = document.add(
                Rectangle::new()
                    .set("x", x + (slot - bar_width) / 2.0)
                    .set("y", top)
                    .set("width", bar_width)
                    .set("height", height)
                    .set("fill", BAR_FILL),
            );
        }
        document = document.add(
            Text::new()
                .set("x", x + slot / 2.0)
                .set("y", HEIGHT + 24.0)
                .set("text-anchor", "middle")
                .set("font-size", 12)
                .add(TextContent::new(
                    month_name(month).chars().take(3).collect::<String>(),
                )),
        );
    }

    let xaxis = Line::new()
        .set("x1", 0.0)
        .set("x2", WIDTH)
        .set("y1", baseline)
        .set("y2", baseline)
        .set("stroke", "black")
        .set("stroke-width", 2.0);
    let yaxis = Line::new()
        .set("x1", 0.0)
        .set("x2", 0.0)
        .set("y1", 0.0)
        .set("y2", HEIGHT)
        .set("stroke", "black")
        .set("stroke-width", 2.0);

    document.add(xaxis).add(yaxis)
}
