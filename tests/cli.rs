//! E2E tests for the workbook commands

use std::path::PathBuf;
use std::process::{Command, Output};

const FIXTURE: &str = "tests/data/PiA_Abrechnung_2024.csv";

fn run(args: &[&str]) -> Output {
    Command::new("cargo")
        .args(["run", "--"].iter().copied().chain(args.iter().copied()))
        .output()
        .expect("Failed to execute command")
}

/// Test the year overview table against the sample workbook
#[test]
fn table_overview() {
    let output = run(&["table", "-f", FIXTURE]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);

    assert!(stdout.contains("JAHRESÜBERSICHT 2024"));
    assert!(stdout.contains("Januar"));
    assert!(stdout.contains("März"));
    assert!(stdout.contains("€1308.00"));
    assert!(stdout.contains("Monate erfasst: 3"));
    assert!(stdout.contains("Durchschnitt/Monat"));
}

/// Test JSON output of the table command
#[test]
fn table_json_output() {
    let output = run(&["table", "-f", FIXTURE, "--json"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);

    assert!(stdout.contains("\"record_count\": 3"));
    assert!(stdout.contains("\"net_income\": \"1308.00\""));
    assert!(stdout.contains("\"totals\""));
    assert!(stdout.contains("\"averages\""));
}

/// Test that the schema command prints the workbook header
#[test]
fn schema_csv_header() {
    let output = run(&["schema", "csv-header"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);

    assert!(stdout.contains("Monat,ALG I (€)"));
    assert!(stdout.contains("Bemerkungen"));
}

/// Adding twice for the same month must signal the collision, and
/// --overwrite must update in place instead of duplicating
#[test]
fn add_collision_and_overwrite() {
    let file = temp_workbook("lohnbuch_e2e_add_2024.csv");

    let output = run(&[
        "add", "-f", &file, "-m", "3", "--pia", "2000", "--tax", "300",
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("Added März 2024"));
    assert!(stdout.contains("Netto €1308.00"));

    // Same month again: refused with the existing record id
    let output = run(&[
        "add", "-f", &file, "-m", "3", "--pia", "1000", "--tax", "100",
    ]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("already has record"));

    // Explicit overwrite updates in place
    let output = run(&[
        "add", "-f", &file, "-m", "3", "--pia", "1000", "--tax", "100", "--overwrite",
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("Updated März 2024"));

    std::fs::remove_file(&file).ok();
}

/// Editing a month rederives the dependent fields
#[test]
fn edit_rederives() {
    let file = temp_workbook("lohnbuch_e2e_edit_2024.csv");

    let output = run(&[
        "add", "-f", &file, "-m", "1", "--alg1", "1200", "--pia", "300", "--tax", "150",
    ]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let output = run(&["edit", "-f", &file, "-m", "1", "--pia", "800"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("Brutto €2000.00"));

    std::fs::remove_file(&file).ok();
}

/// Test that the chart command renders an SVG file
#[test]
fn chart_renders_svg() {
    let svg = std::env::temp_dir().join("lohnbuch_e2e_chart.svg");
    std::fs::remove_file(&svg).ok();

    let output = run(&["chart", "-f", FIXTURE, "-o", svg.to_str().unwrap()]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("Chart written to"));

    let content = std::fs::read_to_string(&svg).expect("chart file missing");
    assert!(content.contains("<svg"));
    assert!(content.contains("Nettoeinkommen 2024"));

    std::fs::remove_file(&svg).ok();
}

fn temp_workbook(name: &str) -> String {
    let path: PathBuf = std::env::temp_dir().join(name);
    std::fs::remove_file(&path).ok();
    path.to_str().unwrap().to_string()
}
