//! Year aggregation, consumed by the table command and the workbook footer

use super::calc::round2;
use super::record::MonthlyRecord;
use rust_decimal::Decimal;
use serde::Serialize;

/// Column totals across one year's records
#[derive(Debug, Clone, Default, Serialize)]
pub struct YearSummary {
    pub year: i32,
    pub record_count: usize,
    pub total_alg1: Decimal,
    pub total_pia: Decimal,
    pub total_gross: Decimal,
    pub total_income_tax: Decimal,
    pub total_pension: Decimal,
    pub total_health: Decimal,
    pub total_unemployment: Decimal,
    pub total_deductions: Decimal,
    pub total_net: Decimal,
}

impl YearSummary {
    pub fn of(records: &[MonthlyRecord], year: i32) -> Self {
        let mut summary = YearSummary {
            year,
            ..Default::default()
        };
        for record in records.iter().filter(|r| r.year == year) {
            summary.record_count += 1;
            summary.total_alg1 += record.alg1_income;
            summary.total_pia += record.pia_income;
            summary.total_gross += record.gross_salary;
            summary.total_income_tax += record.income_tax;
            summary.total_pension += record.pension_insurance;
            summary.total_health += record.health_insurance;
            summary.total_unemployment += record.unemployment_insurance;
            summary.total_deductions += record.total_deductions;
            summary.total_net += record.net_income;
        }
        summary
    }

    /// Per-month average of one of the totals, 0 for an empty year
    pub fn monthly_average(&self, total: Decimal) -> Decimal {
        if self.record_count == 0 {
            Decimal::ZERO
        } else {
            round2(total / Decimal::from(self.record_count as u64))
        }
    }
}
