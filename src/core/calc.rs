//! Deduction calculation engine - pure arithmetic, no state

use super::record::RateSettings;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Fully-derived amounts for one month under auto-calculate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedAmounts {
    pub pension_insurance: Decimal,
    pub health_insurance: Decimal,
    pub unemployment_insurance: Decimal,
    pub total_deductions: Decimal,
    pub net_income: Decimal,
}

/// Totals derived from manually entered insurance amounts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualTotals {
    pub total_deductions: Decimal,
    pub net_income: Decimal,
}

/// Round to 2 decimal places, half away from zero.
///
/// The single rounding primitive for every derived amount. Each insurance
/// component is rounded before it is summed into the total; summing first
/// and rounding once can differ by a cent.
pub fn round2(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    // Pin the scale so amounts always display with cent precision
    rounded.rescale(2);
    rounded
}

/// Derive the three insurance amounts and totals from gross salary and rates.
///
/// Income tax is never derived - it depends on the tax class and is always
/// entered manually.
pub fn derive_auto_deductions(
    gross_salary: Decimal,
    income_tax: Decimal,
    rates: &RateSettings,
) -> DerivedAmounts {
    let pension_insurance = round2(gross_salary * rates.pension_rate);
    let health_insurance = round2(gross_salary * rates.health_care_rate);
    let unemployment_insurance = round2(gross_salary * rates.unemployment_rate);

    let total_deductions =
        round2(income_tax + pension_insurance + health_insurance + unemployment_insurance);
    let net_income = round2(gross_salary - total_deductions);

    DerivedAmounts {
        pension_insurance,
        health_insurance,
        unemployment_insurance,
        total_deductions,
        net_income,
    }
}

/// Derive totals when the three insurance amounts were entered by hand
pub fn derive_manual_totals(
    gross_salary: Decimal,
    income_tax: Decimal,
    pension_insurance: Decimal,
    health_insurance: Decimal,
    unemployment_insurance: Decimal,
) -> ManualTotals {
    let total_deductions =
        round2(income_tax + pension_insurance + health_insurance + unemployment_insurance);
    let net_income = round2(gross_salary - total_deductions);

    ManualTotals {
        total_deductions,
        net_income,
    }
}

/// Convert a human-facing percentage to the internal fraction (9.3 -> 0.093)
pub fn percentage_to_rate(percentage: Decimal) -> Decimal {
    percentage / dec!(100)
}

/// Convert the internal fraction to a percentage (0.093 -> 9.3)
pub fn rate_to_percentage(rate: Decimal) -> Decimal {
    rate * dec!(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round2_half_away_from_zero() {
        assert_eq!(round2(dec!(2.005)), dec!(2.01));
        assert_eq!(round2(dec!(2.004)), dec!(2.00));
        assert_eq!(round2(dec!(-2.005)), dec!(-2.01));
        assert_eq!(round2(dec!(186.0000)), dec!(186.00));
    }

    #[test]
    fn round2_idempotent() {
        for value in [dec!(0), dec!(2.005), dec!(-13.337), dec!(1234.56789)] {
            assert_eq!(round2(round2(value)), round2(value));
        }
    }

    #[test]
    fn auto_deductions_statutory_rates() {
        let rates = RateSettings::default();
        let derived = derive_auto_deductions(dec!(2000), dec!(300), &rates);

        assert_eq!(derived.pension_insurance, dec!(186.00));
        assert_eq!(derived.health_insurance, dec!(180.00));
        assert_eq!(derived.unemployment_insurance, dec!(26.00));
        assert_eq!(derived.total_deductions, dec!(692.00));
        assert_eq!(derived.net_income, dec!(1308.00));
    }

    #[test]
    fn auto_deductions_rounds_each_component() {
        // 1234.56 * 0.093 = 114.81408, * 0.09 = 111.1104, * 0.013 = 16.049...
        let rates = RateSettings::default();
        let derived = derive_auto_deductions(dec!(1234.56), dec!(100), &rates);

        assert_eq!(derived.pension_insurance, dec!(114.81));
        assert_eq!(derived.health_insurance, dec!(111.11));
        assert_eq!(derived.unemployment_insurance, dec!(16.05));
        // Total is the sum of the already-rounded components
        assert_eq!(derived.total_deductions, dec!(341.97));
        assert_eq!(derived.net_income, dec!(892.59));
    }

    #[test]
    fn auto_deductions_zero_rates() {
        let rates = RateSettings {
            auto_calculate_deductions: true,
            pension_rate: dec!(0),
            health_care_rate: dec!(0),
            unemployment_rate: dec!(0),
        };
        let derived = derive_auto_deductions(dec!(1000), dec!(0), &rates);

        assert_eq!(derived.total_deductions, dec!(0));
        assert_eq!(derived.net_income, dec!(1000));
    }

    #[test]
    fn manual_totals() {
        let totals = derive_manual_totals(dec!(1000), dec!(100), dec!(93), dec!(90), dec!(13));

        assert_eq!(totals.total_deductions, dec!(296.00));
        assert_eq!(totals.net_income, dec!(704.00));
    }

    #[test]
    fn percentage_round_trip() {
        for rate in [dec!(0), dec!(0.013), dec!(0.09), dec!(0.093), dec!(1)] {
            assert_eq!(percentage_to_rate(rate_to_percentage(rate)), rate);
        }
        assert_eq!(percentage_to_rate(dec!(9.3)), dec!(0.093));
        assert_eq!(rate_to_percentage(dec!(0.093)), dec!(9.3));
    }
}
