//! Monthly record model and the recompute step that keeps derived fields
//! consistent with their source fields

use super::calc;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// German month names, used as workbook row labels
pub const MONTH_NAMES: [&str; 12] = [
    "Januar",
    "Februar",
    "März",
    "April",
    "Mai",
    "Juni",
    "Juli",
    "August",
    "September",
    "Oktober",
    "November",
    "Dezember",
];

/// Display name for a month number; "?" outside 1-12
pub fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|i| MONTH_NAMES.get(i as usize))
        .copied()
        .unwrap_or("?")
}

/// Month number (1-12) for a German month name
pub fn month_from_name(name: &str) -> Option<u32> {
    MONTH_NAMES
        .iter()
        .position(|m| m.eq_ignore_ascii_case(name.trim()))
        .map(|i| i as u32 + 1)
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FormError {
    #[error("month must be between 1 and 12, got {0}")]
    MonthOutOfRange(u32),
    #[error("{field} must not be negative")]
    NegativeAmount { field: &'static str },
    #[error("{field} is required when deductions are entered manually")]
    MissingManualAmount { field: &'static str },
}

/// Process-wide deduction settings, held for the lifetime of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSettings {
    pub auto_calculate_deductions: bool,
    /// Decimal fraction, 0.093 = 9.3%
    pub pension_rate: Decimal,
    pub health_care_rate: Decimal,
    pub unemployment_rate: Decimal,
}

impl Default for RateSettings {
    /// Statutory defaults: 9.3% pension, 9.0% health/care, 1.3% unemployment
    fn default() -> Self {
        RateSettings {
            auto_calculate_deductions: true,
            pension_rate: dec!(0.093),
            health_care_rate: dec!(0.09),
            unemployment_rate: dec!(0.013),
        }
    }
}

/// One calendar month's financial entry.
///
/// `gross_salary`, the three insurance amounts, `total_deductions` and
/// `net_income` are views over the source fields - [`MonthlyRecord::recompute`]
/// rebuilds them on every mutation, so they can never drift from the latest
/// income and tax figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyRecord {
    pub id: String,
    /// 1-12
    pub month: u32,
    pub year: i32,
    /// ALG I (Arbeitslosengeld I) for the month
    pub alg1_income: Decimal,
    /// Secondary / PiA income for the month
    pub pia_income: Decimal,
    /// Total gross income, recomputed as alg1 + pia whenever either is present
    pub gross_salary: Decimal,
    /// Always entered manually (tax class dependent)
    pub income_tax: Decimal,
    pub pension_insurance: Decimal,
    pub health_insurance: Decimal,
    pub unemployment_insurance: Decimal,
    pub total_deductions: Decimal,
    pub net_income: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw user-supplied fields for creating a record
#[derive(Debug, Clone, Default)]
pub struct RecordForm {
    pub alg1_income: Decimal,
    pub pia_income: Decimal,
    pub income_tax: Decimal,
    /// Manual mode only; ignored (re-derived) when auto-calculate is on
    pub pension_insurance: Option<Decimal>,
    pub health_insurance: Option<Decimal>,
    pub unemployment_insurance: Option<Decimal>,
    pub notes: Option<String>,
}

/// Partial update of an existing record; `None` leaves the field untouched
#[derive(Debug, Clone, Default)]
pub struct RecordPatch {
    pub alg1_income: Option<Decimal>,
    pub pia_income: Option<Decimal>,
    pub income_tax: Option<Decimal>,
    pub pension_insurance: Option<Decimal>,
    pub health_insurance: Option<Decimal>,
    pub unemployment_insurance: Option<Decimal>,
    pub notes: Option<String>,
}

impl RecordForm {
    /// Reject invalid input before anything is derived or stored
    pub fn validate(&self, settings: &RateSettings) -> Result<(), FormError> {
        check_non_negative("ALG I income", Some(self.alg1_income))?;
        check_non_negative("PiA income", Some(self.pia_income))?;
        check_non_negative("income tax", Some(self.income_tax))?;
        check_non_negative("pension insurance", self.pension_insurance)?;
        check_non_negative("health insurance", self.health_insurance)?;
        check_non_negative("unemployment insurance", self.unemployment_insurance)?;

        if !settings.auto_calculate_deductions {
            for (field, value) in [
                ("pension insurance", self.pension_insurance),
                ("health insurance", self.health_insurance),
                ("unemployment insurance", self.unemployment_insurance),
            ] {
                if value.is_none() {
                    return Err(FormError::MissingManualAmount { field });
                }
            }
        }
        Ok(())
    }
}

impl RecordPatch {
    pub fn validate(&self) -> Result<(), FormError> {
        check_non_negative("ALG I income", self.alg1_income)?;
        check_non_negative("PiA income", self.pia_income)?;
        check_non_negative("income tax", self.income_tax)?;
        check_non_negative("pension insurance", self.pension_insurance)?;
        check_non_negative("health insurance", self.health_insurance)?;
        check_non_negative("unemployment insurance", self.unemployment_insurance)?;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.alg1_income.is_none()
            && self.pia_income.is_none()
            && self.income_tax.is_none()
            && self.pension_insurance.is_none()
            && self.health_insurance.is_none()
            && self.unemployment_insurance.is_none()
            && self.notes.is_none()
    }
}

fn check_non_negative(field: &'static str, value: Option<Decimal>) -> Result<(), FormError> {
    match value {
        Some(v) if v < Decimal::ZERO => Err(FormError::NegativeAmount { field }),
        _ => Ok(()),
    }
}

impl MonthlyRecord {
    /// Create a record from validated form input, deriving all dependent fields
    pub fn create(
        month: u32,
        year: i32,
        form: &RecordForm,
        settings: &RateSettings,
    ) -> Result<Self, FormError> {
        if !(1..=12).contains(&month) {
            return Err(FormError::MonthOutOfRange(month));
        }
        form.validate(settings)?;

        let now = Utc::now();
        let mut record = MonthlyRecord {
            id: generate_id(year, month, now),
            month,
            year,
            alg1_income: form.alg1_income,
            pia_income: form.pia_income,
            gross_salary: Decimal::ZERO,
            income_tax: form.income_tax,
            pension_insurance: form.pension_insurance.unwrap_or_default(),
            health_insurance: form.health_insurance.unwrap_or_default(),
            unemployment_insurance: form.unemployment_insurance.unwrap_or_default(),
            total_deductions: Decimal::ZERO,
            net_income: Decimal::ZERO,
            notes: form.notes.clone(),
            created_at: now,
            updated_at: now,
        };
        record.recompute(settings);
        Ok(record)
    }

    /// Replace all form fields of an existing record, then rederive
    pub fn apply_form(&mut self, form: &RecordForm, settings: &RateSettings) -> Result<(), FormError> {
        form.validate(settings)?;
        self.alg1_income = form.alg1_income;
        self.pia_income = form.pia_income;
        self.income_tax = form.income_tax;
        if let Some(v) = form.pension_insurance {
            self.pension_insurance = v;
        }
        if let Some(v) = form.health_insurance {
            self.health_insurance = v;
        }
        if let Some(v) = form.unemployment_insurance {
            self.unemployment_insurance = v;
        }
        self.notes = form.notes.clone();
        self.updated_at = Utc::now();
        self.recompute(settings);
        Ok(())
    }

    /// Apply a partial update, then rederive
    pub fn apply_patch(
        &mut self,
        patch: &RecordPatch,
        settings: &RateSettings,
    ) -> Result<(), FormError> {
        patch.validate()?;
        if let Some(v) = patch.alg1_income {
            self.alg1_income = v;
        }
        if let Some(v) = patch.pia_income {
            self.pia_income = v;
        }
        if let Some(v) = patch.income_tax {
            self.income_tax = v;
        }
        if let Some(v) = patch.pension_insurance {
            self.pension_insurance = v;
        }
        if let Some(v) = patch.health_insurance {
            self.health_insurance = v;
        }
        if let Some(v) = patch.unemployment_insurance {
            self.unemployment_insurance = v;
        }
        if let Some(notes) = &patch.notes {
            self.notes = Some(notes.clone());
        }
        self.updated_at = Utc::now();
        self.recompute(settings);
        Ok(())
    }

    /// Rehydrate a record from imported cell values.
    ///
    /// Assigns a fresh identity and timestamps and rederives every dependent
    /// field - the imported totals are never trusted as stored truth. When
    /// the gross cell was empty the component sum stands in for it.
    #[allow(clippy::too_many_arguments)]
    pub fn from_import(
        month: u32,
        year: i32,
        alg1_income: Decimal,
        pia_income: Decimal,
        gross_salary: Decimal,
        income_tax: Decimal,
        pension_insurance: Decimal,
        health_insurance: Decimal,
        unemployment_insurance: Decimal,
        notes: Option<String>,
        settings: &RateSettings,
    ) -> Self {
        let now = Utc::now();
        let gross = if gross_salary > Decimal::ZERO {
            gross_salary
        } else {
            alg1_income + pia_income
        };
        let mut record = MonthlyRecord {
            id: generate_id(year, month, now),
            month,
            year,
            alg1_income,
            pia_income,
            gross_salary: gross,
            income_tax,
            pension_insurance,
            health_insurance,
            unemployment_insurance,
            total_deductions: Decimal::ZERO,
            net_income: Decimal::ZERO,
            notes,
            created_at: now,
            updated_at: now,
        };
        record.recompute(settings);
        record
    }

    /// Recompute every derived field from the current source fields.
    ///
    /// Gross salary becomes the sum of the two income components whenever
    /// their sum is positive; deductions and totals then follow via the auto
    /// path (rates) or the manual path (stored insurance amounts). Every
    /// mutation path ends here - derived fields are never stored truth.
    pub fn recompute(&mut self, settings: &RateSettings) {
        let component_sum = self.alg1_income + self.pia_income;
        if component_sum > Decimal::ZERO {
            self.gross_salary = component_sum;
        }

        if settings.auto_calculate_deductions {
            let derived =
                calc::derive_auto_deductions(self.gross_salary, self.income_tax, settings);
            self.pension_insurance = derived.pension_insurance;
            self.health_insurance = derived.health_insurance;
            self.unemployment_insurance = derived.unemployment_insurance;
            self.total_deductions = derived.total_deductions;
            self.net_income = derived.net_income;
        } else {
            let totals = calc::derive_manual_totals(
                self.gross_salary,
                self.income_tax,
                self.pension_insurance,
                self.health_insurance,
                self.unemployment_insurance,
            );
            self.total_deductions = totals.total_deductions;
            self.net_income = totals.net_income;
        }
        log::debug!(
            "recomputed {}/{}: gross {} deductions {} net {}",
            self.month,
            self.year,
            self.gross_salary,
            self.total_deductions,
            self.net_income
        );
    }
}

/// Short hex digest unique to one creation instant
fn generate_id(year: i32, month: u32, at: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!(
        "{year}-{month:02}-{}",
        at.timestamp_nanos_opt().unwrap_or_default()
    ));
    hex::encode(&hasher.finalize()[..6])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn income_form(alg1: Decimal, pia: Decimal, tax: Decimal) -> RecordForm {
        RecordForm {
            alg1_income: alg1,
            pia_income: pia,
            income_tax: tax,
            ..Default::default()
        }
    }

    #[test]
    fn gross_salary_derived_from_components() {
        let settings = RateSettings::default();
        let record = MonthlyRecord::create(
            1,
            2024,
            &income_form(dec!(1200), dec!(300), dec!(0)),
            &settings,
        )
        .unwrap();

        assert_eq!(record.gross_salary, dec!(1500));
    }

    #[test]
    fn gross_salary_overrides_stale_value() {
        let settings = RateSettings::default();
        let mut record = MonthlyRecord::create(
            1,
            2024,
            &income_form(dec!(1200), dec!(300), dec!(0)),
            &settings,
        )
        .unwrap();

        // Simulate a stale stored value; recompute must win
        record.gross_salary = dec!(9999);
        record.recompute(&settings);
        assert_eq!(record.gross_salary, dec!(1500));
    }

    #[test]
    fn consistency_invariant_auto_path() {
        let settings = RateSettings::default();
        let record = MonthlyRecord::create(
            3,
            2024,
            &income_form(dec!(0), dec!(2000), dec!(300)),
            &settings,
        )
        .unwrap();

        assert_eq!(
            record.total_deductions,
            record.income_tax
                + record.pension_insurance
                + record.health_insurance
                + record.unemployment_insurance
        );
        assert_eq!(record.net_income, record.gross_salary - record.total_deductions);
        assert_eq!(record.net_income, dec!(1308.00));
    }

    #[test]
    fn consistency_invariant_manual_path() {
        let settings = RateSettings {
            auto_calculate_deductions: false,
            ..Default::default()
        };
        let form = RecordForm {
            pia_income: dec!(1000),
            income_tax: dec!(100),
            pension_insurance: Some(dec!(93)),
            health_insurance: Some(dec!(90)),
            unemployment_insurance: Some(dec!(13)),
            ..Default::default()
        };
        let record = MonthlyRecord::create(5, 2024, &form, &settings).unwrap();

        assert_eq!(record.total_deductions, dec!(296.00));
        assert_eq!(record.net_income, dec!(704.00));
        assert_eq!(
            record.total_deductions,
            record.income_tax
                + record.pension_insurance
                + record.health_insurance
                + record.unemployment_insurance
        );
        assert_eq!(record.net_income, record.gross_salary - record.total_deductions);
    }

    #[test]
    fn patch_retriggers_derivation() {
        let settings = RateSettings::default();
        let mut record = MonthlyRecord::create(
            2,
            2024,
            &income_form(dec!(1200), dec!(300), dec!(150)),
            &settings,
        )
        .unwrap();
        assert_eq!(record.gross_salary, dec!(1500));

        let patch = RecordPatch {
            pia_income: Some(dec!(800)),
            ..Default::default()
        };
        record.apply_patch(&patch, &settings).unwrap();

        assert_eq!(record.gross_salary, dec!(2000));
        assert_eq!(record.pension_insurance, dec!(186.00));
        assert_eq!(record.net_income, record.gross_salary - record.total_deductions);
    }

    #[test]
    fn month_out_of_range_rejected() {
        let settings = RateSettings::default();
        let err = MonthlyRecord::create(13, 2024, &RecordForm::default(), &settings).unwrap_err();
        assert_eq!(err, FormError::MonthOutOfRange(13));
    }

    #[test]
    fn negative_amount_rejected() {
        let settings = RateSettings::default();
        let err = MonthlyRecord::create(
            1,
            2024,
            &income_form(dec!(-1), dec!(0), dec!(0)),
            &settings,
        )
        .unwrap_err();
        assert_eq!(
            err,
            FormError::NegativeAmount {
                field: "ALG I income"
            }
        );
    }

    #[test]
    fn manual_mode_requires_all_insurance_amounts() {
        let settings = RateSettings {
            auto_calculate_deductions: false,
            ..Default::default()
        };
        let form = RecordForm {
            pia_income: dec!(1000),
            pension_insurance: Some(dec!(93)),
            ..Default::default()
        };
        let err = form.validate(&settings).unwrap_err();
        assert_eq!(
            err,
            FormError::MissingManualAmount {
                field: "health insurance"
            }
        );
    }

    #[test]
    fn month_names_round_trip() {
        assert_eq!(month_name(1), "Januar");
        assert_eq!(month_name(12), "Dezember");
        assert_eq!(month_from_name("März"), Some(3));
        assert_eq!(month_from_name("  Dezember "), Some(12));
        assert_eq!(month_from_name("Gesamt 2024"), None);
    }
}
