//! Application session - single owner of the record collection, the rate
//! settings, and the bound workbook file

use super::record::{month_name, FormError, MonthlyRecord, RateSettings, RecordForm, RecordPatch};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error("no record for {name} {year}", name = month_name(*month))]
    NotFound { month: u32, year: i32 },
}

/// Result of attempting to create a record for a month that may be taken.
///
/// A collision is a return signal, never a silent overwrite or duplicate -
/// the caller decides whether to retry with `overwrite`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created { id: String },
    Updated { id: String },
    WouldCollide { existing_id: String },
}

/// In-memory state of one run of the application.
///
/// All mutation goes through the methods here; each one ends in the record's
/// recompute step, so derived fields are consistent at every read.
#[derive(Debug)]
pub struct Session {
    records: Vec<MonthlyRecord>,
    settings: RateSettings,
    year: i32,
    /// At most one bound workbook file, replaced or cleared explicitly
    file: Option<PathBuf>,
    dirty: bool,
}

impl Session {
    pub fn new(year: i32, settings: RateSettings) -> Self {
        Session {
            records: Vec::new(),
            settings,
            year,
            file: None,
            dirty: false,
        }
    }

    /// Replace all records, e.g. after a workbook import. Existing state is
    /// swapped out wholesale - an import never merges partially.
    pub fn replace_records(&mut self, records: Vec<MonthlyRecord>) {
        self.records = records;
        self.dirty = false;
    }

    pub fn records(&self) -> &[MonthlyRecord] {
        &self.records
    }

    pub fn settings(&self) -> &RateSettings {
        &self.settings
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Bind the session to a workbook file for save-back
    pub fn attach_file(&mut self, path: &Path) {
        self.file = Some(path.to_path_buf());
    }

    /// Clear the bound file, e.g. when starting a fresh workbook
    pub fn detach_file(&mut self) {
        self.file = None;
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Create a record for `month` in the session year.
    ///
    /// If the month already has a record the outcome is `WouldCollide`
    /// unless `overwrite` is set, in which case the existing record is
    /// updated in place. At most one record per (month, year) either way.
    pub fn add_record(
        &mut self,
        month: u32,
        form: &RecordForm,
        overwrite: bool,
    ) -> Result<CreateOutcome, SessionError> {
        let year = self.year;
        if let Some(existing) = self
            .records
            .iter_mut()
            .find(|r| r.month == month && r.year == year)
        {
            if !overwrite {
                return Ok(CreateOutcome::WouldCollide {
                    existing_id: existing.id.clone(),
                });
            }
            existing.apply_form(form, &self.settings)?;
            self.dirty = true;
            let id = existing.id.clone();
            return Ok(CreateOutcome::Updated { id });
        }

        let record = MonthlyRecord::create(month, year, form, &self.settings)?;
        let id = record.id.clone();
        self.records.push(record);
        self.dirty = true;
        Ok(CreateOutcome::Created { id })
    }

    /// Apply a partial update to the record for `month`
    pub fn update_record(&mut self, month: u32, patch: &RecordPatch) -> Result<String, SessionError> {
        let year = self.year;
        let record = self
            .records
            .iter_mut()
            .find(|r| r.month == month && r.year == year)
            .ok_or(SessionError::NotFound { month, year })?;
        record.apply_patch(patch, &self.settings)?;
        self.dirty = true;
        Ok(record.id.clone())
    }

    /// Delete the record for `month`
    pub fn delete_record(&mut self, month: u32) -> Result<(), SessionError> {
        let year = self.year;
        let before = self.records.len();
        self.records.retain(|r| !(r.month == month && r.year == year));
        if self.records.len() == before {
            return Err(SessionError::NotFound { month, year });
        }
        self.dirty = true;
        Ok(())
    }

    /// Records for a year, sorted by month
    pub fn records_for_year(&self, year: i32) -> Vec<&MonthlyRecord> {
        let mut records: Vec<_> = self.records.iter().filter(|r| r.year == year).collect();
        records.sort_by_key(|r| r.month);
        records
    }

    /// Replace the settings and rederive every record under them.
    ///
    /// Changing rates or toggling auto-calculate invalidates all derived
    /// fields, so the recompute runs over the whole collection.
    pub fn update_settings(&mut self, settings: RateSettings) {
        self.settings = settings;
        for record in &mut self.records {
            record.recompute(&self.settings);
        }
        self.dirty = true;
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn form(alg1: &str, pia: &str, tax: &str) -> RecordForm {
        RecordForm {
            alg1_income: alg1.parse().unwrap(),
            pia_income: pia.parse().unwrap(),
            income_tax: tax.parse().unwrap(),
            ..Default::default()
        }
    }

    #[test]
    fn collision_signalled_not_duplicated() {
        let mut session = Session::new(2024, RateSettings::default());
        let first = session
            .add_record(3, &form("1200", "300", "150"), false)
            .unwrap();
        let first_id = match first {
            CreateOutcome::Created { id } => id,
            other => panic!("expected Created, got {:?}", other),
        };

        let second = session
            .add_record(3, &form("0", "2000", "300"), false)
            .unwrap();
        assert_eq!(
            second,
            CreateOutcome::WouldCollide {
                existing_id: first_id.clone()
            }
        );
        assert_eq!(session.records().len(), 1);

        let third = session
            .add_record(3, &form("0", "2000", "300"), true)
            .unwrap();
        assert_eq!(third, CreateOutcome::Updated { id: first_id });
        assert_eq!(session.records().len(), 1);
        assert_eq!(session.records()[0].net_income, dec!(1308.00));
    }

    #[test]
    fn update_missing_record_is_an_error() {
        let mut session = Session::new(2024, RateSettings::default());
        let err = session
            .update_record(7, &RecordPatch::default())
            .unwrap_err();
        assert_eq!(
            err,
            SessionError::NotFound {
                month: 7,
                year: 2024
            }
        );
    }

    #[test]
    fn delete_record() {
        let mut session = Session::new(2024, RateSettings::default());
        session
            .add_record(1, &form("1200", "300", "150"), false)
            .unwrap();
        session.delete_record(1).unwrap();
        assert!(session.records().is_empty());
        assert_eq!(
            session.delete_record(1).unwrap_err(),
            SessionError::NotFound {
                month: 1,
                year: 2024
            }
        );
    }

    #[test]
    fn records_for_year_sorted_by_month() {
        let mut session = Session::new(2024, RateSettings::default());
        for month in [11, 2, 7] {
            session
                .add_record(month, &form("1000", "0", "100"), false)
                .unwrap();
        }
        let months: Vec<u32> = session
            .records_for_year(2024)
            .iter()
            .map(|r| r.month)
            .collect();
        assert_eq!(months, vec![2, 7, 11]);
        assert!(session.records_for_year(2023).is_empty());
    }

    #[test]
    fn settings_change_rederives_all_records() {
        let mut session = Session::new(2024, RateSettings::default());
        session
            .add_record(1, &form("0", "2000", "300"), false)
            .unwrap();
        assert_eq!(session.records()[0].pension_insurance, dec!(186.00));

        session.update_settings(RateSettings {
            pension_rate: dec!(0.10),
            ..RateSettings::default()
        });
        assert_eq!(session.records()[0].pension_insurance, dec!(200.00));
        assert_eq!(
            session.records()[0].net_income,
            session.records()[0].gross_salary - session.records()[0].total_deductions
        );
    }

    #[test]
    fn file_slot_set_and_cleared_explicitly() {
        let mut session = Session::new(2024, RateSettings::default());
        assert!(session.file().is_none());

        session.attach_file(Path::new("PiA_Abrechnung_2024.csv"));
        assert_eq!(
            session.file(),
            Some(Path::new("PiA_Abrechnung_2024.csv"))
        );

        session.detach_file();
        assert!(session.file().is_none());
    }
}
