pub mod calc;
pub mod record;
pub mod session;
pub mod summary;

// Flat public surface for domain types and functions.
#[allow(unused_imports)]
pub use calc::{
    derive_auto_deductions, derive_manual_totals, percentage_to_rate, rate_to_percentage, round2,
    DerivedAmounts, ManualTotals,
};
#[allow(unused_imports)]
pub use record::{
    month_from_name, month_name, FormError, MonthlyRecord, RateSettings, RecordForm, RecordPatch,
    MONTH_NAMES,
};
#[allow(unused_imports)]
pub use session::{CreateOutcome, Session, SessionError};
pub use summary::YearSummary;
