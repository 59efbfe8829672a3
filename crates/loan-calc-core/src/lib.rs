pub mod amortization;
pub mod error;
pub mod types;

#[cfg(feature = "calculators")]
pub mod calculators;

#[cfg(feature = "gate")]
pub mod gate;

#[cfg(feature = "leads")]
pub mod leads;

pub use amortization::{compute_amortization, AmortizationResult, AmortizationRow, LoanParameters};
pub use error::{FieldError, LoanCalcError, StorageError};
pub use types::*;

/// Standard result type for all loan-calc operations
pub type LoanCalcResult<T> = Result<T, LoanCalcError>;
