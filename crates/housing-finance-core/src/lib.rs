pub mod cashflow;
pub mod error;
pub mod indicators;
pub mod loan;
pub mod rates;
pub mod schedule;
pub mod subsidy;
pub mod types;

pub use error::HousingFinanceError;
pub use types::*;

/// Standard result type for all housing-finance operations
pub type HousingFinanceResult<T> = Result<T, HousingFinanceError>;
