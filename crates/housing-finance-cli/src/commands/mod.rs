pub mod indicators;
pub mod loan;
pub mod rates;
pub mod schedule;
pub mod subsidy;

use housing_finance_core::schedule::GraceKind;

/// Parse a grace label given on the command line.
pub(crate) fn parse_grace(label: &str) -> Result<GraceKind, Box<dyn std::error::Error>> {
    match label {
        "none" => Ok(GraceKind::None),
        "partial" => Ok(GraceKind::Partial),
        "total" => Ok(GraceKind::Total),
        other => {
            Err(format!("Unknown grace kind '{}' (expected none, partial, or total)", other).into())
        }
    }
}
