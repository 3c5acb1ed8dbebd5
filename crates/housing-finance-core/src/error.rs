use thiserror::Error;

#[derive(Debug, Error)]
pub enum HousingFinanceError {
    #[error("Invalid parameters: {field} — {reason}")]
    InvalidParameters { field: String, reason: String },
}
