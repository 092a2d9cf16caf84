use derive_more::Display;

/// Simplified error system - argument errors are the only hard failures,
/// everything geometric degrades into an empty/default result instead.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum AppError {
    #[display(fmt = "Invalid argument: {} must be positive, got {}", name, value)]
    InvalidArgument { name: &'static str, value: i64 },
    #[display(fmt = "Validation Error: {}", _0)]
    Validation(String),
    #[display(fmt = "Serialization Error: {}", _0)]
    Serialization(String),
}

impl std::error::Error for AppError {}

impl AppError {
    /// Reject non-positive indicator periods.
    pub fn check_period(name: &'static str, value: usize) -> AppResult<usize> {
        if value == 0 {
            return Err(AppError::InvalidArgument { name, value: 0 });
        }
        Ok(value)
    }

    /// Reject non-positive periods arriving as signed wire values. Periods
    /// beyond the address space saturate; they can never be satisfied anyway.
    pub fn signed_period(name: &'static str, value: i64) -> AppResult<usize> {
        if value <= 0 {
            return Err(AppError::InvalidArgument { name, value });
        }
        Ok(usize::try_from(value).unwrap_or(usize::MAX))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
