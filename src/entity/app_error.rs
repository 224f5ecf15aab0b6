#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The backend answered 401. The session is no longer valid.
    #[error("Session expired, please sign in again")]
    Unauthorized,

    #[error("You are not signed in. Use /login <email> <password>")]
    NotLoggedIn,

    #[error("This action requires the {0} role")]
    Forbidden(&'static str),

    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Market data error: {0}")]
    MarketData(String),

    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Unsupported countdown duration: {0}s (allowed: 60, 120, 180, 300, 600)")]
    InvalidDuration(u64),

    #[error("Unknown coin: {0}")]
    UnknownCoin(String),

    #[error("A countdown order is already running")]
    CountdownActive,
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AppError::Unauthorized)
    }
}
