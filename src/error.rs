use thiserror::Error;

/// The four error kinds produced by this crate (spec §7).
///
/// Configuration and coding errors abort the operation in progress.
/// Range and logic errors are reported with context but never silently
/// swallowed; only the warnings listed in §7 (unknown rule-order id,
/// explicit-EOS on an empty buffer, per-line invalid UTF-8) are logged
/// and skipped instead of raised.
#[derive(Debug, Error)]
pub enum TokenizerError {
    #[error("config error: {message}{}", detail.as_ref().map(|d| format!(" ({d})")).unwrap_or_default())]
    Config {
        message: String,
        detail: Option<String>,
    },

    #[error("coding error: {message}")]
    Coding { message: String },

    #[error("range error: {message}")]
    Range { message: String },

    #[error("logic error: {message}")]
    Logic { message: String },
}

impl TokenizerError {
    pub fn config(message: impl Into<String>) -> Self {
        TokenizerError::Config {
            message: message.into(),
            detail: None,
        }
    }

    pub fn config_at(message: impl Into<String>, detail: impl Into<String>) -> Self {
        TokenizerError::Config {
            message: message.into(),
            detail: Some(detail.into()),
        }
    }

    pub fn coding(message: impl Into<String>) -> Self {
        TokenizerError::Coding {
            message: message.into(),
        }
    }

    pub fn range(message: impl Into<String>) -> Self {
        TokenizerError::Range {
            message: message.into(),
        }
    }

    pub fn logic(message: impl Into<String>) -> Self {
        TokenizerError::Logic {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TokenizerError>;
