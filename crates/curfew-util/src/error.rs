//! Error types for curfew

use thiserror::Error;

/// Top-level error type for curfew operations
#[derive(Debug, Error)]
pub enum CurfewError {
    /// No target executable is configured; monitoring cannot start
    #[error("No target application configured")]
    ConfigurationMissing,
}

pub type Result<T> = std::result::Result<T, CurfewError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_missing_message() {
        assert_eq!(
            CurfewError::ConfigurationMissing.to_string(),
            "No target application configured"
        );
    }
}
