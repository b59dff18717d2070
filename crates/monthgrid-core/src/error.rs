//! Error types for the layout engine.
//!
//! None of these are fatal to a month render: rule failures are scoped to one
//! event and surface as [`Warning`](crate::diagnostics::Warning)s, time errors
//! only occur while parsing input or configuration.

use thiserror::Error;

/// Errors raised while parsing date/time input or timezone settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    /// The value is neither an ISO-8601 date nor an RFC3339 date-time.
    #[error("invalid date or date-time: {value:?}")]
    InvalidDateTime { value: String },

    /// The value is not a `YYYY-MM` month.
    #[error("invalid month {value:?}, expected YYYY-MM")]
    InvalidMonth { value: String },

    /// The IANA timezone name is unknown.
    #[error("unknown timezone: {name}")]
    UnknownTimezone { name: String },
}

impl TimeError {
    /// Creates an invalid date-time error.
    pub fn invalid_datetime(value: impl Into<String>) -> Self {
        Self::InvalidDateTime {
            value: value.into(),
        }
    }

    /// Creates an invalid month error.
    pub fn invalid_month(value: impl Into<String>) -> Self {
        Self::InvalidMonth {
            value: value.into(),
        }
    }

    /// Creates an unknown timezone error.
    pub fn unknown_timezone(name: impl Into<String>) -> Self {
        Self::UnknownTimezone { name: name.into() }
    }
}

/// Errors raised while expanding a recurrence rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// The rule string could not be parsed or validated.
    #[error("failed to parse recurrence rule {rule:?}: {message}")]
    Parse { rule: String, message: String },
}

impl RuleError {
    /// Creates a parse error for the given rule.
    pub fn parse(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            rule: rule.into(),
            message: message.into(),
        }
    }

    /// Returns the offending rule string.
    pub fn rule(&self) -> &str {
        match self {
            Self::Parse { rule, .. } => rule,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_error_display() {
        let err = TimeError::invalid_datetime("2024-13-01");
        assert_eq!(err.to_string(), "invalid date or date-time: \"2024-13-01\"");

        let err = TimeError::unknown_timezone("Mars/Olympus");
        assert_eq!(err.to_string(), "unknown timezone: Mars/Olympus");
    }

    #[test]
    fn rule_error_keeps_rule() {
        let err = RuleError::parse("FREQ=SOMETIMES", "unknown frequency");
        assert_eq!(err.rule(), "FREQ=SOMETIMES");
        assert!(err.to_string().contains("unknown frequency"));
    }
}
