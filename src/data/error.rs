use std::fmt;

// ---------------------------------------------------------------------------
// Load failures
// ---------------------------------------------------------------------------

/// Why a source could not be turned into a table.
///
/// None of these escape the loader: they are folded into a
/// [`LoadOutcome::Failed`](super::loader::LoadOutcome) next to an empty table.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("source '{location}' is unavailable: {reason}")]
    SourceUnavailable { location: String, reason: String },

    #[error("row {row}: cannot parse '{value}' in column '{column}' as a date-time")]
    MalformedTimestamp {
        column: String,
        row: usize,
        value: String,
    },

    #[error("cannot read '{location}': {reason}")]
    Unreadable { location: String, reason: String },
}

// ---------------------------------------------------------------------------
// Diagnostics shown to the operator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
}

/// A user-visible message produced while loading or filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            level: Level::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic {
            level: Level::Warning,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Diagnostic {
            level: Level::Info,
            message: message.into(),
        }
    }

    pub fn debug(message: impl Into<String>) -> Self {
        Diagnostic {
            level: Level::Debug,
            message: message.into(),
        }
    }
}

impl From<&LoadError> for Diagnostic {
    fn from(err: &LoadError) -> Self {
        Diagnostic::error(format!("Error loading data: {err}"))
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        };
        write!(f, "[{tag}] {}", self.message)
    }
}
