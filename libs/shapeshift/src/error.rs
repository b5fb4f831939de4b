use std::fmt;

/// Boxed error returned by user callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Shape mismatch while moving between a concrete type and a [`Value`](crate::Value).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValueError {
    #[error("expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("value {value} does not fit in {ty}")]
    OutOfRange { value: String, ty: &'static str },

    #[error("record {record} has no field '{field}'")]
    UnknownField { record: &'static str, field: String },
}

/// A validator was asked about something it cannot judge: a value kind it
/// does not support, or a parameter it cannot parse.
///
/// This is a mistake in the tag, not in the data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub message: String,
}

impl Fault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Fault {}

/// Every way a conversion call can fail.
///
/// The first error at any depth aborts the call. Fields assigned before the
/// failing one are not rolled back, so the destination is unspecified after
/// an error.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("shapeshift: cannot find validator {0}")]
    UnknownValidator(String),

    #[error("shapeshift: cannot find callback {0}")]
    UnknownCallback(String),

    #[error("shapeshift: {0}")]
    InvalidInput(String),

    #[error("shapeshift: validator {validator} failed for {record}.{field}")]
    Validation {
        validator: String,
        record: &'static str,
        field: String,
    },

    #[error("shapeshift: callback execution failed for {record}.{field}, {source}")]
    Callback {
        record: &'static str,
        field: String,
        #[source]
        source: BoxError,
    },

    #[error("shapeshift: field mapping failed for {record}.{field} -> {target}, {reason}")]
    Conversion {
        record: &'static str,
        field: String,
        target: String,
        reason: String,
    },

    /// Validator misuse. Kept apart from the recoverable variants so it
    /// cannot be mistaken for a data problem.
    #[error("shapeshift: validator {validator} misused on {record}.{field}: {fault}")]
    Fault {
        validator: String,
        record: &'static str,
        field: String,
        fault: Fault,
    },
}

impl MapError {
    /// `true` for validator misuse (a tag bug), `false` for everything else.
    pub fn is_fault(&self) -> bool {
        matches!(self, MapError::Fault { .. })
    }

    /// `true` for unknown validator/callback names and malformed inputs.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            MapError::UnknownValidator(_) | MapError::UnknownCallback(_) | MapError::InvalidInput(_)
        )
    }

    /// Add context to the error.
    ///
    /// For `Conversion`, context is prepended to the reason. For
    /// `InvalidInput`, to the message. Other variants already name their field.
    pub fn with_context(self, ctx: impl fmt::Display) -> Self {
        match self {
            MapError::Conversion {
                record,
                field,
                target,
                reason,
            } => MapError::Conversion {
                record,
                field,
                target,
                reason: format!("{ctx}: {reason}"),
            },
            MapError::InvalidInput(msg) => MapError::InvalidInput(format!("{ctx}: {msg}")),
            other => other,
        }
    }
}

/// Configuration file could not be read or parsed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config error: {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Parse(#[from] toml::de::Error),
}
