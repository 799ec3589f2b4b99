//! Error taxonomy shared by every client operation

use std::fmt;
use thiserror::Error;

/// Machine-readable classification of a [`YaviqError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Transport failures and statuses that are neither 4xx nor 5xx
    Network,
    /// Malformed caller input or a 4xx response
    Validation,
    /// TOON conversion failures
    ToonParse,
    /// 5xx responses or an explicit `success: false` envelope
    EngineFailure,
    /// Input structure does not match what the service expects
    SchemaMismatch,
    /// Anything not yet classified
    Generic,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Network => "NETWORK_ERROR",
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::ToonParse => "TOON_PARSE_ERROR",
            ErrorKind::EngineFailure => "ENGINE_FAILURE",
            ErrorKind::SchemaMismatch => "SCHEMA_MISMATCH",
            ErrorKind::Generic => "YAVIQ_ERROR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Error, Debug)]
pub enum YaviqError {
    #[error("{message}")]
    Network {
        message: String,
        status_code: Option<u16>,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("{message}")]
    Validation { message: String, status_code: u16 },

    #[error("{0}")]
    ToonParse(String),

    #[error("{message}")]
    EngineFailure { message: String, status_code: u16 },

    #[error("{0}")]
    SchemaMismatch(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Unexpected(String),
}

pub type Result<T> = std::result::Result<T, YaviqError>;

impl YaviqError {
    /// Local input validation failure, reported with status 400
    pub fn validation(message: impl Into<String>) -> Self {
        YaviqError::Validation {
            message: message.into(),
            status_code: 400,
        }
    }

    pub fn engine_failure(message: impl Into<String>, status_code: u16) -> Self {
        YaviqError::EngineFailure {
            message: message.into(),
            status_code,
        }
    }

    pub fn network(message: impl Into<String>, status_code: Option<u16>) -> Self {
        YaviqError::Network {
            message: message.into(),
            status_code,
            source: None,
        }
    }

    pub fn toon_parse(message: impl Into<String>) -> Self {
        YaviqError::ToonParse(message.into())
    }

    pub fn schema_mismatch(message: impl Into<String>) -> Self {
        YaviqError::SchemaMismatch(message.into())
    }

    /// Wrap a transport-level failure (DNS, refused connection, timeout, body read)
    pub(crate) fn transport(err: reqwest::Error) -> Self {
        YaviqError::Network {
            message: format!("Network error: {}", err),
            status_code: err.status().map(|s| s.as_u16()),
            source: Some(err),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            YaviqError::Network { .. } => ErrorKind::Network,
            YaviqError::Validation { .. } => ErrorKind::Validation,
            YaviqError::ToonParse(_) => ErrorKind::ToonParse,
            YaviqError::EngineFailure { .. } => ErrorKind::EngineFailure,
            YaviqError::SchemaMismatch(_) => ErrorKind::SchemaMismatch,
            YaviqError::Serialization(_) | YaviqError::Unexpected(_) => ErrorKind::Generic,
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind().code()
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            YaviqError::Network { status_code, .. } => *status_code,
            YaviqError::Validation { status_code, .. }
            | YaviqError::EngineFailure { status_code, .. } => Some(*status_code),
            YaviqError::ToonParse(_) | YaviqError::SchemaMismatch(_) => Some(400),
            YaviqError::Serialization(_) | YaviqError::Unexpected(_) => None,
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Whether the error already carries one of the service's error codes
    pub fn is_classified(&self) -> bool {
        self.kind() != ErrorKind::Generic
    }

    /// Re-label an unclassified failure as a TOON conversion error.
    /// Classified errors are returned untouched.
    pub(crate) fn into_toon_parse(self, context: &str) -> Self {
        if self.is_classified() {
            self
        } else {
            YaviqError::ToonParse(format!("{}: {}", context, self))
        }
    }
}
