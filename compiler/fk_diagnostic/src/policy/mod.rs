//! Strict/lenient failure policy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ScopeError;

/// How lookup and resolution failures propagate.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMode {
    /// Any failure aborts the run.
    Strict,
    /// Failures are logged and replaced by sentinel records.
    #[default]
    Lenient,
}

impl FromStr for ErrorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(ErrorMode::Strict),
            "lenient" => Ok(ErrorMode::Lenient),
            other => Err(format!(
                "unknown error handling mode '{other}' (expected 'strict' or 'lenient')"
            )),
        }
    }
}

impl fmt::Display for ErrorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorMode::Strict => write!(f, "strict"),
            ErrorMode::Lenient => write!(f, "lenient"),
        }
    }
}

/// Result of a fallible operation after the policy has been applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The operation succeeded.
    Ok(T),
    /// The operation failed; `value` is the sentinel to continue with.
    Warning { value: T, error: ScopeError },
    /// The operation failed and the run must stop.
    Fatal(ScopeError),
}

impl<T> Outcome<T> {
    /// Collapse to `(value, found)`: warnings yield the sentinel with
    /// `found = false`, fatal outcomes become `Err`.
    pub fn into_lookup(self) -> Result<(T, bool), ScopeError> {
        match self {
            Outcome::Ok(value) => Ok((value, true)),
            Outcome::Warning { value, .. } => Ok((value, false)),
            Outcome::Fatal(error) => Err(error),
        }
    }

    /// Collapse to the value, treating warnings as success.
    pub fn into_result(self) -> Result<T, ScopeError> {
        self.into_lookup().map(|(value, _)| value)
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok(_))
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Outcome::Fatal(_))
    }
}

/// The single place where strict/lenient branching happens.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorPolicy {
    mode: ErrorMode,
}

impl ErrorPolicy {
    pub fn new(mode: ErrorMode) -> Self {
        ErrorPolicy { mode }
    }

    pub fn strict() -> Self {
        ErrorPolicy::new(ErrorMode::Strict)
    }

    pub fn lenient() -> Self {
        ErrorPolicy::new(ErrorMode::Lenient)
    }

    pub fn mode(&self) -> ErrorMode {
        self.mode
    }

    pub fn is_strict(&self) -> bool {
        self.mode == ErrorMode::Strict
    }

    /// Apply the policy to a failure, offering `sentinel` as the lenient
    /// substitute.
    pub fn fail<T>(&self, error: ScopeError, sentinel: T) -> Outcome<T> {
        match self.mode {
            ErrorMode::Strict => {
                tracing::error!(code = %error.code(), tag = error.tag(), "{error}");
                Outcome::Fatal(error)
            }
            ErrorMode::Lenient => {
                tracing::warn!(code = %error.code(), tag = error.tag(), "{error}");
                Outcome::Warning {
                    value: sentinel,
                    error,
                }
            }
        }
    }

    /// Apply the policy to a failure that has no sentinel value.
    pub fn check(&self, error: ScopeError) -> Result<(), ScopeError> {
        self.fail(error, ()).into_result()
    }
}
