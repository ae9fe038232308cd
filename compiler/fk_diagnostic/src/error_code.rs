use std::fmt;

/// Error codes for scope resolution and argument derivation.
///
/// Format: E#### for failures that are fatal under strict handling,
/// W#### for conditions that are only ever reported as warnings.
/// - E1xxx: Symbol resolution
/// - W2xxx: Argument derivation
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    /// Used module has no index record
    E1001,
    /// Variable not found in scope
    E1002,
    /// Derived type not found in scope
    E1003,
    /// Subprogram not found in scope
    E1004,
    /// Kernel identifier passed as placeholder argument
    W2001,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::W2001 => "W2001",
        }
    }

    pub fn is_warning(&self) -> bool {
        self.as_str().starts_with('W')
    }

    /// Process exit status used when this failure aborts a run.
    pub fn exit_status(&self) -> i32 {
        match self {
            ErrorCode::E1001 => 11,
            ErrorCode::E1002 => 12,
            ErrorCode::E1003 => 13,
            ErrorCode::E1004 => 14,
            ErrorCode::W2001 => 15,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
