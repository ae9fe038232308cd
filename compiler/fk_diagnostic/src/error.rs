//! Resolution failures.

use crate::ErrorCode;

/// A failed lookup or module resolution.
///
/// Every variant names the missing symbol and the tag of the scope that was
/// active when the lookup ran, so a strict-mode abort can point the user at
/// the exact place to fix.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    #[error("no index record for module '{module}' could be found (scope '{tag}')")]
    ModuleResolution { module: String, tag: String },

    #[error("no entry found for variable '{name}' (scope '{tag}')")]
    VariableLookup { name: String, tag: String },

    #[error("no entry found for type '{name}' (scope '{tag}')")]
    TypeLookup { name: String, tag: String },

    #[error("no entry found for subprogram '{name}' (scope '{tag}')")]
    SubprogramLookup { name: String, tag: String },

    #[error("identifier '{name}' has no declaration; passed as placeholder argument (scope '{tag}')")]
    UnclassifiedIdentifier { name: String, tag: String },
}

impl ScopeError {
    pub fn module(module: impl Into<String>, tag: impl Into<String>) -> Self {
        ScopeError::ModuleResolution {
            module: module.into(),
            tag: tag.into(),
        }
    }

    pub fn variable(name: impl Into<String>, tag: impl Into<String>) -> Self {
        ScopeError::VariableLookup {
            name: name.into(),
            tag: tag.into(),
        }
    }

    pub fn type_decl(name: impl Into<String>, tag: impl Into<String>) -> Self {
        ScopeError::TypeLookup {
            name: name.into(),
            tag: tag.into(),
        }
    }

    pub fn subprogram(name: impl Into<String>, tag: impl Into<String>) -> Self {
        ScopeError::SubprogramLookup {
            name: name.into(),
            tag: tag.into(),
        }
    }

    pub fn unclassified(name: impl Into<String>, tag: impl Into<String>) -> Self {
        ScopeError::UnclassifiedIdentifier {
            name: name.into(),
            tag: tag.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ScopeError::ModuleResolution { .. } => ErrorCode::E1001,
            ScopeError::VariableLookup { .. } => ErrorCode::E1002,
            ScopeError::TypeLookup { .. } => ErrorCode::E1003,
            ScopeError::SubprogramLookup { .. } => ErrorCode::E1004,
            ScopeError::UnclassifiedIdentifier { .. } => ErrorCode::W2001,
        }
    }

    /// The missing module or symbol.
    pub fn symbol(&self) -> &str {
        match self {
            ScopeError::ModuleResolution { module, .. } => module,
            ScopeError::VariableLookup { name, .. }
            | ScopeError::TypeLookup { name, .. }
            | ScopeError::SubprogramLookup { name, .. }
            | ScopeError::UnclassifiedIdentifier { name, .. } => name,
        }
    }

    /// Tag of the scope the lookup ran in.
    pub fn tag(&self) -> &str {
        match self {
            ScopeError::ModuleResolution { tag, .. }
            | ScopeError::VariableLookup { tag, .. }
            | ScopeError::TypeLookup { tag, .. }
            | ScopeError::SubprogramLookup { tag, .. }
            | ScopeError::UnclassifiedIdentifier { tag, .. } => tag,
        }
    }

    pub fn exit_status(&self) -> i32 {
        self.code().exit_status()
    }
}
