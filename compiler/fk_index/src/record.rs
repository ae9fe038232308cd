//! Compilation-unit records.

use serde::{Deserialize, Serialize};

use crate::variable::{TypeDeclaration, VariableDeclaration, UNKNOWN};

/// What kind of compilation unit a record describes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Module,
    Program,
    Subroutine,
    Function,
    /// Sentinel kind for records that could not be found.
    #[default]
    #[serde(other)]
    Unknown,
}

impl RecordKind {
    /// Subroutines and functions.
    pub fn is_subprogram(self) -> bool {
        matches!(self, RecordKind::Subroutine | RecordKind::Function)
    }
}

/// One `original => renamed` entry of a `use, only:` list.
///
/// A plain `only: a` is stored with `original == renamed`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameMapping {
    pub original: String,
    pub renamed: String,
}

impl RenameMapping {
    pub fn new(original: impl Into<String>, renamed: impl Into<String>) -> Self {
        RenameMapping {
            original: original.into(),
            renamed: renamed.into(),
        }
    }
}

/// A `use` statement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsedModule {
    pub name: String,
    /// Empty for an unrestricted `use`.
    #[serde(default)]
    pub only: Vec<RenameMapping>,
}

impl UsedModule {
    /// `use <name>`
    pub fn all(name: impl Into<String>) -> Self {
        UsedModule {
            name: name.into(),
            only: Vec::new(),
        }
    }

    /// `use <name>, only: ...`
    pub fn only(name: impl Into<String>, only: Vec<RenameMapping>) -> Self {
        UsedModule {
            name: name.into(),
            only,
        }
    }

    pub fn imports_everything(&self) -> bool {
        self.only.is_empty()
    }
}

/// A module, program or subprogram together with everything it declares.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexRecord {
    pub kind: RecordKind,
    pub name: String,
    /// Result variable of a function.
    pub result_name: Option<String>,
    /// Procedure attributes such as `global`, `device`, `pure`.
    pub attributes: Vec<String>,
    pub dummy_args: Vec<String>,
    pub variables: Vec<VariableDeclaration>,
    pub types: Vec<TypeDeclaration>,
    /// Contained subprograms, in declaration order.
    pub subprograms: Vec<IndexRecord>,
    pub used_modules: Vec<UsedModule>,
}

impl IndexRecord {
    pub fn new(kind: RecordKind, name: impl Into<String>) -> Self {
        IndexRecord {
            kind,
            name: name.into(),
            ..IndexRecord::default()
        }
    }

    /// Sentinel record returned by lenient lookups.
    pub fn unknown() -> Self {
        IndexRecord::new(RecordKind::Unknown, UNKNOWN)
    }

    /// Find a contained subprogram by name (case-insensitive).
    pub fn find_subprogram(&self, name: &str) -> Option<&IndexRecord> {
        self.subprograms
            .iter()
            .find(|record| record.name.eq_ignore_ascii_case(name))
    }

    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.attributes
            .iter()
            .any(|a| a.eq_ignore_ascii_case(attribute))
    }

    #[must_use]
    pub fn with_variables(mut self, variables: Vec<VariableDeclaration>) -> Self {
        self.variables = variables;
        self
    }

    #[must_use]
    pub fn with_types(mut self, types: Vec<TypeDeclaration>) -> Self {
        self.types = types;
        self
    }

    #[must_use]
    pub fn with_subprograms(mut self, subprograms: Vec<IndexRecord>) -> Self {
        self.subprograms = subprograms;
        self
    }

    #[must_use]
    pub fn with_used_modules(mut self, used_modules: Vec<UsedModule>) -> Self {
        self.used_modules = used_modules;
        self
    }

    #[must_use]
    pub fn with_dummy_args(mut self, dummy_args: Vec<String>) -> Self {
        self.dummy_args = dummy_args;
        self
    }
}
