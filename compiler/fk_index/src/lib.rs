//! Symbol index for Fortran compilation units.
//!
//! The index is produced by an external indexing pass and describes every
//! module, program and subprogram of a compilation run: declared variables,
//! derived types, nested subprograms and `use` statements. It is read once
//! per run and never mutated afterwards; the scope resolver copies entries
//! out of it instead of editing records in place.
//!
//! # Schema
//!
//! The on-disk representation is the JSON form of [`Index`]: a list of
//! [`IndexRecord`]s with snake_case field names. Every field except `name`
//! and `kind` is optional and defaults to empty.
//!
//! ```text
//! [{ "kind": "module", "name": "m",
//!    "variables": [{ "name": "n", "f_type": "integer",
//!                    "qualifiers": ["parameter"], "value": "4" }] }]
//! ```

mod record;
mod variable;

pub use record::{IndexRecord, RecordKind, RenameMapping, UsedModule};
pub use variable::{TypeDeclaration, VariableDeclaration, UNKNOWN};

use serde::{Deserialize, Serialize};

/// Errors raised while loading an index.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The document is not a valid index.
    #[error("malformed index: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// The full symbol table of a compilation run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Index {
    records: Vec<IndexRecord>,
}

impl Index {
    /// Create an index from top-level records.
    pub fn new(records: Vec<IndexRecord>) -> Self {
        Index { records }
    }

    /// Parse an index from its JSON representation.
    pub fn from_json(text: &str) -> Result<Self, IndexError> {
        Ok(serde_json::from_str(text)?)
    }

    /// All top-level records in declaration order.
    pub fn records(&self) -> &[IndexRecord] {
        &self.records
    }

    /// Find a top-level record by name (case-insensitive).
    pub fn find(&self, name: &str) -> Option<&IndexRecord> {
        self.records
            .iter()
            .find(|record| record.name.eq_ignore_ascii_case(name))
    }

    /// Top-level subroutines and functions, excluding the one named `except`.
    ///
    /// These are visible from every top-level scope so that sibling
    /// procedures can call each other.
    pub fn top_level_subprograms<'a>(
        &'a self,
        except: &'a str,
    ) -> impl Iterator<Item = &'a IndexRecord> + 'a {
        self.records
            .iter()
            .filter(move |record| {
                record.kind.is_subprogram() && !record.name.eq_ignore_ascii_case(except)
            })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
