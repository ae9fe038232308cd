//! Accumulated declarations visible at a nesting path.

use fk_index::{IndexRecord, RenameMapping, TypeDeclaration, VariableDeclaration};

/// Declarations visible at one nesting position.
///
/// Entries are stored outermost-first: parent scopes and used modules are
/// merged before the record's own declarations, so scanning each list in
/// reverse finds the innermost declaration of a name first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scope {
    tag: String,
    types: Vec<TypeDeclaration>,
    variables: Vec<VariableDeclaration>,
    subprograms: Vec<IndexRecord>,
}

impl Scope {
    pub(crate) fn new(tag: impl Into<String>) -> Self {
        Scope {
            tag: tag.into(),
            ..Scope::default()
        }
    }

    /// Colon-separated nesting path, e.g. `mymod:mysub`.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Number of tag segments; the empty scope has depth zero.
    pub fn depth(&self) -> usize {
        if self.tag.is_empty() {
            0
        } else {
            self.tag.split(':').count()
        }
    }

    pub fn variables(&self) -> &[VariableDeclaration] {
        &self.variables
    }

    pub fn types(&self) -> &[TypeDeclaration] {
        &self.types
    }

    pub fn subprograms(&self) -> &[IndexRecord] {
        &self.subprograms
    }

    /// Innermost variable with the given name.
    pub fn find_variable(&self, name: &str) -> Option<&VariableDeclaration> {
        self.variables
            .iter()
            .rev()
            .find(|v| v.name.eq_ignore_ascii_case(name))
    }

    /// Innermost derived type with the given name.
    pub fn find_type(&self, name: &str) -> Option<&TypeDeclaration> {
        self.types
            .iter()
            .rev()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Innermost subprogram with the given name.
    pub fn find_subprogram(&self, name: &str) -> Option<&IndexRecord> {
        self.subprograms
            .iter()
            .rev()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// `parameter` constants with a value, innermost declaration of each
    /// name only.
    pub fn parameters(&self) -> Vec<(&str, &str)> {
        let mut seen = rustc_hash::FxHashSet::default();
        self.variables
            .iter()
            .rev()
            .filter(|v| v.is_parameter())
            .filter_map(|v| Some((v.name.as_str(), v.value.as_deref()?)))
            .filter(|(name, _)| seen.insert(name.to_ascii_lowercase()))
            .collect()
    }

    pub(crate) fn set_tag(&mut self, tag: impl Into<String>) {
        self.tag = tag.into();
    }

    /// Append all declarations of a record.
    pub(crate) fn merge_record(&mut self, record: &IndexRecord) {
        self.subprograms.extend(record.subprograms.iter().cloned());
        self.variables.extend(record.variables.iter().cloned());
        self.types.extend(record.types.iter().cloned());
    }

    /// Append the innermost entries of `exports` named in `only`, renamed.
    ///
    /// `exports` is not modified; renamed copies are appended.
    pub(crate) fn merge_renamed(&mut self, exports: &Scope, only: &[RenameMapping]) {
        for mapping in only {
            if let Some(entry) = exports.find_subprogram(&mapping.original) {
                let mut copy = entry.clone();
                copy.name.clone_from(&mapping.renamed);
                self.subprograms.push(copy);
            }
            if let Some(entry) = exports.find_variable(&mapping.original) {
                let mut copy = entry.clone();
                copy.name.clone_from(&mapping.renamed);
                self.variables.push(copy);
            }
            if let Some(entry) = exports.find_type(&mapping.original) {
                let mut copy = entry.clone();
                copy.name.clone_from(&mapping.renamed);
                self.types.push(copy);
            }
        }
    }

    pub(crate) fn push_subprograms<'a>(&mut self, records: impl Iterator<Item = &'a IndexRecord>) {
        self.subprograms.extend(records.cloned());
    }
}
