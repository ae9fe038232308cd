//! Launch dimension entries.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One entry of a problem-size, grid or block triple.
///
/// The parser reports clauses it did not see as `-2` and clauses given
/// without a value as `-1`; everything else is the clause text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DimEntry {
    Literal(i64),
    Expr(String),
}

impl DimEntry {
    pub const NOT_FOUND: DimEntry = DimEntry::Literal(-2);
    pub const NOT_SPECIFIED: DimEntry = DimEntry::Literal(-1);

    pub fn is_sentinel(&self) -> bool {
        matches!(self, DimEntry::Literal(-2 | -1))
    }
}

impl fmt::Display for DimEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimEntry::Literal(value) => write!(f, "{value}"),
            DimEntry::Expr(text) => f.write_str(text),
        }
    }
}

impl From<i64> for DimEntry {
    fn from(value: i64) -> Self {
        DimEntry::Literal(value)
    }
}

impl From<&str> for DimEntry {
    fn from(text: &str) -> Self {
        DimEntry::Expr(text.to_string())
    }
}

/// A dimension entry with its axis label (`X`, `Y`, `Z`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledDim {
    pub dim: char,
    pub value: DimEntry,
}

/// Label the first `dimensions` entries, optionally dropping sentinels
/// first.
pub fn label_dims(entries: &[DimEntry], dimensions: usize, filter: bool) -> Vec<LabeledDim> {
    entries
        .iter()
        .filter(|entry| !filter || !entry.is_sentinel())
        .take(dimensions)
        .zip(['X', 'Y', 'Z'])
        .map(|(value, dim)| LabeledDim {
            dim,
            value: value.clone(),
        })
        .collect()
}

/// Default block size per loop nest depth.
pub fn default_block(dimensions: usize) -> Vec<DimEntry> {
    let sizes: &[i64] = match dimensions {
        1 => &[128],
        _ => &[128, 1, 1],
    };
    sizes.iter().copied().map(DimEntry::Literal).collect()
}
