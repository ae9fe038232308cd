//! Variable and derived-type declarations.

use serde::{Deserialize, Serialize};

/// Placeholder text used by sentinel declarations.
pub const UNKNOWN: &str = "UNKNOWN";

/// Target data clauses that place a variable in device memory.
const DEVICE_TARGET_CLAUSES: [&str; 4] = ["alloc", "to", "from", "tofrom"];

/// A declared variable as recorded by the indexer.
///
/// Bound, count and size fields are Fortran expression text; they may
/// reference `parameter` constants until the locator folds them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariableDeclaration {
    pub name: String,
    /// Fortran base type: `integer`, `real`, `complex`, `logical`,
    /// `character` or `type` for derived types.
    pub f_type: String,
    /// Kind parameter, or the type name when `f_type` is `type`.
    pub kind: String,
    pub bytes_per_element: String,
    pub rank: i32,
    pub qualifiers: Vec<String>,
    /// Initial value of a `parameter`.
    pub value: Option<String>,
    /// Target data clause (`alloc`, `to`, `from`, `tofrom`).
    pub declare_on_target: Option<String>,
    /// True for deferred or assumed shape arrays (`a(:,:)`).
    pub unspecified_bounds: bool,
    /// Lower bound expression per dimension.
    pub lbounds: Vec<String>,
    /// Extent expression per dimension.
    pub counts: Vec<String>,
    pub total_count: String,
    pub total_bytes: String,
    pub index_macro: String,
    pub index_macro_with_placeholders: String,
}

impl VariableDeclaration {
    /// A scalar of the given type and kind.
    pub fn scalar(name: impl Into<String>, f_type: impl Into<String>, kind: impl Into<String>) -> Self {
        VariableDeclaration {
            name: name.into(),
            f_type: f_type.into(),
            kind: kind.into(),
            total_count: "1".to_string(),
            ..VariableDeclaration::default()
        }
    }

    /// An explicit-shape array with per-dimension lower bounds and extents.
    ///
    /// Derives total count and both index macro forms from the bounds.
    pub fn array(
        name: impl Into<String>,
        f_type: impl Into<String>,
        kind: impl Into<String>,
        lbounds: &[&str],
        counts: &[&str],
    ) -> Self {
        let name = name.into();
        let lbounds: Vec<String> = lbounds.iter().map(ToString::to_string).collect();
        let counts: Vec<String> = counts.iter().map(ToString::to_string).collect();
        let rank = i32::try_from(counts.len()).unwrap_or(i32::MAX);

        let placeholder_lbounds: Vec<String> =
            (1..=counts.len()).map(|d| format!("{name}_lb{d}")).collect();
        let placeholder_counts: Vec<String> =
            (1..=counts.len()).map(|d| format!("{name}_n{d}")).collect();

        VariableDeclaration {
            index_macro: index_macro(&name, &lbounds, &counts),
            index_macro_with_placeholders: index_macro(
                &name,
                &placeholder_lbounds,
                &placeholder_counts,
            ),
            total_count: counts
                .iter()
                .map(|c| format!("({c})"))
                .collect::<Vec<_>>()
                .join("*"),
            rank,
            lbounds,
            counts,
            ..VariableDeclaration::scalar(name, f_type, kind)
        }
    }

    /// Sentinel returned by lenient lookups that found nothing.
    pub fn unknown() -> Self {
        VariableDeclaration {
            name: UNKNOWN.to_string(),
            f_type: UNKNOWN.to_string(),
            kind: UNKNOWN.to_string(),
            bytes_per_element: UNKNOWN.to_string(),
            rank: -1,
            total_count: UNKNOWN.to_string(),
            total_bytes: UNKNOWN.to_string(),
            index_macro: UNKNOWN.to_string(),
            index_macro_with_placeholders: UNKNOWN.to_string(),
            ..VariableDeclaration::default()
        }
    }

    #[must_use]
    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifiers.push(qualifier.into());
        self
    }

    /// Mark as `parameter` with the given value.
    #[must_use]
    pub fn with_parameter_value(mut self, value: impl Into<String>) -> Self {
        if !self.is_parameter() {
            self.qualifiers.push("parameter".to_string());
        }
        self.value = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_unspecified_bounds(mut self) -> Self {
        self.unspecified_bounds = true;
        self
    }

    pub fn has_qualifier(&self, qualifier: &str) -> bool {
        self.qualifiers
            .iter()
            .any(|q| q.eq_ignore_ascii_case(qualifier))
    }

    pub fn is_parameter(&self) -> bool {
        self.has_qualifier("parameter")
    }

    pub fn is_array(&self) -> bool {
        self.rank > 0
    }

    /// Rank as a dimension count; sentinels and scalars report zero.
    pub fn dimensions(&self) -> usize {
        usize::try_from(self.rank).unwrap_or(0)
    }

    pub fn is_unknown(&self) -> bool {
        self.name == UNKNOWN
    }

    /// Whether the variable lives in device memory.
    pub fn is_on_device(&self) -> bool {
        self.has_qualifier("device")
            || self.declare_on_target.as_deref().is_some_and(|clause| {
                DEVICE_TARGET_CLAUSES
                    .iter()
                    .any(|c| c.eq_ignore_ascii_case(clause))
            })
    }
}

/// Column-major linearised index macro, e.g. `a(i1,i2) a[((i1)-(1))+(n1)*((i2)-(1))]`.
fn index_macro(name: &str, lbounds: &[String], counts: &[String]) -> String {
    let params: Vec<String> = (1..=counts.len()).map(|d| format!("i{d}")).collect();
    let mut offset = String::new();
    let mut stride = String::new();
    for (d, (lb, count)) in lbounds.iter().zip(counts).enumerate() {
        let term = format!("((i{})-({lb}))", d + 1);
        if d == 0 {
            offset.push_str(&term);
        } else {
            offset.push_str(&format!("+{stride}*{term}"));
        }
        if stride.is_empty() {
            stride = format!("({count})");
        } else {
            stride = format!("{stride}*({count})");
        }
    }
    format!("{name}({}) {name}[{offset}]", params.join(","))
}

/// A derived type and its member variables.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeDeclaration {
    pub name: String,
    pub variables: Vec<VariableDeclaration>,
}

impl TypeDeclaration {
    pub fn new(name: impl Into<String>, variables: Vec<VariableDeclaration>) -> Self {
        TypeDeclaration {
            name: name.into(),
            variables,
        }
    }

    /// Sentinel returned by lenient lookups.
    pub fn unknown() -> Self {
        TypeDeclaration::new(UNKNOWN, Vec::new())
    }
}
