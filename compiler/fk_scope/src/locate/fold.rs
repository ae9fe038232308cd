//! Folding of `parameter` constants into declaration fields.

use fk_index::VariableDeclaration;

use crate::const_eval::{evaluate, substitute_parameters};
use crate::Scope;

/// Upper bound on substitution passes. Parameters defined through other
/// parameters need one pass per level; self-referential definitions stop
/// here.
const MAX_FOLD_PASSES: usize = 8;

/// Substitute and fold every `parameter` visible in `scope` into the text
/// fields of `decl`.
pub(super) fn resolve_constants(decl: &mut VariableDeclaration, scope: &Scope) {
    let parameters = scope.parameters();

    if !parameters.is_empty() {
        for pass in 0..MAX_FOLD_PASSES {
            let mut changed = false;
            for field in foldable_fields(decl) {
                let substituted = substitute_parameters(field, &parameters);
                if substituted != *field {
                    *field = substituted;
                    changed = true;
                }
            }
            if !changed {
                tracing::trace!("parameter substitution settled after {pass} passes");
                break;
            }
        }
    }

    for field in foldable_fields(decl) {
        if let Some(literal) = evaluate(field) {
            *field = literal;
        }
    }
}

/// Kind, bounds, counts, sizes, index macro, and the value of a numeric
/// parameter.
fn foldable_fields(decl: &mut VariableDeclaration) -> Vec<&mut String> {
    let fold_value = decl.is_parameter()
        && !matches!(
            decl.f_type.to_ascii_lowercase().as_str(),
            "character" | "type"
        );

    let mut fields = vec![
        &mut decl.kind,
        &mut decl.total_count,
        &mut decl.total_bytes,
        &mut decl.index_macro,
    ];
    fields.extend(decl.lbounds.iter_mut());
    fields.extend(decl.counts.iter_mut());
    if fold_value {
        if let Some(value) = decl.value.as_mut() {
            fields.push(value);
        }
    }
    fields
}
