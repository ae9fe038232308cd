//! Kernel argument derivation.
//!
//! Every free identifier of a kernel body is classified exactly once:
//!
//! | Class        | Kernel argument | Kernel local | Host routine |
//! |--------------|-----------------|--------------|--------------|
//! | loop index   |                 |              | scalar       |
//! | kernel local |                 | yes          | yes          |
//! | captured     | yes             |              | shadow array |
//! | unresolved   | placeholder     |              |              |
//!
//! Captured arrays decompose into one device pointer followed, per
//! dimension, by a lower-bound and an extent scalar. Unresolved
//! identifiers are appended last, and only if no derived argument already
//! carries the same name.

use fk_diagnostic::{ErrorPolicy, ScopeError};
use fk_index::{VariableDeclaration, UNKNOWN};
use fk_scope::{Locator, Scope};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::argument::{AbiVariant, ArgumentRole, HostArgument, IndexMacro, KernelArgument};
use crate::native_type::{bytes_per_element, fortran_type, native_type, UNKNOWN_BYTES};

/// Identifiers and flags of one derivation.
#[derive(Copy, Clone, Debug)]
pub struct DeriveRequest<'a> {
    /// Identifiers referenced in the kernel body, in traversal order.
    pub free_identifiers: &'a [String],
    /// Variables declared inside the kernel body.
    pub kernel_locals: &'a [String],
    /// Loop index variables of the kernel's loop nest.
    pub loop_locals: &'a [String],
    /// If non-empty, only these identifiers are considered.
    pub allow_list: &'a [String],
    pub is_loop_kernel: bool,
    pub abi: AbiVariant,
}

/// Result of [`derive`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedArguments {
    pub arguments: Vec<KernelArgument>,
    pub kernel_locals: Vec<KernelArgument>,
    pub macros: Vec<IndexMacro>,
    pub host_arguments: Vec<HostArgument>,
}

impl DerivedArguments {
    pub fn argument(&self, name: &str) -> Option<&KernelArgument> {
        self.arguments
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
    }
}

/// Classify the free identifiers of a kernel and synthesize its arguments.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(scope = scope.tag(), identifiers = request.free_identifiers.len())
)]
pub fn derive(
    scope: &Scope,
    request: &DeriveRequest<'_>,
    policy: ErrorPolicy,
) -> Result<DerivedArguments, ScopeError> {
    let locator = Locator::new(scope, policy);
    let loop_locals = lowercase_set(request.loop_locals);
    let kernel_locals = lowercase_set(request.kernel_locals);

    let mut derived = DerivedArguments::default();
    let mut unresolved = Vec::new();
    let mut seen = FxHashSet::default();

    for expr in request.free_identifiers {
        if !is_included(expr, request.allow_list) {
            continue;
        }
        let name = logical_name(expr);
        if !seen.insert(name.clone()) {
            tracing::trace!("'{name}' already classified");
            continue;
        }
        let (decl, found) = locator.locate_variable(expr, true)?;
        if !found {
            unresolved.push(placeholder(expr));
            continue;
        }

        let captured = captured_argument(expr, &decl, request.abi);

        if decl.is_array() {
            derived.macros.push(index_macro(&name, &decl, request.is_loop_kernel));
        }

        if loop_locals.contains(&name) {
            tracing::trace!("'{name}' is a loop index");
            let mut arg = captured.pointer;
            arg.qualifiers.clear();
            derived.host_arguments.push(HostArgument::from(&arg));
        } else if kernel_locals.contains(&name) {
            tracing::trace!("'{name}' is kernel-local");
            let mut arg = scalar_argument(expr, &decl);
            arg.qualifiers.clear();
            if decl.is_array() {
                arg.c_size = format!("[{}]", decl.total_count);
            }
            derived.host_arguments.push(HostArgument::from(&arg));
            derived.kernel_locals.push(arg);
        } else {
            tracing::trace!("'{name}' is captured");
            if decl.is_array() {
                derived.host_arguments.push(shadow_array(&captured));
            }
            derived.arguments.push(captured.pointer);
            for (lower, count) in captured.lower_bounds.into_iter().zip(captured.counts) {
                derived.arguments.push(lower);
                derived.arguments.push(count);
            }
        }
    }

    let derived_names: FxHashSet<String> = derived
        .arguments
        .iter()
        .map(|a| a.name.to_ascii_lowercase())
        .collect();
    let mut appended = FxHashSet::default();
    for arg in unresolved {
        let key = arg.name.to_ascii_lowercase();
        if derived_names.contains(&key) || !appended.insert(key) {
            continue;
        }
        let warning = ScopeError::unclassified(arg.name.as_str(), scope.tag());
        tracing::warn!(code = %warning.code(), tag = scope.tag(), "{warning}");
        derived.arguments.push(arg);
    }

    tracing::debug!(
        arguments = derived.arguments.len(),
        kernel_locals = derived.kernel_locals.len(),
        host_arguments = derived.host_arguments.len(),
        "derived kernel arguments"
    );
    Ok(derived)
}

/// Argument name for an identifier: lower case, members joined by `_`.
pub fn logical_name(expr: &str) -> String {
    expr.trim().to_ascii_lowercase().replace('%', "_")
}

fn lowercase_set(names: &[String]) -> FxHashSet<String> {
    names.iter().map(String::as_str).map(logical_name).collect()
}

fn is_included(expr: &str, allow_list: &[String]) -> bool {
    if allow_list.is_empty() {
        !expr.trim().starts_with('_')
    } else {
        allow_list.iter().any(|a| a.trim().eq_ignore_ascii_case(expr.trim()))
    }
}

/// Pointer (or scalar) argument plus per-dimension bound arguments.
struct CapturedArgument {
    pointer: KernelArgument,
    lower_bounds: Vec<KernelArgument>,
    counts: Vec<KernelArgument>,
}

fn scalar_argument(expr: &str, decl: &VariableDeclaration) -> KernelArgument {
    let orig_type = fortran_type(&decl.f_type, &decl.kind);
    let bytes = if decl.bytes_per_element.is_empty() {
        bytes_per_element(&decl.f_type, &decl.kind)
            .map_or_else(|| UNKNOWN_BYTES.to_string(), |b| b.to_string())
    } else {
        decl.bytes_per_element.clone()
    };
    KernelArgument {
        name: logical_name(expr),
        call_arg_name: expr.trim().to_string(),
        f_type: orig_type.clone(),
        orig_type,
        qualifiers: vec!["value".to_string()],
        c_type: native_type(&decl.f_type, &decl.kind).to_string(),
        c_size: String::new(),
        value: decl.is_parameter().then(|| decl.value.clone()).flatten(),
        bytes_per_element: bytes,
        reduction_op: None,
        role: ArgumentRole::Value,
    }
}

fn bound_argument(name: String, call_arg_name: String, role: ArgumentRole) -> KernelArgument {
    KernelArgument {
        name,
        call_arg_name,
        f_type: "integer(c_int)".to_string(),
        orig_type: "integer(c_int)".to_string(),
        qualifiers: vec!["value".to_string(), "intent(in)".to_string()],
        c_type: "const int".to_string(),
        c_size: String::new(),
        value: None,
        bytes_per_element: "4".to_string(),
        reduction_op: None,
        role,
    }
}

fn captured_argument(expr: &str, decl: &VariableDeclaration, abi: AbiVariant) -> CapturedArgument {
    let mut pointer = scalar_argument(expr, decl);
    if !decl.is_array() {
        return CapturedArgument {
            pointer,
            lower_bounds: Vec::new(),
            counts: Vec::new(),
        };
    }

    let var = expr.trim();
    pointer.call_arg_name = abi.array_call_name(var);
    pointer.f_type = "type(c_ptr)".to_string();
    pointer.c_type.push('*');
    pointer.value = None;
    pointer.role = ArgumentRole::DevicePointer;

    let rank = decl.dimensions();
    let lower_bounds = (1..=rank)
        .map(|d| {
            bound_argument(
                format!("{}_lb{d}", pointer.name),
                format!("lbound({var},{d})"),
                ArgumentRole::LowerBound(d),
            )
        })
        .collect();
    let counts = (1..=rank)
        .map(|d| {
            bound_argument(
                format!("{}_n{d}", pointer.name),
                format!("size({var},{d})"),
                ArgumentRole::Count(d),
            )
        })
        .collect();

    CapturedArgument {
        pointer,
        lower_bounds,
        counts,
    }
}

fn index_macro(name: &str, decl: &VariableDeclaration, is_loop_kernel: bool) -> IndexMacro {
    let resolved = is_loop_kernel && !decl.unspecified_bounds;
    IndexMacro {
        variable: name.to_string(),
        expr: if resolved {
            decl.index_macro.clone()
        } else {
            decl.index_macro_with_placeholders.clone()
        },
        resolved,
    }
}

/// Host-allocatable copy of a captured device array for the CPU routine.
fn shadow_array(captured: &CapturedArgument) -> HostArgument {
    let rank = captured.counts.len();
    let bounds = captured
        .lower_bounds
        .iter()
        .zip(&captured.counts)
        .map(|(lb, n)| format!("{lb}:{lb}+{n}-1", lb = lb.name, n = n.name))
        .collect::<Vec<_>>()
        .join(",");
    HostArgument {
        name: captured.pointer.name.clone(),
        f_type: captured.pointer.orig_type.clone(),
        qualifiers: vec![
            "allocatable".to_string(),
            format!("dimension({})", vec![":"; rank].join(",")),
            "target".to_string(),
        ],
        bounds: Some(bounds),
        bytes_per_element: captured.pointer.bytes_per_element.clone(),
    }
}

fn placeholder(expr: &str) -> KernelArgument {
    KernelArgument {
        name: logical_name(expr),
        call_arg_name: expr.trim().to_string(),
        f_type: UNKNOWN.to_string(),
        orig_type: UNKNOWN.to_string(),
        qualifiers: Vec::new(),
        c_type: UNKNOWN.to_string(),
        c_size: String::new(),
        value: None,
        bytes_per_element: UNKNOWN_BYTES.to_string(),
        reduction_op: None,
        role: ArgumentRole::Placeholder,
    }
}
