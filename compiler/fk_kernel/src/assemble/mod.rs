//! Kernel and launcher interface assembly.
//!
//! Turns derived arguments plus the parser's view of a kernel into
//!
//! - a native [`KernelDescriptor`] (signature, reductions, launch dims);
//! - host-callable [`InterfaceDescriptor`]s: `manual` (grid, block, shared
//!   memory, stream), `auto` (shared memory, stream) and a CPU fallback
//!   routine that runs the original Fortran body on host copies of the
//!   device arrays.
//!
//! Assembly is a single pass per kernel:
//!
//! ```text
//! derive → reduction rewrite → launch dims → interfaces
//! ```

mod dims;

pub use dims::{default_block, label_dims, DimEntry, LabeledDim};

use fk_diagnostic::{ErrorPolicy, ScopeError};
use fk_scope::Scope;
use serde::{Deserialize, Serialize};

use crate::argument::{AbiVariant, HostArgument, IndexMacro, KernelArgument};
use crate::derive::{derive, DeriveRequest, DerivedArguments};

/// Operator of a reduction clause and the variables it reduces.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReductionClause {
    pub op: String,
    pub variables: Vec<String>,
}

/// A loop kernel as reported by the external parser.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedKernel {
    pub kernel_name: String,
    pub launcher_name: String,
    /// Tag of the enclosing program unit.
    pub parent_tag: String,
    /// First source line of the kernel.
    pub line: usize,
    pub abi: AbiVariant,
    pub identifiers: Vec<String>,
    pub kernel_locals: Vec<String>,
    pub loop_vars: Vec<String>,
    pub reductions: Vec<ReductionClause>,
    pub dimensions: usize,
    pub problem_size: Vec<DimEntry>,
    pub grid: Vec<DimEntry>,
    pub block: Vec<DimEntry>,
    pub c_body: String,
    pub f_body: String,
    pub stream: String,
    pub shared_mem: String,
}

/// A subroutine marked for acceleration as reported by the external parser.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedRoutine {
    pub kernel_name: String,
    /// Tag of the routine itself.
    pub tag: String,
    pub line: usize,
    pub arg_names: Vec<String>,
    /// Local variables declared by the routine.
    pub kernel_locals: Vec<String>,
    pub c_body: String,
    pub f_body: String,
}

impl ParsedRoutine {
    pub fn launcher_name(&self) -> String {
        format!("launch_{}", self.kernel_name)
    }
}

/// A reduction variable and its device buffer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reduction {
    pub buffer: String,
    pub name: String,
    /// Native type of the reduced value (not of the buffer).
    pub c_type: String,
    pub op: String,
}

/// Native kernel and launcher description for the emitter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelDescriptor {
    pub kernel_name: String,
    pub interface_name: String,
    pub is_loop_kernel: bool,
    pub size: Vec<LabeledDim>,
    pub grid: Vec<LabeledDim>,
    pub block: Vec<LabeledDim>,
    pub grid_dims: Vec<String>,
    pub block_dims: Vec<String>,
    pub macros: Vec<IndexMacro>,
    pub c_body: String,
    pub f_body: String,
    /// Native parameter declarations.
    pub kernel_args: Vec<String>,
    pub kernel_call_arg_names: Vec<String>,
    pub reductions: Vec<Reduction>,
    pub kernel_local_vars: Vec<String>,
    pub interface_args: Vec<String>,
    pub interface_arg_names: Vec<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterfaceVariant {
    Auto,
    Manual,
    Cpu,
}

/// One argument of a Fortran interface or routine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceArg {
    pub name: String,
    pub f_type: String,
    pub qualifiers: Vec<String>,
    /// Allocation bounds of a host shadow array.
    pub bounds: Option<String>,
}

impl InterfaceArg {
    fn new(name: &str, f_type: &str, qualifiers: &[&str]) -> Self {
        InterfaceArg {
            name: name.to_string(),
            f_type: f_type.to_string(),
            qualifiers: qualifiers.iter().map(ToString::to_string).collect(),
            bounds: None,
        }
    }
}

impl From<&KernelArgument> for InterfaceArg {
    fn from(arg: &KernelArgument) -> Self {
        InterfaceArg {
            name: arg.name.clone(),
            f_type: arg.f_type.clone(),
            qualifiers: arg.qualifiers.clone(),
            bounds: None,
        }
    }
}

impl From<&HostArgument> for InterfaceArg {
    fn from(arg: &HostArgument) -> Self {
        InterfaceArg {
            name: arg.name.clone(),
            f_type: arg.f_type.clone(),
            qualifiers: arg.qualifiers.clone(),
            bounds: arg.bounds.clone(),
        }
    }
}

/// A host-callable Fortran interface, or the CPU fallback routine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceDescriptor {
    pub variant: InterfaceVariant,
    /// Bound native symbol; `None` for the CPU routine.
    pub c_name: Option<String>,
    pub f_name: String,
    pub args: Vec<InterfaceArg>,
    /// Names passed on to the native launcher or used in the routine header.
    pub arg_names: Vec<String>,
    /// Routine body; `Some` only for the CPU routine.
    pub body: Option<String>,
}

impl InterfaceDescriptor {
    fn interface(
        variant: InterfaceVariant,
        name: String,
        leading: Vec<InterfaceArg>,
        arguments: &[KernelArgument],
    ) -> Self {
        let mut args = leading;
        args.extend(arguments.iter().map(InterfaceArg::from));
        let arg_names = args.iter().map(|a| a.name.clone()).collect();
        InterfaceDescriptor {
            variant,
            c_name: Some(name.clone()),
            f_name: name,
            args,
            arg_names,
            body: None,
        }
    }
}

/// Everything produced for one kernel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssembledKernel {
    pub descriptor: KernelDescriptor,
    /// Launcher interfaces: manual first, then auto (loop kernels only).
    pub interfaces: Vec<InterfaceDescriptor>,
    pub cpu_routine: InterfaceDescriptor,
    /// Call-site expressions for rewriting the host code, in argument order.
    pub host_call_arg_names: Vec<String>,
    pub stream: String,
    pub shared_mem: String,
    /// OpenACC arrays expected to be present on the device.
    pub default_present: Vec<String>,
}

impl AssembledKernel {
    pub fn has_reductions(&self) -> bool {
        !self.descriptor.reductions.is_empty()
    }
}

/// Assemble a loop kernel.
#[tracing::instrument(level = "debug", skip_all, fields(kernel = %parsed.kernel_name))]
pub fn assemble_kernel(
    scope: &Scope,
    parsed: &ParsedKernel,
    policy: ErrorPolicy,
) -> Result<AssembledKernel, ScopeError> {
    let request = DeriveRequest {
        free_identifiers: &parsed.identifiers,
        kernel_locals: &parsed.kernel_locals,
        loop_locals: &parsed.loop_vars,
        allow_list: &[],
        is_loop_kernel: true,
        abi: parsed.abi,
    };
    let DerivedArguments {
        mut arguments,
        kernel_locals,
        macros,
        host_arguments,
    } = derive(scope, &request, policy)?;

    let reductions = rewrite_reductions(&mut arguments, &parsed.reductions);
    let default_present = match parsed.abi {
        AbiVariant::OpenAcc => arguments
            .iter()
            .filter(|a| a.is_device_pointer() && a.reduction_op.is_none())
            .map(|a| a.name.clone())
            .collect(),
        AbiVariant::CudaFortran => Vec::new(),
    };

    let dimensions = parsed.dimensions;
    let size = label_dims(&parsed.problem_size, dimensions, false);
    let grid = label_dims(&parsed.grid, dimensions, true);
    let mut block = label_dims(&parsed.block, dimensions, true);
    if block.is_empty() {
        tracing::debug!("no block size given; using default for {dimensions} dimensions");
        block = label_dims(&default_block(dimensions), dimensions, true);
    }
    // The grid may be omitted, so launch variables follow the block labels.
    let grid_dims = block
        .iter()
        .map(|d| format!("{}_grid{}", parsed.kernel_name, d.dim))
        .collect();
    let block_dims = block
        .iter()
        .map(|d| format!("{}_block{}", parsed.kernel_name, d.dim))
        .collect();

    let descriptor = KernelDescriptor {
        kernel_name: parsed.kernel_name.clone(),
        interface_name: parsed.launcher_name.clone(),
        is_loop_kernel: true,
        size,
        grid,
        block,
        grid_dims,
        block_dims,
        macros,
        c_body: parsed.c_body.clone(),
        f_body: parsed.f_body.clone(),
        kernel_args: native_declarations(&arguments),
        kernel_call_arg_names: kernel_call_arg_names(&arguments),
        reductions,
        kernel_local_vars: kernel_locals
            .iter()
            .map(KernelArgument::native_declaration)
            .collect(),
        interface_args: native_declarations(&arguments),
        interface_arg_names: arguments.iter().map(|a| a.name.clone()).collect(),
    };

    let manual = manual_interface(&parsed.launcher_name, &arguments);
    let auto = auto_interface(&parsed.launcher_name, &arguments);
    let cpu_routine = cpu_routine(&manual, arguments.len(), &host_arguments, &parsed.f_body);

    Ok(AssembledKernel {
        descriptor,
        interfaces: vec![manual, auto],
        cpu_routine,
        host_call_arg_names: arguments.iter().map(|a| a.call_arg_name.clone()).collect(),
        stream: parsed.stream.clone(),
        shared_mem: parsed.shared_mem.clone(),
        default_present,
    })
}

/// Assemble a subroutine marked for acceleration.
///
/// Only the routine's dummy arguments (and declared locals) are considered;
/// there is no automatic launch interface.
#[tracing::instrument(level = "debug", skip_all, fields(kernel = %parsed.kernel_name))]
pub fn assemble_routine(
    scope: &Scope,
    parsed: &ParsedRoutine,
    policy: ErrorPolicy,
) -> Result<AssembledKernel, ScopeError> {
    let identifiers: Vec<String> = parsed
        .arg_names
        .iter()
        .chain(&parsed.kernel_locals)
        .cloned()
        .collect();
    let request = DeriveRequest {
        free_identifiers: &identifiers,
        kernel_locals: &parsed.kernel_locals,
        loop_locals: &[],
        allow_list: &identifiers,
        is_loop_kernel: false,
        abi: AbiVariant::CudaFortran,
    };
    let DerivedArguments {
        arguments,
        kernel_locals,
        macros,
        host_arguments,
    } = derive(scope, &request, policy)?;

    let launcher = parsed.launcher_name();
    let descriptor = KernelDescriptor {
        kernel_name: parsed.kernel_name.clone(),
        interface_name: launcher.clone(),
        is_loop_kernel: false,
        size: Vec::new(),
        grid: Vec::new(),
        block: Vec::new(),
        grid_dims: Vec::new(),
        block_dims: Vec::new(),
        macros,
        c_body: parsed.c_body.clone(),
        f_body: parsed.f_body.clone(),
        kernel_args: native_declarations(&arguments),
        kernel_call_arg_names: kernel_call_arg_names(&arguments),
        reductions: Vec::new(),
        kernel_local_vars: kernel_locals.iter().map(local_with_value).collect(),
        interface_args: native_declarations(&arguments),
        interface_arg_names: arguments.iter().map(|a| a.name.clone()).collect(),
    };

    let manual = manual_interface(&launcher, &arguments);
    let cpu_routine = cpu_routine(&manual, arguments.len(), &host_arguments, &parsed.f_body);

    Ok(AssembledKernel {
        descriptor,
        interfaces: vec![manual],
        cpu_routine,
        host_call_arg_names: arguments.iter().map(|a| a.call_arg_name.clone()).collect(),
        stream: String::new(),
        shared_mem: String::new(),
        default_present: Vec::new(),
    })
}

/// Turn reduction targets into pointer-passed device buffers.
///
/// When several clauses list the same variable, the first one wins.
pub fn rewrite_reductions(
    arguments: &mut [KernelArgument],
    clauses: &[ReductionClause],
) -> Vec<Reduction> {
    let mut reductions = Vec::new();
    for arg in arguments.iter_mut() {
        let Some(clause) = clauses
            .iter()
            .find(|c| c.variables.iter().any(|v| v.eq_ignore_ascii_case(&arg.name)))
        else {
            continue;
        };
        let buffer = format!("_d_{}", arg.name);
        tracing::debug!("'{}' reduces with '{}' into '{buffer}'", arg.name, clause.op);

        arg.qualifiers.retain(|q| !q.eq_ignore_ascii_case("value"));
        reductions.push(Reduction {
            buffer: buffer.clone(),
            name: arg.name.clone(),
            c_type: arg.c_type.clone(),
            op: clause.op.clone(),
        });
        arg.c_type.push('*');
        arg.call_arg_name = buffer;
        arg.reduction_op = Some(clause.op.clone());
    }
    reductions
}

fn native_declarations(arguments: &[KernelArgument]) -> Vec<String> {
    arguments
        .iter()
        .map(KernelArgument::native_declaration)
        .collect()
}

/// Reduction arguments are passed as their buffer, everything else by name.
fn kernel_call_arg_names(arguments: &[KernelArgument]) -> Vec<String> {
    arguments
        .iter()
        .map(|a| {
            if a.reduction_op.is_some() {
                a.call_arg_name.clone()
            } else {
                a.name.clone()
            }
        })
        .collect()
}

fn local_with_value(local: &KernelArgument) -> String {
    match &local.value {
        Some(value) => format!("{} = {value}", local.native_declaration()),
        None => local.native_declaration(),
    }
}

fn manual_interface(launcher: &str, arguments: &[KernelArgument]) -> InterfaceDescriptor {
    InterfaceDescriptor::interface(
        InterfaceVariant::Manual,
        launcher.to_string(),
        vec![
            InterfaceArg::new("grid", "type(dim3)", &["intent(in)"]),
            InterfaceArg::new("block", "type(dim3)", &["intent(in)"]),
            InterfaceArg::new("sharedMem", "integer(c_int)", &["value", "intent(in)"]),
            InterfaceArg::new("stream", "type(c_ptr)", &["value", "intent(in)"]),
        ],
        arguments,
    )
}

fn auto_interface(launcher: &str, arguments: &[KernelArgument]) -> InterfaceDescriptor {
    InterfaceDescriptor::interface(
        InterfaceVariant::Auto,
        format!("{launcher}_auto"),
        vec![
            InterfaceArg::new("sharedMem", "integer(c_int)", &["value", "intent(in)"]),
            InterfaceArg::new("stream", "type(c_ptr)", &["value", "intent(in)"]),
        ],
        arguments,
    )
}

/// CPU fallback with the manual interface's shape.
///
/// Device pointer arguments among the trailing `derived` kernel arguments
/// are renamed `d_<name>`; the launch parameters ahead of them keep their
/// names. The routine copies each device array into its host shadow before
/// `body` and back afterwards.
fn cpu_routine(
    manual: &InterfaceDescriptor,
    derived: usize,
    host_arguments: &[HostArgument],
    body: &str,
) -> InterfaceDescriptor {
    let mut args = manual.args.clone();
    let leading = args.len().saturating_sub(derived);
    for arg in args.iter_mut().skip(leading) {
        let is_device_array = host_arguments
            .iter()
            .any(|h| h.is_shadow_array() && h.name == arg.name);
        if is_device_array {
            arg.name = format!("d_{}", arg.name);
        }
    }
    let arg_names = args.iter().map(|a| a.name.clone()).collect();
    args.extend(host_arguments.iter().map(InterfaceArg::from));

    let mut prolog = String::new();
    let mut epilog = String::new();
    for shadow in host_arguments {
        let Some(bounds) = &shadow.bounds else {
            continue;
        };
        let var = &shadow.name;
        let bpe = &shadow.bytes_per_element;
        prolog.push_str(&format!("allocate({var}({bounds}))\n"));
        prolog.push_str(&format!(
            "CALL hipCheck(hipMemcpy(c_loc({var}),d_{var},{bpe}_8*SIZE({var}),hipMemcpyDeviceToHost))\n"
        ));
        epilog.push_str(&format!(
            "CALL hipCheck(hipMemcpy(d_{var},c_loc({var}),{bpe}_8*SIZE({var}),hipMemcpyHostToDevice))\n"
        ));
        epilog.push_str(&format!("deallocate({var})\n"));
    }

    InterfaceDescriptor {
        variant: InterfaceVariant::Cpu,
        c_name: None,
        f_name: format!("{}_cpu", manual.f_name),
        args,
        arg_names,
        body: Some(format!("{prolog}{body}{epilog}")),
    }
}

#[cfg(test)]
mod tests;
