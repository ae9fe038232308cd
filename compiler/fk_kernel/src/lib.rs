//! Kernel argument synthesis for Fortran accelerator kernels.
//!
//! Given a resolved [`fk_scope::Scope`] and the free identifiers of a loop
//! kernel or accelerator subroutine, this crate produces
//!
//! - the native kernel signature: arrays decomposed into a device pointer
//!   plus per-dimension lower bounds and extents, reductions rewritten to
//!   device buffers, index macros;
//! - the host-callable launcher interfaces and the CPU fallback routine;
//! - the batch contexts handed to the source emitter.
//!
//! # Pipeline Position
//!
//! ```text
//! Index → Scope Resolver → Locator → **Argument Deriver → Assembler** → emitter
//! ```

mod argument;
mod assemble;
mod derive;
mod extract;
mod native_type;

pub use argument::{AbiVariant, ArgumentRole, HostArgument, IndexMacro, KernelArgument};
pub use assemble::{
    assemble_kernel, assemble_routine, default_block, label_dims, rewrite_reductions,
    AssembledKernel, DimEntry, InterfaceArg, InterfaceDescriptor, InterfaceVariant,
    KernelDescriptor, LabeledDim, ParsedKernel, ParsedRoutine, Reduction, ReductionClause,
};
pub use derive::{derive, logical_name, DeriveRequest, DerivedArguments};
pub use extract::{
    extract, interface_module_name, ExtractOptions, Extraction, InterfaceModuleContext,
    KernelSelection, LaunchSite, NativeContext, DEFAULT_INCLUDES, INTERFACE_MODULE_USES,
};
pub use native_type::{
    bytes_per_element, fortran_type, native_type, GENERIC_NATIVE_TYPE, UNKNOWN_BYTES,
};
