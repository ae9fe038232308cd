//! Batch extraction: selection, per-kernel assembly and output contexts.

use std::str::FromStr;

use fk_diagnostic::ScopeError;
use fk_index::Index;
use fk_scope::{ResolveOptions, ScopeCache};
use serde::{Deserialize, Serialize};

use crate::assemble::{
    assemble_kernel, assemble_routine, AssembledKernel, InterfaceDescriptor, KernelDescriptor,
    ParsedKernel, ParsedRoutine,
};

/// Headers every generated native file includes.
pub const DEFAULT_INCLUDES: [&str; 2] = ["hip/hip_runtime.h", "hip/hip_complex.h"];

/// Modules every generated interface module uses.
pub const INTERFACE_MODULE_USES: [&str; 2] = ["hipfort", "hipfort_check"];

/// Which kernels to convert.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum KernelSelection {
    /// `*`
    All,
    /// A kernel starting on this source line.
    Line(usize),
    /// A kernel with this name (case-insensitive).
    Name(String),
}

impl KernelSelection {
    pub fn matches(&self, name: &str, line: usize) -> bool {
        match self {
            KernelSelection::All => true,
            KernelSelection::Line(selected) => *selected == line,
            KernelSelection::Name(selected) => selected.eq_ignore_ascii_case(name),
        }
    }
}

impl FromStr for KernelSelection {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(if s == "*" {
            KernelSelection::All
        } else if let Ok(line) = s.parse() {
            KernelSelection::Line(line)
        } else {
            KernelSelection::Name(s.to_string())
        })
    }
}

/// Settings for one extraction run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractOptions {
    pub resolve: ResolveOptions,
    pub selection: Vec<KernelSelection>,
    /// Base name of the input file; names the interface module.
    pub basename: String,
    pub includes: Vec<String>,
    pub fortran_module_preamble: String,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            resolve: ResolveOptions::default(),
            selection: vec![KernelSelection::All],
            basename: String::new(),
            includes: Vec::new(),
            fortran_module_preamble: String::new(),
        }
    }
}

impl ExtractOptions {
    fn is_selected(&self, name: &str, line: usize) -> bool {
        self.selection.iter().any(|s| s.matches(name, line))
    }
}

/// Everything the native source template needs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeContext {
    pub includes: Vec<String>,
    pub kernels: Vec<KernelDescriptor>,
    pub have_reductions: bool,
}

/// Everything the Fortran interface module template needs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceModuleContext {
    pub name: String,
    pub preamble: String,
    pub used: Vec<String>,
    /// Manual, then auto interface of each kernel.
    pub interfaces: Vec<InterfaceDescriptor>,
    /// CPU fallback routines.
    pub routines: Vec<InterfaceDescriptor>,
}

/// Host code rewrite information for one kernel launch site.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchSite {
    pub kernel_name: String,
    pub launcher_name: String,
    pub line: usize,
    pub host_call_arg_names: Vec<String>,
    pub stream: String,
    pub shared_mem: String,
    pub default_present: Vec<String>,
}

/// Output of [`extract`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    pub native: NativeContext,
    pub interface_module: InterfaceModuleContext,
    pub launch_sites: Vec<LaunchSite>,
}

impl Extraction {
    /// No kernel was selected.
    pub fn is_empty(&self) -> bool {
        self.native.kernels.is_empty()
    }

    fn push(&mut self, assembled: AssembledKernel, line: usize) {
        self.native.have_reductions |= assembled.has_reductions();
        self.launch_sites.push(LaunchSite {
            kernel_name: assembled.descriptor.kernel_name.clone(),
            launcher_name: assembled.descriptor.interface_name.clone(),
            line,
            host_call_arg_names: assembled.host_call_arg_names,
            stream: assembled.stream,
            shared_mem: assembled.shared_mem,
            default_present: assembled.default_present,
        });
        self.native.kernels.push(assembled.descriptor);
        self.interface_module.interfaces.extend(assembled.interfaces);
        self.interface_module.routines.push(assembled.cpu_routine);
    }
}

/// Interface module name for an input file: `foo-bar.f90` → `foo_bar_f90_kernels`.
pub fn interface_module_name(basename: &str) -> String {
    format!("{}_kernels", basename.replace(['.', '-'], "_"))
}

/// Assemble every selected loop kernel and accelerator routine.
///
/// Scopes are resolved through one cache for the whole batch; a fatal
/// lookup failure aborts the batch.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(kernels = kernels.len(), routines = routines.len())
)]
pub fn extract(
    index: &Index,
    kernels: &[ParsedKernel],
    routines: &[ParsedRoutine],
    options: &ExtractOptions,
) -> Result<Extraction, ScopeError> {
    let mut cache = ScopeCache::new();
    let policy = options.resolve.policy;
    let mut extraction = Extraction::default();

    for parsed in kernels {
        if !options.is_selected(&parsed.kernel_name, parsed.line) {
            tracing::debug!("skip kernel '{}'", parsed.kernel_name);
            continue;
        }
        let scope = cache.resolve(index, &parsed.parent_tag, &options.resolve)?;
        let assembled = assemble_kernel(&scope, parsed, policy)?;
        extraction.push(assembled, parsed.line);
    }

    for parsed in routines {
        if !options.is_selected(&parsed.kernel_name, parsed.line) {
            tracing::debug!("skip routine '{}'", parsed.kernel_name);
            continue;
        }
        let scope = cache.resolve(index, &parsed.tag, &options.resolve)?;
        let assembled = assemble_routine(&scope, parsed, policy)?;
        extraction.push(assembled, parsed.line);
    }

    if extraction.is_empty() {
        tracing::debug!("no kernels selected");
        return Ok(Extraction::default());
    }

    extraction.native.includes = DEFAULT_INCLUDES
        .iter()
        .map(ToString::to_string)
        .chain(options.includes.iter().cloned())
        .collect();
    extraction.interface_module.name = interface_module_name(&options.basename);
    extraction
        .interface_module
        .preamble
        .clone_from(&options.fortran_module_preamble);
    extraction.interface_module.used =
        INTERFACE_MODULE_USES.iter().map(ToString::to_string).collect();

    tracing::debug!(
        kernels = extraction.native.kernels.len(),
        interfaces = extraction.interface_module.interfaces.len(),
        "extraction complete"
    );
    Ok(extraction)
}
