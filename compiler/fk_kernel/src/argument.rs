//! Kernel and host-routine argument records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Host-side calling convention of the kernel launcher.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbiVariant {
    /// CUDA Fortran: arrays are passed as `c_loc(<var>)`.
    #[default]
    CudaFortran,
    /// OpenACC: arrays are passed as the mapped device pointer `d_<var>`.
    OpenAcc,
}

impl AbiVariant {
    /// Host call-site expression for the device address of array `var`.
    pub fn array_call_name(self, var: &str) -> String {
        match self {
            AbiVariant::CudaFortran => format!("c_loc({var})"),
            AbiVariant::OpenAcc => format!("d_{var}"),
        }
    }
}

/// What an argument stands for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "dim")]
pub enum ArgumentRole {
    /// Scalar passed by value.
    Value,
    /// Opaque device handle of an array.
    DevicePointer,
    /// Lower bound of array dimension `dim` (1-based).
    LowerBound(usize),
    /// Extent of array dimension `dim` (1-based).
    Count(usize),
    /// Identifier without a declaration.
    Placeholder,
}

/// One argument of a native kernel and its launcher interfaces.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelArgument {
    /// Logical name; `%` of member paths is replaced by `_`.
    pub name: String,
    /// Expression passed at the host call site.
    pub call_arg_name: String,
    /// Type in the Fortran interface, e.g. `type(c_ptr)`.
    pub f_type: String,
    /// Declared Fortran type, e.g. `real(8)`.
    pub orig_type: String,
    pub qualifiers: Vec<String>,
    pub c_type: String,
    /// Native array suffix, e.g. `[16]`, for kernel-local arrays.
    pub c_size: String,
    /// Literal value of a `parameter`.
    pub value: Option<String>,
    pub bytes_per_element: String,
    pub reduction_op: Option<String>,
    pub role: ArgumentRole,
}

impl KernelArgument {
    pub fn is_device_pointer(&self) -> bool {
        self.role == ArgumentRole::DevicePointer
    }

    pub fn is_placeholder(&self) -> bool {
        self.role == ArgumentRole::Placeholder
    }

    pub fn has_qualifier(&self, qualifier: &str) -> bool {
        self.qualifiers
            .iter()
            .any(|q| q.eq_ignore_ascii_case(qualifier))
    }

    /// Native declaration: `<c_type> <name><c_size>`.
    pub fn native_declaration(&self) -> String {
        format!("{} {}{}", self.c_type, self.name, self.c_size)
    }
}

impl fmt::Display for KernelArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.native_declaration())
    }
}

/// Linearised index expression of an array accessed inside a kernel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMacro {
    pub variable: String,
    pub expr: String,
    /// `false` when `expr` still references `<var>_lb<d>`/`<var>_n<d>`.
    pub resolved: bool,
}

/// A declaration the CPU fallback routine needs beyond the kernel
/// arguments: loop indices, kernel locals and host shadow arrays.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostArgument {
    pub name: String,
    pub f_type: String,
    pub qualifiers: Vec<String>,
    /// Allocation bounds of a shadow array: `a_lb1:a_lb1+a_n1-1,...`.
    pub bounds: Option<String>,
    pub bytes_per_element: String,
}

impl HostArgument {
    pub fn is_shadow_array(&self) -> bool {
        self.bounds.is_some()
    }
}

impl From<&KernelArgument> for HostArgument {
    fn from(arg: &KernelArgument) -> Self {
        HostArgument {
            name: arg.name.clone(),
            f_type: arg.orig_type.clone(),
            qualifiers: arg.qualifiers.clone(),
            bounds: None,
            bytes_per_element: arg.bytes_per_element.clone(),
        }
    }
}
