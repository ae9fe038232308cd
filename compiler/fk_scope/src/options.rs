//! Resolver configuration.

use fk_diagnostic::ErrorPolicy;

/// Intrinsic and runtime modules that have no index record.
pub const DEFAULT_IGNORED_MODULES: &[&str] = &[
    "iso_c_binding",
    "iso_fortran_env",
    "ieee_arithmetic",
    "ieee_exceptions",
    "ieee_features",
    "omp_lib",
    "omp_lib_kinds",
    "openacc",
    "cudafor",
    "hipfort",
    "hipfort_check",
];

/// Settings consulted by the resolver and the locator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolveOptions {
    pub policy: ErrorPolicy,
    /// Modules that resolve to nothing instead of failing.
    pub module_ignore_list: Vec<String>,
    /// Drop cached scopes that are not a prefix of the current request.
    pub remove_outdated_scopes: bool,
}

impl ResolveOptions {
    #[must_use]
    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn is_ignored(&self, module: &str) -> bool {
        self.module_ignore_list
            .iter()
            .any(|m| m.eq_ignore_ascii_case(module))
    }
}

impl Default for ResolveOptions {
    fn default() -> Self {
        ResolveOptions {
            policy: ErrorPolicy::default(),
            module_ignore_list: DEFAULT_IGNORED_MODULES
                .iter()
                .map(ToString::to_string)
                .collect(),
            remove_outdated_scopes: true,
        }
    }
}
