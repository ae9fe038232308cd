//! Failure reporting for scope resolution and kernel argument derivation.
//!
//! Every fallible lookup in the pipeline funnels through one [`ErrorPolicy`].
//! Under [`ErrorMode::Strict`] a failure becomes a [`ScopeError`] that aborts
//! the run; under [`ErrorMode::Lenient`] it is logged as a warning and the
//! caller continues with a sentinel record, so the generated code carries
//! clearly marked placeholders instead of stopping.
//!
//! ```text
//! let outcome = policy.fail(ScopeError::variable("x", "m:s"), VariableDeclaration::unknown());
//! let (decl, found) = outcome.into_lookup()?;   // Err only in strict mode
//! ```
//!
//! Each failure class has an [`ErrorCode`] for searchability and a distinct
//! process exit status used by the driver.

mod error;
mod error_code;
mod policy;

pub use error::ScopeError;
pub use error_code::ErrorCode;
pub use policy::{ErrorMode, ErrorPolicy, Outcome};
