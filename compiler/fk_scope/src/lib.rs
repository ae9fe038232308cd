//! Scope resolution and symbol lookup for Fortran kernels.
//!
//! Answers "what does this name mean here": given a hierarchical tag such as
//! `mymod:mysub`, builds the set of declarations visible at that nesting
//! position, including everything pulled in by `use` statements, and
//! resolves member-path expressions like `grid%cells(i)%volume` against it.
//!
//! # Pipeline Position
//!
//! ```text
//! Index → **Scope Resolver → Locator** → Kernel Argument Deriver → Assembler
//! ```
//!
//! # Components
//!
//! - [`ScopeCache`]: builds scopes on demand and reuses them while requests
//!   keep extending a cached tag. The cache is an explicit object; callers
//!   that share one must serialize access.
//! - [`Locator`]: innermost-first lookup of variables, types and
//!   subprograms, with optional folding of `parameter` constants.
//! - `const_eval`: the small arithmetic evaluator behind folding.
//!
//! All failures go through [`fk_diagnostic::ErrorPolicy`].

mod const_eval;
mod locate;
mod options;
mod resolve;
mod scope;
mod search;

pub use const_eval::{evaluate, substitute_parameters};
pub use locate::{search_tag, Locator};
pub use options::{ResolveOptions, DEFAULT_IGNORED_MODULES};
pub use resolve::ScopeCache;
pub use scope::Scope;
pub use search::{search_index_for_subprogram, search_index_for_type, search_index_for_variable};
