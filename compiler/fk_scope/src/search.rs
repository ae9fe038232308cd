//! One-call lookups: resolve a parent tag, then search its scope.

use fk_diagnostic::ScopeError;
use fk_index::{Index, IndexRecord, TypeDeclaration, VariableDeclaration};

use crate::{Locator, ResolveOptions, ScopeCache};

/// Resolve `parent_tag` and locate the variable expression `expr` in it.
pub fn search_index_for_variable(
    cache: &mut ScopeCache,
    index: &Index,
    parent_tag: &str,
    expr: &str,
    resolve: bool,
    options: &ResolveOptions,
) -> Result<(VariableDeclaration, bool), ScopeError> {
    tracing::trace!("search index for variable '{expr}' in scope '{parent_tag}'");
    let scope = cache.resolve(index, parent_tag, options)?;
    Locator::new(&scope, options.policy).locate_variable(expr, resolve)
}

/// Resolve `parent_tag` and locate the derived type `name` in it.
pub fn search_index_for_type(
    cache: &mut ScopeCache,
    index: &Index,
    parent_tag: &str,
    name: &str,
    options: &ResolveOptions,
) -> Result<(TypeDeclaration, bool), ScopeError> {
    tracing::trace!("search index for type '{name}' in scope '{parent_tag}'");
    let scope = cache.resolve(index, parent_tag, options)?;
    Locator::new(&scope, options.policy).locate_type(name)
}

/// Resolve `parent_tag` and locate the subprogram `name` in it.
pub fn search_index_for_subprogram(
    cache: &mut ScopeCache,
    index: &Index,
    parent_tag: &str,
    name: &str,
    options: &ResolveOptions,
) -> Result<(IndexRecord, bool), ScopeError> {
    tracing::trace!("search index for subprogram '{name}' in scope '{parent_tag}'");
    let scope = cache.resolve(index, parent_tag, options)?;
    Locator::new(&scope, options.policy).locate_subprogram(name)
}
