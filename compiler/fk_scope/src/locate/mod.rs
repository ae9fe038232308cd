//! Symbol lookup within a resolved scope.
//!
//! Variable expressions may be plain names (`a`), derived-type member paths
//! (`a%b%c`) or either of those with index expressions attached
//! (`A%b(i,j)%c(a%i5)`). [`search_tag`] reduces an expression to its
//! canonical member path, and the locator walks that path one segment at a
//! time: the first segment among the scope's variables, every later segment
//! among the members of the derived type named by the previous segment's
//! kind.

mod fold;

use fk_diagnostic::{ErrorPolicy, Outcome, ScopeError};
use fk_index::{IndexRecord, TypeDeclaration, VariableDeclaration};

use crate::Scope;

/// Canonical lookup tag for a variable expression.
///
/// Strips a leading sign, lower-cases, and removes parenthesized index
/// expressions while keeping the `%` structure outside of them:
/// `-A%b(i)%c` becomes `a%b%c`.
pub fn search_tag(expr: &str) -> String {
    let expr = expr.trim().trim_start_matches(['-', '+']).to_ascii_lowercase();
    if !expr.contains('(') {
        return expr;
    }
    let mut depth = 0usize;
    let mut tag = String::with_capacity(expr.len());
    for c in expr.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => tag.push(c),
            _ => {}
        }
    }
    tag
}

/// Looks up declarations in one scope under one error policy.
#[derive(Copy, Clone, Debug)]
pub struct Locator<'a> {
    scope: &'a Scope,
    policy: ErrorPolicy,
}

impl<'a> Locator<'a> {
    pub fn new(scope: &'a Scope, policy: ErrorPolicy) -> Self {
        Locator { scope, policy }
    }

    pub fn scope(&self) -> &'a Scope {
        self.scope
    }

    /// Find the declaration an expression refers to.
    ///
    /// Returns the declaration and whether it was found; on a miss the
    /// declaration is [`VariableDeclaration::unknown`] (lenient) or the call
    /// fails (strict). With `resolve`, `parameter` constants in the
    /// declaration's kind, bounds, sizes and index macro are substituted and
    /// folded.
    pub fn locate_variable(
        &self,
        expr: &str,
        resolve: bool,
    ) -> Result<(VariableDeclaration, bool), ScopeError> {
        self.variable_outcome(expr, resolve).into_lookup()
    }

    /// Like [`Locator::locate_variable`], returning the tagged outcome.
    pub fn variable_outcome(&self, expr: &str, resolve: bool) -> Outcome<VariableDeclaration> {
        let tag = search_tag(expr);
        let path: Vec<&str> = tag.split('%').collect();
        let Some(found) = self.walk_member_path(&path) else {
            return self.policy.fail(
                ScopeError::variable(tag.as_str(), self.scope.tag()),
                VariableDeclaration::unknown(),
            );
        };
        tracing::trace!("entry found for variable '{tag}'");

        let mut decl = found.clone();
        if resolve {
            fold::resolve_constants(&mut decl, self.scope);
        }
        Outcome::Ok(decl)
    }

    /// Innermost derived type with the given name.
    pub fn locate_type(&self, name: &str) -> Result<(TypeDeclaration, bool), ScopeError> {
        match self.scope.find_type(name) {
            Some(found) => Ok((found.clone(), true)),
            None => self
                .policy
                .fail(
                    ScopeError::type_decl(name, self.scope.tag()),
                    TypeDeclaration::unknown(),
                )
                .into_lookup(),
        }
    }

    /// Innermost subprogram with the given name.
    pub fn locate_subprogram(&self, name: &str) -> Result<(IndexRecord, bool), ScopeError> {
        match self.scope.find_subprogram(name) {
            Some(found) => Ok((found.clone(), true)),
            None => self
                .policy
                .fail(
                    ScopeError::subprogram(name, self.scope.tag()),
                    IndexRecord::unknown(),
                )
                .into_lookup(),
        }
    }

    fn walk_member_path(&self, path: &[&str]) -> Option<&'a VariableDeclaration> {
        let (first, members) = path.split_first()?;
        let mut current = self.scope.find_variable(first)?;
        for member in members {
            let ty = self.scope.find_type(&current.kind)?;
            current = ty
                .variables
                .iter()
                .rev()
                .find(|v| v.name.eq_ignore_ascii_case(member))?;
        }
        Some(current)
    }
}
