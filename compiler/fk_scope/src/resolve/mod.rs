//! Scope construction and the scope cache.
//!
//! A scope for `m:s:t` is built by starting from the longest cached scope
//! whose tag is a segment-wise prefix of the request and then, for every
//! remaining segment, merging (1) the modules the segment's record uses and
//! (2) the record's own declarations. Because parents are merged before
//! children, a reverse scan finds the innermost declaration.
//!
//! The cache assumes few live scopes per file: it is a plain list, and
//! scopes that are not a prefix of the current request are evicted.

mod uses;

use std::rc::Rc;

use fk_diagnostic::ScopeError;
use fk_index::{Index, IndexRecord};

use crate::{ResolveOptions, Scope};

/// Previously built scopes, keyed by tag.
///
/// Not reentrant: resolution mutates the cache in place.
#[derive(Debug, Default)]
pub struct ScopeCache {
    scopes: Vec<Rc<Scope>>,
}

impl ScopeCache {
    pub fn new() -> Self {
        ScopeCache::default()
    }

    /// Build (or reuse) the scope for `tag`.
    #[tracing::instrument(level = "debug", skip(self, index, options))]
    pub fn resolve(
        &mut self,
        index: &Index,
        tag: &str,
        options: &ResolveOptions,
    ) -> Result<Rc<Scope>, ScopeError> {
        let tag = tag.to_ascii_lowercase();
        let segments: Vec<&str> = tag.split(':').collect();

        let base = self.longest_prefix(&segments);
        if options.remove_outdated_scopes {
            self.evict_outdated(&segments);
        }

        if let Some(base) = &base {
            if base.depth() == segments.len() {
                tracing::debug!("found existing scope for tag '{tag}'");
                return Ok(Rc::clone(base));
            }
        }

        // Walk the index down to the cached base record; the next segment is
        // looked up among its contained subprograms.
        let base = base.and_then(|scope| {
            find_record(index, &segments[..scope.depth()]).map(|record| (scope, record))
        });

        let (mut scope, mut candidates, begin) = match base {
            Some((cached, record)) => {
                tracing::debug!(
                    "create scope for tag '{tag}' based on existing scope with tag '{}'",
                    cached.tag()
                );
                let mut scope = Scope::clone(&cached);
                scope.set_tag(tag.as_str());
                (scope, record.subprograms.as_slice(), cached.depth())
            }
            None => {
                tracing::debug!("create scope for tag '{tag}'");
                let mut scope = Scope::new(tag.as_str());
                // Sibling top-level procedures are callable from any top-level unit.
                scope.push_subprograms(index.top_level_subprograms(segments[0]));
                tracing::debug!(
                    "add {} top-level subprograms to scope",
                    scope.subprograms().len()
                );
                (scope, index.records(), 0)
            }
        };

        for (depth, segment) in segments.iter().enumerate().skip(begin) {
            let Some(record) = candidates
                .iter()
                .find(|r| r.name.eq_ignore_ascii_case(segment))
            else {
                // Below the top level the segment names a contained subprogram.
                let error = if depth == 0 {
                    ScopeError::module(*segment, tag.as_str())
                } else {
                    ScopeError::subprogram(*segment, tag.as_str())
                };
                options.policy.check(error)?;
                break;
            };
            uses::resolve_uses(&mut scope, record, index, options)?;
            scope.merge_record(record);
            candidates = &record.subprograms;
        }

        let scope = Rc::new(scope);
        self.scopes.push(Rc::clone(&scope));
        Ok(scope)
    }

    /// Drop every cached scope.
    pub fn invalidate(&mut self) {
        tracing::debug!("invalidate {} cached scopes", self.scopes.len());
        self.scopes.clear();
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Tags of the cached scopes, oldest first.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(|s| s.tag())
    }

    fn longest_prefix(&self, segments: &[&str]) -> Option<Rc<Scope>> {
        self.scopes
            .iter()
            .filter(|scope| is_prefix(scope.tag(), segments))
            .max_by_key(|scope| scope.depth())
            .cloned()
    }

    fn evict_outdated(&mut self, segments: &[&str]) {
        let before = self.scopes.len();
        self.scopes.retain(|scope| is_prefix(scope.tag(), segments));
        let evicted = before - self.scopes.len();
        if evicted > 0 {
            tracing::debug!("deleted {evicted} outdated scopes");
        }
    }
}

/// Whether `tag` is a segment-wise prefix of (or equal to) `segments`.
fn is_prefix(tag: &str, segments: &[&str]) -> bool {
    let cached: Vec<&str> = tag.split(':').collect();
    cached.len() <= segments.len() && cached.iter().zip(segments).all(|(a, b)| a == b)
}

/// Follow `segments` from the top-level records through nested subprograms.
fn find_record<'a>(index: &'a Index, segments: &[&str]) -> Option<&'a IndexRecord> {
    let (first, rest) = segments.split_first()?;
    let mut record = index.find(first)?;
    for segment in rest {
        record = record.find_subprogram(segment)?;
    }
    Some(record)
}

#[cfg(test)]
mod tests;
