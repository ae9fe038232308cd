//! `use` statement resolution.

use fk_diagnostic::ScopeError;
use fk_index::{Index, IndexRecord};
use rustc_hash::FxHashSet;

use crate::{ResolveOptions, Scope};

/// Merge everything `record` imports into `scope`.
///
/// Used modules are expanded depth-first: a module's own imports land in
/// the scope before the module's entries. Modules already being expanded
/// further up the chain are skipped, which breaks `use` cycles. A `use`
/// with an `only` list first collects the module's exports into a scratch
/// scope and then copies just the listed names.
pub(super) fn resolve_uses(
    scope: &mut Scope,
    record: &IndexRecord,
    index: &Index,
    options: &ResolveOptions,
) -> Result<(), ScopeError> {
    let mut resolver = UseResolver {
        index,
        options,
        chain: FxHashSet::default(),
    };
    resolver.chain.insert(record.name.to_ascii_lowercase());
    resolver.walk(scope, record)
}

struct UseResolver<'a> {
    index: &'a Index,
    options: &'a ResolveOptions,
    /// Modules currently being expanded.
    chain: FxHashSet<String>,
}

impl UseResolver<'_> {
    fn walk(&mut self, scope: &mut Scope, record: &IndexRecord) -> Result<(), ScopeError> {
        for used in &record.used_modules {
            if self.options.is_ignored(&used.name) {
                tracing::trace!("ignore use of module '{}'", used.name);
                continue;
            }

            let index = self.index;
            let Some(module) = index.find(&used.name) else {
                self.options
                    .policy
                    .check(ScopeError::module(used.name.as_str(), scope.tag()))?;
                continue;
            };

            let key = module.name.to_ascii_lowercase();
            if !self.chain.insert(key.clone()) {
                tracing::debug!(
                    "skip cyclic use of module '{}' from '{}'",
                    module.name,
                    record.name
                );
                continue;
            }

            if used.imports_everything() {
                self.walk(scope, module)?;
                tracing::debug!("use all definitions from module '{}'", module.name);
                scope.merge_record(module);
            } else {
                let mut exports = Scope::new(scope.tag());
                self.walk(&mut exports, module)?;
                exports.merge_record(module);
                for mapping in &used.only {
                    tracing::debug!(
                        "use '{}' as '{}' from module '{}'",
                        mapping.original,
                        mapping.renamed,
                        module.name
                    );
                }
                scope.merge_renamed(&exports, &used.only);
            }
            self.chain.remove(&key);
        }
        Ok(())
    }
}
