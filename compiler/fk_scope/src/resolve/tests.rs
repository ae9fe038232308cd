use super::*;
use fk_diagnostic::{ErrorCode, ErrorPolicy};
use fk_index::{RecordKind, RenameMapping, UsedModule, VariableDeclaration};
use pretty_assertions::assert_eq;

fn int(name: &str) -> VariableDeclaration {
    VariableDeclaration::scalar(name, "integer", "")
}

fn real(name: &str) -> VariableDeclaration {
    VariableDeclaration::scalar(name, "real", "8")
}

fn module(name: &str, variables: Vec<VariableDeclaration>) -> IndexRecord {
    IndexRecord::new(RecordKind::Module, name).with_variables(variables)
}

fn variable_names(scope: &Scope) -> Vec<&str> {
    scope.variables().iter().map(|v| v.name.as_str()).collect()
}

/// `module m` with variables `a, b` and contained subroutines `s1`, `s2`.
fn nested_index() -> Index {
    Index::new(vec![module("m", vec![int("a"), int("b")]).with_subprograms(vec![
        IndexRecord::new(RecordKind::Subroutine, "s1").with_variables(vec![real("t1")]),
        IndexRecord::new(RecordKind::Subroutine, "s2").with_variables(vec![real("t2")]),
    ])])
}

#[test]
fn module_scope_contains_module_variables() {
    let index = nested_index();
    let mut cache = ScopeCache::new();
    let scope = cache.resolve(&index, "m", &ResolveOptions::default()).unwrap();
    assert_eq!(scope.tag(), "m");
    assert_eq!(variable_names(&scope), vec!["a", "b"]);
    assert_eq!(scope.subprograms().len(), 2);
}

#[test]
fn nested_scope_appends_inner_declarations_last() {
    let index = nested_index();
    let mut cache = ScopeCache::new();
    let scope = cache
        .resolve(&index, "m:s1", &ResolveOptions::default())
        .unwrap();
    assert_eq!(scope.tag(), "m:s1");
    assert_eq!(scope.depth(), 2);
    assert_eq!(variable_names(&scope), vec!["a", "b", "t1"]);
}

#[test]
fn tags_are_case_insensitive() {
    let index = nested_index();
    let mut cache = ScopeCache::new();
    let scope = cache
        .resolve(&index, "M:S1", &ResolveOptions::default())
        .unwrap();
    assert_eq!(scope.tag(), "m:s1");
    assert!(scope.find_variable("T1").is_some());
}

#[test]
fn extending_tag_reuses_cached_parent() {
    let index = nested_index();
    let options = ResolveOptions::default();
    let mut cache = ScopeCache::new();

    let parent = cache.resolve(&index, "m", &options).unwrap();
    let child = cache.resolve(&index, "m:s1", &options).unwrap();
    assert_eq!(cache.tags().collect::<Vec<_>>(), vec!["m", "m:s1"]);
    assert!(child.variables().starts_with(parent.variables()));

    // The parent survives because it is a prefix of the child request.
    let again = cache.resolve(&index, "m", &options).unwrap();
    assert!(Rc::ptr_eq(&parent, &again));
}

#[test]
fn sibling_request_evicts_non_prefix_scopes() {
    let index = nested_index();
    let options = ResolveOptions::default();
    let mut cache = ScopeCache::new();

    cache.resolve(&index, "m", &options).unwrap();
    cache.resolve(&index, "m:s1", &options).unwrap();
    let sibling = cache.resolve(&index, "m:s2", &options).unwrap();

    assert_eq!(cache.tags().collect::<Vec<_>>(), vec!["m", "m:s2"]);
    assert_eq!(variable_names(&sibling), vec!["a", "b", "t2"]);
}

#[test]
fn prefix_match_is_segment_wise() {
    let index = Index::new(vec![
        module("m", vec![int("a")]),
        module("m2", vec![int("z")]),
    ]);
    let options = ResolveOptions::default();
    let mut cache = ScopeCache::new();

    cache.resolve(&index, "m", &options).unwrap();
    let other = cache.resolve(&index, "m2", &options).unwrap();
    assert_eq!(variable_names(&other), vec!["z"]);
    assert_eq!(cache.tags().collect::<Vec<_>>(), vec!["m2"]);
}

#[test]
fn eviction_can_be_disabled() {
    let index = nested_index();
    let options = ResolveOptions {
        remove_outdated_scopes: false,
        ..ResolveOptions::default()
    };
    let mut cache = ScopeCache::new();
    cache.resolve(&index, "m:s1", &options).unwrap();
    cache.resolve(&index, "m:s2", &options).unwrap();
    assert_eq!(cache.len(), 2);
}

#[test]
fn resolving_twice_is_idempotent() {
    let index = nested_index();
    let options = ResolveOptions::default();
    let mut cache = ScopeCache::new();
    let first = cache.resolve(&index, "m:s1", &options).unwrap();
    let second = cache.resolve(&index, "m:s1", &options).unwrap();
    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(*first, *second);
    assert_eq!(cache.len(), 1);
}

#[test]
fn invalidate_rebuilds_equal_scope() {
    let index = nested_index();
    let options = ResolveOptions::default();
    let mut cache = ScopeCache::new();
    let first = cache.resolve(&index, "m:s1", &options).unwrap();
    cache.invalidate();
    assert!(cache.is_empty());
    let rebuilt = cache.resolve(&index, "m:s1", &options).unwrap();
    assert!(!Rc::ptr_eq(&first, &rebuilt));
    assert_eq!(*first, *rebuilt);
}

#[test]
fn inner_declaration_shadows_used_module() {
    let index = Index::new(vec![
        module("m", vec![real("x")]),
        IndexRecord::new(RecordKind::Program, "p")
            .with_used_modules(vec![UsedModule::all("m")])
            .with_variables(vec![int("x")]),
    ]);
    let mut cache = ScopeCache::new();
    let scope = cache.resolve(&index, "p", &ResolveOptions::default()).unwrap();
    assert_eq!(scope.find_variable("x").unwrap().f_type, "integer");
}

#[test]
fn use_only_imports_renamed_entries() {
    let index = Index::new(vec![
        module("m", vec![int("a"), int("b")]),
        IndexRecord::new(RecordKind::Module, "q").with_used_modules(vec![UsedModule::only(
            "m",
            vec![RenameMapping::new("a", "x")],
        )]),
    ]);
    let original = index.clone();
    let mut cache = ScopeCache::new();
    let scope = cache.resolve(&index, "q", &ResolveOptions::default()).unwrap();

    assert_eq!(variable_names(&scope), vec!["x"]);
    assert!(scope.find_variable("a").is_none());
    assert!(scope.find_variable("b").is_none());
    assert_eq!(index, original);
}

#[test]
fn use_only_renames_types_and_subprograms() {
    let mut m = module("m", Vec::new());
    m.types = vec![fk_index::TypeDeclaration::new("vec3", vec![real("x")])];
    m.subprograms = vec![IndexRecord::new(RecordKind::Function, "norm")];
    let index = Index::new(vec![
        m,
        IndexRecord::new(RecordKind::Program, "p").with_used_modules(vec![UsedModule::only(
            "m",
            vec![
                RenameMapping::new("vec3", "point"),
                RenameMapping::new("norm", "norm"),
            ],
        )]),
    ]);
    let mut cache = ScopeCache::new();
    let scope = cache.resolve(&index, "p", &ResolveOptions::default()).unwrap();
    assert!(scope.find_type("point").is_some());
    assert!(scope.find_type("vec3").is_none());
    assert!(scope.find_subprogram("norm").is_some());
}

#[test]
fn use_is_transitive() {
    let index = Index::new(vec![
        module("z", vec![int("deep")]),
        module("m", vec![int("mid")]).with_used_modules(vec![UsedModule::all("z")]),
        IndexRecord::new(RecordKind::Program, "p").with_used_modules(vec![UsedModule::all("m")]),
    ]);
    let mut cache = ScopeCache::new();
    let scope = cache.resolve(&index, "p", &ResolveOptions::default()).unwrap();
    assert_eq!(variable_names(&scope), vec!["deep", "mid"]);
}

/// `z { deep }`, `m { a, b }` uses `z`.
fn chained_modules(only: Vec<RenameMapping>) -> Index {
    Index::new(vec![
        module("z", vec![int("deep")]),
        module("m", vec![int("a"), int("b")]).with_used_modules(vec![UsedModule::all("z")]),
        IndexRecord::new(RecordKind::Module, "q")
            .with_used_modules(vec![UsedModule::only("m", only)]),
    ])
}

#[test]
fn use_only_hides_entries_the_module_imports() {
    let index = chained_modules(vec![RenameMapping::new("a", "x")]);
    let scope = ScopeCache::new()
        .resolve(&index, "q", &ResolveOptions::default())
        .unwrap();
    assert_eq!(variable_names(&scope), vec!["x"]);
    assert!(scope.find_variable("deep").is_none());
}

#[test]
fn use_only_renames_entries_the_module_imports() {
    let index = chained_modules(vec![RenameMapping::new("deep", "d")]);
    let scope = ScopeCache::new()
        .resolve(&index, "q", &ResolveOptions::default())
        .unwrap();
    assert_eq!(variable_names(&scope), vec!["d"]);
    assert_eq!(scope.find_variable("d").unwrap().f_type, "integer");
}

#[test]
fn cyclic_use_terminates() {
    let index = Index::new(vec![
        module("a", vec![int("va")]).with_used_modules(vec![UsedModule::all("b")]),
        module("b", vec![int("vb")]).with_used_modules(vec![UsedModule::all("a")]),
    ]);
    let mut cache = ScopeCache::new();
    let scope = cache.resolve(&index, "a", &ResolveOptions::default()).unwrap();
    assert_eq!(variable_names(&scope), vec!["vb", "va"]);
}

#[test]
fn ignored_module_contributes_nothing_even_when_strict() {
    let index = Index::new(vec![
        module("iso_c_binding", vec![int("c_int")]),
        IndexRecord::new(RecordKind::Program, "p")
            .with_used_modules(vec![UsedModule::all("iso_c_binding")]),
    ]);
    let options = ResolveOptions::default().with_policy(ErrorPolicy::strict());
    let mut cache = ScopeCache::new();
    let scope = cache.resolve(&index, "p", &options).unwrap();
    assert!(scope.variables().is_empty());
}

#[test]
fn missing_module_is_fatal_when_strict() {
    let index = Index::new(vec![IndexRecord::new(RecordKind::Program, "p")
        .with_used_modules(vec![UsedModule::all("nowhere")])]);
    let options = ResolveOptions::default().with_policy(ErrorPolicy::strict());
    let err = ScopeCache::new().resolve(&index, "p", &options).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E1001);
    assert_eq!(err.symbol(), "nowhere");
    assert_eq!(err.tag(), "p");
}

#[test]
fn missing_module_is_skipped_when_lenient() {
    let index = Index::new(vec![IndexRecord::new(RecordKind::Program, "p")
        .with_used_modules(vec![UsedModule::all("nowhere")])
        .with_variables(vec![int("k")])]);
    let scope = ScopeCache::new()
        .resolve(&index, "p", &ResolveOptions::default())
        .unwrap();
    assert_eq!(variable_names(&scope), vec!["k"]);
}

#[test]
fn missing_tag_segment_follows_policy() {
    let index = nested_index();
    let strict = ResolveOptions::default().with_policy(ErrorPolicy::strict());
    let err = ScopeCache::new()
        .resolve(&index, "m:nope", &strict)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::E1004);
    assert_eq!(err.symbol(), "nope");

    let err = ScopeCache::new().resolve(&index, "nope", &strict).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E1001);

    let scope = ScopeCache::new()
        .resolve(&index, "m:nope", &ResolveOptions::default())
        .unwrap();
    assert_eq!(variable_names(&scope), vec!["a", "b"]);
}

#[test]
fn top_level_scope_sees_sibling_procedures() {
    let index = Index::new(vec![
        IndexRecord::new(RecordKind::Subroutine, "first"),
        IndexRecord::new(RecordKind::Subroutine, "second"),
        IndexRecord::new(RecordKind::Function, "third"),
        module("m", Vec::new()),
    ]);
    let mut cache = ScopeCache::new();
    let scope = cache
        .resolve(&index, "first", &ResolveOptions::default())
        .unwrap();
    let names: Vec<&str> = scope.subprograms().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["second", "third"]);
}
