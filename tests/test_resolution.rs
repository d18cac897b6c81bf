//! Resolution across files, scopes and artifacts.

mod common;

use common::*;
use javasrc::graph::{GraphStoreExt, TypeBase, TypeState};
use javasrc::resolve::{CompilationContext, ResolveType, ScopeStack};
use rstest::rstest;

const A_JAVA: (&str, &str) = ("p/A.java", "package p; class A { B b; }");
const B_JAVA: (&str, &str) = ("p/B.java", "package p; class B {}");

#[rstest]
#[case::a_first(&[A_JAVA, B_JAVA])]
#[case::b_first(&[B_JAVA, A_JAVA])]
fn test_field_type_lands_on_declared_node_in_either_order(#[case] files: &[(&str, &str)]) {
    let store = memory_store();
    let artifact = store.create_artifact("app", &[]).unwrap();

    scan_sources(&store, artifact, files);

    assert_eq!(nodes_named(&store, "p.A"), 1);
    assert_eq!(nodes_named(&store, "p.B"), 1);
    let a = type_in(&store, "p.A", artifact);
    let b = type_in(&store, "p.B", artifact);
    assert!(a.is_complete());
    assert!(b.is_complete());

    let fields = fields_of(&store, a.id);
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].name, "b");
    assert_eq!(fields[0].type_use.base, TypeBase::Declared(b.id));
    assert_eq!(fields[0].signature, "p.B b");
    assert!(a.depends_on.contains(&b.id));

    let required = store
        .read(|graph| graph.units().iter().map(|u| u.required_types.len()).sum::<usize>())
        .unwrap();
    assert_eq!(required, 0);
}

#[test]
fn test_no_duplicates_across_many_files() {
    let store = memory_store();
    let artifact = store.create_artifact("app", &[]).unwrap();
    let sources: Vec<(String, String)> = (0..12)
        .map(|i| {
            let next = (i + 1) % 12;
            (
                format!("p/C{i}.java"),
                format!("package p; public class C{i} extends C{next} {{ C0 first; Shared shared; }}"),
            )
        })
        .collect();
    let files: Vec<(&str, &str)> = sources.iter().map(|(p, t)| (p.as_str(), t.as_str())).collect();

    scan_sources(&store, artifact, &files);

    let (complete, incomplete) = store
        .read(|graph| {
            let complete = graph.types().iter().filter(|t| t.is_complete()).count();
            let incomplete: Vec<String> = graph.incomplete_types().map(|t| t.name.to_string()).collect();
            (complete, incomplete)
        })
        .unwrap();
    assert_eq!(complete, 12);
    assert_eq!(incomplete, ["p.Shared"]);
    for i in 0..12 {
        assert_eq!(nodes_named(&store, &format!("p.C{i}")), 1);
    }
    let c11 = type_in(&store, "p.C11", artifact);
    assert_eq!(c11.superclass, Some(type_in(&store, "p.C0", artifact).id));
}

#[test]
fn test_placeholder_promoted_when_declared_later() {
    let store = memory_store();
    let artifact = store.create_artifact("app", &[]).unwrap();
    let context = CompilationContext::new(artifact);
    let user = store.create_unit("com/acme/User.java", Some(artifact)).unwrap();
    let decl = store.create_unit("com/acme/Foo.java", Some(artifact)).unwrap();

    let mut stack = ScopeStack::new(store.clone());
    let mut scope = stack.enter(Some(&context)).unwrap();
    let placeholder = scope.resolve(&qn("com.acme.Foo"), user).unwrap();
    assert_eq!(
        type_by_id(&store, placeholder).state(),
        TypeState::Incomplete { required_by: Some(user) }
    );

    let declared = scope.declare(&qn("com.acme.Foo"), decl).unwrap();
    scope.exit().unwrap();

    assert_eq!(declared, placeholder);
    assert_eq!(nodes_named(&store, "com.acme.Foo"), 1);
    assert_eq!(
        type_by_id(&store, declared).state(),
        TypeState::Complete { declared_by: decl }
    );
    let still_required = store.read(|graph| graph.unit(user).unwrap().requires(declared)).unwrap();
    assert!(!still_required);
}

#[test]
fn test_dependency_boundary() {
    let store = memory_store();
    let lib = store.create_artifact("lib", &[]).unwrap();
    scan_sources(&store, lib, &[("lib/Util.java", "package lib; public class Util {}")]);
    let lib_util = type_in(&store, "lib.Util", lib);

    let with_dep = store.create_artifact("app", &[lib]).unwrap();
    let without_dep = store.create_artifact("other", &[]).unwrap();
    let source = "package app; import lib.Util; class Main { Util util; }";
    scan_sources(&store, with_dep, &[("app/Main.java", source)]);
    scan_sources(&store, without_dep, &[("app/Main.java", source)]);

    let linked = type_in(&store, "app.Main", with_dep);
    assert_eq!(fields_of(&store, linked.id)[0].type_use.base, TypeBase::Declared(lib_util.id));

    let isolated = type_in(&store, "app.Main", without_dep);
    let TypeBase::Declared(target) = fields_of(&store, isolated.id)[0].type_use.base.clone() else {
        panic!("field type is not declared");
    };
    assert_ne!(target, lib_util.id);
    let placeholder = type_by_id(&store, target);
    assert!(!placeholder.is_complete());
    assert_eq!(placeholder.universe, Some(without_dep));
}

#[test]
fn test_local_declaration_shadows_dependency() {
    let store = memory_store();
    let lib = store.create_artifact("lib", &[]).unwrap();
    scan_sources(&store, lib, &[("p/Shared.java", "package p; public class Shared {}")]);
    let app = store.create_artifact("app", &[lib]).unwrap();

    let reports = scan_sources(
        &store,
        app,
        &[
            ("p/Shared.java", "package p; public class Shared {}"),
            ("p/User.java", "package p; class User { Shared shared; }"),
        ],
    );

    assert!(reports.iter().all(|r| r.diagnostics.is_empty()));
    let own = type_in(&store, "p.Shared", app);
    assert!(own.is_complete());
    let user = type_in(&store, "p.User", app);
    assert_eq!(fields_of(&store, user.id)[0].type_use.base, TypeBase::Declared(own.id));
}

#[test]
fn test_global_scope_shares_one_universe() {
    let store = memory_store();
    let scanner = javasrc::SourceScanner::default();
    let mut stack = ScopeStack::new(store.clone());

    {
        let mut scope = stack.enter(None).unwrap();
        scanner
            .scan_source(&mut scope, None, "q/Uses.java", "package q; class Uses { Later later; }")
            .unwrap();
        scope.exit().unwrap();
    }
    let mut scope = stack.enter(None).unwrap();
    scanner
        .scan_source(&mut scope, None, "q/Later.java", "package q; class Later {}")
        .unwrap();
    scope.exit().unwrap();

    assert_eq!(nodes_named(&store, "q.Later"), 1);
    let later = store.read(|graph| graph.find_type(&qn("q.Later"))).unwrap().unwrap();
    assert!(type_by_id(&store, later).is_complete());
    assert_eq!(type_by_id(&store, later).universe, None);
}

#[test]
fn test_rescanning_a_path_returns_the_existing_unit() {
    let store = memory_store();
    let artifact = store.create_artifact("app", &[]).unwrap();

    let reports = scan_sources(&store, artifact, &[B_JAVA, B_JAVA]);

    assert_eq!(reports[0].unit, reports[1].unit);
    assert!(!reports[0].rescanned);
    assert!(reports[1].rescanned);
    assert_eq!(reports[1].declared_types, reports[0].declared_types);
    assert_eq!(nodes_named(&store, "p.B"), 1);
}
