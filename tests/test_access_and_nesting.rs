//! Field access edges, binary names of nested types and implied member
//! modifiers.

mod common;

use common::*;
use javasrc::graph::{AccessKind, GraphStoreExt, TypeBase, Visibility};
use javasrc::scan::ScanConfig;
use rstest::rstest;

const COUNTER: &str = "package p;\n\
class Counter {\n\
    int count;\n\
    int[] slots;\n\
    void bump(int by) {\n\
        count += by;\n\
        count++;\n\
        --count;\n\
        this.count = count;\n\
    }\n\
    void shadow() {\n\
        int count = 0;\n\
        count = count + 1;\n\
        Runnable r = () -> { slots[0] = 1; };\n\
        for (int slots : new int[0]) { slots++; }\n\
    }\n\
}\n";

fn counter_accesses(config: ScanConfig) -> Vec<(String, String, u32, AccessKind)> {
    let store = memory_store();
    let artifact = store.create_artifact("app", &[]).unwrap();
    scan_sources_with(&store, artifact, &[("p/Counter.java", COUNTER)], config);
    store
        .read(|graph| {
            graph
                .accesses()
                .iter()
                .map(|a| {
                    let function = graph.function(a.function).unwrap().name.to_string();
                    let field = graph.field(a.field).unwrap().name.to_string();
                    (function, field, a.line, a.kind)
                })
                .collect()
        })
        .unwrap()
}

#[test]
fn test_one_edge_per_occurrence() {
    let accesses = counter_accesses(ScanConfig::default());
    let of = |function: &str, line: u32| -> Vec<AccessKind> {
        accesses
            .iter()
            .filter(|(f, _, l, _)| f == function && *l == line)
            .map(|(_, _, _, kind)| *kind)
            .collect()
    };

    // count += by
    assert_eq!(of("bump", 6), [AccessKind::Read, AccessKind::Write]);
    // count++
    assert_eq!(of("bump", 7), [AccessKind::Read, AccessKind::Write]);
    // --count
    assert_eq!(of("bump", 8), [AccessKind::Read, AccessKind::Write]);
    // this.count = count
    assert_eq!(of("bump", 9), [AccessKind::Write, AccessKind::Read]);
}

#[test]
fn test_locals_shadow_fields() {
    let accesses = counter_accesses(ScanConfig::default());
    let in_shadow: Vec<_> = accesses.iter().filter(|(f, ..)| f == "shadow").collect();

    // Only the lambda touches a field: `slots[0] = 1` reads the array field.
    assert_eq!(in_shadow.len(), 1);
    assert_eq!(in_shadow[0].1, "slots");
    assert_eq!(in_shadow[0].2, 14);
    assert_eq!(in_shadow[0].3, AccessKind::Read);
}

#[test]
fn test_access_recording_can_be_disabled() {
    assert!(counter_accesses(ScanConfig::default().with_record_accesses(false)).is_empty());
}

#[rstest]
#[case::anonymous("p.Outer$1")]
#[case::second_anonymous("p.Outer$2")]
#[case::local("p.Outer$1Local")]
#[case::second_local_same_name("p.Outer$2Local")]
#[case::member("p.Outer$Member")]
#[case::anonymous_in_member("p.Outer$Member$1")]
#[case::enum_constant_body("p.Outer$Mode$1")]
fn test_binary_names(#[case] name: &str) {
    let store = memory_store();
    let artifact = store.create_artifact("app", &[]).unwrap();
    let source = "package p;\n\
        class Outer {\n\
            Runnable first = new Runnable() { public void run() {} };\n\
            void m() {\n\
                class Local {}\n\
                Object o = new Object() {};\n\
            }\n\
            void n() { class Local {} }\n\
            class Member { Object x = new Object() {}; }\n\
            enum Mode { FAST { }, SLOW }\n\
        }\n";

    let reports = scan_sources(&store, artifact, &[("p/Outer.java", source)]);

    assert!(!reports[0].may_not_compile);
    let ty = type_in(&store, name, artifact);
    assert!(ty.is_complete());
    assert_eq!(nodes_named(&store, name), 1);
}

#[test]
fn test_anonymous_supertypes() {
    let store = memory_store();
    let artifact = store.create_artifact("app", &[]).unwrap();
    let source = "package p;\n\
        class Outer {\n\
            Base b = new Base() {};\n\
            Api a = new Api() {};\n\
            enum Mode { FAST { } }\n\
        }\n\
        class Base {}\n\
        interface Api {}\n";

    scan_sources(&store, artifact, &[("p/Outer.java", source)]);

    let base = type_in(&store, "p.Base", artifact);
    let api = type_in(&store, "p.Api", artifact);
    let mode = type_in(&store, "p.Outer$Mode", artifact);

    let first = type_in(&store, "p.Outer$1", artifact);
    assert_eq!(first.superclass, Some(base.id));
    assert!(first.interfaces.is_empty());

    let second = type_in(&store, "p.Outer$2", artifact);
    assert_eq!(second.superclass, None);
    assert_eq!(second.interfaces, vec![api.id]);

    let constant_body = type_in(&store, "p.Outer$Mode$1", artifact);
    assert_eq!(constant_body.superclass, Some(mode.id));
    assert_eq!(constant_body.declaring_type, Some(mode.id));
}

#[test]
fn test_type_variables_are_not_types() {
    let store = memory_store();
    let artifact = store.create_artifact("app", &[]).unwrap();
    let source = "package p;\n\
        class Box<T extends Comparable<T>> {\n\
            T value;\n\
            <U> U map(U seed, T[] values) { return seed; }\n\
        }\n";

    scan_sources(&store, artifact, &[("p/Box.java", source)]);

    let boxed = type_in(&store, "p.Box", artifact);
    let fields = fields_of(&store, boxed.id);
    assert_eq!(fields[0].type_use.base, TypeBase::Variable("T".into()));
    let functions = functions_of(&store, boxed.id);
    assert_eq!(functions[0].signature, "map(U,T[])");
    assert_eq!(nodes_named(&store, "p.T"), 0);
    assert_eq!(nodes_named(&store, "p.U"), 0);
}

#[test]
fn test_interface_members_get_implied_modifiers() {
    let store = memory_store();
    let artifact = store.create_artifact("app", &[]).unwrap();
    let source = "package p;\n\
        interface Api {\n\
            int LIMIT = 3;\n\
            void run();\n\
            default void stop() {}\n\
            static Api of() { return null; }\n\
        }\n";

    scan_sources(&store, artifact, &[("p/Api.java", source)]);

    let api = type_in(&store, "p.Api", artifact);
    let limit = &fields_of(&store, api.id)[0];
    assert!(limit.modifiers.is_static && limit.modifiers.is_final);
    assert_eq!(limit.modifiers.visibility, Visibility::Public);

    let functions = functions_of(&store, api.id);
    let abstract_flags: Vec<(&str, bool)> = functions
        .iter()
        .map(|f| (f.name.as_str(), f.modifiers.is_abstract))
        .collect();
    assert_eq!(abstract_flags, [("run", true), ("stop", false), ("of", false)]);
    assert!(functions.iter().all(|f| f.modifiers.visibility == Visibility::Public));
    assert_eq!(functions[2].returns.as_ref().and_then(|r| r.declared()), Some(api.id));
}
