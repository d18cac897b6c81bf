//! Scanning a small Java package: declarations, members, nested and
//! anonymous types, duplicates and field accesses.

mod common;

use std::sync::Arc;

use common::*;
use javasrc::graph::{
    AccessKind, ArtifactId, FunctionKind, GraphStore, GraphStoreExt, TypeBase, TypeKind, Visibility,
};
use javasrc::scan::{UnitReport, codes};
use once_cell::sync::Lazy;
use rstest::rstest;

struct Scanned {
    store: Arc<dyn GraphStore>,
    artifact: ArtifactId,
    reports: Vec<UnitReport>,
}

impl Scanned {
    fn report(&self, path: &str) -> &UnitReport {
        self.reports.iter().find(|r| r.path == path).unwrap()
    }
}

static EXAMPLE_ONE: Lazy<Scanned> = Lazy::new(|| {
    let store = memory_store();
    let artifact = store.create_artifact("example", &[]).unwrap();
    let reports = scan_sources(
        &store,
        artifact,
        &[
            ("example/one/Annotation.java", include_str!("data/example/one/Annotation.java")),
            ("example/one/Test1.java", include_str!("data/example/one/Test1.java")),
            ("example/one/Test2.java", include_str!("data/example/one/Test2.java")),
            ("example/one/Test3.java", include_str!("data/example/one/Test3.java")),
        ],
    );
    Scanned {
        store,
        artifact,
        reports,
    }
});

fn example_type(name: &str) -> javasrc::graph::TypeNode {
    type_in(&EXAMPLE_ONE.store, name, EXAMPLE_ONE.artifact)
}

#[rstest]
#[case("example.one.Optimize", TypeKind::Annotation)]
#[case("example.one.Optimize$Priority", TypeKind::Enum)]
#[case("example.one.Test1", TypeKind::Class)]
#[case("example.one.ClassLocalTest", TypeKind::Class)]
#[case("example.one.Test3", TypeKind::Class)]
#[case("example.one.Test3$InnerTest1", TypeKind::Class)]
#[case("example.one.Test3$InnerTest1$1", TypeKind::Class)]
#[case("example.one.Test3$MyInterface", TypeKind::Interface)]
#[case("example.one.AnotherTest1", TypeKind::Class)]
fn test_declared_types(#[case] name: &str, #[case] kind: TypeKind) {
    let ty = example_type(name);

    assert!(ty.is_complete(), "{name} is not complete");
    assert_eq!(ty.kind, Some(kind));
    assert_eq!(nodes_named(&EXAMPLE_ONE.store, name), 1);
}

#[test]
fn test_duplicate_declaration_keeps_first() {
    let test1 = example_type("example.one.Test1");
    let first = EXAMPLE_ONE.report("example/one/Test1.java");
    let second = EXAMPLE_ONE.report("example/one/Test2.java");

    assert_eq!(test1.state().declared_by(), Some(first.unit));
    let duplicates: Vec<_> = second
        .diagnostics
        .iter()
        .filter(|d| d.code.as_deref() == Some(codes::DUPLICATE_DECLARATION))
        .collect();
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0].related, Some(first.unit));

    // The duplicate's members are not merged into the first declaration.
    assert_eq!(fields_of(&EXAMPLE_ONE.store, test1.id).len(), 5);
    assert_eq!(second.declared_types, vec![example_type("example.one.ClassLocalTest").id]);
}

#[test]
fn test_main_types() {
    let main_of = |path: &str| {
        let unit = EXAMPLE_ONE.report(path).unit;
        EXAMPLE_ONE
            .store
            .read(|graph| graph.unit(unit).unwrap().main_type())
            .unwrap()
    };

    assert_eq!(main_of("example/one/Test1.java"), Some(example_type("example.one.Test1").id));
    assert_eq!(main_of("example/one/Test2.java"), Some(example_type("example.one.ClassLocalTest").id));
    assert_eq!(main_of("example/one/Test3.java"), Some(example_type("example.one.Test3").id));
    assert_eq!(main_of("example/one/Annotation.java"), Some(example_type("example.one.Optimize").id));
}

#[test]
fn test_units_record_package_and_compile_state() {
    for report in &EXAMPLE_ONE.reports {
        let unit = EXAMPLE_ONE.store.read(|graph| graph.unit(report.unit).unwrap().clone()).unwrap();
        assert_eq!(unit.package.as_deref(), Some("example.one"));
        assert!(!unit.may_not_compile, "{} has syntax errors: {:?}", report.path, report.diagnostics);
    }
}

#[test]
fn test_nested_and_anonymous_types() {
    let test3 = example_type("example.one.Test3");
    let inner = example_type("example.one.Test3$InnerTest1");
    let anonymous = example_type("example.one.Test3$InnerTest1$1");
    let interface = example_type("example.one.Test3$MyInterface");

    assert_eq!(inner.declaring_type, Some(test3.id));
    assert!(inner.modifiers.is_static);
    assert_eq!(test3.inner_types, vec![inner.id, interface.id]);
    assert_eq!(inner.inner_types, vec![anonymous.id]);

    assert_eq!(anonymous.declaring_type, Some(inner.id));
    assert_eq!(anonymous.anonymous_index, Some(1));
    assert_eq!(anonymous.interfaces, vec![interface.id]);
    assert_eq!(anonymous.superclass, None);
    let functions = functions_of(&EXAMPLE_ONE.store, anonymous.id);
    assert_eq!(functions.len(), 1);
    assert_eq!(functions[0].signature, "doIt(java.lang.String)");

    let another = example_type("example.one.AnotherTest1");
    assert!(test3.depends_on.contains(&inner.id));
    assert!(test3.depends_on.contains(&another.id));
}

#[test]
fn test_functions_and_signatures() {
    let test1 = example_type("example.one.Test1");
    let functions = functions_of(&EXAMPLE_ONE.store, test1.id);
    let signatures: Vec<&str> = functions.iter().map(|f| f.signature.as_str()).collect();

    assert_eq!(
        signatures,
        [
            "<clinit>()",
            "<init>()",
            "<init>(int)",
            "main(java.lang.String[])",
            "genString(java.lang.String,java.lang.String)",
            "testBoolean(boolean,boolean)",
        ]
    );
    assert_eq!(functions[0].kind, FunctionKind::Initializer);
    assert!(functions[0].modifiers.is_static);
    assert_eq!(functions[1].kind, FunctionKind::Constructor);

    let main = &functions[3];
    assert!(main.modifiers.is_static);
    assert_eq!(main.modifiers.visibility, Visibility::Public);
    assert_eq!(main.returns.as_ref().map(|r| r.base.clone()), Some(TypeBase::Primitive("void".into())));
    let thrown: Vec<String> = main
        .throws
        .iter()
        .map(|&t| type_by_id(&EXAMPLE_ONE.store, t).name.to_string())
        .collect();
    assert_eq!(thrown, ["example.one.MyException"]);

    let gen_string = &functions[4];
    let thrown: Vec<String> = gen_string
        .throws
        .iter()
        .map(|&t| type_by_id(&EXAMPLE_ONE.store, t).name.to_string())
        .collect();
    assert_eq!(thrown, ["java.lang.IllegalArgumentException", "foo.bar.YourException"]);
    assert!(gen_string.span.start < gen_string.span.end);

    let parameters = EXAMPLE_ONE
        .store
        .read(|graph| {
            gen_string
                .parameters
                .iter()
                .map(|&p| {
                    let p = graph.parameter(p).unwrap();
                    (p.index, p.name.to_string())
                })
                .collect::<Vec<_>>()
        })
        .unwrap();
    assert_eq!(parameters, [(0, "a".to_string()), (1, "b".to_string())]);
}

#[test]
fn test_fields() {
    let test1 = example_type("example.one.Test1");
    let fields = fields_of(&EXAMPLE_ONE.store, test1.id);
    let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();

    assert_eq!(names, ["date1", "a", "b", "c", "myInt"]);
    assert_eq!(fields[0].signature, "java.util.Date date1");
    assert_eq!(fields[0].line, 9);
    assert!(fields[0].modifiers.is_static);
    assert_eq!(fields[0].modifiers.visibility, Visibility::Private);
    assert_eq!(fields[1].signature, "int a");
}

#[test]
fn test_enum_constants_and_annotation_members() {
    let optimize = example_type("example.one.Optimize");
    let priority = example_type("example.one.Optimize$Priority");

    let constants = fields_of(&EXAMPLE_ONE.store, priority.id);
    let names: Vec<&str> = constants.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["LOW", "NORM", "HIGH"]);
    assert!(constants.iter().all(|f| f.modifiers.is_static && f.modifiers.is_final));
    assert!(constants.iter().all(|f| f.type_use.base == TypeBase::Declared(priority.id)));
    assert!(priority.modifiers.is_static);
    assert_eq!(priority.modifiers.visibility, Visibility::Public);

    let members = functions_of(&EXAMPLE_ONE.store, optimize.id);
    let signatures: Vec<&str> = members.iter().map(|f| f.signature.as_str()).collect();
    assert_eq!(signatures, ["value()", "assignedTo()", "priority()"]);
    assert!(members.iter().all(|f| f.modifiers.is_abstract && f.modifiers.visibility == Visibility::Public));
    assert_eq!(members[1].returns.as_ref().map(|r| r.dims), Some(1));
    assert_eq!(
        members[2].returns.as_ref().map(|r| r.base.clone()),
        Some(TypeBase::Declared(priority.id))
    );
}

#[test]
fn test_field_accesses() {
    let test1 = example_type("example.one.Test1");
    let fields = fields_of(&EXAMPLE_ONE.store, test1.id);
    let field = |name: &str| fields.iter().find(|f| f.name == name).unwrap().id;

    let (date1_reads, date1_writes, my_int_writes, c_reads, a_reads) = EXAMPLE_ONE
        .store
        .read(|graph| {
            (
                graph.access_count(field("date1"), AccessKind::Read),
                graph.access_count(field("date1"), AccessKind::Write),
                graph.access_count(field("myInt"), AccessKind::Write),
                graph.access_count(field("c"), AccessKind::Read),
                graph.access_count(field("a"), AccessKind::Read),
            )
        })
        .unwrap();

    assert_eq!(date1_writes, 1);
    assert_eq!(date1_reads, 1);
    assert_eq!(my_int_writes, 1);
    assert_eq!(c_reads, 1);
    // Shadowed by parameters and locals everywhere it appears.
    assert_eq!(a_reads, 0);

    let lines: Vec<(u32, AccessKind)> = EXAMPLE_ONE
        .store
        .read(|graph| graph.accesses_of(field("date1")).map(|a| (a.line, a.kind)).collect())
        .unwrap();
    assert_eq!(lines, [(12, AccessKind::Write), (14, AccessKind::Read)]);
}

#[test]
fn test_unresolved_references_stay_incomplete() {
    let class_local = example_type("example.one.ClassLocalTest");
    let superclass = type_by_id(&EXAMPLE_ONE.store, class_local.superclass.unwrap());

    assert_eq!(superclass.name.as_str(), "example.one.MyOtherClass");
    assert!(!superclass.is_complete());
    // Required-by edges go away with the scope.
    assert_eq!(superclass.state().required_by(), None);

    let unit = EXAMPLE_ONE.report("example/one/Test2.java").unit;
    let required = EXAMPLE_ONE
        .store
        .read(|graph| graph.unit(unit).unwrap().requires(superclass.id))
        .unwrap();
    assert!(required);
}
