//! Property tests for resolution: whatever order files arrive in, every
//! declared type ends up as exactly one complete node and references land on
//! it.
#![cfg(feature = "proptest")]

mod common;

use std::collections::BTreeSet;

use common::*;
use javasrc::graph::{GraphStoreExt, TypeBase};
use javasrc::resolve::{CompilationContext, ResolveType, ScopeStack};
use proptest::prelude::*;

/// Distinct class names clear of the implicit `java.lang` imports.
fn arb_classes() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("Q[a-z]{1,6}", 1..8).prop_map(|names: BTreeSet<String>| names.into_iter().collect())
}

fn sources(names: &[String]) -> Vec<(String, String)> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let next = &names[(i + 1) % names.len()];
            (
                format!("p/{name}.java"),
                format!("package p; class {name} {{ {next} next; Nowhere missing; }}"),
            )
        })
        .collect()
}

proptest! {
    #[test]
    fn test_scan_order_does_not_matter(
        (names, order) in arb_classes().prop_flat_map(|names| {
            let indices: Vec<usize> = (0..names.len()).collect();
            (Just(names), Just(indices).prop_shuffle())
        })
    ) {
        let files = sources(&names);
        let ordered: Vec<(&str, &str)> = order
            .iter()
            .map(|&i| (files[i].0.as_str(), files[i].1.as_str()))
            .collect();
        let store = memory_store();
        let artifact = store.create_artifact("app", &[]).unwrap();

        scan_sources(&store, artifact, &ordered);

        for (i, name) in names.iter().enumerate() {
            let qualified = format!("p.{name}");
            prop_assert_eq!(nodes_named(&store, &qualified), 1);
            let ty = type_in(&store, &qualified, artifact);
            prop_assert!(ty.is_complete());

            let next = type_in(&store, &format!("p.{}", names[(i + 1) % names.len()]), artifact);
            let fields = fields_of(&store, ty.id);
            prop_assert_eq!(&fields[0].type_use.base, &TypeBase::Declared(next.id));
        }
        prop_assert_eq!(nodes_named(&store, "p.Nowhere"), 1);
        prop_assert!(!type_in(&store, "p.Nowhere", artifact).is_complete());
    }

    #[test]
    fn test_resolving_twice_yields_the_same_node(name in "[a-z]{1,5}(\\.[a-z]{1,5}){0,2}\\.[A-Z][a-z]{0,5}") {
        let store = memory_store();
        let artifact = store.create_artifact("app", &[]).unwrap();
        let unit = store.create_unit("User.java", Some(artifact)).unwrap();
        let context = CompilationContext::new(artifact);
        let mut stack = ScopeStack::new(store.clone());
        let mut scope = stack.enter(Some(&context)).unwrap();

        let first = scope.resolve(&qn(&name), unit).unwrap();
        let second = scope.resolve(&qn(&name), unit).unwrap();
        scope.exit().unwrap();

        prop_assert_eq!(first, second);
        prop_assert_eq!(nodes_named(&store, &name), 1);
        let required = store.read(|graph| graph.unit(unit).unwrap().requires(first)).unwrap();
        prop_assert!(required);
    }
}
