//! Shared helpers for integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use javasrc::QualifiedName;
use javasrc::graph::{ArtifactId, Field, Function, GraphStore, GraphStoreExt, MemoryStore, TypeId, TypeNode};
use javasrc::resolve::{CompilationContext, ScopeStack};
use javasrc::scan::{ScanConfig, SourceScanner, UnitReport};

pub fn qn(text: &str) -> QualifiedName {
    QualifiedName::parse(text).unwrap()
}

pub fn memory_store() -> Arc<dyn GraphStore> {
    Arc::new(MemoryStore::new())
}

/// Scan `files` in order inside one scope for `artifact`.
pub fn scan_sources(store: &Arc<dyn GraphStore>, artifact: ArtifactId, files: &[(&str, &str)]) -> Vec<UnitReport> {
    scan_sources_with(store, artifact, files, ScanConfig::default())
}

pub fn scan_sources_with(
    store: &Arc<dyn GraphStore>,
    artifact: ArtifactId,
    files: &[(&str, &str)],
    config: ScanConfig,
) -> Vec<UnitReport> {
    let context = CompilationContext::new(artifact);
    let scanner = SourceScanner::new(config);
    let mut stack = ScopeStack::new(store.clone());
    let mut scope = stack.enter(Some(&context)).unwrap();
    let reports = files
        .iter()
        .map(|(path, text)| scanner.scan_source(&mut scope, Some(&context), path, text).unwrap())
        .collect();
    scope.exit().unwrap();
    reports
}

/// The type named `name` in `artifact`'s universe.
pub fn type_in(store: &Arc<dyn GraphStore>, name: &str, artifact: ArtifactId) -> TypeNode {
    store
        .read(|graph| graph.type_in(name, Some(artifact)).cloned())
        .unwrap()
        .unwrap_or_else(|| panic!("no type {name}"))
}

pub fn type_by_id(store: &Arc<dyn GraphStore>, id: TypeId) -> TypeNode {
    store.read(|graph| graph.ty(id).cloned()).unwrap().unwrap()
}

pub fn fields_of(store: &Arc<dyn GraphStore>, ty: TypeId) -> Vec<Field> {
    store
        .read(|graph| {
            graph.ty(ty).unwrap().fields.iter().map(|&f| graph.field(f).unwrap().clone()).collect()
        })
        .unwrap()
}

pub fn functions_of(store: &Arc<dyn GraphStore>, ty: TypeId) -> Vec<Function> {
    store
        .read(|graph| {
            graph
                .ty(ty)
                .unwrap()
                .functions
                .iter()
                .map(|&f| graph.function(f).unwrap().clone())
                .collect()
        })
        .unwrap()
}

/// How many type nodes carry `name`, across every universe.
pub fn nodes_named(store: &Arc<dyn GraphStore>, name: &str) -> usize {
    store.read(|graph| graph.types_named(name).len()).unwrap()
}
