//! The graph container and the store interface around it.
//!
//! [`Graph`] owns every node in per-kind arenas plus the name indexes.
//! [`GraphStore`] is the transactional boundary the resolver and scanner talk
//! to: every call is one short critical section. [`MemoryStore`] is the
//! in-process implementation, a [`Graph`] behind a `parking_lot` lock.

use std::fmt;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use thiserror::Error;

use super::ids::{ArtifactId, FieldId, FunctionId, LineId, ParameterId, TextFileId, TypeId, UnitId};
use super::model::{
    Access, Artifact, CompilationUnit, Field, Function, Line, Parameter, TextFile, TypeNode,
};
use crate::base::QualifiedName;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("unknown {kind} id {id}")]
    UnknownId { kind: &'static str, id: u32 },
    #[error("store query failed: {0}")]
    Query(String),
    #[error("store transaction did not run")]
    Unavailable,
}

// ============================================================================
// GRAPH
// ============================================================================

/// All nodes and edges.
#[derive(Default)]
pub struct Graph {
    artifacts: Vec<Artifact>,
    units: Vec<CompilationUnit>,
    types: Vec<TypeNode>,
    fields: Vec<Field>,
    functions: Vec<Function>,
    parameters: Vec<Parameter>,
    accesses: Vec<Access>,
    text_files: Vec<TextFile>,
    lines: Vec<Line>,
    /// Fully-qualified name → every node with that name, across universes.
    types_by_name: FxHashMap<SmolStr, Vec<TypeId>>,
    units_by_path: FxHashMap<(Option<ArtifactId>, SmolStr), UnitId>,
    /// Placeholder → the units listing it in `required_types`.
    requirers: FxHashMap<TypeId, Vec<UnitId>>,
}

macro_rules! arena_access {
    ($get:ident, $get_mut:ident, $field:ident, $id:ty, $node:ty, $label:literal) => {
        pub fn $get(&self, id: $id) -> Result<&$node, StoreError> {
            self.$field.get(id.index()).ok_or(StoreError::UnknownId {
                kind: $label,
                id: id.0,
            })
        }

        pub fn $get_mut(&mut self, id: $id) -> Result<&mut $node, StoreError> {
            self.$field.get_mut(id.index()).ok_or(StoreError::UnknownId {
                kind: $label,
                id: id.0,
            })
        }
    };
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    arena_access!(artifact, artifact_mut, artifacts, ArtifactId, Artifact, "artifact");
    arena_access!(unit, unit_mut, units, UnitId, CompilationUnit, "unit");
    arena_access!(ty, ty_mut, types, TypeId, TypeNode, "type");
    arena_access!(field, field_mut, fields, FieldId, Field, "field");
    arena_access!(function, function_mut, functions, FunctionId, Function, "function");
    arena_access!(parameter, parameter_mut, parameters, ParameterId, Parameter, "parameter");
    arena_access!(text_file, text_file_mut, text_files, TextFileId, TextFile, "text file");
    arena_access!(line, line_mut, lines, LineId, Line, "line");

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    pub fn add_artifact(&mut self, name: &str, dependencies: &[ArtifactId]) -> ArtifactId {
        let id = ArtifactId::new(self.artifacts.len() as u32);
        self.artifacts.push(Artifact {
            id,
            name: name.into(),
            units: Vec::new(),
            dependencies: dependencies.to_vec(),
        });
        id
    }

    /// Create a unit, or return the existing one for the same path and
    /// artifact. The unit inherits the artifact's dependencies.
    pub fn add_unit(&mut self, path: &str, artifact: Option<ArtifactId>) -> Result<UnitId, StoreError> {
        let key = (artifact, SmolStr::new(path));
        if let Some(&existing) = self.units_by_path.get(&key) {
            return Ok(existing);
        }
        let id = UnitId::new(self.units.len() as u32);
        let mut unit = CompilationUnit::new(id, key.1.clone(), artifact);
        if let Some(artifact) = artifact {
            let owner = self.artifact_mut(artifact)?;
            owner.units.push(id);
            unit.dependencies = owner.dependencies.clone();
        }
        self.units.push(unit);
        self.units_by_path.insert(key, id);
        Ok(id)
    }

    /// Create an incomplete type in `universe`.
    pub fn add_type(&mut self, name: &QualifiedName, universe: Option<ArtifactId>) -> TypeId {
        let id = TypeId::new(self.types.len() as u32);
        self.types.push(TypeNode::incomplete(id, name.clone(), universe));
        self.types_by_name.entry(name.to_smol_str()).or_default().push(id);
        id
    }

    /// Record that `unit` needs the unresolved type `ty`.
    pub fn add_requirement(&mut self, unit: UnitId, ty: TypeId) -> Result<(), StoreError> {
        self.unit_mut(unit)?.required_types.push(ty);
        self.requirers.entry(ty).or_default().push(unit);
        Ok(())
    }

    /// Drop `ty` from the required types of the units that listed it.
    pub fn release_requirement(&mut self, ty: TypeId) -> Result<(), StoreError> {
        let Some(units) = self.requirers.remove(&ty) else {
            return Ok(());
        };
        for unit in units {
            self.unit_mut(unit)?.required_types.retain(|&t| t != ty);
        }
        Ok(())
    }

    pub fn add_field(&mut self, build: impl FnOnce(FieldId) -> Field) -> Result<FieldId, StoreError> {
        let id = FieldId::new(self.fields.len() as u32);
        let field = build(id);
        self.ty_mut(field.declaring_type)?.fields.push(id);
        self.fields.push(field);
        Ok(id)
    }

    pub fn add_function(
        &mut self,
        build: impl FnOnce(FunctionId) -> Function,
    ) -> Result<FunctionId, StoreError> {
        let id = FunctionId::new(self.functions.len() as u32);
        let function = build(id);
        self.ty_mut(function.declaring_type)?.functions.push(id);
        self.functions.push(function);
        Ok(id)
    }

    pub fn add_parameter(
        &mut self,
        build: impl FnOnce(ParameterId) -> Parameter,
    ) -> Result<ParameterId, StoreError> {
        let id = ParameterId::new(self.parameters.len() as u32);
        let parameter = build(id);
        self.function_mut(parameter.function)?.parameters.push(id);
        self.parameters.push(parameter);
        Ok(id)
    }

    pub fn add_access(&mut self, access: Access) -> Result<(), StoreError> {
        self.function(access.function)?;
        self.field(access.field)?;
        self.accesses.push(access);
        Ok(())
    }

    pub fn add_text_file(&mut self, path: &str) -> TextFileId {
        let id = TextFileId::new(self.text_files.len() as u32);
        self.text_files.push(TextFile {
            id,
            path: path.into(),
            lines: Vec::new(),
        });
        id
    }

    /// Append a line to a text file, linking it from the previous line.
    pub fn add_line(&mut self, file: TextFileId, text: &str) -> Result<LineId, StoreError> {
        let id = LineId::new(self.lines.len() as u32);
        let owner = self.text_file_mut(file)?;
        let number = owner.lines.len() as u32;
        let previous = owner.lines.last().copied();
        owner.lines.push(id);
        self.lines.push(Line {
            id,
            file,
            number,
            text: text.into(),
            next: None,
        });
        if let Some(previous) = previous {
            self.line_mut(previous)?.next = Some(id);
        }
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Every type node with this name, in creation order.
    pub fn types_named(&self, name: &str) -> &[TypeId] {
        self.types_by_name
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The type with this name in the global universe.
    pub fn find_type(&self, name: &QualifiedName) -> Option<TypeId> {
        self.types_named(name.as_str())
            .iter()
            .copied()
            .find(|&id| self.types[id.index()].universe.is_none())
    }

    /// A complete type with this name contained in one of `artifacts`,
    /// searched in the given order.
    pub fn find_contained_type(&self, name: &QualifiedName, artifacts: &[ArtifactId]) -> Option<TypeId> {
        let candidates = self.types_named(name.as_str());
        artifacts.iter().find_map(|&artifact| {
            candidates.iter().copied().find(|&id| {
                let ty = &self.types[id.index()];
                ty.is_complete() && ty.artifact == Some(artifact)
            })
        })
    }

    pub fn find_unit(&self, path: &str, artifact: Option<ArtifactId>) -> Option<UnitId> {
        self.units_by_path
            .get(&(artifact, SmolStr::new(path)))
            .copied()
    }

    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    pub fn units(&self) -> &[CompilationUnit] {
        &self.units
    }

    pub fn types(&self) -> &[TypeNode] {
        &self.types
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn accesses(&self) -> &[Access] {
        &self.accesses
    }

    pub fn text_files(&self) -> &[TextFile] {
        &self.text_files
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("artifacts", &self.artifacts.len())
            .field("units", &self.units.len())
            .field("types", &self.types.len())
            .field("fields", &self.fields.len())
            .field("functions", &self.functions.len())
            .field("accesses", &self.accesses.len())
            .field("lines", &self.lines.len())
            .finish()
    }
}

// ============================================================================
// STORE
// ============================================================================

/// The persistent graph store. Each call is one transaction.
pub trait GraphStore: Send + Sync {
    fn create_artifact(&self, name: &str, dependencies: &[ArtifactId]) -> Result<ArtifactId, StoreError>;

    /// Create a compilation unit, or return the existing one for this path.
    fn create_unit(&self, path: &str, artifact: Option<ArtifactId>) -> Result<UnitId, StoreError>;

    /// Create an incomplete type in the given universe.
    fn create_type(&self, name: &QualifiedName, universe: Option<ArtifactId>) -> Result<TypeId, StoreError>;

    /// Look a name up in the global universe.
    fn find_type(&self, name: &QualifiedName) -> Result<Option<TypeId>, StoreError>;

    fn find_unit(&self, path: &str, artifact: Option<ArtifactId>) -> Result<Option<UnitId>, StoreError>;

    /// Look a name up among the complete types contained in `artifacts`.
    fn find_contained_type(
        &self,
        name: &QualifiedName,
        artifacts: &[ArtifactId],
    ) -> Result<Option<TypeId>, StoreError>;

    /// Run `f` with shared access to the graph.
    fn with_graph(&self, f: &mut dyn FnMut(&Graph)) -> Result<(), StoreError>;

    /// Run `f` with exclusive access to the graph.
    fn with_graph_mut(&self, f: &mut dyn FnMut(&mut Graph)) -> Result<(), StoreError>;
}

/// Typed transactions over any [`GraphStore`].
pub trait GraphStoreExt: GraphStore {
    fn read<R>(&self, f: impl FnOnce(&Graph) -> R) -> Result<R, StoreError> {
        let mut f = Some(f);
        let mut out = None;
        self.with_graph(&mut |graph| {
            if let Some(f) = f.take() {
                out = Some(f(graph));
            }
        })?;
        out.ok_or(StoreError::Unavailable)
    }

    fn write<R>(&self, f: impl FnOnce(&mut Graph) -> R) -> Result<R, StoreError> {
        let mut f = Some(f);
        let mut out = None;
        self.with_graph_mut(&mut |graph| {
            if let Some(f) = f.take() {
                out = Some(f(graph));
            }
        })?;
        out.ok_or(StoreError::Unavailable)
    }
}

impl<S: GraphStore + ?Sized> GraphStoreExt for S {}

/// An in-memory [`GraphStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    graph: RwLock<Graph>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the graph out of the store.
    pub fn into_graph(self) -> Graph {
        self.graph.into_inner()
    }
}

impl GraphStore for MemoryStore {
    fn create_artifact(&self, name: &str, dependencies: &[ArtifactId]) -> Result<ArtifactId, StoreError> {
        let mut graph = self.graph.write();
        for &dep in dependencies {
            graph.artifact(dep)?;
        }
        Ok(graph.add_artifact(name, dependencies))
    }

    fn create_unit(&self, path: &str, artifact: Option<ArtifactId>) -> Result<UnitId, StoreError> {
        self.graph.write().add_unit(path, artifact)
    }

    fn create_type(&self, name: &QualifiedName, universe: Option<ArtifactId>) -> Result<TypeId, StoreError> {
        Ok(self.graph.write().add_type(name, universe))
    }

    fn find_type(&self, name: &QualifiedName) -> Result<Option<TypeId>, StoreError> {
        Ok(self.graph.read().find_type(name))
    }

    fn find_unit(&self, path: &str, artifact: Option<ArtifactId>) -> Result<Option<UnitId>, StoreError> {
        Ok(self.graph.read().find_unit(path, artifact))
    }

    fn find_contained_type(
        &self,
        name: &QualifiedName,
        artifacts: &[ArtifactId],
    ) -> Result<Option<TypeId>, StoreError> {
        Ok(self.graph.read().find_contained_type(name, artifacts))
    }

    fn with_graph(&self, f: &mut dyn FnMut(&Graph)) -> Result<(), StoreError> {
        f(&self.graph.read());
        Ok(())
    }

    fn with_graph_mut(&self, f: &mut dyn FnMut(&mut Graph)) -> Result<(), StoreError> {
        f(&mut self.graph.write());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(text: &str) -> QualifiedName {
        QualifiedName::parse(text).unwrap()
    }

    #[test]
    fn test_unit_creation_is_idempotent_per_artifact() {
        let store = MemoryStore::new();
        let dep = store.create_artifact("dep", &[]).unwrap();
        let app = store.create_artifact("app", &[dep]).unwrap();

        let a = store.create_unit("src/A.java", Some(app)).unwrap();
        let again = store.create_unit("src/A.java", Some(app)).unwrap();
        let other = store.create_unit("src/A.java", None).unwrap();

        assert_eq!(a, again);
        assert_ne!(a, other);
        let deps = store.read(|g| g.unit(a).map(|u| u.dependencies.clone())).unwrap().unwrap();
        assert_eq!(deps, vec![dep]);
    }

    #[test]
    fn test_find_type_only_sees_global_universe() {
        let store = MemoryStore::new();
        let app = store.create_artifact("app", &[]).unwrap();
        store.create_type(&name("p.A"), Some(app)).unwrap();
        assert_eq!(store.find_type(&name("p.A")).unwrap(), None);

        let global = store.create_type(&name("p.A"), None).unwrap();
        assert_eq!(store.find_type(&name("p.A")).unwrap(), Some(global));
    }

    #[test]
    fn test_find_contained_type_requires_complete_type_in_set() {
        let store = MemoryStore::new();
        let lib = store.create_artifact("lib", &[]).unwrap();
        let other = store.create_artifact("other", &[]).unwrap();
        let unit = store.create_unit("Lib.java", Some(lib)).unwrap();
        let ty = store.create_type(&name("lib.Lib"), Some(lib)).unwrap();

        assert_eq!(store.find_contained_type(&name("lib.Lib"), &[lib]).unwrap(), None);

        store
            .write(|g| g.ty_mut(ty).map(|t| t.complete(unit, Some(lib))))
            .unwrap()
            .unwrap()
            .unwrap();

        assert_eq!(store.find_contained_type(&name("lib.Lib"), &[lib]).unwrap(), Some(ty));
        assert_eq!(store.find_contained_type(&name("lib.Lib"), &[other]).unwrap(), None);
        assert_eq!(store.find_contained_type(&name("lib.Lib"), &[]).unwrap(), None);
    }

    #[test]
    fn test_release_requirement_touches_only_requirers() {
        let mut graph = Graph::new();
        let app = graph.add_artifact("app", &[]);
        let first = graph.add_unit("A.java", Some(app)).unwrap();
        let second = graph.add_unit("B.java", Some(app)).unwrap();
        let bystander = graph.add_unit("C.java", Some(app)).unwrap();
        let shared = graph.add_type(&name("p.Shared"), Some(app));
        let other = graph.add_type(&name("p.Other"), Some(app));
        graph.add_requirement(first, shared).unwrap();
        graph.add_requirement(second, shared).unwrap();
        graph.add_requirement(second, other).unwrap();

        graph.release_requirement(shared).unwrap();

        assert!(graph.unit(first).unwrap().required_types.is_empty());
        assert_eq!(graph.unit(second).unwrap().required_types, vec![other]);
        assert!(graph.unit(bystander).unwrap().required_types.is_empty());
        // Releasing twice is a no-op.
        graph.release_requirement(shared).unwrap();
        assert_eq!(graph.unit(second).unwrap().required_types, vec![other]);
    }

    #[test]
    fn test_lines_are_linked_in_order() {
        let mut graph = Graph::new();
        let file = graph.add_text_file("notes.txt");
        let first = graph.add_line(file, "one").unwrap();
        let second = graph.add_line(file, "two").unwrap();

        assert_eq!(graph.line(first).unwrap().next, Some(second));
        assert_eq!(graph.line(second).unwrap().number, 1);
        assert_eq!(graph.text_file(file).unwrap().lines, vec![first, second]);
    }

    #[test]
    fn test_unknown_ids_are_errors() {
        let graph = Graph::new();

        assert_eq!(
            graph.ty(TypeId::new(5)).err(),
            Some(StoreError::UnknownId { kind: "type", id: 5 })
        );
    }
}
