//! Type resolution strategies.
//!
//! A resolver turns a fully-qualified name into the one Type node that name
//! denotes in the active resolution universe, creating an incomplete
//! placeholder when nothing declares it yet.
//!
//! - [`ArtifactScope`] resolves inside one artifact: its own units first, then
//!   exactly the artifact's declared dependencies, then a placeholder owned by
//!   the artifact.
//! - [`GlobalScope`] resolves against the global universe and keeps no
//!   required-by bookkeeping.
//!
//! Both sit behind [`ResolveType`]; [`TypeResolver`] is the tagged union the
//! scope stack hands out.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{debug, trace};

use crate::base::{NameError, QualifiedName};
use crate::graph::{ArtifactId, Graph, GraphStore, GraphStoreExt, ModelError, StoreError, TypeId, UnitId};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error(transparent)]
    Name(#[from] NameError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("type `{name}` is already declared by {existing:?}")]
    DuplicateDeclaration { name: QualifiedName, existing: UnitId },
}

/// The artifact a scope is entered for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CompilationContext {
    pub artifact: ArtifactId,
}

impl CompilationContext {
    pub fn new(artifact: ArtifactId) -> Self {
        Self { artifact }
    }
}

/// Name to node resolution inside one scope.
pub trait ResolveType {
    /// The node `name` denotes, creating a placeholder on a miss. Resolving
    /// the same name twice returns the same id.
    fn resolve(&mut self, name: &QualifiedName, unit: UnitId) -> Result<TypeId, ResolveError>;

    /// Record that `unit` declares `name` and return the now complete node.
    fn declare(&mut self, name: &QualifiedName, unit: UnitId) -> Result<TypeId, ResolveError>;

    /// Resolve without consulting dependency artifacts. Used as the fallback
    /// when a dependency lookup fails.
    fn require(&mut self, name: &QualifiedName, unit: UnitId) -> Result<TypeId, ResolveError>;
}

// ============================================================================
// ARTIFACT SCOPE
// ============================================================================

/// Resolution inside one artifact.
pub struct ArtifactScope {
    store: Arc<dyn GraphStore>,
    artifact: ArtifactId,
    dependencies: Vec<ArtifactId>,
    /// Types of this artifact's universe, keyed by name.
    local: FxHashMap<QualifiedName, TypeId>,
    /// Hits found in dependency artifacts.
    from_dependencies: FxHashMap<QualifiedName, TypeId>,
    /// Placeholders created by this scope, cleared on teardown.
    created: Vec<TypeId>,
}

impl ArtifactScope {
    /// Enter `context`, seeding the local map with every type declared or
    /// required by the artifact's units.
    pub fn new(store: Arc<dyn GraphStore>, context: &CompilationContext) -> Result<Self, ResolveError> {
        let artifact = context.artifact;
        let (dependencies, local) = store.read(|graph| seed(graph, artifact))??;
        debug!(
            ?artifact,
            dependencies = dependencies.len(),
            seeded = local.len(),
            "entered artifact scope"
        );
        Ok(Self {
            store,
            artifact,
            dependencies,
            local,
            from_dependencies: FxHashMap::default(),
            created: Vec::new(),
        })
    }

    pub fn artifact(&self) -> ArtifactId {
        self.artifact
    }

    pub fn dependencies(&self) -> &[ArtifactId] {
        &self.dependencies
    }

    /// Placeholders this scope created, in creation order.
    pub fn created(&self) -> &[TypeId] {
        &self.created
    }

    fn cached(&self, name: &QualifiedName) -> Option<TypeId> {
        self.local
            .get(name)
            .or_else(|| self.from_dependencies.get(name))
            .copied()
    }

    /// Clear the required-by edges of the placeholders this scope created.
    /// The placeholders stay in their units' required types, so a later scope
    /// over the artifact seeds them and reuses the same nodes.
    pub fn teardown(&mut self) -> Result<(), ResolveError> {
        let created = std::mem::take(&mut self.created);
        debug!(artifact = ?self.artifact, placeholders = created.len(), "leaving artifact scope");
        if created.is_empty() {
            return Ok(());
        }
        self.store.write(|graph| {
            created.iter().try_for_each(|&id| {
                graph.ty_mut(id).map(|ty| ty.set_required_by(None))
            })
        })??;
        Ok(())
    }
}

fn seed(
    graph: &Graph,
    artifact: ArtifactId,
) -> Result<(Vec<ArtifactId>, FxHashMap<QualifiedName, TypeId>), StoreError> {
    let owner = graph.artifact(artifact)?;
    let mut local = FxHashMap::default();
    for &unit in &owner.units {
        let unit = graph.unit(unit)?;
        for &id in unit.declared_types.iter().chain(&unit.required_types) {
            let ty = graph.ty(id)?;
            local.entry(ty.name.clone()).or_insert(id);
        }
    }
    Ok((owner.dependencies.clone(), local))
}

impl ResolveType for ArtifactScope {
    fn resolve(&mut self, name: &QualifiedName, unit: UnitId) -> Result<TypeId, ResolveError> {
        if let Some(id) = self.cached(name) {
            trace!(%name, ?id, "resolved from scope");
            return Ok(id);
        }

        if !self.dependencies.is_empty() {
            if let Some(id) = self.store.find_contained_type(name, &self.dependencies)? {
                trace!(%name, ?id, "resolved from dependencies");
                self.from_dependencies.insert(name.clone(), id);
                return Ok(id);
            }
        }

        self.require(name, unit)
    }

    fn declare(&mut self, name: &QualifiedName, unit: UnitId) -> Result<TypeId, ResolveError> {
        let artifact = self.artifact;
        let existing = self.local.get(name).copied();
        let id = self.store.write(|graph| match existing {
            Some(id) => complete_in_place(graph, id, unit, Some(artifact)).map(|()| id),
            None => {
                let id = graph.add_type(name, Some(artifact));
                complete_in_place(graph, id, unit, Some(artifact)).map(|()| id)
            }
        })??;
        debug!(%name, ?id, ?unit, "declared type");
        self.local.insert(name.clone(), id);
        Ok(id)
    }

    fn require(&mut self, name: &QualifiedName, unit: UnitId) -> Result<TypeId, ResolveError> {
        if let Some(&id) = self.local.get(name) {
            return Ok(id);
        }
        let artifact = self.artifact;
        let (id, fresh) = self.store.write(|graph| -> Result<(TypeId, bool), StoreError> {
            // Another scope over the same artifact may have created it since
            // this one was seeded.
            if let Some(ty) = graph.type_in(name.as_str(), Some(artifact)) {
                return Ok((ty.id, false));
            }
            let id = graph.add_type(name, Some(artifact));
            graph.add_requirement(unit, id)?;
            graph.ty_mut(id)?.set_required_by(Some(unit));
            Ok((id, true))
        })??;
        if fresh {
            trace!(%name, ?id, ?unit, "created placeholder");
            self.created.push(id);
        }
        self.local.insert(name.clone(), id);
        Ok(id)
    }
}

impl fmt::Debug for ArtifactScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactScope")
            .field("artifact", &self.artifact)
            .field("dependencies", &self.dependencies)
            .field("local", &self.local.len())
            .field("created", &self.created.len())
            .finish()
    }
}

// ============================================================================
// GLOBAL SCOPE
// ============================================================================

/// Resolution against the global universe.
pub struct GlobalScope {
    store: Arc<dyn GraphStore>,
}

impl GlobalScope {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        debug!("entered global scope");
        Self { store }
    }
}

impl ResolveType for GlobalScope {
    fn resolve(&mut self, name: &QualifiedName, _unit: UnitId) -> Result<TypeId, ResolveError> {
        if let Some(id) = self.store.find_type(name)? {
            trace!(%name, ?id, "resolved globally");
            return Ok(id);
        }
        let id = self
            .store
            .write(|graph| graph.find_type(name).unwrap_or_else(|| graph.add_type(name, None)))?;
        trace!(%name, ?id, "created global placeholder");
        Ok(id)
    }

    fn declare(&mut self, name: &QualifiedName, unit: UnitId) -> Result<TypeId, ResolveError> {
        let id = self.store.write(|graph| -> Result<TypeId, ResolveError> {
            let artifact = graph.unit(unit)?.artifact;
            let id = graph.find_type(name).unwrap_or_else(|| graph.add_type(name, None));
            complete_in_place(graph, id, unit, artifact)?;
            Ok(id)
        })??;
        debug!(%name, ?id, ?unit, "declared global type");
        Ok(id)
    }

    fn require(&mut self, name: &QualifiedName, unit: UnitId) -> Result<TypeId, ResolveError> {
        self.resolve(name, unit)
    }
}

impl fmt::Debug for GlobalScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobalScope").finish_non_exhaustive()
    }
}

/// Complete `id` as declared by `unit`. A placeholder leaves the required
/// types of every unit that listed it; a complete node is a duplicate.
fn complete_in_place(
    graph: &mut Graph,
    id: TypeId,
    unit: UnitId,
    artifact: Option<ArtifactId>,
) -> Result<(), ResolveError> {
    let ty = graph.ty(id)?;
    if let Some(existing) = ty.state().declared_by() {
        return Err(ResolveError::DuplicateDeclaration {
            name: ty.name.clone(),
            existing,
        });
    }
    graph.ty_mut(id)?.complete(unit, artifact)?;
    graph.release_requirement(id)?;
    graph.unit_mut(unit)?.declared_types.push(id);
    Ok(())
}

// ============================================================================
// TYPE RESOLVER
// ============================================================================

/// The resolver of one scope.
#[derive(Debug)]
pub enum TypeResolver {
    ArtifactScoped(ArtifactScope),
    Global(GlobalScope),
}

impl TypeResolver {
    /// Artifact-scoped when a context is given, global otherwise.
    pub fn for_context(
        store: Arc<dyn GraphStore>,
        context: Option<&CompilationContext>,
    ) -> Result<Self, ResolveError> {
        Ok(match context {
            Some(context) => TypeResolver::ArtifactScoped(ArtifactScope::new(store, context)?),
            None => TypeResolver::Global(GlobalScope::new(store)),
        })
    }

    pub fn store(&self) -> &Arc<dyn GraphStore> {
        match self {
            TypeResolver::ArtifactScoped(scope) => &scope.store,
            TypeResolver::Global(scope) => &scope.store,
        }
    }

    /// The artifact this resolver is scoped to, if any.
    pub fn artifact(&self) -> Option<ArtifactId> {
        match self {
            TypeResolver::ArtifactScoped(scope) => Some(scope.artifact),
            TypeResolver::Global(_) => None,
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self, TypeResolver::Global(_))
    }

    pub(crate) fn teardown(&mut self) -> Result<(), ResolveError> {
        match self {
            TypeResolver::ArtifactScoped(scope) => scope.teardown(),
            TypeResolver::Global(_) => {
                debug!("leaving global scope");
                Ok(())
            }
        }
    }
}

impl ResolveType for TypeResolver {
    fn resolve(&mut self, name: &QualifiedName, unit: UnitId) -> Result<TypeId, ResolveError> {
        match self {
            TypeResolver::ArtifactScoped(scope) => scope.resolve(name, unit),
            TypeResolver::Global(scope) => scope.resolve(name, unit),
        }
    }

    fn declare(&mut self, name: &QualifiedName, unit: UnitId) -> Result<TypeId, ResolveError> {
        match self {
            TypeResolver::ArtifactScoped(scope) => scope.declare(name, unit),
            TypeResolver::Global(scope) => scope.declare(name, unit),
        }
    }

    fn require(&mut self, name: &QualifiedName, unit: UnitId) -> Result<TypeId, ResolveError> {
        match self {
            TypeResolver::ArtifactScoped(scope) => scope.require(name, unit),
            TypeResolver::Global(scope) => scope.require(name, unit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{MemoryStore, TypeState};

    fn name(text: &str) -> QualifiedName {
        QualifiedName::parse(text).unwrap()
    }

    fn store() -> Arc<dyn GraphStore> {
        Arc::new(MemoryStore::new())
    }

    fn state(store: &Arc<dyn GraphStore>, id: TypeId) -> TypeState {
        store.read(|g| g.ty(id).map(|t| t.state())).unwrap().unwrap()
    }

    #[test]
    fn test_resolve_twice_returns_same_placeholder() {
        let store = store();
        let app = store.create_artifact("app", &[]).unwrap();
        let unit = store.create_unit("A.java", Some(app)).unwrap();
        let mut scope = ArtifactScope::new(store.clone(), &CompilationContext::new(app)).unwrap();

        let first = scope.resolve(&name("p.Missing"), unit).unwrap();
        let second = scope.resolve(&name("p.Missing"), unit).unwrap();

        assert_eq!(first, second);
        assert_eq!(state(&store, first), TypeState::Incomplete { required_by: Some(unit) });
        assert!(store.read(|g| g.unit(unit).unwrap().requires(first)).unwrap());
        assert_eq!(scope.created(), &[first]);
    }

    #[test]
    fn test_declare_completes_placeholder_in_place() {
        let store = store();
        let app = store.create_artifact("app", &[]).unwrap();
        let a = store.create_unit("A.java", Some(app)).unwrap();
        let b = store.create_unit("B.java", Some(app)).unwrap();
        let mut scope = ArtifactScope::new(store.clone(), &CompilationContext::new(app)).unwrap();

        let placeholder = scope.resolve(&name("p.B"), a).unwrap();
        let declared = scope.declare(&name("p.B"), b).unwrap();

        assert_eq!(placeholder, declared);
        assert_eq!(state(&store, declared), TypeState::Complete { declared_by: b });
        assert!(!store.read(|g| g.unit(a).unwrap().requires(declared)).unwrap());
        assert_eq!(
            store.read(|g| g.unit(b).unwrap().declared_types.clone()).unwrap(),
            vec![declared]
        );
    }

    #[test]
    fn test_second_declaration_is_duplicate() {
        let store = store();
        let app = store.create_artifact("app", &[]).unwrap();
        let a = store.create_unit("A.java", Some(app)).unwrap();
        let b = store.create_unit("B.java", Some(app)).unwrap();
        let mut scope = ArtifactScope::new(store.clone(), &CompilationContext::new(app)).unwrap();

        let id = scope.declare(&name("p.A"), a).unwrap();
        let err = scope.declare(&name("p.A"), b).unwrap_err();

        assert_eq!(
            err,
            ResolveError::DuplicateDeclaration {
                name: name("p.A"),
                existing: a
            }
        );
        assert_eq!(state(&store, id).declared_by(), Some(a));
    }

    #[test]
    fn test_dependency_hit_is_cached_and_bounded() {
        let store = store();
        let lib = store.create_artifact("lib", &[]).unwrap();
        let other = store.create_artifact("other", &[]).unwrap();
        let app = store.create_artifact("app", &[lib]).unwrap();

        let lib_unit = store.create_unit("Lib.java", Some(lib)).unwrap();
        let other_unit = store.create_unit("Hidden.java", Some(other)).unwrap();
        let lib_type = ArtifactScope::new(store.clone(), &CompilationContext::new(lib))
            .unwrap()
            .declare(&name("lib.Lib"), lib_unit)
            .unwrap();
        let hidden = ArtifactScope::new(store.clone(), &CompilationContext::new(other))
            .unwrap()
            .declare(&name("other.Hidden"), other_unit)
            .unwrap();

        let unit = store.create_unit("App.java", Some(app)).unwrap();
        let mut scope = ArtifactScope::new(store.clone(), &CompilationContext::new(app)).unwrap();

        assert_eq!(scope.resolve(&name("lib.Lib"), unit).unwrap(), lib_type);
        assert_eq!(scope.resolve(&name("lib.Lib"), unit).unwrap(), lib_type);
        let placeholder = scope.resolve(&name("other.Hidden"), unit).unwrap();
        assert_ne!(placeholder, hidden);
        assert!(!state(&store, placeholder).is_complete());
    }

    #[test]
    fn test_local_declaration_shadows_dependency() {
        let store = store();
        let lib = store.create_artifact("lib", &[]).unwrap();
        let lib_unit = store.create_unit("Lib.java", Some(lib)).unwrap();
        let lib_type = ArtifactScope::new(store.clone(), &CompilationContext::new(lib))
            .unwrap()
            .declare(&name("x.Shared"), lib_unit)
            .unwrap();

        let app = store.create_artifact("app", &[lib]).unwrap();
        let unit = store.create_unit("Shared.java", Some(app)).unwrap();
        let mut scope = ArtifactScope::new(store.clone(), &CompilationContext::new(app)).unwrap();
        assert_eq!(scope.resolve(&name("x.Shared"), unit).unwrap(), lib_type);

        let own = scope.declare(&name("x.Shared"), unit).unwrap();

        assert_ne!(own, lib_type);
        assert_eq!(scope.resolve(&name("x.Shared"), unit).unwrap(), own);
    }

    #[test]
    fn test_new_scope_reuses_seeded_placeholder() {
        let store = store();
        let app = store.create_artifact("app", &[]).unwrap();
        let a = store.create_unit("A.java", Some(app)).unwrap();
        let context = CompilationContext::new(app);

        let mut first = ArtifactScope::new(store.clone(), &context).unwrap();
        let placeholder = first.resolve(&name("p.B"), a).unwrap();
        first.teardown().unwrap();
        assert_eq!(state(&store, placeholder), TypeState::Incomplete { required_by: None });

        let mut second = ArtifactScope::new(store.clone(), &context).unwrap();
        let b = store.create_unit("B.java", Some(app)).unwrap();

        assert_eq!(second.declare(&name("p.B"), b).unwrap(), placeholder);
        assert!(!store.read(|g| g.unit(a).unwrap().requires(placeholder)).unwrap());
    }

    #[test]
    fn test_global_scope_uses_global_universe() {
        let store = store();
        let unit = store.create_unit("A.java", None).unwrap();
        let mut scope = GlobalScope::new(store.clone());

        let placeholder = scope.resolve(&name("p.A"), unit).unwrap();
        assert_eq!(state(&store, placeholder), TypeState::Incomplete { required_by: None });
        assert_eq!(scope.resolve(&name("p.A"), unit).unwrap(), placeholder);

        assert_eq!(scope.declare(&name("p.A"), unit).unwrap(), placeholder);
        assert!(matches!(
            scope.declare(&name("p.A"), unit),
            Err(ResolveError::DuplicateDeclaration { .. })
        ));
    }

    #[test]
    fn test_resolver_dispatch() {
        let store = store();
        let app = store.create_artifact("app", &[]).unwrap();

        let scoped = TypeResolver::for_context(store.clone(), Some(&CompilationContext::new(app))).unwrap();
        let global = TypeResolver::for_context(store, None).unwrap();

        assert_eq!(scoped.artifact(), Some(app));
        assert!(global.is_global());
        assert_eq!(global.artifact(), None);
    }
}
