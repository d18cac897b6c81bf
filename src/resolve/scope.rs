//! The stack of active resolution scopes.
//!
//! Scanning always happens inside a scope. [`ScopeStack::enter`] picks the
//! resolver for the compilation context, pushes it and hands back a
//! [`ScopeGuard`]; dropping the guard (or calling [`ScopeGuard::exit`]) tears
//! the scope down and makes the enclosing resolver active again. Nested guards
//! borrow their parent, so scopes can only ever close in reverse order.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use tracing::{debug, warn};

use super::resolver::{CompilationContext, ResolveError, TypeResolver};
use crate::graph::GraphStore;

pub struct ScopeStack {
    store: Arc<dyn GraphStore>,
    scopes: Vec<TypeResolver>,
}

impl ScopeStack {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self {
            store,
            scopes: Vec::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn GraphStore> {
        &self.store
    }

    /// Activate a resolver for `context`: artifact-scoped when given, global
    /// otherwise.
    pub fn enter(&mut self, context: Option<&CompilationContext>) -> Result<ScopeGuard<'_>, ResolveError> {
        let resolver = TypeResolver::for_context(self.store.clone(), context)?;
        self.scopes.push(resolver);
        let depth = self.scopes.len();
        debug!(depth, artifact = ?context.map(|c| c.artifact), "scope pushed");
        Ok(ScopeGuard {
            stack: self,
            depth,
            closed: false,
        })
    }

    /// The innermost active resolver.
    pub fn active(&self) -> Option<&TypeResolver> {
        self.scopes.last()
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    fn pop(&mut self, depth: usize) -> Result<(), ResolveError> {
        // Guards borrow the stack, so the innermost guard is always the one
        // closing.
        debug_assert_eq!(self.scopes.len(), depth);
        let Some(mut resolver) = self.scopes.pop() else {
            return Ok(());
        };
        debug!(depth, "scope popped");
        resolver.teardown()
    }
}

impl std::fmt::Debug for ScopeStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeStack")
            .field("scopes", &self.scopes)
            .finish_non_exhaustive()
    }
}

/// An active scope. Derefs to its [`TypeResolver`].
pub struct ScopeGuard<'s> {
    stack: &'s mut ScopeStack,
    depth: usize,
    closed: bool,
}

impl ScopeGuard<'_> {
    /// Enter a nested scope; this one becomes active again when it closes.
    pub fn enter(&mut self, context: Option<&CompilationContext>) -> Result<ScopeGuard<'_>, ResolveError> {
        self.stack.enter(context)
    }

    /// 1-based position on the stack.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Close the scope, reporting teardown failures.
    pub fn exit(mut self) -> Result<(), ResolveError> {
        self.close()
    }

    fn close(&mut self) -> Result<(), ResolveError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.stack.pop(self.depth)
    }
}

impl Deref for ScopeGuard<'_> {
    type Target = TypeResolver;

    fn deref(&self) -> &TypeResolver {
        &self.stack.scopes[self.depth - 1]
    }
}

impl DerefMut for ScopeGuard<'_> {
    fn deref_mut(&mut self) -> &mut TypeResolver {
        &mut self.stack.scopes[self.depth - 1]
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!(depth = self.depth, %err, "scope teardown failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::QualifiedName;
    use crate::graph::{GraphStoreExt, MemoryStore, TypeState};
    use crate::resolve::ResolveType;

    fn name(text: &str) -> QualifiedName {
        QualifiedName::parse(text).unwrap()
    }

    #[test]
    fn test_enter_selects_strategy() {
        let store: Arc<dyn GraphStore> = Arc::new(MemoryStore::new());
        let app = store.create_artifact("app", &[]).unwrap();
        let mut stack = ScopeStack::new(store);

        {
            let scope = stack.enter(Some(&CompilationContext::new(app))).unwrap();
            assert_eq!(scope.artifact(), Some(app));
        }
        let scope = stack.enter(None).unwrap();
        assert!(scope.is_global());
    }

    #[test]
    fn test_nested_scopes_restore_outer() {
        let store: Arc<dyn GraphStore> = Arc::new(MemoryStore::new());
        let app = store.create_artifact("app", &[]).unwrap();
        let mut stack = ScopeStack::new(store);

        {
            let mut outer = stack.enter(None).unwrap();
            {
                let inner = outer.enter(Some(&CompilationContext::new(app))).unwrap();
                assert_eq!(inner.depth(), 2);
                assert_eq!(inner.artifact(), Some(app));
            }
            assert_eq!(outer.depth(), 1);
            assert!(outer.is_global());
        }

        assert_eq!(stack.depth(), 0);
        assert!(stack.active().is_none());
    }

    #[test]
    fn test_exit_clears_required_by() {
        let store: Arc<dyn GraphStore> = Arc::new(MemoryStore::new());
        let app = store.create_artifact("app", &[]).unwrap();
        let unit = store.create_unit("A.java", Some(app)).unwrap();
        let mut stack = ScopeStack::new(store.clone());

        let mut scope = stack.enter(Some(&CompilationContext::new(app))).unwrap();
        let placeholder = scope.resolve(&name("p.Missing"), unit).unwrap();
        let during = store.read(|g| g.ty(placeholder).map(|t| t.state())).unwrap().unwrap();
        assert_eq!(during, TypeState::Incomplete { required_by: Some(unit) });

        scope.exit().unwrap();

        let after = store.read(|g| g.ty(placeholder).map(|t| t.state())).unwrap().unwrap();
        assert_eq!(after, TypeState::Incomplete { required_by: None });
        assert!(store.read(|g| g.unit(unit).unwrap().requires(placeholder)).unwrap());
        assert_eq!(stack.depth(), 0);
    }
}
