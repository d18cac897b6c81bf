//! Scope-aware type resolution.
//!
//! Every reference to a fully-qualified name must land on the same Type node
//! as every other reference to that name in the same resolution universe. The
//! universe is picked by the active scope:
//!
//! 1. **Artifact-scoped** ([`ArtifactScope`]) - entered with a
//!    [`CompilationContext`]. Looks in the artifact's own types, then in its
//!    declared dependency artifacts only, then creates a placeholder that
//!    records which unit required it.
//! 2. **Global** ([`GlobalScope`]) - entered without a context. One universe
//!    for everything scanned that way.
//!
//! Scopes live on a [`ScopeStack`]; the [`ScopeGuard`] returned by
//! [`ScopeStack::enter`] derefs to the active [`TypeResolver`].

mod resolver;
mod scope;

pub use resolver::{ArtifactScope, CompilationContext, GlobalScope, ResolveError, ResolveType, TypeResolver};
pub use scope::{ScopeGuard, ScopeStack};
