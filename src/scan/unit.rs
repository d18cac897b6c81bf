//! State shared by the passes over one compilation unit.

use std::sync::Arc;

use indexmap::IndexSet;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::warn;

use super::ScanError;
use super::config::ScanConfig;
use super::diagnostics::{Diagnostic, DiagnosticCollector};
use super::names::Imports;
use crate::base::QualifiedName;
use crate::graph::{
    Access, FieldId, FunctionId, GraphStore, GraphStoreExt, Modifiers, TypeBase, TypeId, TypeKind,
    TypeUse, UnitId, Visibility,
};
use crate::resolve::{ResolveError, ResolveType, TypeResolver};
use crate::syntax::{SyntaxKind, SyntaxNode, Token, TokenKind, TreeView};

/// What an anonymous class extends or implements.
#[derive(Clone, Copy)]
pub(super) enum AnonymousBase<'t> {
    /// `new Base() { ... }`
    TypeRef(&'t SyntaxNode),
    /// The body of an enum constant.
    EnclosingEnum,
}

/// A type declared by this unit.
pub(super) struct DeclaredType<'t> {
    pub(super) id: TypeId,
    pub(super) name: QualifiedName,
    /// The name used in source; `None` for anonymous classes.
    pub(super) source_name: Option<SmolStr>,
    pub(super) kind: TypeKind,
    /// The declaration, or the class body of an anonymous class.
    pub(super) node: &'t SyntaxNode,
    pub(super) body: Option<&'t SyntaxNode>,
    pub(super) parent: Option<usize>,
    pub(super) base: Option<AnonymousBase<'t>>,
    /// Member and local types by simple name.
    pub(super) members: FxHashMap<SmolStr, QualifiedName>,
    pub(super) type_params: Vec<SmolStr>,
    pub(super) anonymous_count: u32,
    pub(super) local_counts: FxHashMap<SmolStr, u32>,
    pub(super) fields: FxHashMap<SmolStr, FieldId>,
    pub(super) depends_on: IndexSet<TypeId>,
}

/// A function body or field initializer waiting for the bodies pass.
pub(super) struct PendingBody<'t> {
    pub(super) owner: usize,
    /// `None` for field initializers.
    pub(super) function: Option<FunctionId>,
    pub(super) node: &'t SyntaxNode,
    pub(super) locals: Vec<SmolStr>,
    pub(super) type_params: Vec<SmolStr>,
}

pub(super) struct UnitScan<'s, 't> {
    pub(super) resolver: &'s mut TypeResolver,
    pub(super) store: Arc<dyn GraphStore>,
    pub(super) config: &'s ScanConfig,
    pub(super) unit: UnitId,
    pub(super) path: &'s str,
    pub(super) imports: Imports,
    pub(super) types: Vec<DeclaredType<'t>>,
    /// Top-level types of this unit, duplicates included.
    pub(super) top_level: FxHashMap<SmolStr, QualifiedName>,
    pub(super) names: FxHashMap<TypeId, QualifiedName>,
    pub(super) bodies: Vec<PendingBody<'t>>,
    pub(super) accesses: Vec<Access>,
    pub(super) diagnostics: DiagnosticCollector,
}

impl<'s, 't> UnitScan<'s, 't> {
    pub(super) fn new(
        resolver: &'s mut TypeResolver,
        config: &'s ScanConfig,
        unit: UnitId,
        path: &'s str,
        imports: Imports,
        diagnostics: DiagnosticCollector,
    ) -> Self {
        let store = resolver.store().clone();
        Self {
            resolver,
            store,
            config,
            unit,
            path,
            imports,
            types: Vec::new(),
            top_level: FxHashMap::default(),
            names: FxHashMap::default(),
            bodies: Vec::new(),
            accesses: Vec::new(),
            diagnostics,
        }
    }

    /// Resolve through the active scope. A failed dependency lookup falls back
    /// to recording the name as unresolved.
    pub(super) fn resolve_name(&mut self, name: &QualifiedName, at: &Token) -> Result<TypeId, ScanError> {
        let id = match self.resolver.resolve(name, self.unit) {
            Ok(id) => id,
            Err(ResolveError::Store(err)) => {
                warn!(%name, %err, path = self.path, "type lookup failed, recording as unresolved");
                self.diagnostics.lookup_fallback(at.line, at.column, name.as_str());
                self.resolver.require(name, self.unit)?
            }
            Err(err) => return Err(err.into()),
        };
        self.names.entry(id).or_insert_with(|| name.clone());
        Ok(id)
    }

    /// Qualify and resolve a reference written as `segments`, recording it as
    /// a dependency of `owner`. Malformed names are reported and dropped.
    pub(super) fn reference(&mut self, segments: &[&Token], owner: usize) -> Result<Option<TypeId>, ScanError> {
        let Some(&first) = segments.first() else {
            return Ok(None);
        };
        let texts: Vec<&str> = segments.iter().map(|t| t.text.as_str()).collect();
        let name = match self.qualify(&texts, Some(owner)) {
            Ok(name) => name,
            Err(_) => {
                self.diagnostics.malformed_name(first.line, first.column, &texts.join("."));
                return Ok(None);
            }
        };
        let id = self.resolve_name(&name, first)?;
        self.add_dependency(owner, id);
        Ok(Some(id))
    }

    pub(super) fn add_dependency(&mut self, owner: usize, id: TypeId) {
        let ty = &mut self.types[owner];
        if ty.id != id {
            ty.depends_on.insert(id);
        }
    }

    /// Whether `name` is a type variable visible from `owner`.
    pub(super) fn is_type_variable(&self, name: &str, owner: usize, extra: &[SmolStr]) -> bool {
        if extra.iter().any(|p| p == name) {
            return true;
        }
        let mut current = Some(owner);
        while let Some(index) = current {
            let ty = &self.types[index];
            if ty.type_params.iter().any(|p| p == name) {
                return true;
            }
            current = ty.parent;
        }
        false
    }

    /// The type use a `TypeRef` denotes. Type arguments and type annotations
    /// are resolved as dependencies of `owner` only.
    pub(super) fn type_use(
        &mut self,
        type_ref: &'t SyntaxNode,
        owner: usize,
        type_params: &[SmolStr],
        extra_dims: u8,
    ) -> Result<Option<TypeUse>, ScanError> {
        let mut segments: Vec<&Token> = Vec::new();
        let mut primitive = None;
        let mut dims = extra_dims;
        for child in type_ref.children() {
            match child.kind() {
                SyntaxKind::Annotation => self.annotation(child, owner)?,
                SyntaxKind::TypeArguments => self.type_arguments(child, owner, type_params)?,
                SyntaxKind::Token => match child.token() {
                    Some(token) if token.kind == TokenKind::Ident => segments.push(token),
                    Some(token) if token.kind.is_primitive_type() => primitive = Some(token),
                    Some(token) if token.kind == TokenKind::LBracket => dims = dims.saturating_add(1),
                    _ => {}
                },
                _ => {}
            }
        }

        let base = if let Some(token) = primitive {
            TypeBase::Primitive(token.text.clone())
        } else if let [single] = segments.as_slice() {
            if self.is_type_variable(&single.text, owner, type_params) {
                TypeBase::Variable(single.text.clone())
            } else {
                match self.reference(&segments, owner)? {
                    Some(id) => TypeBase::Declared(id),
                    None => return Ok(None),
                }
            }
        } else {
            match self.reference(&segments, owner)? {
                Some(id) => TypeBase::Declared(id),
                None => return Ok(None),
            }
        };
        Ok(Some(TypeUse { base, dims }))
    }

    fn type_arguments(&mut self, node: &'t SyntaxNode, owner: usize, type_params: &[SmolStr]) -> Result<(), ScanError> {
        for child in node.children() {
            match child.kind() {
                SyntaxKind::TypeRef => {
                    self.type_use(child, owner, type_params, 0)?;
                }
                SyntaxKind::Wildcard => {
                    if let Some(bound) = child.child_of_kind(SyntaxKind::TypeRef) {
                        self.type_use(bound, owner, type_params, 0)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// An annotation use is a dependency on the annotation type.
    pub(super) fn annotation(&mut self, node: &'t SyntaxNode, owner: usize) -> Result<(), ScanError> {
        if let Some(name) = node.child_of_kind(SyntaxKind::QualifiedName) {
            let segments = ident_tokens(name);
            self.reference(&segments, owner)?;
        }
        Ok(())
    }

    /// Human-readable form of a type use: `java.util.List`, `int[]`, `T`.
    pub(super) fn display(&self, type_use: &TypeUse) -> String {
        let base = match &type_use.base {
            TypeBase::Primitive(name) | TypeBase::Variable(name) => name.to_string(),
            TypeBase::Declared(id) => self
                .names
                .get(id)
                .map_or_else(|| format!("{id:?}"), |name| name.to_string()),
        };
        let mut out = base;
        for _ in 0..type_use.dims {
            out.push_str("[]");
        }
        out
    }

    /// Write the collected dependency edges and accesses.
    pub(super) fn flush(&mut self) -> Result<(), ScanError> {
        let dependencies: Vec<(TypeId, IndexSet<TypeId>)> = self
            .types
            .iter_mut()
            .map(|ty| (ty.id, std::mem::take(&mut ty.depends_on)))
            .filter(|(_, deps)| !deps.is_empty())
            .collect();
        let accesses = std::mem::take(&mut self.accesses);
        self.store.write(|graph| -> Result<(), ScanError> {
            for (id, deps) in dependencies {
                graph.ty_mut(id)?.depends_on.extend(deps);
            }
            for access in accesses {
                graph.add_access(access)?;
            }
            Ok(())
        })??;
        Ok(())
    }

    pub(super) fn finish(self) -> Vec<Diagnostic> {
        self.diagnostics.finish()
    }
}

/// The `Ident` leaves directly below `node`.
pub(super) fn ident_tokens(node: &SyntaxNode) -> Vec<&Token> {
    node.children()
        .iter()
        .filter_map(SyntaxNode::token)
        .filter(|t| t.kind == TokenKind::Ident)
        .collect()
}

/// The declared name of a declaration node.
pub(super) fn declared_name(node: &SyntaxNode) -> Option<&Token> {
    node.child_token(TokenKind::Ident)
}

/// Modifiers written on a declaration.
pub(super) fn modifiers(node: &SyntaxNode) -> Modifiers {
    let mut out = Modifiers::default();
    let Some(list) = node.child_of_kind(SyntaxKind::Modifiers) else {
        return out;
    };
    for token in list.children().iter().filter_map(SyntaxNode::token) {
        match token.kind {
            TokenKind::Public => out.visibility = Visibility::Public,
            TokenKind::Protected => out.visibility = Visibility::Protected,
            TokenKind::Private => out.visibility = Visibility::Private,
            TokenKind::Static => out.is_static = true,
            TokenKind::Final => out.is_final = true,
            TokenKind::Abstract => out.is_abstract = true,
            TokenKind::Transient => out.is_transient = true,
            TokenKind::Volatile => out.is_volatile = true,
            TokenKind::Synchronized => out.is_synchronized = true,
            TokenKind::Native => out.is_native = true,
            _ => {}
        }
    }
    out
}

/// Annotations written on a declaration.
pub(super) fn annotations(node: &SyntaxNode) -> impl Iterator<Item = &SyntaxNode> {
    node.child_of_kind(SyntaxKind::Modifiers)
        .map(|list| list.children())
        .unwrap_or_default()
        .iter()
        .filter(|c| c.kind() == SyntaxKind::Annotation)
}

/// Count of `[` leaves directly below `node`.
pub(super) fn extra_dims(node: &SyntaxNode) -> u8 {
    let count = node
        .children()
        .iter()
        .filter(|c| c.token_kind() == Some(TokenKind::LBracket))
        .count();
    u8::try_from(count).unwrap_or(u8::MAX)
}
