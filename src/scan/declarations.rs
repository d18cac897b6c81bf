//! First pass: declare every type of the unit.
//!
//! Types are declared before any reference is resolved, so a use of a type
//! declared further down the same file lands on the declared node rather than
//! on a placeholder. Nested types get binary names: `Outer$Inner` for member
//! types, `Outer$1` for anonymous classes and `Outer$1Local` for local ones,
//! numbered per enclosing type in source order.

use indexmap::IndexSet;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::warn;

use super::ScanError;
use super::unit::{AnonymousBase, DeclaredType, UnitScan, declared_name, modifiers};
use crate::base::{LineSpan, QualifiedName};
use crate::graph::{GraphStoreExt, Modifiers, StoreError, TypeKind, Visibility};
use crate::resolve::{ResolveError, ResolveType};
use crate::syntax::{SyntaxKind, SyntaxNode, TreeView};

/// How a type came to be declared.
enum Origin<'t> {
    TopLevel,
    Member,
    Local(SmolStr),
    Anonymous { index: u32, base: AnonymousBase<'t> },
}

fn type_kind(kind: SyntaxKind) -> TypeKind {
    match kind {
        SyntaxKind::InterfaceDecl => TypeKind::Interface,
        SyntaxKind::EnumDecl => TypeKind::Enum,
        SyntaxKind::AnnotationDecl => TypeKind::Annotation,
        _ => TypeKind::Class,
    }
}

impl<'t> UnitScan<'_, 't> {
    pub(super) fn declare_types(&mut self, root: &'t SyntaxNode) -> Result<(), ScanError> {
        for node in root.children() {
            if !node.kind().is_type_declaration() {
                continue;
            }
            let Some(simple) = declared_name(node) else {
                continue;
            };
            let name = match QualifiedName::in_package(self.imports.package(), &simple.text) {
                Ok(name) => name,
                Err(_) => {
                    self.diagnostics.malformed_name(simple.line, simple.column, &simple.text);
                    continue;
                }
            };
            self.top_level.insert(simple.text.clone(), name.clone());
            self.declare_type(node, name, None, Origin::TopLevel)?;
        }
        Ok(())
    }

    /// Declare one type and everything nested in it. Returns `None` when the
    /// name is already declared; the subtree is then skipped.
    fn declare_type(
        &mut self,
        node: &'t SyntaxNode,
        name: QualifiedName,
        parent: Option<usize>,
        origin: Origin<'t>,
    ) -> Result<Option<usize>, ScanError> {
        let id = match self.resolver.declare(&name, self.unit) {
            Ok(id) => id,
            Err(ResolveError::DuplicateDeclaration { name, existing }) => {
                warn!(%name, ?existing, path = self.path, "duplicate type declaration skipped");
                self.diagnostics
                    .duplicate_declaration(node.line(), node.column(), name.as_str(), existing);
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        let (kind, source_name, anonymous_index, base) = match origin {
            Origin::Anonymous { index, base } => (TypeKind::Class, None, Some(index), Some(base)),
            Origin::Local(simple) => (type_kind(node.kind()), Some(simple), None, None),
            Origin::TopLevel | Origin::Member => (
                type_kind(node.kind()),
                Some(SmolStr::new(name.simple_name())),
                None,
                None,
            ),
        };
        let parent_kind = parent.map(|p| self.types[p].kind);
        let type_modifiers = implied_type_modifiers(modifiers(node), kind, parent_kind);
        let span = LineSpan::new(node.line(), node.last_line());
        let declaring_type = parent.map(|p| self.types[p].id);

        self.store.write(|graph| -> Result<(), StoreError> {
            let ty = graph.ty_mut(id)?;
            ty.kind = Some(kind);
            ty.modifiers = type_modifiers;
            ty.span = Some(span);
            ty.declaring_type = declaring_type;
            ty.anonymous_index = anonymous_index;
            if let Some(declaring_type) = declaring_type {
                graph.ty_mut(declaring_type)?.inner_types.push(id);
            }
            Ok(())
        })??;
        self.names.insert(id, name.clone());

        let body = if base.is_some() {
            Some(node)
        } else {
            node.child_of_kind(SyntaxKind::ClassBody)
                .or_else(|| node.child_of_kind(SyntaxKind::EnumBody))
        };
        let type_params = node
            .child_of_kind(SyntaxKind::TypeParameters)
            .map(type_parameter_names)
            .unwrap_or_default();

        if let (Some(parent), Some(simple)) = (parent, &source_name) {
            self.types[parent].members.insert(simple.clone(), name.clone());
        }

        let index = self.types.len();
        self.types.push(DeclaredType {
            id,
            name,
            source_name,
            kind,
            node,
            body,
            parent,
            base,
            members: FxHashMap::default(),
            type_params,
            anonymous_count: 0,
            local_counts: FxHashMap::default(),
            fields: FxHashMap::default(),
            depends_on: IndexSet::new(),
        });

        if let Some(body) = body {
            self.declare_body(body, index)?;
        }
        Ok(Some(index))
    }

    fn declare_body(&mut self, body: &'t SyntaxNode, owner: usize) -> Result<(), ScanError> {
        for member in body.children() {
            match member.kind() {
                kind if kind.is_type_declaration() => {
                    let Some(simple) = declared_name(member) else {
                        continue;
                    };
                    match self.types[owner].name.nested(&simple.text) {
                        Ok(name) => {
                            self.declare_type(member, name, Some(owner), Origin::Member)?;
                        }
                        Err(_) => self.diagnostics.malformed_name(simple.line, simple.column, &simple.text),
                    }
                }
                SyntaxKind::EnumConstant => {
                    if let Some(arguments) = member.child_of_kind(SyntaxKind::Arguments) {
                        self.declare_nested(arguments, owner)?;
                    }
                    if let Some(class_body) = member.child_of_kind(SyntaxKind::ClassBody) {
                        self.declare_anonymous(class_body, owner, AnonymousBase::EnclosingEnum)?;
                    }
                }
                SyntaxKind::Token | SyntaxKind::Error => {}
                _ => self.declare_nested(member, owner)?,
            }
        }
        Ok(())
    }

    /// Find local and anonymous classes below `node`, which belongs to `owner`.
    fn declare_nested(&mut self, node: &'t SyntaxNode, owner: usize) -> Result<(), ScanError> {
        for child in node.children() {
            match child.kind() {
                kind if kind.is_type_declaration() => {
                    let Some(simple) = declared_name(child) else {
                        continue;
                    };
                    let count = self.types[owner]
                        .local_counts
                        .entry(simple.text.clone())
                        .or_insert(0);
                    *count += 1;
                    let binary = format!("{count}{}", simple.text);
                    match self.types[owner].name.nested(&binary) {
                        Ok(name) => {
                            self.declare_type(child, name, Some(owner), Origin::Local(simple.text.clone()))?;
                        }
                        Err(_) => self.diagnostics.malformed_name(simple.line, simple.column, &simple.text),
                    }
                }
                SyntaxKind::NewObject => {
                    let class_body = child.child_of_kind(SyntaxKind::ClassBody);
                    let base = child.child_of_kind(SyntaxKind::TypeRef);
                    if let (Some(class_body), Some(base)) = (class_body, base) {
                        self.declare_anonymous(class_body, owner, AnonymousBase::TypeRef(base))?;
                    }
                    self.declare_nested(child, owner)?;
                }
                // Only reached below `NewObject`, handled above.
                SyntaxKind::ClassBody => {}
                _ => self.declare_nested(child, owner)?,
            }
        }
        Ok(())
    }

    fn declare_anonymous(
        &mut self,
        body: &'t SyntaxNode,
        owner: usize,
        base: AnonymousBase<'t>,
    ) -> Result<(), ScanError> {
        let index = {
            let ty = &mut self.types[owner];
            ty.anonymous_count += 1;
            ty.anonymous_count
        };
        match self.types[owner].name.nested(&index.to_string()) {
            Ok(name) => {
                self.declare_type(body, name, Some(owner), Origin::Anonymous { index, base })?;
            }
            Err(_) => self
                .diagnostics
                .malformed_name(body.line(), body.column(), self.types[owner].name.as_str()),
        }
        Ok(())
    }

    /// Pick the unit's main type: the top-level type named like the file,
    /// else the first public one, else the first one.
    pub(super) fn select_main_type(&mut self) -> Result<(), ScanError> {
        let stem = file_stem(self.path);
        let top_level: Vec<&DeclaredType<'t>> = self.types.iter().filter(|t| t.parent.is_none()).collect();
        let main = top_level
            .iter()
            .find(|t| t.source_name.as_deref() == Some(stem))
            .or_else(|| {
                top_level
                    .iter()
                    .find(|t| modifiers(t.node).visibility == Visibility::Public)
            })
            .or_else(|| top_level.first())
            .map(|t| t.id);
        let Some(main) = main else {
            return Ok(());
        };
        let unit = self.unit;
        self.store
            .write(|graph| -> Result<(), ScanError> { Ok(graph.unit_mut(unit)?.set_main_type(main)?) })??;
        Ok(())
    }
}

/// `Foo` for `src/p/Foo.java`.
fn file_stem(path: &str) -> &str {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    name.rsplit_once('.').map_or(name, |(stem, _)| stem)
}

fn type_parameter_names(node: &SyntaxNode) -> Vec<SmolStr> {
    node.children()
        .iter()
        .filter(|c| c.kind() == SyntaxKind::TypeParameter)
        .filter_map(declared_name)
        .map(|t| t.text.clone())
        .collect()
}

/// Member types of interfaces are public and static; member interfaces,
/// enums and annotations are static.
fn implied_type_modifiers(mut modifiers: Modifiers, kind: TypeKind, parent: Option<TypeKind>) -> Modifiers {
    let Some(parent) = parent else {
        return modifiers;
    };
    if matches!(parent, TypeKind::Interface | TypeKind::Annotation) {
        modifiers.visibility = Visibility::Public;
        modifiers.is_static = true;
    }
    if kind != TypeKind::Class {
        modifiers.is_static = true;
    }
    modifiers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("src/example/one/Test1.java"), "Test1");
        assert_eq!(file_stem("C:\\work\\A.java"), "A");
        assert_eq!(file_stem("Makefile"), "Makefile");
    }

    #[test]
    fn test_interface_member_types_are_public_static() {
        let implied = implied_type_modifiers(Modifiers::default(), TypeKind::Class, Some(TypeKind::Interface));

        assert_eq!(implied.visibility, Visibility::Public);
        assert!(implied.is_static);
        assert!(!implied_type_modifiers(Modifiers::default(), TypeKind::Class, Some(TypeKind::Class)).is_static);
        assert!(implied_type_modifiers(Modifiers::default(), TypeKind::Enum, Some(TypeKind::Class)).is_static);
    }
}
