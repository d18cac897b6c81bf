//! Read-side helpers over a [`Graph`].

use super::ids::{ArtifactId, FieldId, FunctionId, TypeId, UnitId};
use super::model::{Access, AccessKind, Field, Function, TypeNode};
use super::store::Graph;

impl Graph {
    /// The type named `name` in `universe`, if any. `None` is the global
    /// universe.
    pub fn type_in(&self, name: &str, universe: Option<ArtifactId>) -> Option<&TypeNode> {
        self.types_named(name)
            .iter()
            .filter_map(|&id| self.ty(id).ok())
            .find(|ty| ty.universe == universe)
    }

    /// Incomplete types, in creation order.
    pub fn incomplete_types(&self) -> impl Iterator<Item = &TypeNode> {
        self.types().iter().filter(|ty| !ty.is_complete())
    }

    /// Types whose required-by edge points at `unit`.
    pub fn types_required_by(&self, unit: UnitId) -> impl Iterator<Item = &TypeNode> {
        self.types()
            .iter()
            .filter(move |ty| ty.state().required_by() == Some(unit))
    }

    pub fn field_named(&self, ty: TypeId, name: &str) -> Option<&Field> {
        let ty = self.ty(ty).ok()?;
        ty.fields
            .iter()
            .filter_map(|&id| self.field(id).ok())
            .find(|field| field.name == name)
    }

    /// Functions of `ty` with this name; overloads come back in declaration
    /// order.
    pub fn functions_named<'g>(&'g self, ty: TypeId, name: &'g str) -> impl Iterator<Item = &'g Function> {
        self.ty(ty)
            .map(|ty| ty.functions.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|&id| self.function(id).ok())
            .filter(move |function| function.name == name)
    }

    pub fn accesses_of(&self, field: FieldId) -> impl Iterator<Item = &Access> {
        self.accesses().iter().filter(move |a| a.field == field)
    }

    pub fn accesses_from(&self, function: FunctionId) -> impl Iterator<Item = &Access> {
        self.accesses().iter().filter(move |a| a.function == function)
    }

    /// Number of `kind` accesses of `field`.
    pub fn access_count(&self, field: FieldId, kind: AccessKind) -> usize {
        self.accesses_of(field).filter(|a| a.kind == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{LineSpan, QualifiedName};
    use crate::graph::model::{FunctionKind, Modifiers, TypeBase, TypeUse};

    #[test]
    fn test_member_lookup_and_accesses() {
        let mut graph = Graph::new();
        let ty = graph.add_type(&QualifiedName::parse("p.A").unwrap(), None);
        let int = TypeUse {
            base: TypeBase::Primitive("int".into()),
            dims: 0,
        };
        let field = graph
            .add_field(|id| Field {
                id,
                name: "count".into(),
                declaring_type: ty,
                type_use: int.clone(),
                modifiers: Modifiers::default(),
                line: 2,
                signature: "int count".into(),
            })
            .unwrap();
        let function = graph
            .add_function(|id| Function {
                id,
                name: "inc".into(),
                kind: FunctionKind::Method,
                declaring_type: ty,
                parameters: Vec::new(),
                returns: None,
                throws: Vec::new(),
                modifiers: Modifiers::default(),
                span: LineSpan::new(3, 3),
                signature: "inc()".into(),
            })
            .unwrap();
        for kind in [AccessKind::Read, AccessKind::Write] {
            graph
                .add_access(Access {
                    function,
                    field,
                    line: 3,
                    kind,
                })
                .unwrap();
        }

        assert_eq!(graph.field_named(ty, "count").map(|f| f.id), Some(field));
        assert_eq!(graph.functions_named(ty, "inc").count(), 1);
        assert_eq!(graph.access_count(field, AccessKind::Read), 1);
        assert_eq!(graph.accesses_from(function).count(), 2);
        assert!(graph.type_in("p.A", None).is_some());
        assert_eq!(graph.incomplete_types().count(), 1);
    }
}
