//! Second pass: supertypes, fields, functions and parameters.

use smol_str::SmolStr;

use super::ScanError;
use super::unit::{AnonymousBase, PendingBody, UnitScan, annotations, declared_name, extra_dims, modifiers};
use crate::base::LineSpan;
use crate::graph::{
    Field, Function, FunctionKind, GraphStoreExt, Modifiers, Parameter, TypeBase, TypeId, TypeKind,
    TypeUse, Visibility,
};
use crate::syntax::{SyntaxKind, SyntaxNode, TokenKind, TreeView};

/// A parameter before it is stored.
struct ParameterSpec {
    name: SmolStr,
    type_use: TypeUse,
    is_varargs: bool,
}

impl<'t> UnitScan<'_, 't> {
    pub(super) fn record_members(&mut self) -> Result<(), ScanError> {
        for index in 0..self.types.len() {
            self.record_supertypes(index)?;
            for annotation in annotations(self.types[index].node) {
                self.annotation(annotation, index)?;
            }

            let Some(body) = self.types[index].body else {
                continue;
            };
            for member in body.children() {
                match member.kind() {
                    SyntaxKind::FieldDecl => self.record_fields(member, index)?,
                    SyntaxKind::EnumConstant => self.record_enum_constant(member, index)?,
                    SyntaxKind::MethodDecl | SyntaxKind::ConstructorDecl | SyntaxKind::Initializer => {
                        self.record_function(member, index)?
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    fn record_supertypes(&mut self, index: usize) -> Result<(), ScanError> {
        let node = self.types[index].node;
        let mut superclass = None;
        let mut interfaces = Vec::new();

        match (node.kind(), self.types[index].base) {
            (SyntaxKind::ClassDecl, _) => {
                if let Some(extends) = node.child_of_kind(SyntaxKind::ExtendsClause) {
                    superclass = self.clause_types(extends, index)?.into_iter().next();
                }
                if let Some(implements) = node.child_of_kind(SyntaxKind::ImplementsClause) {
                    interfaces = self.clause_types(implements, index)?;
                }
            }
            (SyntaxKind::InterfaceDecl, _) => {
                if let Some(extends) = node.child_of_kind(SyntaxKind::ExtendsClause) {
                    interfaces = self.clause_types(extends, index)?;
                }
            }
            (SyntaxKind::EnumDecl, _) => {
                if let Some(implements) = node.child_of_kind(SyntaxKind::ImplementsClause) {
                    interfaces = self.clause_types(implements, index)?;
                }
            }
            (_, Some(AnonymousBase::EnclosingEnum)) => {
                superclass = self.types[index].parent.map(|p| self.types[p].id);
            }
            (_, Some(AnonymousBase::TypeRef(type_ref))) => {
                if let Some(base) = self.type_use(type_ref, index, &[], 0)?.and_then(|u| u.declared()) {
                    let is_interface = self
                        .store
                        .read(|graph| graph.ty(base).map(|ty| ty.kind == Some(TypeKind::Interface)))??;
                    if is_interface {
                        interfaces.push(base);
                    } else {
                        superclass = Some(base);
                    }
                }
            }
            _ => {}
        }

        if superclass.is_none() && interfaces.is_empty() {
            return Ok(());
        }
        let id = self.types[index].id;
        self.store.write(|graph| -> Result<(), ScanError> {
            let ty = graph.ty_mut(id)?;
            ty.superclass = superclass;
            ty.interfaces = interfaces;
            Ok(())
        })??;
        Ok(())
    }

    /// The declared types listed in an `extends` or `implements` clause.
    fn clause_types(&mut self, clause: &'t SyntaxNode, owner: usize) -> Result<Vec<TypeId>, ScanError> {
        let mut out = Vec::new();
        for type_ref in clause.children().iter().filter(|c| c.kind() == SyntaxKind::TypeRef) {
            if let Some(id) = self.type_use(type_ref, owner, &[], 0)?.and_then(|u| u.declared()) {
                out.push(id);
            }
        }
        Ok(out)
    }

    fn record_fields(&mut self, node: &'t SyntaxNode, owner: usize) -> Result<(), ScanError> {
        for annotation in annotations(node) {
            self.annotation(annotation, owner)?;
        }
        let Some(type_ref) = node.child_of_kind(SyntaxKind::TypeRef) else {
            return Ok(());
        };
        let mut field_modifiers = self.implied_member_modifiers(modifiers(node), owner, false);
        if self.is_interface_like(owner) {
            field_modifiers.is_static = true;
            field_modifiers.is_final = true;
        }

        for declarator in node.children().iter().filter(|c| c.kind() == SyntaxKind::VariableDeclarator) {
            let Some(name) = declared_name(declarator) else {
                continue;
            };
            let Some(type_use) = self.type_use(type_ref, owner, &[], extra_dims(declarator))? else {
                continue;
            };
            let signature = format!("{} {}", self.display(&type_use), name.text);
            let declaring_type = self.types[owner].id;
            let line = declarator.line();
            let id = self.store.write(|graph| {
                graph.add_field(|id| Field {
                    id,
                    name: name.text.clone(),
                    declaring_type,
                    type_use,
                    modifiers: field_modifiers,
                    line,
                    signature: signature.into(),
                })
            })??;
            self.types[owner].fields.insert(name.text.clone(), id);

            if let Some(initializer) = declarator.nodes().next() {
                self.bodies.push(PendingBody {
                    owner,
                    function: None,
                    node: initializer,
                    locals: Vec::new(),
                    type_params: Vec::new(),
                });
            }
        }
        Ok(())
    }

    /// Enum constants are public static final fields of the enum.
    fn record_enum_constant(&mut self, node: &'t SyntaxNode, owner: usize) -> Result<(), ScanError> {
        for annotation in annotations(node) {
            self.annotation(annotation, owner)?;
        }
        let Some(name) = declared_name(node) else {
            return Ok(());
        };
        let declaring_type = self.types[owner].id;
        let line = node.line();
        let signature: SmolStr = format!("{} {}", self.types[owner].name, name.text).into();
        let id = self.store.write(|graph| {
            graph.add_field(|id| Field {
                id,
                name: name.text.clone(),
                declaring_type,
                type_use: TypeUse {
                    base: TypeBase::Declared(declaring_type),
                    dims: 0,
                },
                modifiers: Modifiers {
                    visibility: Visibility::Public,
                    is_static: true,
                    is_final: true,
                    ..Modifiers::default()
                },
                line,
                signature,
            })
        })??;
        self.types[owner].fields.insert(name.text.clone(), id);

        if let Some(arguments) = node.child_of_kind(SyntaxKind::Arguments) {
            self.bodies.push(PendingBody {
                owner,
                function: None,
                node: arguments,
                locals: Vec::new(),
                type_params: Vec::new(),
            });
        }
        Ok(())
    }

    fn record_function(&mut self, node: &'t SyntaxNode, owner: usize) -> Result<(), ScanError> {
        for annotation in annotations(node) {
            self.annotation(annotation, owner)?;
        }
        let type_params = match node.child_of_kind(SyntaxKind::TypeParameters) {
            Some(params) => self.method_type_parameters(params, owner)?,
            None => Vec::new(),
        };

        let (kind, name) = match node.kind() {
            SyntaxKind::ConstructorDecl => (FunctionKind::Constructor, SmolStr::new_static("<init>")),
            SyntaxKind::Initializer if node.has_child_token(TokenKind::Static) => {
                (FunctionKind::Initializer, SmolStr::new_static("<clinit>"))
            }
            SyntaxKind::Initializer => (FunctionKind::Initializer, SmolStr::new_static("<instinit>")),
            _ => match declared_name(node) {
                Some(token) => (FunctionKind::Method, token.text.clone()),
                None => return Ok(()),
            },
        };

        let returns = if kind != FunctionKind::Method {
            None
        } else if let Some(void) = node.child_token(TokenKind::Void) {
            Some(TypeUse {
                base: TypeBase::Primitive(void.text.clone()),
                dims: 0,
            })
        } else {
            match node.child_of_kind(SyntaxKind::TypeRef) {
                Some(type_ref) => self.type_use(type_ref, owner, &type_params, extra_dims(node))?,
                None => None,
            }
        };

        let parameters = match node.child_of_kind(SyntaxKind::FormalParameters) {
            Some(list) => self.parameters(list, owner, &type_params)?,
            None => Vec::new(),
        };

        let mut throws = Vec::new();
        if let Some(clause) = node.child_of_kind(SyntaxKind::ThrowsClause) {
            for type_ref in clause.children().iter().filter(|c| c.kind() == SyntaxKind::TypeRef) {
                if let Some(id) = self.type_use(type_ref, owner, &type_params, 0)?.and_then(|u| u.declared()) {
                    throws.push(id);
                }
            }
        }

        let has_body = node.child_of_kind(SyntaxKind::Block).is_some();
        let function_modifiers = match kind {
            FunctionKind::Method => self.implied_member_modifiers(modifiers(node), owner, !has_body),
            FunctionKind::Initializer => Modifiers {
                is_static: node.has_child_token(TokenKind::Static),
                ..Modifiers::default()
            },
            FunctionKind::Constructor => modifiers(node),
        };
        let params_text: Vec<String> = parameters.iter().map(|p| self.display(&p.type_use)).collect();
        let signature: SmolStr = format!("{name}({})", params_text.join(",")).into();
        let declaring_type = self.types[owner].id;
        let span = LineSpan::new(node.line(), node.last_line());

        let function = self.store.write(|graph| -> Result<_, ScanError> {
            let function = graph.add_function(|id| Function {
                id,
                name: name.clone(),
                kind,
                declaring_type,
                parameters: Vec::new(),
                returns,
                throws,
                modifiers: function_modifiers,
                span,
                signature,
            })?;
            for (index, spec) in parameters.iter().enumerate() {
                graph.add_parameter(|id| Parameter {
                    id,
                    name: spec.name.clone(),
                    index: index as u32,
                    type_use: spec.type_use.clone(),
                    function,
                    is_varargs: spec.is_varargs,
                })?;
            }
            Ok(function)
        })??;

        if let Some(block) = node.child_of_kind(SyntaxKind::Block) {
            self.bodies.push(PendingBody {
                owner,
                function: Some(function),
                node: block,
                locals: parameters.into_iter().map(|p| p.name).collect(),
                type_params,
            });
        }
        Ok(())
    }

    /// Names of a method's type parameters; their bounds are dependencies.
    fn method_type_parameters(&mut self, node: &'t SyntaxNode, owner: usize) -> Result<Vec<SmolStr>, ScanError> {
        let names: Vec<SmolStr> = node
            .children()
            .iter()
            .filter(|c| c.kind() == SyntaxKind::TypeParameter)
            .filter_map(declared_name)
            .map(|t| t.text.clone())
            .collect();
        for param in node.children().iter().filter(|c| c.kind() == SyntaxKind::TypeParameter) {
            for bound in param.children().iter().filter(|c| c.kind() == SyntaxKind::TypeRef) {
                self.type_use(bound, owner, &names, 0)?;
            }
        }
        Ok(names)
    }

    fn parameters(
        &mut self,
        list: &'t SyntaxNode,
        owner: usize,
        type_params: &[SmolStr],
    ) -> Result<Vec<ParameterSpec>, ScanError> {
        let mut out = Vec::new();
        for param in list.children().iter().filter(|c| c.kind() == SyntaxKind::Parameter) {
            for annotation in annotations(param) {
                self.annotation(annotation, owner)?;
            }
            // A receiver parameter (`Outer this`) names no variable.
            let Some(name) = declared_name(param) else {
                continue;
            };
            let Some(type_ref) = param.child_of_kind(SyntaxKind::TypeRef) else {
                continue;
            };
            let is_varargs = param.has_child_token(TokenKind::Ellipsis);
            let dims = extra_dims(param) + u8::from(is_varargs);
            if let Some(type_use) = self.type_use(type_ref, owner, type_params, dims)? {
                out.push(ParameterSpec {
                    name: name.text.clone(),
                    type_use,
                    is_varargs,
                });
            }
        }
        Ok(out)
    }

    /// Interface members are public and bodiless interface methods abstract.
    fn implied_member_modifiers(&self, mut modifiers: Modifiers, owner: usize, bodiless: bool) -> Modifiers {
        if !self.is_interface_like(owner) {
            return modifiers;
        }
        if modifiers.visibility == Visibility::Package {
            modifiers.visibility = Visibility::Public;
        }
        if bodiless && !modifiers.is_static {
            modifiers.is_abstract = true;
        }
        modifiers
    }

    fn is_interface_like(&self, owner: usize) -> bool {
        matches!(self.types[owner].kind, TypeKind::Interface | TypeKind::Annotation)
    }
}
