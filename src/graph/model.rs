//! Node and edge types of the declaration graph.
//!
//! Nodes are plain structs addressed by typed ids; edges are id fields or id
//! lists on the source node. The one state machine in the model is
//! [`TypeState`]: a type starts incomplete (a placeholder created when a name
//! is referenced before, or without, its declaration) and is completed exactly
//! once when its declaration is scanned.

use indexmap::IndexSet;
use smol_str::SmolStr;
use thiserror::Error;

use super::ids::{ArtifactId, FieldId, FunctionId, LineId, ParameterId, TextFileId, TypeId, UnitId};
use crate::base::{LineSpan, QualifiedName};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("type `{name}` is already complete")]
    AlreadyComplete { name: QualifiedName },
    #[error("{ty:?} is not declared by {unit:?} and cannot be its main type")]
    MainTypeNotDeclared { unit: UnitId, ty: TypeId },
}

// ============================================================================
// MODIFIERS
// ============================================================================

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub enum Visibility {
    Public,
    Protected,
    #[default]
    Package,
    Private,
}

/// Declaration modifiers shared by types and members.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct Modifiers {
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
    pub is_abstract: bool,
    pub is_transient: bool,
    pub is_volatile: bool,
    pub is_synchronized: bool,
    pub is_native: bool,
}

// ============================================================================
// ARTIFACTS AND UNITS
// ============================================================================

/// A resolution boundary: a set of compilation units plus the artifacts they
/// may resolve names against.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
pub struct Artifact {
    pub id: ArtifactId,
    pub name: SmolStr,
    pub units: Vec<UnitId>,
    pub dependencies: Vec<ArtifactId>,
}

/// One scanned source file.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
pub struct CompilationUnit {
    pub id: UnitId,
    /// The file path as given by the host.
    pub path: SmolStr,
    pub package: Option<SmolStr>,
    pub artifact: Option<ArtifactId>,
    /// Set when the parser reported errors for this file.
    pub may_not_compile: bool,
    pub declared_types: Vec<TypeId>,
    main_type: Option<TypeId>,
    /// Types referenced by this unit that were unresolved when first seen.
    /// This list outlives the scope that created the placeholders: later
    /// scopes seed from it to reuse the same nodes. The placeholder's
    /// `required_by` is the scope-lifetime direction of the edge and is
    /// cleared on teardown. Both go away once the type is declared.
    pub required_types: Vec<TypeId>,
    /// Artifacts this unit may resolve names against.
    pub dependencies: Vec<ArtifactId>,
}

impl CompilationUnit {
    pub fn new(id: UnitId, path: SmolStr, artifact: Option<ArtifactId>) -> Self {
        Self {
            id,
            path,
            package: None,
            artifact,
            may_not_compile: false,
            declared_types: Vec::new(),
            main_type: None,
            required_types: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    pub fn main_type(&self) -> Option<TypeId> {
        self.main_type
    }

    /// Set the main type, which must be one of the declared types.
    pub fn set_main_type(&mut self, ty: TypeId) -> Result<(), ModelError> {
        if !self.declared_types.contains(&ty) {
            return Err(ModelError::MainTypeNotDeclared { unit: self.id, ty });
        }
        self.main_type = Some(ty);
        Ok(())
    }

    pub fn requires(&self, ty: TypeId) -> bool {
        self.required_types.contains(&ty)
    }
}

// ============================================================================
// TYPES
// ============================================================================

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Annotation,
}

/// Lifecycle of a type node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
pub enum TypeState {
    /// A placeholder. `required_by` names the unit that needs it while the
    /// scope that created it is active.
    Incomplete { required_by: Option<UnitId> },
    /// Declared by exactly one unit.
    Complete { declared_by: UnitId },
}

impl TypeState {
    pub fn is_complete(self) -> bool {
        matches!(self, TypeState::Complete { .. })
    }

    pub fn declared_by(self) -> Option<UnitId> {
        match self {
            TypeState::Complete { declared_by } => Some(declared_by),
            TypeState::Incomplete { .. } => None,
        }
    }

    pub fn required_by(self) -> Option<UnitId> {
        match self {
            TypeState::Incomplete { required_by } => required_by,
            TypeState::Complete { .. } => None,
        }
    }
}

/// A type node. Its semantic key is `name`; `universe` is the artifact whose
/// resolution universe it belongs to (`None` for the global universe).
#[derive(Clone, Debug)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
pub struct TypeNode {
    pub id: TypeId,
    pub name: QualifiedName,
    pub universe: Option<ArtifactId>,
    state: TypeState,
    /// Containing artifact, set on completion.
    pub artifact: Option<ArtifactId>,
    /// `None` until declared.
    pub kind: Option<TypeKind>,
    pub modifiers: Modifiers,
    pub span: Option<LineSpan>,
    pub superclass: Option<TypeId>,
    pub interfaces: Vec<TypeId>,
    pub inner_types: Vec<TypeId>,
    pub declaring_type: Option<TypeId>,
    /// 1-based position among the anonymous classes of the declaring type.
    pub anonymous_index: Option<u32>,
    pub fields: Vec<FieldId>,
    pub functions: Vec<FunctionId>,
    /// Types referenced from this type's declaration and bodies.
    pub depends_on: IndexSet<TypeId>,
}

impl TypeNode {
    pub fn incomplete(id: TypeId, name: QualifiedName, universe: Option<ArtifactId>) -> Self {
        Self {
            id,
            name,
            universe,
            state: TypeState::Incomplete { required_by: None },
            artifact: None,
            kind: None,
            modifiers: Modifiers::default(),
            span: None,
            superclass: None,
            interfaces: Vec::new(),
            inner_types: Vec::new(),
            declaring_type: None,
            anonymous_index: None,
            fields: Vec::new(),
            functions: Vec::new(),
            depends_on: IndexSet::new(),
        }
    }

    pub fn state(&self) -> TypeState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state.is_complete()
    }

    pub fn simple_name(&self) -> &str {
        self.name.simple_name()
    }

    /// Incomplete to complete. Clears `required_by`; the identity of the node
    /// is unchanged.
    pub fn complete(&mut self, declared_by: UnitId, artifact: Option<ArtifactId>) -> Result<(), ModelError> {
        if self.state.is_complete() {
            return Err(ModelError::AlreadyComplete {
                name: self.name.clone(),
            });
        }
        self.state = TypeState::Complete { declared_by };
        self.artifact = artifact;
        Ok(())
    }

    /// Record the unit that needs this placeholder. Ignored once complete.
    pub fn set_required_by(&mut self, unit: Option<UnitId>) {
        if let TypeState::Incomplete { required_by } = &mut self.state {
            *required_by = unit;
        }
    }
}

// ============================================================================
// MEMBERS
// ============================================================================

/// The base of a type use.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
pub enum TypeBase {
    /// `int`, `boolean`, `void`, ...
    Primitive(SmolStr),
    Declared(TypeId),
    /// A type variable such as `T`.
    Variable(SmolStr),
}

/// A use of a type: its base plus array dimensions.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
pub struct TypeUse {
    pub base: TypeBase,
    pub dims: u8,
}

impl TypeUse {
    pub fn declared(&self) -> Option<TypeId> {
        match self.base {
            TypeBase::Declared(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
pub struct Field {
    pub id: FieldId,
    pub name: SmolStr,
    pub declaring_type: TypeId,
    pub type_use: TypeUse,
    pub modifiers: Modifiers,
    pub line: u32,
    /// `Type name`, e.g. `java.util.List name`.
    pub signature: SmolStr,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub enum FunctionKind {
    Method,
    Constructor,
    /// An instance or static initializer block.
    Initializer,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
pub struct Function {
    pub id: FunctionId,
    pub name: SmolStr,
    pub kind: FunctionKind,
    pub declaring_type: TypeId,
    pub parameters: Vec<ParameterId>,
    /// `None` for constructors and initializers.
    pub returns: Option<TypeUse>,
    pub throws: Vec<TypeId>,
    pub modifiers: Modifiers,
    pub span: LineSpan,
    /// `name(ParamType, ...)`.
    pub signature: SmolStr,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
pub struct Parameter {
    pub id: ParameterId,
    pub name: SmolStr,
    pub index: u32,
    pub type_use: TypeUse,
    pub function: FunctionId,
    pub is_varargs: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub enum AccessKind {
    Read,
    Write,
}

/// One read or write of a field from a function body.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
pub struct Access {
    pub function: FunctionId,
    pub field: FieldId,
    pub line: u32,
    pub kind: AccessKind,
}

// ============================================================================
// PLAIN TEXT
// ============================================================================

#[derive(Clone, Debug)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
pub struct TextFile {
    pub id: TextFileId,
    pub path: SmolStr,
    pub lines: Vec<LineId>,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
pub struct Line {
    pub id: LineId,
    pub file: TextFileId,
    /// 0-based.
    pub number: u32,
    pub text: SmolStr,
    pub next: Option<LineId>,
}
