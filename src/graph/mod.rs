//! The declaration graph: typed node ids, the node model, the store and
//! read-side queries.

mod ids;
mod model;
mod query;
mod store;

#[cfg(feature = "interchange")]
pub mod interchange;

pub use ids::{ArtifactId, FieldId, FunctionId, LineId, ParameterId, TextFileId, TypeId, UnitId};
pub use model::{
    Access, AccessKind, Artifact, CompilationUnit, Field, Function, FunctionKind, Line, ModelError,
    Modifiers, Parameter, TextFile, TypeBase, TypeKind, TypeNode, TypeState, TypeUse, Visibility,
};
pub use store::{Graph, GraphStore, GraphStoreExt, MemoryStore, StoreError};
