//! Typed node identifiers.
//!
//! Every graph node is addressed by an opaque, store-assigned index wrapped in
//! a type per node kind, so a `FieldId` can never be passed where a `TypeId`
//! is expected. Ids are only meaningful for the graph that issued them.

use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
        #[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub u32);

        impl $name {
            #[inline]
            pub const fn new(id: u32) -> Self {
                Self(id)
            }

            /// Position in the owning arena.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "#{}"), self.0)
            }
        }

        impl From<u32> for $name {
            #[inline]
            fn from(id: u32) -> Self {
                Self(id)
            }
        }
    };
}

define_id!(
    /// An artifact: a resolution boundary holding compilation units.
    ArtifactId,
    "artifact"
);
define_id!(
    /// A compilation unit (one source file).
    UnitId,
    "unit"
);
define_id!(
    /// A type node, complete or incomplete.
    TypeId,
    "type"
);
define_id!(FieldId, "field");
define_id!(
    /// A method, constructor or initializer block.
    FunctionId,
    "function"
);
define_id!(ParameterId, "param");
define_id!(TextFileId, "text");
define_id!(LineId, "line");
