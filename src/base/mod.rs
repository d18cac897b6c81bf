//! Foundation types shared by every layer of the scanner.
//!
//! - [`FileId`] - Handle for a scanned source file
//! - [`TextRange`], [`TextSize`] - Byte positions inside a file
//! - [`LineCol`], [`LineIndex`], [`LineSpan`] - Line/column conversion and line ranges
//! - [`QualifiedName`] - Validated fully-qualified type names
//!
//! This module has NO dependencies on other javasrc modules.

mod file_id;
mod name;
mod span;

pub use file_id::FileId;
pub use name::{NameError, QualifiedName};
pub use span::{LineCol, LineIndex, LineSpan, TextRange, TextSize};

// Re-export text-size types for convenience
pub use text_size;
