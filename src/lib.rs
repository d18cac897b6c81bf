//! # javasrc-base
//!
//! Core library for scanning Java sources into a persistent declaration graph
//! with scope-aware type resolution.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! scan     → Source scanning, plain-text fallback, directory loading
//!   ↓
//! resolve  → Type resolution strategies and the scope stack
//!   ↓
//! graph    → Declaration graph: ids, nodes, store, queries
//!   ↓
//! syntax   → Lexer, token collector, parser, enriched tree, comments
//!   ↓
//! base     → Primitives (FileId, LineIndex, LineSpan, QualifiedName)
//! ```
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use javasrc::graph::{GraphStore, GraphStoreExt, MemoryStore};
//! use javasrc::resolve::{CompilationContext, ScopeStack};
//! use javasrc::scan::{ScanConfig, SourceScanner};
//!
//! let store: Arc<dyn GraphStore> = Arc::new(MemoryStore::new());
//! let artifact = store.create_artifact("app", &[]).unwrap();
//! let context = CompilationContext::new(artifact);
//!
//! let scanner = SourceScanner::new(ScanConfig::default());
//! let mut stack = ScopeStack::new(store.clone());
//! let mut scope = stack.enter(Some(&context)).unwrap();
//! let report = scanner
//!     .scan_source(&mut scope, Some(&context), "p/A.java", "package p; class A extends B {}")
//!     .unwrap();
//! scope.exit().unwrap();
//!
//! assert_eq!(report.declared_types.len(), 1);
//! let incomplete = store
//!     .read(|graph| graph.types().iter().filter(|t| !t.is_complete()).count())
//!     .unwrap();
//! assert_eq!(incomplete, 1);
//! ```

/// Foundation types: FileId, line positions, qualified names
pub mod base;

/// Declaration graph model and store
pub mod graph;

/// Scope-aware type resolution
pub mod resolve;

/// Scanning sources and text files into the graph
pub mod scan;

/// Lexer, parser and the comment-enriched tree
pub mod syntax;

// Re-export commonly needed items
pub use base::{FileId, LineCol, LineIndex, LineSpan, QualifiedName, TextRange, TextSize};
pub use graph::{GraphStore, GraphStoreExt, MemoryStore};
pub use resolve::{CompilationContext, ScopeStack, TypeResolver};
pub use scan::{ScanConfig, ScanError, SourceScanner};
