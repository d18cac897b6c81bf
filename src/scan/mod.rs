//! Scanning Java sources into the declaration graph.
//!
//! One file goes through three passes over its tree, all inside the active
//! resolver scope:
//!
//! 1. **Declarations** - every type the unit declares, nested, local and
//!    anonymous ones included, is declared before any reference is resolved.
//! 2. **Members** - supertypes, fields, functions and parameters. Type
//!    references resolve to declared nodes or placeholders.
//! 3. **Bodies** - type references inside function bodies and initializers
//!    become dependencies; field reads and writes become access edges.
//!
//! Files that are not Java source can be stored as plain text instead.

mod access;
mod config;
mod declarations;
mod diagnostics;
pub mod loader;
mod members;
mod names;
mod source;
pub mod text;
mod unit;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use smol_str::SmolStr;
use thiserror::Error;
use tracing::{debug, info};

use crate::base::FileId;
use crate::graph::{GraphStore, GraphStoreExt, ModelError, StoreError, TextFileId, TypeId, UnitId};
use crate::resolve::{CompilationContext, ResolveError, TypeResolver};
use crate::syntax::{Parse, parse_source};

pub use config::ScanConfig;
pub use diagnostics::{Diagnostic, DiagnosticCollector, Severity, codes};
pub use loader::{ArtifactReport, ArtifactSpec, SkippedFile, collect_files, scan_artifact, scan_artifacts_parallel};
pub use source::FileSet;

use names::Imports;
use unit::UnitScan;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to walk source directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// What scanning one source file produced.
#[derive(Clone, Debug)]
pub struct UnitReport {
    pub unit: UnitId,
    pub file: FileId,
    pub path: SmolStr,
    /// The unit already existed and was left as it was.
    pub rescanned: bool,
    pub may_not_compile: bool,
    pub declared_types: Vec<TypeId>,
    pub diagnostics: Vec<Diagnostic>,
}

impl UnitReport {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub(crate) fn note_lossy_decoding(&mut self) {
        self.diagnostics.push(
            Diagnostic::warning(self.file, 1, 0, "file is not valid UTF-8; invalid bytes were replaced")
                .with_code(codes::INVALID_ENCODING),
        );
    }
}

/// What scanning one file from disk produced.
#[derive(Clone, Debug)]
pub enum ScanOutcome {
    Source(UnitReport),
    Text(TextFileId),
    /// Neither a source extension nor text fallback, or a binary file.
    Skipped,
}

/// Scans files through a caller-provided resolver.
#[derive(Debug, Default)]
pub struct SourceScanner {
    config: ScanConfig,
    files: Arc<FileSet>,
}

impl SourceScanner {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            files: Arc::new(FileSet::new()),
        }
    }

    /// Share a file set with other scanners so file ids stay stable.
    pub fn with_files(mut self, files: Arc<FileSet>) -> Self {
        self.files = files;
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn files(&self) -> &Arc<FileSet> {
        &self.files
    }

    /// Parse `text` with this scanner's options. Touches no store.
    pub fn parse(&self, path: &str, text: &str) -> Parse {
        parse_source(text, &self.config.parse_options(path))
    }

    /// Parse and scan one source file. `context` names the artifact the
    /// unit belongs to; it must be the one `resolver` was entered for.
    pub fn scan_source(
        &self,
        resolver: &mut TypeResolver,
        context: Option<&CompilationContext>,
        path: &str,
        text: &str,
    ) -> Result<UnitReport, ScanError> {
        let parse = self.parse(path, text);
        self.scan_parsed(resolver, context, path, &parse)
    }

    /// Scan an already parsed file. Scanning a path that already has a unit
    /// in this artifact returns that unit unchanged.
    pub fn scan_parsed(
        &self,
        resolver: &mut TypeResolver,
        context: Option<&CompilationContext>,
        path: &str,
        parse: &Parse,
    ) -> Result<UnitReport, ScanError> {
        let store = resolver.store().clone();
        let artifact = context.map(|c| c.artifact);
        debug_assert_eq!(artifact, resolver.artifact(), "scope entered for another artifact");
        let file = self.files.file_id(path);

        if let Some(unit) = store.find_unit(path, artifact)? {
            let (may_not_compile, declared_types) = store.read(|graph| {
                graph
                    .unit(unit)
                    .map(|u| (u.may_not_compile, u.declared_types.clone()))
            })??;
            debug!(path, ?unit, "unit already scanned");
            return Ok(UnitReport {
                unit,
                file,
                path: path.into(),
                rescanned: true,
                may_not_compile,
                declared_types,
                diagnostics: Vec::new(),
            });
        }

        let unit = store.create_unit(path, artifact)?;
        let mut diagnostics = DiagnosticCollector::new(file);
        for error in &parse.errors {
            diagnostics.syntax_error(error);
        }
        let imports = Imports::from_tree(&parse.root, &mut diagnostics);
        let package = imports.package().map(SmolStr::new);
        let may_not_compile = parse.has_errors();
        store.write(|graph| -> Result<(), StoreError> {
            let unit = graph.unit_mut(unit)?;
            unit.package = package;
            unit.may_not_compile = may_not_compile;
            Ok(())
        })??;

        let mut scan = UnitScan::new(resolver, &self.config, unit, path, imports, diagnostics);
        scan.declare_types(&parse.root)?;
        scan.select_main_type()?;
        scan.record_members()?;
        scan.scan_bodies()?;
        scan.flush()?;
        let declared_types: Vec<TypeId> = scan.types.iter().map(|t| t.id).collect();
        let diagnostics = scan.finish();

        info!(
            path,
            ?unit,
            types = declared_types.len(),
            diagnostics = diagnostics.len(),
            may_not_compile,
            "scanned unit"
        );
        Ok(UnitReport {
            unit,
            file,
            path: path.into(),
            rescanned: false,
            may_not_compile,
            declared_types,
            diagnostics,
        })
    }

    /// Read and scan one file from disk, as source or as plain text depending
    /// on its extension and the configuration.
    pub fn scan_file(
        &self,
        resolver: &mut TypeResolver,
        context: Option<&CompilationContext>,
        path: &Path,
    ) -> Result<ScanOutcome, ScanError> {
        let is_source = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.config.is_source_extension(ext));
        if !is_source && !self.config.text_fallback {
            return Ok(ScanOutcome::Skipped);
        }

        let FileText { text, lossy } = read_file(path)?;
        let name = path.to_string_lossy();
        if is_source {
            let mut report = self.scan_source(resolver, context, &name, &text)?;
            if lossy {
                report.note_lossy_decoding();
            }
            Ok(ScanOutcome::Source(report))
        } else if lossy {
            debug!(path = %name, "skipping binary file");
            Ok(ScanOutcome::Skipped)
        } else {
            let store = resolver.store().clone();
            self.scan_text(&*store, &name, &text).map(ScanOutcome::Text)
        }
    }

    pub fn scan_text(&self, store: &dyn GraphStore, path: &str, text: &str) -> Result<TextFileId, ScanError> {
        self.files.file_id(path);
        Ok(text::scan_text(store, path, text)?)
    }
}

/// File contents. Bytes that are not valid UTF-8 are replaced and `lossy`
/// is set.
pub(crate) struct FileText {
    pub(crate) text: String,
    pub(crate) lossy: bool,
}

pub(crate) fn read_file(path: &Path) -> Result<FileText, ScanError> {
    let bytes = std::fs::read(path).map_err(|source| ScanError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => FileText { text, lossy: false },
        Err(err) => FileText {
            text: String::from_utf8_lossy(err.as_bytes()).into_owned(),
            lossy: true,
        },
    })
}
