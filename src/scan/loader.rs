//! Loading artifacts from directories.
//!
//! Files are discovered with `walkdir` and parsed in parallel; parsing never
//! touches the store. Scanning then runs sequentially inside one artifact
//! scope. Independent artifacts can be scanned in parallel.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use smol_str::SmolStr;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::{FileText, ScanConfig, ScanError, SourceScanner, UnitReport, read_file};
use crate::graph::{ArtifactId, GraphStore, TextFileId};
use crate::resolve::{CompilationContext, ScopeStack};
use crate::syntax::Parse;

/// An artifact to load: its source roots and the artifacts it depends on.
#[derive(Clone, Debug)]
pub struct ArtifactSpec {
    pub name: SmolStr,
    pub roots: Vec<PathBuf>,
    /// Must already exist in the store.
    pub dependencies: Vec<ArtifactId>,
}

impl ArtifactSpec {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            roots: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.roots.push(root.into());
        self
    }

    pub fn with_dependency(mut self, dependency: ArtifactId) -> Self {
        self.dependencies.push(dependency);
        self
    }
}

/// A file the loader could not scan. The rest of the artifact is unaffected.
#[derive(Clone, Debug)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Clone, Debug)]
pub struct ArtifactReport {
    pub artifact: ArtifactId,
    pub units: Vec<UnitReport>,
    pub text_files: Vec<TextFileId>,
    pub skipped: Vec<SkippedFile>,
}

impl ArtifactReport {
    pub fn error_count(&self) -> usize {
        self.units
            .iter()
            .flat_map(|u| &u.diagnostics)
            .filter(|d| d.is_error())
            .count()
    }
}

/// A file read and, for sources, parsed.
enum Loaded {
    Source { path: String, parse: Parse, lossy: bool },
    Text { path: String, text: String },
    Skipped(SkippedFile),
}

/// Files under `dir` to scan, in path order. Hidden files and directories are
/// skipped. Without text fallback only source extensions are returned.
pub fn collect_files(dir: &Path, config: &ScanConfig) -> Result<Vec<PathBuf>, ScanError> {
    if !dir.is_dir() {
        return Err(ScanError::NotADirectory(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name().to_str()));
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if config.text_fallback || is_source(entry.path(), config) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn is_hidden(name: Option<&str>) -> bool {
    name.is_some_and(|name| name.starts_with('.'))
}

fn is_source(path: &Path, config: &ScanConfig) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| config.is_source_extension(ext))
}

fn load(path: &Path, scanner: &SourceScanner) -> Loaded {
    let skipped = |reason: String| {
        Loaded::Skipped(SkippedFile {
            path: path.to_path_buf(),
            reason,
        })
    };
    let FileText { text, lossy } = match read_file(path) {
        Ok(file) => file,
        Err(err) => return skipped(err.to_string()),
    };
    let name = path.to_string_lossy().into_owned();
    if is_source(path, scanner.config()) {
        let parse = scanner.parse(&name, &text);
        Loaded::Source {
            path: name,
            parse,
            lossy,
        }
    } else if lossy {
        skipped("binary file".to_string())
    } else {
        Loaded::Text { path: name, text }
    }
}

/// Create the artifact and scan every file under its roots.
pub fn scan_artifact(
    store: Arc<dyn GraphStore>,
    spec: &ArtifactSpec,
    config: &ScanConfig,
) -> Result<ArtifactReport, ScanError> {
    let scanner = SourceScanner::new(config.clone());
    scan_with(store, spec, &scanner)
}

fn scan_with(
    store: Arc<dyn GraphStore>,
    spec: &ArtifactSpec,
    scanner: &SourceScanner,
) -> Result<ArtifactReport, ScanError> {
    let mut files = Vec::new();
    for root in &spec.roots {
        files.extend(collect_files(root, scanner.config())?);
    }
    debug!(artifact = %spec.name, files = files.len(), "collected files");

    // Parse in parallel
    let loaded: Vec<Loaded> = files.par_iter().map(|path| load(path, scanner)).collect();

    let artifact = store.create_artifact(&spec.name, &spec.dependencies)?;
    let context = CompilationContext::new(artifact);
    let mut report = ArtifactReport {
        artifact,
        units: Vec::new(),
        text_files: Vec::new(),
        skipped: Vec::new(),
    };

    let mut stack = ScopeStack::new(store.clone());
    let mut scope = stack.enter(Some(&context))?;
    for loaded in loaded {
        match loaded {
            Loaded::Source { path, parse, lossy } => {
                let mut unit = scanner.scan_parsed(&mut scope, Some(&context), &path, &parse)?;
                if lossy {
                    warn!(path = %unit.path, "source is not valid UTF-8");
                    unit.note_lossy_decoding();
                }
                if unit.may_not_compile {
                    warn!(path = %unit.path, "source has syntax errors");
                }
                report.units.push(unit);
            }
            Loaded::Text { path, text } => {
                report.text_files.push(scanner.scan_text(&*store, &path, &text)?);
            }
            Loaded::Skipped(file) => {
                warn!(path = %file.path.display(), reason = %file.reason, "skipped file");
                report.skipped.push(file);
            }
        }
    }
    scope.exit()?;

    info!(
        artifact = %spec.name,
        units = report.units.len(),
        text_files = report.text_files.len(),
        skipped = report.skipped.len(),
        errors = report.error_count(),
        "scanned artifact"
    );
    Ok(report)
}

/// Scan independent artifacts in parallel. Results are in `specs` order.
pub fn scan_artifacts_parallel(
    store: Arc<dyn GraphStore>,
    specs: &[ArtifactSpec],
    config: &ScanConfig,
) -> Vec<Result<ArtifactReport, ScanError>> {
    let scanner = SourceScanner::new(config.clone());
    specs
        .par_iter()
        .map(|spec| scan_with(store.clone(), spec, &scanner))
        .collect()
}
