//! Stable file ids for scanned paths.

use indexmap::IndexMap;
use parking_lot::RwLock;
use smol_str::SmolStr;

use crate::base::FileId;

/// Assigns a [`FileId`] to each path the first time it is seen. Shared by
/// every scope, so ids are stable across artifacts and rescans.
#[derive(Debug, Default)]
pub struct FileSet {
    inner: RwLock<FileSetInner>,
}

#[derive(Debug, Default)]
struct FileSetInner {
    /// Insertion order is id order.
    paths: IndexMap<SmolStr, FileId>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the id for `path`.
    pub fn file_id(&self, path: &str) -> FileId {
        // Fast path: read lock
        if let Some(&id) = self.inner.read().paths.get(path) {
            return id;
        }

        let mut inner = self.inner.write();
        // Double-check
        if let Some(&id) = inner.paths.get(path) {
            return id;
        }
        let id = FileId::new(inner.paths.len() as u32);
        inner.paths.insert(path.into(), id);
        id
    }

    pub fn path(&self, file: FileId) -> Option<SmolStr> {
        self.inner
            .read()
            .paths
            .get_index(file.0 as usize)
            .map(|(path, _)| path.clone())
    }

    pub fn len(&self) -> usize {
        self.inner.read().paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
