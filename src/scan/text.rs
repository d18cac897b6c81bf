//! Plain-text fallback for files that are not Java source.

use tracing::debug;

use crate::graph::{GraphStore, GraphStoreExt, StoreError, TextFileId};

/// Store `text` as a text file node with one linked line node per line.
/// Line terminators are not part of the stored text; a trailing terminator
/// does not start an extra empty line.
pub fn scan_text(store: &dyn GraphStore, path: &str, text: &str) -> Result<TextFileId, StoreError> {
    let file = store.write(|graph| -> Result<TextFileId, StoreError> {
        let file = graph.add_text_file(path);
        for line in text.lines() {
            graph.add_line(file, line)?;
        }
        Ok(file)
    })??;
    debug!(path, lines = text.lines().count(), "stored text file");
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::MemoryStore;

    #[test]
    fn test_text_lines_are_numbered_and_linked() {
        let store = MemoryStore::new();
        let file = scan_text(&store, "README", "first\r\nsecond\n\nfourth\n").unwrap();

        let lines = store
            .read(|graph| {
                let file = graph.text_file(file).unwrap();
                file.lines
                    .iter()
                    .map(|&id| graph.line(id).unwrap().clone())
                    .collect::<Vec<_>>()
            })
            .unwrap();

        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["first", "second", "", "fourth"]);
        assert_eq!(lines[0].number, 0);
        assert_eq!(lines[3].number, 3);
        assert_eq!(lines[0].next, Some(lines[1].id));
        assert_eq!(lines[3].next, None);
    }

    #[test]
    fn test_empty_text_has_no_lines() {
        let store = MemoryStore::new();
        let file = scan_text(&store, "empty.txt", "").unwrap();

        let count = store.read(|graph| graph.text_file(file).unwrap().lines.len()).unwrap();
        assert_eq!(count, 0);
    }
}
