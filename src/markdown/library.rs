use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::document::MarkdownDocument;
use crate::files::NotesFolder;

/// Loads, caches and saves the markdown notes of a [`NotesFolder`].
///
/// Documents stay cached once opened; `save` refreshes the cached copy.
/// Public operations log failures and report them as `None`/`false`.
#[derive(Debug)]
pub struct MarkdownLibrary {
    folder: NotesFolder,
    open_documents: HashMap<PathBuf, MarkdownDocument>,
}

impl MarkdownLibrary {
    pub fn new(folder: NotesFolder) -> Self {
        Self {
            folder,
            open_documents: HashMap::new(),
        }
    }

    pub const fn folder(&self) -> &NotesFolder {
        &self.folder
    }

    /// Resolves a relative path against the notes folder.
    ///
    /// Absolute paths and paths that exist relative to the working
    /// directory are used as given.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() || path.exists() {
            path.to_path_buf()
        } else {
            self.folder.root().join(path)
        }
    }

    /// Opens a document, serving it from the cache when already open.
    pub fn open(&mut self, path: &Path) -> Option<MarkdownDocument> {
        self.try_open(path)
            .inspect_err(|e| {
                tracing::error!(path = %path.display(), error = %format!("{e:#}"), "failed to open document");
            })
            .ok()
    }

    pub fn try_open(&mut self, path: &Path) -> Result<MarkdownDocument> {
        let path = self.resolve(path);
        if let Some(doc) = self.open_documents.get(&path) {
            return Ok(doc.clone());
        }

        let doc = load_document(&path)?;
        self.open_documents.insert(path, doc.clone());
        Ok(doc)
    }

    /// Writes the document and refreshes its cached copy.
    pub fn save(&mut self, doc: &MarkdownDocument) -> bool {
        self.try_save(doc)
            .inspect_err(|e| {
                tracing::error!(path = %doc.path.display(), error = %format!("{e:#}"), "failed to save document");
            })
            .is_ok()
    }

    pub fn try_save(&mut self, doc: &MarkdownDocument) -> Result<()> {
        crate::fs::atomic_write(&doc.path, &doc.content)?;

        let mut saved = doc.clone();
        saved.last_modified = SystemTime::now();
        self.open_documents.insert(saved.path.clone(), saved);
        Ok(())
    }

    /// Every markdown note whose content contains `query`, ignoring case.
    pub fn search(&mut self, query: &str) -> Vec<MarkdownDocument> {
        let Some(tree) = self.folder.tree() else {
            return Vec::new();
        };

        tree.markdown_files()
            .iter()
            .filter_map(|path| self.open(path))
            .filter(|doc| doc.contains_ignore_case(query))
            .collect()
    }

    /// Unique words of a note; empty when it cannot be opened.
    pub fn extract_words(&mut self, path: &Path) -> Vec<String> {
        self.open(path).map(|doc| doc.words()).unwrap_or_default()
    }

    /// The open documents, most recently modified first.
    pub fn recent(&self) -> Vec<&MarkdownDocument> {
        let mut docs: Vec<_> = self.open_documents.values().collect();
        docs.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
        docs
    }

    /// Drops a document from the cache.
    pub fn close(&mut self, path: &Path) -> bool {
        let path = self.resolve(path);
        self.open_documents.remove(&path).is_some()
    }
}

fn load_document(path: &Path) -> Result<MarkdownDocument> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read document: {}", path.display()))?;
    let last_modified = fs::metadata(path)
        .and_then(|m| m.modified())
        .with_context(|| format!("Failed to read modification time: {}", path.display()))?;

    Ok(MarkdownDocument::new(
        path.to_path_buf(),
        content,
        last_modified,
    ))
}
