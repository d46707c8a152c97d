use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths;

/// A node of the notes folder tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FileNode {
    File {
        name: String,
        path: PathBuf,
        /// Extension without the leading dot; empty when there is none.
        extension: String,
    },
    Folder {
        name: String,
        path: PathBuf,
        children: Vec<FileNode>,
    },
}

impl FileNode {
    pub fn name(&self) -> &str {
        match self {
            Self::File { name, .. } | Self::Folder { name, .. } => name,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::File { path, .. } | Self::Folder { path, .. } => path,
        }
    }

    pub const fn is_folder(&self) -> bool {
        matches!(self, Self::Folder { .. })
    }

    /// Paths of every `.md` / `.markdown` file below this node, in tree order.
    pub fn markdown_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        self.collect_markdown(&mut files);
        files
    }

    fn collect_markdown(&self, files: &mut Vec<PathBuf>) {
        match self {
            Self::File { name, path, .. } => {
                if name.ends_with(".md") || name.ends_with(".markdown") {
                    files.push(path.clone());
                }
            }
            Self::Folder { children, .. } => {
                for child in children {
                    child.collect_markdown(files);
                }
            }
        }
    }
}

/// Builds the tree rooted at `root`.
///
/// Hidden entries (names starting with `.`) are skipped. Children are sorted
/// folders first, then files, each alphabetically.
pub fn build_tree(root: &Path) -> Result<FileNode> {
    let metadata = fs::metadata(root)
        .with_context(|| format!("Failed to access folder: {}", root.display()))?;
    if !metadata.is_dir() {
        bail!("Path is not a directory: {}", root.display());
    }

    let mut children = Vec::new();
    let entries =
        fs::read_dir(root).with_context(|| format!("Failed to read folder: {}", root.display()))?;

    for entry in entries {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }

        let path = entry.path();
        if fs::metadata(&path)
            .with_context(|| format!("Failed to access entry: {}", path.display()))?
            .is_dir()
        {
            children.push(build_tree(&path)?);
        } else {
            let extension = path
                .extension()
                .map(|ext| ext.to_string_lossy().to_string())
                .unwrap_or_default();
            children.push(FileNode::File {
                name,
                path,
                extension,
            });
        }
    }

    children.sort_by(compare_nodes);

    Ok(FileNode::Folder {
        name: folder_name(root),
        path: root.to_path_buf(),
        children,
    })
}

fn compare_nodes(a: &FileNode, b: &FileNode) -> Ordering {
    b.is_folder()
        .cmp(&a.is_folder())
        .then_with(|| a.name().to_lowercase().cmp(&b.name().to_lowercase()))
        .then_with(|| a.name().cmp(b.name()))
}

fn folder_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().to_string(),
    )
}

/// The folder that holds the user's notes.
#[derive(Debug, Clone)]
pub struct NotesFolder {
    root: PathBuf,
}

impl NotesFolder {
    /// Opens the default notes folder, creating it if needed.
    pub fn open_default() -> Result<Self> {
        Self::open(paths::notes_dir()?)
    }

    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.exists() {
            fs::create_dir_all(&root)
                .with_context(|| format!("Failed to create notes folder: {}", root.display()))?;
            tracing::info!(path = %root.display(), "created notes folder");
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The whole folder tree; failures are logged and yield `None`.
    pub fn tree(&self) -> Option<FileNode> {
        build_tree(&self.root)
            .inspect_err(|e| {
                tracing::error!(error = %format!("{e:#}"), "failed to build folder tree");
            })
            .ok()
    }
}
