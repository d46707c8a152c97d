//! The notes folder and its file tree.

mod tree;

pub use tree::{FileNode, NotesFolder, build_tree};
