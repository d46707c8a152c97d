use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::Path;

use crate::files::{FileNode, NotesFolder};
use crate::markdown::MarkdownLibrary;
use crate::ui::Style;

pub fn run_tree(json: bool) -> Result<()> {
    let folder = NotesFolder::open_default()?;
    let tree = folder
        .tree()
        .with_context(|| format!("Failed to read notes folder: {}", folder.root().display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
    } else {
        print!("{}", render_tree(&tree));
    }

    Ok(())
}

pub fn run_open(file: &str) -> Result<()> {
    let mut library = MarkdownLibrary::new(NotesFolder::open_default()?);
    let doc = library.try_open(Path::new(file))?;

    if let Some(title) = &doc.metadata.title {
        crate::status!("{} {}", Style::label("title"), Style::value(title));
    }
    for (key, value) in &doc.metadata.fields {
        crate::status!("{} {}", Style::label(key), Style::secondary(value));
    }
    if !doc.metadata.fields.is_empty() || doc.metadata.title.is_some() {
        crate::status!();
    }

    print!("{}", doc.content);
    if !doc.content.ends_with('\n') {
        println!();
    }

    Ok(())
}

pub fn run_search(query: &str) -> Result<()> {
    let mut library = MarkdownLibrary::new(NotesFolder::open_default()?);
    let results = library.search(query);

    if results.is_empty() {
        crate::status!("No notes contain \"{query}\"");
        return Ok(());
    }

    let root = library.folder().root().to_path_buf();
    for doc in results {
        let path = doc.path.strip_prefix(&root).unwrap_or(&doc.path);
        match &doc.metadata.title {
            Some(title) => println!("{}  {}", path.display(), Style::secondary(title)),
            None => println!("{}", path.display()),
        }
    }

    Ok(())
}

pub fn run_words(file: &str) -> Result<()> {
    let mut library = MarkdownLibrary::new(NotesFolder::open_default()?);
    let doc = library.try_open(Path::new(file))?;

    for word in doc.words() {
        println!("{word}");
    }

    Ok(())
}

/// Renders the tree with box-drawing guides, one entry per line.
pub fn render_tree(root: &FileNode) -> String {
    let mut out = format!("{}\n", root.path().display());
    if let FileNode::Folder { children, .. } = root {
        render_children(children, "", &mut out);
    }
    out
}

fn render_children(children: &[FileNode], prefix: &str, out: &mut String) {
    for (i, child) in children.iter().enumerate() {
        let last = i + 1 == children.len();
        let branch = if last { "└── " } else { "├── " };
        let name = if child.is_folder() {
            format!("{}/", child.name())
        } else {
            child.name().to_string()
        };
        let _ = writeln!(out, "{prefix}{branch}{name}");

        if let FileNode::Folder { children, .. } = child {
            let nested = format!("{prefix}{}", if last { "    " } else { "│   " });
            render_children(children, &nested, out);
        }
    }
}
