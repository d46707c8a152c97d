use anyhow::{Context, Result, bail};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Largest text accepted for translation.
pub const MAX_INPUT_SIZE: usize = 1024 * 1024;

pub struct InputReader;

impl InputReader {
    /// Reads the file, or stdin when no file is given.
    pub fn read(file_path: Option<&str>) -> Result<String> {
        match file_path {
            Some(path) => Self::read_file(Path::new(path)),
            None => read_limited(io::stdin().lock(), "stdin"),
        }
    }

    fn read_file(path: &Path) -> Result<String> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open file: {}", path.display()))?;
        read_limited(file, &path.display().to_string())
    }
}

/// Reads UTF-8 text from `reader`, failing once it exceeds [`MAX_INPUT_SIZE`].
pub fn read_limited<R: Read>(reader: R, source: &str) -> Result<String> {
    let mut buffer = Vec::new();
    reader
        .take(MAX_INPUT_SIZE as u64 + 1)
        .read_to_end(&mut buffer)
        .with_context(|| format!("Failed to read from {source}"))?;

    if buffer.len() > MAX_INPUT_SIZE {
        bail!(
            "Error: Input from {source} exceeds the maximum allowed size (1 MB).\n\n\
             Consider splitting it into smaller parts."
        );
    }

    String::from_utf8(buffer).with_context(|| format!("Input from {source} is not valid UTF-8"))
}
