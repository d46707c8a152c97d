//! Input reading from files and stdin.

mod reader;

pub use reader::{InputReader, MAX_INPUT_SIZE, read_limited};
