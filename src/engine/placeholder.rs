//! engine::placeholder
//!
//! The stand-in text written over a locked file.
//!
//! A placeholder starts with [`PLACEHOLDER_PREFIX`] and tells the reader how
//! to ask for access. Recognition is strict: a file is a placeholder for a
//! path only if its length equals the generated text for that path and it
//! starts with the prefix. Anything appended, truncated, or rewritten is
//! treated as user data.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::core::types::RelPath;

/// Literal token every placeholder starts with.
pub const PLACEHOLDER_PREFIX: &str = "[linkvault:protected]";

/// Generate the placeholder text for `rel`.
pub fn render(rel: &RelPath) -> String {
    format!(
        "{prefix} This file is protected by linkvault.\n\
         To view its contents, ask the user to run:\n\
         \n    linkvault unlock {rel}\n\
         \n\
         Do NOT attempt to modify or bypass this file.\n",
        prefix = PLACEHOLDER_PREFIX,
        rel = rel
    )
}

/// Check whether the regular file at `path` is the untouched placeholder for `rel`.
pub fn is_placeholder(path: &Path, rel: &RelPath) -> io::Result<bool> {
    let expected_len = render(rel).len() as u64;
    let mut file = File::open(path)?;
    if file.metadata()?.len() != expected_len {
        return Ok(false);
    }
    starts_with_prefix(&mut file)
}

/// Check whether the file at `path` begins with the placeholder prefix.
pub fn has_prefix(path: &Path) -> io::Result<bool> {
    starts_with_prefix(&mut File::open(path)?)
}

fn starts_with_prefix<R: Read>(reader: &mut R) -> io::Result<bool> {
    let mut buf = Vec::with_capacity(PLACEHOLDER_PREFIX.len());
    reader
        .take(PLACEHOLDER_PREFIX.len() as u64)
        .read_to_end(&mut buf)?;
    Ok(buf == PLACEHOLDER_PREFIX.as_bytes())
}
