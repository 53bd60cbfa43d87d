//! Leaf-name resolution for macro arguments.
//!
//! A macro like `$include{header}` names its target by leaf, not by full
//! path. The search starts in the directory of the file being expanded and
//! walks ancestor directories toward the input root, so shared fragments can
//! sit high in the tree and be referenced by simple name from anywhere
//! below. Files already on the expand stack are skipped rather than
//! rejected, letting an identically named file further up the tree (or in a
//! lower-priority layer) stand in for a self-reference. When the tree has
//! nothing to offer, the system executable path is searched last.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::names;
use crate::vfs::LayeredFs;

/// Finds the real path of `leaf`, searched relative to `start_dir` (itself
/// relative to the input root). `current_file` only labels the error when
/// nothing is found.
pub fn resolve(
    fs: &LayeredFs,
    leaf: &str,
    start_dir: &Path,
    expand_stack: &[PathBuf],
    current_file: &Path,
) -> Result<PathBuf> {
    debug!(leaf, start = %start_dir.display(), "searching");
    let mut search: Vec<_> = start_dir.components().collect();
    loop {
        let prefix: PathBuf = search.iter().collect();
        if let Some(found) = acceptable(fs, &prefix.join(leaf), expand_stack) {
            debug!(leaf, found = %found.display(), "resolved in tree");
            return Ok(found);
        }
        // A leaf also matches its template-marked spelling, so an include
        // can name a template by its output name.
        if let Some(marked) = names::templated_path(&prefix.join(leaf))
            && let Some(found) = acceptable(fs, &marked, expand_stack)
        {
            debug!(leaf, found = %found.display(), "resolved as template");
            return Ok(found);
        }
        if search.pop().is_none() {
            break;
        }
    }
    match which::which(leaf) {
        Ok(exec) => {
            debug!(leaf, found = %exec.display(), "resolved on executable path");
            Ok(exec)
        }
        Err(_) => Err(Error::Resolve {
            leaf: leaf.to_string(),
            file: current_file.to_path_buf(),
        }),
    }
}

/// The first layer candidate for `rel` that is a regular file and is not
/// currently being expanded.
fn acceptable(fs: &LayeredFs, rel: &Path, expand_stack: &[PathBuf]) -> Option<PathBuf> {
    fs.candidates(rel)
        .find(|real| real.is_file() && !expand_stack.iter().any(|entry| entry == real))
}
