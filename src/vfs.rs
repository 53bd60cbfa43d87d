//! Layered read-only view over an ordered list of input directories.
//!
//! The layers merge first-root-wins: a virtual path is looked up in each
//! root in priority order, and directory listings are the union of every
//! layer's entries with higher-priority layers shadowing lower ones.
//! Absolute paths fall through to the real filesystem, which acts as the
//! final layer. The view is constructed once per run and never mutated.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::error::{Error, Result};

/// Kind of a merged directory entry, taken from the winning layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A subdirectory.
    Directory,
    /// A regular file.
    File,
    /// Anything else; the walker treats these as fatal.
    Other,
}

/// One entry of a merged directory listing.
#[derive(Debug, Clone)]
pub struct DirEntry {
    /// Entry name within its directory.
    pub name: String,
    /// Entry kind in the highest-priority layer that has it.
    pub kind: EntryKind,
}

/// What a virtual path resolves to across the layers.
#[derive(Debug, Clone)]
pub enum Object {
    /// A regular file, with the real path of the layer that won.
    File(PathBuf),
    /// A directory in at least one layer.
    Directory,
}

/// Priority-ordered merge of input directory roots.
#[derive(Debug, Clone)]
pub struct LayeredFs {
    /// Absolute roots, highest priority first.
    layers: Vec<PathBuf>,
}

impl LayeredFs {
    /// Builds a layered filesystem from the given roots, highest priority
    /// first. Roots are made absolute; each must be an existing directory.
    pub fn new(roots: Vec<PathBuf>) -> Result<Self> {
        if roots.is_empty() {
            return Err(Error::NoInputs);
        }
        let mut layers = Vec::with_capacity(roots.len());
        for root in roots {
            if root.as_os_str().is_empty() {
                return Err(Error::InputMissing(root));
            }
            let root = make_absolute(&root)?;
            if !root.exists() {
                return Err(Error::InputMissing(root));
            }
            if !root.is_dir() {
                return Err(Error::InputNotDirectory(root));
            }
            layers.push(root);
        }
        Ok(Self { layers })
    }

    /// The highest-priority root. All macro path computations are relative
    /// to this, never to any individual layer.
    #[must_use]
    pub fn input_root(&self) -> &Path {
        &self.layers[0]
    }

    /// Real-path candidates for `path`, one per layer where it exists,
    /// highest priority first. An absolute `path` falls through to the real
    /// filesystem untouched.
    pub fn candidates<'a>(&'a self, path: &'a Path) -> impl Iterator<Item = PathBuf> + 'a {
        let direct = path.is_absolute().then(|| path.to_path_buf());
        let layered = self
            .layers
            .iter()
            .filter(move |_| !path.is_absolute())
            .map(move |layer| layer.join(path));
        direct
            .into_iter()
            .chain(layered)
            .filter(|real| real.exists())
    }

    /// Whether any layer has `path`.
    #[must_use]
    pub fn exists(&self, path: &Path) -> bool {
        self.candidates(path).next().is_some()
    }

    /// The real path of the first layer holding `path` as a regular file.
    #[must_use]
    pub fn find_file(&self, path: &Path) -> Option<PathBuf> {
        self.candidates(path).find(|real| real.is_file())
    }

    /// Classifies `path` across the layers. A regular file in any layer
    /// wins; otherwise a directory in any layer; otherwise nothing. An
    /// existing entry of any other kind is an error.
    pub fn stat(&self, path: &Path) -> Result<Option<Object>> {
        let mut saw_dir = false;
        for real in self.candidates(path) {
            let meta = fs::metadata(&real)
                .map_err(Error::io(format!("cannot stat '{}'", real.display())))?;
            if meta.is_file() {
                trace!(path = %path.display(), real = %real.display(), "stat: file");
                return Ok(Some(Object::File(real)));
            }
            if meta.is_dir() {
                saw_dir = true;
            } else {
                return Err(Error::NotFileOrDirectory(real));
            }
        }
        Ok(saw_dir.then_some(Object::Directory))
    }

    /// Reads the winning layer's copy of the file at `path`.
    pub fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let real = self
            .find_file(path)
            .ok_or_else(|| Error::NoSuchObject(path.to_path_buf()))?;
        fs::read(&real).map_err(Error::io(format!("cannot read '{}'", real.display())))
    }

    /// Merged listing of the directory at `path`: the union of every
    /// layer's entries, keyed by name, higher-priority layers shadowing
    /// lower ones, in lexicographic name order.
    pub fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let mut merged: BTreeMap<String, EntryKind> = BTreeMap::new();
        // Lowest priority first, so higher layers overwrite.
        for real in self.candidates(path).collect::<Vec<_>>().into_iter().rev() {
            if !real.is_dir() {
                continue;
            }
            let entries = fs::read_dir(&real)
                .map_err(Error::io(format!("cannot list '{}'", real.display())))?;
            for entry in entries {
                let entry = entry
                    .map_err(Error::io(format!("cannot list '{}'", real.display())))?;
                let name = entry.file_name().to_string_lossy().into_owned();
                let kind = match fs::metadata(entry.path()) {
                    Ok(meta) if meta.is_dir() => EntryKind::Directory,
                    Ok(meta) if meta.is_file() => EntryKind::File,
                    _ => EntryKind::Other,
                };
                merged.insert(name, kind);
            }
        }
        Ok(merged
            .into_iter()
            .map(|(name, kind)| DirEntry { name, kind })
            .collect())
    }

    /// Whether the real file at `path` carries an execute permission bit.
    /// Off unix there is no such bit and the answer is always `false`.
    #[must_use]
    pub fn is_executable(path: &Path) -> bool {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::metadata(path).is_ok_and(|meta| meta.permissions().mode() & 0o111 != 0)
        }
        #[cfg(not(unix))]
        {
            let _ = path;
            false
        }
    }
}

/// Resolves a possibly-relative path against the current directory.
fn make_absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let current_dir = std::env::current_dir()
            .map_err(Error::io("cannot determine current directory"))?;
        Ok(current_dir.join(path))
    }
}
