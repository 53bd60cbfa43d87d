//! Tree walking: per-entry classification and output policy.
//!
//! The walker mirrors the build subtree into the output root, expanding
//! template files, copying ordinary files byte-for-byte, and skipping
//! no-copy files and dot-entries. Directories are visited before files, and
//! entries in lexicographic order, so runs are deterministic.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::expand;
use crate::names;
use crate::vfs::{EntryKind, LayeredFs, Object};

/// Where built files end up.
#[derive(Debug, Clone)]
pub enum Output {
    /// Mirror the build tree under this path. A single-file build writes
    /// straight to it.
    Path(PathBuf),
    /// Write a single built file to standard output.
    Stdout,
}

/// One failure recorded under `--keep-going`.
#[derive(Debug)]
pub struct Failure {
    /// The entry being processed when the error occurred.
    pub path: PathBuf,
    /// What went wrong.
    pub error: Error,
}

/// Drives expansion of a build subtree into the output root.
#[derive(Debug)]
pub struct Walker<'a> {
    fs: &'a LayeredFs,
    build_path: PathBuf,
    output: Output,
    keep_going: bool,
    failures: Vec<Failure>,
}

impl<'a> Walker<'a> {
    /// Creates a walker for `build_path` (relative to the input root).
    pub fn new(
        fs: &'a LayeredFs,
        build_path: PathBuf,
        output: Output,
        keep_going: bool,
    ) -> Result<Self> {
        if build_path.is_absolute() {
            return Err(Error::AbsoluteBuildPath);
        }
        Ok(Self {
            fs,
            build_path,
            output,
            keep_going,
            failures: Vec::new(),
        })
    }

    /// Expands the configured subtree. With `keep_going`, per-entry errors
    /// are recorded in [`Walker::failures`] instead of aborting the run.
    pub fn run(&mut self) -> Result<()> {
        let build_path = self.build_path.clone();
        self.process_path(&build_path)
    }

    /// Failures recorded so far.
    #[must_use]
    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    fn process_path(&mut self, rel: &Path) -> Result<()> {
        match self.fs.stat(rel)? {
            Some(Object::File(real)) => self.process_file(rel, &real),
            Some(Object::Directory) => self.process_dir(rel),
            None => Err(Error::NoSuchObject(rel.to_path_buf())),
        }
    }

    fn process_dir(&mut self, rel: &Path) -> Result<()> {
        let Some(out_dir) = self.output_path(rel) else {
            return Err(Error::DirectoryToStdout);
        };
        debug!(dir = %rel.display(), "entering directory");
        if out_dir.exists() {
            fs::remove_dir_all(&out_dir)
                .map_err(Error::io(format!("cannot empty '{}'", out_dir.display())))?;
        }
        fs::create_dir_all(&out_dir)
            .map_err(Error::io(format!("cannot create '{}'", out_dir.display())))?;

        let entries = self.fs.read_dir(rel)?;
        // Subdirectories first, then files; anything else is an error.
        for pass in [EntryKind::Directory, EntryKind::File, EntryKind::Other] {
            for entry in entries.iter().filter(|e| e.kind == pass) {
                if entry.name.starts_with('.') {
                    continue;
                }
                let child = rel.join(&entry.name);
                if let Err(error) = self.process_path(&child) {
                    if self.keep_going {
                        self.failures.push(Failure { path: child, error });
                    } else {
                        return Err(error);
                    }
                }
            }
        }
        Ok(())
    }

    fn process_file(&mut self, rel: &Path, real: &Path) -> Result<()> {
        let name = rel
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if names::is_template(&name) {
            debug!(template = %rel.display(), "expanding");
            let text = expand::expand_file(self.fs, rel, real)?;
            match self.output_path(rel) {
                Some(out) => fs::write(&out, text)
                    .map_err(Error::io(format!("cannot write '{}'", out.display())))?,
                None => write_stdout(text.as_bytes())?,
            }
        } else if names::is_no_copy(&name) {
            debug!(file = %rel.display(), "skipping");
        } else {
            match self.output_path(rel) {
                Some(out) => {
                    debug!(file = %rel.display(), to = %out.display(), "copying");
                    fs::copy(real, &out).map_err(Error::io(format!(
                        "cannot copy '{}' to '{}'",
                        real.display(),
                        out.display()
                    )))?;
                }
                None => {
                    let bytes = fs::read(real)
                        .map_err(Error::io(format!("cannot read '{}'", real.display())))?;
                    write_stdout(&bytes)?;
                }
            }
        }
        Ok(())
    }

    /// Rebases `rel` from the build path onto the output root, removing the
    /// template marker from the final component. `None` means stdout. When
    /// the rebased path is empty (a single-file build), the output root
    /// itself is the destination.
    fn output_path(&self, rel: &Path) -> Option<PathBuf> {
        let Output::Path(root) = &self.output else {
            return None;
        };
        let mut tail = rel
            .strip_prefix(&self.build_path)
            .unwrap_or(rel)
            .to_path_buf();
        if let Some(name) = tail.file_name().map(|n| n.to_string_lossy().into_owned())
            && let Some(stripped) = names::template_output_name(&name)
        {
            tail.set_file_name(stripped);
        }
        Some(if tail.as_os_str().is_empty() {
            root.clone()
        } else {
            root.join(tail)
        })
    }
}

/// Writes one built file to stdout.
fn write_stdout(bytes: &[u8]) -> Result<()> {
    let mut stdout = io::stdout();
    stdout
        .write_all(bytes)
        .and_then(|()| stdout.flush())
        .map_err(Error::io("cannot write to stdout"))
}
