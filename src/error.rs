//! Error kinds raised while expanding a tree.
//!
//! Everything here is fatal to the file or subtree being processed; nothing
//! is retried. The walker either aborts on the first error or, under
//! `--keep-going`, records it and moves on to the next entry.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong during an expansion run.
#[derive(Debug, Error)]
pub enum Error {
    /// A macro argument list was opened but never closed.
    #[error("missing close brace")]
    MissingCloseBrace,

    /// A macro was invoked whose name is not in the built-in table.
    #[error("no such macro '${name}'")]
    NoSuchMacro {
        /// The unrecognized identifier.
        name: String,
    },

    /// `include` or `paste` was invoked without a usable leaf argument.
    #[error("${name} expects at least one argument")]
    MacroArgs {
        /// The macro that was short of arguments.
        name: String,
    },

    /// A leaf was found neither in any layer nor on the executable path.
    #[error("cannot find '{leaf}' while expanding '{}'", file.display())]
    Resolve {
        /// The leaf name that was searched for.
        leaf: String,
        /// The template being expanded when the search failed.
        file: PathBuf,
    },

    /// No input roots were given at all.
    #[error("at least one input must be given")]
    NoInputs,

    /// An input root given on the command line does not exist.
    #[error("input '{}' does not exist", .0.display())]
    InputMissing(PathBuf),

    /// An input root given on the command line is not a directory.
    #[error("input '{}' is not a directory", .0.display())]
    InputNotDirectory(PathBuf),

    /// The build path must stay relative to the input root.
    #[error("build path must be relative")]
    AbsoluteBuildPath,

    /// The build path names nothing in any input layer.
    #[error("'{}' matches no path in the inputs", .0.display())]
    NoSuchObject(PathBuf),

    /// Only a single built file can go to standard output.
    #[error("cannot output multiple files to stdout ('-')")]
    DirectoryToStdout,

    /// The walker met an entry that is neither a file nor a directory.
    #[error("'{}' is not a file or directory", .0.display())]
    NotFileOrDirectory(PathBuf),

    /// An executable content source failed to launch or exited non-zero.
    #[error("command '{program}' {message}")]
    Process {
        /// The program that was invoked.
        program: String,
        /// What happened to it.
        message: String,
    },

    /// An underlying filesystem operation failed.
    #[error("{message}: {source}")]
    Io {
        /// What was being attempted, naming the path involved.
        message: String,
        /// The originating I/O error.
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Builds a `map_err` closure that wraps an I/O error with a message
    /// naming the operation and path.
    pub fn io(message: impl Into<String>) -> impl FnOnce(io::Error) -> Self {
        let message = message.into();
        move |source| Self::Io { message, source }
    }
}
