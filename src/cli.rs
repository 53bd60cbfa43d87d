//! Command-line interface definitions.
//!
//! The argument parsing structures live here so that both the main binary
//! and build tooling (man page generation in xtask) can use them.
//!
//! Note: Field-level documentation doubles as clap help text, so we allow
//! missing_docs for this module to avoid redundant documentation.

#![allow(missing_docs)]

use clap::Parser;
use std::path::PathBuf;

/// Name of the default macro front end.
pub const DEFAULT_EXPANDER: &str = "text";

/// Main CLI structure for stencil.
#[derive(Parser)]
#[command(
    name = "stencil",
    version = crate::VERSION,
    about = "A simple templating system",
    long_about = "A simple templating system: expands a tree of templates against a \
                  layered set of input directories.",
    after_help = "The INPUT-PATH is a list of directories separated by the platform path \
                  separator; the directories are merged, with the contents of each \
                  directory taking precedence over any directories to its right."
)]
pub struct Cli {
    /// List of input directories, or a single file
    #[arg(value_name = "INPUT-PATH")]
    pub input: String,

    /// Output directory, or file ('-' for stdout)
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Path to build, relative to the input tree [default: the whole tree]
    #[arg(long, value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Do not stop on the first error
    #[arg(long)]
    pub keep_going: bool,

    /// Macro syntax front end to use
    #[arg(long, value_name = "NAME", default_value = DEFAULT_EXPANDER)]
    pub expander: String,
}
