#![warn(missing_docs)]

//! # Stencil - Directory-Tree Template Expander
//!
//! Stencil takes a layered set of input directories, walks a chosen
//! subtree, and for files marked as templates recursively expands an
//! embedded macro language (file inclusion, verbatim paste, path
//! introspection) before writing results to an output tree; non-template
//! files are copied or skipped according to naming convention.
//!
//! ## Architecture
//!
//! - [`vfs`]: layered read-only filesystem merging the input roots
//! - [`names`]: filename conventions (template and no-copy markers)
//! - [`resolve`]: ancestor-walk search for macro leaf names
//! - [`expand`]: the macro expansion engine
//! - [`walk`]: the tree walker driving expansion, copying and skipping
//! - [`error`]: error kinds shared by all of the above
//! - [`cli`]: command-line argument definitions
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::path::PathBuf;
//! use stencil::{LayeredFs, Output, Walker};
//!
//! # fn main() -> stencil::Result<()> {
//! let fs = LayeredFs::new(vec![PathBuf::from("site")])?;
//! let mut walker = Walker::new(
//!     &fs,
//!     PathBuf::new(),
//!     Output::Path(PathBuf::from("public")),
//!     false,
//! )?;
//! walker.run()?;
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Error kinds for expansion runs.
pub mod error;

/// The macro expansion engine.
pub mod expand;

/// Filename conventions for templates and no-copy files.
pub mod names;

/// Leaf-name resolution for macro arguments.
pub mod resolve;

/// Layered read-only filesystem over the input roots.
pub mod vfs;

/// Tree walking and output policy.
pub mod walk;

pub use error::{Error, Result};
pub use vfs::LayeredFs;
pub use walk::{Output, Walker};

/// Current version of the stencil binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
