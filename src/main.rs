use anyhow::{Result, bail};
use clap::Parser;
use colored::Colorize;
use std::env;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

use stencil::cli::{Cli, DEFAULT_EXPANDER};
use stencil::vfs::LayeredFs;
use stencil::walk::{Output, Walker};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("{} {e:#}", "stencil:".red().bold());
            process::exit(1);
        }
    }
}

/// Returns `Ok(true)` on full success and `Ok(false)` when errors were
/// suppressed by `--keep-going` (already reported on stderr).
fn run() -> Result<bool> {
    let cli = Cli::parse();

    if cli.expander != DEFAULT_EXPANDER {
        bail!("unknown expander '{}'", cli.expander);
    }
    if cli.input.is_empty() {
        bail!("input path must not be empty");
    }

    let mut roots: Vec<PathBuf> = env::split_paths(&cli.input).collect();
    let mut build_path = cli.path;

    // A single file as INPUT-PATH without --path builds just that file,
    // relative to the current directory.
    if build_path.is_none() && roots.len() == 1 && roots[0].is_file() {
        build_path = Some(roots[0].clone());
        roots[0] = env::current_dir()?;
    }

    let fs = LayeredFs::new(roots)?;
    let output = if cli.output == Path::new("-") {
        Output::Stdout
    } else {
        Output::Path(cli.output)
    };

    let mut walker = Walker::new(&fs, build_path.unwrap_or_default(), output, cli.keep_going)?;
    walker.run()?;

    for failure in walker.failures() {
        eprintln!(
            "{} {}: {}",
            "stencil:".red().bold(),
            failure.path.display(),
            failure.error
        );
    }
    Ok(walker.failures().is_empty())
}
