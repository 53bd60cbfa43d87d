//! The macro expansion engine.
//!
//! Templates embed invocations of the form `$name` or `$name{arg,...}`.
//! Arguments may nest further invocations to any depth; braces inside an
//! argument list must balance. A leading backslash (`\$name{...}`)
//! suppresses the call itself while still expanding the arguments, which is
//! how an outer macro is quoted without losing the inner ones.
//!
//! Scanning is an explicit cursor loop over the buffer. Macro output is
//! spliced in and never rescanned; only `include` re-enters the engine, on
//! the included file's own content.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::resolve;
use crate::vfs::LayeredFs;

/// Expands the template at `real` (the winning layer's copy of `file`,
/// which is relative to the input root) and returns the result.
pub fn expand_file(fs: &LayeredFs, file: &Path, real: &Path) -> Result<String> {
    let text = fs::read_to_string(real)
        .map_err(Error::io(format!("cannot read '{}'", real.display())))?;
    let mut stack = vec![real.to_path_buf()];
    Expansion { fs, file }.expand(&text, &mut stack)
}

/// Expansion of one top-level template file.
///
/// `file` anchors `$path` and the resolution start directory for the whole
/// expansion; `include` recursion grows only the expand stack.
struct Expansion<'a> {
    fs: &'a LayeredFs,
    file: &'a Path,
}

impl Expansion<'_> {
    /// One full left-to-right pass over `text`, replacing each invocation
    /// with its result and resuming immediately after the replacement.
    fn expand(&self, text: &str, stack: &mut Vec<PathBuf>) -> Result<String> {
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        while let Some(inv) = next_invocation(text, cursor) {
            trace!(name = inv.name, escaped = inv.escaped, at = inv.start, "match");
            out.push_str(&text[cursor..inv.start]);
            let (raw, resume) = match argument_block(text, inv.after)? {
                Some((raw, resume)) => (Some(raw), resume),
                None => (None, inv.after),
            };
            let replacement = if inv.escaped {
                // The call is suppressed; the arguments are still expanded.
                match raw {
                    Some(raw) => format!("${}{{{}}}", inv.name, self.expand(raw, stack)?),
                    None => format!("${}", inv.name),
                }
            } else {
                let args = match raw {
                    Some(raw) => split_arguments(&self.expand(raw, stack)?),
                    None => Vec::new(),
                };
                self.invoke(inv.name, &args, stack)?
            };
            out.push_str(&replacement);
            cursor = resume;
        }
        out.push_str(&text[cursor..]);
        Ok(out)
    }

    /// Dispatches to the built-in macro table.
    fn invoke(&self, name: &str, args: &[String], stack: &mut Vec<PathBuf>) -> Result<String> {
        debug!(macro_ = name, ?args, "invoking");
        match name {
            "path" => Ok(self.dir().display().to_string()),
            "root" => Ok(self.fs.input_root().display().to_string()),
            "include" => {
                let (file, contents) = self.included_file("include", args, stack)?;
                stack.push(file);
                let expanded = self.expand(&contents, stack);
                stack.pop();
                Ok(strip_final_newline(expanded?))
            }
            "paste" => {
                let (_, contents) = self.included_file("paste", args, stack)?;
                Ok(strip_final_newline(contents))
            }
            _ => Err(Error::NoSuchMacro {
                name: name.to_string(),
            }),
        }
    }

    /// Shared front half of `include` and `paste`: check the arguments,
    /// resolve the leaf, and read or run it.
    fn included_file(
        &self,
        name: &str,
        args: &[String],
        stack: &[PathBuf],
    ) -> Result<(PathBuf, String)> {
        // A lone empty argument is what `$name{}` parses to; it counts as
        // no argument at all.
        if args.is_empty() || (args.len() == 1 && args[0].is_empty()) {
            return Err(Error::MacroArgs {
                name: name.to_string(),
            });
        }
        let file = resolve::resolve(self.fs, &args[0], self.dir(), stack, self.file)?;
        let contents = ContentSource::classify(&file).read(&args[1..])?;
        Ok((file, contents))
    }

    /// Directory of the file being expanded, relative to the input root.
    fn dir(&self) -> &Path {
        self.file.parent().unwrap_or_else(|| Path::new(""))
    }
}

/// How the body of a resolved leaf is obtained: executables are run and
/// their standard output captured, anything else is read as text. The
/// choice is made by the execute-permission bit, never by file extension.
enum ContentSource {
    Static(PathBuf),
    Executable(PathBuf),
}

impl ContentSource {
    fn classify(path: &Path) -> Self {
        if LayeredFs::is_executable(path) {
            Self::Executable(path.to_path_buf())
        } else {
            Self::Static(path.to_path_buf())
        }
    }

    fn read(&self, args: &[String]) -> Result<String> {
        match self {
            Self::Static(path) => fs::read_to_string(path)
                .map_err(Error::io(format!("cannot read '{}'", path.display()))),
            Self::Executable(path) => {
                debug!(program = %path.display(), ?args, "running");
                let program = path.display().to_string();
                let output = Command::new(path).args(args).output().map_err(|err| {
                    Error::Process {
                        program: program.clone(),
                        message: format!("could not be run: {err}"),
                    }
                })?;
                if !output.status.success() {
                    return Err(Error::Process {
                        program,
                        message: format!("failed ({})", output.status),
                    });
                }
                String::from_utf8(output.stdout).map_err(|_| Error::Process {
                    program,
                    message: "produced output that is not valid UTF-8".to_string(),
                })
            }
        }
    }
}

/// One `$name` occurrence found by the scanner.
struct Invocation<'t> {
    /// Span start, including the escaping backslash when present.
    start: usize,
    name: &'t str,
    /// Byte offset just past the identifier.
    after: usize,
    escaped: bool,
}

/// Finds the next invocation at or after `from`: an optional backslash,
/// `$`, then an identifier of at least two characters.
fn next_invocation(text: &str, from: usize) -> Option<Invocation<'_>> {
    let bytes = text.as_bytes();
    let mut at = from;
    while let Some(offset) = text[at..].find('$') {
        let dollar = at + offset;
        let name_len = identifier_len(&text[dollar + 1..]);
        if name_len >= 2 {
            let escaped = dollar > from && bytes[dollar - 1] == b'\\';
            return Some(Invocation {
                start: if escaped { dollar - 1 } else { dollar },
                name: &text[dollar + 1..dollar + 1 + name_len],
                after: dollar + 1 + name_len,
                escaped,
            });
        }
        at = dollar + 1;
    }
    None
}

/// Length in bytes of an identifier prefix of `s`: one ASCII letter, then
/// letters, digits or underscores.
fn identifier_len(s: &str) -> usize {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_alphabetic() => {}
        _ => return 0,
    }
    for (idx, c) in chars {
        if !(c.is_ascii_alphanumeric() || c == '_') {
            return idx;
        }
    }
    s.len()
}

/// Scans a balanced `{...}` block starting at `at`, if one starts there.
/// Returns the raw text between the braces and the offset just past the
/// close brace.
fn argument_block(text: &str, at: usize) -> Result<Option<(&str, usize)>> {
    if !text[at..].starts_with('{') {
        return Ok(None);
    }
    let mut depth = 0usize;
    for (offset, c) in text[at..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(Some((&text[at + 1..at + offset], at + offset + 1)));
                }
            }
            _ => {}
        }
    }
    Err(Error::MissingCloseBrace)
}

/// Splits an argument list on commas not preceded by a backslash and
/// unescapes `\,`. No other escape processing happens here. The empty
/// string yields a single empty argument.
fn split_arguments(text: &str) -> Vec<String> {
    let mut args = vec![String::new()];
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek() == Some(&',') {
            chars.next();
            args.last_mut().unwrap().push(',');
        } else if c == ',' {
            args.push(String::new());
        } else {
            args.last_mut().unwrap().push(c);
        }
    }
    args
}

/// Removes exactly one trailing newline, the conventional courtesy of
/// included files.
fn strip_final_newline(mut s: String) -> String {
    if s.ends_with('\n') {
        s.truncate(s.len() - 1);
    }
    s
}
