//! Filename conventions that drive the walker's per-entry decisions.
//!
//! A marker is an infix token recognized either immediately before the final
//! extension (`index.nancy.html`) or at the very end of the name
//! (`header.nancy`). Template classification wins over no-copy: the no-copy
//! check only runs once the template check has failed.

use std::path::{Path, PathBuf};

/// Token flagging a file for macro expansion.
pub const TEMPLATE_MARKER: &str = ".nancy";

/// Token flagging a file to be excluded from the output tree.
pub const NO_COPY_MARKER: &str = ".in";

/// Strips `marker` from `name` if it appears in marker position.
fn strip_marker(name: &str, marker: &str) -> Option<String> {
    if let Some(stem) = name.strip_suffix(marker) {
        return Some(stem.to_string());
    }
    // Marker immediately before the last extension.
    if let Some(dot) = name.rfind('.') {
        let (head, ext) = name.split_at(dot);
        if let Some(stem) = head.strip_suffix(marker) {
            return Some(format!("{stem}{ext}"));
        }
    }
    None
}

/// Whether `name` is flagged for macro expansion.
#[must_use]
pub fn is_template(name: &str) -> bool {
    strip_marker(name, TEMPLATE_MARKER).is_some()
}

/// The output name of a template, with the marker removed. `None` when
/// `name` is not a template.
#[must_use]
pub fn template_output_name(name: &str) -> Option<String> {
    strip_marker(name, TEMPLATE_MARKER)
}

/// Whether `name` is flagged to be left out of the output tree.
#[must_use]
pub fn is_no_copy(name: &str) -> bool {
    strip_marker(name, NO_COPY_MARKER).is_some()
}

/// The template-marked spelling of a leaf name: `tmpl` becomes
/// `tmpl.nancy`, `page.html` becomes `page.nancy.html`.
#[must_use]
pub fn templated(name: &str) -> String {
    match name.rfind('.') {
        Some(dot) => {
            let (head, ext) = name.split_at(dot);
            format!("{head}{TEMPLATE_MARKER}{ext}")
        }
        None => format!("{name}{TEMPLATE_MARKER}"),
    }
}

/// [`templated`] applied to the final component of a relative path. `None`
/// when the path has no usable final component.
#[must_use]
pub fn templated_path(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    Some(path.with_file_name(templated(name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("index.nancy.html", true)]
    #[case("header.nancy", true)]
    #[case("index.html", false)]
    #[case("nancy.html", false)]
    #[case("index.nancy.min.html", false)]
    #[case("granancy.html", false)]
    fn template_detection(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_template(name), expected);
    }

    #[rstest]
    #[case("notes.in", true)]
    #[case("fragment.in.html", true)]
    #[case("main.rs", false)]
    #[case("fin.html", false)]
    #[case("a.in.b.html", false)]
    fn no_copy_detection(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_no_copy(name), expected);
    }

    #[test]
    fn output_name_drops_only_the_marker() {
        assert_eq!(
            template_output_name("index.nancy.html").as_deref(),
            Some("index.html")
        );
        assert_eq!(
            template_output_name("header.nancy").as_deref(),
            Some("header")
        );
        assert_eq!(template_output_name("plain.html"), None);
    }

    #[test]
    fn templated_inserts_before_last_extension() {
        assert_eq!(templated("tmpl"), "tmpl.nancy");
        assert_eq!(templated("page.html"), "page.nancy.html");
        assert_eq!(templated("a.b.c"), "a.b.nancy.c");
    }

    #[test]
    fn templated_path_keeps_the_directory() {
        assert_eq!(
            templated_path(Path::new("sub/page.html")),
            Some(PathBuf::from("sub/page.nancy.html"))
        );
        assert_eq!(templated_path(Path::new("")), None);
    }
}
