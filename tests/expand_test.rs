//! End-to-end expansion runs through the binary.

mod common;

use anyhow::Result;
use assert_cmd::Command;
use common::{input_path, listing, read, tree};
use predicates::prelude::*;
use tempfile::TempDir;

fn stencil() -> Command {
    Command::cargo_bin("stencil").unwrap()
}

#[test]
fn hello_world_site() -> Result<()> {
    let input = tree(&[
        ("site/index.nancy.html", "Hello $include{name}"),
        ("site/name", "World"),
    ]);
    let out = TempDir::new()?;
    let out_dir = out.path().join("output");

    stencil()
        .arg(input.path())
        .arg(&out_dir)
        .assert()
        .success();

    assert_eq!(read(&out_dir.join("site/index.html")), "Hello World");
    assert_eq!(
        listing(&out_dir),
        ["site/index.html", "site/name"]
    );
    Ok(())
}

#[test]
fn macro_free_templates_pass_through_unchanged() -> Result<()> {
    let body = "plain text\nwith {braces}, $1 dollars and\\backslashes\n";
    let input = tree(&[("page.nancy.txt", body)]);
    let out = TempDir::new()?;
    let out_dir = out.path().join("output");

    stencil()
        .arg(input.path())
        .arg(&out_dir)
        .assert()
        .success();

    assert_eq!(read(&out_dir.join("page.txt")), body);
    Ok(())
}

#[test]
fn paste_round_trips_macro_syntax() -> Result<()> {
    let input = tree(&[
        ("page.nancy.txt", "$paste{frag}"),
        ("frag", "$include{name} and $root stay verbatim\n"),
    ]);
    let out = TempDir::new()?;
    let out_dir = out.path().join("output");

    stencil()
        .arg(input.path())
        .arg(&out_dir)
        .assert()
        .success();

    assert_eq!(
        read(&out_dir.join("page.txt")),
        "$include{name} and $root stay verbatim"
    );
    Ok(())
}

#[test]
fn escaping_suppresses_the_call_but_not_the_arguments() -> Result<()> {
    let input = tree(&[("page.nancy.txt", "\\$include{$path}"), ("sub/.keep", "")]);
    let out = TempDir::new()?;
    let out_dir = out.path().join("output");

    stencil()
        .arg(input.path())
        .arg(&out_dir)
        .assert()
        .success();

    assert_eq!(read(&out_dir.join("page.txt")), "$include{}");
    Ok(())
}

#[test]
fn ancestor_search_reaches_the_root() -> Result<()> {
    let input = tree(&[
        ("sub/page.nancy.html", "$include{header}!"),
        ("header", "from the top"),
    ]);
    let out = TempDir::new()?;
    let out_dir = out.path().join("output");

    stencil()
        .arg(input.path())
        .arg(&out_dir)
        .assert()
        .success();

    assert_eq!(read(&out_dir.join("sub/page.html")), "from the top!");
    Ok(())
}

#[test]
fn layered_inputs_merge_first_root_wins() -> Result<()> {
    let high = tree(&[("page.nancy.txt", "$include{greeting}")]);
    let low = tree(&[
        ("greeting", "from below"),
        ("page.nancy.txt", "shadowed, never built"),
        ("extra.txt", "copied from the lower layer"),
    ]);
    let out = TempDir::new()?;
    let out_dir = out.path().join("output");

    stencil()
        .arg(input_path(&[high.path(), low.path()]))
        .arg(&out_dir)
        .assert()
        .success();

    assert_eq!(read(&out_dir.join("page.txt")), "from below");
    assert_eq!(read(&out_dir.join("extra.txt")), "copied from the lower layer");
    Ok(())
}

#[test]
fn self_include_falls_through_to_the_lower_layer() -> Result<()> {
    let high = tree(&[("tmpl.nancy", "$include{tmpl}")]);
    let low = tree(&[("tmpl.nancy", "B-content")]);
    let out = TempDir::new()?;
    let out_dir = out.path().join("output");

    stencil()
        .arg(input_path(&[high.path(), low.path()]))
        .arg(&out_dir)
        .assert()
        .success();

    assert_eq!(read(&out_dir.join("tmpl")), "B-content");
    Ok(())
}

#[test]
fn unbalanced_braces_fail_the_build() -> Result<()> {
    let input = tree(&[("page.nancy.txt", "$include{a{b}")]);
    let out = TempDir::new()?;

    stencil()
        .arg(input.path())
        .arg(out.path().join("output"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing close brace"));
    Ok(())
}

#[test]
fn no_copy_files_are_left_out() -> Result<()> {
    let input = tree(&[
        ("fragment.in.html", "never copied"),
        ("page.nancy.html", "$include{fragment.in.html}"),
    ]);
    let out = TempDir::new()?;
    let out_dir = out.path().join("output");

    stencil()
        .arg(input.path())
        .arg(&out_dir)
        .assert()
        .success();

    assert_eq!(read(&out_dir.join("page.html")), "never copied");
    assert_eq!(listing(&out_dir), ["page.html"]);
    Ok(())
}

#[test]
fn build_path_selects_a_subtree() -> Result<()> {
    let input = tree(&[
        ("shared/name", "World"),
        ("site/index.nancy.html", "Hello $include{shared/name}"),
        ("notes/scratch.txt", "not built"),
    ]);
    let out = TempDir::new()?;
    let out_dir = out.path().join("output");

    stencil()
        .args(["--path", "site"])
        .arg(input.path())
        .arg(&out_dir)
        .assert()
        .success();

    assert_eq!(read(&out_dir.join("index.html")), "Hello World");
    assert_eq!(listing(&out_dir), ["index.html"]);
    Ok(())
}

#[cfg(unix)]
#[test]
fn executable_fragments_are_run() -> Result<()> {
    let input = tree(&[("page.nancy.txt", "$include{now,--utc}")]);
    common::script(
        input.path(),
        "now",
        "#!/bin/sh\necho \"args: $*\"\n",
    );
    let out = TempDir::new()?;
    let out_dir = out.path().join("output");

    stencil()
        .arg(input.path())
        .arg(&out_dir)
        .assert()
        .success();

    assert_eq!(read(&out_dir.join("page.txt")), "args: --utc");
    Ok(())
}
