use predicates::prelude::*;
use std::io::Write;
use std::process::Command;
use tempfile::{NamedTempFile, TempDir};

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_docroff")))
}

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn render_fixture(name: &str, extra_args: &[&str]) -> String {
    let input = std::fs::read_to_string(fixture_path(name)).unwrap();
    let assert = cmd()
        .args(["--date", "2026-02-03"])
        .args(extra_args)
        .write_stdin(input)
        .assert()
        .success();
    String::from_utf8(assert.get_output().stdout.clone()).unwrap()
}

fn section_order(page: &str) -> Vec<String> {
    page.lines()
        .filter_map(|l| l.strip_prefix(".SH \""))
        .map(|l| l.trim_end_matches('"').to_string())
        .collect()
}

// -- stdin mode --

#[test]
fn stdin_mode_produces_expected_page() {
    let expected = std::fs::read_to_string(fixture_path("basic.expected.3")).unwrap();
    let output = render_fixture("basic.json", &[]);
    assert_eq!(output, expected);
}

#[test]
fn header_picks_up_version_constant() {
    let output = render_fixture("ringbuf.json", &[]);
    assert!(output
        .contains(".TH \"ringbuf\" 3 \"2026-02-03\" \"version 2.1.0\" \"Modules\""));
}

#[test]
fn name_line_uses_first_sentence() {
    let output = render_fixture("ringbuf.json", &[]);
    assert!(output.contains("ringbuf \\- Package ringbuf implements a fixed\\-size ring buffer."));
    // two-sentence preamble stays in the body too
    assert!(output.contains(".SH \"DESCRIPTION\""));
}

#[test]
fn synopsis_quotes_the_import_path() {
    let output = render_fixture("ringbuf.json", &[]);
    assert!(output.contains(".B import ringbuf \\*(lqexample.com/ringbuf\\*(rq"));
}

#[test]
fn code_block_is_not_refilled() {
    let output = render_fixture("ringbuf.json", &[]);
    assert!(output.contains(".nf"));
    assert!(output.contains("    var b ringbuf.Buffer"));
}

#[test]
fn diagnostics_comes_before_entity_sections() {
    let output = render_fixture("ringbuf.json", &[]);
    let order = section_order(&output);
    let diag = order.iter().position(|s| s == "DIAGNOSTICS").unwrap();
    let consts = order.iter().position(|s| s == "CONSTANTS").unwrap();
    assert!(diag < consts, "section order: {:?}", order);
}

#[test]
fn variadic_function_signature() {
    let output = render_fixture("ringbuf.json", &[]);
    assert!(output.contains(".BR \"func Join(\" bufs \" ...*Buffer) *Buffer\""));
}

#[test]
fn unexported_function_is_hidden() {
    let output = render_fixture("ringbuf.json", &[]);
    assert!(!output.contains("internalHelper"));
}

#[test]
fn struct_and_interface_bodies_suppress_unexported_members() {
    let output = render_fixture("ringbuf.json", &[]);
    assert!(output.contains(".SS \"Buffer\""));
    assert!(output.contains("Cap int"));
    assert!(!output.contains("data"));
    assert!(output.contains("//contains unexported fields."));
    assert!(output.contains(".SS \"Sink\""));
    assert!(output.contains("Write(p []byte) (int, error)"));
    assert!(output.contains("//contains unexported methods."));
}

#[test]
fn method_renders_with_receiver() {
    let output = render_fixture("ringbuf.json", &[]);
    assert!(output.contains(".BR \"func (*Buffer) Put(\" p \" []byte) int\""));
}

#[test]
fn see_also_is_sorted_and_bugs_are_listed() {
    let output = render_fixture("ringbuf.json", &[]);
    assert!(output.contains("Sealing is not concurrency safe"));
    let flock = output.find(".BR flock (2),").unwrap();
    let mmap = output.find(".BR mmap (2),").unwrap();
    let pipe = output.find(".BR pipe (7)").unwrap();
    assert!(flock < mmap && mmap < pipe);
}

#[test]
fn history_closes_the_page() {
    let output = render_fixture("ringbuf.json", &[]);
    let order = section_order(&output);
    assert_eq!(order.last().map(String::as_str), Some("HISTORY"));
    let see_also = order.iter().position(|s| s == "SEE ALSO").unwrap();
    let history = order.iter().position(|s| s == "HISTORY").unwrap();
    assert!(see_also < history);
}

#[test]
fn no_section_is_emitted_twice() {
    let output = render_fixture("ringbuf.json", &[]);
    let mut order = section_order(&output);
    let len = order.len();
    order.sort();
    order.dedup();
    assert_eq!(order.len(), len);
}

// -- override sections --

#[test]
fn override_section_wins_and_lands_in_canonical_slot() {
    let mut sec = NamedTempFile::new().unwrap();
    sec.write_all(b"Everything lives under /var/pkg today.\n")
        .unwrap();
    let arg = format!("FILES={}", sec.path().display());

    let output = render_fixture("basic.json", &["-s", &arg]);
    assert!(output.contains(".SH \"FILES\""));
    assert!(output.contains("Everything lives under /var/pkg today."));
    let order = section_order(&output);
    let files = order.iter().position(|s| s == "FILES").unwrap();
    let funcs = order.iter().position(|s| s == "FUNCTIONS").unwrap();
    assert!(files < funcs, "section order: {:?}", order);
}

#[test]
fn unknown_override_is_emitted_after_entities() {
    let mut sec = NamedTempFile::new().unwrap();
    sec.write_all(b"Ask the mailing list.\n").unwrap();
    let arg = format!("SUPPORT={}", sec.path().display());

    let output = render_fixture("basic.json", &["-s", &arg]);
    let order = section_order(&output);
    let support = order.iter().position(|s| s == "SUPPORT").unwrap();
    let funcs = order.iter().position(|s| s == "FUNCTIONS").unwrap();
    assert!(funcs < support, "section order: {:?}", order);
}

#[test]
fn malformed_override_flag_fails() {
    cmd()
        .args(["-s", "FILESmissing-equals"])
        .write_stdin("{\"name\": \"pkg\"}")
        .assert()
        .failure()
        .stderr(predicate::str::contains("bad --section value"));
}

// -- file mode --

#[test]
fn file_mode_writes_named_page() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["--date", "2026-02-03"])
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("basic.json"))
        .assert()
        .success();

    let output = std::fs::read_to_string(dir.path().join("pkg.3")).unwrap();
    let expected = std::fs::read_to_string(fixture_path("basic.expected.3")).unwrap();
    assert_eq!(output, expected);
}

#[test]
fn file_mode_requires_output() {
    cmd()
        .arg(fixture_path("basic.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output is required"));
}

#[test]
fn file_mode_skips_unparseable_input() {
    let dir = TempDir::new().unwrap();
    let mut bad = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    bad.write_all(b"not json at all").unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(bad.path().to_str().unwrap())
        .arg(fixture_path("basic.json"))
        .assert()
        .success()
        .stderr(predicate::str::contains("warning: skipping"));

    assert!(dir.path().join("pkg.3").exists());
}

#[test]
fn invalid_module_description_fails_in_stdin_mode() {
    cmd()
        .write_stdin("not json at all")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse module description"));
}
