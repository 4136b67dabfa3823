//! Cross-reference extraction — `name(1)`-style citations in doc text.
//!
//! Every documentation string reachable from the module is walked as one
//! lazy sequence, whitespace-split, and matched against the manual citation
//! shape. The result feeds the SEE ALSO section.

use crate::model::{Func, Module, Type, Value};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static RE_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.:+-]+\(([0-9A-Za-z])\)$").unwrap());

/// Accepted manual-section codes: the numbered sections plus the
/// conventional letter sections (new, old, local, extensions, public).
fn valid_code(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, 'n' | 'o' | 'l' | 'x' | 'p')
}

/// Every documentation string reachable from the module, depth-first, as a
/// lazy single-pass sequence: extras, defect notes, the module doc, then
/// each declaration group in order with types flattened into their nested
/// members.
pub fn doc_strings<'a>(
    m: &'a Module,
    extras: &'a [String],
) -> impl Iterator<Item = &'a str> + 'a {
    extras
        .iter()
        .map(String::as_str)
        .chain(m.bugs.iter().map(String::as_str))
        .chain(std::iter::once(m.doc.as_str()))
        .chain(value_docs(&m.consts))
        .chain(m.types.iter().flat_map(type_docs))
        .chain(value_docs(&m.vars))
        .chain(func_docs(&m.funcs))
}

fn value_docs(vals: &[Value]) -> impl Iterator<Item = &str> {
    vals.iter().map(|v| v.doc.as_str())
}

fn func_docs(funcs: &[Func]) -> impl Iterator<Item = &str> {
    funcs.iter().map(|f| f.doc.as_str())
}

fn type_docs(t: &Type) -> impl Iterator<Item = &str> + '_ {
    std::iter::once(t.doc.as_str())
        .chain(value_docs(&t.consts))
        .chain(value_docs(&t.vars))
        .chain(func_docs(&t.funcs))
        .chain(func_docs(&t.methods))
}

/// Collect the page's citation list: deduplicated, sorted, never citing
/// the page itself.
pub fn find_refs(m: &Module, name: &str, section: &str, extras: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    seen.insert(format!("{}({})", name, section));
    let mut acc = Vec::new();
    for text in doc_strings(m, extras) {
        for word in text.split_whitespace() {
            let Some(caps) = RE_REF.captures(word) else {
                continue;
            };
            let Some(code) = caps.get(1).and_then(|c| c.as_str().chars().next()) else {
                continue;
            };
            if !valid_code(code) {
                continue;
            }
            if seen.insert(word.to_string()) {
                acc.push(word.to_string());
            }
        }
    }
    acc.sort();
    acc
}
