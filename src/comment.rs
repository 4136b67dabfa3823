//! Documentation comment normalization — paragraphs, sections, summaries.
//!
//! A raw comment block becomes an ordered list of named sections: blank
//! lines split paragraphs, fully indented blocks are kept verbatim as code,
//! and a short line without lower-case letters on its own ("HISTORY",
//! "IMPLEMENTATION NOTES") opens a new section. Everything before the first
//! such heading is the unnamed preamble.

use regex::Regex;
use std::sync::LazyLock;

/// A single short line, no lower-case letters, is a section heading.
static RE_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^a-z]{1,60}$").unwrap());

/// One unit of body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Paragraph {
    /// Fillable prose; troff re-flows it.
    Plain(String),
    /// Indented block preserved verbatim, emitted without re-filling.
    Code(String),
}

/// A named group of paragraphs. The preamble has the empty name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub paras: Vec<Paragraph>,
}

/// Split a comment block into paragraphs on blank lines. A block whose
/// every line is indented by a space or tab is a code paragraph.
pub fn paragraphs(text: &str) -> Vec<Paragraph> {
    let mut paras = Vec::new();
    let mut block: Vec<&str> = Vec::new();
    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            flush_block(&mut paras, &mut block);
        } else {
            block.push(line);
        }
    }
    flush_block(&mut paras, &mut block);
    paras
}

fn flush_block(paras: &mut Vec<Paragraph>, block: &mut Vec<&str>) {
    if block.is_empty() {
        return;
    }
    let indented = block
        .iter()
        .all(|l| l.starts_with(' ') || l.starts_with('\t'));
    if indented {
        paras.push(Paragraph::Code(block.join("\n")));
    } else {
        let joined = block
            .iter()
            .map(|l| l.trim())
            .collect::<Vec<_>>()
            .join("\n");
        paras.push(Paragraph::Plain(joined));
    }
    block.clear();
}

/// Group paragraphs into sections by heading detection. The unnamed
/// preamble section comes first when any text precedes the first heading.
pub fn sections(text: &str) -> Vec<Section> {
    let mut out: Vec<Section> = Vec::new();
    let mut cur = Section {
        name: String::new(),
        paras: Vec::new(),
    };
    for p in paragraphs(text) {
        if let Some(name) = heading(&p) {
            let name = name.to_string();
            if !cur.paras.is_empty() || !cur.name.is_empty() {
                out.push(cur);
            }
            cur = Section {
                name,
                paras: Vec::new(),
            };
        } else {
            cur.paras.push(p);
        }
    }
    if !cur.paras.is_empty() || !cur.name.is_empty() {
        out.push(cur);
    }
    out
}

fn heading(p: &Paragraph) -> Option<&str> {
    let Paragraph::Plain(text) = p else { return None };
    if text.contains('\n') {
        return None;
    }
    if RE_HEADING.is_match(text) && text.chars().any(|c| c.is_alphabetic()) {
        Some(text)
    } else {
        None
    }
}

/// The leading sentence of a paragraph: everything through the first
/// terminator followed by whitespace (or end of text). Text without a
/// terminator counts as one sentence.
pub fn first_sentence(text: &str) -> &str {
    for (i, c) in text.char_indices() {
        if matches!(c, '.' | '!' | '?') {
            let end = i + c.len_utf8();
            let rest = &text[end..];
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                return &text[..end];
            }
        }
    }
    text
}
