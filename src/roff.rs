//! Troff output buffer — paragraph breaks, font alternation, escaping.
//!
//! The page assembler writes everything through this type. It owns an
//! append-only buffer and takes care of the fiddly parts of the man macro
//! package: a markup command must start its own line, two paragraph breaks
//! in a row are one break, and bold/roman runs are expressed as a single
//! `.B`/`.BR`/`.RB` line with alternating arguments.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Font {
    Bold,
    Roman,
}

pub struct Troff {
    out: String,
    /// Pending alternating-font fragments, flushed as one macro line.
    spans: Vec<(Font, String)>,
    /// True right after a heading or paragraph break; makes `pp` idempotent.
    at_break: bool,
}

impl Troff {
    pub fn new() -> Self {
        Troff {
            out: String::new(),
            spans: Vec::new(),
            at_break: true,
        }
    }

    /// Append markup verbatim. The caller manages its own newlines.
    pub fn raw(&mut self, s: &str) {
        self.flush_fonts();
        self.out.push_str(s);
        if !s.is_empty() {
            self.at_break = false;
        }
    }

    /// Append one complete markup line, starting on a fresh line.
    pub fn control(&mut self, line: &str) {
        self.flush_fonts();
        self.ensure_nl();
        self.out.push_str(line);
        self.out.push('\n');
        self.at_break = false;
    }

    /// Guarantee the buffer ends on its own line.
    pub fn nl(&mut self) {
        self.flush_fonts();
        self.ensure_nl();
    }

    /// Paragraph break. Two in a row emit one `.PP`, and a break right
    /// after a section heading is suppressed entirely.
    pub fn pp(&mut self) {
        self.flush_fonts();
        if self.at_break {
            return;
        }
        self.ensure_nl();
        self.out.push_str(".PP\n");
        self.at_break = true;
    }

    /// Start a section: `.SH "NAME"`.
    pub fn section(&mut self, name: &str) {
        self.heading(".SH", name);
    }

    /// Start a subsection: `.SS "name"`.
    pub fn subsection(&mut self, name: &str) {
        self.heading(".SS", name);
    }

    fn heading(&mut self, cmd: &str, name: &str) {
        self.flush_fonts();
        self.ensure_nl();
        self.out.push_str(cmd);
        self.out.push_str(" \"");
        // same doubling rule as quote(); headings are always quoted
        self.out.push_str(&escape(name).replace('"', "\"\""));
        self.out.push_str("\"\n");
        self.at_break = true;
    }

    /// Append escaped plain text. Lines that would begin with a control
    /// character are protected with `\&` so they print literally.
    pub fn text(&mut self, s: &str) {
        self.flush_fonts();
        if s.is_empty() {
            return;
        }
        let escaped = escape(s);
        for (i, line) in escaped.split('\n').enumerate() {
            if i > 0 {
                self.out.push('\n');
            }
            let at_line_start = self.out.is_empty() || self.out.ends_with('\n');
            if at_line_start && (line.starts_with('.') || line.starts_with('\'')) {
                self.out.push_str("\\&");
            }
            self.out.push_str(line);
        }
        self.at_break = false;
    }

    /// Queue a bold fragment for the current alternating-font line.
    pub fn bold(&mut self, s: &str) {
        self.push_span(Font::Bold, s);
    }

    /// Queue a roman fragment for the current alternating-font line.
    pub fn roman(&mut self, s: &str) {
        self.push_span(Font::Roman, s);
    }

    fn push_span(&mut self, font: Font, s: &str) {
        if s.is_empty() {
            return;
        }
        let escaped = escape(s);
        if let Some((last, frag)) = self.spans.last_mut() {
            if *last == font {
                frag.push_str(&escaped);
                return;
            }
        }
        self.spans.push((font, escaped));
    }

    /// Emit queued font fragments as one macro line. All-bold runs become
    /// `.B`, mixed runs `.BR` or `.RB` depending on the leading font, and
    /// all-roman runs need no macro at all.
    pub fn flush_fonts(&mut self) {
        if self.spans.is_empty() {
            return;
        }
        let spans = std::mem::take(&mut self.spans);
        self.ensure_nl();
        let bold_only = spans.iter().all(|(f, _)| *f == Font::Bold);
        let roman_only = spans.iter().all(|(f, _)| *f == Font::Roman);
        if roman_only {
            let line: String = spans.into_iter().map(|(_, s)| s).collect();
            if line.starts_with('.') || line.starts_with('\'') {
                self.out.push_str("\\&");
            }
            self.out.push_str(&line);
        } else {
            let cmd = if bold_only {
                ".B"
            } else if spans[0].0 == Font::Bold {
                ".BR"
            } else {
                ".RB"
            };
            self.out.push_str(cmd);
            for (_, frag) in &spans {
                self.out.push(' ');
                self.out.push_str(&quote(frag));
            }
        }
        self.out.push('\n');
        self.at_break = false;
    }

    /// Flush everything and hand back the finished document.
    pub fn finish(mut self) -> String {
        self.flush_fonts();
        self.ensure_nl();
        self.out
    }

    fn ensure_nl(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }
}

impl Default for Troff {
    fn default() -> Self {
        Troff::new()
    }
}

/// Escape text so troff prints it literally: backslash becomes the escape
/// glyph `\e`, and a bare hyphen becomes `\-` so it is not typeset as a
/// typographic dash.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\e"),
            '-' => out.push_str("\\-"),
            _ => out.push(c),
        }
    }
    out
}

/// Quote a macro argument when it contains spaces or quotes.
fn quote(frag: &str) -> String {
    if frag.is_empty() || frag.contains(' ') || frag.contains('"') {
        format!("\"{}\"", frag.replace('"', "\"\""))
    } else {
        frag.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pp_is_idempotent() {
        let mut t = Troff::new();
        t.text("one");
        t.pp();
        t.pp();
        t.text("two");
        assert_eq!(t.finish(), "one\n.PP\ntwo\n");
    }

    #[test]
    fn pp_suppressed_after_heading() {
        let mut t = Troff::new();
        t.section("DESCRIPTION");
        t.pp();
        t.text("body");
        assert_eq!(t.finish(), ".SH \"DESCRIPTION\"\nbody\n");
    }

    #[test]
    fn alternating_fonts_one_line() {
        let mut t = Troff::new();
        t.bold("func Do(");
        t.roman("x");
        t.bold(" int) error");
        assert_eq!(t.finish(), ".BR \"func Do(\" x \" int) error\"\n");
    }

    #[test]
    fn adjacent_same_font_fragments_merge() {
        let mut t = Troff::new();
        t.bold("func ");
        t.bold("Do");
        assert_eq!(t.finish(), ".B \"func Do\"\n");
    }

    #[test]
    fn roman_leading_line_starts_with_rb() {
        let mut t = Troff::new();
        t.roman("func ");
        t.bold("Do");
        assert_eq!(t.finish(), ".RB \"func \" Do\n");
    }

    #[test]
    fn heading_doubles_embedded_quotes() {
        let mut t = Troff::new();
        t.section("SAYS \"HI\"");
        assert_eq!(t.finish(), ".SH \"SAYS \"\"HI\"\"\"\n");
    }

    #[test]
    fn escapes_backslash_and_hyphen() {
        assert_eq!(escape(r"a\b"), r"a\eb");
        assert_eq!(escape("non-empty"), "non\\-empty");
    }

    #[test]
    fn leading_dot_is_protected() {
        let mut t = Troff::new();
        t.text(".profile is read at startup");
        assert_eq!(t.finish(), "\\&.profile is read at startup\n");
    }

    #[test]
    fn text_mid_line_needs_no_protection() {
        let mut t = Troff::new();
        t.text("see ");
        t.text(".profile");
        assert_eq!(t.finish(), "see .profile\n");
    }

    #[test]
    fn control_starts_fresh_line() {
        let mut t = Troff::new();
        t.text("tail");
        t.control(".sp 0");
        assert_eq!(t.finish(), "tail\n.sp 0\n");
    }
}
