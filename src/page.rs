//! Manual page assembly — section ordering, override merging, emission.
//!
//! A `ManPage` is built once per module, mutated through one linear pass,
//! and flushed. It owns the pending auto-detected sections, the operator's
//! override sections, and the end-matter; the merge rule is that an
//! override always beats a same-named auto section, and each name resolves
//! at most once so nothing is emitted twice.

use crate::comment::{self, Paragraph, Section};
use crate::model::{Func, Module, Type, TypeDescriptor, Value, ValueKind};
use crate::refs;
use crate::roff::Troff;
use crate::sig;
use anyhow::Result;
use std::collections::HashMap;

/// Well-known sections resolved by name, in this order, right after
/// DESCRIPTION.
const WELL_KNOWN: &[&str] = &["DIAGNOSTICS", "ENVIRONMENT", "FILES"];

/// Default manual category for the page header.
const MANUAL: &str = "Modules";

/// Page-level configuration, resolved by the caller. No global state.
#[derive(Debug, Default, Clone)]
pub struct Config {
    /// Display name; falls back to the module name.
    pub name: Option<String>,
    /// Version string; falls back to the module's declared version, then a
    /// `Version` constant, then the page date.
    pub version: Option<String>,
    /// Manual category shown in the header.
    pub manual: Option<String>,
    /// Import path shown in SYNOPSIS.
    pub import_path: Option<String>,
    /// Manual section number, conventionally "3" for modules.
    pub section: String,
    /// Page date, `yyyy-mm-dd`.
    pub date: String,
}

pub struct ManPage<'a> {
    module: &'a Module,
    name: String,
    version: String,
    sec: String,
    manual: String,
    date: String,
    import_path: Option<String>,
    /// Short description for the NAME line.
    descr: Option<String>,
    /// Pending auto-detected sections; drained as names resolve.
    sections: Vec<Section>,
    /// Override pool, consumable exactly once per name.
    overrides: HashMap<String, Vec<Paragraph>>,
    /// Supplied override order, for the trailing sweep.
    override_order: Vec<String>,
    /// Sections relocated to the end of the page.
    end: Vec<Section>,
    refs: Vec<String>,
    out: Troff,
}

impl<'a> ManPage<'a> {
    pub fn new(module: &'a Module, cfg: &Config, overd: Vec<Section>) -> Self {
        let mut sections = comment::sections(&module.doc);
        // Pull the short description out of the preamble. A single-sentence
        // first paragraph moves to the NAME line entirely; a longer one is
        // only excerpted and stays in the body.
        let mut descr = None;
        if let Some(first) = sections.first_mut().filter(|s| s.name.is_empty()) {
            if let Some(Paragraph::Plain(text)) = first.paras.first() {
                let lead = comment::first_sentence(text);
                let whole = lead.len() == text.len();
                descr = Some(lead.split_whitespace().collect::<Vec<_>>().join(" "));
                if whole {
                    first.paras.remove(0);
                }
            }
        }

        let name = cfg
            .name
            .clone()
            .unwrap_or_else(|| module.name.clone());
        let override_order: Vec<String> = overd.iter().map(|s| s.name.clone()).collect();
        let overrides: HashMap<String, Vec<Paragraph>> =
            overd.into_iter().map(|s| (s.name, s.paras)).collect();

        let mut page = ManPage {
            module,
            version: resolve_version(module, cfg),
            sec: cfg.section.clone(),
            manual: cfg.manual.clone().unwrap_or_else(|| MANUAL.to_string()),
            date: cfg.date.clone(),
            import_path: cfg.import_path.clone().or_else(|| module.import_path.clone()),
            descr,
            sections,
            overrides,
            override_order,
            end: Vec::new(),
            refs: Vec::new(),
            out: Troff::new(),
            name,
        };

        // HISTORY conventionally closes the page; locate it once and excise
        // it from the pool before the main pass begins.
        let idx = page.position("HISTORY");
        if let Some(paras) = page.take_section("HISTORY", idx) {
            page.end.push(Section {
                name: "HISTORY".to_string(),
                paras,
            });
        }

        // Name and section number must be known before this, so the page
        // can never cite itself.
        page.refs = refs::find_refs(module, &page.name, &page.sec, &[]);
        page
    }

    /// Run the single assembly pass and hand back the finished document.
    pub fn render(mut self) -> Result<String> {
        let m = self.module;
        self.out
            .control(".\\\"    Automatically generated by docroff(1)");
        self.header();
        self.name_section();
        self.synopsis(m);
        self.description();
        self.user_sections(WELL_KNOWN);
        self.values_section("CONSTANTS", &m.consts)?;
        self.values_section("VARIABLES", &m.vars)?;
        if m.funcs.iter().any(|f| sig::is_exported(&f.name)) {
            self.out.section("FUNCTIONS");
            self.funcs(&m.funcs)?;
        }
        self.types(&m.types)?;
        self.remaining_sections();
        self.bugs(&m.bugs);
        self.see_also();
        self.end_matter();
        Ok(self.out.finish())
    }

    // -- Section override merging ---------------------------------------------

    /// Resolve a section by name. An operator override wins over the
    /// pending auto section; either way the auto section at `auto_idx`
    /// leaves the pool, order preserved. A name resolves at most once:
    /// the second request for the same name yields None.
    fn take_section(&mut self, name: &str, auto_idx: Option<usize>) -> Option<Vec<Paragraph>> {
        let auto = auto_idx.map(|i| self.sections.remove(i));
        match self.overrides.remove(name) {
            Some(paras) => Some(paras),
            None => auto.map(|s| s.paras),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.name == name)
    }

    // -- Fixed front matter ---------------------------------------------------

    fn header(&mut self) {
        let line = format!(
            ".TH \"{}\" {} \"{}\" \"version {}\" \"{}\"",
            self.name, self.sec, self.date, self.version, self.manual
        );
        self.out.control(&line);
    }

    fn name_section(&mut self) {
        self.out.section("NAME");
        let name = self.name.clone();
        self.out.text(&name);
        if let Some(descr) = self.descr.clone().filter(|d| !d.is_empty()) {
            self.out.raw(" \\- ");
            self.out.text(&descr);
        }
    }

    fn synopsis(&mut self, m: &Module) {
        self.out.section("SYNOPSIS");
        let mut line = String::from(".B import ");
        if let Some(path) = &self.import_path {
            line.push_str(&self.name);
            line.push(' ');
            line.push_str("\\*(lq");
            line.push_str(path);
        } else {
            line.push_str("\\*(lq");
            line.push_str(&self.name);
        }
        line.push_str("\\*(rq");
        self.out.control(&line);
        self.out.control(".sp");
        self.toc(m);
    }

    /// Table of contents: one line per visible declaration, nested
    /// functions and methods indented under their type.
    fn toc(&mut self, m: &Module) {
        if !m.consts.is_empty() {
            self.out.control(".B Constants");
            self.out.control(".sp 0");
        }
        if !m.vars.is_empty() {
            self.out.control(".B Variables");
            self.out.control(".sp 0");
        }
        for f in &m.funcs {
            if !sig::is_exported(&f.name) {
                continue;
            }
            self.toc_func(f);
        }
        for t in &m.types {
            if !sig::is_exported(&t.name) {
                continue;
            }
            self.out.roman("type ");
            self.out.bold(&t.name);
            self.out.nl();
            self.out.control(".sp 0");
            let nested: Vec<&Func> = t
                .funcs
                .iter()
                .chain(&t.methods)
                .filter(|f| sig::is_exported(&f.name))
                .collect();
            if nested.is_empty() {
                continue;
            }
            self.out.control(".RS");
            for f in nested {
                self.toc_func(f);
            }
            self.out.control(".RE");
        }
    }

    fn toc_func(&mut self, f: &Func) {
        match &f.recv {
            Some(recv) => self.out.roman(&format!("func ({}) ", recv)),
            None => self.out.roman("func "),
        }
        self.out.bold(&f.name);
        self.out.nl();
        self.out.control(".sp 0");
    }

    // -- Body sections --------------------------------------------------------

    fn description(&mut self) {
        // The first pending section becomes DESCRIPTION whatever its
        // heading said; an override named DESCRIPTION still beats it.
        let idx = (!self.sections.is_empty()).then_some(0);
        if let Some(paras) = self.take_section("DESCRIPTION", idx) {
            if !paras.is_empty() {
                self.out.section("DESCRIPTION");
                self.paras(&paras);
            }
        }
    }

    fn user_sections(&mut self, names: &[&str]) {
        for name in names {
            let idx = self.position(name);
            if let Some(paras) = self.take_section(name, idx) {
                self.out.section(name);
                self.paras(&paras);
            }
        }
    }

    /// The trailing sweep: everything still pending, then every override
    /// whose name was never requested. Unknown operator sections are never
    /// dropped, they just sort after the canonical ones.
    fn remaining_sections(&mut self) {
        for sec in std::mem::take(&mut self.sections) {
            if sec.name.is_empty() {
                continue;
            }
            self.out.section(&sec.name);
            self.paras(&sec.paras);
        }
        for name in std::mem::take(&mut self.override_order) {
            if let Some(paras) = self.overrides.remove(&name) {
                self.out.section(&name);
                self.paras(&paras);
            }
        }
    }

    fn bugs(&mut self, bugs: &[String]) {
        if bugs.is_empty() {
            return;
        }
        self.out.section("BUGS");
        for bug in bugs {
            self.out.pp();
            self.out.text(bug.trim());
        }
    }

    fn see_also(&mut self) {
        if self.refs.is_empty() {
            return;
        }
        self.out.section("SEE ALSO");
        let refs = std::mem::take(&mut self.refs);
        let last = refs.len() - 1;
        for (i, r) in refs.iter().enumerate() {
            let Some(pivot) = r.find('(') else { continue };
            self.out.bold(&r[..pivot]);
            if i != last {
                self.out.roman(&format!("{},", &r[pivot..]));
            } else {
                self.out.roman(&r[pivot..]);
            }
            self.out.nl();
        }
    }

    fn end_matter(&mut self) {
        for sec in std::mem::take(&mut self.end) {
            self.out.section(&sec.name);
            self.paras(&sec.paras);
        }
    }

    // -- Entity rendering -----------------------------------------------------

    fn values_section(&mut self, title: &str, vals: &[Value]) -> Result<()> {
        if vals.is_empty() {
            return Ok(());
        }
        self.out.section(title);
        self.values(vals)
    }

    fn values(&mut self, vals: &[Value]) -> Result<()> {
        for (i, v) in vals.iter().enumerate() {
            self.doc_text(&v.doc);
            self.out.pp();
            let keyword = match v.kind {
                ValueKind::Const => "const ",
                ValueKind::Var => "var ",
            };
            self.out.bold(keyword);
            let grouped = v.specs.len() != 1;
            if grouped {
                self.out.bold("(");
                self.out.nl();
                self.out.control(".RS");
            }
            for spec in &v.specs {
                let visible: Vec<&str> = spec
                    .names
                    .iter()
                    .filter(|n| sig::is_exported(n))
                    .map(String::as_str)
                    .collect();
                if visible.is_empty() {
                    continue;
                }
                let mut line = visible.join(", ");
                if let Some(ty) = &spec.ty {
                    line.push(' ');
                    line.push_str(&sig::type_sig(ty)?);
                }
                if let Some(value) = &spec.value {
                    line.push_str(" = ");
                    line.push_str(value);
                }
                self.out.nl();
                self.out.bold(&line);
                self.out.nl();
                self.out.control(".sp 0");
            }
            if grouped {
                self.out.control(".RE");
                self.out.bold(")");
                self.out.nl();
            }
            if i != vals.len() - 1 {
                self.out.control(".sp 0");
            }
        }
        Ok(())
    }

    fn funcs(&mut self, funcs: &[Func]) -> Result<()> {
        for f in funcs {
            if !sig::is_exported(&f.name) {
                continue;
            }
            self.out.pp();
            self.out.bold("func ");
            if let Some(recv) = &f.recv {
                self.out.bold(&format!("({}) ", recv));
            }
            self.out.bold(&f.name);
            sig::fn_sig_decl(&mut self.out, &f.sig)?;
            self.out.nl();
            if !f.doc.is_empty() {
                self.out.pp();
                self.doc_text(&f.doc);
            }
        }
        Ok(())
    }

    fn types(&mut self, types: &[Type]) -> Result<()> {
        let visible: Vec<&Type> = types
            .iter()
            .filter(|t| sig::is_exported(&t.name))
            .collect();
        if visible.is_empty() {
            return Ok(());
        }
        self.out.section("TYPES");
        for t in visible {
            self.out.nl();
            self.out.subsection(&t.name);
            self.out.bold(&format!("type {} ", t.name));
            match &t.decl {
                TypeDescriptor::Struct { fields } => {
                    self.out.bold("struct {");
                    self.out.nl();
                    self.out.control(".RS");
                    let suppressed = sig::struct_body(&mut self.out, fields)?;
                    self.close_composite(suppressed, "fields.");
                }
                TypeDescriptor::Interface { methods } => {
                    self.out.bold("interface {");
                    self.out.nl();
                    self.out.control(".RS");
                    let suppressed = sig::interface_body(&mut self.out, methods)?;
                    self.close_composite(suppressed, "methods.");
                }
                other => {
                    self.out.bold(&sig::type_sig(other)?);
                    self.out.nl();
                }
            }
            let has_body = !t.doc.is_empty()
                || !t.consts.is_empty()
                || !t.vars.is_empty()
                || !t.funcs.is_empty()
                || !t.methods.is_empty();
            if has_body {
                self.out.pp();
                self.doc_text(&t.doc);
                self.values(&t.consts)?;
                self.values(&t.vars)?;
                self.funcs(&t.funcs)?;
                self.funcs(&t.methods)?;
            }
        }
        Ok(())
    }

    fn close_composite(&mut self, suppressed: bool, kind: &str) {
        self.out.nl();
        if suppressed {
            self.out.control(".sp 0");
            self.out.bold(&format!("//contains unexported {}", kind));
            self.out.nl();
        }
        self.out.control(".RE");
        self.out.bold("}");
        self.out.nl();
    }

    // -- Text emission --------------------------------------------------------

    fn doc_text(&mut self, doc: &str) {
        if doc.is_empty() {
            return;
        }
        let paras = comment::paragraphs(doc);
        self.paras(&paras);
    }

    fn paras(&mut self, paras: &[Paragraph]) {
        for p in paras {
            self.out.pp();
            match p {
                Paragraph::Plain(text) => {
                    self.out.text(text);
                    self.out.nl();
                }
                Paragraph::Code(code) => {
                    self.out.control(".RS");
                    self.out.control(".nf");
                    self.out.text(code);
                    self.out.nl();
                    self.out.control(".fi");
                    self.out.control(".RE");
                }
            }
        }
    }
}

/// Explicit version, declared version, a `Version` constant's literal
/// value, then the page date — first hit wins.
fn resolve_version(module: &Module, cfg: &Config) -> String {
    if let Some(v) = &cfg.version {
        return v.clone();
    }
    if let Some(v) = &module.version {
        return v.clone();
    }
    for group in module.consts.iter().chain(&module.vars) {
        for spec in &group.specs {
            if spec.names.iter().any(|n| n == "Version") {
                if let Some(value) = &spec.value {
                    return value.clone();
                }
            }
        }
    }
    cfg.date.clone()
}
