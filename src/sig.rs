//! Type signature rendering — recursive dispatch over type descriptors.
//!
//! Two modes. A top-level `func` declaration alternates fonts through the
//! troff buffer: keywords and types bold, parameter names roman. Everything
//! nested (a map value, a slice element, a callback parameter) renders as
//! plain concatenated text and keeps that mode all the way down.

use crate::model::{ChanDir, Field, FnSig, TypeDescriptor};
use crate::roff::Troff;
use anyhow::{bail, Result};

/// Visibility by naming convention: an upper-case first letter exports.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_uppercase())
}

/// Render a type descriptor as plain text.
pub fn type_sig(t: &TypeDescriptor) -> Result<String> {
    let mut out = String::new();
    write_type(&mut out, t)?;
    Ok(out)
}

fn write_type(out: &mut String, t: &TypeDescriptor) -> Result<()> {
    match t {
        TypeDescriptor::Named { name } => out.push_str(name),
        TypeDescriptor::Qualified { pkg, name } => {
            out.push_str(pkg);
            out.push('.');
            out.push_str(name);
        }
        TypeDescriptor::Pointer { elem } => {
            out.push('*');
            write_type(out, elem)?;
        }
        TypeDescriptor::Array { len, elem } => {
            out.push('[');
            if let Some(len) = len {
                out.push_str(len);
            }
            out.push(']');
            write_type(out, elem)?;
        }
        TypeDescriptor::Map { key, value } => {
            out.push_str("map[");
            write_type(out, key)?;
            out.push(']');
            write_type(out, value)?;
        }
        TypeDescriptor::Chan { dir, elem } => {
            match dir {
                ChanDir::Recv => out.push_str("<-chan"),
                ChanDir::Send => out.push_str("chan<-"),
                ChanDir::Both => out.push_str("chan"),
            }
            out.push(' ');
            write_type(out, elem)?;
        }
        TypeDescriptor::Ellipsis { elem } => {
            out.push_str("...");
            write_type(out, elem)?;
        }
        TypeDescriptor::Func { params, results } => {
            out.push_str("func");
            write_fn(out, params, results)?;
        }
        TypeDescriptor::Struct { fields } => {
            out.push_str("struct{");
            inline_fields(out, fields)?;
            out.push('}');
        }
        TypeDescriptor::Interface { methods } => {
            out.push_str("interface{");
            inline_methods(out, methods)?;
            out.push('}');
        }
    }
    Ok(())
}

/// `(params) results`, with parentheses around the results only when there
/// is more than one or the single result is named.
fn write_fn(out: &mut String, params: &[Field], results: &[Field]) -> Result<()> {
    out.push('(');
    write_params(out, params)?;
    out.push(')');
    if !results.is_empty() {
        out.push(' ');
        let parens = results.len() > 1 || !results[0].names.is_empty();
        if parens {
            out.push('(');
        }
        write_params(out, results)?;
        if parens {
            out.push(')');
        }
    }
    Ok(())
}

fn write_params(out: &mut String, fl: &[Field]) -> Result<()> {
    for (i, f) in fl.iter().enumerate() {
        for (j, name) in f.names.iter().enumerate() {
            out.push_str(name);
            if j != f.names.len() - 1 {
                out.push(',');
            }
            out.push(' ');
        }
        write_type(out, &f.ty)?;
        if i != fl.len() - 1 {
            out.push_str(", ");
        }
    }
    Ok(())
}

/// Inline struct members, visible fields only, joined with `;`. The inline
/// form never carries the unexported marker; the block form does.
fn inline_fields(out: &mut String, fields: &[Field]) -> Result<()> {
    let mut first = true;
    for f in fields {
        let entry = if f.names.is_empty() {
            // embedded field; visibility comes from the base identifier
            if !is_exported(base_ident(&f.ty)?) {
                continue;
            }
            type_sig(&f.ty)?
        } else {
            let visible: Vec<&str> = f
                .names
                .iter()
                .filter(|n| is_exported(n))
                .map(String::as_str)
                .collect();
            if visible.is_empty() {
                continue;
            }
            format!("{} {}", visible.join(", "), type_sig(&f.ty)?)
        };
        if !first {
            out.push_str("; ");
        }
        out.push_str(&entry);
        first = false;
    }
    Ok(())
}

/// Inline interface members, visible entries only, joined with `;`.
fn inline_methods(out: &mut String, methods: &[Field]) -> Result<()> {
    let mut first = true;
    for f in methods {
        let Some(line) = method_line(f)? else { continue };
        if !first {
            out.push_str("; ");
        }
        out.push_str(&line);
        first = false;
    }
    Ok(())
}

/// Render a declaration signature into the troff buffer: parameter and
/// result names roman, everything else bold. Nested types drop to plain
/// text and stay there.
pub fn fn_sig_decl(tr: &mut Troff, sig: &FnSig) -> Result<()> {
    tr.bold("(");
    params_decl(tr, &sig.params)?;
    tr.bold(")");
    if !sig.results.is_empty() {
        tr.bold(" ");
        let parens = sig.results.len() > 1 || !sig.results[0].names.is_empty();
        if parens {
            tr.bold("(");
        }
        params_decl(tr, &sig.results)?;
        if parens {
            tr.bold(")");
        }
    }
    Ok(())
}

fn params_decl(tr: &mut Troff, fl: &[Field]) -> Result<()> {
    for (i, f) in fl.iter().enumerate() {
        for (j, name) in f.names.iter().enumerate() {
            tr.roman(name);
            if j != f.names.len() - 1 {
                tr.bold(",");
            }
            tr.bold(" ");
        }
        tr.bold(&type_sig(&f.ty)?);
        if i != fl.len() - 1 {
            tr.bold(", ");
        }
    }
    Ok(())
}

/// Render a struct body, one bold field line per visible field. Returns
/// true when any member was suppressed for visibility.
pub fn struct_body(tr: &mut Troff, fields: &[Field]) -> Result<bool> {
    let mut suppressed = false;
    let mut lines = Vec::new();
    for f in fields {
        if f.names.is_empty() {
            // embedded field; visibility comes from the base identifier
            if !is_exported(base_ident(&f.ty)?) {
                suppressed = true;
                continue;
            }
            lines.push(type_sig(&f.ty)?);
            continue;
        }
        let visible: Vec<&str> = f
            .names
            .iter()
            .filter(|n| is_exported(n))
            .map(String::as_str)
            .collect();
        if visible.len() != f.names.len() {
            suppressed = true;
        }
        if visible.is_empty() {
            continue;
        }
        lines.push(format!("{} {}", visible.join(", "), type_sig(&f.ty)?));
    }
    emit_body_lines(tr, &lines);
    Ok(suppressed)
}

/// Render an interface body, one bold method signature per visible entry.
/// Returns true when any member was suppressed for visibility.
pub fn interface_body(tr: &mut Troff, methods: &[Field]) -> Result<bool> {
    let mut suppressed = false;
    let mut lines = Vec::new();
    for f in methods {
        match method_line(f)? {
            Some(line) => lines.push(line),
            None => suppressed = true,
        }
    }
    emit_body_lines(tr, &lines);
    Ok(suppressed)
}

fn emit_body_lines(tr: &mut Troff, lines: &[String]) {
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            tr.control(".sp 0");
        }
        tr.bold(line);
        tr.nl();
    }
}

/// One interface entry as plain text, or None when hidden.
fn method_line(f: &Field) -> Result<Option<String>> {
    let Some(name) = f.names.first() else {
        // embedded interface
        if !is_exported(base_ident(&f.ty)?) {
            return Ok(None);
        }
        return type_sig(&f.ty).map(Some);
    };
    if !is_exported(name) {
        return Ok(None);
    }
    let TypeDescriptor::Func { params, results } = &f.ty else {
        bail!("interface member {} is not a function type", name);
    };
    let mut line = name.clone();
    write_fn(&mut line, params, results)?;
    Ok(Some(line))
}

/// Peel pointer and qualification wrappers off an embedded field to reach
/// the identifier that decides its visibility. Any other shape underneath
/// means the input tree is malformed; rendering cannot continue.
fn base_ident(t: &TypeDescriptor) -> Result<&str> {
    match t {
        TypeDescriptor::Named { name } => Ok(name),
        TypeDescriptor::Qualified { name, .. } => Ok(name),
        TypeDescriptor::Pointer { elem } => base_ident(elem),
        other => bail!("unknown expression in embedded field type: {:?}", other),
    }
}
