//! Data model for a module's documented public interface — format-agnostic.
//!
//! A front end (or a pipeline that already has a parsed module) hands us one
//! of these as JSON; everything here is plain data with no rendering logic.

use serde::Deserialize;

/// A complete module description: the unit one manual page is built from.
#[derive(Debug, Default, Deserialize)]
pub struct Module {
    /// Module name, used for the page title unless overridden.
    pub name: String,
    /// Raw module-level documentation comment.
    #[serde(default)]
    pub doc: String,
    /// Import path shown in SYNOPSIS (falls back to `name`).
    #[serde(default)]
    pub import_path: Option<String>,
    /// Declared version string, if the front end knows one.
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub consts: Vec<Value>,
    #[serde(default)]
    pub vars: Vec<Value>,
    #[serde(default)]
    pub funcs: Vec<Func>,
    #[serde(default)]
    pub types: Vec<Type>,
    /// Known-defect notes, one entry per BUGS paragraph.
    #[serde(default)]
    pub bugs: Vec<String>,
}

/// A const or var declaration group (one declaration, possibly many specs).
#[derive(Debug, Deserialize)]
pub struct Value {
    #[serde(default)]
    pub doc: String,
    pub kind: ValueKind,
    pub specs: Vec<ValueSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Const,
    Var,
}

/// One spec inside a declaration group: `A, B SomeType = ...`.
#[derive(Debug, Deserialize)]
pub struct ValueSpec {
    pub names: Vec<String>,
    #[serde(default, rename = "type")]
    pub ty: Option<TypeDescriptor>,
    /// Literal right-hand side, when the front end captured one.
    #[serde(default)]
    pub value: Option<String>,
}

/// A documented function or method.
#[derive(Debug, Deserialize)]
pub struct Func {
    pub name: String,
    /// Receiver text for methods, e.g. `*Buffer`.
    #[serde(default)]
    pub recv: Option<String>,
    #[serde(default)]
    pub doc: String,
    #[serde(default)]
    pub sig: FnSig,
}

/// A documented type with its associated declarations.
#[derive(Debug, Deserialize)]
pub struct Type {
    pub name: String,
    #[serde(default)]
    pub doc: String,
    pub decl: TypeDescriptor,
    #[serde(default)]
    pub consts: Vec<Value>,
    #[serde(default)]
    pub vars: Vec<Value>,
    /// Constructors and other functions returning this type.
    #[serde(default)]
    pub funcs: Vec<Func>,
    #[serde(default)]
    pub methods: Vec<Func>,
}

/// Function signature: parameter and result field lists.
#[derive(Debug, Default, Deserialize)]
pub struct FnSig {
    #[serde(default)]
    pub params: Vec<Field>,
    #[serde(default)]
    pub results: Vec<Field>,
}

/// A field list entry: zero or more names sharing one type.
/// Empty `names` means an embedded field (or an unnamed parameter/result).
#[derive(Debug, Deserialize)]
pub struct Field {
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
}

/// Structural shape of a declared type, one variant per shape.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypeDescriptor {
    /// A plain identifier: `int`, `Reader`.
    Named { name: String },
    /// A package-qualified identifier: `io.Reader`.
    Qualified { pkg: String, name: String },
    Pointer { elem: Box<TypeDescriptor> },
    /// Slice when `len` is absent, array otherwise.
    Array {
        #[serde(default)]
        len: Option<String>,
        elem: Box<TypeDescriptor>,
    },
    Map {
        key: Box<TypeDescriptor>,
        value: Box<TypeDescriptor>,
    },
    Chan {
        #[serde(default)]
        dir: ChanDir,
        elem: Box<TypeDescriptor>,
    },
    Func {
        #[serde(default)]
        params: Vec<Field>,
        #[serde(default)]
        results: Vec<Field>,
    },
    Struct {
        #[serde(default)]
        fields: Vec<Field>,
    },
    Interface {
        /// Named entries are method signatures, nameless ones embeds.
        #[serde(default)]
        methods: Vec<Field>,
    },
    /// Variadic marker: `...T`.
    Ellipsis { elem: Box<TypeDescriptor> },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChanDir {
    #[default]
    Both,
    Send,
    Recv,
}
