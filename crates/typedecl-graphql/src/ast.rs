//! The typed declaration model consumed by the collector.
//!
//! This is the boundary to the type-checking front end: a front end is
//! expected to resolve source files into a [`Program`] before handing it to
//! this crate. The model derives [`serde::Deserialize`] so a declaration
//! module can also be loaded from JSON, which is what the CLI does.

use std::fmt;

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Program {
    pub declarations: Vec<Declaration>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Declaration {
    Interface(InterfaceDecl),
    TypeAlias(TypeAliasDecl),
    Enum(EnumDecl),
    Namespace(NamespaceDecl),
    ImportAlias(ImportAliasDecl),
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Interface(decl) => &decl.name,
            Declaration::TypeAlias(decl) => &decl.name,
            Declaration::Enum(decl) => &decl.name,
            Declaration::Namespace(decl) => &decl.name,
            Declaration::ImportAlias(decl) => &decl.name,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Declaration::Interface(_) => "interface",
            Declaration::TypeAlias(_) => "type alias",
            Declaration::Enum(_) => "enum",
            Declaration::Namespace(_) => "namespace",
            Declaration::ImportAlias(_) => "import alias",
        }
    }

    pub fn exported(&self) -> bool {
        match self {
            Declaration::Interface(decl) => decl.exported,
            Declaration::TypeAlias(decl) => decl.exported,
            Declaration::Enum(decl) => decl.exported,
            Declaration::Namespace(decl) => decl.exported || decl.default_export,
            Declaration::ImportAlias(decl) => decl.exported,
        }
    }

    pub fn doc(&self) -> Option<&str> {
        match self {
            Declaration::Interface(decl) => decl.doc.as_deref(),
            Declaration::TypeAlias(decl) => decl.doc.as_deref(),
            Declaration::Enum(decl) => decl.doc.as_deref(),
            Declaration::Namespace(decl) => decl.doc.as_deref(),
            Declaration::ImportAlias(_) => None,
        }
    }

    pub fn position(&self) -> &SourcePosition {
        match self {
            Declaration::Interface(decl) => &decl.position,
            Declaration::TypeAlias(decl) => &decl.position,
            Declaration::Enum(decl) => &decl.position,
            Declaration::Namespace(decl) => &decl.position,
            Declaration::ImportAlias(decl) => &decl.position,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceDecl {
    pub name: String,
    #[serde(default)]
    pub exported: bool,
    /// Names of the inheritance clause targets, in declaration order.
    #[serde(default)]
    pub extends: Vec<String>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub position: SourcePosition,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeAliasDecl {
    pub name: String,
    #[serde(default)]
    pub exported: bool,
    pub target: TypeExpr,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub position: SourcePosition,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumDecl {
    pub name: String,
    #[serde(default)]
    pub exported: bool,
    #[serde(default)]
    pub members: Vec<EnumMemberDecl>,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub position: SourcePosition,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumMemberDecl {
    pub name: String,
    /// The raw initializer text as written in the source, quotes and casts
    /// included, e.g. `'RED'`, `"RED" as any` or `3`.
    #[serde(default)]
    pub initializer: Option<String>,
    #[serde(default)]
    pub doc: Option<String>,
}

/// A namespace (or module) wrapper. Non-exported namespaces contribute no
/// segment to qualified names; default-exported ones contribute `default`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceDecl {
    pub name: String,
    #[serde(default)]
    pub exported: bool,
    #[serde(default)]
    pub default_export: bool,
    #[serde(default)]
    pub declarations: Vec<Declaration>,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub position: SourcePosition,
}

/// `import { X as Y }` style indirection. Resolution chases these to the
/// ultimate declaration, so two import paths to one declaration collapse to
/// a single type graph entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportAliasDecl {
    pub name: String,
    /// A possibly dotted path to the aliased declaration.
    pub target: String,
    #[serde(default)]
    pub exported: bool,
    #[serde(default)]
    pub position: SourcePosition,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Member {
    Property(PropertyDecl),
    Method(MethodDecl),
}

impl Member {
    pub fn name(&self) -> &str {
        match self {
            Member::Property(decl) => &decl.name,
            Member::Method(decl) => &decl.name,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDecl {
    pub name: String,
    #[serde(default)]
    pub optional: bool,
    #[serde(rename = "type", default)]
    pub ty: TypeExpr,
    #[serde(default)]
    pub doc: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDecl {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<ParameterDecl>,
    #[serde(default)]
    pub returns: TypeExpr,
    #[serde(default)]
    pub doc: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDecl {
    pub name: String,
    #[serde(default)]
    pub optional: bool,
    #[serde(rename = "type", default)]
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeExpr {
    /// A reference to a named declaration, possibly dotted (`Droid.Function`).
    Name { name: String },
    Union { members: Vec<TypeExpr> },
    Array { element: Box<TypeExpr> },
    StringLiteral { value: String },
    String,
    Number,
    Boolean,
    #[default]
    Any,
    Null,
    Undefined,
}

impl TypeExpr {
    pub fn name(name: impl Into<String>) -> Self {
        TypeExpr::Name { name: name.into() }
    }

    pub fn array(element: TypeExpr) -> Self {
        TypeExpr::Array {
            element: Box::new(element),
        }
    }

    pub fn union(members: impl IntoIterator<Item = TypeExpr>) -> Self {
        TypeExpr::Union {
            members: members.into_iter().collect(),
        }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        TypeExpr::StringLiteral {
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcePosition {
    pub file: String,
    pub line: u32,
}

impl Default for SourcePosition {
    fn default() -> Self {
        SourcePosition {
            file: "<unknown>".to_owned(),
            line: 0,
        }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}
