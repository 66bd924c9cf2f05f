//! The language-agnostic intermediate type graph: the collector's output and
//! the emitter's input.

use indexmap::IndexMap;

use crate::{
    directive::Arguments,
    docs::DocComment,
    errors::{Error, Result},
};

/// A mapping from fully qualified name to exactly one [`TypeNode`].
///
/// Insertion order is the collector's discovery order; the emitter relies on
/// it only for determinism, never for correctness.
#[derive(Debug, Default)]
pub struct TypeGraph {
    types: IndexMap<String, TypeNode>,
}

impl TypeGraph {
    pub fn get(&self, name: &str) -> Option<&TypeNode> {
        self.types.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut TypeNode> {
        self.types.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, node: TypeNode) {
        self.types.insert(name.into(), node);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TypeNode)> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Flips the `concrete` flag on an interface node. Monotonic: the flag is
    /// never unset again.
    pub fn mark_concrete(&mut self, name: &str) {
        if let Some(TypeNode::Interface(interface)) = self.types.get_mut(name) {
            interface.concrete = true;
        }
    }

    /// Replaces same-named members of an already collected interface,
    /// preserving all non-colliding originals. Members the target never had
    /// are appended.
    pub fn merge_override(&mut self, target: &str, members: Vec<Member>) -> Result<()> {
        let Some(TypeNode::Interface(interface)) = self.types.get_mut(target) else {
            return Err(Error::MissingOverrideTarget(target.to_owned()));
        };

        for member in members {
            match interface
                .members
                .iter_mut()
                .find(|existing| existing.name() == member.name())
            {
                Some(existing) => *existing = member,
                None => interface.members.push(member),
            }
        }

        Ok(())
    }
}

/// One normalized declaration shape. Consumers match exhaustively on the
/// kind; adding a variant is deliberately a compile error everywhere.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeNode {
    Interface(InterfaceNode),
    Alias(AliasNode),
    Enum(EnumNode),
    Union(UnionNode),
    Array(Box<TypeNode>),
    /// A named pointer to another graph entry; resolved by lookup at
    /// emission time, never ownership.
    Reference(String),
    /// Nullability wrapper. Absence means nullable.
    NotNull(Box<TypeNode>),
    String,
    Float,
    Boolean,
    StringLiteral(String),
    Any,
    Null,
    Undefined,
}

impl TypeNode {
    /// Wraps in [`TypeNode::NotNull`]. Idempotent: wrapping a wrapped node is
    /// a no-op, so double wrapping is unreachable by construction.
    pub fn non_null(self) -> TypeNode {
        match self {
            TypeNode::NotNull(_) => self,
            other => TypeNode::NotNull(Box::new(other)),
        }
    }

    /// Strips a [`TypeNode::NotNull`] wrapper, if any.
    pub fn unwrap_non_null(&self) -> &TypeNode {
        match self {
            TypeNode::NotNull(inner) => inner,
            other => other,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            TypeNode::Interface(_) => "interface",
            TypeNode::Alias(_) => "alias",
            TypeNode::Enum(_) => "enum",
            TypeNode::Union(_) => "union",
            TypeNode::Array(_) => "array",
            TypeNode::Reference(_) => "reference",
            TypeNode::NotNull(_) => "non-null",
            TypeNode::String => "string",
            TypeNode::Float => "number",
            TypeNode::Boolean => "boolean",
            TypeNode::StringLiteral(_) => "string literal",
            TypeNode::Any => "any",
            TypeNode::Null => "null",
            TypeNode::Undefined => "undefined",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterfaceNode {
    pub members: Vec<Member>,
    /// Qualified names of the inheritance clause targets. Collected without
    /// restriction; the emitter rejects more than one at flattening time.
    pub inherits: Vec<String>,
    /// True once the interface has been referenced as a value type rather
    /// than purely as a supertype. Decides `type` vs `interface` emission.
    pub concrete: bool,
    /// True when tagged `@graphql input`.
    pub input: bool,
    pub doc: DocComment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AliasNode {
    pub target: Box<TypeNode>,
    /// Whether the aliased shape admits null, so references through the
    /// alias inherit its nullability.
    pub nullable: bool,
    /// True when tagged `@graphql ID`.
    pub id: bool,
    pub doc: DocComment,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnumNode {
    pub values: Vec<EnumValue>,
    pub doc: DocComment,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnumValue {
    pub value: String,
    pub doc: DocComment,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnionNode {
    pub members: Vec<TypeNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Property(Property),
    Method(Method),
}

impl Member {
    pub fn name(&self) -> &str {
        match self {
            Member::Property(property) => &property.name,
            Member::Method(method) => &method.name,
        }
    }

    pub fn doc(&self) -> &DocComment {
        match self {
            Member::Property(property) => &property.doc,
            Member::Method(method) => &method.doc,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub ty: TypeNode,
    pub doc: DocComment,
}

/// A callable member. At most one parameter is representable; the collector
/// rejects anything wider.
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    pub parameter: Option<Parameter>,
    pub returns: TypeNode,
    pub directives: Vec<Directive>,
    pub doc: DocComment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeNode,
}

/// A custom directive extracted from a `@graphql name(args)` doc tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub name: String,
    pub arguments: Arguments,
}
