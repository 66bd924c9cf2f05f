//! Phase one: walks the declaration graph from the schema roots and
//! normalizes everything transitively reachable into a [`TypeGraph`].
//!
//! The walk is reentrant and cycle safe: an interface registers a placeholder
//! graph entry keyed by its qualified name before recursing into its members,
//! so mutually recursive declarations resolve to plain references instead of
//! looping.

use crate::{
    ast::{
        Declaration, EnumDecl, EnumMemberDecl, InterfaceDecl, Member as AstMember, MethodDecl,
        PropertyDecl, SourcePosition, TypeAliasDecl, TypeExpr,
    },
    directive::{self, Arguments},
    docs::{self, DocComment, SchemaTag},
    errors::{Error, Result},
    graph::{
        AliasNode, Directive, EnumNode, EnumValue, InterfaceNode, Member, Method, Parameter,
        Property, TypeGraph, TypeNode, UnionNode,
    },
    symbols::{Symbol, SymbolTable},
};

/// The built-in scalar carve-out: a type literally named `Date` is an opaque
/// scalar, never walked structurally.
const DATE_TYPE: &str = "Date";

pub struct Collector<'a> {
    symbols: &'a SymbolTable<'a>,
    graph: TypeGraph,
}

/// A collected type expression: the node plus whether the shape admits null.
/// The caller merges `nullable` with any explicit optionality marker before
/// deciding on a [`TypeNode::NotNull`] wrapper.
struct Collected {
    node: TypeNode,
    nullable: bool,
}

impl Collected {
    fn required(node: TypeNode) -> Self {
        Collected {
            node,
            nullable: false,
        }
    }

    fn nullable(node: TypeNode) -> Self {
        Collected {
            node,
            nullable: true,
        }
    }

    fn wrapped(self, optional: bool) -> TypeNode {
        if optional || self.nullable {
            self.node
        } else {
            self.node.non_null()
        }
    }
}

impl<'a> Collector<'a> {
    pub fn new(symbols: &'a SymbolTable<'a>) -> Self {
        Collector {
            symbols,
            graph: TypeGraph::default(),
        }
    }

    pub fn graph(&self) -> &TypeGraph {
        &self.graph
    }

    pub fn finish(self) -> TypeGraph {
        self.graph
    }

    /// Walks one root interface and its transitive closure into the graph.
    pub fn collect_root(&mut self, symbol: &Symbol<'a>) -> Result<String> {
        tracing::debug!(root = %symbol.qualified_name, "collecting schema root");
        self.collect_declaration(symbol)?;
        Ok(symbol.qualified_name.clone())
    }

    /// Collects the members of an interface tagged `@graphql override` and
    /// merges them into the already collected target.
    pub fn apply_override(&mut self, symbol: &Symbol<'a>, target: &str) -> Result<()> {
        let Declaration::Interface(decl) = symbol.declaration else {
            return Err(Error::UnsupportedDeclaration {
                kind: symbol.declaration.kind_name(),
                name: symbol.qualified_name.clone(),
                position: symbol.declaration.position().clone(),
            });
        };

        let symbols = self.symbols;
        let target_name = symbols
            .resolve(target, &symbol.scope)
            .map(|target_symbol| target_symbol.qualified_name.clone())
            .ok_or_else(|| Error::MissingOverrideTarget(target.to_owned()))?;

        tracing::debug!(
            source = %symbol.qualified_name,
            target = %target_name,
            "merging override members"
        );

        let members = self.collect_members(decl, &symbol.scope, &symbol.qualified_name)?;
        self.graph.merge_override(&target_name, members)
    }

    fn collect_declaration(&mut self, symbol: &Symbol<'a>) -> Result<Collected> {
        let qualified_name = &symbol.qualified_name;

        match symbol.declaration {
            Declaration::Interface(decl) => {
                if decl.name == DATE_TYPE {
                    self.ensure_date_scalar();
                    return Ok(Collected::required(TypeNode::Reference(
                        DATE_TYPE.to_owned(),
                    )));
                }
                if !self.graph.contains(qualified_name) {
                    self.collect_interface(decl, qualified_name, &symbol.scope)?;
                }
                Ok(Collected::required(TypeNode::Reference(
                    qualified_name.clone(),
                )))
            }
            Declaration::Enum(decl) => {
                if !self.graph.contains(qualified_name) {
                    self.collect_enum(decl, qualified_name);
                }
                Ok(Collected::required(TypeNode::Reference(
                    qualified_name.clone(),
                )))
            }
            Declaration::TypeAlias(decl) => {
                if !self.graph.contains(qualified_name) {
                    self.collect_alias(decl, qualified_name, &symbol.scope)?;
                }
                let nullable = match self.graph.get(qualified_name) {
                    Some(TypeNode::Alias(alias)) => alias.nullable,
                    _ => false,
                };
                Ok(Collected {
                    node: TypeNode::Reference(qualified_name.clone()),
                    nullable,
                })
            }
            declaration @ (Declaration::Namespace(_) | Declaration::ImportAlias(_)) => {
                Err(Error::UnsupportedDeclaration {
                    kind: declaration.kind_name(),
                    name: qualified_name.clone(),
                    position: declaration.position().clone(),
                })
            }
        }
    }

    fn collect_interface(
        &mut self,
        decl: &InterfaceDecl,
        qualified_name: &str,
        scope: &str,
    ) -> Result<()> {
        let doc = parse_doc(decl.doc.as_deref());
        let tags = self.schema_tags(&doc, qualified_name)?;
        let input = tags.contains(&SchemaTag::Input);

        // Placeholder first: inner references to this interface resolve to
        // the entry while its members are still being walked.
        self.graph.insert(
            qualified_name,
            TypeNode::Interface(InterfaceNode {
                input,
                doc,
                ..Default::default()
            }),
        );

        let symbols = self.symbols;
        let mut inherits = Vec::with_capacity(decl.extends.len());
        for supertype in &decl.extends {
            let target = symbols.resolve(supertype, scope).ok_or_else(|| {
                Error::UnresolvedName {
                    name: supertype.clone(),
                    referrer: qualified_name.to_owned(),
                    position: decl.position.clone(),
                }
            })?;
            if !matches!(target.declaration, Declaration::Interface(_)) {
                return Err(Error::UnsupportedDeclaration {
                    kind: target.declaration.kind_name(),
                    name: target.qualified_name.clone(),
                    position: decl.position.clone(),
                });
            }
            // Walking a supertype is not a value use: `concrete` stays unset.
            self.collect_declaration(target)?;
            inherits.push(target.qualified_name.clone());
        }

        let members = self.collect_members(decl, scope, qualified_name)?;

        tracing::debug!(name = %qualified_name, members = members.len(), "collected interface");

        if let Some(TypeNode::Interface(interface)) = self.graph.get_mut(qualified_name) {
            interface.inherits = inherits;
            interface.members = members;
        }
        Ok(())
    }

    fn collect_members(
        &mut self,
        decl: &InterfaceDecl,
        scope: &str,
        qualified_name: &str,
    ) -> Result<Vec<Member>> {
        decl.members
            .iter()
            .map(|member| match member {
                AstMember::Property(property) => {
                    self.collect_property(property, scope, qualified_name, &decl.position)
                }
                AstMember::Method(method) => {
                    self.collect_method(method, scope, qualified_name, &decl.position)
                }
            })
            .collect()
    }

    fn collect_property(
        &mut self,
        decl: &PropertyDecl,
        scope: &str,
        interface_name: &str,
        position: &SourcePosition,
    ) -> Result<Member> {
        let referrer = format!("{interface_name}.{}", decl.name);
        let collected = self.collect_type_expr(&decl.ty, scope, &referrer, position)?;

        Ok(Member::Property(Property {
            name: decl.name.clone(),
            ty: collected.wrapped(decl.optional),
            doc: parse_doc(decl.doc.as_deref()),
        }))
    }

    fn collect_method(
        &mut self,
        decl: &MethodDecl,
        scope: &str,
        interface_name: &str,
        position: &SourcePosition,
    ) -> Result<Member> {
        let referrer = format!("{interface_name}.{}", decl.name);

        if decl.parameters.len() > 1 {
            return Err(Error::TooManyParameters {
                name: interface_name.to_owned(),
                method: decl.name.clone(),
                position: position.clone(),
            });
        }

        let parameter = decl
            .parameters
            .first()
            .map(|parameter| {
                let collected = self.collect_type_expr(&parameter.ty, scope, &referrer, position)?;
                Ok(Parameter {
                    name: parameter.name.clone(),
                    ty: collected.wrapped(parameter.optional),
                })
            })
            .transpose()?;

        let returns = self
            .collect_type_expr(&decl.returns, scope, &referrer, position)?
            .wrapped(false);

        let doc = parse_doc(decl.doc.as_deref());
        let directives = self.method_directives(&doc, &referrer)?;

        Ok(Member::Method(Method {
            name: decl.name.clone(),
            parameter,
            returns,
            directives,
            doc,
        }))
    }

    fn method_directives(&self, doc: &DocComment, referrer: &str) -> Result<Vec<Directive>> {
        self.schema_tags(doc, referrer)?
            .into_iter()
            .filter_map(|tag| match tag {
                SchemaTag::Directive { name, arguments } => Some((name, arguments)),
                _ => None,
            })
            .map(|(name, arguments)| {
                let arguments = match arguments {
                    Some(raw) => directive::parse_arguments(&raw).map_err(|source| {
                        Error::DirectiveArguments {
                            directive: name.clone(),
                            name: referrer.to_owned(),
                            source,
                        }
                    })?,
                    None => Arguments::new(),
                };
                Ok(Directive { name, arguments })
            })
            .collect()
    }

    fn collect_enum(&mut self, decl: &EnumDecl, qualified_name: &str) {
        let values = decl
            .members
            .iter()
            .map(|member| EnumValue {
                value: enum_member_value(member),
                doc: parse_doc(member.doc.as_deref()),
            })
            .collect();

        tracing::debug!(name = %qualified_name, "collected enum");

        self.graph.insert(
            qualified_name,
            TypeNode::Enum(EnumNode {
                values,
                doc: parse_doc(decl.doc.as_deref()),
            }),
        );
    }

    fn collect_alias(
        &mut self,
        decl: &TypeAliasDecl,
        qualified_name: &str,
        scope: &str,
    ) -> Result<()> {
        let doc = parse_doc(decl.doc.as_deref());
        let id = self
            .schema_tags(&doc, qualified_name)?
            .contains(&SchemaTag::Id);

        // Placeholder for self-referential aliases.
        self.graph.insert(
            qualified_name,
            TypeNode::Alias(AliasNode {
                target: Box::new(TypeNode::Any),
                nullable: false,
                id,
                doc,
            }),
        );

        let collected =
            self.collect_type_expr(&decl.target, scope, qualified_name, &decl.position)?;

        tracing::debug!(name = %qualified_name, target = collected.node.kind_name(), "collected alias");

        if let Some(TypeNode::Alias(alias)) = self.graph.get_mut(qualified_name) {
            alias.target = Box::new(collected.node);
            alias.nullable = collected.nullable;
        }
        Ok(())
    }

    fn collect_type_expr(
        &mut self,
        expr: &TypeExpr,
        scope: &str,
        referrer: &str,
        position: &SourcePosition,
    ) -> Result<Collected> {
        match expr {
            TypeExpr::String => Ok(Collected::required(TypeNode::String)),
            TypeExpr::Number => Ok(Collected::required(TypeNode::Float)),
            TypeExpr::Boolean => Ok(Collected::required(TypeNode::Boolean)),
            TypeExpr::StringLiteral { value } => {
                Ok(Collected::required(TypeNode::StringLiteral(value.clone())))
            }
            // `any` admits null, so it never gets a non-null wrapper.
            TypeExpr::Any => Ok(Collected::nullable(TypeNode::Any)),
            TypeExpr::Null => Ok(Collected::nullable(TypeNode::Null)),
            TypeExpr::Undefined => Ok(Collected::nullable(TypeNode::Undefined)),
            TypeExpr::Array { element } => {
                let element = self.collect_type_expr(element, scope, referrer, position)?;
                Ok(Collected::required(TypeNode::Array(Box::new(
                    element.wrapped(false),
                ))))
            }
            TypeExpr::Name { name } => {
                let symbols = self.symbols;
                let symbol =
                    symbols
                        .resolve(name, scope)
                        .ok_or_else(|| Error::UnresolvedName {
                            name: name.clone(),
                            referrer: referrer.to_owned(),
                            position: position.clone(),
                        })?;
                let collected = self.collect_declaration(symbol)?;
                // A named use in type position is a value use.
                if let TypeNode::Reference(target) = &collected.node {
                    self.graph.mark_concrete(target);
                }
                Ok(collected)
            }
            TypeExpr::Union { members } => self.collect_union(members, scope, referrer, position),
        }
    }

    fn collect_union(
        &mut self,
        members: &[TypeExpr],
        scope: &str,
        referrer: &str,
        position: &SourcePosition,
    ) -> Result<Collected> {
        let mut nullable = false;
        let mut collected: Vec<Collected> = Vec::new();

        for member in members {
            match member {
                TypeExpr::Null | TypeExpr::Undefined => nullable = true,
                other => collected.push(self.collect_type_expr(other, scope, referrer, position)?),
            }
        }

        match collected.len() {
            0 => Ok(Collected::nullable(TypeNode::Null)),
            1 => {
                let only = collected.remove(0);
                Ok(Collected {
                    node: only.node,
                    nullable: nullable || only.nullable,
                })
            }
            _ => {
                nullable = nullable || collected.iter().any(|member| member.nullable);
                let members: Vec<TypeNode> =
                    collected.into_iter().map(|member| member.node).collect();
                self.validate_union(&members, referrer)?;
                Ok(Collected {
                    node: TypeNode::Union(UnionNode { members }),
                    nullable,
                })
            }
        }
    }

    /// Eager homogeneity check: a multi-member union must be all enum
    /// references, all object references, or all string literals.
    fn validate_union(&self, members: &[TypeNode], union_name: &str) -> Result<()> {
        let first = self.union_member_kind(&members[0]);
        if !matches!(first, "enum" | "interface" | "string literal") {
            return Err(Error::IllegalUnionMember {
                union_name: union_name.to_owned(),
                member_kind: first,
            });
        }

        for member in &members[1..] {
            let kind = self.union_member_kind(member);
            if kind != first {
                return Err(Error::IllegalUnionMember {
                    union_name: union_name.to_owned(),
                    member_kind: kind,
                });
            }
        }
        Ok(())
    }

    fn union_member_kind(&self, node: &TypeNode) -> &'static str {
        match node {
            TypeNode::NotNull(inner) => self.union_member_kind(inner),
            TypeNode::Reference(target) => match self.graph.get(target) {
                Some(TypeNode::Interface(_)) => "interface",
                Some(TypeNode::Enum(_)) => "enum",
                Some(TypeNode::Alias(alias)) => self.union_member_kind(&alias.target),
                Some(other) => other.kind_name(),
                None => "reference",
            },
            other => other.kind_name(),
        }
    }

    fn ensure_date_scalar(&mut self) {
        if !self.graph.contains(DATE_TYPE) {
            self.graph.insert(
                DATE_TYPE,
                TypeNode::Alias(AliasNode {
                    target: Box::new(TypeNode::Any),
                    nullable: false,
                    id: false,
                    doc: DocComment::default(),
                }),
            );
        }
    }

    fn schema_tags(&self, doc: &DocComment, name: &str) -> Result<Vec<SchemaTag>> {
        docs::schema_tags(doc).map_err(|text| Error::MalformedGraphqlTag {
            text,
            name: name.to_owned(),
        })
    }
}

fn parse_doc(raw: Option<&str>) -> DocComment {
    raw.map(docs::parse_doc).unwrap_or_default()
}

/// The emitted value of an enum member: the initializer text (quotes and any
/// trailing cast stripped) when it is present and not purely numeric,
/// otherwise the member's own name. Numeric initializers carry no meaningful
/// string semantics for the target representation.
fn enum_member_value(member: &EnumMemberDecl) -> String {
    let Some(raw) = member.initializer.as_deref() else {
        return member.name.clone();
    };
    let raw = raw.trim();

    let text = match raw.chars().next() {
        // Quoted initializer: the value is everything inside the quotes; a
        // trailing cast (`'RED' as any`) sits outside them and falls away.
        Some(quote @ ('\'' | '"')) => match raw[1..].find(quote) {
            Some(end) => &raw[1..1 + end],
            None => raw,
        },
        _ => match raw.find(" as ") {
            Some(at) => raw[..at].trim_end(),
            None => raw,
        },
    };

    if text.is_empty() || text.parse::<f64>().is_ok() {
        member.name.clone()
    } else {
        text.to_owned()
    }
}
