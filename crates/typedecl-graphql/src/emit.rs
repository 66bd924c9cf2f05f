//! Phase two: lowers a completed [`TypeGraph`] into SDL text.
//!
//! Emission is lazy and demand driven: starting from the schema root's
//! `query` and `mutation` members, a type is rendered the first time it is
//! referenced and never again. Blocks land in discovery order, which makes
//! the output deterministic given a deterministic collection walk.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;

use crate::{
    docs::DocComment,
    errors::{Error, Result},
    graph::{
        AliasNode, Directive, EnumNode, EnumValue, InterfaceNode, Member, Method, TypeGraph,
        TypeNode,
    },
};

const INDENT: &str = "    ";

/// Renders the transitively reachable subset of `graph` from `schema_root`,
/// followed by the trailing `schema { ... }` block.
pub fn emit(graph: &TypeGraph, schema_root: &str) -> Result<String> {
    Emitter::new(graph).emit_schema(schema_root)
}

/// One emission run. All mutable state (memo, queue, claimed names) is owned
/// by the instance; every run gets a fresh emitter.
pub struct Emitter<'a> {
    graph: &'a TypeGraph,
    /// Aliases resolved as renames during preprocessing; these never emit a
    /// definition of their own.
    renames: HashMap<String, String>,
    /// Qualified name → emitted identifier, inserted before recursing so
    /// cyclic references terminate.
    emitted: HashMap<String, String>,
    /// Claimed identifier → qualified name, for collision suffixing.
    claimed: HashMap<String, String>,
    /// Aliases currently being redirected, to catch alias cycles before they
    /// recurse without bound.
    visiting: HashSet<String>,
    blocks: Vec<String>,
}

impl<'a> Emitter<'a> {
    pub fn new(graph: &'a TypeGraph) -> Self {
        Emitter {
            graph,
            renames: rename_pass(graph),
            emitted: HashMap::new(),
            claimed: HashMap::new(),
            visiting: HashSet::new(),
            blocks: Vec::new(),
        }
    }

    pub fn emit_schema(mut self, schema_root: &str) -> Result<String> {
        let graph = self.graph;
        let Some(TypeNode::Interface(root)) = graph.get(schema_root) else {
            return Err(Error::UnresolvableRoot(schema_root.to_owned()));
        };

        let query = root_member(root, "query")
            .ok_or_else(|| Error::RootWithoutQuery(schema_root.to_owned()))?;
        let query_name = self.root_reference(query, schema_root, "query")?;

        let mutation_name = root_member(root, "mutation")
            .map(|member| self.root_reference(member, schema_root, "mutation"))
            .transpose()?;

        let mut sdl = self.blocks.join("\n\n");
        if !sdl.is_empty() {
            sdl.push_str("\n\n");
        }
        sdl.push_str("schema {\n");
        sdl.push_str(&format!("{INDENT}query: {query_name}\n"));
        if let Some(mutation_name) = mutation_name {
            sdl.push_str(&format!("{INDENT}mutation: {mutation_name}\n"));
        }
        sdl.push_str("}\n");

        Ok(sdl)
    }

    fn root_reference(&mut self, ty: &TypeNode, root: &str, member: &str) -> Result<String> {
        match ty.unwrap_non_null() {
            TypeNode::Reference(target) => self.emit_named(target),
            other => Err(Error::UnrepresentableType {
                kind: other.kind_name(),
                context: format!("{root}.{member}"),
            }),
        }
    }

    /// Emits the definition behind a qualified name if it has not been
    /// emitted yet and returns the identifier to reference it by.
    fn emit_named(&mut self, qualified_name: &str) -> Result<String> {
        if let Some(renamed) = self.renames.get(qualified_name) {
            return Ok(renamed.clone());
        }
        if let Some(identifier) = self.emitted.get(qualified_name) {
            return Ok(identifier.clone());
        }

        let graph = self.graph;
        let node = graph
            .get(qualified_name)
            .ok_or_else(|| Error::DanglingReference(qualified_name.to_owned()))?;

        tracing::debug!(name = %qualified_name, kind = node.kind_name(), "emitting type");

        match node {
            TypeNode::Interface(interface) => self.emit_object(qualified_name, interface),
            TypeNode::Enum(node) => self.emit_enum(qualified_name, node),
            TypeNode::Alias(alias) => self.emit_alias(qualified_name, alias),
            other => Err(Error::UnrepresentableType {
                kind: other.kind_name(),
                context: qualified_name.to_owned(),
            }),
        }
    }

    fn emit_alias(&mut self, qualified_name: &str, alias: &'a AliasNode) -> Result<String> {
        match &*alias.target {
            // A named indirection: redirect to the target, no definition.
            // Redirection has no memo entry until the target resolves, so a
            // cycle of aliases must be caught here.
            TypeNode::Reference(target) => {
                if !self.visiting.insert(qualified_name.to_owned()) {
                    return Err(Error::CircularAlias(qualified_name.to_owned()));
                }
                let identifier = self.emit_named(target);
                self.visiting.remove(qualified_name);

                let identifier = identifier?;
                self.emitted
                    .insert(qualified_name.to_owned(), identifier.clone());
                Ok(identifier)
            }
            TypeNode::Union(union) => {
                let graph = self.graph;
                let members: Vec<UnionMember<'a>> = union
                    .members
                    .iter()
                    .map(|member| resolve_union_member(graph, member))
                    .collect();
                self.emit_union(qualified_name, &members, &alias.doc)
            }
            // An opaque shape becomes a custom scalar declaration.
            TypeNode::Any => {
                let identifier = self.claim_name(qualified_name);
                self.emitted
                    .insert(qualified_name.to_owned(), identifier.clone());

                let mut block = String::new();
                push_description(&mut block, &alias.doc.description, "");
                block.push_str(&format!(
                    "scalar {identifier}{}",
                    render_deprecated(&alias.doc)
                ));
                self.blocks.push(block);
                Ok(identifier)
            }
            // Structural shapes have no named GraphQL counterpart; inline the
            // rendered type wherever the alias is referenced.
            TypeNode::Array(_) | TypeNode::String | TypeNode::Float | TypeNode::Boolean
            | TypeNode::StringLiteral(_) => {
                let target = &alias.target;
                let rendered = self.type_ref(target, qualified_name)?;
                self.emitted
                    .insert(qualified_name.to_owned(), rendered.clone());
                Ok(rendered)
            }
            other => Err(Error::UnrepresentableType {
                kind: other.kind_name(),
                context: qualified_name.to_owned(),
            }),
        }
    }

    fn emit_enum(&mut self, qualified_name: &str, node: &'a EnumNode) -> Result<String> {
        let identifier = self.claim_name(qualified_name);
        self.emitted
            .insert(qualified_name.to_owned(), identifier.clone());

        let block = render_enum(&identifier, &node.values, &node.doc);
        self.blocks.push(block);
        Ok(identifier)
    }

    fn emit_union(
        &mut self,
        qualified_name: &str,
        members: &[UnionMember<'a>],
        doc: &DocComment,
    ) -> Result<String> {
        validate_union_members(qualified_name, members)?;

        let identifier = self.claim_name(qualified_name);
        self.emitted
            .insert(qualified_name.to_owned(), identifier.clone());

        match members.first() {
            Some(UnionMember::Object { .. }) => {
                let mut object_names = Vec::with_capacity(members.len());
                for member in members {
                    let UnionMember::Object { name, interface } = member else {
                        unreachable!("validated above");
                    };
                    if !interface.concrete {
                        return Err(Error::IllegalUnionMember {
                            union_name: qualified_name.to_owned(),
                            member_kind: "non-concrete interface",
                        });
                    }
                    object_names.push(self.emit_named(name)?);
                }

                let mut block = String::new();
                push_description(&mut block, &doc.description, "");
                block.push_str(&format!(
                    "union {identifier}{} = {}",
                    render_deprecated(doc),
                    object_names.join(" | ")
                ));
                self.blocks.push(block);
                Ok(identifier)
            }
            // All-enum and all-literal unions flatten into one synthesized
            // enum holding the deduplicated values in first-seen order.
            Some(UnionMember::Enum { .. } | UnionMember::Literal(_)) => {
                let mut values: Vec<EnumValue> = Vec::new();
                for member in members {
                    match member {
                        UnionMember::Enum { node, .. } => values.extend(node.values.iter().cloned()),
                        UnionMember::Literal(value) => values.push(EnumValue {
                            value: (*value).to_owned(),
                            doc: DocComment::default(),
                        }),
                        UnionMember::Object { .. } | UnionMember::Other(_) => {
                            unreachable!("validated above")
                        }
                    }
                }

                let block = render_enum(&identifier, &values, doc);
                self.blocks.push(block);
                Ok(identifier)
            }
            Some(UnionMember::Other(kind)) => Err(Error::IllegalUnionMember {
                union_name: qualified_name.to_owned(),
                member_kind: kind,
            }),
            None => Err(Error::AnonymousUnion(qualified_name.to_owned())),
        }
    }

    fn emit_object(
        &mut self,
        qualified_name: &str,
        interface: &'a InterfaceNode,
    ) -> Result<String> {
        let identifier = self.claim_name(qualified_name);
        self.emitted
            .insert(qualified_name.to_owned(), identifier.clone());

        let graph = self.graph;
        let (members, supertypes) = flatten_inheritance(graph, qualified_name)?;

        // `implements` only names supertypes that emit as real interface
        // definitions; concrete supertypes were flattened in and dropped.
        let mut implements = Vec::new();
        for supertype in supertypes.iter().copied() {
            if let Some(TypeNode::Interface(supernode)) = graph.get(supertype) {
                if !supernode.concrete && !supernode.input {
                    implements.push(self.emit_named(supertype)?);
                }
            }
        }

        let mut fields = String::new();
        for member in &members {
            let context = format!("{qualified_name}.{}", member.name());
            match member {
                Member::Property(property) => {
                    push_description(&mut fields, &property.doc.description, INDENT);
                    fields.push_str(&format!(
                        "{INDENT}{}: {}{}\n",
                        sanitize_name(&property.name),
                        self.type_ref(&property.ty, &context)?,
                        render_deprecated(&property.doc),
                    ));
                }
                Member::Method(method) => {
                    push_description(&mut fields, &method.doc.description, INDENT);
                    let arguments = self.method_arguments(method, &context)?;
                    fields.push_str(&format!(
                        "{INDENT}{}{}: {}{}{}\n",
                        sanitize_name(&method.name),
                        arguments,
                        self.type_ref(&method.returns, &context)?,
                        render_directives(&method.directives),
                        render_deprecated(&method.doc),
                    ));
                }
            }
        }
        if fields.is_empty() {
            // Empty object bodies are illegal in the target language.
            fields.push_str(&format!("{INDENT}_: Boolean\n"));
        }

        let keyword = if interface.input {
            "input"
        } else if interface.concrete {
            "type"
        } else {
            "interface"
        };

        let mut block = String::new();
        push_description(&mut block, &interface.doc.description, "");
        block.push_str(keyword);
        block.push(' ');
        block.push_str(&identifier);
        if !implements.is_empty() {
            block.push_str(&format!(" implements {}", implements.join(" & ")));
        }
        block.push_str(&render_deprecated(&interface.doc));
        block.push_str(" {\n");
        block.push_str(&fields);
        block.push('}');
        self.blocks.push(block);

        Ok(identifier)
    }

    /// Renders a method's argument list.
    ///
    /// The single parameter is inlined as top-level arguments when its type
    /// resolves to an interface; anything else renders as one named argument.
    fn method_arguments(&mut self, method: &'a Method, context: &str) -> Result<String> {
        let Some(parameter) = &method.parameter else {
            return Ok(String::new());
        };

        let graph = self.graph;
        if let Some(target) = parameter_object(graph, &parameter.ty) {
            let (members, _) = flatten_inheritance(graph, target)?;
            let mut arguments = Vec::with_capacity(members.len());
            for member in members {
                match member {
                    Member::Property(property) => arguments.push(format!(
                        "{}: {}",
                        sanitize_name(&property.name),
                        self.type_ref(&property.ty, context)?
                    )),
                    Member::Method(_) => {
                        return Err(Error::UnrepresentableType {
                            kind: "method",
                            context: format!("{context} (inlined argument object `{target}`)"),
                        })
                    }
                }
            }
            // Empty argument parentheses are illegal in the target language.
            if arguments.is_empty() {
                return Ok(String::new());
            }
            Ok(format!("({})", arguments.join(", ")))
        } else {
            Ok(format!(
                "({}: {})",
                sanitize_name(&parameter.name),
                self.type_ref(&parameter.ty, context)?
            ))
        }
    }

    /// Renders a type expression for field/argument position, emitting any
    /// referenced definitions on the way.
    fn type_ref(&mut self, node: &'a TypeNode, context: &str) -> Result<String> {
        match node {
            TypeNode::NotNull(inner) => Ok(format!("{}!", self.type_ref(inner, context)?)),
            TypeNode::Array(element) => Ok(format!("[{}]", self.type_ref(element, context)?)),
            TypeNode::Reference(target) => self.emit_named(target),
            TypeNode::String | TypeNode::StringLiteral(_) => Ok("String".to_owned()),
            TypeNode::Float => Ok("Float".to_owned()),
            TypeNode::Boolean => Ok("Boolean".to_owned()),
            TypeNode::Union(_) => Err(Error::AnonymousUnion(context.to_owned())),
            other => Err(Error::UnrepresentableType {
                kind: other.kind_name(),
                context: context.to_owned(),
            }),
        }
    }

    /// Claims a legal, unique identifier for a qualified name.
    fn claim_name(&mut self, qualified_name: &str) -> String {
        let base = sanitize_name(qualified_name);
        let mut candidate = base.clone();
        let mut suffix = 2;
        while let Some(owner) = self.claimed.get(&candidate) {
            if owner == qualified_name {
                break;
            }
            candidate = format!("{base}_{suffix}");
            suffix += 1;
        }
        self.claimed
            .insert(candidate.clone(), qualified_name.to_owned());
        candidate
    }
}

/// Preprocessing pass: aliases that merely rename a built-in primitive, and
/// aliases tagged `@graphql ID`, resolve as renames and never emit a
/// definition.
fn rename_pass(graph: &TypeGraph) -> HashMap<String, String> {
    let mut renames = HashMap::new();
    for (name, node) in graph.iter() {
        let TypeNode::Alias(alias) = node else {
            continue;
        };
        let renamed = if alias.id {
            "ID"
        } else {
            match &*alias.target {
                TypeNode::String => "String",
                TypeNode::Float => "Float",
                TypeNode::Boolean => "Boolean",
                _ => continue,
            }
        };
        renames.insert(name.clone(), renamed.to_owned());
    }
    renames
}

fn root_member<'g>(root: &'g InterfaceNode, name: &str) -> Option<&'g TypeNode> {
    root.members
        .iter()
        .find(|member| member.name() == name)
        .map(|member| match member {
            Member::Property(property) => &property.ty,
            Member::Method(method) => &method.returns,
        })
}

/// Denormalizes an inheritance chain: all transitive supertype members in one
/// list (nearest declaration wins per name, alphabetical order), plus the
/// chain of supertype names. More than one direct supertype anywhere in the
/// chain is fatal.
fn flatten_inheritance<'g>(
    graph: &'g TypeGraph,
    qualified_name: &str,
) -> Result<(Vec<&'g Member>, Vec<&'g str>)> {
    let mut members: indexmap::IndexMap<&str, &Member> = indexmap::IndexMap::new();
    let mut supertypes: Vec<&str> = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();

    // Borrow the graph's own key so the name outlives this frame.
    let Some((first_key, _)) = graph.iter().find(|(key, _)| key.as_str() == qualified_name)
    else {
        return Err(Error::DanglingReference(qualified_name.to_owned()));
    };
    let mut current: &str = first_key;

    loop {
        if !visited.insert(current) {
            break;
        }
        let Some(TypeNode::Interface(interface)) = graph.get(current) else {
            return Err(Error::DanglingReference(current.to_owned()));
        };
        for member in &interface.members {
            members.entry(member.name()).or_insert(member);
        }
        match interface.inherits.as_slice() {
            [] => break,
            [supertype] => {
                supertypes.push(supertype.as_str());
                current = supertype;
            }
            _ => return Err(Error::MultipleInheritance(current.to_owned())),
        }
    }

    let mut members: Vec<&Member> = members.into_values().collect();
    members.sort_by(|a, b| a.name().cmp(b.name()));
    Ok((members, supertypes))
}

/// Chases a parameter type to a plain interface node, if that is what it
/// names. Input-tagged interfaces stay referenced by name instead of being
/// inlined.
fn parameter_object<'g>(graph: &'g TypeGraph, node: &'g TypeNode) -> Option<&'g str> {
    let mut node = node;
    let mut hops = 0;
    loop {
        // Alias cycles would spin forever; the graph can't be deeper than
        // its entry count.
        if hops > graph.len() {
            return None;
        }
        hops += 1;
        match node {
            TypeNode::NotNull(inner) => node = inner,
            TypeNode::Reference(target) => match graph.get(target) {
                Some(TypeNode::Interface(interface)) if !interface.input => {
                    return Some(target.as_str())
                }
                Some(TypeNode::Alias(alias)) => node = &alias.target,
                _ => return None,
            },
            _ => return None,
        }
    }
}

enum UnionMember<'g> {
    Literal(&'g str),
    Enum {
        node: &'g EnumNode,
    },
    Object {
        name: &'g str,
        interface: &'g InterfaceNode,
    },
    Other(&'static str),
}

impl UnionMember<'_> {
    fn kind(&self) -> &'static str {
        match self {
            UnionMember::Literal(_) => "string literal",
            UnionMember::Enum { .. } => "enum",
            UnionMember::Object { .. } => "interface",
            UnionMember::Other(kind) => kind,
        }
    }
}

fn resolve_union_member<'g>(graph: &'g TypeGraph, node: &'g TypeNode) -> UnionMember<'g> {
    let mut node = node;
    let mut hops = 0;
    loop {
        if hops > graph.len() {
            return UnionMember::Other("circular alias");
        }
        hops += 1;
        match node {
            TypeNode::NotNull(inner) => node = inner,
            TypeNode::StringLiteral(value) => return UnionMember::Literal(value),
            TypeNode::Reference(target) => match graph.get(target) {
                Some(TypeNode::Interface(interface)) => {
                    return UnionMember::Object {
                        name: target.as_str(),
                        interface,
                    }
                }
                Some(TypeNode::Enum(enum_node)) => return UnionMember::Enum { node: enum_node },
                Some(TypeNode::Alias(alias)) => node = &alias.target,
                Some(other) => return UnionMember::Other(other.kind_name()),
                None => return UnionMember::Other("reference"),
            },
            other => return UnionMember::Other(other.kind_name()),
        }
    }
}

/// Defensive re-check of the collector's eager homogeneity validation.
fn validate_union_members(union_name: &str, members: &[UnionMember<'_>]) -> Result<()> {
    let Some(first) = members.first() else {
        return Ok(());
    };

    let first_kind = first.kind();
    if !matches!(first_kind, "enum" | "interface" | "string literal") {
        return Err(Error::IllegalUnionMember {
            union_name: union_name.to_owned(),
            member_kind: first_kind,
        });
    }

    for member in &members[1..] {
        if member.kind() != first_kind {
            return Err(Error::IllegalUnionMember {
                union_name: union_name.to_owned(),
                member_kind: member.kind(),
            });
        }
    }
    Ok(())
}

fn render_enum(identifier: &str, values: &[EnumValue], doc: &DocComment) -> String {
    let mut block = String::new();
    push_description(&mut block, &doc.description, "");
    block.push_str(&format!("enum {identifier}{} {{\n", render_deprecated(doc)));
    for value in values.iter().unique_by(|value| value.value.clone()) {
        push_description(&mut block, &value.doc.description, INDENT);
        block.push_str(&format!(
            "{INDENT}{}{}\n",
            value.value,
            render_deprecated(&value.doc)
        ));
    }
    block.push('}');
    block
}

fn render_directives(directives: &[Directive]) -> String {
    let mut out = String::new();
    for directive in directives {
        out.push_str(&format!(" @{}", directive.name));
        if !directive.arguments.is_empty() {
            let arguments = directive
                .arguments
                .iter()
                .map(|(name, value)| {
                    let rendered = match value {
                        crate::ArgumentValue::String(text) => quoted(text),
                        crate::ArgumentValue::Bare(token) => token.clone(),
                    };
                    format!("{name}: {rendered}")
                })
                .join(", ");
            out.push_str(&format!("({arguments})"));
        }
    }
    out
}

fn render_deprecated(doc: &DocComment) -> String {
    match doc.deprecation() {
        None => String::new(),
        Some(None) => " @deprecated".to_owned(),
        Some(Some(reason)) => format!(" @deprecated(reason: {})", quoted(reason)),
    }
}

fn push_description(out: &mut String, description: &str, indent: &str) {
    if description.is_empty() {
        return;
    }
    out.push_str(&format!("{indent}\"\"\"\n"));
    for line in description.lines() {
        out.push_str(&format!("{indent}{line}\n"));
    }
    out.push_str(&format!("{indent}\"\"\"\n"));
}

/// Replaces anything outside word characters with underscores, so dotted
/// qualified names become legal identifiers.
fn sanitize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        } else {
            out.push('_');
        }
    }
    if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

fn quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
