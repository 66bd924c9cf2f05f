use crate::{ast::SourcePosition, directive::DirectiveParseError};

/// Everything that can go wrong between walking the declaration module and
/// writing out SDL. Every error aborts the run: a structurally invalid type
/// graph cannot produce a meaningful partial schema.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported declaration kind `{kind}` reached while walking `{name}` ({position})")]
    UnsupportedDeclaration {
        kind: &'static str,
        name: String,
        position: SourcePosition,
    },

    #[error("could not resolve type name `{name}` referenced from `{referrer}` ({position})")]
    UnresolvedName {
        name: String,
        referrer: String,
        position: SourcePosition,
    },

    #[error("`{method}` on `{name}` declares more than one parameter; combine them into a single structural parameter ({position})")]
    TooManyParameters {
        name: String,
        method: String,
        position: SourcePosition,
    },

    #[error("override target `{0}` was never collected; overrides cannot introduce new types")]
    MissingOverrideTarget(String),

    #[error("union `{union_name}` has a member of unexpected kind `{member_kind}`: unions must be all enum references or all object type references")]
    IllegalUnionMember {
        union_name: String,
        member_kind: &'static str,
    },

    #[error("`{0}` inherits from more than one supertype, which cannot be flattened into a GraphQL object type")]
    MultipleInheritance(String),

    #[error("root type `{0}` was not found among the exported declarations")]
    UnresolvableRoot(String),

    #[error("schema root `{0}` does not declare a `query` member")]
    RootWithoutQuery(String),

    #[error("no schema root was supplied and no interface carries a `@graphql schema` tag")]
    EmptySchema,

    #[error("invalid arguments for directive `@{directive}` on `{name}`: {source}")]
    DirectiveArguments {
        directive: String,
        name: String,
        #[source]
        source: DirectiveParseError,
    },

    #[error("malformed `@graphql` tag `{text}` on `{name}`")]
    MalformedGraphqlTag { text: String, name: String },

    #[error("`{context}` has no GraphQL projection for a value of kind `{kind}`")]
    UnrepresentableType {
        kind: &'static str,
        context: String,
    },

    #[error("the union reached through `{0}` must be named via a type alias before it can be emitted")]
    AnonymousUnion(String),

    #[error("reference `{0}` points at nothing in the type graph")]
    DanglingReference(String),

    #[error("alias `{0}` refers back to itself through other aliases")]
    CircularAlias(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
