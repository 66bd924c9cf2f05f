//! Generates a GraphQL SDL document from typed source declarations.
//!
//! The pipeline has two phases. The [`collect`] phase walks a declaration
//! module starting from one or more schema roots and normalizes everything
//! transitively reachable into a [`graph::TypeGraph`]. The [`emit`] phase
//! lowers that graph into SDL text, flattening inheritance, validating union
//! composition and resolving naming collisions along the way.
//!
//! Most users only need [`generate_sdl`].

pub mod ast;
pub mod collect;
pub mod emit;
pub mod graph;

mod directive;
mod docs;
mod errors;
mod pipeline;
mod symbols;

#[cfg(test)]
mod tests;

pub use directive::{ArgumentValue, Arguments, DirectiveParseError};
pub use docs::{DocComment, DocTag};
pub use errors::Error;
pub use pipeline::generate_sdl;
pub use symbols::{Symbol, SymbolTable};
