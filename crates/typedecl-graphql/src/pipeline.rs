//! The end-to-end driver: symbol table, collection, override merging, then
//! one emitted document per schema root.

use crate::{
    ast::{Declaration, Program},
    collect::Collector,
    docs::{self, SchemaTag},
    emit,
    errors::{Error, Result},
    symbols::{Symbol, SymbolTable},
};

/// Generates SDL for a program.
///
/// With explicit `roots`, each name must resolve to a top-level exported
/// interface. With none, every exported interface tagged `@graphql schema`
/// becomes a root. Each root yields a complete document, concatenated in
/// order.
pub fn generate_sdl(program: &Program, roots: &[String]) -> Result<String> {
    let symbols = SymbolTable::build(program);
    let root_symbols = find_roots(&symbols, roots)?;

    let mut collector = Collector::new(&symbols);
    let mut root_names = Vec::with_capacity(root_symbols.len());
    for symbol in &root_symbols {
        root_names.push(collector.collect_root(symbol)?);
    }

    // Overrides merge only after the whole graph exists, so a target is
    // never missed because its override was declared first.
    apply_overrides(&mut collector, &symbols)?;

    let graph = collector.finish();
    tracing::debug!(
        types = graph.len(),
        roots = root_names.len(),
        "type graph complete"
    );

    let mut documents = Vec::with_capacity(root_names.len());
    for root in &root_names {
        documents.push(emit::emit(&graph, root)?);
    }
    Ok(documents.join("\n"))
}

fn find_roots<'a>(
    symbols: &'a SymbolTable<'a>,
    requested: &[String],
) -> Result<Vec<&'a Symbol<'a>>> {
    if requested.is_empty() {
        return discover_roots(symbols);
    }

    requested
        .iter()
        .map(|name| {
            symbols
                .resolve(name, "")
                .filter(|symbol| {
                    symbol.declaration.exported()
                        && matches!(symbol.declaration, Declaration::Interface(_))
                })
                .ok_or_else(|| Error::UnresolvableRoot(name.clone()))
        })
        .collect()
}

/// Scans top-level exported interfaces for the `@graphql schema` tag.
fn discover_roots<'a>(symbols: &'a SymbolTable<'a>) -> Result<Vec<&'a Symbol<'a>>> {
    let mut roots = Vec::new();
    for symbol in symbols.exported_root_candidates() {
        if tags_of(symbol)?.contains(&SchemaTag::SchemaRoot) {
            roots.push(symbol);
        }
    }
    if roots.is_empty() {
        return Err(Error::EmptySchema);
    }
    Ok(roots)
}

fn apply_overrides<'a>(
    collector: &mut Collector<'a>,
    symbols: &'a SymbolTable<'a>,
) -> Result<()> {
    for symbol in symbols.iter() {
        if !matches!(symbol.declaration, Declaration::Interface(_)) {
            continue;
        }
        for tag in tags_of(symbol)? {
            if let SchemaTag::Override(target) = tag {
                collector.apply_override(symbol, &target)?;
            }
        }
    }
    Ok(())
}

fn tags_of(symbol: &Symbol<'_>) -> Result<Vec<SchemaTag>> {
    let doc = symbol
        .declaration
        .doc()
        .map(docs::parse_doc)
        .unwrap_or_default();
    docs::schema_tags(&doc).map_err(|text| Error::MalformedGraphqlTag {
        text,
        name: symbol.qualified_name.clone(),
    })
}
