//! Symbol table over a [`Program`]: qualified naming and name resolution.
//!
//! Qualified names are built from the lexical parent chain. Exported
//! namespaces contribute their name as a segment, default-exported ones
//! contribute the `default` sentinel, and non-exported wrapper namespaces
//! contribute nothing, so their members surface at the parent level.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::ast::{Declaration, Program};

#[derive(Debug)]
pub struct Symbol<'a> {
    pub qualified_name: String,
    pub declaration: &'a Declaration,
    /// The qualified prefix in which names used by this declaration resolve.
    pub scope: String,
    pub top_level: bool,
}

#[derive(Debug)]
pub struct SymbolTable<'a> {
    by_qualified_name: IndexMap<String, Symbol<'a>>,
}

impl<'a> SymbolTable<'a> {
    pub fn build(program: &'a Program) -> Self {
        let mut table = SymbolTable {
            by_qualified_name: IndexMap::new(),
        };
        table.register_all(&program.declarations, "", true);
        table
    }

    fn register_all(&mut self, declarations: &'a [Declaration], prefix: &str, top_level: bool) {
        for declaration in declarations {
            if let Declaration::Namespace(namespace) = declaration {
                let nested_prefix = if namespace.default_export {
                    join(prefix, "default")
                } else if namespace.exported {
                    join(prefix, &namespace.name)
                } else {
                    // Raw wrapper module: no segment of its own.
                    prefix.to_owned()
                };
                self.register_all(&namespace.declarations, &nested_prefix, false);
                continue;
            }

            let qualified_name = join(prefix, declaration.name());
            // First registration wins; re-registering the same name is a no-op.
            self.by_qualified_name
                .entry(qualified_name.clone())
                .or_insert(Symbol {
                    qualified_name,
                    declaration,
                    scope: prefix.to_owned(),
                    top_level,
                });
        }
    }

    /// Resolves a possibly dotted name from the given scope, walking outward
    /// through enclosing scopes and chasing import-alias indirection to the
    /// ultimate declaration. Returns `None` for unknown names and alias
    /// cycles.
    pub fn resolve(&self, name: &str, scope: &str) -> Option<&Symbol<'a>> {
        let symbol = self.lookup(name, scope)?;
        self.expand_alias(symbol)
    }

    fn lookup(&self, name: &str, scope: &str) -> Option<&Symbol<'a>> {
        let mut scope = scope;
        loop {
            let candidate = join(scope, name);
            if let Some(symbol) = self.by_qualified_name.get(&candidate) {
                return Some(symbol);
            }
            scope = match scope.rfind('.') {
                Some(at) => &scope[..at],
                None if scope.is_empty() => return None,
                None => "",
            };
        }
    }

    fn expand_alias<'s>(&'s self, mut symbol: &'s Symbol<'a>) -> Option<&'s Symbol<'a>> {
        let mut visited = HashSet::new();
        while let Declaration::ImportAlias(alias) = symbol.declaration {
            if !visited.insert(symbol.qualified_name.clone()) {
                return None;
            }
            symbol = self.lookup(&alias.target, &symbol.scope)?;
        }
        Some(symbol)
    }

    /// All registered symbols in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol<'a>> {
        self.by_qualified_name.values()
    }

    /// Top-level exported interfaces, the candidates for `@graphql schema`
    /// root discovery.
    pub fn exported_root_candidates(&self) -> impl Iterator<Item = &Symbol<'a>> {
        self.iter().filter(|symbol| {
            symbol.top_level
                && symbol.declaration.exported()
                && matches!(symbol.declaration, Declaration::Interface(_))
        })
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_owned()
    } else {
        format!("{prefix}.{name}")
    }
}
