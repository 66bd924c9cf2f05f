//! Doc-comment extraction: turns the raw `/** ... */` text attached to a
//! declaration into a description plus an ordered list of `@tag` entries, and
//! classifies the `@graphql ...` tags this crate reacts to.

/// A parsed doc comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocComment {
    pub description: String,
    pub tags: Vec<DocTag>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocTag {
    /// The word after `@`, e.g. `deprecated`.
    pub title: String,
    /// Everything after the title until the next tag, trimmed.
    pub description: String,
}

impl DocComment {
    /// The deprecation marker, if any: `Some(None)` for a bare `@deprecated`,
    /// `Some(Some(reason))` when a reason follows.
    pub fn deprecation(&self) -> Option<Option<&str>> {
        self.tags
            .iter()
            .find(|tag| tag.title == "deprecated")
            .map(|tag| {
                if tag.description.is_empty() {
                    None
                } else {
                    Some(tag.description.as_str())
                }
            })
    }
}

/// One `@graphql ...` tag, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaTag {
    /// `@graphql schema` — marks a schema root interface.
    SchemaRoot,
    /// `@graphql input` — the interface emits as an input object type.
    Input,
    /// `@graphql ID` — the alias resolves to the `ID` scalar.
    Id,
    /// `@graphql override Name` — merges members into a collected interface.
    Override(String),
    /// `@graphql someDirective(args...)` — a custom directive to attach.
    Directive {
        name: String,
        /// Raw argument list including parentheses, if present.
        arguments: Option<String>,
    },
}

/// Classifies the `@graphql` tags of a doc comment. `Err` carries the raw
/// text of the first malformed tag.
pub fn schema_tags(doc: &DocComment) -> Result<Vec<SchemaTag>, String> {
    let mut tags = Vec::new();

    for tag in doc.tags.iter().filter(|tag| tag.title == "graphql") {
        let text = tag.description.trim();
        let (word, rest) = match text.find(char::is_whitespace) {
            Some(at) => (&text[..at], text[at..].trim_start()),
            None => (text, ""),
        };

        let classified = match word {
            "schema" if rest.is_empty() => SchemaTag::SchemaRoot,
            "input" if rest.is_empty() => SchemaTag::Input,
            "ID" if rest.is_empty() => SchemaTag::Id,
            "override" => {
                if rest.is_empty() || rest.contains(char::is_whitespace) {
                    return Err(text.to_owned());
                }
                SchemaTag::Override(rest.to_owned())
            }
            "" => return Err(text.to_owned()),
            directive => {
                // A custom directive, with or without an argument list.
                let (name, arguments) = match text.find('(') {
                    Some(at) => (text[..at].trim_end(), Some(text[at..].to_owned())),
                    None if rest.is_empty() => (directive, None),
                    None => return Err(text.to_owned()),
                };

                if !is_directive_name(name) {
                    return Err(text.to_owned());
                }

                SchemaTag::Directive {
                    name: name.to_owned(),
                    arguments,
                }
            }
        };

        tags.push(classified);
    }

    Ok(tags)
}

fn is_directive_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parses raw doc-comment text. Tolerates the `/** */` markers and leading
/// `*` gutters being present or already stripped.
pub fn parse_doc(raw: &str) -> DocComment {
    let mut description_lines: Vec<&str> = Vec::new();
    let mut tags: Vec<DocTag> = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix("/**").unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("*/").unwrap_or(trimmed);

    for line in trimmed.lines() {
        let line = strip_gutter(line);

        if let Some(rest) = line.strip_prefix('@') {
            if let Some((title, lines)) = current.take() {
                tags.push(make_tag(title, &lines));
            }
            let (title, description) = match rest.find(char::is_whitespace) {
                Some(at) => (&rest[..at], rest[at..].trim_start()),
                None => (rest, ""),
            };
            current = Some((title.to_owned(), vec![description]));
        } else if let Some((_, lines)) = current.as_mut() {
            lines.push(line);
        } else {
            description_lines.push(line);
        }
    }

    if let Some((title, lines)) = current.take() {
        tags.push(make_tag(title, &lines));
    }

    DocComment {
        description: join_trimmed(&description_lines),
        tags,
    }
}

fn strip_gutter(line: &str) -> &str {
    let line = line.trim_start();
    match line.strip_prefix('*') {
        Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
        None => line,
    }
}

fn make_tag(title: String, lines: &[&str]) -> DocTag {
    DocTag {
        title,
        description: join_trimmed(lines),
    }
}

fn join_trimmed(lines: &[&str]) -> String {
    let mut out = lines.join("\n");
    while out.ends_with('\n') {
        out.pop();
    }
    out.trim().to_owned()
}
