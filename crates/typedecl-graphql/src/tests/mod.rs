//! End-to-end tests: declaration programs in, SDL documents out.

use expect_test::{expect, Expect};

use crate::{
    ast::{
        Declaration, EnumDecl, EnumMemberDecl, InterfaceDecl, Member, MethodDecl, NamespaceDecl,
        ParameterDecl, PropertyDecl, Program, TypeAliasDecl, TypeExpr,
    },
    generate_sdl, Error,
};

fn check(program: Program, roots: &[&str], expected: Expect) {
    let roots: Vec<String> = roots.iter().map(|root| (*root).to_owned()).collect();
    let sdl = generate_sdl(&program, &roots).expect("generation succeeds");
    expected.assert_eq(&sdl);
}

fn check_error(program: Program, roots: &[&str]) -> Error {
    let roots: Vec<String> = roots.iter().map(|root| (*root).to_owned()).collect();
    generate_sdl(&program, &roots).expect_err("generation fails")
}

fn doc(text: &str) -> Option<String> {
    Some(text.to_owned())
}

fn schema_root(members: Vec<Member>) -> Declaration {
    Declaration::Interface(InterfaceDecl {
        name: "Schema".to_owned(),
        exported: true,
        doc: doc("@graphql schema"),
        members,
        ..Default::default()
    })
}

fn interface(name: &str, members: Vec<Member>) -> Declaration {
    Declaration::Interface(InterfaceDecl {
        name: name.to_owned(),
        exported: true,
        members,
        ..Default::default()
    })
}

fn type_alias(name: &str, target: TypeExpr) -> Declaration {
    Declaration::TypeAlias(TypeAliasDecl {
        name: name.to_owned(),
        exported: true,
        target,
        ..Default::default()
    })
}

fn enum_decl(name: &str, members: &[(&str, Option<&str>)]) -> Declaration {
    Declaration::Enum(EnumDecl {
        name: name.to_owned(),
        exported: true,
        members: members
            .iter()
            .map(|(member, initializer)| EnumMemberDecl {
                name: (*member).to_owned(),
                initializer: initializer.map(str::to_owned),
                doc: None,
            })
            .collect(),
        ..Default::default()
    })
}

fn property(name: &str, ty: TypeExpr) -> Member {
    Member::Property(PropertyDecl {
        name: name.to_owned(),
        ty,
        ..Default::default()
    })
}

fn optional_property(name: &str, ty: TypeExpr) -> Member {
    Member::Property(PropertyDecl {
        name: name.to_owned(),
        optional: true,
        ty,
        ..Default::default()
    })
}

fn method(name: &str, parameter: Option<ParameterDecl>, returns: TypeExpr) -> Member {
    Member::Method(MethodDecl {
        name: name.to_owned(),
        parameters: parameter.into_iter().collect(),
        returns,
        ..Default::default()
    })
}

fn param(name: &str, ty: TypeExpr) -> ParameterDecl {
    ParameterDecl {
        name: name.to_owned(),
        ty,
        ..Default::default()
    }
}

#[test]
fn planets_schema_end_to_end() {
    let program = Program {
        declarations: vec![
            schema_root(vec![
                property("query", TypeExpr::name("QueryRoot")),
                property("mutation", TypeExpr::name("MutationRoot")),
            ]),
            interface(
                "QueryRoot",
                vec![property("planetTypes", TypeExpr::name("Planet"))],
            ),
            interface("MutationRoot", vec![]),
            enum_decl(
                "Planet",
                &[("Mercury", Some("'mercury'")), ("Venus", Some("'venus'"))],
            ),
        ],
    };

    check(
        program,
        &[],
        expect![[r#"
            enum Planet {
                mercury
                venus
            }

            type QueryRoot {
                planetTypes: Planet!
            }

            type MutationRoot {
                _: Boolean
            }

            schema {
                query: QueryRoot
                mutation: MutationRoot
            }
        "#]],
    );
}

#[test]
fn enum_unions_flatten_into_one_enum() {
    let program = Program {
        declarations: vec![
            schema_root(vec![property("query", TypeExpr::name("QueryRoot"))]),
            interface(
                "QueryRoot",
                vec![method("search", None, TypeExpr::name("FooSearchResult"))],
            ),
            enum_decl("Color", &[("Red", Some("'RED'")), ("Yellow", None), ("Blue", None)]),
            enum_decl("Size", &[("Big", None), ("Small", None)]),
            type_alias(
                "FooSearchResult",
                TypeExpr::union([TypeExpr::name("Color"), TypeExpr::name("Size")]),
            ),
        ],
    };

    check(
        program,
        &[],
        expect![[r#"
            enum FooSearchResult {
                RED
                Yellow
                Blue
                Big
                Small
            }

            type QueryRoot {
                search: FooSearchResult!
            }

            schema {
                query: QueryRoot
            }
        "#]],
    );
}

#[test]
fn object_unions_and_literal_unions() {
    let program = Program {
        declarations: vec![
            schema_root(vec![property("query", TypeExpr::name("QueryRoot"))]),
            interface(
                "QueryRoot",
                vec![
                    property("beings", TypeExpr::array(TypeExpr::name("Being"))),
                    property("direction", TypeExpr::name("Direction")),
                ],
            ),
            interface("Human", vec![property("name", TypeExpr::String)]),
            interface("Droid", vec![property("serial", TypeExpr::String)]),
            type_alias(
                "Being",
                TypeExpr::union([TypeExpr::name("Human"), TypeExpr::name("Droid")]),
            ),
            type_alias(
                "Direction",
                TypeExpr::union([TypeExpr::literal("asc"), TypeExpr::literal("desc")]),
            ),
        ],
    };

    check(
        program,
        &[],
        expect![[r#"
            type Human {
                name: String!
            }

            type Droid {
                serial: String!
            }

            union Being = Human | Droid

            enum Direction {
                asc
                desc
            }

            type QueryRoot {
                beings: [Being!]!
                direction: Direction!
            }

            schema {
                query: QueryRoot
            }
        "#]],
    );
}

#[test]
fn mixed_unions_are_rejected() {
    let program = Program {
        declarations: vec![
            schema_root(vec![property("query", TypeExpr::name("QueryRoot"))]),
            interface("QueryRoot", vec![property("bad", TypeExpr::name("Bad"))]),
            interface("Human", vec![property("name", TypeExpr::String)]),
            enum_decl("Color", &[("Red", None)]),
            type_alias(
                "Bad",
                TypeExpr::union([TypeExpr::name("Color"), TypeExpr::name("Human")]),
            ),
        ],
    };

    let error = check_error(program, &[]);
    assert!(matches!(
        error,
        Error::IllegalUnionMember {
            member_kind: "interface",
            ..
        }
    ));
}

#[test]
fn anonymous_unions_in_field_position_are_rejected() {
    let program = Program {
        declarations: vec![
            schema_root(vec![property("query", TypeExpr::name("QueryRoot"))]),
            interface(
                "QueryRoot",
                vec![property(
                    "thing",
                    TypeExpr::union([TypeExpr::name("Human"), TypeExpr::name("Droid")]),
                )],
            ),
            interface("Human", vec![property("name", TypeExpr::String)]),
            interface("Droid", vec![property("serial", TypeExpr::String)]),
        ],
    };

    let error = check_error(program, &[]);
    assert!(matches!(error, Error::AnonymousUnion(context) if context == "QueryRoot.thing"));
}

#[test]
fn descriptions_and_deprecations_propagate() {
    let program = Program {
        declarations: vec![
            schema_root(vec![property("query", TypeExpr::name("QueryRoot"))]),
            interface(
                "QueryRoot",
                vec![
                    Member::Property(PropertyDecl {
                        name: "name".to_owned(),
                        ty: TypeExpr::String,
                        doc: doc("A being's name.\n@deprecated use fullName"),
                        ..Default::default()
                    }),
                    property("planet", TypeExpr::name("Planet")),
                ],
            ),
            Declaration::Enum(EnumDecl {
                name: "Planet".to_owned(),
                exported: true,
                doc: doc("The known planets."),
                members: vec![
                    EnumMemberDecl {
                        name: "Mercury".to_owned(),
                        initializer: Some("'mercury'".to_owned()),
                        doc: None,
                    },
                    EnumMemberDecl {
                        name: "Pluto".to_owned(),
                        initializer: Some("'pluto'".to_owned()),
                        doc: doc("Gone.\n@deprecated demoted"),
                    },
                ],
                ..Default::default()
            }),
        ],
    };

    check(
        program,
        &[],
        expect![[r#"
            """
            The known planets.
            """
            enum Planet {
                mercury
                """
                Gone.
                """
                pluto @deprecated(reason: "demoted")
            }

            type QueryRoot {
                """
                A being's name.
                """
                name: String! @deprecated(reason: "use fullName")
                planet: Planet!
            }

            schema {
                query: QueryRoot
            }
        "#]],
    );
}

#[test]
fn overrides_replace_and_extend_members() {
    let program = Program {
        declarations: vec![
            schema_root(vec![property("query", TypeExpr::name("QueryRoot"))]),
            interface("QueryRoot", vec![property("user", TypeExpr::name("User"))]),
            interface("User", vec![property("name", TypeExpr::String)]),
            Declaration::Interface(InterfaceDecl {
                name: "UserOverride".to_owned(),
                exported: true,
                doc: doc("@graphql override User"),
                members: vec![
                    method(
                        "name",
                        Some(param("filter", TypeExpr::String)),
                        TypeExpr::String,
                    ),
                    property("age", TypeExpr::Number),
                ],
                ..Default::default()
            }),
        ],
    };

    check(
        program,
        &[],
        expect![[r#"
            type User {
                age: Float!
                name(filter: String!): String!
            }

            type QueryRoot {
                user: User!
            }

            schema {
                query: QueryRoot
            }
        "#]],
    );
}

#[test]
fn namespaced_names_are_sanitized_and_collisions_suffixed() {
    let program = Program {
        declarations: vec![
            schema_root(vec![property("query", TypeExpr::name("QueryRoot"))]),
            Declaration::Namespace(NamespaceDecl {
                name: "A".to_owned(),
                exported: true,
                declarations: vec![enum_decl("Status", &[("Ok", None)])],
                ..Default::default()
            }),
            enum_decl("A_Status", &[("No", None)]),
            interface(
                "QueryRoot",
                vec![
                    property("first", TypeExpr::name("A.Status")),
                    property("second", TypeExpr::name("A_Status")),
                ],
            ),
        ],
    };

    check(
        program,
        &[],
        expect![[r#"
            enum A_Status {
                Ok
            }

            enum A_Status_2 {
                No
            }

            type QueryRoot {
                first: A_Status!
                second: A_Status_2!
            }

            schema {
                query: QueryRoot
            }
        "#]],
    );
}

#[test]
fn recursive_types_emit_once() {
    let program = Program {
        declarations: vec![
            schema_root(vec![property("query", TypeExpr::name("QueryRoot"))]),
            interface(
                "QueryRoot",
                vec![property("employee", TypeExpr::name("Employee"))],
            ),
            interface(
                "Employee",
                vec![
                    optional_property("manager", TypeExpr::name("Employee")),
                    property("reports", TypeExpr::array(TypeExpr::name("Employee"))),
                ],
            ),
        ],
    };

    check(
        program,
        &[],
        expect![[r#"
            type Employee {
                manager: Employee
                reports: [Employee!]!
            }

            type QueryRoot {
                employee: Employee!
            }

            schema {
                query: QueryRoot
            }
        "#]],
    );
}

#[test]
fn pure_supertypes_emit_as_interfaces_with_implements() {
    let program = Program {
        declarations: vec![
            schema_root(vec![property("query", TypeExpr::name("QueryRoot"))]),
            interface("QueryRoot", vec![property("user", TypeExpr::name("User"))]),
            interface("Node", vec![property("id", TypeExpr::String)]),
            Declaration::Interface(InterfaceDecl {
                name: "User".to_owned(),
                exported: true,
                extends: vec!["Node".to_owned()],
                members: vec![property("name", TypeExpr::String)],
                ..Default::default()
            }),
        ],
    };

    check(
        program,
        &[],
        expect![[r#"
            interface Node {
                id: String!
            }

            type User implements Node {
                id: String!
                name: String!
            }

            type QueryRoot {
                user: User!
            }

            schema {
                query: QueryRoot
            }
        "#]],
    );
}

#[test]
fn concrete_supertypes_are_flattened_without_implements() {
    let program = Program {
        declarations: vec![
            schema_root(vec![property("query", TypeExpr::name("QueryRoot"))]),
            interface(
                "QueryRoot",
                vec![
                    property("node", TypeExpr::name("Node")),
                    property("user", TypeExpr::name("User")),
                ],
            ),
            interface("Node", vec![property("id", TypeExpr::String)]),
            Declaration::Interface(InterfaceDecl {
                name: "User".to_owned(),
                exported: true,
                extends: vec!["Node".to_owned()],
                members: vec![property("name", TypeExpr::String)],
                ..Default::default()
            }),
        ],
    };

    check(
        program,
        &[],
        expect![[r#"
            type Node {
                id: String!
            }

            type User {
                id: String!
                name: String!
            }

            type QueryRoot {
                node: Node!
                user: User!
            }

            schema {
                query: QueryRoot
            }
        "#]],
    );
}

#[test]
fn multiple_inheritance_cannot_be_flattened() {
    let program = Program {
        declarations: vec![
            schema_root(vec![property("query", TypeExpr::name("QueryRoot"))]),
            interface("QueryRoot", vec![property("c", TypeExpr::name("C"))]),
            interface("A", vec![property("a", TypeExpr::String)]),
            interface("B", vec![property("b", TypeExpr::String)]),
            Declaration::Interface(InterfaceDecl {
                name: "C".to_owned(),
                exported: true,
                extends: vec!["A".to_owned(), "B".to_owned()],
                members: vec![],
                ..Default::default()
            }),
        ],
    };

    let error = check_error(program, &[]);
    assert!(matches!(error, Error::MultipleInheritance(name) if name == "C"));
}

#[test]
fn mutually_recursive_aliases_are_rejected() {
    let program = Program {
        declarations: vec![
            schema_root(vec![property("query", TypeExpr::name("QueryRoot"))]),
            interface("QueryRoot", vec![property("a", TypeExpr::name("A"))]),
            type_alias("A", TypeExpr::name("B")),
            type_alias("B", TypeExpr::name("A")),
        ],
    };

    let error = check_error(program, &[]);
    assert!(matches!(error, Error::CircularAlias(name) if name == "A"));
}

#[test]
fn empty_parameter_objects_inline_to_no_arguments() {
    let program = Program {
        declarations: vec![
            schema_root(vec![property("query", TypeExpr::name("QueryRoot"))]),
            interface(
                "QueryRoot",
                vec![method(
                    "ping",
                    Some(param("opts", TypeExpr::name("Empty"))),
                    TypeExpr::String,
                )],
            ),
            interface("Empty", vec![]),
        ],
    };

    check(
        program,
        &[],
        expect![[r#"
            type QueryRoot {
                ping: String!
            }

            schema {
                query: QueryRoot
            }
        "#]],
    );
}

#[test]
fn parameter_objects_inline_while_inputs_stay_named() {
    let program = Program {
        declarations: vec![
            schema_root(vec![property("query", TypeExpr::name("QueryRoot"))]),
            interface(
                "QueryRoot",
                vec![
                    method(
                        "byId",
                        Some(param("id", TypeExpr::String)),
                        TypeExpr::String,
                    ),
                    method(
                        "lookup",
                        Some(param("filter", TypeExpr::name("Filter"))),
                        TypeExpr::String,
                    ),
                    method(
                        "search",
                        Some(param("params", TypeExpr::name("SearchParams"))),
                        TypeExpr::String,
                    ),
                ],
            ),
            Declaration::Interface(InterfaceDecl {
                name: "Filter".to_owned(),
                exported: true,
                doc: doc("@graphql input"),
                members: vec![property("text", TypeExpr::String)],
                ..Default::default()
            }),
            interface(
                "SearchParams",
                vec![
                    optional_property("limit", TypeExpr::Number),
                    property("text", TypeExpr::String),
                ],
            ),
        ],
    };

    check(
        program,
        &[],
        expect![[r#"
            input Filter {
                text: String!
            }

            type QueryRoot {
                byId(id: String!): String!
                lookup(filter: Filter!): String!
                search(limit: Float, text: String!): String!
            }

            schema {
                query: QueryRoot
            }
        "#]],
    );
}

#[test]
fn primitive_aliases_rename_and_opaque_aliases_emit_scalars() {
    let program = Program {
        declarations: vec![
            schema_root(vec![property("query", TypeExpr::name("QueryRoot"))]),
            interface(
                "QueryRoot",
                vec![
                    property("born", TypeExpr::name("Date")),
                    property("data", TypeExpr::name("Payload")),
                    property("id", TypeExpr::name("UserId")),
                    property("name", TypeExpr::name("Name")),
                ],
            ),
            interface("Date", vec![property("getTime", TypeExpr::Number)]),
            type_alias("Payload", TypeExpr::Any),
            Declaration::TypeAlias(TypeAliasDecl {
                name: "UserId".to_owned(),
                exported: true,
                doc: doc("@graphql ID"),
                target: TypeExpr::String,
                ..Default::default()
            }),
            type_alias("Name", TypeExpr::String),
        ],
    };

    check(
        program,
        &[],
        expect![[r#"
            scalar Date

            scalar Payload

            type QueryRoot {
                born: Date!
                data: Payload
                id: ID!
                name: String!
            }

            schema {
                query: QueryRoot
            }
        "#]],
    );
}

#[test]
fn custom_directives_render_on_fields() {
    let program = Program {
        declarations: vec![
            schema_root(vec![property("query", TypeExpr::name("QueryRoot"))]),
            interface(
                "QueryRoot",
                vec![Member::Method(MethodDecl {
                    name: "users".to_owned(),
                    parameters: vec![],
                    returns: TypeExpr::array(TypeExpr::String),
                    doc: doc("@graphql sql(table: \"users\", order: ASC)"),
                })],
            ),
        ],
    };

    check(
        program,
        &[],
        expect![[r#"
            type QueryRoot {
                users: [String!]! @sql(table: "users", order: ASC)
            }

            schema {
                query: QueryRoot
            }
        "#]],
    );
}

#[test]
fn explicit_roots_emit_one_document_each() {
    let program = Program {
        declarations: vec![
            interface(
                "PublicSchema",
                vec![property("query", TypeExpr::name("PublicQuery"))],
            ),
            interface(
                "AdminSchema",
                vec![property("query", TypeExpr::name("AdminQuery"))],
            ),
            interface("PublicQuery", vec![property("ping", TypeExpr::String)]),
            interface("AdminQuery", vec![property("users", TypeExpr::String)]),
        ],
    };

    check(
        program,
        &["PublicSchema", "AdminSchema"],
        expect![[r#"
            type PublicQuery {
                ping: String!
            }

            schema {
                query: PublicQuery
            }

            type AdminQuery {
                users: String!
            }

            schema {
                query: AdminQuery
            }
        "#]],
    );
}

#[test]
fn missing_roots_are_reported() {
    let program = Program {
        declarations: vec![interface("Plain", vec![property("x", TypeExpr::String)])],
    };

    assert!(matches!(
        check_error(program, &[]),
        Error::EmptySchema
    ));

    let program = Program {
        declarations: vec![interface("Plain", vec![property("x", TypeExpr::String)])],
    };
    assert!(matches!(
        check_error(program, &["Nope"]),
        Error::UnresolvableRoot(name) if name == "Nope"
    ));
}

#[test]
fn roots_must_declare_a_query_member() {
    let program = Program {
        declarations: vec![
            schema_root(vec![property("mutation", TypeExpr::name("MutationRoot"))]),
            interface("MutationRoot", vec![]),
        ],
    };

    let error = check_error(program, &[]);
    assert!(matches!(error, Error::RootWithoutQuery(name) if name == "Schema"));
}
