//! End-to-end tests for the JSX adapter.
//!
//! Trees are hand-built in the shape Babel (`start`/`end`) and
//! typescript-estree (`range`) emit, trimmed to the fields the adapter reads.

use classort::jsx::{collect_changes, format_jsx};
use classort::options::{OptionOverrides, ResolvedOptions};
use classort::session::FormatSession;
use classort::{ParserKind, StaticOracle};
use serde_json::{json, Value};

fn oracle() -> StaticOracle {
    StaticOracle::from_order(["container", "flex", "p-4", "text-sm"]).with_bucket("components", 0)
}

fn session() -> FormatSession<StaticOracle> {
    FormatSession::new(ParserKind::Jsx, oracle(), ResolvedOptions::default())
}

fn session_with_functions(functions: &[&str]) -> FormatSession<StaticOracle> {
    let overrides = OptionOverrides {
        functions: Some(functions.iter().map(|s| s.to_string()).collect()),
        ..Default::default()
    };
    FormatSession::new(
        ParserKind::Jsx,
        oracle(),
        ResolvedOptions::resolve(None, &overrides),
    )
}

fn program(expression: Value) -> Value {
    json!({
        "type": "File",
        "program": {
            "type": "Program",
            "body": [{"type": "ExpressionStatement", "expression": expression}]
        }
    })
}

fn ident(name: &str) -> Value {
    json!({"type": "Identifier", "name": name})
}

fn string_lit(value: &str, start: usize, end: usize) -> Value {
    json!({"type": "StringLiteral", "value": value, "start": start, "end": end})
}

fn jsx_element(attributes: Vec<Value>) -> Value {
    json!({
        "type": "JSXElement",
        "openingElement": {
            "type": "JSXOpeningElement",
            "name": {"type": "JSXIdentifier", "name": "div"},
            "attributes": attributes
        },
        "children": []
    })
}

fn jsx_attr(name: &str, value: Value) -> Value {
    json!({
        "type": "JSXAttribute",
        "name": {"type": "JSXIdentifier", "name": name},
        "value": value
    })
}

mod attribute_tests {
    use super::*;

    #[test]
    fn sorts_class_name_literal() {
        let source = r#"<div className="p-4 flex" />"#;
        let ast = program(jsx_element(vec![jsx_attr(
            "className",
            string_lit("p-4 flex", 15, 25),
        )]));

        let out = format_jsx(source, &ast, &session()).unwrap();
        assert_eq!(out, r#"<div className="flex p-4" />"#);
    }

    #[test]
    fn leaves_other_attributes_alone() {
        let source = r#"<a id="p-4 flex" className={clsx("text-sm p-4", on && "flex container")} />"#;
        let call = json!({
            "type": "CallExpression",
            "callee": ident("clsx"),
            "arguments": [
                string_lit("text-sm p-4", 33, 46),
                {
                    "type": "LogicalExpression",
                    "operator": "&&",
                    "left": ident("on"),
                    "right": string_lit("flex container", 54, 70)
                }
            ]
        });
        let ast = program(jsx_element(vec![
            jsx_attr("id", string_lit("p-4 flex", 6, 16)),
            jsx_attr(
                "className",
                json!({"type": "JSXExpressionContainer", "expression": call}),
            ),
        ]));

        let out = format_jsx(source, &ast, &session()).unwrap();
        assert_eq!(
            out,
            r#"<a id="p-4 flex" className={clsx("p-4 text-sm", on && "container flex")} />"#
        );
    }

    #[test]
    fn sorted_input_produces_no_changes() {
        let source = r#"<div className="flex p-4" />"#;
        let ast = program(jsx_element(vec![jsx_attr(
            "className",
            string_lit("flex p-4", 15, 25),
        )]));

        assert!(collect_changes(source, &ast, &session()).is_empty());
    }
}

mod call_tests {
    use super::*;

    #[test]
    fn concatenated_operand_keeps_facing_space() {
        let source = r#"clsx("p-4 flex " + x)"#;
        let ast = program(json!({
            "type": "CallExpression",
            "callee": ident("clsx"),
            "arguments": [{
                "type": "BinaryExpression",
                "operator": "+",
                "left": string_lit("p-4 flex ", 5, 16),
                "right": ident("x")
            }]
        }));

        let out = format_jsx(source, &ast, &session_with_functions(&["clsx"])).unwrap();
        assert_eq!(out, r#"clsx("flex p-4 " + x)"#);
    }

    #[test]
    fn unmatched_function_is_ignored() {
        let source = r#"clsx("p-4 flex " + x)"#;
        let ast = program(json!({
            "type": "CallExpression",
            "callee": ident("clsx"),
            "arguments": [string_lit("p-4 flex ", 5, 16)]
        }));

        assert!(collect_changes(source, &ast, &session()).is_empty());
    }

    #[test]
    fn member_callee_matches_root_object() {
        let source = r#"ui.button("p-4 flex")"#;
        let ast = program(json!({
            "type": "CallExpression",
            "callee": {
                "type": "MemberExpression",
                "computed": false,
                "object": ident("ui"),
                "property": ident("button")
            },
            "arguments": [{"type": "Literal", "value": "p-4 flex", "range": [10, 20]}]
        }));

        let out = format_jsx(source, &ast, &session_with_functions(&["ui"])).unwrap();
        assert_eq!(out, r#"ui.button("flex p-4")"#);
    }

    #[test]
    fn function_patterns_apply() {
        let source = r#"ui.button("p-4 flex")"#;
        let ast = program(json!({
            "type": "CallExpression",
            "callee": {
                "type": "MemberExpression",
                "computed": false,
                "object": ident("ui"),
                "property": ident("button")
            },
            "arguments": [string_lit("p-4 flex", 10, 20)]
        }));

        let out = format_jsx(source, &ast, &session_with_functions(&["/^ui\\.\\w+$/"])).unwrap();
        assert_eq!(out, r#"ui.button("flex p-4")"#);
    }
}

mod template_tests {
    use super::*;

    fn element(raw: &str, start: usize, end: usize, tail: bool) -> Value {
        json!({
            "type": "TemplateElement",
            "value": {"raw": raw, "cooked": raw},
            "tail": tail,
            "start": start,
            "end": end
        })
    }

    #[test]
    fn tagged_template_sorts_each_quasi() {
        let source = "tw`text-sm p-4 ${a} p-4 flex`";
        let ast = program(json!({
            "type": "TaggedTemplateExpression",
            "tag": ident("tw"),
            "quasi": {
                "type": "TemplateLiteral",
                "quasis": [
                    element("text-sm p-4 ", 3, 15, false),
                    element(" p-4 flex", 19, 28, true)
                ],
                "expressions": [ident("a")]
            }
        }));

        let out = format_jsx(source, &ast, &session_with_functions(&["tw"])).unwrap();
        assert_eq!(out, "tw`p-4 text-sm ${a} flex p-4`");
    }

    #[test]
    fn tag_wrapping_a_component_call() {
        let source = "tw(Button)`p-4 flex`";
        let ast = program(json!({
            "type": "TaggedTemplateExpression",
            "tag": {
                "type": "CallExpression",
                "callee": ident("tw"),
                "arguments": [ident("Button")]
            },
            "quasi": {
                "type": "TemplateLiteral",
                "quasis": [element("p-4 flex", 11, 19, true)],
                "expressions": []
            }
        }));

        let out = format_jsx(source, &ast, &session_with_functions(&["tw"])).unwrap();
        assert_eq!(out, "tw(Button)`flex p-4`");
    }

    #[test]
    fn attrs_call_on_styled_member() {
        let source = r#"styled.div.attrs({ className: "p-4 flex" })"#;
        let ast = program(json!({
            "type": "CallExpression",
            "callee": {
                "type": "MemberExpression",
                "computed": false,
                "object": {
                    "type": "MemberExpression",
                    "computed": false,
                    "object": ident("styled"),
                    "property": ident("div")
                },
                "property": ident("attrs")
            },
            "arguments": [{
                "type": "ObjectExpression",
                "properties": [{
                    "type": "ObjectProperty",
                    "key": ident("className"),
                    "value": string_lit("p-4 flex", 30, 40)
                }]
            }]
        }));

        let out = format_jsx(source, &ast, &session_with_functions(&["styled"])).unwrap();
        assert_eq!(out, r#"styled.div.attrs({ className: "flex p-4" })"#);
    }

    #[test]
    fn token_glued_to_expression_stays_put() {
        let source = "cx(`${base}-lg text-sm flex`)";
        let ast = program(json!({
            "type": "CallExpression",
            "callee": ident("cx"),
            "arguments": [{
                "type": "TemplateLiteral",
                "quasis": [
                    element("", 4, 4, false),
                    element("-lg text-sm flex", 11, 27, true)
                ],
                "expressions": [ident("base")]
            }]
        }));

        let out = format_jsx(source, &ast, &session_with_functions(&["cx"])).unwrap();
        assert_eq!(out, "cx(`${base}-lg flex text-sm`)");
    }

    #[test]
    fn delimiter_inclusive_ranges() {
        let source = "cx(`${base}-lg text-sm flex`)";
        let ast = program(json!({
            "type": "CallExpression",
            "callee": ident("cx"),
            "arguments": [{
                "type": "TemplateLiteral",
                "quasis": [
                    {"type": "TemplateElement", "value": {"raw": ""}, "range": [3, 6]},
                    {"type": "TemplateElement", "value": {"raw": "-lg text-sm flex"}, "range": [10, 28]}
                ],
                "expressions": [ident("base")]
            }]
        }));

        let out = format_jsx(source, &ast, &session_with_functions(&["cx"])).unwrap();
        assert_eq!(out, "cx(`${base}-lg flex text-sm`)");
    }
}
