//! Dialect adapter for ESTree/JSX trees.
//!
//! Works on a JSON tree as produced by Babel, Acorn or typescript-estree,
//! together with the source text it was parsed from. Nodes must carry byte
//! offsets either as `start`/`end` or as `range: [start, end]`.
//!
//! Sort sites:
//! - string literals and template literals anywhere inside the value of a
//!   matched JSX attribute (`className="..."`, `className={clsx(...)}`)
//! - string literals and template literals anywhere inside the arguments of
//!   a matched function call or tagged template (`clsx("...")`, `` tw`...` ``)
//!
//! The adapter never rewrites the tree. It records a [`Change`] per rewritten
//! literal and splices them into the source in one pass.

use std::cell::RefCell;

use serde_json::Value;
use tracing::trace;

use classort_core::error::Result;
use classort_core::matcher::Matcher;
use classort_core::options::SiteOptions;
use classort_core::patch::{Change, ChangeSet};
use classort_core::rank::RankingOracle;
use classort_core::sort::WhitespaceCollapse;
use classort_core::text::is_list_whitespace;
use classort_core::walk::{visit, AncestorPath, Handlers, Meta, Node, VisitResult};

use crate::session::FormatSession;

/// Meta flag: descendants sit inside a sortable attribute, call or tag.
pub const SORTABLE: &str = "sortable";

/// Sort every class list in `source` and return the rewritten text.
pub fn format_jsx<O: RankingOracle>(
    source: &str,
    ast: &Value,
    session: &FormatSession<O>,
) -> Result<String> {
    collect_changes(source, ast, session).apply(source)
}

/// Walk `ast` and record one change per rewritten literal.
pub fn collect_changes<O: RankingOracle>(
    source: &str,
    ast: &Value,
    session: &FormatSession<O>,
) -> ChangeSet {
    let changes = RefCell::new(ChangeSet::new());
    let matcher = session.matcher();

    let mut handlers: Handlers<'_, '_, Value, Meta> = Handlers::by_kind()
        .on("JSXAttribute", |node: &Value, _, meta: &mut Meta| {
            if let Some(name) = node["name"]["name"].as_str() {
                if matcher.has_static_attr(name) {
                    meta.set(SORTABLE, true);
                }
            }
            VisitResult::Continue
        })
        .on("CallExpression", |node: &Value, _, meta: &mut Meta| {
            if callee_matches(&node["callee"], matcher) {
                meta.set(SORTABLE, true);
            }
            VisitResult::Continue
        })
        .on("TaggedTemplateExpression", |node: &Value, _, meta: &mut Meta| {
            if callee_matches(&node["tag"], matcher) {
                meta.set(SORTABLE, true);
            }
            VisitResult::Continue
        })
        .on(
            "StringLiteral",
            |node: &Value, path: &AncestorPath<'_, Value>, meta: &mut Meta| {
                if meta.is_set(SORTABLE) {
                    sort_string_literal(source, node, path, session, &changes);
                }
                VisitResult::Continue
            },
        )
        .on(
            "Literal",
            |node: &Value, path: &AncestorPath<'_, Value>, meta: &mut Meta| {
                if meta.is_set(SORTABLE) {
                    sort_string_literal(source, node, path, session, &changes);
                }
                VisitResult::Continue
            },
        )
        .on(
            "TemplateLiteral",
            |node: &Value, path: &AncestorPath<'_, Value>, meta: &mut Meta| {
                if meta.is_set(SORTABLE) {
                    sort_template_literal(source, node, path, session, &changes);
                }
                VisitResult::Continue
            },
        );

    visit(ast, &mut handlers);
    drop(handlers);
    changes.into_inner()
}

/// Does a callee or tag name a sortable function?
///
/// Member chains match by their dotted path (`tw.div`). Otherwise the
/// leftmost identifier decides, looking through member accesses and calls
/// (`tw.div`, `` tw(Button)`...` ``, `styled.div.attrs(...)`).
fn callee_matches(callee: &Value, matcher: &Matcher) -> bool {
    if let Some(path) = member_path(callee) {
        if matcher.has_function(&path) {
            return true;
        }
    }
    root_identifier(callee).is_some_and(|name| matcher.has_function(name))
}

/// Leftmost identifier of a callee chain.
fn root_identifier(node: &Value) -> Option<&str> {
    match node.kind()? {
        "Identifier" => node["name"].as_str(),
        "MemberExpression" => root_identifier(&node["object"]),
        "CallExpression" => root_identifier(&node["callee"]),
        _ => None,
    }
}

/// Dotted path of a non-computed member chain.
fn member_path(node: &Value) -> Option<String> {
    match node.kind()? {
        "Identifier" => node["name"].as_str().map(str::to_string),
        "MemberExpression" if node["computed"].as_bool() != Some(true) => {
            let object = member_path(&node["object"])?;
            let property = node["property"]["name"].as_str()?;
            Some(format!("{object}.{property}"))
        }
        _ => None,
    }
}

/// Byte offsets of a node.
fn node_span(node: &Value) -> Option<(usize, usize)> {
    let offset = |v: &Value| v.as_u64().and_then(|n| usize::try_from(n).ok());
    if let (Some(start), Some(end)) = (offset(&node["start"]), offset(&node["end"])) {
        return Some((start, end));
    }
    let range = node["range"].as_array()?;
    Some((offset(range.first()?)?, offset(range.get(1)?)?))
}

/// Whitespace policy for a literal that may be one operand of `a + b`.
///
/// The side facing the other operand keeps a single space.
fn concat_collapse(path: &AncestorPath<'_, Value>) -> WhitespaceCollapse {
    let concat = path.find(|a| {
        a.parent.kind() == Some("BinaryExpression") && a.parent["operator"] == "+"
    });
    WhitespaceCollapse {
        start: concat.is_none_or(|a| a.key != "right"),
        end: concat.is_none_or(|a| a.key != "left"),
    }
}

fn sort_string_literal<O: RankingOracle>(
    source: &str,
    node: &Value,
    path: &AncestorPath<'_, Value>,
    session: &FormatSession<O>,
    changes: &RefCell<ChangeSet>,
) {
    if !node["value"].is_string() {
        return;
    }
    let Some((start, end)) = node_span(node) else {
        return;
    };
    let Some(raw) = source.get(start..end) else {
        trace!(start, end, "string literal span outside source");
        return;
    };

    let quoted = raw.len() >= 2
        && ((raw.starts_with('"') && raw.ends_with('"'))
            || (raw.starts_with('\'') && raw.ends_with('\'')));
    if !quoted {
        return;
    }

    let inner = &raw[1..raw.len() - 1];
    let site = SiteOptions {
        collapse_whitespace: Some(concat_collapse(path)),
        ..Default::default()
    };
    let sorted = session.sort_class_string(inner, site);
    trace!(start, before = inner, after = %sorted, "sorted string literal");
    changes
        .borrow_mut()
        .push(Change::new(start + 1, end - 1, inner, sorted));
}

/// Locate the raw text of a template element.
///
/// Babel spans cover the raw text only; typescript-estree spans include the
/// surrounding backtick, `}` and `${` delimiters.
fn quasi_span(source: &str, quasi: &Value, raw: &str) -> Option<(usize, usize)> {
    let (mut start, mut end) = node_span(quasi)?;
    let text = source.get(start..end)?;
    if text == raw {
        return Some((start, end));
    }

    if text.starts_with('`') || text.starts_with('}') {
        start += 1;
    }
    if text.ends_with("${") {
        end -= 2;
    } else if text.ends_with('`') {
        end -= 1;
    }
    (start <= end && source.get(start..end)? == raw).then_some((start, end))
}

fn sort_template_literal<O: RankingOracle>(
    source: &str,
    node: &Value,
    path: &AncestorPath<'_, Value>,
    session: &FormatSession<O>,
    changes: &RefCell<ChangeSet>,
) {
    let Some(quasis) = node["quasis"].as_array() else {
        return;
    };
    let expressions = node["expressions"].as_array().map_or(0, Vec::len);
    let outer = concat_collapse(path);

    for (i, quasi) in quasis.iter().enumerate() {
        let Some(raw) = quasi["value"]["raw"].as_str() else {
            continue;
        };
        let Some((start, end)) = quasi_span(source, quasi, raw) else {
            trace!(index = i, "template element span does not match its raw text");
            continue;
        };

        let site = SiteOptions {
            // Glued to the preceding expression.
            ignore_first: i > 0 && !raw.starts_with(is_list_whitespace),
            // Glued to the following expression.
            ignore_last: i < expressions && !raw.ends_with(is_list_whitespace),
            collapse_whitespace: Some(WhitespaceCollapse {
                start: outer.start && i == 0,
                end: outer.end && i >= expressions,
            }),
            ..Default::default()
        };
        let sorted = session.sort_class_string(raw, site);
        changes
            .borrow_mut()
            .push(Change::new(start, end, raw, sorted));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn member_paths() {
        let callee = json!({
            "type": "MemberExpression",
            "computed": false,
            "object": {"type": "Identifier", "name": "tw"},
            "property": {"type": "Identifier", "name": "div"}
        });
        assert_eq!(member_path(&callee).as_deref(), Some("tw.div"));

        let computed = json!({
            "type": "MemberExpression",
            "computed": true,
            "object": {"type": "Identifier", "name": "tw"},
            "property": {"type": "Identifier", "name": "div"}
        });
        assert_eq!(member_path(&computed), None);
    }

    #[test]
    fn callees_resolve_through_calls_and_members() {
        let matcher = Matcher::for_parser(
            classort_core::matcher::ParserKind::Jsx,
            &[],
            &["styled".to_string(), "tw".to_string()],
        );
        // styled.div.attrs({})
        let attrs = json!({
            "type": "CallExpression",
            "callee": {
                "type": "MemberExpression",
                "computed": false,
                "object": {
                    "type": "MemberExpression",
                    "computed": false,
                    "object": {"type": "Identifier", "name": "styled"},
                    "property": {"type": "Identifier", "name": "div"}
                },
                "property": {"type": "Identifier", "name": "attrs"}
            },
            "arguments": [{"type": "ObjectExpression", "properties": []}]
        });
        assert!(callee_matches(&attrs, &matcher));
        assert_eq!(root_identifier(&attrs), Some("styled"));

        // tw(Button)
        let wrapped = json!({
            "type": "CallExpression",
            "callee": {"type": "Identifier", "name": "tw"},
            "arguments": [{"type": "Identifier", "name": "Button"}]
        });
        assert!(callee_matches(&wrapped, &matcher));

        // css(Button)
        let other = json!({
            "type": "CallExpression",
            "callee": {"type": "Identifier", "name": "css"},
            "arguments": [{"type": "Identifier", "name": "tw"}]
        });
        assert!(!callee_matches(&other, &matcher));
    }

    #[test]
    fn spans_from_start_end_or_range() {
        assert_eq!(node_span(&json!({"start": 1, "end": 4})), Some((1, 4)));
        assert_eq!(node_span(&json!({"range": [2, 5]})), Some((2, 5)));
        assert_eq!(node_span(&json!({"start": 1})), None);
    }

    #[test]
    fn quasi_span_strips_delimiters() {
        let source = "`a ${x} b`";
        // typescript-estree style: "`a ${" and "} b`"
        let head = json!({"range": [0, 5]});
        let tail = json!({"range": [6, 10]});
        assert_eq!(quasi_span(source, &head, "a "), Some((1, 3)));
        assert_eq!(quasi_span(source, &tail, " b"), Some((7, 9)));
        // Babel style covers the raw text only.
        let babel = json!({"start": 1, "end": 3});
        assert_eq!(quasi_span(source, &babel, "a "), Some((1, 3)));
    }
}
