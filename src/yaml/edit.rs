//! Splicing string leaves into document text.
//!
//! `set` edits the text the way a person would: an existing scalar is
//! overwritten in place, a missing key is added next to its last sibling and a
//! missing parent is written out in the style of the collection it joins,
//! nested lines in a block mapping and `{key: value}` in a flow mapping.
//! Nodes the source tree cannot locate exactly are refused with
//! [`Unsupported`] so the caller can fall back to re-rendering.

use super::scalar::{self, Context};
use super::tree::{Layout, Mapping, Node, Scalar, ScalarKind, Span, Tree};
use crate::fieldpath::{Path, PathElement};
use thiserror::Error;

/// Indentation used for nested blocks when the document gives no hint.
const DEFAULT_STEP: usize = 2;

/// The edit cannot be expressed as a splice of the original text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct Unsupported(pub &'static str);

/// Returns `text` with the string leaf at `path` set to `value`.
pub fn set(text: &str, path: &Path, value: &str) -> Result<String, Unsupported> {
    let tree = Tree::parse(text).map_err(|_| Unsupported("document does not parse"))?;
    let elements = path.as_slice();
    let mut node = tree.root().ok_or(Unsupported("document is empty"))?;
    let mut step = DEFAULT_STEP;
    let mut parent_column: Option<usize> = None;

    for (depth, element) in elements.iter().enumerate() {
        let remaining = &elements[depth + 1..];
        match (element, node) {
            (PathElement::Index(i), Node::Sequence(seq)) => {
                node = seq
                    .items
                    .get(*i)
                    .ok_or(Unsupported("sequence index out of range"))?;
            }
            (PathElement::FieldName(name), Node::Mapping(map)) => {
                if let Layout::Block { column, .. } = map.layout {
                    if let Some(parent) = parent_column.filter(|&parent| column > parent) {
                        step = column - parent;
                    }
                    parent_column = Some(column);
                }

                let Some(entry) = map.get(name) else {
                    return insert_entries(text, map, &elements[depth..], value, step);
                };
                if remaining.is_empty() {
                    return replace_leaf(text, map, &entry.value, value);
                }
                match &entry.value {
                    Node::Mapping(_) | Node::Sequence(_) => node = &entry.value,
                    Node::Scalar(vacant) if vacant.is_vacant() => {
                        let colon = entry.colon.ok_or(Unsupported("key is not followed by ':'"))?;
                        return fill_vacant(text, map, colon, vacant, remaining, value, step);
                    }
                    _ => return Err(Unsupported("path continues through a value")),
                }
            }
            _ => return Err(Unsupported("path does not follow the document structure")),
        }
    }
    Err(Unsupported("path does not end at a mapping entry"))
}

fn replace_leaf(
    text: &str,
    map: &Mapping,
    node: &Node,
    value: &str,
) -> Result<String, Unsupported> {
    let context = map.layout.context();
    match node {
        Node::Scalar(Scalar {
            span,
            kind: ScalarKind::Inline(style),
            ..
        }) => Ok(splice(text, *span, &scalar::render(value, Some(*style), context))),
        Node::Scalar(Scalar {
            span,
            kind: ScalarKind::Empty,
            ..
        }) => Ok(splice(
            text,
            *span,
            &format!(" {}", scalar::render(value, None, context)),
        )),
        _ => Err(Unsupported("target value is not a single-line scalar")),
    }
}

/// Replaces a vacant value (`key:`, `key: ~`) with a mapping holding `remaining`.
fn fill_vacant(
    text: &str,
    map: &Mapping,
    colon: usize,
    vacant: &Scalar,
    remaining: &[PathElement],
    value: &str,
    step: usize,
) -> Result<String, Unsupported> {
    match map.layout {
        Layout::Block { column, .. } => {
            let block = render_block(remaining, value, column + step, step)?;
            let replacement = format!("\n{}", block.trim_end_matches('\n'));
            Ok(splice(text, Span::new(colon, vacant.span.end), &replacement))
        }
        Layout::Flow { .. } => {
            let flow = format!("{{{}}}", render_flow(remaining, value)?);
            match vacant.kind {
                ScalarKind::Empty => Ok(splice(text, vacant.span, &format!(" {flow}"))),
                _ => Ok(splice(text, vacant.span, &flow)),
            }
        }
    }
}

/// Adds `elements` as a new entry at the end of `map`.
fn insert_entries(
    text: &str,
    map: &Mapping,
    elements: &[PathElement],
    value: &str,
    step: usize,
) -> Result<String, Unsupported> {
    match map.layout {
        Layout::Block { column, next } => {
            let block = render_block(elements, value, column, step)?;
            let at = block_end(text, next);
            let mut out = String::with_capacity(text.len() + block.len() + 1);
            out.push_str(&text[..at]);
            if at > 0 && !text[..at].ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&block);
            out.push_str(&text[at..]);
            Ok(out)
        }
        Layout::Flow { close } => {
            let entry = render_flow(elements, value)?;
            let at = text[..close].trim_end().len();
            let separator = if map.entries.is_empty() {
                ""
            } else if text[..at].ends_with(',') {
                " "
            } else {
                ", "
            };
            Ok(splice(text, Span::new(at, at), &format!("{separator}{entry}")))
        }
    }
}

/// Where new lines go in a block collection followed by the token at `next`:
/// after its last content line, ahead of any blank or comment lines that
/// separate it from what follows.
fn block_end(text: &str, next: usize) -> usize {
    let line_start = |end: usize| text[..end].rfind('\n').map_or(0, |i| i + 1);
    let is_trivia = |line: &str| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    };

    let mut at = line_start(next);
    if !is_trivia(&text[at..next]) {
        return next;
    }
    while at > 0 {
        let previous = line_start(at - 1);
        if !is_trivia(&text[previous..at]) {
            break;
        }
        at = previous;
    }
    at
}

/// Renders a chain of nested keys ending in `value`, one key per line.
fn render_block(
    elements: &[PathElement],
    value: &str,
    indent: usize,
    step: usize,
) -> Result<String, Unsupported> {
    let mut block = String::new();
    for (depth, element) in elements.iter().enumerate() {
        let name = element
            .as_field_name()
            .ok_or(Unsupported("cannot create sequence entries"))?;
        block.push_str(&" ".repeat(indent + depth * step));
        block.push_str(&scalar::render(name, None, Context::Block));
        block.push(':');
        if depth + 1 == elements.len() {
            block.push(' ');
            block.push_str(&scalar::render(value, None, Context::Block));
        }
        block.push('\n');
    }
    Ok(block)
}

/// Renders a chain of nested keys ending in `value` as one flow entry,
/// e.g. `annotations: {a: b}`.
fn render_flow(elements: &[PathElement], value: &str) -> Result<String, Unsupported> {
    let mut out = scalar::render(value, None, Context::Flow);
    for (depth, element) in elements.iter().enumerate().rev() {
        let name = element
            .as_field_name()
            .ok_or(Unsupported("cannot create sequence entries"))?;
        let pair = format!("{}: {out}", scalar::render(name, None, Context::Flow));
        out = if depth == 0 { pair } else { format!("{{{pair}}}") };
    }
    Ok(out)
}

fn splice(text: &str, span: Span, replacement: &str) -> String {
    let mut out = String::with_capacity(text.len() + replacement.len());
    out.push_str(&text[..span.start]);
    out.push_str(replacement);
    out.push_str(&text[span.end..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn annotation(key: &str) -> Path {
        Path::fields(["metadata", "annotations", key])
    }

    fn image(index: usize) -> Path {
        Path::fields(["containers"])
            .with(PathElement::index(index))
            .with_field("image")
    }

    #[test]
    fn test_replace_scalar_keeps_comment() {
        let text = "metadata:\n  name: web  # keep me\n";
        let out = set(text, &Path::fields(["metadata", "name"]), "api").unwrap();
        assert_eq!(out, "metadata:\n  name: api  # keep me\n");
    }

    #[test]
    fn test_replace_keeps_quote_style() {
        let text = "image: 'old:1.0'\n";
        let out = set(text, &Path::fields(["image"]), "new:2.0").unwrap();
        assert_eq!(out, "image: 'new:2.0'\n");
    }

    #[test]
    fn test_insert_missing_key_after_siblings() {
        let text = "metadata:\n  name: web\n  namespace: prod\nspec: {}\n";
        let out = set(text, &annotation("team"), "core").unwrap();
        assert_eq!(
            out,
            "metadata:\n  name: web\n  namespace: prod\n  annotations:\n    team: core\nspec: {}\n"
        );
    }

    #[test]
    fn test_insert_goes_before_trailing_comments() {
        let text = "metadata:\n  name: web\n\n# spec follows\nspec: {}\n";
        let out = set(text, &annotation("team"), "core").unwrap();
        assert_eq!(
            out,
            "metadata:\n  name: web\n  annotations:\n    team: core\n\n# spec follows\nspec: {}\n"
        );
    }

    #[test]
    fn test_insert_follows_document_indentation() {
        let text = "metadata:\n    name: web\n";
        let out = set(text, &annotation("team"), "core").unwrap();
        assert_eq!(out, "metadata:\n    name: web\n    annotations:\n        team: core\n");
    }

    #[test]
    fn test_insert_into_existing_mapping() {
        let text = "metadata:\n  annotations:\n    a: \"1\"\n  name: web\n";
        let out = set(text, &annotation("b"), "2").unwrap();
        assert_eq!(out, "metadata:\n  annotations:\n    a: \"1\"\n    b: \"2\"\n  name: web\n");
    }

    #[test]
    fn test_fill_vacant_annotations() {
        let text = "metadata:\n  annotations:\n  name: web\n";
        let out = set(text, &annotation("a"), "x").unwrap();
        assert_eq!(out, "metadata:\n  annotations:\n    a: x\n  name: web\n");

        let text = "metadata:\n  annotations: ~  # none yet\n  name: web\n";
        let out = set(text, &annotation("a"), "x").unwrap();
        assert_eq!(out, "metadata:\n  annotations:\n    a: x  # none yet\n  name: web\n");
    }

    #[test]
    fn test_empty_flow_mapping_gets_entry() {
        let text = "metadata:\n  annotations: {}\n  name: web\n";
        let out = set(text, &annotation("a"), "x").unwrap();
        assert_eq!(out, "metadata:\n  annotations: {a: x}\n  name: web\n");
    }

    #[test]
    fn test_empty_leaf_gets_value() {
        let text = "image:\nname: app\n";
        let out = set(text, &Path::fields(["image"]), "nginx").unwrap();
        assert_eq!(out, "image: nginx\nname: app\n");
    }

    #[test]
    fn test_missing_trailing_newline() {
        let text = "metadata:\n  name: web";
        let out = set(text, &annotation("a"), "x").unwrap();
        assert_eq!(out, "metadata:\n  name: web\n  annotations:\n    a: x\n");
    }

    #[test]
    fn test_compact_sequence_item() {
        let text = "containers:\n- name: app\n- name: sidecar\n  image: busybox\n";
        let out = set(text, &image(0), "nginx:1.25").unwrap();
        assert_eq!(
            out,
            "containers:\n- name: app\n  image: nginx:1.25\n- name: sidecar\n  image: busybox\n"
        );
    }

    #[test]
    fn test_flow_mapping_gets_nested_entry() {
        let text = "kind: Service # svc\nmetadata: {name: web, namespace: prod}\n";
        let out = set(text, &annotation("a"), "b").unwrap();
        assert_eq!(
            out,
            "kind: Service # svc\nmetadata: {name: web, namespace: prod, annotations: {a: b}}\n"
        );

        let text = "metadata: {name: web, annotations: {a: b}}\n";
        let out = set(text, &annotation("c"), "d").unwrap();
        assert_eq!(out, "metadata: {name: web, annotations: {a: b, c: d}}\n");
    }

    #[test]
    fn test_flow_item_value_is_quoted_for_flow() {
        let text = "containers:\n- {name: app, image: old}  # pinned\n";
        let out = set(text, &image(0), "new:2.0").unwrap();
        assert_eq!(out, "containers:\n- {name: app, image: \"new:2.0\"}  # pinned\n");
    }

    #[test]
    fn test_block_scalar_leaf_is_unsupported() {
        let text = "image: |\n  old\n";
        assert_eq!(
            set(text, &Path::fields(["image"]), "new"),
            Err(Unsupported("target value is not a single-line scalar"))
        );
    }

    #[test]
    fn test_alias_is_unsupported() {
        let text = "base: &meta {name: web}\nmetadata: *meta\n";
        assert!(set(text, &annotation("a"), "b").is_err());
    }
}
