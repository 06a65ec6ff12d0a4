//! Source-located view of one YAML document.
//!
//! The tree is built from the marked event stream of `yaml-rust2`. Every node
//! records where it sits in the document it was parsed from, so an edit can
//! splice new text into exactly one place and leave every other byte alone.

use super::scalar::{Context, ScalarStyle};
use yaml_rust2::parser::{Event, Parser};
use yaml_rust2::scanner::{Marker, ScanError, TScalarStyle};

/// Byte range into the document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Mapping(Mapping),
    Sequence(Sequence),
    Scalar(Scalar),
    /// `*name`, starting at the given offset.
    Alias(usize),
}

impl Node {
    pub fn start(&self) -> usize {
        match self {
            Node::Mapping(m) => m.start,
            Node::Sequence(s) => s.start,
            Node::Scalar(s) => s.span.start,
            Node::Alias(at) => *at,
        }
    }
}

/// How a collection is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// One entry per line. Every key (or `-`) starts at `column`; `next` is
    /// the offset of the first token after the collection.
    Block { column: usize, next: usize },
    /// Bracketed. `close` is the offset of the closing `}` or `]`.
    Flow { close: usize },
}

impl Layout {
    fn closed(self, at: usize) -> Layout {
        match self {
            Layout::Block { column, .. } => Layout::Block { column, next: at },
            Layout::Flow { .. } => Layout::Flow { close: at },
        }
    }

    /// How scalars inside the collection must be written.
    pub fn context(&self) -> Context {
        match self {
            Layout::Block { .. } => Context::Block,
            Layout::Flow { .. } => Context::Flow,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mapping {
    pub start: usize,
    pub layout: Layout,
    pub entries: Vec<Entry>,
}

impl Mapping {
    /// Returns the first entry whose key is the string `key`.
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries
            .iter()
            .find(|entry| entry.key.as_deref() == Some(key))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// The key, when it is a single-line scalar.
    pub key: Option<String>,
    pub key_span: Span,
    /// Offset just past the `:` indicator, when it follows the key directly.
    pub colon: Option<usize>,
    pub value: Node,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    pub start: usize,
    pub layout: Layout,
    pub items: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scalar {
    pub span: Span,
    /// The scalar's value, as loaded.
    pub value: String,
    pub kind: ScalarKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// A plain scalar on one line or a quoted scalar; `span` covers it exactly.
    Inline(ScalarStyle),
    /// Nothing written after `key:`. `span` is empty and sits at the colon.
    Empty,
    /// Block scalars and multi-line plain scalars. Only the start is known.
    Other,
}

impl Scalar {
    /// Reports whether the scalar holds nothing: `key:`, `~` or `null`.
    pub fn is_vacant(&self) -> bool {
        match self.kind {
            ScalarKind::Empty => true,
            ScalarKind::Inline(ScalarStyle::Plain) => {
                matches!(self.value.as_str(), "~" | "null" | "Null" | "NULL")
            }
            _ => false,
        }
    }
}

/// Maps parser markers, which count characters, to byte offsets.
#[derive(Debug, Clone)]
pub(crate) struct Offsets(Vec<usize>);

impl Offsets {
    pub(crate) fn new(text: &str) -> Self {
        let mut offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        offsets.push(text.len());
        Offsets(offsets)
    }

    pub(crate) fn of(&self, mark: &Marker) -> usize {
        let last = self.0.len() - 1;
        self.0[mark.index().min(last)]
    }
}

/// Tree is the parsed structure of a single document.
#[derive(Debug, Clone)]
pub struct Tree {
    root: Option<Node>,
}

impl Tree {
    /// Parses the first document in `text`.
    pub fn parse(text: &str) -> Result<Self, ScanError> {
        let mut builder = Builder {
            text,
            offsets: Offsets::new(text),
            stack: Vec::new(),
            root: None,
        };
        let mut parser = Parser::new_from_str(text);
        loop {
            let (event, mark) = parser.next_token()?;
            match event {
                Event::DocumentEnd | Event::StreamEnd => break,
                event => builder.push(event, &mark),
            }
        }
        Ok(Tree { root: builder.root })
    }

    /// The document's top-level node, or `None` for an empty document.
    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }
}

/// A collection whose end event has not arrived yet.
enum Open {
    Mapping { mapping: Mapping, key: Option<Node> },
    Sequence(Sequence),
}

struct Builder<'a> {
    text: &'a str,
    offsets: Offsets,
    stack: Vec<Open>,
    root: Option<Node>,
}

impl<'a> Builder<'a> {
    fn push(&mut self, event: Event, mark: &Marker) {
        let at = self.offsets.of(mark);
        match event {
            Event::Scalar(value, style, _, _) => {
                let scalar = self.scalar(value, style, at);
                self.attach(Node::Scalar(scalar));
            }
            Event::Alias(_) => self.attach(Node::Alias(at)),
            Event::MappingStart(..) => {
                let layout = self.layout(at, mark, '{');
                self.stack.push(Open::Mapping {
                    mapping: Mapping {
                        start: at,
                        layout,
                        entries: Vec::new(),
                    },
                    key: None,
                });
            }
            Event::SequenceStart(..) => {
                let layout = self.layout(at, mark, '[');
                self.stack.push(Open::Sequence(Sequence {
                    start: at,
                    layout,
                    items: Vec::new(),
                }));
            }
            Event::MappingEnd => {
                if let Some(Open::Mapping { mut mapping, .. }) = self.stack.pop() {
                    mapping.layout = mapping.layout.closed(self.end_of(mapping.layout, at, '}'));
                    self.attach(Node::Mapping(mapping));
                }
            }
            Event::SequenceEnd => {
                if let Some(Open::Sequence(mut sequence)) = self.stack.pop() {
                    sequence.layout = sequence.layout.closed(self.end_of(sequence.layout, at, ']'));
                    self.attach(Node::Sequence(sequence));
                }
            }
            _ => {}
        }
    }

    fn layout(&self, at: usize, mark: &Marker, open: char) -> Layout {
        if self.text[at..].starts_with(open) {
            Layout::Flow { close: at }
        } else {
            Layout::Block {
                column: mark.col(),
                next: at,
            }
        }
    }

    /// Offset recorded when a collection ends: the closing bracket of a flow
    /// collection, or the next token after a block one.
    fn end_of(&self, layout: Layout, at: usize, close: char) -> usize {
        match layout {
            Layout::Flow { .. } if !self.text[at..].starts_with(close) => {
                self.text[..at].rfind(close).unwrap_or(at)
            }
            _ => at,
        }
    }

    fn scalar(&self, value: String, style: TScalarStyle, at: usize) -> Scalar {
        let rest = &self.text[at..];
        let quoted = |quote: u8, style: ScalarStyle| match quoted_len(rest, quote) {
            Some(len) => (Span::new(at, at + len), ScalarKind::Inline(style)),
            None => (Span::new(at, at), ScalarKind::Other),
        };
        let (span, kind) = match style {
            TScalarStyle::SingleQuoted => quoted(b'\'', ScalarStyle::SingleQuoted),
            TScalarStyle::DoubleQuoted => quoted(b'"', ScalarStyle::DoubleQuoted),
            TScalarStyle::Plain if !value.is_empty() && rest.starts_with(value.as_str()) => (
                Span::new(at, at + value.len()),
                ScalarKind::Inline(ScalarStyle::Plain),
            ),
            // Empty nodes are reported as `~` at the position of the next token.
            TScalarStyle::Plain if value == "~" => (Span::new(at, at), ScalarKind::Empty),
            _ => (Span::new(at, at), ScalarKind::Other),
        };
        Scalar { span, value, kind }
    }

    fn attach(&mut self, node: Node) {
        let text = self.text;
        match self.stack.last_mut() {
            None => self.root = Some(node),
            Some(Open::Sequence(sequence)) => sequence.items.push(node),
            Some(Open::Mapping { mapping, key }) => match key.take() {
                None => *key = Some(node),
                Some(k) => mapping.entries.push(entry(text, k, node)),
            },
        }
    }
}

fn entry(text: &str, key: Node, mut value: Node) -> Entry {
    let (key, key_span) = match key {
        Node::Scalar(Scalar {
            span,
            value: name,
            kind: ScalarKind::Inline(_),
        }) => (Some(name), span),
        other => (None, Span::new(other.start(), other.start())),
    };
    let colon = key.as_ref().and_then(|_| colon_end(text, key_span.end));
    if let Node::Scalar(scalar) = &mut value {
        if scalar.kind == ScalarKind::Empty {
            match colon {
                Some(colon) => scalar.span = Span::new(colon, colon),
                None => scalar.kind = ScalarKind::Other,
            }
        }
    }
    Entry {
        key,
        key_span,
        colon,
        value,
    }
}

/// Offset just past a `:` that follows `from` on the same line.
fn colon_end(text: &str, from: usize) -> Option<usize> {
    let rest = &text[from..];
    let skipped = rest.len() - rest.trim_start_matches(|c: char| c == ' ' || c == '\t').len();
    rest[skipped..]
        .starts_with(':')
        .then_some(from + skipped + 1)
}

/// Length of the quoted scalar at the start of `s`, including both quotes.
fn quoted_len(s: &str, quote: u8) -> Option<usize> {
    let bytes = s.as_bytes();
    if bytes.first() != Some(&quote) {
        return None;
    }
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if quote == b'"' => i += 2,
            b if b == quote => {
                if quote == b'\'' && bytes.get(i + 1) == Some(&b'\'') {
                    i += 2;
                } else {
                    return Some(i + 1);
                }
            }
            _ => i += 1,
        }
    }
    None
}
