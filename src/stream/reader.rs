//! Reader that splits a YAML stream into documents.

use super::document::Document;
use crate::error::Error;
use crate::yaml::Offsets;
use std::io::Read;
use std::vec;
use tracing::{debug, trace};
use yaml_rust2::parser::{Event, Parser};

/// DocumentReader yields the documents of a YAML stream one at a time.
///
/// The stream is read in full before the first document is returned so the
/// parser can frame it: a document starts where the parser reports one, so
/// `---` inside a block scalar never splits a document. Each document keeps
/// the text of its `---` line; text ahead of the first marker is kept in
/// front of it.
pub struct DocumentReader<R> {
    source: Option<R>,
    frames: vec::IntoIter<Frame>,
    index: usize,
}

/// The pieces of one document's text.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Frame {
    preamble: String,
    marker: Option<String>,
    body: String,
}

impl<R: Read> DocumentReader<R> {
    pub fn new(reader: R) -> Self {
        DocumentReader {
            source: Some(reader),
            frames: Vec::new().into_iter(),
            index: 0,
        }
    }
}

impl<R: Read> Iterator for DocumentReader<R> {
    type Item = Result<Document, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(mut source) = self.source.take() {
            let mut text = String::new();
            if let Err(err) = source.read_to_string(&mut text) {
                return Some(Err(err.into()));
            }
            self.frames = split(&text).into_iter();
        }

        let Frame {
            preamble,
            marker,
            body,
        } = self.frames.next()?;
        let index = self.index;
        self.index += 1;
        trace!(document = index, bytes = body.len(), "read document");
        Some(Document::parse(index, preamble, marker, body))
    }
}

/// Splits `text` at every document start the parser reports.
fn split(text: &str) -> Vec<Frame> {
    if text.is_empty() {
        return Vec::new();
    }
    let mut starts = document_starts(text);
    match starts.first_mut() {
        // The first document owns everything in front of it unless it opens
        // with a marker, in which case that text becomes its preamble.
        Some(first) if !text[*first..].starts_with("---") => *first = 0,
        Some(_) => {}
        None => starts.push(0),
    }

    let mut frames = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(text.len());
        let preamble = if i == 0 { &text[..start] } else { "" };
        let (marker, body) = split_marker(&text[start..end]);
        frames.push(Frame {
            preamble: preamble.to_string(),
            marker,
            body,
        });
    }
    frames
}

/// Byte offsets of the documents in `text`, in order.
///
/// Scanning stops at the first syntax error, which leaves the rest of the
/// text in the document being read when it occurred.
fn document_starts(text: &str) -> Vec<usize> {
    let offsets = Offsets::new(text);
    let mut parser = Parser::new_from_str(text);
    let mut starts = Vec::new();
    loop {
        match parser.next_token() {
            Ok((Event::DocumentStart { .. }, mark)) => starts.push(offsets.of(&mark)),
            Ok((Event::StreamEnd, _)) => break,
            Ok(_) => {}
            Err(err) => {
                debug!(%err, "stopped framing documents");
                break;
            }
        }
    }
    starts
}

/// Separates the `---` line from a document's text.
///
/// Content on the marker line itself (`--- !tag` or `--- |`) is moved into the
/// body so the marker can be written on its own; a trailing comment stays.
fn split_marker(text: &str) -> (Option<String>, String) {
    let Some(rest) = text.strip_prefix("---") else {
        return (None, text.to_string());
    };
    let line_end = rest.find('\n').map_or(rest.len(), |i| i + 1);
    let (line, after) = rest.split_at(line_end);
    let inline = line.trim_start();
    if inline.trim().is_empty() || inline.starts_with('#') {
        (Some(format!("---{line}")), after.to_string())
    } else {
        (Some("---\n".to_string()), format!("{inline}{after}"))
    }
}
