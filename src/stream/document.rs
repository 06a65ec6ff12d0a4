//! A single document of a YAML stream.

use crate::error::Error;
use crate::fieldpath::Path;
use crate::yaml::{self, edit};
use serde_yaml::Value;
use std::io::{self, Write};
use tracing::{debug, warn};

/// Document is one `---`-delimited unit of the input stream.
///
/// It keeps the text exactly as read so that untouched documents are written
/// back byte for byte, alongside the parsed value used for matching.
#[derive(Debug, Clone)]
pub struct Document {
    index: usize,
    /// Comments and directives that came before this document's marker.
    preamble: String,
    /// The `---` line as written, if there was one.
    marker: Option<String>,
    body: String,
    value: Value,
}

impl Document {
    /// Parses a document body. `index` is the document's position in the stream.
    pub fn parse(
        index: usize,
        preamble: String,
        marker: Option<String>,
        body: String,
    ) -> Result<Self, Error> {
        let value = if has_content(&body) {
            serde_yaml::from_str(&body).map_err(|source| Error::Parse {
                document: index,
                source,
            })?
        } else {
            Value::Null
        };
        Ok(Document {
            index,
            preamble,
            marker,
            body,
            value,
        })
    }

    /// Parses a standalone document with no marker or preamble.
    pub fn from_body(body: impl Into<String>) -> Result<Self, Error> {
        Document::parse(0, String::new(), None, body.into())
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The parsed content of the document.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The document text, excluding the marker line.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Sets the string leaf at `path`, creating missing parent mappings.
    ///
    /// The edit is spliced into the original text, in block or flow style to
    /// match the surrounding collection. Only nodes the source tree cannot
    /// locate exactly (block scalars, multi-line plain scalars, aliases,
    /// complex keys) force the whole document to be re-rendered from the
    /// value, losing its formatting. The same happens if the spliced text does
    /// not parse back to exactly the expected value.
    pub fn set_string(&mut self, path: &Path, new: &str) -> Result<(), Error> {
        let mut expected = self.value.clone();
        yaml::set_string(&mut expected, path, new)?;

        self.body = match edit::set(&self.body, path, new) {
            Ok(text) if parses_to(&text, &expected) => {
                debug!(document = self.index, path = %path, "updated in place");
                text
            }
            Ok(_) => {
                warn!(
                    document = self.index,
                    path = %path,
                    "in-place edit did not round-trip, re-rendering document"
                );
                render(&expected)?
            }
            Err(reason) => {
                warn!(
                    document = self.index,
                    path = %path,
                    %reason,
                    "cannot edit in place, re-rendering document"
                );
                render(&expected)?
            }
        };
        self.value = expected;
        Ok(())
    }

    /// Writes the document, always preceded by an explicit `---` marker.
    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(self.preamble.as_bytes())?;
        match &self.marker {
            Some(marker) => {
                out.write_all(marker.as_bytes())?;
                if !marker.ends_with('\n') {
                    out.write_all(b"\n")?;
                }
            }
            None => out.write_all(b"---\n")?,
        }
        out.write_all(self.body.as_bytes())?;
        if !self.body.is_empty() && !self.body.ends_with('\n') {
            out.write_all(b"\n")?;
        }
        Ok(())
    }
}

fn parses_to(text: &str, expected: &Value) -> bool {
    serde_yaml::from_str::<Value>(text).is_ok_and(|actual| actual == *expected)
}

fn render(value: &Value) -> Result<String, Error> {
    serde_yaml::to_string(value).map_err(Error::Render)
}

/// Reports whether `text` holds anything besides blank lines, comments,
/// directives and document end markers.
fn has_content(text: &str) -> bool {
    text.lines().any(|line| {
        let trimmed = line.trim();
        !trimmed.is_empty()
            && !trimmed.starts_with('#')
            && !line.starts_with('%')
            && !is_document_end(line)
    })
}

fn is_document_end(line: &str) -> bool {
    line.strip_prefix("...")
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
}
