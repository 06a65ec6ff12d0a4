//! Stream orchestration: search documents in order, mutate the first match,
//! echo everything.

use crate::error::Error;
use crate::fieldpath::Path;
use crate::manifest::{
    apply_annotations, apply_image, enumerate, find_container, matches, MutationDirective, Selector,
};
use crate::stream::{Document, DocumentReader};
use std::io::{Read, Write};
use tracing::{debug, info};

/// State of a [`Driver`]. `Done` is terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Searching,
    Done(Mutated),
}

/// Where the single mutation of a run was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutated {
    /// Position of the mutated document in the stream.
    pub document: usize,
    /// Path of the mutated manifest or container within that document.
    pub path: Path,
}

/// Driver applies one directive to the first matching manifest of a stream.
#[derive(Debug)]
pub struct Driver<'a> {
    selector: &'a Selector,
    directive: &'a MutationDirective,
    state: State,
}

impl<'a> Driver<'a> {
    pub fn new(selector: &'a Selector, directive: &'a MutationDirective) -> Self {
        Driver {
            selector,
            directive,
            state: State::Searching,
        }
    }

    /// Searches `document` while no match has been found, mutating the
    /// first match. Once a match is found later documents are left alone.
    pub fn process(&mut self, document: &mut Document) -> Result<(), Error> {
        if self.state != State::Searching {
            return Ok(());
        }

        let target = match self.directive {
            MutationDirective::SetImage(_) => enumerate(document.value())
                .find_map(|manifest| find_container(self.selector, &manifest))
                .map(|container| container.into_path()),
            MutationDirective::MergeAnnotations(_) => enumerate(document.value())
                .find(|manifest| matches(self.selector, manifest))
                .map(|manifest| manifest.into_path()),
        };
        let Some(path) = target else {
            debug!(document = document.index(), "no match");
            return Ok(());
        };

        match self.directive {
            MutationDirective::SetImage(image) => apply_image(document, &path, image)?,
            MutationDirective::MergeAnnotations(pairs) => {
                apply_annotations(document, &path, pairs)?
            }
        }
        info!(
            document = document.index(),
            path = %path,
            selector = %self.selector,
            "applied mutation"
        );
        self.state = State::Done(Mutated {
            document: document.index(),
            path,
        });
        Ok(())
    }

    /// Ends the run, failing with [`Error::NotFound`] if nothing matched.
    pub fn finish(self) -> Result<Mutated, Error> {
        match self.state {
            State::Done(mutated) => Ok(mutated),
            State::Searching => Err(Error::NotFound),
        }
    }
}

/// Reads a YAML stream from `input`, applies `directive` to the first
/// manifest matching `selector`, and writes every document to `output`.
///
/// Output is written and flushed one document at a time, so documents
/// preceding a failure have already been emitted when an error is returned.
pub fn run<R, W>(
    input: R,
    output: &mut W,
    selector: &Selector,
    directive: &MutationDirective,
) -> Result<Mutated, Error>
where
    R: Read,
    W: Write + ?Sized,
{
    let mut driver = Driver::new(selector, directive);
    for document in DocumentReader::new(input) {
        let mut document = document?;
        driver.process(&mut document)?;
        document.write_to(output)?;
        output.flush()?;
    }
    driver.finish()
}
