//! Applying a mutation to a matched manifest.

use crate::error::Error;
use crate::fieldpath::Path;
use crate::stream::Document;

/// Sets `image` on the container at `container`.
///
/// The image reference is not validated.
pub fn apply_image(document: &mut Document, container: &Path, image: &str) -> Result<(), Error> {
    document.set_string(&container.with_field("image"), image)
}

/// Merges `pairs` into `metadata.annotations` of the manifest at `manifest`.
///
/// The annotations mapping (and `metadata`, if needed) is created when
/// missing. Pairs are applied in order, so a repeated key keeps its last value.
pub fn apply_annotations(
    document: &mut Document,
    manifest: &Path,
    pairs: &[(String, String)],
) -> Result<(), Error> {
    let annotations = manifest.with_field("metadata").with_field("annotations");
    for (key, value) in pairs {
        document.set_string(&annotations.with_field(key.as_str()), value)?;
    }
    Ok(())
}
