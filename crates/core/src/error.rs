use std::path::PathBuf;

use thiserror::Error;

use crate::rewrite::MatchSpan;

/// Errors emitted while transforming a document batch.
///
/// Every variant is fatal to the run: documents already rewritten stay
/// rewritten, there is no rollback. Missing optional markup (an unmarked
/// container, an image without `src`, a container without a caption) is a
/// silent skip, not an error.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Invalid per-invocation configuration; raised before any document is
    /// touched.
    #[error("Configuration error: {0}")]
    Config(String),
    /// A referenced asset does not exist under the source root.
    #[error("Asset not found: {}", .path.display())]
    AssetNotFound {
        /// Resolved path that was expected to exist.
        path: PathBuf,
    },
    /// A thumbnail-shaped asset has no canonical original next to it.
    #[error("Original asset missing: {} (thumbnail {})", .original.display(), .thumbnail.display())]
    OriginalAssetMissing {
        /// The thumbnail file that was referenced.
        thumbnail: PathBuf,
        /// The canonical original implied by the thumbnail name.
        original: PathBuf,
    },
    /// A sub-pattern expected at most once inside a matched region occurred
    /// more than once.
    #[error("Structural ambiguity in {doc}: multiple {what} inside bytes {span}", doc = .document.display())]
    StructuralAmbiguity {
        /// Document being transformed when the ambiguity was found.
        document: PathBuf,
        /// Span of the enclosing matched region, in document byte offsets.
        span: MatchSpan,
        /// What occurred more than once (e.g. `image elements`).
        what: &'static str,
    },
    /// IO failure while reading, writing, or copying.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
