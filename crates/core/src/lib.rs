#![deny(missing_docs)]
//! mdport core: offset-safe rewrite engines for legacy blog-post markup.

/// Code block normalization (`<pre>` attribute grammar to annotated fences).
pub mod code;
/// Converter dispatch over one shared document transform.
pub mod convert;
/// Core error types.
pub mod error;
/// Image block normalization and asset resolution.
pub mod image;
/// Offset-safe span rewriting.
pub mod rewrite;

pub use code::{CodeBlockAttributes, CodeConverter, DEFAULT_TITLE_LEVEL};
pub use convert::Converter;
pub use error::ConvertError;
pub use image::{CaptionedImageBlock, ImageConverter, ImageReference, resolve_asset};
pub use rewrite::{MatchSpan, Rewrite, apply_rewrites};
