//! Converter dispatch.
//!
//! The engines form a closed set sharing one "transform one document"
//! operation, keeping the file-enumeration driver decoupled from which
//! engine executes.

use std::path::Path;

use crate::code::CodeConverter;
use crate::error::ConvertError;
use crate::image::ImageConverter;

/// The engine selected for one invocation.
#[derive(Debug, Clone)]
pub enum Converter {
    /// Image block normalization: caption containers, bare images, assets.
    Image(ImageConverter),
    /// Code block normalization: `<pre>` markup to annotated fences.
    Code(CodeConverter),
}

impl Converter {
    /// Transforms one document's text. `document` locates the file on disk
    /// for asset-destination resolution and error context; it is never read
    /// here.
    pub fn convert(&self, content: &str, document: &Path) -> Result<String, ConvertError> {
        match self {
            Converter::Image(image) => image.convert(content, document),
            Converter::Code(code) => Ok(code.convert(content)),
        }
    }
}
