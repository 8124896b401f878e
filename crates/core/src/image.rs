//! Image block normalization.
//!
//! Two-phase rewrite per document. Phase 1 replaces `wp-caption` containers
//! with `{{<figure>}}` shortcodes carrying the caption as title and alt.
//! Phase 2 re-scans the phase-1 output for bare bracketed images
//! (`[<img .../>][N]`) and replaces them with filename-only shortcodes.
//! Running phase 2 strictly after phase 1 prevents an image nested inside an
//! already-handled container from being matched a second time.
//!
//! Each referenced asset is resolved against a source root (de-aliasing
//! platform-generated `-WxH` thumbnails back to their originals) and copied
//! into the directory containing the document.

use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ConvertError;
use crate::rewrite::{MatchSpan, Rewrite, apply_rewrites};

static IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<img\s+(?P<attrs>.*?)/>").expect("image pattern"));
static BRACKETED_IMAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\[<img\s+(?P<attrs>.*?)/>\]\[[0-9]+\]").expect("bracketed image pattern")
});
static SRC_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)src="(?P<src>.*?)""#).expect("src pattern"));
static CONTAINER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<div\s+(?P<attrs>.*?)>(?P<body>.*?)</div>").expect("container pattern")
});
static CAPTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<p\s+class="wp-caption-text"\s*>(?P<caption>.*?)</p>"#)
        .expect("caption pattern")
});

/// Marker class distinguishing caption containers from ordinary `<div>`s.
const CAPTION_MARKER: &str = "wp-caption";

/// A referenced asset path and its enclosing span.
#[derive(Debug, Clone)]
pub struct ImageReference {
    /// Path string as written in the legacy markup.
    pub src: String,
    /// Span of the `<img .../>` element, in document byte offsets.
    pub span: MatchSpan,
}

/// A caption container: caption text plus its single nested image.
#[derive(Debug, Clone)]
pub struct CaptionedImageBlock {
    /// Caption text, trimmed.
    pub caption: String,
    /// The single image inside the container body.
    pub image: ImageReference,
    /// Span of the whole `<div>...</div>` container.
    pub span: MatchSpan,
}

/// Image normalizer configuration for one invocation.
#[derive(Debug, Clone)]
pub struct ImageConverter {
    previous_url: String,
    source_root: PathBuf,
}

impl ImageConverter {
    /// Creates a converter, validating the source root up front so a bad
    /// invocation fails before any document is touched.
    pub fn new(
        previous_url: impl Into<String>,
        source_root: impl Into<PathBuf>,
    ) -> Result<Self, ConvertError> {
        let source_root = source_root.into();
        if !source_root.is_dir() {
            return Err(ConvertError::Config(format!(
                "source root is not a directory: {}",
                source_root.display()
            )));
        }
        Ok(Self {
            previous_url: previous_url.into(),
            source_root,
        })
    }

    /// Rewrites every image block in `content`, copying each resolved asset
    /// into the directory containing `document`.
    pub fn convert(&self, content: &str, document: &Path) -> Result<String, ConvertError> {
        let base_dir = document.parent().unwrap_or(Path::new("."));

        // Phase 1: caption containers, applied in full before phase 2 so a
        // nested image cannot also be matched as a bare image.
        let blocks = find_captioned_blocks(content, document)?;
        let mut rewrites = Vec::with_capacity(blocks.len());
        for block in blocks {
            let name = self.resolve_and_copy(&block.image.src, base_dir)?;
            rewrites.push(Rewrite {
                span: block.span,
                replacement: format!(
                    r#"{{{{<figure src="{name}" title="{caption}" alt="{caption}" >}}}}"#,
                    caption = block.caption
                ),
            });
        }
        let content = apply_rewrites(content, rewrites);

        // Phase 2: bare bracketed images, scanned against the phase-1 output.
        let images = find_bracketed_images(&content, document)?;
        let mut rewrites = Vec::with_capacity(images.len());
        for image in images {
            let name = self.resolve_and_copy(&image.src, base_dir)?;
            rewrites.push(Rewrite {
                span: image.span,
                replacement: format!(r#"{{{{<figure src="{name}" >}}}}"#),
            });
        }
        Ok(apply_rewrites(&content, rewrites))
    }

    /// Resolves one reference and copies the asset beside the document,
    /// returning the base filename to embed in the shortcode.
    fn resolve_and_copy(&self, reference: &str, base_dir: &Path) -> Result<String, ConvertError> {
        let resolved = resolve_asset(reference, &self.previous_url, &self.source_root)?;
        let name = resolved
            .file_name()
            .expect("resolved asset has a filename")
            .to_string_lossy()
            .into_owned();
        fs::copy(&resolved, base_dir.join(&name))?;
        Ok(name)
    }
}

/// Resolves a legacy image reference to its canonical on-disk asset.
///
/// The previous-base-URL prefix and any leading separator are stripped from
/// the reference, and the remainder is joined to `source_root`. A stem
/// ending in `-<width>x<height>` names a platform-generated thumbnail; the
/// canonical original must then exist in the same directory and replaces the
/// reference. Any other filename shape is already canonical.
pub fn resolve_asset(
    reference: &str,
    previous_url: &str,
    source_root: &Path,
) -> Result<PathBuf, ConvertError> {
    let relative = reference
        .strip_prefix(previous_url)
        .unwrap_or(reference)
        .trim_start_matches('/');
    let path = source_root.join(relative);
    if !path.exists() {
        return Err(ConvertError::AssetNotFound { path });
    }

    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default();
    let thumbnail_stem = stem
        .rsplit_once('-')
        .filter(|(_, suffix)| is_dimension_suffix(suffix));
    let Some((original_stem, _)) = thumbnail_stem else {
        log::info!("canonical asset: {}", path.display());
        return Ok(path);
    };

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();
    let original = path.with_file_name(format!("{original_stem}{extension}"));
    if original.is_file() {
        log::info!(
            "thumbnail de-aliased: {} -> {}",
            path.display(),
            original.display()
        );
        Ok(original)
    } else {
        Err(ConvertError::OriginalAssetMissing {
            thumbnail: path,
            original,
        })
    }
}

/// True when `suffix` looks like generated-resize dimensions (`300x200`).
fn is_dimension_suffix(suffix: &str) -> bool {
    suffix.split_once('x').is_some_and(|(width, height)| {
        !width.is_empty()
            && !height.is_empty()
            && width.bytes().all(|b| b.is_ascii_digit())
            && height.bytes().all(|b| b.is_ascii_digit())
    })
}

fn find_captioned_blocks(
    content: &str,
    document: &Path,
) -> Result<Vec<CaptionedImageBlock>, ConvertError> {
    let mut blocks = Vec::new();
    for caps in CONTAINER.captures_iter(content) {
        let whole = caps.get(0).expect("match has a whole capture");
        let attrs = caps.name("attrs").map_or("", |m| m.as_str());
        if !attrs.contains(CAPTION_MARKER) {
            continue;
        }

        let body = caps.name("body").expect("body group always participates");
        let span = MatchSpan::new(whole.start(), whole.end());
        let Some(image) = find_single_image(body.as_str(), body.start(), document, span)? else {
            continue;
        };
        let Some(caption) = find_single_caption(body.as_str(), document, span)? else {
            continue;
        };
        blocks.push(CaptionedImageBlock {
            caption,
            image,
            span,
        });
    }
    Ok(blocks)
}

fn find_bracketed_images(
    content: &str,
    document: &Path,
) -> Result<Vec<ImageReference>, ConvertError> {
    let mut images = Vec::new();
    for caps in BRACKETED_IMAGE.captures_iter(content) {
        let whole = caps.get(0).expect("match has a whole capture");
        let attrs = caps.name("attrs").map_or("", |m| m.as_str());
        let span = MatchSpan::new(whole.start(), whole.end());
        let Some(src) = find_single_src(attrs, document, span)? else {
            continue;
        };
        images.push(ImageReference { src, span });
    }
    Ok(images)
}

/// Finds the single `<img .../>` inside a container body. Zero images skips
/// the candidate; more than one is a structural integrity error.
fn find_single_image(
    body: &str,
    body_start: usize,
    document: &Path,
    region: MatchSpan,
) -> Result<Option<ImageReference>, ConvertError> {
    let matches: Vec<_> = IMAGE.captures_iter(body).collect();
    let caps = match matches.as_slice() {
        [] => return Ok(None),
        [caps] => caps,
        _ => {
            return Err(ConvertError::StructuralAmbiguity {
                document: document.to_path_buf(),
                span: region,
                what: "image elements",
            });
        }
    };

    let whole = caps.get(0).expect("match has a whole capture");
    let attrs = caps.name("attrs").map_or("", |m| m.as_str());
    let Some(src) = find_single_src(attrs, document, region)? else {
        return Ok(None);
    };
    Ok(Some(ImageReference {
        src,
        span: MatchSpan::new(whole.start(), whole.end()).shifted(body_start),
    }))
}

fn find_single_caption(
    body: &str,
    document: &Path,
    region: MatchSpan,
) -> Result<Option<String>, ConvertError> {
    let matches: Vec<_> = CAPTION.captures_iter(body).collect();
    match matches.as_slice() {
        [] => Ok(None),
        [caps] => Ok(Some(
            caps.name("caption").map_or("", |m| m.as_str()).trim().to_string(),
        )),
        _ => Err(ConvertError::StructuralAmbiguity {
            document: document.to_path_buf(),
            span: region,
            what: "caption paragraphs",
        }),
    }
}

fn find_single_src(
    attrs: &str,
    document: &Path,
    region: MatchSpan,
) -> Result<Option<String>, ConvertError> {
    let matches: Vec<_> = SRC_ATTR.captures_iter(attrs).collect();
    match matches.as_slice() {
        [] => Ok(None),
        [caps] => Ok(Some(caps.name("src").map_or("", |m| m.as_str()).to_string())),
        _ => Err(ConvertError::StructuralAmbiguity {
            document: document.to_path_buf(),
            span: region,
            what: "src attributes",
        }),
    }
}
