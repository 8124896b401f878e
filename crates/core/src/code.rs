//! Code block normalization.
//!
//! Rewrites legacy `<pre>` markup into annotated fenced code. The opening
//! tag carries an attribute grammar inside `class` (`lang:`, `mark:`,
//! `striped:`, `wrap:`, `decode:` tokens, order-independent, each optional)
//! plus an optional sibling `title` attribute. Bodies are matched
//! non-greedily, so the first `</pre>` terminates a block; nested blocks are
//! not supported.

use std::fmt::Write as _;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::rewrite::{Rewrite, apply_rewrites};

/// Default heading depth emitted above titled code blocks.
pub const DEFAULT_TITLE_LEVEL: usize = 5;

static PRE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    // striped, wrap, and decode are matched so their presence cannot break
    // the class capture, but they do not affect output.
    let lang = r"(lang:\s*(?P<lang>\S+)\s*)";
    let mark = r"(mark:\s*(?P<mark>\S+)\s*)";
    let striped = r"(striped:\s*(?P<striped>\S+)\s*)";
    let wrap = r"(wrap:\s*(?P<wrap>\S+)\s*)";
    let decode = r"(decode:\s*(?P<decode>\S+)\s*)";
    let attrs = format!("({lang}|{mark}|{striped}|{wrap}|{decode})*");
    let class = format!("(class=\"{attrs}\"\\s*)");
    let title = r#"(title="(?P<title>.*?)"\s*)"#;
    let pattern = format!(r"(?s)<pre\s*({class}|{title})*>(?P<body>.*?)</pre>");
    Regex::new(&pattern).expect("code block pattern")
});

/// Attributes parsed from one `<pre>` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlockAttributes {
    /// Output language token (`base` when the block carries none).
    pub lang: String,
    /// Highlighted-line tokens from `mark:`, in source order.
    pub mark: Option<Vec<String>>,
    /// Optional title rendered as a heading above the fence.
    pub title: Option<String>,
    /// Body text with `&lt;`/`&gt;` decoded.
    pub body: String,
}

/// Code block normalizer configuration for one invocation.
#[derive(Debug, Clone)]
pub struct CodeConverter {
    title_level: usize,
}

impl Default for CodeConverter {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE_LEVEL)
    }
}

impl CodeConverter {
    /// Creates a converter emitting title headings at `title_level`.
    pub fn new(title_level: usize) -> Self {
        Self { title_level }
    }

    /// Rewrites every `<pre>` block in `content` into an annotated fence.
    ///
    /// Single pass: all blocks are located against one snapshot, then
    /// replaced in reverse offset order.
    pub fn convert(&self, content: &str) -> String {
        let matches: Vec<_> = PRE_BLOCK.captures_iter(content).collect();
        let mut rewrites = Vec::with_capacity(matches.len());
        for caps in &matches {
            let whole = caps.get(0).expect("match has a whole capture");
            let attrs = parse_attributes(caps);
            rewrites.push(Rewrite {
                span: whole.into(),
                replacement: render_block(&attrs, self.title_level),
            });
        }
        apply_rewrites(content, rewrites)
    }
}

fn parse_attributes(caps: &regex::Captures<'_>) -> CodeBlockAttributes {
    let lang = caps.name("lang").map_or("base", |m| m.as_str()).to_string();
    let mark = caps
        .name("mark")
        .map(|m| m.as_str().split(',').map(str::to_string).collect());
    let title = caps.name("title").map(|m| m.as_str().to_string());
    let body = decode_angle_entities(caps.name("body").map_or("", |m| m.as_str()));

    if caps.name("striped").is_some() || caps.name("wrap").is_some() || caps.name("decode").is_some()
    {
        log::debug!("ignoring striped/wrap/decode tokens on code block");
    }

    CodeBlockAttributes {
        lang,
        mark,
        title,
        body,
    }
}

/// Decodes exactly the two entities the legacy exporter escaped. Everything
/// else in the body passes through untouched.
fn decode_angle_entities(body: &str) -> String {
    body.replace("&lt;", "<").replace("&gt;", ">")
}

fn render_block(attrs: &CodeBlockAttributes, title_level: usize) -> String {
    let mut directives = Vec::new();
    if let Some(mark) = &attrs.mark {
        let quoted: Vec<String> = mark.iter().map(|token| format!("\"{token}\"")).collect();
        directives.push(format!("hl_lines=[{}]", quoted.join(",")));
    }
    directives.push("linenos=table".to_string());

    let mut block = String::new();
    if let Some(title) = &attrs.title {
        writeln!(block, "{} {}", "#".repeat(title_level), title).ok();
    }
    write!(
        block,
        "\n```{} {{{}}}\n{}\n```\n",
        attrs.lang,
        directives.join(","),
        attrs.body
    )
    .ok();
    block
}
