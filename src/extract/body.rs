//! Body-format fallback policy and snippet derivation.

use crate::config::ExtractConfig;
use crate::model::fields::BodyText;

/// The bytes to persist for a message and its index excerpt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBody {
    pub full_body: String,
    pub snippet: String,
}

/// Chooses what gets written to the artifact and to the index.
pub struct BodyResolver<'a> {
    config: &'a ExtractConfig,
}

impl<'a> BodyResolver<'a> {
    pub fn new(config: &'a ExtractConfig) -> Self {
        Self { config }
    }

    pub fn resolve(&self, html: &BodyText, plain: &BodyText) -> ResolvedBody {
        ResolvedBody {
            full_body: self.full_body(html, plain),
            snippet: self.snippet(plain),
        }
    }

    /// HTML verbatim, else `<pre>`-wrapped plain text, else the sentinel
    /// wrapped in a paragraph.
    pub fn full_body(&self, html: &BodyText, plain: &BodyText) -> String {
        if let Some(html) = html.non_empty() {
            return html.to_string();
        }
        if let Some(text) = plain.non_empty() {
            return format!("<pre>{text}</pre>");
        }
        format!("<p>{}</p>", self.config.body_sentinel)
    }

    /// Single-line excerpt of the plain-text body.
    ///
    /// Only the plain body feeds the snippet; an HTML-only message gets an
    /// empty one.
    pub fn snippet(&self, plain: &BodyText) -> String {
        match plain {
            BodyText::Present(text) => make_snippet(text, self.config.snippet_max_chars),
            BodyText::Absent => String::new(),
            BodyText::Unreadable => {
                make_snippet(&self.config.body_sentinel, self.config.snippet_max_chars)
            }
        }
    }
}

/// Replace every line break with a space, trim, and keep at most `max_chars`
/// characters.
pub fn make_snippet(text: &str, max_chars: usize) -> String {
    let single_line = text.replace("\r\n", " ").replace(['\r', '\n'], " ");
    single_line.trim().chars().take(max_chars).collect()
}
