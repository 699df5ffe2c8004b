// src/document.rs

//! Queryable document model over fetched markup.
//!
//! Wraps `scraper` so extractors deal in selector strings and plain
//! `String`s. Parsing never fails: malformed markup is recovered by the
//! HTML5 tree builder, and an unmatched selector is just an empty result.

use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use scraper::{ElementRef, Html};
use url::Url;

use crate::error::Result;
use crate::models::parse_selector;

static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([a-z0-9_\-]+)"#).expect("static regex")
});

/// A parsed page.
pub struct Document {
    html: Html,
    source: String,
}

impl Document {
    /// Decode raw bytes and parse them.
    ///
    /// The declared encoding label wins, then a `<meta charset>` in the
    /// head, then UTF-8. A byte-order mark overrides all three.
    pub fn parse(bytes: &[u8], declared_encoding: Option<&str>) -> Self {
        let encoding = declared_encoding
            .and_then(|label| Encoding::for_label(label.trim().as_bytes()))
            .or_else(|| sniff_meta_charset(bytes))
            .unwrap_or(UTF_8);
        let (text, used, had_errors) = encoding.decode(bytes);
        if had_errors {
            log::debug!("Lossy decode as {}", used.name());
        }
        Self::parse_str(&text)
    }

    /// Parse already-decoded markup.
    pub fn parse_str(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
            source: markup.to_string(),
        }
    }

    /// All nodes matching a selector, in document order.
    pub fn query(&self, selector: &str) -> Result<Vec<Node<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).map(Node::from).collect())
    }

    /// First node matching a selector.
    pub fn first(&self, selector: &str) -> Result<Option<Node<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).next().map(Node::from))
    }

    /// Decoded markup as received.
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// A single element within a [`Document`].
#[derive(Clone, Copy)]
pub struct Node<'a> {
    element: ElementRef<'a>,
}

impl<'a> From<ElementRef<'a>> for Node<'a> {
    fn from(element: ElementRef<'a>) -> Self {
        Self { element }
    }
}

impl<'a> Node<'a> {
    /// Descendants matching a selector, in document order.
    pub fn query(&self, selector: &str) -> Result<Vec<Node<'a>>> {
        let sel = parse_selector(selector)?;
        Ok(self.element.select(&sel).map(Node::from).collect())
    }

    /// First descendant matching a selector.
    pub fn first(&self, selector: &str) -> Result<Option<Node<'a>>> {
        let sel = parse_selector(selector)?;
        Ok(self.element.select(&sel).next().map(Node::from))
    }

    /// Raw attribute value.
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Text content with whitespace collapsed.
    pub fn text(&self) -> String {
        let raw: String = self.element.text().collect();
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// `href` joined against a base URL.
    pub fn resolved_href(&self, base: &Url) -> Option<String> {
        self.resolved_attr("href", base)
    }

    /// Any URL-valued attribute joined against a base URL.
    ///
    /// Blank values, `javascript:` pseudo-links and values that do not join
    /// into a valid URL count as absent.
    pub fn resolved_attr(&self, name: &str, base: &Url) -> Option<String> {
        let raw = self.attribute(name)?.trim();
        if raw.is_empty() || raw.to_ascii_lowercase().starts_with("javascript:") {
            return None;
        }
        base.join(raw).ok().map(String::from)
    }
}

/// Charset parameter of a Content-Type header value.
pub fn charset_from_content_type(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

fn sniff_meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(1024)];
    let head = String::from_utf8_lossy(head);
    let label = META_CHARSET.captures(&head)?.get(1)?.as_str().to_string();
    Encoding::for_label(label.as_bytes())
}
