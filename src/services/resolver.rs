// src/services/resolver.rs

//! Resource resolution.
//!
//! Turns resource references from a detail page into playable stream
//! addresses. Each reference is classified into a [`ResourceKind`]; indirect
//! kinds are fetched and scanned for the next address until a direct stream
//! turns up. Any failure leaves the entry as-is, so the output always has
//! one entry per input in input order.

use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use regex::Regex;
use thiserror::Error;
use url::Url;

use crate::document::Document;
use crate::error::{AppError, Result};
use crate::models::{
    AttrSelector, ResolvedResource, ResolverConfig, ResolverSelectors, ResourceKind,
};
use crate::utils::http::{FetchProfile, FetchResponse, Transport};

/// Why a reference was left unresolved.
#[derive(Debug, Error)]
enum Unresolved {
    #[error("not a URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("{0}")]
    Failed(#[from] AppError),

    #[error("no stream reference found in {0}")]
    NoStream(String),

    #[error("still indirect after {0} hops")]
    DepthExceeded(usize),

    #[error("cycle back to {0}")]
    Cycle(String),
}

/// Resolves resource references into playable URLs.
pub struct ResourceResolver {
    transport: Arc<dyn Transport>,
    profile: FetchProfile,
    config: ResolverConfig,
    selectors: ResolverSelectors,
    site_host: Option<String>,
    stream_pattern: Regex,
}

impl ResourceResolver {
    /// Create a resolver. `site_url` decides which pages count as landing pages.
    pub fn new(
        transport: Arc<dyn Transport>,
        profile: FetchProfile,
        config: ResolverConfig,
        selectors: ResolverSelectors,
        site_url: &Url,
    ) -> Result<Self> {
        let stream_pattern = stream_pattern()?;
        Ok(Self {
            transport,
            profile,
            site_host: site_url.host_str().map(str::to_ascii_lowercase),
            config,
            selectors,
            stream_pattern,
        })
    }

    /// Resolve every reference, at most `max_concurrent` at a time.
    ///
    /// Output order and length match the input.
    pub async fn resolve(&self, raw_urls: &[String]) -> Vec<ResolvedResource> {
        let concurrency = self.config.max_concurrent.max(1);
        let mut slots: Vec<Option<ResolvedResource>> = vec![None; raw_urls.len()];

        let mut results = stream::iter(raw_urls.iter().enumerate())
            .map(|(index, raw)| async move { (index, self.resolve_one(raw).await) })
            .buffer_unordered(concurrency);

        while let Some((index, resolved)) = results.next().await {
            slots[index] = Some(resolved);
        }

        let resolved: Vec<ResolvedResource> = slots
            .into_iter()
            .zip(raw_urls)
            .map(|(slot, raw)| slot.unwrap_or_else(|| ResolvedResource::unresolved(raw.as_str())))
            .collect();

        log::info!(
            "Resolved {}/{} resource(s)",
            resolved.iter().filter(|r| r.is_resolved()).count(),
            resolved.len()
        );
        resolved
    }

    /// Resolve a single reference, falling back to the reference itself.
    pub async fn resolve_one(&self, raw_url: &str) -> ResolvedResource {
        match self.follow(raw_url).await {
            Ok(playable_url) => ResolvedResource {
                raw_url: raw_url.to_string(),
                playable_url,
            },
            Err(reason) => {
                log::warn!("Leaving {} as-is: {}", raw_url, reason);
                ResolvedResource::unresolved(raw_url)
            }
        }
    }

    /// Classify a URL without fetching it.
    pub fn classify(&self, url: &Url) -> ResourceKind {
        if !matches!(url.scheme(), "http" | "https") || self.config.is_stream_path(url.path()) {
            return ResourceKind::Direct;
        }
        if self.wrapped_target(url).is_some() {
            return ResourceKind::Wrapped;
        }
        let lowered = url.as_str().to_ascii_lowercase();
        if self
            .config
            .embed_markers
            .iter()
            .any(|marker| lowered.contains(&marker.to_ascii_lowercase()))
        {
            return ResourceKind::Embed;
        }
        if url.host_str().map(str::to_ascii_lowercase) == self.site_host {
            return ResourceKind::Landing;
        }
        ResourceKind::Unknown
    }

    async fn follow(&self, raw_url: &str) -> std::result::Result<String, Unresolved> {
        let mut current = clean_reference(raw_url)
            .ok_or_else(|| Unresolved::NoStream(raw_url.to_string()))?
            .to_string();
        let mut visited = HashSet::new();
        let mut hops = 0;

        loop {
            let url = Url::parse(&current)?;
            if !visited.insert(url.to_string()) {
                return Err(Unresolved::Cycle(current));
            }

            let kind = self.classify(&url);
            log::debug!("{} classified as {:?} at hop {}", url, kind, hops);
            if kind == ResourceKind::Direct {
                return Ok(current);
            }
            if hops == self.config.max_depth {
                return Err(Unresolved::DepthExceeded(hops));
            }

            let next = match kind {
                ResourceKind::Wrapped => self.wrapped_target(&url),
                ResourceKind::Embed | ResourceKind::Landing => {
                    let response = self.transport.fetch(url.as_str(), &self.profile).await?;
                    self.scan(&response, kind)?
                }
                ResourceKind::Unknown => {
                    let response = self.transport.fetch(url.as_str(), &self.profile).await?;
                    if self.is_stream_response(&response) {
                        return Ok(response.url);
                    }
                    self.scan(&response, ResourceKind::Landing)?
                }
                ResourceKind::Direct => None,
            };

            current = next
                .ok_or_else(|| Unresolved::NoStream(url.to_string()))?
                .to_string();
            hops += 1;
        }
    }

    /// Target URL carried in a wrapper query parameter.
    fn wrapped_target(&self, url: &Url) -> Option<Url> {
        url.query_pairs()
            .filter(|(key, _)| {
                self.config
                    .wrapper_params
                    .iter()
                    .any(|p| p.eq_ignore_ascii_case(key))
            })
            .find_map(|(_, value)| {
                let value = clean_reference(&value)?;
                let target = Url::parse(value).ok()?;
                matches!(target.scheme(), "http" | "https").then_some(target)
            })
    }

    fn is_stream_response(&self, response: &FetchResponse) -> bool {
        let declared = response
            .content_type
            .as_deref()
            .is_some_and(|ct| self.config.is_stream_content_type(ct));
        let head = &response.body[..response.body.len().min(16)];
        let playlist = String::from_utf8_lossy(head)
            .trim_start_matches('\u{feff}')
            .trim_start()
            .starts_with("#EXTM3U");
        declared || playlist
    }

    /// Find the next address in a fetched page.
    ///
    /// Stream attributes first, then the pattern scan of the raw markup.
    /// Landing pages look at nested frames before the pattern scan; embed
    /// pages only after it.
    fn scan(
        &self,
        response: &FetchResponse,
        kind: ResourceKind,
    ) -> std::result::Result<Option<Url>, Unresolved> {
        let base = response.final_url()?;
        let document = response.document();

        for attr in &self.selectors.stream_attrs {
            if let Some(found) = first_attr(&document, attr, &base)? {
                return Ok(Some(found));
            }
        }

        if kind == ResourceKind::Landing {
            if let Some(found) = first_attr(&document, &self.selectors.frame, &base)? {
                return Ok(Some(found));
            }
        }

        if let Some(found) = self.pattern_scan(document.source(), &base) {
            return Ok(Some(found));
        }

        if kind == ResourceKind::Embed {
            return Ok(first_attr(&document, &self.selectors.frame, &base)?);
        }
        Ok(None)
    }

    /// First absolute URL in raw markup whose path ends with a stream extension.
    fn pattern_scan(&self, markup: &str, base: &Url) -> Option<Url> {
        self.stream_pattern
            .find_iter(markup)
            .filter_map(|m| base.join(&m.as_str().replace("\\/", "/")).ok())
            .find(|url| self.config.is_stream_path(url.path()))
    }
}

/// First usable URL held by `attr` in the document.
fn first_attr(
    document: &Document,
    attr: &AttrSelector,
    base: &Url,
) -> std::result::Result<Option<Url>, Unresolved> {
    let found = document.query(&attr.selector)?.iter().find_map(|node| {
        let value = clean_reference(node.attribute(&attr.attr)?)?;
        if value.to_ascii_lowercase().starts_with("javascript:") {
            return None;
        }
        base.join(value).ok()
    });
    Ok(found)
}

/// Trim a reference and cut a trailing `$kind` tag (`...m3u8$mp4`).
fn clean_reference(value: &str) -> Option<&str> {
    let value = value.trim();
    let value = value.split('$').next().unwrap_or(value).trim();
    (!value.is_empty()).then_some(value)
}

/// Whole absolute URLs in raw markup, JSON-escaped slashes included.
fn stream_pattern() -> Result<Regex> {
    Regex::new(r#"(?i)https?:(?:\\?/){2}(?:\\/|[^\s"'<>()\\])+"#)
        .map_err(|e| AppError::config(format!("stream pattern: {e}")))
}
