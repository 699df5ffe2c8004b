// src/source.rs

//! Capability surface consumed by the aggregator host.
//!
//! Each call is an independent fetch → parse → extract unit. Nothing is
//! cached or shared between calls apart from the immutable configuration
//! and the transport.

use std::sync::Arc;

use url::Url;

use crate::error::Result;
use crate::models::{
    CatalogSummary, Config, FilterFacet, FilterSelections, ItemDetail, ResolvedResource,
    Schedule, SourceDescriptor, filter_catalog,
};
use crate::services::catalog::{listing_url, search_url};
use crate::services::{CatalogExtractor, DetailExtractor, ResourceResolver, ScheduleExtractor};
use crate::utils::http::{FetchProfile, FetchResponse, HttpTransport, Transport};

/// The yhdmz content source.
pub struct Source {
    config: Arc<Config>,
    transport: Arc<dyn Transport>,
    profile: FetchProfile,
    base_url: Url,
    facets: Vec<FilterFacet>,
    resolver: ResourceResolver,
}

impl Source {
    /// Create a source that talks to the live site.
    pub fn new(config: Config) -> Result<Self> {
        let transport = HttpTransport::new(&config.transport)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a source over any transport.
    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        let base_url = config.source.base_url()?;
        let profile = FetchProfile::from(&config.transport);
        let resolver = ResourceResolver::new(
            Arc::clone(&transport),
            profile.clone(),
            config.resolver.clone(),
            config.selectors.resolver.clone(),
            &base_url,
        )?;

        Ok(Self {
            config: Arc::new(config),
            transport,
            profile,
            base_url,
            facets: filter_catalog(),
            resolver,
        })
    }

    /// Static source metadata.
    pub fn descriptor(&self) -> SourceDescriptor {
        SourceDescriptor::yhdmz()
    }

    /// The weekly schedule, seven days Monday first.
    pub async fn schedule(&self) -> Result<Schedule> {
        let url = self
            .config
            .source
            .page_url(&self.config.source.schedule_path)?;
        let response = self.fetch(&url).await?;

        let extractor =
            ScheduleExtractor::new(&self.config.selectors.schedule, &self.config.cleaning);
        let schedule = extractor.extract(&response.document(), &self.base_url)?;
        log::info!("Schedule: {} entries", schedule.entry_count());
        Ok(schedule)
    }

    /// The static filter vocabulary for [`Source::home_listing`].
    pub fn filter_catalog(&self) -> Vec<FilterFacet> {
        self.facets.clone()
    }

    /// One page of keyword search results. `page_index` is 1-based.
    ///
    /// A blank keyword or zero page size returns nothing without fetching.
    pub async fn search(
        &self,
        page_index: usize,
        page_size: usize,
        keyword: &str,
    ) -> Result<Vec<CatalogSummary>> {
        if keyword.trim().is_empty() || page_size == 0 {
            return Ok(Vec::new());
        }
        let url = search_url(&self.config.source, page_index, page_size, keyword)?;
        let results = self.catalog_page(&url).await?;
        log::info!(
            "Search '{}' page {}: {} result(s)",
            keyword.trim(),
            page_index,
            results.len()
        );
        Ok(results)
    }

    /// One page of the filtered catalog listing. `page_index` is 1-based.
    ///
    /// Pages past the end are empty, not errors.
    pub async fn home_listing(
        &self,
        page_index: usize,
        page_size: usize,
        selections: &FilterSelections,
    ) -> Result<Vec<CatalogSummary>> {
        if page_size == 0 {
            return Ok(Vec::new());
        }
        let url = listing_url(
            &self.config.source,
            &self.facets,
            page_index,
            page_size,
            selections,
        )?;
        let results = self.catalog_page(&url).await?;
        log::info!("Listing page {}: {} item(s)", page_index, results.len());
        Ok(results)
    }

    /// Full record of one item. Relative URLs are taken against the site root.
    pub async fn detail(&self, detail_url: &str) -> Result<ItemDetail> {
        let url = self.base_url.join(detail_url.trim())?;
        let response = self.fetch(&url).await?;

        let extractor = DetailExtractor::new(&self.config.selectors.detail, &self.config.cleaning);
        let detail = extractor.extract(&response.document(), &url)?;
        log::info!(
            "Detail '{}': {} resource(s) in {} group(s)",
            detail.title,
            detail.resource_groups.iter().map(Vec::len).sum::<usize>(),
            detail.resource_groups.len()
        );
        Ok(detail)
    }

    /// Playable URLs for resource references, one per input in input order.
    pub async fn resolve_resources(&self, raw_urls: &[String]) -> Vec<ResolvedResource> {
        self.resolver.resolve(raw_urls).await
    }

    async fn catalog_page(&self, url: &Url) -> Result<Vec<CatalogSummary>> {
        let response = self.fetch(url).await?;
        let extractor =
            CatalogExtractor::new(&self.config.selectors.catalog, &self.config.cleaning);
        extractor.extract(&response.document(), &self.base_url)
    }

    async fn fetch(&self, url: &Url) -> Result<FetchResponse> {
        self.transport.fetch(url.as_str(), &self.profile).await
    }
}
