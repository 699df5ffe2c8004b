// src/models/mod.rs

//! Domain models for the source adapter.
//!
//! This module contains all data structures returned to the host and the
//! configuration that drives extraction, organized by their primary purpose.

mod catalog;
mod config;
mod descriptor;
mod detail;
mod filters;
mod resource;
mod schedule;
mod selectors;

// Re-export all public types
pub use catalog::CatalogSummary;
pub use config::{
    CleaningConfig, Config, LoggingConfig, ResolverConfig, SourceConfig, TransportConfig,
};
pub use descriptor::SourceDescriptor;
pub use detail::{ItemDetail, ResourceRef};
pub use filters::{FilterFacet, FilterOption, FilterSelections, filter_catalog};
pub use resource::{ResolvedResource, ResourceKind};
pub use schedule::{Schedule, ScheduleEntry};
pub use selectors::{
    AttrSelector, CatalogSelectors, DetailSelectors, ResolverSelectors, ScheduleSelectors,
    Selectors, parse_selector,
};
