//! Service layer for the source adapter.
//!
//! This module contains the extraction and resolution logic:
//! - Weekly schedule extraction (`ScheduleExtractor`)
//! - Listing and search card extraction (`CatalogExtractor`)
//! - Item detail extraction (`DetailExtractor`)
//! - Resource resolution (`ResourceResolver`)

pub mod catalog;
mod detail;
mod resolver;
mod schedule;

pub use catalog::CatalogExtractor;
pub use detail::DetailExtractor;
pub use resolver::ResourceResolver;
pub use schedule::ScheduleExtractor;
