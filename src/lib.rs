// src/lib.rs

//! yhdmz source adapter library
//!
//! Normalizes the yhdmz anime catalog into the query capabilities an
//! aggregator host consumes. Start with [`Source`].

pub mod document;
pub mod error;
pub mod models;
pub mod services;
pub mod source;
pub mod utils;

pub use source::Source;
