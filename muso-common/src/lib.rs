//! # Muso Common Library
//!
//! Shared foundation for the muso curation tool:
//! - Common error type
//! - Configuration loading and path resolution
//! - Catalog identifier (MBID) parsing and validation

pub mod config;
pub mod error;
pub mod mbid;

pub use error::{Error, Result};
pub use mbid::Mbid;
