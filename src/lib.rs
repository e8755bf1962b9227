//! Classified Extract - Listing Page Record Extraction Service
//!
//! This crate turns classified-listing HTML pages into flat, structured
//! records and optionally stores them in named collections behind a small
//! HTTP front end.
//!
//! # Features
//!
//! - **Extraction**: Title, price, post date, photos, map, attribute groups, body, notices
//! - **Retrieval**: Async page download with timeouts and URL validation
//! - **Persistence**: In-memory or JSON lines collections
//! - **HTTP Front End**: Form-driven ingestion with health, status and Prometheus endpoints
//!
//! # Architecture
//!
//! ```text
//! POST /{collection} ──▶ Pipeline ──▶ HttpRetriever
//!                           │
//!                           ▼
//!                   ListingExtractor ──▶ ListingRecord
//!                           │
//!                           ▼
//!                      RecordStore ──▶ id
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use classified_extract::extraction::ListingExtractor;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let html = std::fs::read_to_string("listing.html")?;
//!     let record = ListingExtractor::new().extract(&html)?;
//!
//!     println!("{} ({:?})", record.title, record.price);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod cors;
pub mod error;
pub mod extraction;
pub mod handlers;
pub mod pipeline;
pub mod retriever;
pub mod store;

// Re-exports for convenience
pub use config::{ServerConfig, StoreConfig};
pub use error::{Error, Result};
pub use extraction::{ExtractOptions, ListingExtractor, ListingRecord};
pub use pipeline::Pipeline;
pub use retriever::{HttpRetriever, RetrieverConfig};
pub use store::{JsonLinesStore, MemoryStore, RecordStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
