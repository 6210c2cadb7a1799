//! Federated search across the book catalogs.
//!
//! This module provides:
//! - Raw per-catalog records (`RawPage`, `RawRecord`)
//! - `UnifiedBook`: the normalized record every catalog maps onto
//! - `normalize` and `compose`: pure steps from raw pages to a display page
//! - `FederatedLibrary`: engine for concurrent multi-catalog search
//!
//! # Example
//!
//! ```no_run
//! use folio_core::catalogs::build_registry;
//! use folio_core::federated::{FederatedLibrary, PageRequest};
//! use folio_core::transport::ReqwestTransport;
//! use folio_core::FolioConfig;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = FolioConfig::default();
//! let transport = Arc::new(ReqwestTransport::new(&config.user_agent)?);
//! let library = FederatedLibrary::new(build_registry(&config, transport)?);
//!
//! let outcome = library.search(&PageRequest::first("science fiction")?).await;
//! for book in &outcome.books {
//!     println!("[{}] {} by {}", book.source.label(), book.title, book.author);
//! }
//! # Ok(())
//! # }
//! ```

mod compose;
mod engine;
mod normalize;
mod raw;
mod types;

pub use compose::{compose, compose_with_rng};
pub use engine::FederatedLibrary;
pub use normalize::{
    normalize, normalize_record, open_library_cover_url, secure_url, OPEN_LIBRARY_COVER_BASE,
};
pub use raw::{
    GoogleVolume, GutendexBook, GutendexPerson, ImageLinks, OpenLibraryDoc, RawPage, RawRecord,
    VolumeInfo,
};
pub use types::{
    BookKey, ComposedPage, ContentResult, PageRequest, SearchOutcome, Source, SourceReport,
    UnifiedBook, UNKNOWN_AUTHOR, UNTITLED,
};
