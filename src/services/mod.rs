//! Service layer: outward-facing collaborators.
//!
//! - Document retrieval (`DocumentFetcher` / `HttpFetcher`)
//! - URL list sources (`UrlSource` / `FileUrlSource` / `SheetUrlSource`)

mod fetch;
pub mod source;

pub use fetch::{DocumentBody, DocumentFetcher, HttpFetcher};
pub use source::{FileUrlSource, SheetUrlSource, UrlSource};
