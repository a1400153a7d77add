#![forbid(unsafe_code)]

//! SMP lookup: fetch a participant's service-metadata document over
//! HTTP, parse it into a typed model, and (for signed documents) carry
//! the verified signer certificate on the result.
//!
//! The pipeline is strictly sequential per lookup: fetch → parse →
//! verify. Nothing here holds shared mutable state, so independent
//! lookups may run concurrently without coordination.

pub mod fetcher;
pub mod model;
pub mod reader;

pub use fetcher::{MetadataFetcher, UrlFetcher};
pub use model::{Endpoint, FetcherResponse, ServiceMetadata};
pub use reader::BusdoxReader;
