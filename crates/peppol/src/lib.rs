#![forbid(unsafe_code)]

//! PEPPOL SMP lookup, one crate per concern, re-exported here.
//!
//! The usual flow: fetch a document with [`lookup::UrlFetcher`], parse
//! it with [`lookup::BusdoxReader`], and check the returned signer
//! certificate against a [`security::ModeDescription`]:
//!
//! ```no_run
//! use peppol::lookup::{BusdoxReader, MetadataFetcher, UrlFetcher};
//! use peppol::security::{issuer_matches, Mode, ModeDescription, Service};
//!
//! # fn main() -> Result<(), peppol::Error> {
//! let fetcher = UrlFetcher::new()?;
//! let reader = BusdoxReader::new();
//! let truststore = std::fs::read("truststore.p12").map_err(peppol::LookupError::from)?;
//! let policy = ModeDescription::new(Mode::Test, truststore);
//!
//! let response = fetcher.fetch(
//!     "http://smp.example.org/iso6523-actorid-upis%3A%3A9908%3A810418052\
//!      /services/busdox-docid-qname%3A%3Aurn%3Aexample%3A%3AInvoice",
//! )?;
//! let metadata = reader.parse_service_metadata(&response)?;
//! if let Some(signer) = metadata.signer_certificate() {
//!     assert!(issuer_matches(signer, policy.issuers(Service::Smp)));
//! }
//! # Ok(())
//! # }
//! ```

pub use peppol_common as common;
pub use peppol_lookup as lookup;
pub use peppol_security as security;
pub use peppol_xmldsig as xmldsig;

pub use peppol_common::{Error, LookupError, VerificationError};
pub use peppol_lookup::{BusdoxReader, Endpoint, FetcherResponse, ServiceMetadata, UrlFetcher};
pub use peppol_security::{Mode, ModeDescription, Service};
pub use peppol_xmldsig::verify;
