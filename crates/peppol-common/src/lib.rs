#![forbid(unsafe_code)]

//! Shared building blocks for the PEPPOL lookup client: error kinds,
//! the identifier model, and XML namespace/algorithm constants.

pub mod algorithm;
pub mod error;
pub mod identifier;
pub mod ns;

pub use error::{Error, LookupError, VerificationError};
pub use identifier::{
    DocumentTypeIdentifier, ParticipantIdentifier, ProcessIdentifier, TransportProfile,
};
