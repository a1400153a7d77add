#![forbid(unsafe_code)]

//! Enveloped XML-DSig processing for SMP service-metadata documents.
//!
//! [`verify`] checks the enveloped signature on a signed document and
//! returns the signer certificate taken from `KeyInfo/X509Data`.
//! [`sign_enveloped`] produces such a signature; signing and
//! verification share the canonicalization code, so a document signed
//! here always verifies here.
//!
//! This module decides cryptographic integrity only. Whether the
//! signer certificate's issuer is trusted is a policy decision layered
//! on top (see `peppol-security`).

pub mod c14n;
pub mod crypto;
pub mod nodeset;
pub mod sign;
pub mod verify;

pub use nodeset::NodeSet;
pub use sign::{sign_enveloped, SignOptions};
pub use verify::verify;
