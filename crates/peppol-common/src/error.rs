#![forbid(unsafe_code)]

//! Error kinds for the lookup pipeline.
//!
//! Two top-level kinds: [`LookupError`] for fetch and structural parse
//! failures, [`VerificationError`] for signature-integrity failures.
//! They are kept separate because callers handle them differently — a
//! failed fetch may be retried against a mirror, a failed signature
//! must never be.

/// A cause attached to a transport failure.
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync>;

/// Fetch and structural parse failures.
///
/// A `LookupError` never accompanies a partial result: callers see
/// either a complete, consistent model or this error.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("fetch failed for {address}: {source}")]
    Fetch {
        address: String,
        #[source]
        source: BoxedCause,
    },

    #[error("XML parsing error: {0}")]
    XmlParse(String),

    #[error("{0} element not found")]
    ElementNotFound(String),

    #[error("missing required attribute: {0}")]
    MissingAttribute(String),

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("malformed service metadata reference: {0}")]
    MalformedReference(String),

    #[error("certificate error: {0}")]
    Certificate(String),

    #[error("base64 decode error: {0}")]
    Base64(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Signature-integrity failures.
///
/// Always fatal to the lookup; indicates the document may have been
/// tampered with since signing.
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    #[error("missing required element: {0}")]
    MissingElement(String),

    #[error("missing required attribute: {0}")]
    MissingAttribute(String),

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("transform error: {0}")]
    Transform(String),

    #[error("digest mismatch for reference: {0}")]
    DigestMismatch(String),

    #[error("signature value verification failed")]
    SignatureInvalid,

    #[error("signer certificate error: {0}")]
    Certificate(String),

    #[error("invalid URI reference: {0}")]
    InvalidUri(String),

    #[error("base64 decode error: {0}")]
    Base64(String),

    #[error("cryptographic error: {0}")]
    Crypto(String),
}

/// Combined error for operations that can fail either way, such as
/// parsing a signed service-metadata document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Verification(#[from] VerificationError),
}
