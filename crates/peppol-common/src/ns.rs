#![forbid(unsafe_code)]

//! XML namespace constants used across the library.

/// BusDox service-metadata publishing namespace (SMP documents).
pub const SMP: &str = "http://busdox.org/serviceMetadata/publishing/1.0/";

/// BusDox transport identifiers namespace (participant/document/process
/// identifier elements inside SMP documents).
pub const IDS: &str = "http://busdox.org/transport/identifiers/1.0/";

/// WS-Addressing namespace (endpoint references).
pub const WSA: &str = "http://www.w3.org/2005/08/addressing";

/// XML Digital Signature namespace.
pub const DSIG: &str = "http://www.w3.org/2000/09/xmldsig#";

/// Exclusive C14N namespace.
pub const EXC_C14N: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";

/// XML namespace.
pub const XML: &str = "http://www.w3.org/XML/1998/namespace";

// ── Element names ────────────────────────────────────────────────────

pub mod node {
    // SMP elements
    pub const SERVICE_GROUP: &str = "ServiceGroup";
    pub const SERVICE_METADATA: &str = "ServiceMetadata";
    pub const SIGNED_SERVICE_METADATA: &str = "SignedServiceMetadata";
    pub const SERVICE_INFORMATION: &str = "ServiceInformation";
    pub const SERVICE_METADATA_REFERENCE_COLLECTION: &str = "ServiceMetadataReferenceCollection";
    pub const SERVICE_METADATA_REFERENCE: &str = "ServiceMetadataReference";
    pub const PARTICIPANT_IDENTIFIER: &str = "ParticipantIdentifier";
    pub const DOCUMENT_IDENTIFIER: &str = "DocumentIdentifier";
    pub const PROCESS_LIST: &str = "ProcessList";
    pub const PROCESS: &str = "Process";
    pub const PROCESS_IDENTIFIER: &str = "ProcessIdentifier";
    pub const SERVICE_ENDPOINT_LIST: &str = "ServiceEndpointList";
    pub const ENDPOINT: &str = "Endpoint";
    pub const ENDPOINT_REFERENCE: &str = "EndpointReference";
    pub const ADDRESS: &str = "Address";
    pub const CERTIFICATE: &str = "Certificate";

    // DSig elements
    pub const SIGNATURE: &str = "Signature";
    pub const SIGNED_INFO: &str = "SignedInfo";
    pub const CANONICALIZATION_METHOD: &str = "CanonicalizationMethod";
    pub const SIGNATURE_METHOD: &str = "SignatureMethod";
    pub const SIGNATURE_VALUE: &str = "SignatureValue";
    pub const REFERENCE: &str = "Reference";
    pub const TRANSFORMS: &str = "Transforms";
    pub const TRANSFORM: &str = "Transform";
    pub const DIGEST_METHOD: &str = "DigestMethod";
    pub const DIGEST_VALUE: &str = "DigestValue";
    pub const KEY_INFO: &str = "KeyInfo";
    pub const X509_DATA: &str = "X509Data";
    pub const X509_CERTIFICATE: &str = "X509Certificate";
    pub const INCLUSIVE_NAMESPACES: &str = "InclusiveNamespaces";
}

// ── Attribute names ──────────────────────────────────────────────────

pub mod attr {
    pub const SCHEME: &str = "scheme";
    pub const HREF: &str = "href";
    pub const TRANSPORT_PROFILE: &str = "transportProfile";
    pub const ALGORITHM: &str = "Algorithm";
    pub const URI: &str = "URI";
    pub const PREFIX_LIST: &str = "PrefixList";
}
