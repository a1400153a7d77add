#![forbid(unsafe_code)]

//! The parsed metadata model.
//!
//! A [`ServiceMetadata`] is built once per successful parse and never
//! mutated afterwards; endpoints keep document order, which is the
//! publisher's delivery-preference order.

use peppol_common::{ProcessIdentifier, TransportProfile};
use peppol_common::{DocumentTypeIdentifier, ParticipantIdentifier};

/// A fully buffered fetch result, consumed exactly once by the reader.
#[derive(Debug, Clone)]
pub struct FetcherResponse {
    body: Vec<u8>,
    content_type: Option<String>,
}

impl FetcherResponse {
    pub fn new(body: Vec<u8>, content_type: Option<String>) -> Self {
        Self { body, content_type }
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }
}

/// One delivery endpoint of a service-metadata record.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    process_identifier: ProcessIdentifier,
    transport_profile: TransportProfile,
    address: String,
    certificate: x509_cert::Certificate,
}

impl Endpoint {
    pub(crate) fn new(
        process_identifier: ProcessIdentifier,
        transport_profile: TransportProfile,
        address: String,
        certificate: x509_cert::Certificate,
    ) -> Self {
        Self {
            process_identifier,
            transport_profile,
            address,
            certificate,
        }
    }

    pub fn process_identifier(&self) -> &ProcessIdentifier {
        &self.process_identifier
    }

    pub fn transport_profile(&self) -> &TransportProfile {
        &self.transport_profile
    }

    /// The delivery address (a URI string).
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The endpoint's own certificate, as published.
    pub fn certificate(&self) -> &x509_cert::Certificate {
        &self.certificate
    }
}

/// The directory record describing how to reach a participant for one
/// document type.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceMetadata {
    participant_identifier: ParticipantIdentifier,
    document_identifier: DocumentTypeIdentifier,
    endpoints: Vec<Endpoint>,
    signer_certificate: Option<x509_cert::Certificate>,
}

impl ServiceMetadata {
    pub(crate) fn new(
        participant_identifier: ParticipantIdentifier,
        document_identifier: DocumentTypeIdentifier,
    ) -> Self {
        Self {
            participant_identifier,
            document_identifier,
            endpoints: Vec::new(),
            signer_certificate: None,
        }
    }

    pub(crate) fn push_endpoint(&mut self, endpoint: Endpoint) {
        self.endpoints.push(endpoint);
    }

    pub(crate) fn set_signer_certificate(&mut self, certificate: x509_cert::Certificate) {
        self.signer_certificate = Some(certificate);
    }

    pub fn participant_identifier(&self) -> &ParticipantIdentifier {
        &self.participant_identifier
    }

    pub fn document_identifier(&self) -> &DocumentTypeIdentifier {
        &self.document_identifier
    }

    /// Endpoints in document order.
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// The first endpoint matching a process and transport profile.
    pub fn endpoint(
        &self,
        process: &ProcessIdentifier,
        profile: &TransportProfile,
    ) -> Option<&Endpoint> {
        self.endpoints.iter().find(|e| {
            e.process_identifier() == process && e.transport_profile() == profile
        })
    }

    /// The verified signer certificate; `None` when the source
    /// document was unsigned.
    pub fn signer_certificate(&self) -> Option<&x509_cert::Certificate> {
        self.signer_certificate.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use der::Decode;

    fn test_certificate() -> x509_cert::Certificate {
        let generated =
            rcgen::generate_simple_self_signed(vec!["ap.example.org".to_owned()]).unwrap();
        x509_cert::Certificate::from_der(generated.cert.der()).unwrap()
    }

    fn test_metadata() -> ServiceMetadata {
        let mut metadata = ServiceMetadata::new(
            ParticipantIdentifier::new("iso6523-actorid-upis", "9908:810418052").unwrap(),
            DocumentTypeIdentifier::parse("busdox-docid-qname::urn:example::Invoice").unwrap(),
        );
        let cert = test_certificate();
        let process = ProcessIdentifier::new("cenbii-procid-ubl", "bii04").unwrap();
        metadata.push_endpoint(Endpoint::new(
            process.clone(),
            TransportProfile::new(TransportProfile::START),
            "https://ap1.example.org/as2".to_owned(),
            cert.clone(),
        ));
        metadata.push_endpoint(Endpoint::new(
            process,
            TransportProfile::new(TransportProfile::AS2),
            "https://ap2.example.org/as2".to_owned(),
            cert,
        ));
        metadata
    }

    #[test]
    fn endpoint_lookup_matches_process_and_profile() {
        let metadata = test_metadata();
        let process = ProcessIdentifier::new("cenbii-procid-ubl", "bii04").unwrap();

        let hit = metadata
            .endpoint(&process, &TransportProfile::new(TransportProfile::AS2))
            .unwrap();
        assert_eq!(hit.address(), "https://ap2.example.org/as2");

        let miss = metadata.endpoint(&process, &TransportProfile::new(TransportProfile::AS4));
        assert!(miss.is_none());
    }

    #[test]
    fn endpoints_keep_insertion_order() {
        let metadata = test_metadata();
        let profiles: Vec<&str> = metadata
            .endpoints()
            .iter()
            .map(|e| e.transport_profile().identifier())
            .collect();
        assert_eq!(
            profiles,
            vec![TransportProfile::START, TransportProfile::AS2]
        );
    }
}
