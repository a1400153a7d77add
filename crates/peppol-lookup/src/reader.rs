#![forbid(unsafe_code)]

//! BusDox document reader.
//!
//! Two operations over fetched SMP documents: list the document-type
//! identifiers of a service group, and parse a (possibly signed)
//! service-metadata document into [`ServiceMetadata`]. Signed
//! documents are verified before any content is trusted; the signer
//! certificate the verifier returns is recorded on the model.

use crate::model::{Endpoint, FetcherResponse, ServiceMetadata};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use der::Decode;
use peppol_common::{ns, Error, LookupError};
use peppol_common::{
    DocumentTypeIdentifier, ParticipantIdentifier, ProcessIdentifier, TransportProfile,
};
use percent_encoding::percent_decode_str;

/// The path marker separating the participant part of a reference URL
/// from its document-identifier part.
const SERVICES_MARKER: &str = "/services/";

/// The recognized root shapes of an SMP document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentRoot {
    ServiceGroup,
    ServiceMetadata,
    SignedServiceMetadata,
}

impl DocumentRoot {
    fn classify(root: roxmltree::Node<'_, '_>) -> Option<Self> {
        if root.tag_name().namespace() != Some(ns::SMP) {
            return None;
        }
        match root.tag_name().name() {
            n if n == ns::node::SERVICE_GROUP => Some(Self::ServiceGroup),
            n if n == ns::node::SERVICE_METADATA => Some(Self::ServiceMetadata),
            n if n == ns::node::SIGNED_SERVICE_METADATA => Some(Self::SignedServiceMetadata),
            _ => None,
        }
    }
}

/// Stateless reader for BusDox SMP documents. One instance may be
/// shared freely across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct BusdoxReader;

impl BusdoxReader {
    pub fn new() -> Self {
        Self
    }

    /// List the document-type identifiers a service group publishes.
    ///
    /// Each `ServiceMetadataReference/@href` is split at the
    /// `/services/` marker, percent-decoded, and split on the first
    /// `::` into `(scheme, value)`. Any malformed reference fails the
    /// whole call; a group with zero references is a valid empty list.
    pub fn parse_document_identifiers(
        &self,
        response: &FetcherResponse,
    ) -> Result<Vec<DocumentTypeIdentifier>, LookupError> {
        let xml = document_text(response)?;
        let doc = roxmltree::Document::parse(xml)
            .map_err(|e| LookupError::XmlParse(e.to_string()))?;
        let root = doc.root_element();
        if DocumentRoot::classify(root) != Some(DocumentRoot::ServiceGroup) {
            return Err(LookupError::ElementNotFound(
                ns::node::SERVICE_GROUP.to_owned(),
            ));
        }

        let mut identifiers = Vec::new();
        let Some(collection) = optional_child(
            root,
            ns::SMP,
            ns::node::SERVICE_METADATA_REFERENCE_COLLECTION,
        ) else {
            return Ok(identifiers);
        };
        for reference in children(collection, ns::SMP, ns::node::SERVICE_METADATA_REFERENCE) {
            let href = reference
                .attribute(ns::attr::HREF)
                .ok_or_else(|| LookupError::MissingAttribute(ns::attr::HREF.to_owned()))?;
            identifiers.push(document_identifier_from_href(href)?);
        }
        log::debug!("service group lists {} document identifiers", identifiers.len());
        Ok(identifiers)
    }

    /// Parse a service-metadata document, verifying the signature
    /// first when the root is a signed wrapper.
    pub fn parse_service_metadata(
        &self,
        response: &FetcherResponse,
    ) -> Result<ServiceMetadata, Error> {
        let xml = document_text(response)?;
        let doc = roxmltree::Document::parse(xml)
            .map_err(|e| LookupError::XmlParse(e.to_string()))?;
        let root = doc.root_element();

        let metadata_not_found =
            || LookupError::ElementNotFound(ns::node::SERVICE_METADATA.to_owned());

        match DocumentRoot::classify(root) {
            Some(DocumentRoot::SignedServiceMetadata) => {
                let signer = peppol_xmldsig::verify(xml)?;
                let inner = optional_child(root, ns::SMP, ns::node::SERVICE_METADATA)
                    .ok_or_else(metadata_not_found)?;
                let mut metadata = parse_metadata_element(inner)?;
                metadata.set_signer_certificate(signer);
                Ok(metadata)
            }
            Some(DocumentRoot::ServiceMetadata) => Ok(parse_metadata_element(root)?),
            Some(DocumentRoot::ServiceGroup) | None => Err(metadata_not_found().into()),
        }
    }
}

/// `(scheme, value)` out of a service-metadata reference URL.
fn document_identifier_from_href(href: &str) -> Result<DocumentTypeIdentifier, LookupError> {
    let malformed = || LookupError::MalformedReference(href.to_owned());
    let (_, encoded) = href.split_once(SERVICES_MARKER).ok_or_else(malformed)?;
    let decoded = percent_decode_str(encoded)
        .decode_utf8()
        .map_err(|_| malformed())?;
    let (scheme, value) = decoded.split_once("::").ok_or_else(malformed)?;
    DocumentTypeIdentifier::new(scheme, value)
}

fn parse_metadata_element(
    metadata: roxmltree::Node<'_, '_>,
) -> Result<ServiceMetadata, LookupError> {
    let information = required_child(metadata, ns::SMP, ns::node::SERVICE_INFORMATION)?;

    let participant_node =
        required_child(information, ns::IDS, ns::node::PARTICIPANT_IDENTIFIER)?;
    let participant = ParticipantIdentifier::new(
        required_attr(participant_node, ns::attr::SCHEME)?,
        element_text(participant_node),
    )?;

    let document_node = required_child(information, ns::IDS, ns::node::DOCUMENT_IDENTIFIER)?;
    let document = DocumentTypeIdentifier::new(
        required_attr(document_node, ns::attr::SCHEME)?,
        element_text(document_node),
    )?;

    let mut result = ServiceMetadata::new(participant, document);

    let process_list = required_child(information, ns::SMP, ns::node::PROCESS_LIST)?;
    for process in children(process_list, ns::SMP, ns::node::PROCESS) {
        let process_node = required_child(process, ns::IDS, ns::node::PROCESS_IDENTIFIER)?;
        let process_identifier = ProcessIdentifier::new(
            required_attr(process_node, ns::attr::SCHEME)?,
            element_text(process_node),
        )?;

        let endpoint_list = required_child(process, ns::SMP, ns::node::SERVICE_ENDPOINT_LIST)?;
        for endpoint in children(endpoint_list, ns::SMP, ns::node::ENDPOINT) {
            let profile = TransportProfile::new(required_attr(
                endpoint,
                ns::attr::TRANSPORT_PROFILE,
            )?);

            let reference = required_child(endpoint, ns::WSA, ns::node::ENDPOINT_REFERENCE)?;
            let address_node = required_child(reference, ns::WSA, ns::node::ADDRESS)?;
            let address = element_text(address_node);

            let cert_node = required_child(endpoint, ns::SMP, ns::node::CERTIFICATE)?;
            let certificate = decode_certificate(&element_text(cert_node))?;

            result.push_endpoint(Endpoint::new(
                process_identifier.clone(),
                profile,
                address,
                certificate,
            ));
        }
    }

    log::debug!(
        "parsed service metadata for {} with {} endpoints",
        result.participant_identifier(),
        result.endpoints().len()
    );
    Ok(result)
}

/// Endpoint certificates are embedded as (often line-wrapped) base64
/// DER.
fn decode_certificate(text: &str) -> Result<x509_cert::Certificate, LookupError> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let der = BASE64
        .decode(compact)
        .map_err(|e| LookupError::Base64(e.to_string()))?;
    x509_cert::Certificate::from_der(&der)
        .map_err(|e| LookupError::Certificate(e.to_string()))
}

fn document_text(response: &FetcherResponse) -> Result<&str, LookupError> {
    std::str::from_utf8(response.body())
        .map_err(|e| LookupError::XmlParse(format!("document is not valid UTF-8: {e}")))
}

fn required_child<'a, 'input>(
    parent: roxmltree::Node<'a, 'input>,
    namespace: &str,
    name: &str,
) -> Result<roxmltree::Node<'a, 'input>, LookupError> {
    optional_child(parent, namespace, name)
        .ok_or_else(|| LookupError::ElementNotFound(name.to_owned()))
}

fn optional_child<'a, 'input>(
    parent: roxmltree::Node<'a, 'input>,
    namespace: &str,
    name: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    parent
        .children()
        .find(|n| n.has_tag_name((namespace, name)))
}

fn children<'a, 'input>(
    parent: roxmltree::Node<'a, 'input>,
    namespace: &'a str,
    name: &'a str,
) -> impl Iterator<Item = roxmltree::Node<'a, 'input>> + 'a {
    parent
        .children()
        .filter(move |n| n.has_tag_name((namespace, name)))
}

fn required_attr<'a>(
    node: roxmltree::Node<'a, '_>,
    name: &str,
) -> Result<&'a str, LookupError> {
    node.attribute(name)
        .ok_or_else(|| LookupError::MissingAttribute(name.to_owned()))
}

fn element_text(node: roxmltree::Node<'_, '_>) -> String {
    node.text().unwrap_or("").trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use peppol_xmldsig::{sign_enveloped, SignOptions};

    fn response(xml: &str) -> FetcherResponse {
        FetcherResponse::new(xml.as_bytes().to_vec(), Some("text/xml".to_owned()))
    }

    fn test_cert() -> (Vec<u8>, String) {
        let generated =
            rcgen::generate_simple_self_signed(vec!["smp.test.example.org".to_owned()]).unwrap();
        let der = generated.cert.der().to_vec();
        let b64 = BASE64.encode(&der);
        (der, b64)
    }

    fn metadata_xml(cert_b64: &str) -> String {
        format!(
            concat!(
                r#"<ServiceMetadata xmlns="{smp}" xmlns:ids="{ids}" xmlns:wsa="{wsa}">"#,
                "<ServiceInformation>",
                r#"<ids:ParticipantIdentifier scheme="iso6523-actorid-upis">9908:810418052</ids:ParticipantIdentifier>"#,
                r#"<ids:DocumentIdentifier scheme="busdox-docid-qname">urn:oasis:names:specification:ubl:schema:xsd:Invoice-2::Invoice</ids:DocumentIdentifier>"#,
                "<ProcessList><Process>",
                r#"<ids:ProcessIdentifier scheme="cenbii-procid-ubl">urn:www.cenbii.eu:profile:bii04:ver1.0</ids:ProcessIdentifier>"#,
                "<ServiceEndpointList>",
                r#"<Endpoint transportProfile="busdox-transport-start">"#,
                "<wsa:EndpointReference><wsa:Address>https://ap1.example.org/accesspoint</wsa:Address></wsa:EndpointReference>",
                "<Certificate>{cert}</Certificate>",
                "</Endpoint>",
                r#"<Endpoint transportProfile="busdox-transport-as2-ver1p0">"#,
                "<wsa:EndpointReference><wsa:Address>https://ap2.example.org/as2</wsa:Address></wsa:EndpointReference>",
                "<Certificate>{cert}</Certificate>",
                "</Endpoint>",
                "</ServiceEndpointList>",
                "</Process></ProcessList>",
                "</ServiceInformation>",
                "</ServiceMetadata>"
            ),
            smp = ns::SMP,
            ids = ns::IDS,
            wsa = ns::WSA,
            cert = cert_b64,
        )
    }

    #[test]
    fn unsigned_metadata_parses_in_document_order() {
        let (_, cert_b64) = test_cert();
        let reader = BusdoxReader::new();
        let metadata = reader
            .parse_service_metadata(&response(&metadata_xml(&cert_b64)))
            .unwrap();

        assert!(metadata.signer_certificate().is_none());
        assert_eq!(
            metadata.participant_identifier().to_string(),
            "iso6523-actorid-upis::9908:810418052"
        );
        assert_eq!(metadata.endpoints().len(), 2);
        assert_eq!(
            metadata.endpoints()[0].address(),
            "https://ap1.example.org/accesspoint"
        );
        assert_eq!(metadata.endpoints()[1].address(), "https://ap2.example.org/as2");
    }

    #[test]
    fn signed_metadata_matches_unsigned_plus_signer() {
        let generated =
            rcgen::generate_simple_self_signed(vec!["smp.test.example.org".to_owned()]).unwrap();
        let signer_der = generated.cert.der().to_vec();
        let (_, endpoint_cert_b64) = test_cert();

        let inner = metadata_xml(&endpoint_cert_b64);
        let wrapper = format!(
            r#"<SignedServiceMetadata xmlns="{}">{}</SignedServiceMetadata>"#,
            ns::SMP,
            inner
        );
        let options =
            SignOptions::ecdsa_sha256(&generated.key_pair.serialize_der(), &signer_der).unwrap();
        let signed = sign_enveloped(&wrapper, &options).unwrap();

        let reader = BusdoxReader::new();
        let from_signed = reader.parse_service_metadata(&response(&signed)).unwrap();
        let from_plain = reader.parse_service_metadata(&response(&inner)).unwrap();

        let expected_signer = x509_cert::Certificate::from_der(&signer_der).unwrap();
        assert_eq!(from_signed.signer_certificate(), Some(&expected_signer));
        assert_eq!(from_signed.endpoints(), from_plain.endpoints());
        assert_eq!(
            from_signed.participant_identifier(),
            from_plain.participant_identifier()
        );
        assert_eq!(
            from_signed.document_identifier(),
            from_plain.document_identifier()
        );
    }

    #[test]
    fn tampered_signed_metadata_is_rejected() {
        let generated =
            rcgen::generate_simple_self_signed(vec!["smp.test.example.org".to_owned()]).unwrap();
        let (_, endpoint_cert_b64) = test_cert();
        let wrapper = format!(
            r#"<SignedServiceMetadata xmlns="{}">{}</SignedServiceMetadata>"#,
            ns::SMP,
            metadata_xml(&endpoint_cert_b64)
        );
        let options = SignOptions::ecdsa_sha256(
            &generated.key_pair.serialize_der(),
            generated.cert.der(),
        )
        .unwrap();
        let signed = sign_enveloped(&wrapper, &options).unwrap();

        let tampered = signed.replace("ap1.example.org", "evil.example.org");
        assert_ne!(signed, tampered);
        let err = BusdoxReader::new()
            .parse_service_metadata(&response(&tampered))
            .unwrap_err();
        assert!(matches!(err, Error::Verification(_)));
    }

    #[test]
    fn service_group_listing_preserves_reference_order() {
        let xml = format!(
            concat!(
                r#"<ServiceGroup xmlns="{smp}">"#,
                "<ServiceMetadataReferenceCollection>",
                r#"<ServiceMetadataReference href="http://smp.example.org/p/services/A%3A%3AB"/>"#,
                r#"<ServiceMetadataReference href="http://smp.example.org/p/services/C%3A%3AD"/>"#,
                "</ServiceMetadataReferenceCollection>",
                "</ServiceGroup>"
            ),
            smp = ns::SMP,
        );
        let ids = BusdoxReader::new()
            .parse_document_identifiers(&response(&xml))
            .unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0].scheme(), "A");
        assert_eq!(ids[0].value(), "B");
        assert_eq!(ids[1].scheme(), "C");
        assert_eq!(ids[1].value(), "D");
    }

    #[test]
    fn empty_service_group_is_an_empty_list() {
        let xml = format!(r#"<ServiceGroup xmlns="{}"/>"#, ns::SMP);
        let ids = BusdoxReader::new()
            .parse_document_identifiers(&response(&xml))
            .unwrap();
        assert!(ids.is_empty());
    }

    #[test]
    fn reference_without_services_marker_fails_whole_call() {
        let xml = format!(
            concat!(
                r#"<ServiceGroup xmlns="{smp}">"#,
                "<ServiceMetadataReferenceCollection>",
                r#"<ServiceMetadataReference href="http://smp.example.org/p/services/A%3A%3AB"/>"#,
                r#"<ServiceMetadataReference href="http://smp.example.org/no-marker"/>"#,
                "</ServiceMetadataReferenceCollection>",
                "</ServiceGroup>"
            ),
            smp = ns::SMP,
        );
        let err = BusdoxReader::new()
            .parse_document_identifiers(&response(&xml))
            .unwrap_err();
        assert!(matches!(err, LookupError::MalformedReference(_)));
    }

    #[test]
    fn group_document_is_not_service_metadata() {
        let xml = format!(r#"<ServiceGroup xmlns="{}"/>"#, ns::SMP);
        let err = BusdoxReader::new()
            .parse_service_metadata(&response(&xml))
            .unwrap_err();
        assert_eq!(err.to_string(), "ServiceMetadata element not found");
    }
}
