#![forbid(unsafe_code)]

//! Enveloped signature verification.
//!
//! Checks every `Reference` digest in `SignedInfo`, then checks the
//! `SignatureValue` over the canonicalized `SignedInfo`, using the
//! public key of the certificate carried in `KeyInfo/X509Data`. The
//! signer certificate is returned so callers can apply their own trust
//! policy to it; no chain building happens here.

use crate::c14n::{self, C14nMode};
use crate::crypto::PublicKey;
use crate::nodeset::NodeSet;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use der::Decode;
use peppol_common::{algorithm, ns, VerificationError};

/// Verify the enveloped signature on a signed XML document and return
/// the signer certificate from `KeyInfo`.
pub fn verify(xml: &str) -> Result<x509_cert::Certificate, VerificationError> {
    let doc = roxmltree::Document::parse(xml)
        .map_err(|e| VerificationError::XmlParse(e.to_string()))?;

    let signature = find_element(&doc, ns::DSIG, ns::node::SIGNATURE)?;
    let signed_info = find_child_element(signature, ns::DSIG, ns::node::SIGNED_INFO)?;
    let signature_value = find_child_element(signature, ns::DSIG, ns::node::SIGNATURE_VALUE)?;

    let certificate = extract_signer_certificate(signature)?;
    let public_key = PublicKey::from_certificate(&certificate)?;

    let c14n_method = find_child_element(signed_info, ns::DSIG, ns::node::CANONICALIZATION_METHOD)?;
    let (signed_info_mode, signed_info_prefixes) = read_c14n_method(c14n_method)?;
    let signature_method = find_child_element(signed_info, ns::DSIG, ns::node::SIGNATURE_METHOD)?;
    let signature_uri = required_attr(signature_method, ns::attr::ALGORITHM)?;

    let references = find_child_elements(signed_info, ns::DSIG, ns::node::REFERENCE);
    if references.is_empty() {
        return Err(VerificationError::MissingElement(
            ns::node::REFERENCE.to_owned(),
        ));
    }
    for reference in references {
        verify_reference(&doc, reference, signature)?;
    }

    // The SignedInfo bytes the signature covers.
    let signed_info_set = if signed_info_mode.with_comments() {
        NodeSet::subtree_with_comments(signed_info)
    } else {
        NodeSet::subtree_without_comments(signed_info)
    };
    let signed_info_bytes = c14n::canonicalize_doc(
        &doc,
        signed_info_mode,
        Some(&signed_info_set),
        &signed_info_prefixes,
    )?;

    let signature_bytes = decode_base64(&text_of(signature_value))?;
    public_key.verify(signature_uri, &signed_info_bytes, &signature_bytes)?;

    Ok(certificate)
}

/// The working data as a reference's transform chain runs.
enum TransformData {
    Xml(NodeSet),
    Binary(Vec<u8>),
}

fn verify_reference(
    doc: &roxmltree::Document<'_>,
    reference: roxmltree::Node<'_, '_>,
    signature: roxmltree::Node<'_, '_>,
) -> Result<(), VerificationError> {
    let uri = reference.attribute(ns::attr::URI).unwrap_or("");

    let mut data = TransformData::Xml(resolve_reference_uri(doc, uri)?);

    if let Some(transforms) =
        optional_child_element(reference, ns::DSIG, ns::node::TRANSFORMS)
    {
        for transform in find_child_elements(transforms, ns::DSIG, ns::node::TRANSFORM) {
            let transform_uri = required_attr(transform, ns::attr::ALGORITHM)?;
            data = apply_transform(doc, transform, transform_uri, data, signature)?;
        }
    }

    let bytes = match data {
        TransformData::Binary(bytes) => bytes,
        // An XML node set at the end of the chain is canonicalized
        // with inclusive C14N.
        TransformData::Xml(set) => {
            c14n::canonicalize_doc(doc, C14nMode::Inclusive, Some(&set), &[])?
        }
    };

    let digest_method = find_child_element(reference, ns::DSIG, ns::node::DIGEST_METHOD)?;
    let digest_uri = required_attr(digest_method, ns::attr::ALGORITHM)?;
    let digest_value = find_child_element(reference, ns::DSIG, ns::node::DIGEST_VALUE)?;
    let expected = decode_base64(&text_of(digest_value))?;

    let actual = crate::crypto::digest(digest_uri, &bytes)?;
    if actual != expected {
        return Err(VerificationError::DigestMismatch(uri.to_owned()));
    }
    Ok(())
}

fn apply_transform(
    doc: &roxmltree::Document<'_>,
    transform: roxmltree::Node<'_, '_>,
    transform_uri: &str,
    data: TransformData,
    signature: roxmltree::Node<'_, '_>,
) -> Result<TransformData, VerificationError> {
    match transform_uri {
        algorithm::ENVELOPED_SIGNATURE => match data {
            TransformData::Xml(mut set) => {
                set.remove_subtree(signature);
                Ok(TransformData::Xml(set))
            }
            TransformData::Binary(_) => Err(VerificationError::Transform(
                "enveloped-signature transform needs an XML node set".to_owned(),
            )),
        },
        uri => match C14nMode::from_uri(uri) {
            Some(mode) => {
                let prefixes = read_inclusive_prefixes(transform);
                let set = match data {
                    TransformData::Xml(set) => set,
                    TransformData::Binary(_) => {
                        return Err(VerificationError::Transform(
                            "canonicalization transform needs an XML node set".to_owned(),
                        ))
                    }
                };
                let bytes = c14n::canonicalize_doc(doc, mode, Some(&set), &prefixes)?;
                Ok(TransformData::Binary(bytes))
            }
            None => Err(VerificationError::UnsupportedAlgorithm(uri.to_owned())),
        },
    }
}

/// Resolve a reference URI to a node set: `""` selects the whole
/// document without comments, `#id` a subtree by Id attribute.
fn resolve_reference_uri(
    doc: &roxmltree::Document<'_>,
    uri: &str,
) -> Result<NodeSet, VerificationError> {
    if uri.is_empty() {
        return Ok(NodeSet::document_without_comments(doc));
    }
    let Some(id) = uri.strip_prefix('#') else {
        return Err(VerificationError::InvalidUri(uri.to_owned()));
    };
    let target = doc
        .descendants()
        .find(|n| {
            n.is_element()
                && ["Id", "ID", "id"]
                    .iter()
                    .any(|name| n.attribute(*name) == Some(id))
        })
        .ok_or_else(|| VerificationError::InvalidUri(uri.to_owned()))?;
    Ok(NodeSet::subtree_without_comments(target))
}

/// The certificate from the first `KeyInfo/X509Data/X509Certificate`.
fn extract_signer_certificate(
    signature: roxmltree::Node<'_, '_>,
) -> Result<x509_cert::Certificate, VerificationError> {
    let key_info = find_child_element(signature, ns::DSIG, ns::node::KEY_INFO)?;
    let x509_data = find_child_element(key_info, ns::DSIG, ns::node::X509_DATA)?;
    let cert_node = find_child_element(x509_data, ns::DSIG, ns::node::X509_CERTIFICATE)?;
    let der = decode_base64(&text_of(cert_node))?;
    x509_cert::Certificate::from_der(&der)
        .map_err(|e| VerificationError::Certificate(e.to_string()))
}

/// The canonicalization mode and inclusive prefixes of a
/// `CanonicalizationMethod` element.
fn read_c14n_method(
    method: roxmltree::Node<'_, '_>,
) -> Result<(C14nMode, Vec<String>), VerificationError> {
    let uri = required_attr(method, ns::attr::ALGORITHM)?;
    let mode = C14nMode::from_uri(uri)
        .ok_or_else(|| VerificationError::UnsupportedAlgorithm(uri.to_owned()))?;
    Ok((mode, read_inclusive_prefixes(method)))
}

/// The `PrefixList` of an `InclusiveNamespaces` child, if present.
fn read_inclusive_prefixes(node: roxmltree::Node<'_, '_>) -> Vec<String> {
    optional_child_element(node, ns::EXC_C14N, ns::node::INCLUSIVE_NAMESPACES)
        .and_then(|n| n.attribute(ns::attr::PREFIX_LIST))
        .map(|list| list.split_whitespace().map(str::to_owned).collect())
        .unwrap_or_default()
}

// ── Element navigation ───────────────────────────────────────────────

pub(crate) fn find_element<'a, 'input>(
    doc: &'a roxmltree::Document<'input>,
    namespace: &str,
    name: &str,
) -> Result<roxmltree::Node<'a, 'input>, VerificationError> {
    doc.descendants()
        .find(|n| n.has_tag_name((namespace, name)))
        .ok_or_else(|| VerificationError::MissingElement(name.to_owned()))
}

pub(crate) fn find_child_element<'a, 'input>(
    parent: roxmltree::Node<'a, 'input>,
    namespace: &str,
    name: &str,
) -> Result<roxmltree::Node<'a, 'input>, VerificationError> {
    optional_child_element(parent, namespace, name)
        .ok_or_else(|| VerificationError::MissingElement(name.to_owned()))
}

pub(crate) fn optional_child_element<'a, 'input>(
    parent: roxmltree::Node<'a, 'input>,
    namespace: &str,
    name: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    parent
        .children()
        .find(|n| n.has_tag_name((namespace, name)))
}

pub(crate) fn find_child_elements<'a, 'input>(
    parent: roxmltree::Node<'a, 'input>,
    namespace: &str,
    name: &str,
) -> Vec<roxmltree::Node<'a, 'input>> {
    parent
        .children()
        .filter(|n| n.has_tag_name((namespace, name)))
        .collect()
}

fn required_attr<'a>(
    node: roxmltree::Node<'a, '_>,
    name: &str,
) -> Result<&'a str, VerificationError> {
    node.attribute(name)
        .ok_or_else(|| VerificationError::MissingAttribute(name.to_owned()))
}

fn text_of(node: roxmltree::Node<'_, '_>) -> String {
    node.text().unwrap_or("").to_owned()
}

/// Base64 content in signatures is commonly line-wrapped; strip all
/// whitespace before decoding.
fn decode_base64(value: &str) -> Result<Vec<u8>, VerificationError> {
    let compact: String = value.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    BASE64
        .decode(compact)
        .map_err(|e| VerificationError::Base64(e.to_string()))
}
