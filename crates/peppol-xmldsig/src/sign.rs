#![forbid(unsafe_code)]

//! Enveloped signature creation.
//!
//! Works template-first: a `Signature` element with empty
//! `DigestValue` and `SignatureValue` is appended inside the document
//! root, the reference digest is computed over the document with the
//! signature subtree excluded, and the two placeholder values are
//! filled in. Mainly used to produce signed test documents; it emits
//! exactly the shape [`crate::verify`] consumes.

use crate::c14n::{self, C14nMode};
use crate::crypto::SigningKey;
use crate::nodeset::NodeSet;
use crate::verify::{find_child_element, find_element};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use peppol_common::{algorithm, ns, VerificationError};

/// Key material and algorithm choices for [`sign_enveloped`].
pub struct SignOptions {
    key: SigningKey,
    certificate_der: Vec<u8>,
    c14n_mode: C14nMode,
    signature_uri: &'static str,
    digest_uri: &'static str,
}

impl SignOptions {
    /// ECDSA P-256 with SHA-256 digests.
    pub fn ecdsa_sha256(
        key_pkcs8_der: &[u8],
        certificate_der: &[u8],
    ) -> Result<Self, VerificationError> {
        Ok(Self {
            key: SigningKey::from_pkcs8_der(key_pkcs8_der)?,
            certificate_der: certificate_der.to_vec(),
            c14n_mode: C14nMode::Inclusive,
            signature_uri: algorithm::ECDSA_SHA256,
            digest_uri: algorithm::SHA256,
        })
    }

    /// RSA PKCS#1 v1.5 with SHA-256 digests, the suite SMP responders
    /// most commonly use.
    pub fn rsa_sha256(
        key_pkcs8_der: &[u8],
        certificate_der: &[u8],
    ) -> Result<Self, VerificationError> {
        Ok(Self {
            key: SigningKey::from_pkcs8_der(key_pkcs8_der)?,
            certificate_der: certificate_der.to_vec(),
            c14n_mode: C14nMode::Inclusive,
            signature_uri: algorithm::RSA_SHA256,
            digest_uri: algorithm::SHA256,
        })
    }
}

/// Sign an XML document with an enveloped signature, returning the
/// signed document text.
pub fn sign_enveloped(xml: &str, options: &SignOptions) -> Result<String, VerificationError> {
    // Validate the input before splicing text into it.
    roxmltree::Document::parse(xml).map_err(|e| VerificationError::XmlParse(e.to_string()))?;

    let template = signature_template(options);
    let close_tag = xml.rfind("</").ok_or_else(|| {
        VerificationError::Transform("document root has no content to envelop".to_owned())
    })?;
    let mut signed = String::with_capacity(xml.len() + template.len());
    signed.push_str(&xml[..close_tag]);
    signed.push_str(&template);
    signed.push_str(&xml[close_tag..]);

    // Fill the reference digest. The enveloped-signature transform
    // excludes the Signature subtree, so the still-empty placeholder
    // values do not affect the digest.
    let digest = {
        let doc = roxmltree::Document::parse(&signed)
            .map_err(|e| VerificationError::XmlParse(e.to_string()))?;
        let signature = find_element(&doc, ns::DSIG, ns::node::SIGNATURE)?;
        let mut set = NodeSet::document_without_comments(&doc);
        set.remove_subtree(signature);
        let bytes = c14n::canonicalize_doc(&doc, C14nMode::Inclusive, Some(&set), &[])?;
        crate::crypto::digest(options.digest_uri, &bytes)?
    };
    let signed = signed.replacen(
        "<DigestValue></DigestValue>",
        &format!("<DigestValue>{}</DigestValue>", BASE64.encode(digest)),
        1,
    );

    // Sign the canonicalized SignedInfo, digest now included.
    let signature_value = {
        let doc = roxmltree::Document::parse(&signed)
            .map_err(|e| VerificationError::XmlParse(e.to_string()))?;
        let signature = find_element(&doc, ns::DSIG, ns::node::SIGNATURE)?;
        let signed_info = find_child_element(signature, ns::DSIG, ns::node::SIGNED_INFO)?;
        let set = NodeSet::subtree_without_comments(signed_info);
        let bytes = c14n::canonicalize_doc(&doc, options.c14n_mode, Some(&set), &[])?;
        options.key.sign(options.signature_uri, &bytes)?
    };
    Ok(signed.replacen(
        "<SignatureValue></SignatureValue>",
        &format!(
            "<SignatureValue>{}</SignatureValue>",
            BASE64.encode(signature_value)
        ),
        1,
    ))
}

fn signature_template(options: &SignOptions) -> String {
    format!(
        concat!(
            r#"<Signature xmlns="{dsig}">"#,
            "<SignedInfo>",
            r#"<CanonicalizationMethod Algorithm="{c14n}"></CanonicalizationMethod>"#,
            r#"<SignatureMethod Algorithm="{sig}"></SignatureMethod>"#,
            r#"<Reference URI="">"#,
            "<Transforms>",
            r#"<Transform Algorithm="{enveloped}"></Transform>"#,
            "</Transforms>",
            r#"<DigestMethod Algorithm="{digest}"></DigestMethod>"#,
            "<DigestValue></DigestValue>",
            "</Reference>",
            "</SignedInfo>",
            "<SignatureValue></SignatureValue>",
            "<KeyInfo><X509Data><X509Certificate>{cert}</X509Certificate></X509Data></KeyInfo>",
            "</Signature>"
        ),
        dsig = ns::DSIG,
        c14n = options.c14n_mode.uri(),
        sig = options.signature_uri,
        enveloped = algorithm::ENVELOPED_SIGNATURE,
        digest = options.digest_uri,
        cert = BASE64.encode(&options.certificate_der),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_options() -> SignOptions {
        let generated =
            rcgen::generate_simple_self_signed(vec!["smp.test.example.org".to_owned()]).unwrap();
        SignOptions::ecdsa_sha256(
            &generated.key_pair.serialize_der(),
            generated.cert.der(),
        )
        .unwrap()
    }

    #[test]
    fn signature_lands_inside_document_root() {
        let options = test_options();
        let signed = sign_enveloped("<Root><Child>v</Child></Root>", &options).unwrap();
        let doc = roxmltree::Document::parse(&signed).unwrap();
        let signature = doc
            .descendants()
            .find(|n| n.has_tag_name((ns::DSIG, "Signature")))
            .unwrap();
        assert_eq!(
            signature.parent_element().unwrap().tag_name().name(),
            "Root"
        );
        assert!(!signed.contains("<DigestValue></DigestValue>"));
        assert!(!signed.contains("<SignatureValue></SignatureValue>"));
    }

    #[test]
    fn self_closing_root_is_rejected() {
        let options = test_options();
        let err = sign_enveloped("<Root/>", &options).unwrap_err();
        assert!(matches!(err, VerificationError::Transform(_)));
    }

    #[test]
    fn malformed_input_is_rejected() {
        let options = test_options();
        let err = sign_enveloped("<Root><unclosed></Root>", &options).unwrap_err();
        assert!(matches!(err, VerificationError::XmlParse(_)));
    }
}
