#![forbid(unsafe_code)]

//! X.509 name helpers for applying the trust policy to a verified
//! signer certificate.

use der::asn1::{ObjectIdentifier, PrintableStringRef, Utf8StringRef};
use x509_cert::name::Name;
use x509_cert::Certificate;

/// id-at-commonName
const COMMON_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.3");

/// The CN of the certificate's issuer, if present.
pub fn issuer_common_name(certificate: &Certificate) -> Option<String> {
    common_name(&certificate.tbs_certificate.issuer)
}

/// The CN of the certificate's subject, if present.
pub fn subject_common_name(certificate: &Certificate) -> Option<String> {
    common_name(&certificate.tbs_certificate.subject)
}

/// Whether the certificate's issuer CN is one of the accepted issuer
/// names. Fails closed: no issuer CN, or an empty list, never matches.
pub fn issuer_matches<S: AsRef<str>>(certificate: &Certificate, issuers: &[S]) -> bool {
    match issuer_common_name(certificate) {
        Some(cn) => issuers.iter().any(|issuer| issuer.as_ref() == cn),
        None => false,
    }
}

fn common_name(name: &Name) -> Option<String> {
    for rdn in name.0.iter() {
        for atav in rdn.0.iter() {
            if atav.oid != COMMON_NAME {
                continue;
            }
            // CNs appear as either PrintableString or UTF8String.
            if let Ok(value) = atav.value.decode_as::<PrintableStringRef<'_>>() {
                return Some(value.to_string());
            }
            if let Ok(value) = atav.value.decode_as::<Utf8StringRef<'_>>() {
                return Some(value.to_string());
            }
        }
    }
    None
}
