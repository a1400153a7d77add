#![forbid(unsafe_code)]

//! Identifier model: participant, document-type and process identifiers
//! plus transport-profile tags.
//!
//! Every identifier is an immutable `(scheme, value)` pair with the
//! canonical string form `scheme::value`. The scheme always travels
//! with the value, because the same value can mean different things in
//! different identifier registries.

use crate::error::LookupError;
use std::fmt;
use std::str::FromStr;

macro_rules! impl_identifier {
    ($(#[$doc:meta])* $name:ident, $label:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name {
            scheme: String,
            value: String,
        }

        impl $name {
            /// Construct from a scheme and a value. Both must be
            /// non-empty after trimming.
            pub fn new(
                scheme: impl Into<String>,
                value: impl Into<String>,
            ) -> Result<Self, LookupError> {
                let scheme = scheme.into().trim().to_owned();
                let value = value.into().trim().to_owned();
                if scheme.is_empty() {
                    return Err(LookupError::InvalidIdentifier(format!(
                        "empty scheme in {} identifier",
                        $label
                    )));
                }
                if value.is_empty() {
                    return Err(LookupError::InvalidIdentifier(format!(
                        "empty value in {} identifier",
                        $label
                    )));
                }
                Ok(Self { scheme, value })
            }

            /// Parse the canonical single-string form `scheme::value`.
            /// The split is on the first `::`; the value may itself
            /// contain further `::` sequences.
            pub fn parse(canonical: &str) -> Result<Self, LookupError> {
                match canonical.split_once("::") {
                    Some((scheme, value)) => Self::new(scheme, value),
                    None => Err(LookupError::InvalidIdentifier(format!(
                        "missing :: separator in {} identifier: {canonical}",
                        $label
                    ))),
                }
            }

            pub fn scheme(&self) -> &str {
                &self.scheme
            }

            pub fn value(&self) -> &str {
                &self.value
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}::{}", self.scheme, self.value)
            }
        }

        impl FromStr for $name {
            type Err = LookupError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

impl_identifier!(
    /// Business-registry identifier of a directory entry within an
    /// identifier scheme, e.g. `iso6523-actorid-upis::9908:810418052`.
    ParticipantIdentifier,
    "participant"
);

impl_identifier!(
    /// Identifies the business-document type a participant can receive.
    DocumentTypeIdentifier,
    "document"
);

impl_identifier!(
    /// Identifies the business process a delivery endpoint supports.
    ProcessIdentifier,
    "process"
);

impl DocumentTypeIdentifier {
    /// Scheme used by BusDox directory servers when none is given.
    pub const DEFAULT_SCHEME: &'static str = "busdox-docid-qname";

    /// Split the historical BusDox encoding embedded in the value:
    /// `documentPart##processPart`, split on the first `##`.
    ///
    /// Returns `None` for values without the two-part encoding.
    pub fn busdox_parts(&self) -> Option<(&str, &str)> {
        self.value.split_once("##")
    }
}

/// A tagged string naming the delivery protocol/version an endpoint
/// speaks. Compared by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransportProfile(String);

impl TransportProfile {
    pub const START: &'static str = "busdox-transport-start";
    pub const AS2: &'static str = "busdox-transport-as2-ver1p0";
    pub const AS4: &'static str = "peppol-transport-as4-v2_0";

    pub fn new(identifier: impl Into<String>) -> Self {
        Self(identifier.into())
    }

    pub fn identifier(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransportProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_canonical_form() {
        let id = ParticipantIdentifier::new("iso6523-actorid-upis", "9908:810418052").unwrap();
        let rendered = id.to_string();
        assert_eq!(rendered, "iso6523-actorid-upis::9908:810418052");
        assert_eq!(ParticipantIdentifier::parse(&rendered).unwrap(), id);
    }

    #[test]
    fn empty_scheme_or_value_rejected() {
        assert!(ParticipantIdentifier::new("", "value").is_err());
        assert!(ParticipantIdentifier::new("  ", "value").is_err());
        assert!(ParticipantIdentifier::new("scheme", "").is_err());
        assert!(ProcessIdentifier::new("scheme", " \t").is_err());
    }

    #[test]
    fn parse_requires_separator() {
        assert!(DocumentTypeIdentifier::parse("no-separator-here").is_err());
    }

    #[test]
    fn legacy_credit_note_identifier_round_trips() {
        let literal = "urn:oasis:names:specification:ubl:schema:xsd:CreditNote-2::CreditNote##urn:www.cenbii.eu:transaction:biitrns014:ver2.0:extended:urn:www.peppol.eu:bis:peppol5a:ver2.0::2.1";
        let id = DocumentTypeIdentifier::parse(literal).unwrap();
        assert_eq!(id.to_string(), literal);
        assert_eq!(
            id.scheme(),
            "urn:oasis:names:specification:ubl:schema:xsd:CreditNote-2"
        );
    }

    #[test]
    fn busdox_two_part_split() {
        let literal = "urn:oasis:names:specification:ubl:schema:xsd:CreditNote-2::CreditNote##urn:www.cenbii.eu:transaction:biitrns014:ver2.0:extended:urn:www.peppol.eu:bis:peppol5a:ver2.0::2.1";
        let id = DocumentTypeIdentifier::parse(literal).unwrap();
        let (document_part, process_part) = id.busdox_parts().unwrap();
        assert_eq!(document_part, "CreditNote");
        assert!(process_part.starts_with("urn:www.cenbii.eu:transaction:biitrns014"));
    }

    #[test]
    fn value_may_contain_further_separators() {
        let id = ProcessIdentifier::parse("cenbii-procid-ubl::urn:x::y").unwrap();
        assert_eq!(id.scheme(), "cenbii-procid-ubl");
        assert_eq!(id.value(), "urn:x::y");
    }

    #[test]
    fn transport_profile_compares_by_value() {
        let a = TransportProfile::new(TransportProfile::START);
        let b = TransportProfile::new("busdox-transport-start");
        assert_eq!(a, b);
        assert_eq!(a.identifier(), "busdox-transport-start");
    }
}
