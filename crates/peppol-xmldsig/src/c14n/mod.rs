#![forbid(unsafe_code)]

//! XML canonicalization (C14N) for signature processing.
//!
//! Implements Canonical XML 1.0 and Exclusive Canonical XML 1.0, each
//! with and without comments, over `roxmltree` documents with
//! document-subset support via [`NodeSet`].

pub mod exclusive;
pub mod inclusive;
mod output;

use crate::nodeset::NodeSet;
use peppol_common::{algorithm, ns, VerificationError};
use std::collections::BTreeMap;

/// The canonicalization mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum C14nMode {
    /// Canonical XML 1.0
    Inclusive,
    /// Canonical XML 1.0 with comments
    InclusiveWithComments,
    /// Exclusive Canonical XML 1.0
    Exclusive,
    /// Exclusive Canonical XML 1.0 with comments
    ExclusiveWithComments,
}

impl C14nMode {
    /// The algorithm URI for this mode.
    pub fn uri(&self) -> &'static str {
        match self {
            Self::Inclusive => algorithm::C14N,
            Self::InclusiveWithComments => algorithm::C14N_WITH_COMMENTS,
            Self::Exclusive => algorithm::EXC_C14N,
            Self::ExclusiveWithComments => algorithm::EXC_C14N_WITH_COMMENTS,
        }
    }

    /// Parse a mode from an algorithm URI.
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            algorithm::C14N => Some(Self::Inclusive),
            algorithm::C14N_WITH_COMMENTS => Some(Self::InclusiveWithComments),
            algorithm::EXC_C14N => Some(Self::Exclusive),
            algorithm::EXC_C14N_WITH_COMMENTS => Some(Self::ExclusiveWithComments),
            _ => None,
        }
    }

    pub fn with_comments(&self) -> bool {
        matches!(self, Self::InclusiveWithComments | Self::ExclusiveWithComments)
    }

    pub fn is_exclusive(&self) -> bool {
        matches!(self, Self::Exclusive | Self::ExclusiveWithComments)
    }
}

/// Canonicalize raw XML text.
pub fn canonicalize(
    xml: &str,
    mode: C14nMode,
    node_set: Option<&NodeSet>,
    inclusive_prefixes: &[String],
) -> Result<Vec<u8>, VerificationError> {
    let doc = roxmltree::Document::parse(xml)
        .map_err(|e| VerificationError::XmlParse(e.to_string()))?;
    canonicalize_doc(&doc, mode, node_set, inclusive_prefixes)
}

/// Canonicalize a pre-parsed document.
pub fn canonicalize_doc(
    doc: &roxmltree::Document<'_>,
    mode: C14nMode,
    node_set: Option<&NodeSet>,
    inclusive_prefixes: &[String],
) -> Result<Vec<u8>, VerificationError> {
    if mode.is_exclusive() {
        exclusive::canonicalize(doc, mode.with_comments(), node_set, inclusive_prefixes)
    } else {
        inclusive::canonicalize(doc, mode.with_comments(), node_set)
    }
}

// ── Shared namespace/name helpers ────────────────────────────────────

/// Collect all in-scope namespace bindings for an element, prefix → URI.
/// Closer declarations override more distant ones.
pub(crate) fn collect_inscope_namespaces(
    node: &roxmltree::Node<'_, '_>,
) -> BTreeMap<String, String> {
    let mut levels: Vec<BTreeMap<String, String>> = Vec::new();
    let mut current = Some(*node);
    while let Some(n) = current {
        if n.is_element() {
            let mut level = BTreeMap::new();
            for decl in n.namespaces() {
                level.insert(
                    decl.name().unwrap_or("").to_owned(),
                    decl.uri().to_owned(),
                );
            }
            levels.push(level);
        }
        current = n.parent();
    }

    let mut result = BTreeMap::new();
    for level in levels.into_iter().rev() {
        for (prefix, uri) in level {
            if uri.is_empty() {
                // Un-declaration of the default namespace.
                result.remove(&prefix);
            } else {
                result.insert(prefix, uri);
            }
        }
    }
    result
}

/// The prefix an element renders with, given the in-scope bindings.
/// An element bound through the default namespace renders unprefixed.
pub(crate) fn element_prefix(
    node: &roxmltree::Node<'_, '_>,
    inscope: &BTreeMap<String, String>,
) -> String {
    let Some(uri) = node.tag_name().namespace() else {
        return String::new();
    };
    if inscope.get("").map(String::as_str) == Some(uri) {
        return String::new();
    }
    prefix_for(inscope, uri).unwrap_or_default()
}

/// The qualified name an element renders with.
pub(crate) fn qualified_element_name(
    node: &roxmltree::Node<'_, '_>,
    inscope: &BTreeMap<String, String>,
) -> String {
    let prefix = element_prefix(node, inscope);
    if prefix.is_empty() {
        node.tag_name().name().to_owned()
    } else {
        format!("{}:{}", prefix, node.tag_name().name())
    }
}

/// The qualified name an attribute renders with. Attributes never use
/// the default namespace, so a namespaced attribute needs a prefix.
pub(crate) fn qualified_attr_name(
    attr: &roxmltree::Attribute<'_, '_>,
    inscope: &BTreeMap<String, String>,
) -> String {
    match attr.namespace() {
        None => attr.name().to_owned(),
        Some(uri) if uri == ns::XML => format!("xml:{}", attr.name()),
        Some(uri) => match prefix_for(inscope, uri) {
            Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, attr.name()),
            _ => attr.name().to_owned(),
        },
    }
}

/// Find a non-default prefix bound to the given URI, if any; falls back
/// to the default binding.
fn prefix_for(inscope: &BTreeMap<String, String>, uri: &str) -> Option<String> {
    inscope
        .iter()
        .find(|(prefix, bound)| !prefix.is_empty() && bound.as_str() == uri)
        .or_else(|| inscope.iter().find(|(_, bound)| bound.as_str() == uri))
        .map(|(prefix, _)| prefix.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_uri_round_trip() {
        for mode in [
            C14nMode::Inclusive,
            C14nMode::InclusiveWithComments,
            C14nMode::Exclusive,
            C14nMode::ExclusiveWithComments,
        ] {
            assert_eq!(C14nMode::from_uri(mode.uri()), Some(mode));
        }
        assert_eq!(C14nMode::from_uri("urn:not-a-c14n-uri"), None);
    }

    #[test]
    fn inscope_namespaces_merge_from_ancestors() {
        let doc = roxmltree::Document::parse(
            r#"<a xmlns="http://d" xmlns:x="http://x"><x:b xmlns:y="http://y"/></a>"#,
        )
        .unwrap();
        let b = doc
            .descendants()
            .find(|n| n.tag_name().name() == "b")
            .unwrap();
        let inscope = collect_inscope_namespaces(&b);
        assert_eq!(inscope.get(""), Some(&"http://d".to_owned()));
        assert_eq!(inscope.get("x"), Some(&"http://x".to_owned()));
        assert_eq!(inscope.get("y"), Some(&"http://y".to_owned()));
    }
}
