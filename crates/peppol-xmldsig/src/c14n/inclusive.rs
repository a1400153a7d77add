#![forbid(unsafe_code)]

//! Canonical XML 1.0.
//!
//! Visible elements emit every in-scope namespace declaration that
//! differs from what the nearest visible ancestor already emitted.
//! When a visible element's parent is outside the node set, inherited
//! `xml:*` attributes are pulled down from the ancestor chain.

use super::output::{self, Attr, NsDecl};
use super::{collect_inscope_namespaces, qualified_attr_name, qualified_element_name};
use crate::nodeset::NodeSet;
use peppol_common::{ns, VerificationError};
use std::collections::BTreeMap;

pub fn canonicalize(
    doc: &roxmltree::Document<'_>,
    with_comments: bool,
    node_set: Option<&NodeSet>,
) -> Result<Vec<u8>, VerificationError> {
    let mut out = Vec::new();
    let ctx = Context {
        with_comments,
        node_set,
    };
    ctx.node(doc.root(), &mut out, &BTreeMap::new());
    Ok(out)
}

struct Context<'a> {
    with_comments: bool,
    node_set: Option<&'a NodeSet>,
}

impl Context<'_> {
    fn is_visible(&self, node: &roxmltree::Node<'_, '_>) -> bool {
        self.node_set.map_or(true, |set| set.contains(node))
    }

    fn node(
        &self,
        node: roxmltree::Node<'_, '_>,
        out: &mut Vec<u8>,
        inherited_ns: &BTreeMap<String, String>,
    ) {
        match node.node_type() {
            roxmltree::NodeType::Root => {
                for child in node.children() {
                    self.node(child, out, inherited_ns);
                }
            }
            roxmltree::NodeType::Element => self.element(node, out, inherited_ns),
            roxmltree::NodeType::Text => {
                if self.is_visible(&node) {
                    output::escape_text(node.text().unwrap_or(""), out);
                }
            }
            roxmltree::NodeType::Comment => {
                if self.with_comments && self.is_visible(&node) {
                    self.document_level_break(node, out, true);
                    output::render_comment(node.text().unwrap_or(""), out);
                    self.document_level_break(node, out, false);
                }
            }
            roxmltree::NodeType::PI => {
                if self.is_visible(&node) {
                    if let Some(pi) = node.pi() {
                        self.document_level_break(node, out, true);
                        output::render_pi(pi.target, pi.value, out);
                        self.document_level_break(node, out, false);
                    }
                }
            }
        }
    }

    /// Comments and PIs outside the document element are separated from
    /// it by a newline in the canonical form.
    fn document_level_break(&self, node: roxmltree::Node<'_, '_>, out: &mut Vec<u8>, before: bool) {
        let at_document_level = node
            .parent()
            .is_some_and(|p| p.node_type() == roxmltree::NodeType::Root);
        if !at_document_level {
            return;
        }
        let needs_break = if before {
            node.prev_siblings().any(|s| s.is_element())
        } else {
            node.next_siblings().any(|s| s.is_element())
        };
        if needs_break {
            out.push(b'\n');
        }
    }

    fn element(
        &self,
        node: roxmltree::Node<'_, '_>,
        out: &mut Vec<u8>,
        inherited_ns: &BTreeMap<String, String>,
    ) {
        if !self.is_visible(&node) {
            // Invisible elements render nothing themselves; visible
            // descendants keep the nearest visible ancestor's context.
            for child in node.children() {
                self.node(child, out, inherited_ns);
            }
            return;
        }

        let inscope = collect_inscope_namespaces(&node);

        let mut ns_decls: Vec<NsDecl> = Vec::new();
        for (prefix, uri) in &inscope {
            if prefix == "xml" {
                continue;
            }
            if inherited_ns.get(prefix) != Some(uri) {
                ns_decls.push(NsDecl {
                    prefix: prefix.clone(),
                    uri: uri.clone(),
                });
            }
        }
        ns_decls.sort();

        let mut attrs: Vec<Attr> = Vec::new();
        for attr in node.attributes() {
            attrs.push(Attr {
                namespace: attr.namespace().map(str::to_owned),
                local: attr.name().to_owned(),
                qname: qualified_attr_name(&attr, &inscope),
                value: attr.value().to_owned(),
            });
        }

        // An element whose parent falls outside the node set inherits
        // the nearest ancestor values of xml:* attributes.
        if self.node_set.is_some() {
            let parent_invisible = node
                .parent()
                .map_or(true, |p| !p.is_element() || !self.is_visible(&p));
            if parent_invisible {
                attrs.extend(inherited_xml_attrs(&node, &attrs));
            }
        }
        attrs.sort();

        let name = qualified_element_name(&node, &inscope);
        out.push(b'<');
        out.extend_from_slice(name.as_bytes());
        for decl in &ns_decls {
            decl.render(out);
        }
        for attr in &attrs {
            attr.render(out);
        }
        out.push(b'>');

        let mut child_ns = inherited_ns.clone();
        for (prefix, uri) in &inscope {
            if prefix != "xml" {
                child_ns.insert(prefix.clone(), uri.clone());
            }
        }
        for child in node.children() {
            self.node(child, out, &child_ns);
        }

        out.extend_from_slice(b"</");
        out.extend_from_slice(name.as_bytes());
        out.push(b'>');
    }
}

/// Walk the ancestor chain collecting xml:* attributes not already on
/// the element itself; the nearest ancestor value wins.
fn inherited_xml_attrs(node: &roxmltree::Node<'_, '_>, existing: &[Attr]) -> Vec<Attr> {
    let mut inherited: BTreeMap<String, String> = BTreeMap::new();
    let mut current = node.parent();
    while let Some(ancestor) = current {
        if ancestor.is_element() {
            for attr in ancestor.attributes() {
                if attr.namespace() == Some(ns::XML) && !inherited.contains_key(attr.name()) {
                    inherited.insert(attr.name().to_owned(), attr.value().to_owned());
                }
            }
        }
        current = ancestor.parent();
    }

    inherited
        .into_iter()
        .filter(|(name, _)| {
            !existing
                .iter()
                .any(|a| a.namespace.as_deref() == Some(ns::XML) && a.local == *name)
        })
        .map(|(name, value)| Attr {
            namespace: Some(ns::XML.to_owned()),
            local: name.clone(),
            qname: format!("xml:{name}"),
            value,
        })
        .collect()
}
