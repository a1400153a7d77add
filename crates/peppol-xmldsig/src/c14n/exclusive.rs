#![forbid(unsafe_code)]

//! Exclusive Canonical XML 1.0.
//!
//! Only "visibly utilized" namespace declarations are emitted: the
//! prefix of the element itself, prefixes of its attributes, and any
//! prefix named in an `InclusiveNamespaces` `PrefixList` (`#default`
//! names the default namespace). A declaration is emitted only where
//! it differs from what the nearest visible ancestor already rendered.

use super::output::{self, Attr, NsDecl};
use super::{
    collect_inscope_namespaces, element_prefix, qualified_attr_name, qualified_element_name,
};
use crate::nodeset::NodeSet;
use peppol_common::VerificationError;
use std::collections::{BTreeMap, HashSet};

pub fn canonicalize(
    doc: &roxmltree::Document<'_>,
    with_comments: bool,
    node_set: Option<&NodeSet>,
    inclusive_prefixes: &[String],
) -> Result<Vec<u8>, VerificationError> {
    let mut out = Vec::new();
    let ctx = Context {
        with_comments,
        node_set,
        inclusive_prefixes: inclusive_prefixes.iter().cloned().collect(),
    };
    ctx.node(doc.root(), &mut out, &BTreeMap::new());
    Ok(out)
}

struct Context<'a> {
    with_comments: bool,
    node_set: Option<&'a NodeSet>,
    inclusive_prefixes: HashSet<String>,
}

impl Context<'_> {
    fn is_visible(&self, node: &roxmltree::Node<'_, '_>) -> bool {
        self.node_set.map_or(true, |set| set.contains(node))
    }

    fn node(
        &self,
        node: roxmltree::Node<'_, '_>,
        out: &mut Vec<u8>,
        rendered_ns: &BTreeMap<String, String>,
    ) {
        match node.node_type() {
            roxmltree::NodeType::Root => {
                for child in node.children() {
                    self.node(child, out, rendered_ns);
                }
            }
            roxmltree::NodeType::Element => self.element(node, out, rendered_ns),
            roxmltree::NodeType::Text => {
                if self.is_visible(&node) {
                    output::escape_text(node.text().unwrap_or(""), out);
                }
            }
            roxmltree::NodeType::Comment => {
                if self.with_comments && self.is_visible(&node) {
                    output::render_comment(node.text().unwrap_or(""), out);
                }
            }
            roxmltree::NodeType::PI => {
                if self.is_visible(&node) {
                    if let Some(pi) = node.pi() {
                        output::render_pi(pi.target, pi.value, out);
                    }
                }
            }
        }
    }

    fn element(
        &self,
        node: roxmltree::Node<'_, '_>,
        out: &mut Vec<u8>,
        rendered_ns: &BTreeMap<String, String>,
    ) {
        if !self.is_visible(&node) {
            for child in node.children() {
                self.node(child, out, rendered_ns);
            }
            return;
        }

        let inscope = collect_inscope_namespaces(&node);

        let mut utilized: HashSet<String> = HashSet::new();
        utilized.insert(element_prefix(&node, &inscope));
        for attr in node.attributes() {
            if attr.namespace().is_some() {
                let qname = qualified_attr_name(&attr, &inscope);
                if let Some((prefix, _)) = qname.split_once(':') {
                    utilized.insert(prefix.to_owned());
                }
            }
        }
        for prefix in &self.inclusive_prefixes {
            if prefix == "#default" {
                utilized.insert(String::new());
            } else {
                utilized.insert(prefix.clone());
            }
        }

        let mut ns_decls: Vec<NsDecl> = Vec::new();
        for prefix in &utilized {
            if prefix == "xml" {
                continue;
            }
            match inscope.get(prefix) {
                Some(uri) => {
                    if rendered_ns.get(prefix) != Some(uri) {
                        ns_decls.push(NsDecl {
                            prefix: prefix.clone(),
                            uri: uri.clone(),
                        });
                    }
                }
                None if prefix.is_empty() => {
                    // Undeclare the default namespace if an ancestor
                    // rendered a non-empty one.
                    if rendered_ns.get("").is_some_and(|uri| !uri.is_empty()) {
                        ns_decls.push(NsDecl {
                            prefix: String::new(),
                            uri: String::new(),
                        });
                    }
                }
                None => {}
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

        let mut child_rendered = rendered_ns.clone();
        for decl in &ns_decls {
            child_rendered.insert(decl.prefix.clone(), decl.uri.clone());
        }
        for child in node.children() {
            self.node(child, out, &child_rendered);
        }

        out.extend_from_slice(b"</");
        out.extend_from_slice(name.as_bytes());
        out.push(b'>');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exc_c14n(xml: &str, prefixes: &[&str]) -> String {
        let doc = roxmltree::Document::parse(xml).unwrap();
        let prefixes: Vec<String> = prefixes.iter().map(|p| (*p).to_owned()).collect();
        String::from_utf8(canonicalize(&doc, false, None, &prefixes).unwrap()).unwrap()
    }

    #[test]
    fn unused_declarations_dropped() {
        let out = exc_c14n(
            r#"<r xmlns:used="http://u" xmlns:unused="http://x"><used:c/></r>"#,
            &[],
        );
        assert_eq!(out, r#"<r><used:c xmlns:used="http://u"></used:c></r>"#);
    }

    #[test]
    fn default_namespace_is_visibly_utilized() {
        let out = exc_c14n(r#"<r xmlns="http://d" xmlns:x="http://x"><c/></r>"#, &[]);
        assert_eq!(out, r#"<r xmlns="http://d"><c></c></r>"#);
    }

    #[test]
    fn inclusive_prefix_list_forces_output() {
        let out = exc_c14n(
            r#"<r xmlns:ext="http://e"><c attr="uses ext:type"/></r>"#,
            &["ext"],
        );
        assert_eq!(
            out,
            r#"<r xmlns:ext="http://e"><c attr="uses ext:type"></c></r>"#
        );
    }

    #[test]
    fn declaration_not_repeated_under_visible_ancestor() {
        let out = exc_c14n(r#"<x:r xmlns:x="http://x"><x:c/></x:r>"#, &[]);
        assert_eq!(out, r#"<x:r xmlns:x="http://x"><x:c></x:c></x:r>"#);
    }

    #[test]
    fn subset_root_redeclares_its_namespace() {
        let xml = r#"<w xmlns="http://w"><r xmlns:s="http://s"><s:inner>v</s:inner></r></w>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let inner = doc
            .descendants()
            .find(|n| n.tag_name().name() == "inner")
            .unwrap();
        let set = NodeSet::subtree_without_comments(inner);
        let out = String::from_utf8(canonicalize(&doc, false, Some(&set), &[]).unwrap()).unwrap();
        assert_eq!(out, r#"<s:inner xmlns:s="http://s">v</s:inner>"#);
    }
}
