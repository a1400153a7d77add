#![forbid(unsafe_code)]

//! Node sets for document-subset canonicalization.
//!
//! A [`NodeSet`] names the visible nodes of a parsed document by node
//! id. The signature pipeline needs exactly three shapes: the whole
//! document without comments (reference `URI=""`), a single subtree
//! (`#id` references and SignedInfo), and either of those minus the
//! `Signature` subtree (enveloped-signature transform).

use std::collections::HashSet;

/// A set of document nodes, identified by their `roxmltree` node ids.
#[derive(Debug, Clone, Default)]
pub struct NodeSet {
    nodes: HashSet<usize>,
}

impl NodeSet {
    /// The whole document except comment nodes. Per the XML-DSig spec,
    /// `URI=""` selects the document without comments.
    pub fn document_without_comments(doc: &roxmltree::Document<'_>) -> Self {
        let mut nodes = HashSet::new();
        for node in doc.root().descendants() {
            if !node.is_comment() {
                nodes.insert(node.id().get_usize());
            }
        }
        Self { nodes }
    }

    /// A subtree rooted at the given node, without comments.
    pub fn subtree_without_comments(root: roxmltree::Node<'_, '_>) -> Self {
        let mut nodes = HashSet::new();
        for node in root.descendants() {
            if !node.is_comment() {
                nodes.insert(node.id().get_usize());
            }
        }
        Self { nodes }
    }

    /// A subtree rooted at the given node, comments included.
    pub fn subtree_with_comments(root: roxmltree::Node<'_, '_>) -> Self {
        let mut nodes = HashSet::new();
        for node in root.descendants() {
            nodes.insert(node.id().get_usize());
        }
        Self { nodes }
    }

    /// Whether the node is visible in this set.
    pub fn contains(&self, node: &roxmltree::Node<'_, '_>) -> bool {
        self.nodes.contains(&node.id().get_usize())
    }

    /// Remove a subtree, e.g. the `Signature` element for the
    /// enveloped-signature transform.
    pub fn remove_subtree(&mut self, root: roxmltree::Node<'_, '_>) {
        for node in root.descendants() {
            self.nodes.remove(&node.id().get_usize());
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_set_skips_comments() {
        let doc = roxmltree::Document::parse("<a><!-- hidden --><b/></a>").unwrap();
        let set = NodeSet::document_without_comments(&doc);
        let comment = doc
            .root()
            .descendants()
            .find(|n| n.is_comment())
            .unwrap();
        assert!(!set.contains(&comment));
        let b = doc
            .descendants()
            .find(|n| n.has_tag_name("b"))
            .unwrap();
        assert!(set.contains(&b));
    }

    #[test]
    fn remove_subtree_hides_descendants() {
        let doc = roxmltree::Document::parse("<a><b><c/></b><d/></a>").unwrap();
        let mut set = NodeSet::document_without_comments(&doc);
        let b = doc.descendants().find(|n| n.has_tag_name("b")).unwrap();
        set.remove_subtree(b);
        let c = doc.descendants().find(|n| n.has_tag_name("c")).unwrap();
        let d = doc.descendants().find(|n| n.has_tag_name("d")).unwrap();
        assert!(!set.contains(&b));
        assert!(!set.contains(&c));
        assert!(set.contains(&d));
    }
}
