use std::sync::Arc;

use serde::Deserialize;

use crate::model::{flashcard::Flashcard, ids::NodeId};

/// A read-only node of a host document tree.
///
/// The tree is owned by the document store; this crate only walks it. Children
/// are shared, so a sub-tree can be handed out without copying it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DocumentNode {
    id: NodeId,
    #[serde(default)]
    content: String,
    #[serde(default)]
    children: Vec<Arc<DocumentNode>>,
}

impl DocumentNode {
    #[must_use]
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(id),
            content: content.into(),
            children: Vec::new(),
        }
    }

    /// Shorthand for a node without children.
    #[must_use]
    pub fn leaf(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(id, content)
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<DocumentNode>) -> Self {
        self.children = children.into_iter().map(Arc::new).collect();
        self
    }

    #[must_use]
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn children(&self) -> &[Arc<DocumentNode>] {
        &self.children
    }

    /// Depth-first walk over `root` and all of its descendants.
    ///
    /// Yields shared handles; no node is copied.
    pub fn walk(root: Arc<DocumentNode>) -> impl Iterator<Item = Arc<DocumentNode>> {
        let mut stack = vec![root];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev().cloned());
            Some(node)
        })
    }
}

/// Collect every flashcard candidate among the root's immediate children, in
/// source order.
///
/// Children that lack the question/answer structure are skipped silently.
#[must_use]
pub fn collect_candidates(root: &DocumentNode) -> Vec<Flashcard> {
    root.children()
        .iter()
        .filter_map(|child| Flashcard::from_candidate(child).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qa(id: &str, q: &str, a: &str) -> DocumentNode {
        DocumentNode::new(id, "").with_children(vec![
            DocumentNode::leaf(format!("{id}-q"), q),
            DocumentNode::leaf(format!("{id}-a"), a),
        ])
    }

    #[test]
    fn collects_only_well_formed_children() {
        let root = DocumentNode::new("doc", "Doc").with_children(vec![
            qa("c1", "Q1", "A1"),
            DocumentNode::leaf("heading", "just text"),
            qa("c2", "  ", "A2"),
            qa("c3", "Q3", "A3"),
            DocumentNode::new("c4", "").with_children(vec![DocumentNode::leaf("only", "Q4")]),
        ]);

        let cards = collect_candidates(&root);
        let ids: Vec<&str> = cards.iter().map(|c| c.source_id().as_str()).collect();
        assert_eq!(ids, vec!["c1", "c3"]);
    }

    #[test]
    fn grandchildren_are_not_candidates() {
        let nested = DocumentNode::new("section", "Section").with_children(vec![qa("deep", "Q", "A")]);
        let root = DocumentNode::new("doc", "Doc").with_children(vec![nested]);

        // "section" has a single child, so it is not a candidate either.
        assert!(collect_candidates(&root).is_empty());
    }

    #[test]
    fn walk_is_depth_first() {
        let root = DocumentNode::new("doc", "").with_children(vec![qa("c1", "Q", "A"), qa("c2", "Q", "A")]);
        let ids: Vec<String> = DocumentNode::walk(Arc::new(root))
            .map(|n| n.id().to_string())
            .collect();
        assert_eq!(ids, vec!["doc", "c1", "c1-q", "c1-a", "c2", "c2-q", "c2-a"]);
    }

    #[test]
    fn walk_shares_nodes_with_the_tree() {
        let root = Arc::new(DocumentNode::new("doc", "").with_children(vec![qa("c1", "Q", "A")]));
        let child = DocumentNode::walk(Arc::clone(&root)).nth(1).unwrap();
        assert!(Arc::ptr_eq(&child, &root.children()[0]));
    }

    #[test]
    fn deserializes_with_missing_fields() {
        let root: DocumentNode = doc_from_toml();
        assert_eq!(root.children().len(), 1);
        assert_eq!(root.children()[0].content(), "");
    }

    fn doc_from_toml() -> DocumentNode {
        toml::from_str(
            r#"
            id = "doc"
            content = "Doc"

            [[children]]
            id = "child"
            "#,
        )
        .unwrap()
    }
}
