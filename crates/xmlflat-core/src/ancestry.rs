//! Ancestor chain checks for located elements.

use xml_tree::{Document, NodeId};

/// Required tag names above a node, outermost first.
///
/// Built either from a slice of names or from a `/`-separated string; both
/// spellings of the same chain compare equal. `"[document]"` names the
/// synthetic root above the top-level elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AncestorPath {
    segments: Vec<String>,
}

impl AncestorPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split a `/`-separated chain. The empty string yields an empty path.
    pub fn parse(path: &str) -> Self {
        if path.is_empty() {
            return Self::new();
        }
        path.split('/').collect()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Key prefix contributed by the chain: segments joined by `_` with a
    /// trailing `_`, or nothing for an empty chain.
    pub fn key_prefix(&self) -> String {
        if self.segments.is_empty() {
            String::new()
        } else {
            format!("{}_", self.segments.join("_"))
        }
    }

    /// Whether the parents of `node` carry these names, innermost last.
    ///
    /// Only as many ancestors as there are segments are inspected, so a chain
    /// that does not reach `[document]` matches at any depth.
    pub fn matches(&self, document: &Document, node: NodeId) -> bool {
        let mut current = document.parent(node);
        for required in self.segments.iter().rev() {
            match current {
                Some(id) if document.node(id).name() == required => {
                    current = document.parent(id);
                }
                _ => return false,
            }
        }
        true
    }
}

impl<S: Into<String>> FromIterator<S> for AncestorPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        AncestorPath {
            segments: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<&str> for AncestorPath {
    fn from(path: &str) -> Self {
        AncestorPath::parse(path)
    }
}

impl From<String> for AncestorPath {
    fn from(path: String) -> Self {
        AncestorPath::parse(&path)
    }
}

impl From<Vec<String>> for AncestorPath {
    fn from(segments: Vec<String>) -> Self {
        AncestorPath { segments }
    }
}

impl From<&[&str]> for AncestorPath {
    fn from(segments: &[&str]) -> Self {
        segments.iter().copied().collect()
    }
}

impl<const N: usize> From<[&str; N]> for AncestorPath {
    fn from(segments: [&str; N]) -> Self {
        segments.into_iter().collect()
    }
}

/// Check that `node` sits below the given ancestor chain.
///
/// ```
/// use xml_tree::Document;
/// use xmlflat_core::ancestor_matches;
///
/// let doc = Document::parse("<p1><p2><leaf>1</leaf></p2></p1>").unwrap();
/// let leaf = doc.elements_named("leaf").next().unwrap();
/// assert!(ancestor_matches(&doc, leaf, "[document]/p1/p2"));
/// assert!(ancestor_matches(&doc, leaf, ["p1", "p2"]));
/// assert!(!ancestor_matches(&doc, leaf, "p1"));
/// ```
pub fn ancestor_matches(
    document: &Document,
    node: NodeId,
    path: impl Into<AncestorPath>,
) -> bool {
    path.into().matches(document, node)
}
