//! Path expressions and candidate lookup.

use std::fmt;
use std::str::FromStr;

use xml_tree::{Document, NodeId};

use crate::{AncestorPath, FlattenError};

/// A parsed `parent/.../tag` expression.
///
/// The last segment names the elements to extract, the segments before it
/// form the [`AncestorPath`] those elements must sit under. The empty
/// expression selects the top-level elements of the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathExpression {
    ancestors: AncestorPath,
    tag: Option<String>,
}

impl PathExpression {
    /// Parse an expression, rejecting empty segments such as `"tag1/"`.
    pub fn parse(expr: &str) -> Result<Self, FlattenError> {
        if expr.is_empty() {
            return Ok(Self::default());
        }
        let mut segments: Vec<&str> = expr.split('/').collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(FlattenError::InvalidPath(format!(
                "{expr:?} contains an empty tag name"
            )));
        }
        let tag = segments.pop().map(str::to_string);
        Ok(PathExpression {
            ancestors: segments.into_iter().collect(),
            tag,
        })
    }

    /// Tag name to search for, `None` for the top-level selection.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn ancestors(&self) -> &AncestorPath {
        &self.ancestors
    }

    pub fn is_top_level(&self) -> bool {
        self.tag.is_none()
    }
}

impl FromStr for PathExpression {
    type Err = FlattenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PathExpression::parse(s)
    }
}

impl fmt::Display for PathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in self.ancestors.segments() {
            write!(f, "{segment}/")?;
        }
        if let Some(tag) = &self.tag {
            f.write_str(tag)?;
        }
        Ok(())
    }
}

/// Collect the elements named by `expr` in document order.
///
/// Returns every element carrying the tag name regardless of depth, together
/// with the ancestor chain the caller still has to verify.
pub fn locate<'e>(
    document: &Document,
    expr: &'e PathExpression,
) -> (Vec<NodeId>, &'e AncestorPath) {
    let candidates = match expr.tag() {
        Some(tag) => document.elements_named(tag).collect(),
        None => document.top_level().to_vec(),
    };
    (candidates, expr.ancestors())
}
