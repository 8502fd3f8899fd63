//! Turn one element subtree into a single flat record.
//!
//! Keys are the tag names on the path from the matched element down to each
//! leaf, joined by `_`. Attribute values use the key of the element carrying
//! them suffixed with `_attr_<name>`.
//!
//! Only the first of several same-named siblings is represented: once a key
//! holds a value, later elements or attributes producing the same key are
//! skipped. This is a known limitation of the flat layout.
//!
//! The walk keeps its pending work on a heap-allocated stack, so nesting depth
//! is bounded by memory rather than by the thread's call stack.

use tracing::trace;
use xml_tree::{Document, NodeId};

use crate::record::FlatRecord;
use crate::ExtractOptions;

/// Separator placed between tag names in a key.
pub const KEY_SEPARATOR: char = '_';

/// Infix placed between an element key and an attribute name.
pub const ATTRIBUTE_INFIX: &str = "_attr_";

/// Flatten the subtree rooted at `node`.
///
/// `prefix` is prepended to the element's own tag name, e.g. `"tag1_"` for
/// an element located through `tag1/tag2`. With
/// [`ExtractOptions::skip_leading_tag`] the element's own name is left out and
/// only the prefix, without its trailing separator, remains.
pub fn flatten(
    document: &Document,
    node: NodeId,
    prefix: &str,
    options: &ExtractOptions,
) -> FlatRecord {
    let key = if options.skip_leading_tag {
        prefix.trim_end_matches(KEY_SEPARATOR).to_string()
    } else {
        format!("{prefix}{}", document.node(node).name())
    };
    let mut record = FlatRecord::new();
    let walker = Walker { document, options };
    walker.run(node, key, &mut record);
    record
}

/// Pending work of the walk. An element's attributes are stored after its
/// whole subtree, matching a depth-first visit of children then attributes.
enum Step {
    Enter(NodeId, String, usize),
    Attributes(NodeId, String),
}

struct Walker<'a> {
    document: &'a Document,
    options: &'a ExtractOptions,
}

impl Walker<'_> {
    fn run(&self, start: NodeId, key: String, record: &mut FlatRecord) {
        let mut pending = vec![Step::Enter(start, key, 1)];
        while let Some(step) = pending.pop() {
            match step {
                Step::Enter(id, key, level) => self.enter(id, key, level, &mut pending, record),
                Step::Attributes(id, key) => self.store_attributes(id, &key, record),
            }
        }
    }

    fn enter(
        &self,
        id: NodeId,
        key: String,
        level: usize,
        pending: &mut Vec<Step>,
        record: &mut FlatRecord,
    ) {
        let node = self.document.node(id);
        if node.has_children() {
            if self.within_depth(level) {
                let children = node.children();
                let mut steps: Vec<Step> = Vec::with_capacity(children.len());
                for &child in children {
                    let child_key = format!(
                        "{key}{KEY_SEPARATOR}{}",
                        self.document.node(child).name()
                    );
                    steps.push(Step::Enter(child, child_key, level + 1));
                }
                if self.options.include_attributes {
                    pending.push(Step::Attributes(id, key));
                }
                pending.extend(steps.into_iter().rev());
                return;
            }
            trace!(key = key.as_str(), level, "depth limit reached, children dropped");
        } else if let Some(text) = node.text() {
            self.store(record, &key, text);
        }

        if self.options.include_attributes {
            self.store_attributes(id, &key, record);
        }
    }

    fn store_attributes(&self, id: NodeId, key: &str, record: &mut FlatRecord) {
        for (name, value) in self.document.node(id).attributes() {
            self.store(record, &format!("{key}{ATTRIBUTE_INFIX}{name}"), value);
        }
    }

    fn within_depth(&self, level: usize) -> bool {
        self.options.max_level == 0 || level <= self.options.max_level
    }

    fn store(&self, record: &mut FlatRecord, key: &str, value: &str) {
        let key = normalize_key(key);
        if record.contains_key(key) || !self.options.fields.permits(key) {
            return;
        }
        record.insert_first(key, Some(value.to_string()));
    }
}

/// Drop leading separators left behind by an empty starting key.
fn normalize_key(key: &str) -> &str {
    key.trim_start_matches(|c: char| c == KEY_SEPARATOR || c == ' ')
}
