use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;
use xmlflat::{AncestorPath, Document};

use crate::common;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ParentCheck {
    /// Occurrence of the tag in document order.
    pub index: usize,
    /// Actual ancestor chain, `/`-separated, starting at `[document]`.
    pub ancestors: String,
    pub matches: bool,
}

/// Check every element named `tag` against the ancestor chain `parents`.
pub fn check(document: &Document, tag: &str, parents: &AncestorPath) -> Vec<ParentCheck> {
    document
        .elements_named(tag)
        .enumerate()
        .map(|(index, node)| ParentCheck {
            index,
            ancestors: document.ancestor_names(node).join("/"),
            matches: parents.matches(document, node),
        })
        .collect()
}

pub fn run(input: &Path, tag: &str, parents: &str, json: bool, pretty: bool) -> Result<()> {
    let xml = common::read_input(input)?;
    let document = Document::parse(&xml).context("parse XML document")?;
    let results = check(&document, tag, &AncestorPath::parse(parents));
    info!(
        occurrences = results.len(),
        matched = results.iter().filter(|r| r.matches).count(),
        "checked ancestor chains"
    );

    if json {
        return common::print_json(&results, pretty);
    }
    if results.is_empty() {
        println!("No <{tag}> elements found.");
        return Ok(());
    }
    println!("{:<6} {:<7} {}", "INDEX", "MATCH", "ANCESTORS");
    for result in &results {
        println!(
            "{:<6} {:<7} {}",
            result.index,
            if result.matches { "yes" } else { "no" },
            result.ancestors
        );
    }
    Ok(())
}
