use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use xmlflat::{ExtractOptions, HostOptions};

/// Input path meaning "read the document from stdin".
pub const STDIN_PATH: &str = "-";

/// Document selection and flattening options shared by several commands.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ExtractArgs {
    /// XML file to read, `-` for stdin
    #[arg(long, short)]
    pub input: PathBuf,
    /// Tag path such as `tag1/tag2`; empty selects the top-level element
    #[arg(long, default_value = "")]
    pub path: String,
    /// JSON array of keys to keep
    #[arg(long, default_value = "[]")]
    pub fields: String,
    /// Deepest level to expand below each match (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    pub max_level: usize,
    /// Leave attributes out of the records
    #[arg(long)]
    pub no_attrs: bool,
    /// Drop the matched tag name from every key
    #[arg(long)]
    pub skip_first_tag: bool,
}

impl ExtractArgs {
    pub fn host_options(&self) -> HostOptions {
        HostOptions {
            fields_json: self.fields.clone(),
            max_level: self.max_level,
            use_attrs: !self.no_attrs,
            skip_first_tag: self.skip_first_tag,
        }
    }

    pub fn extract_options(&self) -> Result<ExtractOptions> {
        self.host_options()
            .to_extract_options()
            .context("decode --fields")
    }
}

/// Read the whole document from a file or stdin.
pub fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == STDIN_PATH {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("read XML from stdin")?;
        return Ok(text);
    }
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

pub fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    let text = text.context("serialise JSON output")?;
    println!("{text}");
    Ok(())
}
