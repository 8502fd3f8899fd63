use anyhow::{Context, Result};
use tracing::info;

use crate::common::{self, ExtractArgs};

/// Print the records selected by `args` as a JSON array, or `null` when
/// nothing matched.
pub fn run(args: &ExtractArgs, pretty: bool) -> Result<()> {
    let xml = common::read_input(&args.input)?;
    let options = args.extract_options()?;
    let records = xmlflat::extract(&xml, &args.path, &options)
        .with_context(|| format!("extract records for path {:?}", args.path))?;
    info!(records = records.len(), path = %args.path, "extracted records");

    if records.is_empty() {
        println!("null");
        return Ok(());
    }
    let text = xmlflat::records_to_json(&records, pretty).context("render records")?;
    println!("{text}");
    Ok(())
}
