use anyhow::{Context, Result};
use tracing::info;

use crate::common::{self, ExtractArgs};

/// List the synchronized column names of the selected records.
pub fn run(args: &ExtractArgs, json: bool, pretty: bool) -> Result<()> {
    let xml = common::read_input(&args.input)?;
    let options = args.extract_options()?;
    let records = xmlflat::extract(&xml, &args.path, &options)
        .with_context(|| format!("extract records for path {:?}", args.path))?;
    let columns = records.columns();
    info!(records = records.len(), columns = columns.len(), "collected columns");

    if json {
        return common::print_json(&columns, pretty);
    }
    if columns.is_empty() {
        println!("No matching elements.");
        return Ok(());
    }
    for column in columns {
        println!("{column}");
    }
    Ok(())
}
