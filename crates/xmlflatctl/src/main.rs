use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use xmlflatctl::cmd_check;
use xmlflatctl::cmd_columns;
use xmlflatctl::cmd_extract;
use xmlflatctl::common::ExtractArgs;

#[derive(Parser, Debug)]
#[command(name = "xmlflatctl", version, about = "Flatten XML elements into JSON records")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// Output JSON where applicable
    #[arg(long, global = true)]
    json: bool,
    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print the matched elements as a JSON array of flat records
    Extract {
        #[command(flatten)]
        args: ExtractArgs,
    },
    /// List the synchronized column names of the matched records
    Columns {
        #[command(flatten)]
        args: ExtractArgs,
    },
    /// Check whether each occurrence of a tag sits under an ancestor chain
    CheckParent {
        /// XML file to read, `-` for stdin
        #[arg(long, short)]
        input: PathBuf,
        #[arg(long)]
        tag: String,
        /// Ancestor chain such as `[document]/parent1/parent2`
        #[arg(long, default_value = "")]
        parents: String,
    },
}

fn main() -> Result<()> {
    let Cli {
        verbose,
        json,
        pretty,
        cmd,
    } = Cli::parse();

    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| level.into()),
        ))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cmd {
        Cmd::Extract { args } => cmd_extract::run(&args, pretty)?,
        Cmd::Columns { args } => cmd_columns::run(&args, json, pretty)?,
        Cmd::CheckParent {
            input,
            tag,
            parents,
        } => cmd_check::run(&input, &tag, &parents, json, pretty)?,
    };

    Ok(())
}
