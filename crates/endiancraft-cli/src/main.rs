//! `endiancraft` command line entrypoint.

mod args;
mod config;
mod generate;

use std::{fs, io};

use anyhow::{Context, Result};
use clap::Parser;
use endiancraft::schema::Catalogue;
use tracing_subscriber::fmt;

use crate::{
    args::{Cli, OutputFormat},
    config::GenerateConfig,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    fmt()
        .event_format(fmt::format().compact().without_time())
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => GenerateConfig::load(path)?,
        None => GenerateConfig::default(),
    };
    let settings = config.merge(cli)?;

    let header = generate::load_inputs(&cli.inputs)?;
    let catalogue =
        Catalogue::new(header.structs.iter().cloned()).context("invalid struct catalogue")?;

    let constants = generate::resolve_constants(
        &catalogue,
        &header,
        &settings,
        &mut io::stdin().lock(),
        &mut io::stderr(),
    )?;

    let vectors = generate::synthesize_all(&catalogue, &constants, &settings, cli.keep_going)?;
    tracing::info!(vectors = vectors.len(), "synthesis finished");

    let rendered = match cli.format {
        OutputFormat::Gtest => {
            let includes: Vec<String> = if cli.includes.is_empty() {
                cli.inputs
                    .iter()
                    .filter(|path| path.extension().is_none_or(|ext| ext != "json"))
                    .filter_map(|path| path.file_name())
                    .map(|name| name.to_string_lossy().into_owned())
                    .collect()
            } else {
                cli.includes.clone()
            };
            let includes: Vec<&str> = includes.iter().map(String::as_str).collect();
            endiancraft_gtest::render_suite(&includes, &vectors, &settings.render)
        }
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&vectors)?;
            json.push('\n');
            json
        }
    };

    match &cli.output {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote output");
        }
        None => print!("{rendered}"),
    }

    Ok(())
}
