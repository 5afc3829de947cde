use crate::batch::{ArtifactFormat, DiagramError, run_batch};
use crate::config::load_config;
use crate::model::MetadataDocument;
use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "hieragram", version, about = "Entity hierarchy diagram renderer")]
pub struct Args {
    /// Metadata document (JSON) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output directory, one artifact per entity
    #[arg(short = 'o', long = "output", default_value = "diagrams")]
    pub output: PathBuf,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (themeVariables, canvas bounds)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    #[cfg(feature = "png")]
    Png,
}

impl From<OutputFormat> for ArtifactFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Svg => ArtifactFormat::Svg,
            #[cfg(feature = "png")]
            OutputFormat::Png => ArtifactFormat::Png,
        }
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    let input = read_input(args.input.as_deref())?;
    let document: MetadataDocument =
        serde_json::from_str(&input).context("invalid metadata document")?;
    if document.entities.is_empty() {
        bail!("no entities in input");
    }

    let report = run_batch(
        &document.entities,
        &args.output,
        &config,
        args.output_format.into(),
    );

    for (entity, warning) in &report.warnings {
        eprintln!("warning: {entity}: {warning}");
    }
    for (entity, error) in &report.failed {
        match error {
            DiagramError::Validation(err) => {
                for violation in &err.violations {
                    eprintln!("error: {entity}: {violation}");
                }
            }
            other => eprintln!("error: {entity}: {other}"),
        }
    }

    let total = document.entities.len();
    println!(
        "{} of {} diagram{} written to {}",
        report.succeeded.len(),
        total,
        if total == 1 { "" } else { "s" },
        args.output.display()
    );

    if !report.all_succeeded() {
        bail!("{} of {} entities failed", report.failed.len(), total);
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()));
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}
