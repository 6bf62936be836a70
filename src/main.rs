use anyhow::Context;
use clap::Parser;
use degsieve::{pipeline, DegOptions, TableSource};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

/// Turn a GEO2R results table (plus an optional GPL platform table) into a
/// DEG table and up/down locus-tag lists.
#[derive(Parser)]
#[command(name = "degsieve", version, about)]
struct Cli {
    /// GEO2R results table (xls/xlsx/csv/tsv/txt, optionally gzipped)
    results: PathBuf,

    /// GPL platform annotation table with ID and ORF columns; required
    /// unless the results table carries its own ORF column
    #[arg(long)]
    annotation: Option<PathBuf>,

    /// FDR (adj.P.Val) cutoff, in [0, 1]
    #[arg(long, default_value_t = 0.05)]
    fdr: f64,

    /// Absolute logFC cutoff, in [0, 10]
    #[arg(long, default_value_t = 1.0)]
    logfc: f64,

    /// Leave SOxxxx tags as-is instead of rewriting them to SO_xxxx
    #[arg(long)]
    no_underscore_fix: bool,

    /// Keep every probe instead of one max-|logFC| probe per gene
    #[arg(long)]
    keep_all_probes: bool,

    /// Directory the three artifacts are written into
    #[arg(short, long, default_value = ".")]
    outdir: PathBuf,
}

fn read_source(path: &Path) -> anyhow::Result<TableSource> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(TableSource::new(name, bytes))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let cli = Cli::parse();
    let opts = DegOptions::new(
        cli.fdr,
        cli.logfc,
        !cli.no_underscore_fix,
        !cli.keep_all_probes,
    )?;

    let results = read_source(&cli.results)?;
    let annotation = match &cli.annotation {
        Some(path) => Some(read_source(path)?),
        None => None,
    };

    let output = match pipeline::run(&results, annotation.as_ref(), &opts) {
        Ok(output) => output,
        Err(err) if err.is_recoverable() => {
            warn!("{err}");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    fs::create_dir_all(&cli.outdir)
        .with_context(|| format!("failed to create {}", cli.outdir.display()))?;
    for artifact in [
        &output.artifacts.deg_table,
        &output.artifacts.test_up,
        &output.artifacts.control_up,
    ] {
        let path = cli.outdir.join(&artifact.filename);
        fs::write(&path, &artifact.bytes)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("wrote {}", path.display());
    }

    let report = &output.annotation;
    info!(
        "{} input row(s), {} dropped without annotation, {} outside the recognized family",
        report.input_rows, report.unmatched_dropped, report.unrecognized_dropped
    );
    Ok(())
}
