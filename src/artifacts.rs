use crate::deg::Classification;
use crate::errors::DegError;
use crate::locus::LocusTag;
use crate::schema::{ABS_LOG_FC, LOCUS_TAG};
use polars::{frame::DataFrame, prelude::*};
use std::collections::HashSet;

/// One output artifact: the suggested filename and the rendered bytes.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// The three artifacts of one pipeline invocation.
#[derive(Debug, Clone)]
pub struct ArtifactSet {
    /// Full DEG table, tab-separated with a header row.
    pub deg_table: Artifact,
    /// Up-regulated locus tags, one per line.
    pub test_up: Artifact,
    /// Down-regulated locus tags, one per line.
    pub control_up: Artifact,
}

/// The deduplicated locus tags of a table, in first-appearance order.
pub fn locus_tags(df: &DataFrame) -> Result<Vec<LocusTag>, DegError> {
    let tags = df.column(LOCUS_TAG)?.utf8()?;
    let mut seen: HashSet<&str> = HashSet::with_capacity(tags.len());
    let mut out = Vec::new();
    for tag in tags.into_iter().flatten() {
        if seen.insert(tag) {
            out.push(LocusTag::new(tag.to_string()));
        }
    }
    Ok(out)
}

fn tag_list_bytes(df: &DataFrame) -> Result<Vec<u8>, DegError> {
    let mut bytes = Vec::new();
    for tag in locus_tags(df)? {
        bytes.extend_from_slice(tag.as_ref().as_bytes());
        bytes.push(b'\n');
    }
    Ok(bytes)
}

fn deg_table_tsv(df: &DataFrame) -> Result<Vec<u8>, DegError> {
    // the |logFC| helper is internal working state, never output
    let mut df = if df.get_column_names().contains(&ABS_LOG_FC) {
        df.drop(ABS_LOG_FC)?
    } else {
        df.clone()
    };
    let mut bytes = Vec::new();
    CsvWriter::new(&mut bytes)
        .with_separator(b'\t')
        .has_header(true)
        .finish(&mut df)?;
    Ok(bytes)
}

/// Renders the three byte artifacts for a classification.
///
/// All three are pure functions of their input: identical classifications
/// yield byte-identical artifacts. `base` is the results filename minus its
/// final extension; the fixed suffixes `_DEG_table.tsv`,
/// `_test_up_locus_tags.txt` and `_control_up_locus_tags.txt` are appended.
pub fn render(base: &str, classification: &Classification) -> Result<ArtifactSet, DegError> {
    Ok(ArtifactSet {
        deg_table: Artifact {
            filename: format!("{base}_DEG_table.tsv"),
            bytes: deg_table_tsv(&classification.deg)?,
        },
        test_up: Artifact {
            filename: format!("{base}_test_up_locus_tags.txt"),
            bytes: tag_list_bytes(&classification.up)?,
        },
        control_up: Artifact {
            filename: format!("{base}_control_up_locus_tags.txt"),
            bytes: tag_list_bytes(&classification.down)?,
        },
    })
}
