use crate::errors::DegError;
use crate::locus;
use crate::schema::{self, LOCUS_TAG, ORF, PROBE_ID};
use polars::{frame::DataFrame, prelude::*};
use tracing::{debug, info, warn};

/// How the locus-tag column was obtained.
///
/// * `SingleFile` - the results table already carried a raw annotation
///   (`ORF`) column, so no platform table was consulted.
/// * `Merge` - the results were left-joined onto a platform annotation
///   table on the shared probe id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationMode {
    SingleFile,
    Merge,
}

impl std::fmt::Display for AnnotationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnnotationMode::SingleFile => write!(f, "single-file"),
            AnnotationMode::Merge => write!(f, "merge"),
        }
    }
}

/// Row-attrition accounting for one annotation resolution.
///
/// Every count the pipeline must surface to the caller lives here rather
/// than only in the log: the join attrition (`unmatched_dropped`) and the
/// identifier-family attrition (`unrecognized_dropped`) in particular.
#[derive(Debug, Clone)]
pub struct AnnotationReport {
    pub mode: AnnotationMode,
    /// Rows in the results table as loaded.
    pub input_rows: usize,
    /// Rows remaining after probe-id deduplication (merge mode only;
    /// equals `input_rows` in single-file mode).
    pub rows_after_probe_dedup: usize,
    /// Rows dropped because no annotation entry matched their probe id.
    pub unmatched_dropped: usize,
    /// Rows carrying a locus tag before the identifier-family filter.
    pub rows_with_tag: usize,
    /// Rows dropped because their normalized tag is not in the recognized
    /// identifier family.
    pub unrecognized_dropped: usize,
    /// Rows in the annotated output.
    pub final_rows: usize,
}

/// Attaches a canonical `Locus_tag` column to a results table.
///
/// If the results table still contains an `ORF` column after discarding any
/// stale `Locus_tag` column (the tag is always recomputed, never trusted),
/// the resolver operates in single-file mode and simply renames it.
/// Otherwise it left-joins the results onto the platform annotation table on
/// the probe id. Both modes then normalize the tags and keep only the
/// recognized identifier family, counting every dropped row.
///
/// # Errors
///
/// * [DegError::MissingAnnotation] - merge mode selected but no annotation
///   table supplied.
/// * [DegError::MissingColumns] - the annotation table lacks `ID`/`ORF`, or
///   the results lack `ID` in merge mode.
/// * [DegError::Schema] - the statistical columns are absent after
///   resolution.
pub fn resolve(
    results: DataFrame,
    annotation: Option<&DataFrame>,
    apply_underscore_fix: bool,
) -> Result<(DataFrame, AnnotationReport), DegError> {
    let input_rows = results.height();

    // a stale Locus_tag column must not shadow the recomputed one
    let results = if results.get_column_names().contains(&LOCUS_TAG) {
        debug!("discarding pre-existing {} column", LOCUS_TAG);
        results.drop(LOCUS_TAG)?
    } else {
        results
    };

    let (mut df, mode, rows_after_probe_dedup, unmatched_dropped) =
        if results.get_column_names().contains(&ORF) {
            info!("results table carries its own {} column; skipping the merge", ORF);
            let rows = results.height();
            (results, AnnotationMode::SingleFile, rows, 0)
        } else {
            let annotation = annotation.ok_or(DegError::MissingAnnotation)?;
            merge_annotation(results, annotation)?
        };

    df.rename(ORF, LOCUS_TAG)?;
    let rows_with_tag = df.height();

    // canonicalize tags, then keep only the recognized identifier family
    let normalized = normalize_tags(&df, apply_underscore_fix)?;
    df.with_column(normalized)?;

    let tags = df.column(LOCUS_TAG)?.utf8()?;
    let mask: BooleanChunked = tags
        .into_iter()
        .map(|t| t.map_or(false, locus::is_recognized))
        .collect();
    let mut kept = df.filter(&mask)?;
    let unrecognized_dropped = rows_with_tag - kept.height();
    if unrecognized_dropped > 0 {
        warn!(
            "excluded {} row(s) whose locus tag is outside the recognized family",
            unrecognized_dropped
        );
    }

    let missing = schema::missing_columns(&kept, &schema::STAT_COLUMNS);
    if !missing.is_empty() {
        return Err(DegError::Schema { missing });
    }
    // float-typed statistics regardless of how the input was parsed
    for name in schema::STAT_COLUMNS {
        let casted = kept.column(name)?.cast(&DataType::Float64)?;
        kept.with_column(casted)?;
    }

    let report = AnnotationReport {
        mode,
        input_rows,
        rows_after_probe_dedup,
        unmatched_dropped,
        rows_with_tag,
        unrecognized_dropped,
        final_rows: kept.height(),
    };
    info!(
        "annotation resolved in {} mode: {} input row(s), {} annotated row(s)",
        report.mode, report.input_rows, report.final_rows
    );
    Ok((kept, report))
}

/// Left-joins the results onto the annotation table on the probe id and
/// drops rows with no match, reporting the attrition.
fn merge_annotation(
    results: DataFrame,
    annotation: &DataFrame,
) -> Result<(DataFrame, AnnotationMode, usize, usize), DegError> {
    schema::require_columns(&results, &[PROBE_ID])?;
    schema::require_columns(annotation, &schema::ANNOTATION_COLUMNS)?;

    // utf8 join keys, so numeric and textual probe ids match alike
    let mut results = results;
    let key = results.column(PROBE_ID)?.cast(&DataType::Utf8)?;
    results.with_column(key)?;

    // duplicate probe ids should not occur in well-formed input; keep the
    // first occurrence when they do
    let deduped = results.unique_stable(
        Some(&[PROBE_ID.to_string()]),
        UniqueKeepStrategy::First,
        None,
    )?;
    let rows_after_dedup = deduped.height();
    if rows_after_dedup < results.height() {
        warn!(
            "results table contained {} duplicated probe id(s); keeping first occurrences",
            results.height() - rows_after_dedup
        );
    }

    let mut annotation = annotation.select(schema::ANNOTATION_COLUMNS)?;
    let key = annotation.column(PROBE_ID)?.cast(&DataType::Utf8)?;
    annotation.with_column(key)?;

    let joined = deduped.join(
        &annotation,
        [PROBE_ID],
        [PROBE_ID],
        JoinArgs::new(JoinType::Left),
    )?;

    let unmatched = joined.column(ORF)?.null_count();
    let mask = joined.column(ORF)?.is_not_null();
    let joined = joined.filter(&mask)?;
    info!(
        "dropped {} row(s) without a matching probe id; {} remaining",
        unmatched,
        joined.height()
    );

    Ok((joined, AnnotationMode::Merge, rows_after_dedup, unmatched))
}

fn normalize_tags(df: &DataFrame, apply_underscore_fix: bool) -> Result<Series, DegError> {
    let tags = df.column(LOCUS_TAG)?.cast(&DataType::Utf8)?;
    let mut normalized: Utf8Chunked = tags
        .utf8()?
        .into_iter()
        .map(|t| t.map(|t| locus::normalize(t, apply_underscore_fix)))
        .collect();
    normalized.rename(LOCUS_TAG);
    Ok(normalized.into_series())
}
