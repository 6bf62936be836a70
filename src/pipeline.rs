use crate::annotate::{self, AnnotationReport};
use crate::artifacts::{self, ArtifactSet};
use crate::deg::{self, DegCounts};
use crate::errors::DegError;
use crate::loader::{self, TableSource};
use crate::options::DegOptions;
use crate::schema;
use tracing::info;

/// Everything one pipeline invocation produces: the three byte artifacts
/// plus the attrition and classification counts the caller must be able to
/// report.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub artifacts: ArtifactSet,
    pub annotation: AnnotationReport,
    pub counts: DegCounts,
}

/// Runs the full annotation-and-filtering pipeline on one pair of uploaded
/// tables: load, validate, annotate, classify, serialize.
///
/// The invocation is synchronous, request-scoped and stateless; nothing is
/// shared between calls, so concurrent invocations are independent.
///
/// # Errors
///
/// Any [DegError]; no partial artifacts are ever produced. Callers should
/// treat [DegError::EmptyResult] as a notice to relax the thresholds rather
/// than a failure (see [DegError::is_recoverable]).
pub fn run(
    results: &TableSource,
    annotation: Option<&TableSource>,
    opts: &DegOptions,
) -> Result<PipelineOutput, DegError> {
    info!("loading results table {}", results.name);
    let results_df = loader::load_table(results)?;
    schema::require_columns(&results_df, &schema::STAT_COLUMNS)?;

    let annotation_df = match annotation {
        Some(source) => {
            info!("loading annotation table {}", source.name);
            Some(loader::load_table(source)?)
        }
        None => None,
    };

    let (annotated, report) =
        annotate::resolve(results_df, annotation_df.as_ref(), opts.apply_underscore_fix)?;
    let classification = deg::classify(annotated, opts)?;
    let counts = classification.counts();

    let artifacts = artifacts::render(&results.base_name(), &classification)?;
    info!(
        "pipeline finished: {} DEG(s), {} up, {} down",
        counts.total, counts.up, counts.down
    );
    Ok(PipelineOutput {
        artifacts,
        annotation: report,
        counts,
    })
}
