use crate::errors::DegError;
use polars::frame::DataFrame;

/// Probe identifier column shared by the GEO2R results and the platform table.
pub const PROBE_ID: &str = "ID";
/// Multiple-testing-corrected significance column of a GEO2R results table.
pub const ADJ_P_VAL: &str = "adj.P.Val";
/// Signed log fold-change column of a GEO2R results table.
pub const LOG_FC: &str = "logFC";
/// Raw gene/locus identifier column of a platform annotation table.
pub const ORF: &str = "ORF";
/// Canonical locus identifier column attached by annotation resolution.
pub const LOCUS_TAG: &str = "Locus_tag";

/// Internal working column holding `|logFC|`; never part of any output.
pub(crate) const ABS_LOG_FC: &str = "abs_logFC";

/// Statistical columns that must be present for DEG classification.
pub const STAT_COLUMNS: [&str; 2] = [ADJ_P_VAL, LOG_FC];

/// Columns a platform annotation table must expose.
pub const ANNOTATION_COLUMNS: [&str; 2] = [PROBE_ID, ORF];

/// Names the columns of `required` that are absent from `df`, in the order
/// they were required.
pub fn missing_columns(df: &DataFrame, required: &[&str]) -> Vec<String> {
    let present = df.get_column_names();
    required
        .iter()
        .filter(|name| !present.contains(name))
        .map(|name| name.to_string())
        .collect()
}

/// Checks that every column in `required` is present in `df`.
///
/// Unlike a first-failure check, this collects the complete set of missing
/// names so the caller sees every gap in one report.
///
/// # Errors
///
/// Returns [DegError::MissingColumns] carrying all missing names if any
/// required column is absent.
pub fn require_columns(df: &DataFrame, required: &[&str]) -> Result<(), DegError> {
    let missing = missing_columns(df, required);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DegError::MissingColumns { missing })
    }
}
