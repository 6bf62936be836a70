use polars::error::PolarsError;
use thiserror::Error;

/// The error taxonomy of the DEG pipeline.
///
/// Every variant is terminal for the current invocation: no partial artifacts
/// are produced. Only [DegError::EmptyResult] is recoverable in the sense
/// that the caller should surface it as a notice asking the user to relax
/// the thresholds rather than as a failure.
#[derive(Debug, Error)]
pub enum DegError {
    /// The input byte stream could not be parsed as a rectangular table.
    #[error("input `{name}` could not be parsed as a table: {reason}")]
    MalformedInput { name: String, reason: String },

    /// One or more required columns are absent. Carries the full set of
    /// missing names so the caller sees every gap in one report.
    #[error("missing required column(s): {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    /// Merge mode was selected (the results table carries no identifier
    /// column) but no platform annotation table was supplied.
    #[error(
        "the results table has no ORF/Locus_tag column; \
         a platform annotation table is required to attach locus tags"
    )]
    MissingAnnotation,

    /// The statistical columns are absent after annotation resolution.
    #[error("statistical column(s) absent after annotation: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    /// No rows survive the significance filter. Recoverable: the user
    /// should relax the cutoffs and re-run.
    #[error(
        "no rows satisfy adj.P.Val <= {fdr_cutoff} and |logFC| >= {logfc_cutoff}; \
         try relaxing the cutoffs"
    )]
    EmptyResult { fdr_cutoff: f64, logfc_cutoff: f64 },

    /// A configuration value is outside its documented range.
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// An underlying dataframe operation failed.
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl DegError {
    pub(crate) fn malformed<N: ToString, R: ToString>(name: N, reason: R) -> DegError {
        DegError::MalformedInput {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether the error is an empty-result notice rather than a hard
    /// failure of the invocation.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DegError::EmptyResult { .. })
    }
}
