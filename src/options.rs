use crate::errors::DegError;

/// Configuration for one DEG pipeline invocation.
///
/// This structure replaces any ambient, process-wide settings: every knob is
/// carried explicitly into the pipeline entry point, so concurrent
/// invocations cannot observe each other's configuration.
///
/// # Fields
///
/// * `fdr_cutoff`: Rows must satisfy `adj.P.Val <= fdr_cutoff` to count as
///   differentially expressed. Must lie in `[0, 1]`.
/// * `logfc_cutoff`: Rows must satisfy `|logFC| >= logfc_cutoff`. Must lie
///   in `[0, 10]`.
/// * `apply_underscore_fix`: If `true`, locus tags of the form `SOxxxx` are
///   rewritten to `SO_xxxx` before filtering and output.
/// * `dedupe_per_gene`: If `true`, at most one probe per locus tag survives,
///   chosen by maximum `|logFC|`.
///
/// # Default
///
/// * `fdr_cutoff`: 0.05
/// * `logfc_cutoff`: 1.0
/// * `apply_underscore_fix`: `true`
/// * `dedupe_per_gene`: `true`
///
/// # Examples
///
/// Creating validated options:
///
/// ```rust
/// use degsieve::DegOptions;
///
/// let opts = DegOptions::new(0.01, 2.0, true, true).unwrap();
/// assert_eq!(opts.fdr_cutoff, 0.01);
///
/// assert!(DegOptions::new(1.5, 2.0, true, true).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DegOptions {
    pub fdr_cutoff: f64,
    pub logfc_cutoff: f64,
    pub apply_underscore_fix: bool,
    pub dedupe_per_gene: bool,
}

impl Default for DegOptions {
    fn default() -> DegOptions {
        DegOptions {
            fdr_cutoff: 0.05,
            logfc_cutoff: 1.0,
            apply_underscore_fix: true,
            dedupe_per_gene: true,
        }
    }
}

impl DegOptions {
    /// Creates a new [DegOptions], validating that both cutoffs lie in their
    /// documented ranges.
    ///
    /// # Errors
    ///
    /// Returns [DegError::InvalidOption] if `fdr_cutoff` is outside `[0, 1]`
    /// or `logfc_cutoff` is outside `[0, 10]` (NaN included).
    pub fn new(
        fdr_cutoff: f64,
        logfc_cutoff: f64,
        apply_underscore_fix: bool,
        dedupe_per_gene: bool,
    ) -> Result<DegOptions, DegError> {
        if !(0.0..=1.0).contains(&fdr_cutoff) {
            return Err(DegError::InvalidOption(format!(
                "fdr_cutoff must lie in [0, 1], got {fdr_cutoff}"
            )));
        }
        if !(0.0..=10.0).contains(&logfc_cutoff) {
            return Err(DegError::InvalidOption(format!(
                "logfc_cutoff must lie in [0, 10], got {logfc_cutoff}"
            )));
        }
        Ok(DegOptions {
            fdr_cutoff,
            logfc_cutoff,
            apply_underscore_fix,
            dedupe_per_gene,
        })
    }
}
