use crate::errors::DegError;
use crate::options::DegOptions;
use crate::schema::{ABS_LOG_FC, ADJ_P_VAL, LOCUS_TAG, LOG_FC};
use polars::{frame::DataFrame, lazy::prelude::*, prelude::*};
use tracing::{info, warn};

/// The classified differential-expression result.
///
/// `deg` is the full filtered (and, if requested, deduplicated) table;
/// `up` and `down` are its partitions by the sign of `logFC` relative to
/// the magnitude cutoff. With a zero cutoff a zero-`logFC` row satisfies
/// both partition predicates and therefore appears in both sets; that
/// dual membership is deliberate and preserved.
#[derive(Debug, Clone)]
pub struct Classification {
    pub deg: DataFrame,
    pub up: DataFrame,
    pub down: DataFrame,
}

/// Row counts of a [Classification], for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DegCounts {
    pub total: usize,
    pub up: usize,
    pub down: usize,
}

impl Classification {
    pub fn counts(&self) -> DegCounts {
        DegCounts {
            total: self.deg.height(),
            up: self.up.height(),
            down: self.down.height(),
        }
    }
}

/// Applies the DEG thresholds to an annotated table and partitions the
/// survivors.
///
/// Step 1 retains rows with `adj.P.Val <= fdr_cutoff` and `|logFC| >=
/// logfc_cutoff`, both bounds inclusive; the absolute value is kept in the
/// internal `abs_logFC` helper column. Step 2, when `dedupe_per_gene` is
/// set, keeps one probe per locus tag: the table is stable-sorted by
/// descending `|logFC|` and the first row per tag wins, so equal magnitudes
/// resolve to the earlier input row. Step 3 assigns a row to the up-set iff
/// `logFC >= logfc_cutoff` and to the down-set iff `logFC <= -logfc_cutoff`.
///
/// # Errors
///
/// Returns [DegError::EmptyResult] if no row survives step 1. This is the
/// recoverable "relax your thresholds" outcome, not a crash.
pub fn classify(annotated: DataFrame, opts: &DegOptions) -> Result<Classification, DegError> {
    let filtered = annotated
        .lazy()
        .with_column(col(LOG_FC).abs().alias(ABS_LOG_FC))
        .filter(
            col(ADJ_P_VAL)
                .lt_eq(lit(opts.fdr_cutoff))
                .and(col(ABS_LOG_FC).gt_eq(lit(opts.logfc_cutoff))),
        )
        .collect()?;

    if filtered.height() == 0 {
        warn!(
            "no rows pass adj.P.Val <= {} and |logFC| >= {}",
            opts.fdr_cutoff, opts.logfc_cutoff
        );
        return Err(DegError::EmptyResult {
            fdr_cutoff: opts.fdr_cutoff,
            logfc_cutoff: opts.logfc_cutoff,
        });
    }

    let deg = if opts.dedupe_per_gene {
        // stable sort, so equal-magnitude probes keep their input order and
        // the first row per gene is the max-|logFC| one
        let sorted = filtered.sort([ABS_LOG_FC], vec![true], true)?;
        sorted.unique_stable(
            Some(&[LOCUS_TAG.to_string()]),
            UniqueKeepStrategy::First,
            None,
        )?
    } else {
        filtered
    };

    let up = deg
        .clone()
        .lazy()
        .filter(col(LOG_FC).gt_eq(lit(opts.logfc_cutoff)))
        .collect()?;
    let down = deg
        .clone()
        .lazy()
        .filter(col(LOG_FC).lt_eq(lit(-opts.logfc_cutoff)))
        .collect()?;

    info!(
        "{} DEG(s) after filtering: {} up-regulated, {} down-regulated",
        deg.height(),
        up.height(),
        down.height()
    );
    Ok(Classification { deg, up, down })
}
