use degsieve::{annotate, artifacts, deg, locus, schema, DegError, DegOptions};
use polars::prelude::*;

fn opts(fdr: f64, logfc: f64, dedupe: bool) -> DegOptions {
    DegOptions::new(fdr, logfc, true, dedupe).unwrap()
}

#[test]
fn locus_tag_normalization_round_trip() {
    assert_eq!(locus::normalize("SO1427", true), "SO_1427");
    // no double-underscoring
    assert_eq!(locus::normalize("SO_1427", true), "SO_1427");
    assert_eq!(locus::normalize("SO1427", false), "SO1427");
    assert_eq!(locus::normalize("SO", true), "SO");
    assert_eq!(locus::normalize("b3908", true), "b3908");

    assert!(locus::is_recognized("SO_1427"));
    assert!(!locus::is_recognized("b3908"));
}

#[test]
fn schema_check_reports_every_gap_at_once() {
    let df = df!("ID" => [1i64, 2]).unwrap();
    let err = schema::require_columns(&df, &schema::STAT_COLUMNS).unwrap_err();
    match err {
        DegError::MissingColumns { missing } => {
            assert_eq!(missing, vec!["adj.P.Val".to_string(), "logFC".to_string()])
        }
        other => panic!("expected MissingColumns, got {other:?}"),
    }
}

#[test]
fn unrecognized_tags_are_excluded_and_counted() -> anyhow::Result<()> {
    let results = df!(
        "ID" => [1i64, 2, 3],
        "adj.P.Val" => [0.01f64, 0.01, 0.01],
        "logFC" => [2.0f64, -2.0, 3.0],
    )?;
    let annotation = df!(
        "ID" => [1i64, 2],
        "ORF" => ["SO1427", "b3908"],
    )?;

    let (annotated, report) = annotate::resolve(results, Some(&annotation), true)?;
    // probe 3: no platform entry; probe 2: foreign identifier family
    assert_eq!(report.input_rows, 3);
    assert_eq!(report.unmatched_dropped, 1);
    assert_eq!(report.rows_with_tag, 2);
    assert_eq!(report.unrecognized_dropped, 1);
    assert_eq!(report.final_rows, 1);
    assert_eq!(annotated.height(), 1);

    let tags = artifacts::locus_tags(&annotated)?;
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].as_ref(), "SO_1427");
    Ok(())
}

#[test]
fn duplicate_probe_ids_keep_first_occurrence() -> anyhow::Result<()> {
    let results = df!(
        "ID" => [7i64, 7],
        "adj.P.Val" => [0.01f64, 0.02],
        "logFC" => [2.0f64, 5.0],
    )?;
    let annotation = df!("ID" => [7i64], "ORF" => ["SO0007"])?;

    let (annotated, report) = annotate::resolve(results, Some(&annotation), true)?;
    assert_eq!(report.rows_after_probe_dedup, 1);
    let lfc = annotated.column("logFC")?.f64()?.get(0);
    assert_eq!(lfc, Some(2.0));
    Ok(())
}

#[test]
fn max_magnitude_probe_wins_per_gene() -> anyhow::Result<()> {
    // two probes for one gene; the -3.0 one has the larger magnitude and
    // must land in the down set
    let annotated = df!(
        "ID" => ["1", "2"],
        "adj.P.Val" => [0.01f64, 0.01],
        "logFC" => [2.0f64, -3.0],
        "Locus_tag" => ["SO_0001", "SO_0001"],
    )?;

    let cls = deg::classify(annotated, &opts(0.05, 1.0, true))?;
    assert_eq!(cls.counts().total, 1);
    assert_eq!(cls.counts().up, 0);
    assert_eq!(cls.counts().down, 1);
    assert_eq!(cls.deg.column("logFC")?.f64()?.get(0), Some(-3.0));
    Ok(())
}

#[test]
fn equal_magnitude_ties_keep_the_earlier_row() -> anyhow::Result<()> {
    for (first, second) in [(2.0f64, -2.0f64), (-2.0, 2.0)] {
        let annotated = df!(
            "ID" => ["a", "b"],
            "adj.P.Val" => [0.01f64, 0.01],
            "logFC" => [first, second],
            "Locus_tag" => ["SO_0001", "SO_0001"],
        )?;
        let cls = deg::classify(annotated, &opts(0.05, 1.0, true))?;
        assert_eq!(cls.counts().total, 1);
        assert_eq!(cls.deg.column("logFC")?.f64()?.get(0), Some(first));
    }
    Ok(())
}

#[test]
fn dedupe_can_be_disabled() -> anyhow::Result<()> {
    let annotated = df!(
        "ID" => ["1", "2"],
        "adj.P.Val" => [0.01f64, 0.01],
        "logFC" => [2.0f64, 3.0],
        "Locus_tag" => ["SO_0001", "SO_0001"],
    )?;
    let cls = deg::classify(annotated, &opts(0.05, 1.0, false))?;
    assert_eq!(cls.counts().total, 2);
    Ok(())
}

#[test]
fn cutoffs_are_inclusive() -> anyhow::Result<()> {
    let annotated = df!(
        "ID" => ["1", "2"],
        "adj.P.Val" => [0.05f64, 0.050001],
        "logFC" => [1.0f64, 1.0],
        "Locus_tag" => ["SO_0001", "SO_0002"],
    )?;
    let cls = deg::classify(annotated, &opts(0.05, 1.0, true))?;
    // row 1 sits exactly on both bounds and survives; row 2 does not
    assert_eq!(cls.counts().total, 1);
    assert_eq!(cls.counts().up, 1);
    Ok(())
}

#[test]
fn up_and_down_are_disjoint_for_positive_cutoff() -> anyhow::Result<()> {
    let annotated = df!(
        "ID" => ["1", "2", "3"],
        "adj.P.Val" => [0.01f64, 0.01, 0.01],
        "logFC" => [2.0f64, -2.0, 1.5],
        "Locus_tag" => ["SO_0001", "SO_0002", "SO_0003"],
    )?;
    let cls = deg::classify(annotated, &opts(0.05, 1.0, true))?;
    assert_eq!(cls.counts().up + cls.counts().down, cls.counts().total);

    let up = artifacts::locus_tags(&cls.up)?;
    let down = artifacts::locus_tags(&cls.down)?;
    assert!(up.iter().all(|t| !down.contains(t)));
    Ok(())
}

#[test]
fn zero_cutoff_keeps_dual_membership_of_zero_logfc() -> anyhow::Result<()> {
    // with logfc_cutoff == 0, a zero-logFC row satisfies both partition
    // predicates; the dual membership is preserved, not resolved
    let annotated = df!(
        "ID" => ["1"],
        "adj.P.Val" => [0.01f64],
        "logFC" => [0.0f64],
        "Locus_tag" => ["SO_0001"],
    )?;
    let cls = deg::classify(annotated, &opts(0.05, 0.0, true))?;
    assert_eq!(cls.counts().up, 1);
    assert_eq!(cls.counts().down, 1);
    assert_eq!(cls.counts().total, 1);
    Ok(())
}

#[test]
fn empty_filter_result_is_an_error_with_the_cutoffs() {
    let annotated = df!(
        "ID" => ["1"],
        "adj.P.Val" => [0.5f64],
        "logFC" => [0.1f64],
        "Locus_tag" => ["SO_0001"],
    )
    .unwrap();
    let err = deg::classify(annotated, &opts(0.05, 1.0, true)).unwrap_err();
    match err {
        DegError::EmptyResult {
            fdr_cutoff,
            logfc_cutoff,
        } => {
            assert_eq!(fdr_cutoff, 0.05);
            assert_eq!(logfc_cutoff, 1.0);
        }
        other => panic!("expected EmptyResult, got {other:?}"),
    }
}

#[test]
fn gene_lists_are_deduplicated_in_first_appearance_order() -> anyhow::Result<()> {
    let df = df!(
        "Locus_tag" => ["SO_0002", "SO_0001", "SO_0002", "SO_0003"],
    )?;
    let tags: Vec<String> = artifacts::locus_tags(&df)?
        .into_iter()
        .map(|t| t.as_ref().to_string())
        .collect();
    assert_eq!(tags, vec!["SO_0002", "SO_0001", "SO_0003"]);
    Ok(())
}

#[test]
fn option_ranges_are_validated() {
    assert!(DegOptions::new(-0.1, 1.0, true, true).is_err());
    assert!(DegOptions::new(0.05, 11.0, true, true).is_err());
    assert!(DegOptions::new(0.0, 0.0, false, false).is_ok());
    let defaults = DegOptions::default();
    assert_eq!(defaults.fdr_cutoff, 0.05);
    assert_eq!(defaults.logfc_cutoff, 1.0);
    assert!(defaults.apply_underscore_fix);
    assert!(defaults.dedupe_per_gene);
}
