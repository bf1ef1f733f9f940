//! Split assignment over whole snapshots.

mod common;

use common::*;
use giantmidi_piano::meta_table::{Table, GIANT_MIDI_PIANO, SPLIT};
use giantmidi_piano::pipeline::{split_dataset, Snapshot};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;

fn write_detect_snapshot(ctx: &giantmidi_piano::PipelineContext, rows: &[(&str, &str)]) {
    let mut content = String::from("surname\tfirstname\tmusic\tpiano_solo_prob\n");
    for (i, (surname, prob)) in rows.iter().enumerate() {
        content.push_str(&format!("{}\tX\tPiece {}\t{}\n", surname, i, prob));
    }
    std::fs::write(ctx.snapshot_path(Snapshot::Detect), content).unwrap();
}

fn split_counts(table: &Table, surname: &str) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    let surnames = table.column("surname").unwrap();
    for (row, split) in table.column(SPLIT).unwrap().iter().enumerate() {
        if surnames[row] == surname && !split.is_empty() {
            *counts.entry(split.clone()).or_insert(0) += 1;
        }
    }
    counts
}

fn counts(pairs: &[(&str, usize)]) -> BTreeMap<String, usize> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

#[test]
fn test_split_balances_each_composer() {
    let (_dir, ctx, _) = test_workspace();
    let mut rows = vec![("Alkan", "0.9")];
    rows.extend([("Bach", "0.6"), ("Bach", "0.1"), ("Bach", "0.7")]);
    rows.extend(std::iter::repeat(("Czerny", "0.8")).take(11));
    write_detect_snapshot(&ctx, &rows);

    split_dataset(&ctx).unwrap();
    let table = Table::read(&ctx.snapshot_path(Snapshot::Split)).unwrap();

    assert_eq!(split_counts(&table, "Alkan"), counts(&[("validation", 1)]));
    assert_eq!(
        split_counts(&table, "Bach"),
        counts(&[("test", 1), ("validation", 1)])
    );
    assert_eq!(
        split_counts(&table, "Czerny"),
        counts(&[("test", 1), ("train", 8), ("validation", 2)])
    );
}

#[test]
fn test_split_is_empty_for_every_row_not_accepted() {
    let (_dir, ctx, _) = test_workspace();
    write_detect_snapshot(
        &ctx,
        &[("Alkan", "0.7"), ("Alkan", ""), ("Alkan", "0.3"), ("Alkan", "0.5")],
    );

    split_dataset(&ctx).unwrap();
    let table = Table::read(&ctx.snapshot_path(Snapshot::Split)).unwrap();

    for (flag, split) in table
        .column(GIANT_MIDI_PIANO)
        .unwrap()
        .iter()
        .zip(table.column(SPLIT).unwrap())
    {
        assert_eq!(flag == "1", !split.is_empty());
    }
    assert_eq!(
        table.column(SPLIT).unwrap(),
        &["validation", "", "", "test"]
    );
}

#[test]
fn test_split_snapshot_round_trips() {
    let (_dir, ctx, _) = test_workspace();
    write_detect_snapshot(&ctx, &[("Alkan", "0.75"), ("Bach", "")]);

    split_dataset(&ctx).unwrap();
    let path = ctx.snapshot_path(Snapshot::Split);
    let written = std::fs::read(&path).unwrap();
    Table::read(&path).unwrap().write(&path).unwrap();

    assert_eq!(std::fs::read(&path).unwrap(), written);
    assert!(String::from_utf8(written).unwrap().ends_with("\t\t\n"));
}
