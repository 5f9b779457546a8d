// Property-based tests for status classification, filtering and daily summaries.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::BTreeSet;

use chrono::NaiveDate;
use proptest::prelude::*;
use prtrack_core::value::parse_date;
use prtrack_core::{
    daily_summary, filter, AliasTable, Dataset, ParseOptions, RawTable, RecordFilter, Status,
};

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

const HEADERS: [&str; 6] = ["PR NO.", "DATE", "ITEM DESCRIPTION", "PO NO.", "Received Date", "AMOUNT"];

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Date cell: mostly valid, sometimes junk or blank.
fn arb_date() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => r"2024-01-0[1-4]",
        1 => r"[a-z]{1,6}",
        1 => Just(String::new()),
    ]
}

fn arb_po() -> impl Strategy<Value = String> {
    prop_oneof![
        2 => r"PO[0-9]{1,3}",
        1 => Just(String::new()),
        1 => Just("  ".to_string()),
    ]
}

fn arb_amount() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => r"[0-9]{1,5}(\.[0-9]{1,2})?",
        1 => r"[a-z]{1,4}",
        1 => Just(String::new()),
    ]
}

fn arb_row() -> impl Strategy<Value = Vec<String>> {
    (
        r"PR[0-9]{1,4}",
        arb_date(),
        r"[a-zA-Z ]{0,12}",
        arb_po(),
        arb_date(),
        arb_amount(),
    )
        .prop_map(|(pr, date, item, po, received, amount)| vec![pr, date, item, po, received, amount])
}

fn arb_dataset() -> impl Strategy<Value = (Vec<Vec<String>>, Dataset)> {
    prop::collection::vec(arb_row(), 0..40).prop_map(|rows| {
        let mut all = vec![HEADERS.iter().map(|h| h.to_string()).collect::<Vec<_>>()];
        all.extend(rows.iter().cloned());
        let table = RawTable::from_rows(all).expect("header row present");
        let ds = Dataset::from_table(table, &AliasTable::builtin(), &ParseOptions::default());
        (rows, ds)
    })
}

fn arb_statuses() -> impl Strategy<Value = BTreeSet<Status>> {
    prop::sample::subsequence(Status::ALL.to_vec(), 0..=3)
        .prop_map(|picked| picked.into_iter().collect())
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn status_follows_rule_order((rows, ds) in arb_dataset()) {
        prop_assert_eq!(ds.len(), rows.len());
        for (record, raw) in ds.records().iter().zip(&rows) {
            let received = parse_date(&raw[4], true).is_some();
            let has_po = !raw[3].trim().is_empty();
            let expected = if received {
                Status::Received
            } else if has_po {
                Status::PoIssued
            } else {
                Status::Pending
            };
            prop_assert_eq!(record.status, expected);
        }
    }

    #[test]
    fn pass_through_filter_is_identity((_rows, ds) in arb_dataset()) {
        let all: BTreeSet<Status> = Status::ALL.into_iter().collect();
        let expected: Vec<_> = ds.records().iter().collect();
        prop_assert_eq!(filter(&ds, None, &all), expected.clone());
        prop_assert_eq!(filter(&ds, Some(""), &BTreeSet::new()), expected);
    }

    #[test]
    fn filter_preserves_order_and_matches(
        (_rows, ds) in arb_dataset(),
        query in r"[a-zA-Z0-9]{0,3}",
        statuses in arb_statuses(),
    ) {
        let f = RecordFilter { query: Some(query), statuses, remarks: BTreeSet::new() };
        let out = f.apply(&ds);

        for pair in out.windows(2) {
            prop_assert!(pair[0].row < pair[1].row);
        }
        for r in &out {
            prop_assert!(f.matches(r));
        }
        let kept = ds.records().iter().filter(|r| f.matches(r)).count();
        prop_assert_eq!(out.len(), kept);
    }

    #[test]
    fn daily_count_matches_definition((_rows, ds) in arb_dataset(), day in 1u32..=5) {
        let date = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        let summary = daily_summary(&ds, date).unwrap();
        let expected = ds
            .records()
            .iter()
            .filter(|r| r.requisition_date == Some(date))
            .count();
        prop_assert_eq!(summary.count, expected);

        let value: f64 = summary.records.iter().filter_map(|r| r.total_value).sum();
        prop_assert!((summary.total_value - value).abs() < 1e-9);
    }
}
