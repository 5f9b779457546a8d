// End-to-end loading against fixture files: encodings, aliases, statuses, export.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use prtrack_core::{overview, LogicalField, RecordFilter, RemarkKeywords, Status};
use prtrack_io::export::{export_csv, export_xlsx, UTF8_BOM};
use prtrack_io::{load, load_bytes, DatasetCache, LoadError, LoadOptions, SourceFormat};
use tempfile::tempdir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

#[test]
fn pr_control_csv() {
    let loaded = load(&fixture("pr_control.csv"), &LoadOptions::default()).unwrap();
    let ds = &loaded.dataset;

    assert_eq!(loaded.source.format, SourceFormat::Csv);
    assert_eq!(loaded.source.encoding, Some("UTF-8"));
    assert_eq!(ds.headers()[0], "PR NO.");
    assert_eq!(ds.len(), 5);
    assert_eq!(ds.dropped_rows(), 1);

    let statuses: Vec<Status> = ds.records().iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![
            Status::Pending,
            Status::PoIssued,
            Status::Received,
            Status::Pending,
            Status::Received,
        ]
    );

    let first = &ds.records()[0];
    assert_eq!(first.pr_number, "1000101");
    assert_eq!(first.requisition_date, ymd(2024, 1, 5));
    assert_eq!(first.total_value, Some(1200.0));
    assert_eq!(first.requisitioner.as_deref(), Some("Somchai"));

    let negative = &ds.records()[3];
    assert_eq!(negative.total_value, Some(-300.0));

    let undated = &ds.records()[4];
    assert_eq!(undated.requisition_date, None);
    assert_eq!(undated.received_date, ymd(2024, 1, 15));
    assert_eq!(undated.total_value, None);
}

#[test]
fn overview_of_fixture() {
    let loaded = load(&fixture("pr_control.csv"), &LoadOptions::default()).unwrap();
    let ov = overview(&loaded.dataset, &RemarkKeywords::default());

    assert_eq!(ov.total, 5);
    assert_eq!(ov.by_status[&Status::Pending], 2);
    assert_eq!(ov.by_status[&Status::PoIssued], 1);
    assert_eq!(ov.by_status[&Status::Received], 2);
    let remarks = ov.remarks.unwrap();
    assert_eq!(remarks.pending, 3);
    assert_eq!(remarks.received, 2);
    assert_eq!(ov.total_value, Some(4250.0));
}

#[test]
fn sap_style_headers_resolve() {
    let loaded = load(&fixture("sap_export.csv"), &LoadOptions::default()).unwrap();
    let ds = &loaded.dataset;
    let schema = ds.schema();

    assert_eq!(loaded.source.delimiter, Some(';'));
    assert_eq!(
        schema.column(LogicalField::PrNumber).map(|c| c.name.as_str()),
        Some("Purchase Requisition")
    );
    assert_eq!(
        schema.column(LogicalField::Vendor).map(|c| c.name.as_str()),
        Some("Fixed Vendor")
    );
    assert!(!schema.has(LogicalField::Remark));
    assert!(!schema.has(LogicalField::Quantity));

    let statuses: Vec<Status> = ds.records().iter().map(|r| r.status).collect();
    assert_eq!(statuses, vec![Status::Pending, Status::Received]);
    assert_eq!(ds.records()[1].vendor.as_deref(), Some("Siam Parts"));
}

#[test]
fn decimal_comma_amounts_are_null() {
    let bytes = concat!(
        "Purchase Requisition;Total Value\n",
        "2000001;4.500,00\n",
        "2000002;1,5\n",
        "2000003;1.234,5\n",
        "2000004;12,500\n",
    );
    let loaded =
        load_bytes(Path::new("sap.csv"), bytes.as_bytes(), &LoadOptions::default()).unwrap();
    let values: Vec<Option<f64>> =
        loaded.dataset.records().iter().map(|r| r.total_value).collect();
    assert_eq!(values, vec![None, None, None, Some(12500.0)]);

    let ov = overview(&loaded.dataset, &RemarkKeywords::default());
    assert_eq!(ov.total_value, Some(12500.0));
}

#[test]
fn windows_874_file_decodes() {
    let src = std::fs::read_to_string(fixture("pr_control.csv")).unwrap();
    let (bytes, _, unmappable) = encoding_rs::WINDOWS_874.encode(&src);
    assert!(!unmappable);

    let loaded = load_bytes(Path::new("legacy.csv"), &bytes, &LoadOptions::default()).unwrap();
    assert_eq!(loaded.source.encoding, Some("windows-874"));
    assert_eq!(loaded.dataset.records()[2].remark.as_deref(), Some("เข้าแล้ว"));
}

#[test]
fn utf8_only_config_rejects_legacy_bytes() {
    let (bytes, _, _) = encoding_rs::WINDOWS_874.encode("PR NO.,REMARK\nPR1,รอ\n");
    let opts = LoadOptions::default().with_encoding_labels(&["utf-8"]).unwrap();

    let err = load_bytes(Path::new("legacy.csv"), &bytes, &opts).unwrap_err();
    assert!(matches!(err, LoadError::EncodingExhausted { ref attempts } if attempts.len() == 1));
    assert!(err.hint().is_some());
}

#[test]
fn alias_override_resolves_custom_header() {
    let csv = "เลขที่ PR,PO NO.\nPR1,PO1\n";
    let mut opts = LoadOptions::default();
    opts.aliases = opts.aliases.with_extra(LogicalField::PrNumber, ["เลขที่ PR"]);

    let loaded = load_bytes(Path::new("x.csv"), csv.as_bytes(), &opts).unwrap();
    assert_eq!(loaded.dataset.records()[0].pr_number, "PR1");
}

#[test]
fn exported_subset_reloads_with_same_fields() {
    let dir = tempdir().unwrap();
    let loaded = load(&fixture("pr_control.csv"), &LoadOptions::default()).unwrap();
    let ds = &loaded.dataset;
    let subset = RecordFilter::new()
        .statuses([Status::Pending, Status::Received])
        .apply(ds);

    let csv_path = dir.path().join("out.csv");
    export_csv(&csv_path, ds, &subset).unwrap();
    let bytes = std::fs::read(&csv_path).unwrap();
    assert!(bytes.starts_with(UTF8_BOM));

    let xlsx_path = dir.path().join("out.xlsx");
    export_xlsx(&xlsx_path, ds, &subset).unwrap();

    for path in [&csv_path, &xlsx_path] {
        let back = load(path, &LoadOptions::default()).unwrap();
        let reloaded = back.dataset.records();
        assert_eq!(reloaded.len(), subset.len(), "{}", path.display());
        for (a, b) in subset.iter().zip(reloaded) {
            assert_eq!(a.pr_number, b.pr_number);
            assert_eq!(a.requisition_date, b.requisition_date);
            assert_eq!(a.item_description, b.item_description);
            assert_eq!(a.po_number, b.po_number);
            assert_eq!(a.received_date, b.received_date);
            assert_eq!(a.total_value, b.total_value);
            assert_eq!(a.remark, b.remark);
            assert_eq!(a.status, b.status);
        }
    }
}

#[test]
fn cache_reuses_fixture_load() {
    let mut cache = DatasetCache::new(LoadOptions::default());
    let path = fixture("pr_control.csv");
    let a = cache.get_or_load(&path).unwrap();
    let b = cache.get_or_load(&path).unwrap();
    assert!(a.fresh && !b.fresh);
    assert_eq!(a.hash, b.hash);
}
