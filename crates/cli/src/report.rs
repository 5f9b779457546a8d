// Text and JSON renderings of the views

use std::fmt::Write as _;

use prtrack_core::summary::DayTotals;
use prtrack_core::{DailySummary, Dataset, LogicalField, Overview, Record, Status, TrackError};
use prtrack_io::{SourceFormat, SourceInfo};
use serde::Serialize;

use crate::util::{format_amount, Align, Table};

/// Widest a free-text column may grow in a text table.
const TEXT_COLUMN_WIDTH: usize = 36;

fn date_cell(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

fn amount_cell(value: Option<f64>) -> String {
    value.map(format_amount).unwrap_or_default()
}

pub fn source_line(source: &SourceInfo, dataset: &Dataset) -> String {
    let mut line = format!("{} ({} records", source.path.display(), dataset.len());
    if dataset.dropped_rows() > 0 {
        let _ = write!(line, ", {} without PR number skipped", dataset.dropped_rows());
    }
    line.push(')');
    line
}

// ---------------------------------------------------------------------------
// summary
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct SummaryJson<'a> {
    pub source: &'a SourceInfo,
    pub dropped_rows: usize,
    pub overview: &'a Overview,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<TrendJson>,
}

/// Trend result, or why it is unavailable.
#[derive(Serialize)]
#[serde(untagged)]
pub enum TrendJson {
    Days(Vec<DayTotals>),
    Unavailable { unavailable: String },
}

impl From<Result<Vec<DayTotals>, TrackError>> for TrendJson {
    fn from(result: Result<Vec<DayTotals>, TrackError>) -> Self {
        match result {
            Ok(days) => Self::Days(days),
            Err(e) => Self::Unavailable {
                unavailable: e.to_string(),
            },
        }
    }
}

pub fn overview_text(ov: &Overview, dataset: &Dataset) -> String {
    let mut out = String::new();

    let mut table = Table::new(["Status", "Count"]).align(1, Align::Right);
    for status in Status::ALL {
        let count = ov.by_status.get(&status).copied().unwrap_or(0);
        table.push(vec![status.label().to_string(), count.to_string()]);
    }
    table.push(vec!["Total".into(), ov.total.to_string()]);
    out.push_str(&table.render());
    out.push('\n');

    match ov.remarks {
        Some(r) => {
            let _ = writeln!(out, "Remarks:      {} pending, {} received", r.pending, r.received);
        }
        None => {
            let why = unavailable_note(dataset, LogicalField::Remark);
            let _ = writeln!(out, "Remarks:      unavailable ({why})");
        }
    }
    match ov.total_value {
        Some(v) => {
            let _ = writeln!(out, "Total value:  {} THB", format_amount(v));
        }
        None => {
            let why = unavailable_note(dataset, LogicalField::TotalValue);
            let _ = writeln!(out, "Total value:  unavailable ({why})");
        }
    }
    out
}

pub fn trend_text(days: &[DayTotals]) -> String {
    if days.is_empty() {
        return "No dated records.\n".into();
    }
    let mut table = Table::new(["Date", "PRs", "Value"])
        .align(1, Align::Right)
        .align(2, Align::Right);
    for d in days {
        table.push(vec![
            d.date.format("%Y-%m-%d").to_string(),
            d.count.to_string(),
            format_amount(d.total_value),
        ]);
    }
    table.render()
}

fn unavailable_note(dataset: &Dataset, field: LogicalField) -> String {
    let looked = dataset.schema().looked_for(field);
    if looked.is_empty() {
        format!("no {field} column")
    } else {
        format!("no {field} column; looked for {}", looked.join(", "))
    }
}

// ---------------------------------------------------------------------------
// list / daily
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ListJson<'a> {
    pub total: usize,
    pub matched: usize,
    pub records: &'a [&'a Record],
}

pub fn records_text(records: &[&Record]) -> String {
    let mut table = Table::new([
        "PR", "Date", "Item", "PO", "Received", "Value", "Remark", "Status",
    ])
    .align(5, Align::Right)
    .max_width(TEXT_COLUMN_WIDTH);

    for r in records {
        table.push(vec![
            r.pr_number.clone(),
            date_cell(r.requisition_date),
            r.item_description.clone(),
            r.po_number.clone().unwrap_or_default(),
            date_cell(r.received_date),
            amount_cell(r.total_value),
            r.remark.clone().unwrap_or_default(),
            r.status.label().to_string(),
        ]);
    }
    table.render()
}

pub fn daily_text(day: &DailySummary<'_>) -> String {
    let date = day.date.format("%Y-%m-%d");
    if day.is_empty() {
        return format!("No PRs opened on {date}.\n");
    }
    let mut out = format!(
        "{date}: {} PR(s), total value {} THB\n\n",
        day.count,
        format_amount(day.total_value)
    );
    out.push_str(&records_text(&day.records));
    out
}

// ---------------------------------------------------------------------------
// columns
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct FieldReport {
    pub field: LogicalField,
    pub column: Option<String>,
    pub index: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub looked_for: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub disables: Vec<&'static str>,
}

#[derive(Serialize)]
pub struct ColumnsJson<'a> {
    pub source: &'a SourceInfo,
    pub headers: &'a [String],
    pub fields: Vec<FieldReport>,
}

pub fn field_reports(dataset: &Dataset) -> Vec<FieldReport> {
    let schema = dataset.schema();
    LogicalField::ALL
        .into_iter()
        .map(|field| match schema.column(field) {
            Some(col) => FieldReport {
                field,
                column: Some(col.name.clone()),
                index: Some(col.index),
                looked_for: Vec::new(),
                disables: Vec::new(),
            },
            None => FieldReport {
                field,
                column: None,
                index: None,
                looked_for: schema.looked_for(field).to_vec(),
                disables: field.dependent_features().to_vec(),
            },
        })
        .collect()
}

pub fn columns_text(source: &SourceInfo, dataset: &Dataset) -> String {
    let mut out = String::new();
    let format = match source.format {
        SourceFormat::Csv => "csv",
        SourceFormat::Tsv => "tsv",
        SourceFormat::Excel => "workbook",
    };
    let _ = write!(out, "{}: {format}", source.path.display());
    if let Some(enc) = source.encoding {
        let _ = write!(out, ", {enc}");
    }
    if let Some(d) = source.delimiter {
        let shown = if d == '\t' { "\\t".to_string() } else { d.to_string() };
        let _ = write!(out, ", delimiter '{shown}'");
    }
    if let Some(sheet) = &source.sheet {
        let _ = write!(out, ", sheet '{sheet}'");
    }
    let _ = writeln!(out, ", {} columns\n", dataset.headers().len());

    let mut table = Table::new(["Field", "Column", "Note"]).max_width(60);
    for report in field_reports(dataset) {
        let (column, note) = match &report.column {
            Some(name) => (name.clone(), String::new()),
            None if report.disables.is_empty() => ("-".into(), "not found".into()),
            None => ("-".into(), format!("not found; disables {}", report.disables.join(", "))),
        };
        table.push(vec![report.field.key().to_string(), column, note]);
    }
    out.push_str(&table.render());
    out
}
