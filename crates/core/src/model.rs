use std::collections::HashSet;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::TrackError;
use crate::schema::Schema;

// ---------------------------------------------------------------------------
// Raw table
// ---------------------------------------------------------------------------

/// Header row plus string cells, exactly as read from the source file.
///
/// Every row has `headers.len()` cells. Header names are trimmed, blank names
/// become `Unnamed: <index>` and repeated names get a `.<n>` suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Build a table from raw rows. Leading blank rows are skipped and the
    /// first non-blank row becomes the header. Returns `None` when there is
    /// no header row at all.
    pub fn from_rows<I>(rows: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        let mut rows = rows.into_iter().skip_while(|r| is_blank(r));
        let headers = normalize_headers(rows.next()?);
        let width = headers.len();

        let rows = rows
            .filter(|r| !is_blank(r))
            .map(|mut r| {
                r.resize(width, String::new());
                r
            })
            .collect();

        Some(Self { headers, rows })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}

fn normalize_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(raw.len());

    for (i, cell) in raw.into_iter().enumerate() {
        let trimmed = cell.trim_start_matches('\u{feff}').trim();
        let base = if trimmed.is_empty() {
            format!("Unnamed: {i}")
        } else {
            trimmed.to_string()
        };

        let mut name = base.clone();
        let mut n = 1;
        while seen.contains(&name) {
            name = format!("{base}.{n}");
            n += 1;
        }
        seen.insert(name.clone());
        out.push(name);
    }

    out
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Derived procurement status. Ordered by lifecycle stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    PoIssued,
    Received,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Pending, Status::PoIssued, Status::Received];

    /// Human label used in tables and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::PoIssued => "PO Issued",
            Self::Received => "Received",
        }
    }

    /// Stable machine key (matches the serde representation).
    pub fn key(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PoIssued => "po_issued",
            Self::Received => "received",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Status {
    type Err = TrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_lowercase();
        match norm.as_str() {
            "pending" => Ok(Self::Pending),
            "poissued" | "po" => Ok(Self::PoIssued),
            "received" => Ok(Self::Received),
            _ => Err(TrackError::UnknownStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Record + Dataset
// ---------------------------------------------------------------------------

/// One source row, resolved into logical fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// Index into the source table's data rows.
    pub row: usize,
    pub pr_number: String,
    pub requisition_date: Option<NaiveDate>,
    pub item_description: String,
    pub po_number: Option<String>,
    pub received_date: Option<NaiveDate>,
    pub quantity: Option<f64>,
    pub total_value: Option<f64>,
    pub requisitioner: Option<String>,
    pub vendor: Option<String>,
    pub remark: Option<String>,
    pub status: Status,
}

/// Immutable result of one file load.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub(crate) table: RawTable,
    pub(crate) schema: Schema,
    pub(crate) records: Vec<Record>,
    pub(crate) dropped_rows: usize,
}

impl Dataset {
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Post-trim column names, in source order.
    pub fn headers(&self) -> &[String] {
        &self.table.headers
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Original cells of the row a record was built from.
    pub fn source_row(&self, record: &Record) -> &[String] {
        self.table.rows.get(record.row).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Rows discarded at load time because their PR number was blank.
    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }
}
