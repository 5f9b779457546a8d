// Input loading: format detection, decoding, header reconciliation

use std::path::{Path, PathBuf};
use std::time::Instant;

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252, WINDOWS_874};
use prtrack_core::{AliasTable, Dataset, ParseOptions, RawTable};
use serde::Serialize;

use crate::error::LoadError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Csv,
    Tsv,
    Excel,
}

impl SourceFormat {
    /// Detect format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" | "txt" => Ok(Self::Csv),
            "tsv" | "tab" => Ok(Self::Tsv),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(Self::Excel),
            _ => Err(LoadError::UnsupportedFormat(ext)),
        }
    }

    pub(crate) fn tag(&self) -> &'static [u8] {
        match self {
            Self::Csv => b"csv",
            Self::Tsv => b"tsv",
            Self::Excel => b"excel",
        }
    }
}

/// Everything that affects how bytes become a dataset.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Tried in order after any byte-order mark.
    pub encodings: Vec<&'static Encoding>,
    /// Worksheet name for workbooks; first sheet when `None`.
    pub sheet: Option<String>,
    pub parse: ParseOptions,
    pub aliases: AliasTable,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            encodings: vec![UTF_8, WINDOWS_874, WINDOWS_1252],
            sheet: None,
            parse: ParseOptions::default(),
            aliases: AliasTable::builtin(),
        }
    }
}

impl LoadOptions {
    /// Replace the encoding list from WHATWG labels (`utf-8`, `tis-620`, `cp1252`, ...).
    pub fn with_encoding_labels<S: AsRef<str>>(mut self, labels: &[S]) -> Result<Self, LoadError> {
        let mut encodings = Vec::with_capacity(labels.len());
        for label in labels {
            let label = label.as_ref();
            let enc = Encoding::for_label(label.trim().as_bytes())
                .ok_or_else(|| LoadError::UnknownEncoding(label.to_string()))?;
            if !encodings.contains(&enc) {
                encodings.push(enc);
            }
        }
        if !encodings.is_empty() {
            self.encodings = encodings;
        }
        Ok(self)
    }
}

/// How the input was read. Shown by `columns` and in verbose logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceInfo {
    pub path: PathBuf,
    pub format: SourceFormat,
    /// Encoding used for delimited text; `None` for workbooks.
    pub encoding: Option<&'static str>,
    /// Field delimiter for delimited text.
    pub delimiter: Option<char>,
    /// Worksheet read from a workbook.
    pub sheet: Option<String>,
}

#[derive(Debug)]
pub struct Loaded {
    pub dataset: Dataset,
    pub source: SourceInfo,
}

/// Read and reconcile the file at `path`.
pub fn load(path: &Path, opts: &LoadOptions) -> Result<Loaded, LoadError> {
    let bytes = read_bytes(path)?;
    load_bytes(path, &bytes, opts)
}

pub(crate) fn read_bytes(path: &Path) -> Result<Vec<u8>, LoadError> {
    std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    })
}

/// Decode already-read bytes. `path` supplies the format and error context.
pub fn load_bytes(path: &Path, bytes: &[u8], opts: &LoadOptions) -> Result<Loaded, LoadError> {
    let format = SourceFormat::from_path(path)?;
    load_with_format(path, format, bytes, opts)
}

pub(crate) fn load_with_format(
    path: &Path,
    format: SourceFormat,
    bytes: &[u8],
    opts: &LoadOptions,
) -> Result<Loaded, LoadError> {
    let start = Instant::now();

    let (table, source) = match format {
        SourceFormat::Csv | SourceFormat::Tsv => {
            let delimiter = (format == SourceFormat::Tsv).then_some(b'\t');
            let decoded = crate::csv::read_delimited(bytes, &opts.encodings, delimiter)?
                .ok_or_else(|| LoadError::Empty(path.to_path_buf()))?;
            let source = SourceInfo {
                path: path.to_path_buf(),
                format,
                encoding: Some(decoded.encoding),
                delimiter: Some(decoded.delimiter as char),
                sheet: None,
            };
            (decoded.table, source)
        }
        SourceFormat::Excel => {
            let sheet = crate::xlsx::read_workbook(bytes, opts.sheet.as_deref())?
                .ok_or_else(|| LoadError::Empty(path.to_path_buf()))?;
            let source = SourceInfo {
                path: path.to_path_buf(),
                format,
                encoding: None,
                delimiter: None,
                sheet: Some(sheet.sheet),
            };
            (sheet.table, source)
        }
    };

    let dataset = build(table, opts);

    log::info!(
        "loaded {} record(s) from {} in {}ms",
        dataset.len(),
        path.display(),
        start.elapsed().as_millis()
    );

    Ok(Loaded { dataset, source })
}

fn build(table: RawTable, opts: &LoadOptions) -> Dataset {
    Dataset::from_table(table, &opts.aliases, &opts.parse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prtrack_core::{LogicalField, Status};

    #[test]
    fn format_from_extension() {
        assert_eq!(SourceFormat::from_path(Path::new("a.CSV")).unwrap(), SourceFormat::Csv);
        assert_eq!(SourceFormat::from_path(Path::new("a.tsv")).unwrap(), SourceFormat::Tsv);
        assert_eq!(SourceFormat::from_path(Path::new("a.xlsx")).unwrap(), SourceFormat::Excel);
        assert_eq!(SourceFormat::from_path(Path::new("a.ods")).unwrap(), SourceFormat::Excel);
        assert!(matches!(
            SourceFormat::from_path(Path::new("a.pdf")),
            Err(LoadError::UnsupportedFormat(ext)) if ext == "pdf"
        ));
        assert!(SourceFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn encoding_labels() {
        let opts = LoadOptions::default()
            .with_encoding_labels(&["utf-8", "tis-620", "utf8"])
            .unwrap();
        let names: Vec<&str> = opts.encodings.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["UTF-8", "windows-874"]);

        let err = LoadOptions::default().with_encoding_labels(&["klingon"]).unwrap_err();
        assert!(matches!(err, LoadError::UnknownEncoding(l) if l == "klingon"));
    }

    #[test]
    fn empty_label_list_keeps_defaults() {
        let opts = LoadOptions::default().with_encoding_labels::<&str>(&[]).unwrap();
        assert_eq!(opts.encodings.len(), 3);
    }

    #[test]
    fn bytes_to_dataset() {
        let csv = " PR NO. ;DATE;PO NO.;Received Date\nPR1;05/01/2024;;\nPR2;06/01/2024;PO9;\n;;;\n";
        let loaded = load_bytes(Path::new("x.csv"), csv.as_bytes(), &LoadOptions::default()).unwrap();

        assert_eq!(loaded.source.delimiter, Some(';'));
        assert_eq!(loaded.source.encoding, Some("UTF-8"));
        assert!(loaded.dataset.schema().has(LogicalField::PrNumber));

        let statuses: Vec<Status> = loaded.dataset.records().iter().map(|r| r.status).collect();
        assert_eq!(statuses, vec![Status::Pending, Status::PoIssued]);
        assert_eq!(
            loaded.dataset.records()[0].requisition_date,
            chrono::NaiveDate::from_ymd_opt(2024, 1, 5)
        );
    }

    #[test]
    fn header_only_file_is_an_empty_dataset() {
        let loaded = load_bytes(Path::new("x.csv"), b"PR NO.,DATE\n", &LoadOptions::default()).unwrap();
        assert!(loaded.dataset.is_empty());
    }

    #[test]
    fn blank_file_is_empty_error() {
        let err = load_bytes(Path::new("x.csv"), b"\n\n", &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Empty(_)));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load(Path::new("/nonexistent/dir/pr.csv"), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }
}
