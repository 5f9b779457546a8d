use std::fmt;
use std::path::PathBuf;

/// One failed decode/parse attempt while reading a delimited file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeAttempt {
    pub encoding: &'static str,
    pub reason: String,
}

#[derive(Debug)]
pub enum LoadError {
    /// Input file does not exist.
    NotFound(PathBuf),
    /// File exists but could not be read.
    Unreadable { path: PathBuf, reason: String },
    /// Extension is not a known tabular format.
    UnsupportedFormat(String),
    /// Encoding label in settings that encoding_rs does not know.
    UnknownEncoding(String),
    /// Every configured encoding failed.
    EncodingExhausted { attempts: Vec<DecodeAttempt> },
    /// calamine could not open or read the workbook.
    Spreadsheet(String),
    /// No header row found.
    Empty(PathBuf),
    /// Writing an export failed.
    Export(String),
}

impl LoadError {
    /// Remediation shown under the error message.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::EncodingExhausted { .. } => {
                Some("re-save the file as UTF-8 CSV (Excel: Save As > CSV UTF-8)")
            }
            Self::UnsupportedFormat(_) => Some("supported formats: csv, tsv, txt, xlsx, xlsm, xls, xlsb, ods"),
            Self::UnknownEncoding(_) => Some("use a WHATWG label such as utf-8, windows-874 or windows-1252"),
            Self::Empty(_) => Some("the file needs a header row naming its columns"),
            _ => None,
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "file not found: {}", path.display()),
            Self::Unreadable { path, reason } => {
                write!(f, "cannot read {}: {reason}", path.display())
            }
            Self::UnsupportedFormat(ext) => write!(f, "unsupported file type: '{ext}'"),
            Self::UnknownEncoding(label) => write!(f, "unknown encoding: '{label}'"),
            Self::EncodingExhausted { attempts } => {
                write!(f, "could not decode file with any configured encoding")?;
                for a in attempts {
                    write!(f, "; {}: {}", a.encoding, a.reason)?;
                }
                Ok(())
            }
            Self::Spreadsheet(msg) => write!(f, "spreadsheet error: {msg}"),
            Self::Empty(path) => write!(f, "no header row in {}", path.display()),
            Self::Export(msg) => write!(f, "export failed: {msg}"),
        }
    }
}

impl std::error::Error for LoadError {}
