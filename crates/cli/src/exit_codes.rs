//! CLI Exit Code Registry
//!
//! Single source of truth for `prtrack` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                                   |
//! |------|-----------------------------------------------------------|
//! | 0    | Success                                                   |
//! | 1    | General error (unspecified)                               |
//! | 2    | Usage error (bad arguments, unknown status)               |
//! | 3    | No input: no PR control file named, configured or found   |
//! | 4    | Input could not be decoded or parsed                      |
//! | 5    | Settings file unreadable or invalid                       |
//! | 6    | View unavailable: a required column is missing            |
//! | 7    | Export could not be written                               |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant below
//! 2. Document what triggers it
//! 3. Update the table above

use prtrack_io::LoadError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unknown status or date.
pub const EXIT_USAGE: u8 = 2;

/// No PR control file to work on. Informational, not a failure of the file.
pub const EXIT_NO_INPUT: u8 = 3;

/// File exists but could not be decoded (encoding, format, empty, unreadable).
pub const EXIT_LOAD: u8 = 4;

/// Settings file could not be read or failed validation.
pub const EXIT_CONFIG: u8 = 5;

/// The requested view needs a logical field that did not resolve.
pub const EXIT_UNAVAILABLE: u8 = 6;

/// Writing the export failed.
pub const EXIT_EXPORT: u8 = 7;

/// Map a load error to its exit code.
pub fn load_exit_code(err: &LoadError) -> u8 {
    match err {
        LoadError::NotFound(_) => EXIT_NO_INPUT,
        LoadError::UnknownEncoding(_) => EXIT_CONFIG,
        LoadError::Export(_) => EXIT_EXPORT,
        LoadError::Unreadable { .. }
        | LoadError::UnsupportedFormat(_)
        | LoadError::EncodingExhausted { .. }
        | LoadError::Spreadsheet(_)
        | LoadError::Empty(_) => EXIT_LOAD,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_NO_INPUT,
            EXIT_LOAD,
            EXIT_CONFIG,
            EXIT_UNAVAILABLE,
            EXIT_EXPORT,
        ];
        let mut sorted = codes.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), codes.len());
    }

    #[test]
    fn load_errors_map() {
        assert_eq!(load_exit_code(&LoadError::NotFound(PathBuf::from("x"))), EXIT_NO_INPUT);
        assert_eq!(
            load_exit_code(&LoadError::EncodingExhausted { attempts: vec![] }),
            EXIT_LOAD
        );
        assert_eq!(load_exit_code(&LoadError::Export("disk full".into())), EXIT_EXPORT);
    }
}
