// CSV/TSV import with encoding fallback

use encoding_rs::Encoding;
use prtrack_core::RawTable;

use crate::error::{DecodeAttempt, LoadError};

/// A delimited file decoded into a raw table.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub table: RawTable,
    pub encoding: &'static str,
    pub delimiter: u8,
}

/// Outcome of parsing one decoded text.
enum Parsed {
    Table(RawTable, u8),
    Empty,
}

/// Decode `bytes` with each candidate encoding in order and parse the first
/// one that decodes cleanly.
///
/// A byte-order mark, when present, puts its encoding in front of the list.
/// `delimiter` of `None` sniffs it from the first lines.
pub fn read_delimited(
    bytes: &[u8],
    encodings: &[&'static Encoding],
    delimiter: Option<u8>,
) -> Result<Option<Decoded>, LoadError> {
    let mut candidates: Vec<(&'static Encoding, &[u8])> = Vec::new();
    if let Some((enc, bom_len)) = Encoding::for_bom(bytes) {
        candidates.push((enc, &bytes[bom_len..]));
    }
    for &enc in encodings {
        if !candidates.iter().any(|(e, _)| *e == enc) {
            candidates.push((enc, bytes));
        }
    }

    let mut attempts = Vec::new();

    for (enc, body) in candidates {
        log::debug!("trying encoding {}", enc.name());

        let Some(text) = enc.decode_without_bom_handling_and_without_replacement(body) else {
            attempts.push(DecodeAttempt {
                encoding: enc.name(),
                reason: "malformed byte sequence".into(),
            });
            continue;
        };

        match parse_text(&text, delimiter) {
            Ok(Parsed::Table(table, delim)) => {
                log::debug!(
                    "decoded as {} with delimiter {:?}",
                    enc.name(),
                    delim as char
                );
                return Ok(Some(Decoded {
                    table,
                    encoding: enc.name(),
                    delimiter: delim,
                }));
            }
            Ok(Parsed::Empty) => return Ok(None),
            Err(e) => attempts.push(DecodeAttempt {
                encoding: enc.name(),
                reason: e.to_string(),
            }),
        }
    }

    Err(LoadError::EncodingExhausted { attempts })
}

fn parse_text(text: &str, delimiter: Option<u8>) -> Result<Parsed, ::csv::Error> {
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(text));

    let mut reader = ::csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    Ok(match RawTable::from_rows(rows) {
        Some(table) => Parsed::Table(table, delimiter),
        None => Parsed::Empty,
    })
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
pub fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(10)
        .collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                ::csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Must produce >1 field on the first line to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Lines agreeing with line 1, weighted by field count
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{UTF_8, WINDOWS_1252, WINDOWS_874};

    const DEFAULT: &[&Encoding] = &[UTF_8, WINDOWS_874, WINDOWS_1252];

    #[test]
    fn test_sniff_semicolon_delimiter() {
        let content = "PR NO.;QTY;REMARK\nPR1;30;รอ\nPR2;25;ครบ\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_comma_delimiter() {
        let content = "PR NO.,QTY,REMARK\nPR1,30,x\nPR2,25,y\n";
        assert_eq!(sniff_delimiter(content), b',');
    }

    #[test]
    fn test_sniff_tab_delimiter() {
        let content = "PR NO.\tQTY\tREMARK\nPR1\t30\tx\nPR2\t25\ty\n";
        assert_eq!(sniff_delimiter(content), b'\t');
    }

    #[test]
    fn test_sniff_semicolon_with_commas_in_values() {
        let content = "PR NO.;ITEM DESCRIPTION;QTY\nPR1;\"Bolt, hex, M8\";10\nPR2;\"Nut\";5\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_skips_leading_blank_lines() {
        let content = "\n\nPR NO.|QTY\nPR1|1\n";
        assert_eq!(sniff_delimiter(content), b'|');
    }

    #[test]
    fn utf8_decodes_first() {
        let bytes = "PR NO.,REMARK\nPR1,รอของ\n".as_bytes();
        let decoded = read_delimited(bytes, DEFAULT, None).unwrap().unwrap();
        assert_eq!(decoded.encoding, "UTF-8");
        assert_eq!(decoded.table.rows[0][1], "รอของ");
    }

    #[test]
    fn bom_is_stripped_and_preferred() {
        let mut bytes = b"\xEF\xBB\xBF".to_vec();
        bytes.extend_from_slice(b"PR NO.,QTY\nPR1,2\n");
        let decoded = read_delimited(&bytes, &[WINDOWS_1252], None).unwrap().unwrap();
        assert_eq!(decoded.encoding, "UTF-8");
        assert_eq!(decoded.table.headers[0], "PR NO.");
    }

    #[test]
    fn thai_windows_874_falls_back() {
        let (bytes, _, unmappable) = WINDOWS_874.encode("PR NO.,REMARK\nPR1,เข้าแล้ว\n");
        assert!(!unmappable);
        let decoded = read_delimited(&bytes, DEFAULT, None).unwrap().unwrap();
        assert_eq!(decoded.encoding, "windows-874");
        assert_eq!(decoded.table.rows[0][1], "เข้าแล้ว");
    }

    #[test]
    fn exhausted_names_every_attempt() {
        // 0xFF is unmapped in windows-874 and invalid UTF-8
        let bytes = b"PR NO.,QTY\nPR1,\xFF\n";
        let err = read_delimited(bytes, &[UTF_8, WINDOWS_874], None).unwrap_err();
        match &err {
            LoadError::EncodingExhausted { attempts } => {
                let names: Vec<&str> = attempts.iter().map(|a| a.encoding).collect();
                assert_eq!(names, vec!["UTF-8", "windows-874"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.hint().unwrap().contains("UTF-8"));
    }

    #[test]
    fn empty_input_has_no_table() {
        assert!(read_delimited(b"", DEFAULT, None).unwrap().is_none());
        assert!(read_delimited(b"\n\n,,\n", DEFAULT, None).unwrap().is_none());
    }

    #[test]
    fn explicit_delimiter_wins() {
        let decoded = read_delimited(b"a;b\tc\n1;2\t3\n", DEFAULT, Some(b'\t'))
            .unwrap()
            .unwrap();
        assert_eq!(decoded.table.headers, vec!["a;b", "c"]);
        assert_eq!(decoded.delimiter, b'\t');
    }
}
