//! Cell coercion. Malformed values become `None`; nothing here fails a load.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// Row-level parsing knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Read `01/02/2024` as 1 February (true) or January 2 (false).
    pub day_first: bool,
    /// Drop rows whose PR number is blank (only when the PR column resolves).
    pub drop_blank_pr: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            day_first: true,
            drop_blank_pr: true,
        }
    }
}

const ISO_DATES: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];
const ISO_DATETIMES: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
];
const DAY_FIRST: &[&str] = &["%d/%m/%Y", "%d-%m-%Y"];
const MONTH_FIRST: &[&str] = &["%m/%d/%Y", "%m-%d-%Y"];
const ALWAYS: &[&str] = &["%d.%m.%Y", "%d-%b-%Y", "%d %b %Y", "%b %d, %Y"];
const SHORT_YEAR_DAY_FIRST: &[&str] = &["%d/%m/%y", "%d.%m.%y"];
const SHORT_YEAR_MONTH_FIRST: &[&str] = &["%m/%d/%y"];

/// Parse a date cell. Tries the whole cell first, then its first
/// whitespace-separated token (so `05/01/2024 10:30` still yields a date).
pub fn parse_date(raw: &str, day_first: bool) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    parse_date_exact(s, day_first).or_else(|| {
        let head = s.split_whitespace().next()?;
        if head.len() == s.len() {
            None
        } else {
            parse_date_exact(head, day_first)
        }
    })
}

fn parse_date_exact(s: &str, day_first: bool) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in ISO_DATETIMES {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    let (preferred, fallback, short_preferred, short_fallback) = if day_first {
        (DAY_FIRST, MONTH_FIRST, SHORT_YEAR_DAY_FIRST, SHORT_YEAR_MONTH_FIRST)
    } else {
        (MONTH_FIRST, DAY_FIRST, SHORT_YEAR_MONTH_FIRST, SHORT_YEAR_DAY_FIRST)
    };

    // Four-digit years first; chrono's %Y also accepts "24", so reject those
    // and let the %y patterns handle them.
    ISO_DATES
        .iter()
        .chain(preferred)
        .chain(ALWAYS)
        .chain(fallback)
        .find_map(|fmt| {
            NaiveDate::parse_from_str(s, fmt)
                .ok()
                .filter(|d| d.year() >= 1000)
        })
        .or_else(|| {
            short_preferred
                .iter()
                .chain(short_fallback)
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        })
}

/// Parse a numeric cell: thousands separators, currency marks, `(x)` and
/// trailing-minus negatives are accepted.
pub fn parse_number(raw: &str) -> Option<f64> {
    let mut s = raw.trim();
    if s.is_empty() {
        return None;
    }

    let mut negative = false;
    if let Some(inner) = s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        negative = true;
        s = inner.trim();
    }
    if let Some(head) = s.strip_suffix('-') {
        negative = !negative;
        s = head.trim();
    }

    for mark in ["฿", "$", "THB", "thb"] {
        if let Some(rest) = s.strip_prefix(mark) {
            s = rest.trim();
        }
    }
    for mark in ["บาท", "THB", "thb"] {
        if let Some(rest) = s.strip_suffix(mark) {
            s = rest.trim();
        }
    }

    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    let cleaned = strip_thousands(&compact)?;
    if cleaned.is_empty() {
        return None;
    }
    let n: f64 = cleaned.parse().ok()?;
    if !n.is_finite() {
        return None;
    }
    Some(if negative { -n } else { n })
}

/// Remove thousands separators. A comma is only valid between groups of
/// exactly three digits in the integer part (`1,234,567.89`), so decimal
/// commas (`4.500,00`, `1,5`) and Indian grouping (`12,34,567`) give `None`.
fn strip_thousands(s: &str) -> Option<String> {
    if !s.contains(',') {
        return Some(s.to_string());
    }
    let (int_part, frac) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s, None),
    };
    if frac.is_some_and(|f| f.contains(',')) {
        return None;
    }
    let digits = int_part.strip_prefix(['-', '+']).unwrap_or(int_part);

    let mut groups = digits.split(',');
    let lead = groups.next()?;
    if lead.is_empty() || lead.len() > 3 || !lead.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !groups.all(|g| g.len() == 3 && g.bytes().all(|b| b.is_ascii_digit())) {
        return None;
    }

    let mut out = int_part.replace(',', "");
    if let Some(f) = frac {
        out.push('.');
        out.push_str(f);
    }
    Some(out)
}

/// Trimmed text, `None` when blank.
pub fn non_empty(raw: &str) -> Option<String> {
    let s = raw.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
