use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Display width of a string. Thai combining marks take no columns.
pub(crate) fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Cut `s` to at most `width` display columns, marking the cut with "..".
pub(crate) fn truncate_display(s: &str, width: usize) -> String {
    if display_width(s) <= width {
        return s.to_string();
    }
    if width < 3 {
        return s
            .chars()
            .find(|ch| ch.width().unwrap_or(0) <= width)
            .map(String::from)
            .unwrap_or_default();
    }

    let budget = width - 2;
    let mut used = 0;
    let mut out = String::new();
    for ch in s.chars() {
        let cw = ch.width().unwrap_or(0);
        if used + cw > budget {
            break;
        }
        used += cw;
        out.push(ch);
    }
    out.push_str("..");
    out
}

/// Pad with spaces (or truncate) to exactly `width` display columns.
pub(crate) fn pad_right(s: &str, width: usize) -> String {
    let s = truncate_display(s, width);
    let sw = display_width(&s);
    format!("{s}{}", " ".repeat(width.saturating_sub(sw)))
}

pub(crate) fn pad_left(s: &str, width: usize) -> String {
    let s = truncate_display(s, width);
    let sw = display_width(&s);
    format!("{}{s}", " ".repeat(width.saturating_sub(sw)))
}

/// `1234567.5` -> `1,234,567.50`
pub(crate) fn format_amount(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{frac}")
}

/// Column alignment for [`Table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Align {
    Left,
    Right,
}

/// Plain-text table sized to its content, each column capped at `max_width`.
pub(crate) struct Table {
    headers: Vec<String>,
    align: Vec<Align>,
    rows: Vec<Vec<String>>,
    max_width: usize,
}

impl Table {
    pub(crate) fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        let align = vec![Align::Left; headers.len()];
        Self {
            headers,
            align,
            rows: Vec::new(),
            max_width: 40,
        }
    }

    pub(crate) fn align(mut self, col: usize, align: Align) -> Self {
        if let Some(a) = self.align.get_mut(col) {
            *a = align;
        }
        self
    }

    pub(crate) fn max_width(mut self, width: usize) -> Self {
        self.max_width = width.max(3);
        self
    }

    pub(crate) fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub(crate) fn render(&self) -> String {
        let widths: Vec<usize> = (0..self.headers.len())
            .map(|c| {
                let cells = self.rows.iter().filter_map(|r| r.get(c));
                std::iter::once(&self.headers[c])
                    .chain(cells)
                    .map(|s| display_width(s))
                    .max()
                    .unwrap_or(0)
                    .min(self.max_width)
            })
            .collect();

        let line = |cells: &[String]| -> String {
            let parts: Vec<String> = widths
                .iter()
                .enumerate()
                .map(|(c, &w)| {
                    let cell = cells.get(c).map(String::as_str).unwrap_or("");
                    match self.align[c] {
                        Align::Left => pad_right(cell, w),
                        Align::Right => pad_left(cell, w),
                    }
                })
                .collect();
            parts.join("  ").trim_end().to_string()
        };

        let mut out = line(&self.headers);
        out.push('\n');
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&rule.join("  "));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&line(row));
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thai_marks_are_zero_width() {
        // "เข้า": the tone mark above ข takes no column
        assert_eq!(display_width("เข้า"), 3);
        assert_eq!(display_width("PR"), 2);
    }

    #[test]
    fn truncation() {
        assert_eq!(truncate_display("Bearing", 10), "Bearing");
        assert_eq!(truncate_display("Bearing 6204", 6), "Bear..");
        assert_eq!(truncate_display("Bearing", 2), "B");
        assert_eq!(truncate_display("", 0), "");
    }

    #[test]
    fn padding_keeps_width() {
        assert_eq!(pad_right("ab", 4), "ab  ");
        assert_eq!(pad_left("ab", 4), "  ab");
        assert_eq!(display_width(&pad_right("รอของเข้า", 12)), 12);
        assert_eq!(pad_right("abcdef", 5), "abc..");
    }

    #[test]
    fn amounts() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(850.0), "850.00");
        assert_eq!(format_amount(1200.5), "1,200.50");
        assert_eq!(format_amount(1234567.891), "1,234,567.89");
        assert_eq!(format_amount(-300.0), "-300.00");
        assert_eq!(format_amount(-0.001), "0.00");
    }

    #[test]
    fn table_layout() {
        let mut t = Table::new(["PR", "Amount"]).align(1, Align::Right);
        t.push(vec!["1000101".into(), "1,200.00".into()]);
        t.push(vec!["7".into(), "5.00".into()]);
        let out = t.render();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "PR         Amount");
        assert_eq!(lines[1], "-------  --------");
        assert_eq!(lines[2], "1000101  1,200.00");
        assert_eq!(lines[3], "7            5.00");
    }

    #[test]
    fn table_caps_wide_columns() {
        let mut t = Table::new(["Item"]).max_width(6);
        t.push(vec!["Hydraulic hose".into()]);
        assert_eq!(t.render().lines().nth(2), Some("Hydr.."));
    }
}
