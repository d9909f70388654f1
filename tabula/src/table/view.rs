//! Renderable output of a table.

use std::fmt;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::{ColumnWidth, RowKey, SortDirection};

/// What the host should display for one table render.
#[derive(Debug, Clone, PartialEq)]
pub enum TableView {
    /// Loading indicator only. Data and sort state are not shown.
    Loading(String),
    /// Empty-state message only.
    Empty(String),
    /// Header and rows in display order.
    Rows {
        class_name: String,
        headers: Vec<HeaderView>,
        rows: Vec<RowView>,
    },
}

/// One column header.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderView {
    pub key: String,
    pub label: String,
    pub sortable: bool,
    pub width: ColumnWidth,
    /// Set when this column is the active sort field.
    pub sorted: Option<SortDirection>,
}

impl HeaderView {
    /// Label with the sort indicator appended, if any.
    pub fn display_label(&self) -> String {
        match self.sorted {
            Some(direction) => format!("{} {}", self.label, direction.indicator()),
            None => self.label.clone(),
        }
    }
}

/// One displayed row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub key: RowKey,
    /// Index into the caller's input sequence.
    pub index: usize,
    /// Whether activating the row invokes a callback.
    pub clickable: bool,
    /// Rendered cell text, one per column.
    pub cells: Vec<String>,
}

impl TableView {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty(_))
    }

    /// Displayed rows, empty for the loading and empty states.
    pub fn rows(&self) -> &[RowView] {
        match self {
            Self::Rows { rows, .. } => rows,
            _ => &[],
        }
    }

    /// Column headers, empty for the loading and empty states.
    pub fn headers(&self) -> &[HeaderView] {
        match self {
            Self::Rows { headers, .. } => headers,
            _ => &[],
        }
    }

    /// Cell text of column `col` in display order.
    pub fn column_text(&self, col: usize) -> Vec<&str> {
        self.rows()
            .iter()
            .filter_map(|row| row.cells.get(col).map(String::as_str))
            .collect()
    }
}

/// Pad or truncate `text` to exactly `width` terminal columns.
fn fit(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.extend(std::iter::repeat_n(' ', width - used));
    out
}

/// Join fitted cells into one grid line.
fn join_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let parts: Vec<String> = cells.zip(widths).map(|(cell, &w)| fit(cell, w)).collect();
    parts.join(" | ").trim_end().to_string()
}

impl fmt::Display for TableView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (headers, rows) = match self {
            Self::Loading(message) | Self::Empty(message) => return f.write_str(message),
            Self::Rows { headers, rows, .. } => (headers, rows),
        };

        let labels: Vec<String> = headers.iter().map(HeaderView::display_label).collect();
        let widths: Vec<usize> = headers
            .iter()
            .enumerate()
            .map(|(i, header)| match header.width {
                ColumnWidth::Fixed(w) => w as usize,
                _ => rows
                    .iter()
                    .filter_map(|row| row.cells.get(i))
                    .map(|cell| cell.width())
                    .chain(std::iter::once(labels[i].width()))
                    .max()
                    .unwrap_or(0),
            })
            .collect();

        writeln!(f, "{}", join_line(labels.iter().map(String::as_str), &widths))?;
        let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
        write!(f, "{}", rule.join("-+-"))?;
        for row in rows {
            write!(f, "\n{}", join_line(row.cells.iter().map(String::as_str), &widths))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(key: &str, width: ColumnWidth, sorted: Option<SortDirection>) -> HeaderView {
        HeaderView {
            key: key.into(),
            label: key.to_uppercase(),
            sortable: true,
            width,
            sorted,
        }
    }

    #[test]
    fn test_fit_pads_and_truncates() {
        assert_eq!(fit("ab", 4), "ab  ");
        assert_eq!(fit("abcdef", 3), "abc");
        // wide characters take two columns
        assert_eq!(fit("日本語", 5), "日本 ");
    }

    #[test]
    fn test_display_grid() {
        let view = TableView::Rows {
            class_name: String::new(),
            headers: vec![
                header("name", ColumnWidth::Auto, None),
                header("age", ColumnWidth::Fixed(5), Some(SortDirection::Ascending)),
            ],
            rows: vec![RowView {
                key: RowKey::Position(0),
                index: 0,
                clickable: false,
                cells: vec!["Jane Smith".into(), "25".into()],
            }],
        };

        let text = view.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "NAME       | AGE ↑");
        assert_eq!(lines[1], "-----------+------");
        assert_eq!(lines[2], "Jane Smith | 25");
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(TableView::Loading("Loading...".into()).to_string(), "Loading...");
        assert_eq!(TableView::Empty("Nothing".into()).to_string(), "Nothing");
    }
}
