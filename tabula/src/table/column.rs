//! Column descriptors.

use std::fmt;
use std::sync::Arc;

use super::CellValue;

/// Cell renderer: (extracted cell value, full row) to display text.
pub type CellRenderer<R> = Arc<dyn Fn(&CellValue, &R) -> String + Send + Sync>;

/// Column width hint.
///
/// Not used by sorting or filtering. The plain-text view pads and truncates
/// `Fixed` columns; other hints size to content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ColumnWidth {
    /// Size to content.
    #[default]
    Auto,
    /// Fixed width in characters.
    Fixed(u16),
    /// Opaque host hint such as `"120px"` or `"20%"`.
    Hint(String),
}

/// Describes one displayable dimension of a row.
///
/// # Examples
///
/// ```
/// use tabula::table::{Column, TableRow};
///
/// let columns: Vec<Column<serde_json::Value>> = vec![
///     Column::new("name", "Name").sortable(),
///     Column::new("price", "Price")
///         .sortable()
///         .render(|value, row: &serde_json::Value| format!("{} {}", value, row.value("currency"))),
///     Column::new("category", "Category").fixed(12),
/// ];
/// ```
pub struct Column<R> {
    /// Attribute of the row this column reads.
    pub key: String,
    /// Header label.
    pub header: String,
    /// Whether activating the header changes the sort state.
    pub sortable: bool,
    /// Width hint.
    pub width: ColumnWidth,
    renderer: Option<CellRenderer<R>>,
}

impl<R> Column<R> {
    /// Create a non-sortable column reading `key`.
    pub fn new(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            sortable: false,
            width: ColumnWidth::Auto,
            renderer: None,
        }
    }

    /// Make the column sortable.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Set a fixed width in characters.
    pub fn fixed(mut self, width: u16) -> Self {
        self.width = ColumnWidth::Fixed(width);
        self
    }

    /// Set an opaque width hint.
    pub fn width(mut self, hint: impl Into<String>) -> Self {
        self.width = ColumnWidth::Hint(hint.into());
        self
    }

    /// Set a custom cell renderer.
    ///
    /// The renderer receives the extracted value and the whole row, so it can
    /// combine several attributes into one cell.
    pub fn render<F>(mut self, f: F) -> Self
    where
        F: Fn(&CellValue, &R) -> String + Send + Sync + 'static,
    {
        self.renderer = Some(Arc::new(f));
        self
    }

    /// Whether a custom renderer is set.
    pub fn has_renderer(&self) -> bool {
        self.renderer.is_some()
    }

    /// Display text for this column's cell in `row`.
    pub fn cell_text(&self, value: &CellValue, row: &R) -> String {
        match &self.renderer {
            Some(render) => render(value, row),
            None => value.to_string(),
        }
    }
}

impl<R> Clone for Column<R> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            header: self.header.clone(),
            sortable: self.sortable,
            width: self.width.clone(),
            renderer: self.renderer.clone(),
        }
    }
}

impl<R> fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("header", &self.header)
            .field("sortable", &self.sortable)
            .field("width", &self.width)
            .field("render", &self.renderer.is_some())
            .finish()
    }
}
