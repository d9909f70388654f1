//! Tabular data view.
//!
//! [`DataTable`] owns the sort state for one table instance and derives a
//! display order from whatever rows the host passes in on each render. Cell
//! content comes from the columns' renderers; row activation goes to the
//! host's callback.

mod column;
mod config;
mod filter;
mod row;
mod sort;
mod value;
mod view;

pub use column::{CellRenderer, Column, ColumnWidth};
pub use config::{TableConfig, DEFAULT_EMPTY_MESSAGE, DEFAULT_LOADING_MESSAGE};
pub use filter::{filter_rows, fuzzy_filter_rows};
pub use row::{RowKey, TableRow};
pub use sort::{display_order, SortDirection, SortState};
pub use value::CellValue;
pub use view::{HeaderView, RowView, TableView};

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use crate::state::State;

/// Callback invoked with the full row when the user activates it.
pub type RowCallback<R> = Arc<dyn Fn(&R) + Send + Sync>;

/// A generic sortable table.
///
/// Columns are fixed for the lifetime of the table. Rows are supplied on each
/// call to [`view`](DataTable::view), so changing the data never resets the
/// sort state. If two columns share a key, the first one decides whether the
/// key is sortable; both display the same attribute.
///
/// # Example
///
/// ```
/// use serde_json::{json, Value};
/// use tabula::table::{Column, DataTable};
///
/// let rows = vec![json!({ "id": 1, "age": 35 }), json!({ "id": 2, "age": 25 })];
/// let table: DataTable<Value> = DataTable::new(vec![Column::new("age", "Age").sortable()]);
///
/// table.activate_column("age");
/// let view = table.view(&rows, false);
/// assert_eq!(view.column_text(0), vec!["25", "35"]);
/// ```
pub struct DataTable<R> {
    columns: Vec<Column<R>>,
    sort: State<SortState>,
    on_row_click: Option<RowCallback<R>>,
    config: TableConfig,
}

impl<R: TableRow> DataTable<R> {
    /// Create a table with the given columns and default configuration.
    pub fn new(columns: Vec<Column<R>>) -> Self {
        Self {
            columns,
            sort: State::new(SortState::default()),
            on_row_click: None,
            config: TableConfig::default(),
        }
    }

    /// Replace the display configuration.
    pub fn with_config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the empty-state message.
    pub fn empty_message(mut self, message: impl Into<String>) -> Self {
        self.config.empty_message = message.into();
        self
    }

    /// Make rows selectable, invoking `f` with the row on each activation.
    pub fn on_row_click<F>(mut self, f: F) -> Self
    where
        F: Fn(&R) + Send + Sync + 'static,
    {
        self.on_row_click = Some(Arc::new(f));
        self
    }

    /// The column descriptors.
    pub fn columns(&self) -> &[Column<R>] {
        &self.columns
    }

    /// The display configuration.
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Current sort state.
    pub fn sort_state(&self) -> SortState {
        self.sort.get()
    }

    /// Shared handle to the sort state, for hosts that watch it.
    pub fn sort_handle(&self) -> State<SortState> {
        self.sort.clone()
    }

    /// Whether rows respond to activation.
    pub fn is_selectable(&self) -> bool {
        self.on_row_click.is_some()
    }

    /// Handle activation of the header for column `key`.
    ///
    /// Same column toggles direction; another column becomes the sort field,
    /// ascending. Unknown and non-sortable columns are ignored. Returns
    /// whether the sort state changed.
    pub fn activate_column(&self, key: &str) -> bool {
        let sortable = self
            .columns
            .iter()
            .find(|c| c.key == key)
            .is_some_and(|c| c.sortable);
        if !sortable {
            log::debug!("Ignoring activation of non-sortable column {:?}", key);
            return false;
        }

        self.sort.update(|s| *s = s.activated(key));
        true
    }

    /// Return to the unsorted state.
    pub fn clear_sort(&self) {
        self.sort.set(SortState::default());
    }

    /// Indices of `rows` in display order.
    pub fn display_order<B: Borrow<R>>(&self, rows: &[B]) -> Vec<usize> {
        self.sort.with(|sort| display_order(rows, &self.columns, sort))
    }

    /// Rows in display order.
    pub fn sorted<'a, B: Borrow<R>>(&self, rows: &'a [B]) -> Vec<&'a R> {
        self.display_order(rows)
            .into_iter()
            .map(|i| Borrow::<R>::borrow(&rows[i]))
            .collect()
    }

    /// Build the view for one render.
    ///
    /// Loading takes precedence over everything; otherwise an empty input
    /// shows the empty message.
    pub fn view<B: Borrow<R>>(&self, rows: &[B], loading: bool) -> TableView {
        if loading {
            return TableView::Loading(self.config.loading_message.clone());
        }
        if rows.is_empty() {
            return TableView::Empty(self.config.empty_message.clone());
        }

        let sort = self.sort.get();
        let headers = self
            .columns
            .iter()
            .map(|c| HeaderView {
                key: c.key.clone(),
                label: c.header.clone(),
                sortable: c.sortable,
                width: c.width.clone(),
                sorted: (c.sortable && sort.is_sorted_by(&c.key)).then_some(sort.direction),
            })
            .collect();

        let clickable = self.is_selectable();
        let row_views = display_order(rows, &self.columns, &sort)
            .into_iter()
            .map(|index| {
                let row = Borrow::<R>::borrow(&rows[index]);
                RowView {
                    key: row.row_id().map_or(RowKey::Position(index), RowKey::Id),
                    index,
                    clickable,
                    cells: self
                        .columns
                        .iter()
                        .map(|c| c.cell_text(&row.value(&c.key), row))
                        .collect(),
                }
            })
            .collect();

        TableView::Rows {
            class_name: self.config.class_name.clone(),
            headers,
            rows: row_views,
        }
    }

    /// Handle activation of the row displayed at `position`.
    ///
    /// Invokes the row-click callback once with the full row. Returns whether
    /// a callback ran; without a callback, or for a position past the end,
    /// nothing happens.
    pub fn activate_row<B: Borrow<R>>(&self, rows: &[B], position: usize) -> bool {
        let Some(callback) = &self.on_row_click else {
            return false;
        };
        let Some(&index) = self.display_order(rows).get(position) else {
            return false;
        };
        callback(Borrow::<R>::borrow(&rows[index]));
        true
    }
}

impl<R> fmt::Debug for DataTable<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataTable")
            .field("columns", &self.columns)
            .field("sort", &self.sort)
            .field("selectable", &self.on_row_click.is_some())
            .field("config", &self.config)
            .finish()
    }
}
