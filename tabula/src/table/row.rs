//! TableRow trait and row identity.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::CellValue;

/// Trait for items that can be displayed as rows in a [`DataTable`](super::DataTable).
///
/// A row is an opaque mapping from attribute name to value. The table only
/// ever reads the attribute named by a column's key.
///
/// # Example
///
/// ```
/// use tabula::table::{CellValue, TableRow};
///
/// #[derive(Clone)]
/// struct User {
///     id: u32,
///     name: String,
///     age: u32,
/// }
///
/// impl TableRow for User {
///     fn value(&self, key: &str) -> CellValue {
///         match key {
///             "id" => self.id.into(),
///             "name" => self.name.as_str().into(),
///             "age" => self.age.into(),
///             _ => CellValue::Empty,
///         }
///     }
///
///     fn row_id(&self) -> Option<String> {
///         Some(self.id.to_string())
///     }
/// }
/// ```
pub trait TableRow {
    /// Read the attribute named `key`. Unknown keys yield [`CellValue::Empty`].
    fn value(&self, key: &str) -> CellValue;

    /// Stable identity for this row, if it has one.
    ///
    /// When `None`, the row is identified by its position in the input
    /// sequence. Positional identity does not follow a row across re-sorts.
    fn row_id(&self) -> Option<String> {
        None
    }
}

/// Identity of a displayed row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RowKey {
    /// Position in the caller's (unsorted) input sequence.
    Position(usize),
    /// Caller-supplied stable identity.
    Id(String),
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position(i) => write!(f, "#{}", i),
            Self::Id(id) => f.write_str(id),
        }
    }
}

impl TableRow for BTreeMap<String, CellValue> {
    fn value(&self, key: &str) -> CellValue {
        self.get(key).cloned().unwrap_or_default()
    }
}

impl TableRow for HashMap<String, CellValue> {
    fn value(&self, key: &str) -> CellValue {
        self.get(key).cloned().unwrap_or_default()
    }
}

/// JSON objects are rows; any other JSON value has no attributes.
impl TableRow for serde_json::Value {
    fn value(&self, key: &str) -> CellValue {
        self.get(key).map(CellValue::from).unwrap_or_default()
    }
}
