//! Sort state and stable display ordering.

use std::borrow::Borrow;
use std::cmp::Ordering;

use super::{Column, TableRow};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// The opposite direction.
    pub fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    /// Header indicator: "↑" or "↓".
    pub fn indicator(self) -> &'static str {
        match self {
            Self::Ascending => "↑",
            Self::Descending => "↓",
        }
    }

    /// Apply this direction to an ascending comparison.
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

/// Which column controls display order, and in which direction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortState {
    /// Key of the active sort column, if any.
    pub field: Option<String>,
    /// Direction of the active sort.
    pub direction: SortDirection,
}

impl SortState {
    /// Sorted ascending by `field`.
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            direction: SortDirection::Ascending,
        }
    }

    /// Sorted descending by `field`.
    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            direction: SortDirection::Descending,
        }
    }

    /// Whether `key` is the active sort field.
    pub fn is_sorted_by(&self, key: &str) -> bool {
        self.field.as_deref() == Some(key)
    }

    /// The state after the user activates the header of `key`.
    ///
    /// Same field toggles direction; a new field starts ascending.
    pub fn activated(&self, key: &str) -> Self {
        if self.is_sorted_by(key) {
            Self {
                field: self.field.clone(),
                direction: self.direction.toggled(),
            }
        } else {
            Self::ascending(key)
        }
    }
}

/// Compute the display order of `rows` as indices into the input.
///
/// With no active field the input order is returned unchanged. Otherwise the
/// rows are stably sorted by the field's value, so equal keys keep their
/// original relative order in both directions. A field that names no column
/// in `columns` also leaves the order unchanged.
pub fn display_order<R, B>(rows: &[B], columns: &[Column<R>], sort: &SortState) -> Vec<usize>
where
    R: TableRow,
    B: Borrow<R>,
{
    let mut order: Vec<usize> = (0..rows.len()).collect();

    let Some(field) = sort.field.as_deref() else {
        return order;
    };
    if !columns.iter().any(|c| c.key == field) {
        return order;
    }

    let keys: Vec<_> = rows
        .iter()
        .map(|row| Borrow::<R>::borrow(row).value(field))
        .collect();
    // slice::sort_by is stable
    order.sort_by(|&a, &b| sort.direction.apply(keys[a].cmp(&keys[b])));
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activate_new_field_starts_ascending() {
        let state = SortState::descending("age");
        assert_eq!(state.activated("name"), SortState::ascending("name"));
    }

    #[test]
    fn test_activate_same_field_toggles() {
        let state = SortState::default().activated("age");
        assert_eq!(state, SortState::ascending("age"));
        let state = state.activated("age");
        assert_eq!(state, SortState::descending("age"));
        let state = state.activated("age");
        assert_eq!(state, SortState::ascending("age"));
    }

    #[test]
    fn test_indicator() {
        assert_eq!(SortDirection::Ascending.indicator(), "↑");
        assert_eq!(SortDirection::Descending.indicator(), "↓");
    }
}
