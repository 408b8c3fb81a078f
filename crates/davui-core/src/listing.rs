//! Directory listing rows and client-side sorting.
//!
//! The listing is server-rendered; sorting reads the cell text back, orders
//! the rows and reinserts them into the live table. Directories always come
//! before files. The active column and its direction live only as a marker on
//! the column headers.

use std::cell::{Cell, RefCell};
use std::cmp::Ordering;

use crate::size::parse_size;

// =============================================================================
// Rows
// =============================================================================

/// Whether a row is a directory or a file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum EntryKind {
    Directory,
    File,
}

impl EntryKind {
    /// Tag folded into string sort keys.
    fn tag(self) -> &'static str {
        match self {
            Self::Directory => "dir",
            Self::File => "file",
        }
    }
}

/// Sortable listing column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Column {
    Name,
    Size,
    Time,
}

impl Column {
    pub const ALL: [Column; 3] = [Column::Name, Column::Size, Column::Time];

    /// Cell index of the column within a row.
    pub fn cell_index(self) -> usize {
        match self {
            Self::Name => 0,
            Self::Size => 1,
            Self::Time => 2,
        }
    }

    /// Field name used by page callbacks (`Sort("size")`).
    pub fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Size => "size",
            Self::Time => "time",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }
}

/// Sort direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

/// Read access to one displayed row.
pub trait RowView {
    fn kind(&self) -> EntryKind;

    /// Raw text of the cell for `column`.
    fn cell(&self, column: Column) -> String;
}

/// One directory entry as displayed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingRow {
    pub kind: EntryKind,
    pub name: String,
    pub size: String,
    pub time: String,
}

impl ListingRow {
    pub fn dir(name: &str, time: &str) -> Self {
        Self {
            kind: EntryKind::Directory,
            name: name.to_string(),
            size: "-".to_string(),
            time: time.to_string(),
        }
    }

    pub fn file(name: &str, size: &str, time: &str) -> Self {
        Self {
            kind: EntryKind::File,
            name: name.to_string(),
            size: size.to_string(),
            time: time.to_string(),
        }
    }
}

impl RowView for ListingRow {
    fn kind(&self) -> EntryKind {
        self.kind
    }

    fn cell(&self, column: Column) -> String {
        match column {
            Column::Name => self.name.clone(),
            Column::Size => self.size.clone(),
            Column::Time => self.time.clone(),
        }
    }
}

// =============================================================================
// Table Seam
// =============================================================================

/// The live listing table.
pub trait ListingTable {
    type Row: RowView;

    /// Column currently marked as sorted, with its direction.
    fn sort_marker(&self) -> Option<(Column, SortDirection)>;

    /// Remove the marker from every header.
    fn clear_sort_markers(&self);

    /// Mark `column` as sorted in `direction`.
    fn mark_sorted(&self, column: Column, direction: SortDirection);

    /// Rows in display order.
    fn rows(&self) -> Vec<Self::Row>;

    /// Re-append `rows` to the table body in the given order.
    fn reinsert(&self, rows: Vec<Self::Row>);
}

// =============================================================================
// Sorter
// =============================================================================

/// String collation used for non-numeric columns.
pub type Collation = fn(&str, &str) -> Ordering;

/// Case-insensitive ordering with a case-sensitive tie-break.
///
/// Stands in for locale collation where the host offers none.
pub fn caseless_collation(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| a.cmp(b))
}

#[derive(Clone, Copy, Debug)]
pub struct ListSorter {
    collation: Collation,
}

impl Default for ListSorter {
    fn default() -> Self {
        Self::new(caseless_collation)
    }
}

impl ListSorter {
    pub fn new(collation: Collation) -> Self {
        Self { collation }
    }

    /// Direction a sort request resolves to.
    ///
    /// Requesting the active column again flips it; another column keeps the
    /// current direction. An explicit direction always wins.
    pub fn resolve_direction(
        previous: Option<(Column, SortDirection)>,
        column: Column,
        explicit: Option<SortDirection>,
    ) -> SortDirection {
        if let Some(direction) = explicit {
            return direction;
        }
        match previous {
            Some((active, direction)) if active == column => direction.reversed(),
            Some((_, direction)) => direction,
            None => SortDirection::Ascending,
        }
    }

    /// Order two rows: directories first, then by `column` in `direction`.
    pub fn compare<R: RowView>(
        &self,
        a: &R,
        b: &R,
        column: Column,
        direction: SortDirection,
    ) -> Ordering {
        let (kind_a, kind_b) = (a.kind(), b.kind());
        kind_a.cmp(&kind_b).then_with(|| {
            let ordering = match column {
                Column::Size => parse_size(&a.cell(column)).total_cmp(&parse_size(&b.cell(column))),
                _ => {
                    let key_a = format!("{}{}", kind_a.tag(), a.cell(column));
                    let key_b = format!("{}{}", kind_b.tag(), b.cell(column));
                    (self.collation)(&key_a, &key_b)
                }
            };
            direction.apply(ordering)
        })
    }

    /// Stable in-place sort of `rows`.
    pub fn sort_rows<R: RowView>(&self, rows: &mut [R], column: Column, direction: SortDirection) {
        rows.sort_by(|a, b| self.compare(a, b, column, direction));
    }

    /// Sort the live table by `column` and move the header marker.
    ///
    /// Returns the direction applied.
    pub fn sort<T: ListingTable>(
        &self,
        table: &T,
        column: Column,
        explicit: Option<SortDirection>,
    ) -> SortDirection {
        let direction = Self::resolve_direction(table.sort_marker(), column, explicit);
        table.clear_sort_markers();

        let mut rows = table.rows();
        self.sort_rows(&mut rows, column, direction);
        table.reinsert(rows);

        table.mark_sorted(column, direction);
        tracing::debug!(column = column.key(), ?direction, "listing sorted");
        direction
    }
}

// =============================================================================
// In-memory Table
// =============================================================================

/// Listing held in memory, for hosts without a DOM and for tests.
#[derive(Debug, Default)]
pub struct MemoryListing {
    rows: RefCell<Vec<ListingRow>>,
    marker: Cell<Option<(Column, SortDirection)>>,
}

impl MemoryListing {
    pub fn new(rows: Vec<ListingRow>) -> Self {
        Self {
            rows: RefCell::new(rows),
            marker: Cell::new(None),
        }
    }

    /// Replace every row (what a navigation swap does).
    pub fn replace(&self, rows: Vec<ListingRow>) {
        *self.rows.borrow_mut() = rows;
    }

    pub fn names(&self) -> Vec<String> {
        self.rows.borrow().iter().map(|r| r.name.clone()).collect()
    }
}

impl ListingTable for MemoryListing {
    type Row = ListingRow;

    fn sort_marker(&self) -> Option<(Column, SortDirection)> {
        self.marker.get()
    }

    fn clear_sort_markers(&self) {
        self.marker.set(None);
    }

    fn mark_sorted(&self, column: Column, direction: SortDirection) {
        self.marker.set(Some((column, direction)));
    }

    fn rows(&self) -> Vec<ListingRow> {
        self.rows.borrow().clone()
    }

    fn reinsert(&self, rows: Vec<ListingRow>) {
        *self.rows.borrow_mut() = rows;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemoryListing {
        MemoryListing::new(vec![
            ListingRow::file("b.txt", "2 KiB", "2024-01-02 10:00"),
            ListingRow::dir("zeta", "2024-01-05 10:00"),
            ListingRow::file("A.txt", "1.5 MiB", "2024-01-01 10:00"),
            ListingRow::dir("alpha", "2024-01-03 10:00"),
            ListingRow::file("c.txt", "12", "2024-01-04 10:00"),
        ])
    }

    #[test]
    fn test_name_sort_keeps_dirs_first() {
        let table = sample();
        let sorter = ListSorter::default();

        sorter.sort(&table, Column::Name, Some(SortDirection::Ascending));
        assert_eq!(table.names(), vec!["alpha", "zeta", "A.txt", "b.txt", "c.txt"]);

        sorter.sort(&table, Column::Name, Some(SortDirection::Descending));
        assert_eq!(table.names(), vec!["zeta", "alpha", "c.txt", "b.txt", "A.txt"]);
    }

    #[test]
    fn test_size_sort_is_numeric() {
        let table = sample();
        ListSorter::default().sort(&table, Column::Size, Some(SortDirection::Ascending));
        assert_eq!(table.names(), vec!["zeta", "alpha", "c.txt", "b.txt", "A.txt"]);
    }

    #[test]
    fn test_time_sort() {
        let table = sample();
        ListSorter::default().sort(&table, Column::Time, Some(SortDirection::Descending));
        assert_eq!(table.names(), vec!["zeta", "alpha", "c.txt", "b.txt", "A.txt"]);
    }

    #[test]
    fn test_same_column_toggles() {
        let table = sample();
        let sorter = ListSorter::default();

        assert_eq!(
            sorter.sort(&table, Column::Name, None),
            SortDirection::Ascending
        );
        assert_eq!(
            sorter.sort(&table, Column::Name, None),
            SortDirection::Descending
        );
        assert_eq!(
            sorter.sort(&table, Column::Name, None),
            SortDirection::Ascending
        );
        assert_eq!(
            table.sort_marker(),
            Some((Column::Name, SortDirection::Ascending))
        );
    }

    #[test]
    fn test_other_column_keeps_direction() {
        let table = sample();
        let sorter = ListSorter::default();
        sorter.sort(&table, Column::Name, Some(SortDirection::Descending));
        assert_eq!(
            sorter.sort(&table, Column::Size, None),
            SortDirection::Descending
        );
        // Only one marker at a time.
        assert_eq!(
            table.sort_marker(),
            Some((Column::Size, SortDirection::Descending))
        );
    }

    #[test]
    fn test_unparseable_size_sorts_smallest() {
        let sorter = ListSorter::default();
        let mut rows = vec![
            ListingRow::file("big", "3 GiB", ""),
            ListingRow::file("odd", "???", ""),
            ListingRow::file("zero", "0 B", ""),
        ];
        sorter.sort_rows(&mut rows, Column::Size, SortDirection::Ascending);
        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["odd", "zero", "big"]);
    }

    #[test]
    fn test_equal_keys_keep_order() {
        let sorter = ListSorter::default();
        let mut rows = vec![
            ListingRow::file("x", "1 KiB", ""),
            ListingRow::file("y", "1 KiB", ""),
        ];
        sorter.sort_rows(&mut rows, Column::Size, SortDirection::Descending);
        assert_eq!(rows[0].name, "x");
    }

    #[test]
    fn test_column_keys() {
        assert_eq!(Column::from_key("size"), Some(Column::Size));
        assert_eq!(Column::from_key("owner"), None);
        assert_eq!(Column::Time.cell_index(), 2);
    }

    #[test]
    fn test_caseless_collation() {
        assert_eq!(caseless_collation("a", "B"), Ordering::Less);
        assert_eq!(caseless_collation("B", "a"), Ordering::Greater);
        assert_eq!(caseless_collation("a", "a"), Ordering::Equal);
    }
}
