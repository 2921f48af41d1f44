//! Panel content views and their shared capabilities.
//!
//! Concrete panel views implement [`PanelView`] to receive semantic events
//! and opt into [`TabularView`] and [`ScrollableView`] for sorting and
//! scrolling behavior.

use std::any::Any;
use std::ops::Range;

use imagerename_core::Event;

use crate::host::app::Subject;

/// Content attached to a panel window.
pub trait PanelView: Send {
    /// Reacts to a semantic event. Called for hidden windows too.
    fn update(&mut self, _event: Event, _subject: &Subject) {}

    /// Upcast used by [`crate::host::Window::view_as`].
    fn as_any(&self) -> &dyn Any;
}

/// A view laid out as a table with sortable columns.
pub trait TabularView {
    /// Column headings.
    fn headings(&self) -> &[&'static str];

    /// Rows, one cell per heading.
    fn rows(&self) -> &[Vec<String>];

    /// Rows, mutably.
    fn rows_mut(&mut self) -> &mut Vec<Vec<String>>;

    /// Sorts rows by a column. The sort is stable; missing cells sort first.
    fn sort_by(&mut self, column: usize, descending: bool) {
        self.rows_mut().sort_by(|a, b| {
            let ordering = a.get(column).cmp(&b.get(column));
            if descending { ordering.reverse() } else { ordering }
        });
    }

    /// Width of each column in characters: the longest of heading and cells.
    fn column_widths(&self) -> Vec<usize> {
        self.headings()
            .iter()
            .enumerate()
            .map(|(column, heading)| {
                self.rows()
                    .iter()
                    .filter_map(|row| row.get(column))
                    .map(|cell| cell.chars().count())
                    .fold(heading.chars().count(), usize::max)
            })
            .collect()
    }
}

/// A view showing a window of its rows at a time.
pub trait ScrollableView {
    /// Total number of rows.
    fn row_count(&self) -> usize;

    /// Index of the first visible row.
    fn offset(&self) -> usize;

    /// Sets the first visible row without clamping.
    fn set_offset(&mut self, offset: usize);

    /// Number of rows visible at once.
    fn page_size(&self) -> usize;

    /// Scrolls by `delta` rows, clamped to the content.
    fn scroll_by(&mut self, delta: isize) {
        let max = self.row_count().saturating_sub(self.page_size());
        let target = self.offset().saturating_add_signed(delta).min(max);
        self.set_offset(target);
    }

    /// Range of currently visible rows.
    fn visible_range(&self) -> Range<usize> {
        let start = self.offset().min(self.row_count());
        let end = (start + self.page_size()).min(self.row_count());
        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Grid {
        rows: Vec<Vec<String>>,
        offset: usize,
    }

    impl Grid {
        fn new(rows: &[[&str; 2]]) -> Self {
            Self {
                rows: rows
                    .iter()
                    .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                    .collect(),
                offset: 0,
            }
        }

        fn first_column(&self) -> Vec<&str> {
            self.rows.iter().map(|row| row[0].as_str()).collect()
        }
    }

    impl TabularView for Grid {
        fn headings(&self) -> &[&'static str] {
            &["Name", "Time"]
        }

        fn rows(&self) -> &[Vec<String>] {
            &self.rows
        }

        fn rows_mut(&mut self) -> &mut Vec<Vec<String>> {
            &mut self.rows
        }
    }

    impl ScrollableView for Grid {
        fn row_count(&self) -> usize {
            self.rows.len()
        }

        fn offset(&self) -> usize {
            self.offset
        }

        fn set_offset(&mut self, offset: usize) {
            self.offset = offset;
        }

        fn page_size(&self) -> usize {
            2
        }
    }

    #[test]
    fn test_sort_toggles_direction() {
        let mut grid = Grid::new(&[["b", "2"], ["a", "1"], ["c", "3"]]);
        grid.sort_by(0, false);
        assert_eq!(grid.first_column(), vec!["a", "b", "c"]);
        grid.sort_by(1, true);
        assert_eq!(grid.first_column(), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_column_widths() {
        let grid = Grid::new(&[["renamed.png", "1"]]);
        assert_eq!(grid.column_widths(), vec![11, 4]);
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut grid = Grid::new(&[["a", "1"], ["b", "2"], ["c", "3"]]);
        grid.scroll_by(10);
        assert_eq!(grid.offset(), 1);
        assert_eq!(grid.visible_range(), 1..3);
        grid.scroll_by(-5);
        assert_eq!(grid.visible_range(), 0..2);
    }
}
