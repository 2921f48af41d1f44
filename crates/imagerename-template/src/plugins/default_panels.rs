//! Default panels.

use std::any::Any;
use std::path::Path;

use chrono::Local;
use imagerename_core::{AppResult, Event};

use crate::host::app::Subject;
use crate::host::window::Window;
use crate::library::Library;
use crate::views::{PanelView, ScrollableView, TabularView};

/// Window title of the history panel.
pub const HISTORY_WINDOW: &str = "History";

const HEADINGS: &[&str] = &["File Name", "Image Path", "Seen At"];

/// Registers the default panels.
pub fn register(lib: &mut Library) {
    lib.panel(HISTORY_WINDOW).decorate(history);
}

/// Builds the history panel. Rows arrive with each subject change.
pub fn history(window: &mut Window) -> AppResult<()> {
    window.set_view(Box::new(HistoryView::new(5)));
    Ok(())
}

/// Recently shown images, newest first.
#[derive(Debug, Clone)]
pub struct HistoryView {
    rows: Vec<Vec<String>>,
    offset: usize,
    page_size: usize,
    sort: Option<(usize, bool)>,
}

impl HistoryView {
    /// Creates an empty history showing `page_size` rows at a time.
    pub fn new(page_size: usize) -> Self {
        Self {
            rows: Vec::new(),
            offset: 0,
            page_size: page_size.max(1),
            sort: None,
        }
    }

    /// Inserts an image at the top.
    pub fn record(&mut self, image: &Path) {
        let name = image
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let full = std::path::absolute(image)
            .unwrap_or_else(|_| image.to_path_buf())
            .display()
            .to_string();
        let seen = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        self.rows.insert(0, vec![name, full, seen]);
        self.offset = 0;
    }

    /// Sorts by a column heading; clicking the same heading again reverses the order.
    pub fn click_heading(&mut self, column: usize) {
        let descending = match self.sort {
            Some((current, descending)) if current == column => !descending,
            _ => false,
        };
        self.sort_by(column, descending);
        self.sort = Some((column, descending));
    }

    /// File names, top to bottom.
    pub fn file_names(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row[0].as_str()).collect()
    }
}

impl PanelView for HistoryView {
    fn update(&mut self, event: Event, subject: &Subject) {
        if event != Event::ImgChange {
            return;
        }
        if let Some(current) = subject.current() {
            self.record(current);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl TabularView for HistoryView {
    fn headings(&self) -> &[&'static str] {
        HEADINGS
    }

    fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    fn rows_mut(&mut self) -> &mut Vec<Vec<String>> {
        &mut self.rows
    }
}

impl ScrollableView for HistoryView {
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
        self.page_size
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn subject(images: &[&str]) -> Subject {
        Subject::new(images.iter().map(|image| PathBuf::from(*image)).collect())
    }

    #[test]
    fn test_newest_first_on_img_change_only() {
        let mut view = HistoryView::new(5);
        let mut subject = subject(&["a.png", "b.png"]);
        view.update(Event::ImgChange, &subject);
        view.update(Event::Tick, &subject);
        subject.advance();
        view.update(Event::ImgChange, &subject);
        assert_eq!(view.file_names(), vec!["b.png", "a.png"]);
    }

    #[test]
    fn test_click_heading_toggles() {
        let mut view = HistoryView::new(5);
        for image in ["b.png", "c.png", "a.png"] {
            view.record(Path::new(image));
        }
        view.click_heading(0);
        assert_eq!(view.file_names(), vec!["a.png", "b.png", "c.png"]);
        view.click_heading(0);
        assert_eq!(view.file_names(), vec!["c.png", "b.png", "a.png"]);
    }

    #[test]
    fn test_scroll_window() {
        let mut view = HistoryView::new(2);
        for image in ["a.png", "b.png", "c.png"] {
            view.record(Path::new(image));
        }
        view.scroll_by(1);
        assert_eq!(view.visible_range(), 1..3);
        view.record(Path::new("d.png"));
        assert_eq!(view.visible_range(), 0..2);
    }
}
