//! Page selection for splitting one document.

use crate::document::{PageGrid, SourceDocument};
use crate::error::{PdfForgeError, Result};
use crate::output;
use crate::selection::{PageSelection, parse_page_range};

/// Editing state for splitting the active document.
///
/// Clicks and the range text box both write the same selection: typing a
/// range replaces whatever was clicked before, and clicking afterwards edits
/// the parsed range in click mode. The [`PageGrid`] selected flags always
/// mirror the selection.
#[derive(Debug)]
pub struct SplitEditor {
    source: SourceDocument,
    grid: PageGrid,
    selection: PageSelection,
    output_name: String,
}

impl SplitEditor {
    /// Start editing `source` with nothing selected.
    pub fn new(source: SourceDocument) -> Self {
        let grid = PageGrid::new(source.id(), source.page_count());
        let output_name = output::split_output_name(source.name());
        Self {
            source,
            grid,
            selection: PageSelection::empty(),
            output_name,
        }
    }

    /// The document being split.
    pub fn source(&self) -> &SourceDocument {
        &self.source
    }

    /// Page entries, shared with thumbnail rendering.
    pub fn grid(&self) -> &PageGrid {
        &self.grid
    }

    /// The current selection, in output order.
    pub fn selection(&self) -> &PageSelection {
        &self.selection
    }

    /// Select or deselect one page by click.
    ///
    /// # Errors
    ///
    /// Returns [`PdfForgeError::InvalidPage`] if the page does not exist.
    pub fn toggle(&mut self, page: u32) -> Result<()> {
        let page_count = self.source.page_count();
        if page == 0 || page as usize > page_count {
            return Err(PdfForgeError::invalid_page(i64::from(page), page_count));
        }
        self.selection.toggle(page);
        self.grid.set_selected(page, self.selection.contains(page));
        Ok(())
    }

    /// Clear the selection if every page is selected; otherwise select every
    /// page in ascending order.
    pub fn toggle_all(&mut self) {
        let page_count = self.source.page_count();
        if page_count > 0 && self.selection.len() == page_count {
            self.selection.clear();
        } else {
            self.selection = PageSelection::all(page_count);
        }
        self.grid.sync_selection(&self.selection);
    }

    /// Replace the selection with the pages of a range expression.
    pub fn apply_range(&mut self, expression: &str) -> &PageSelection {
        self.selection = parse_page_range(expression, self.source.page_count());
        self.grid.sync_selection(&self.selection);
        &self.selection
    }

    /// Drop the whole selection.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.grid.sync_selection(&self.selection);
    }

    /// 1-based output position of `page`, shown as a badge on its thumbnail.
    pub fn selection_rank(&self, page: u32) -> Option<usize> {
        self.selection.rank_of(page)
    }

    /// Set the download name; `.pdf` is appended when missing.
    pub fn set_output_name(&mut self, name: &str) -> Result<()> {
        self.output_name = output::normalize_output_name(name)?;
        Ok(())
    }

    /// Download name, `split_<source>.pdf` unless changed.
    pub fn output_name(&self) -> &str {
        &self.output_name
    }
}
