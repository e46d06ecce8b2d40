//! Page selections and the page-range parser.
//!
//! A [`PageSelection`] is an ordered, duplicate-free list of 1-based page
//! numbers. It comes from one of two places, and the two must not be mixed up:
//!
//! - [`parse_page_range`] turns text like `"1-5,8,10-12"` into a selection in
//!   ascending order ([`SelectionMode::Range`]).
//! - Clicking pages one by one builds a selection in click order
//!   ([`SelectionMode::Click`]); that order becomes the output page order.
//!
//! The transform engine honours whatever order the selection carries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How a selection was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Parsed from a range expression; always ascending.
    #[default]
    Range,
    /// Built from individual clicks; keeps click order.
    Click,
}

/// Ordered, deduplicated list of 1-based page numbers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageSelection {
    pages: Vec<u32>,
    mode: SelectionMode,
}

impl PageSelection {
    /// An empty range-mode selection.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every page of a document in native order.
    pub fn all(page_count: usize) -> Self {
        Self {
            pages: (1..=page_count as u32).collect(),
            mode: SelectionMode::Range,
        }
    }

    /// Build a click-order selection from pages in the order given.
    ///
    /// Later repeats of a page are dropped; the first occurrence keeps its
    /// position. Bounds are not checked here, the transform engine does that.
    pub fn in_click_order<I>(pages: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        let mut selection = Self {
            pages: Vec::new(),
            mode: SelectionMode::Click,
        };
        for page in pages {
            if !selection.pages.contains(&page) {
                selection.pages.push(page);
            }
        }
        selection
    }

    /// The pages in output order.
    pub fn pages(&self) -> &[u32] {
        &self.pages
    }

    /// How this selection was produced.
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Number of selected pages.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// True if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Check if a page is selected.
    pub fn contains(&self, page: u32) -> bool {
        self.pages.contains(&page)
    }

    /// 1-based position of `page` in the output, if selected.
    pub fn rank_of(&self, page: u32) -> Option<usize> {
        self.pages.iter().position(|&p| p == page).map(|i| i + 1)
    }

    /// Select `page` if unselected, deselect it otherwise.
    ///
    /// Switches the selection to click mode: a newly selected page goes to the
    /// end, removing a page keeps the relative order of the rest.
    pub fn toggle(&mut self, page: u32) {
        self.mode = SelectionMode::Click;
        match self.pages.iter().position(|&p| p == page) {
            Some(index) => {
                self.pages.remove(index);
            }
            None => self.pages.push(page),
        }
    }

    /// Clear the selection.
    pub fn clear(&mut self) {
        self.pages.clear();
    }

    /// Render as `"1, 2, 5"`.
    pub fn describe(&self) -> String {
        self.pages
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl<'a> IntoIterator for &'a PageSelection {
    type Item = &'a u32;
    type IntoIter = std::slice::Iter<'a, u32>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.iter()
    }
}

/// Parse a page-range expression against a document with `max_page` pages.
///
/// The expression is a comma-separated list of tokens. Each token is trimmed
/// and is either a page `N` or an inclusive range `A-B`. Anything that does
/// not fit is ignored rather than reported, so a half-typed expression still
/// yields the pages understood so far:
///
/// - `A-B` with `A > B`, or with a side that is not a number, is dropped.
/// - Pages outside `1..=max_page` are dropped, also from inside ranges.
///
/// The result is ascending and free of duplicates. This never fails.
///
/// # Examples
///
/// ```
/// use pdfforge::selection::parse_page_range;
///
/// let selection = parse_page_range("1-5,8,10-12", 12);
/// assert_eq!(selection.pages(), &[1, 2, 3, 4, 5, 8, 10, 11, 12]);
///
/// assert!(parse_page_range("3-1", 10).is_empty());
/// ```
pub fn parse_page_range(expression: &str, max_page: usize) -> PageSelection {
    let max_page = u32::try_from(max_page).unwrap_or(u32::MAX);
    let mut pages = BTreeSet::new();

    for token in expression.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        if let Some((start, end)) = token.split_once('-') {
            let (Ok(start), Ok(end)) = (start.trim().parse::<u32>(), end.trim().parse::<u32>())
            else {
                continue;
            };
            if start > end {
                continue;
            }
            // Clamp before iterating so "1-4000000000" stays cheap.
            pages.extend(start.max(1)..=end.min(max_page));
        } else if let Ok(page) = token.parse::<u32>()
            && (1..=max_page).contains(&page)
        {
            pages.insert(page);
        }
    }

    PageSelection {
        pages: pages.into_iter().collect(),
        mode: SelectionMode::Range,
    }
}
