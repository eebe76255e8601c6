//! Page navigation over a collection whose size is only known remotely.
//!
//! [`Paginator`] stores three numbers (current page, page size, total item
//! count) and derives everything else on read, so the metadata handed to a
//! view can never drift from the state it was computed from.

use std::ops::Range;

use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_ITEMS_PER_PAGE: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PaginationError {
    #[error("items per page must be greater than zero")]
    ZeroPageSize,
}

/// Snapshot of a [`Paginator`] with every derived field filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub current_page: u64,
    pub items_per_page: u64,
    pub total_items: u64,
    pub total_pages: u64,
    pub start_index: u64,
    pub end_index: u64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    current_page: u64,
    items_per_page: u64,
    total_items: u64,
}

impl Paginator {
    /// Builds a paginator; `initial_page` is clamped like any navigation.
    pub fn new(
        total_items: u64,
        items_per_page: u64,
        initial_page: i64,
    ) -> Result<Self, PaginationError> {
        if items_per_page == 0 {
            return Err(PaginationError::ZeroPageSize);
        }
        let mut paginator = Self {
            current_page: 1,
            items_per_page,
            total_items,
        };
        paginator.go_to_page(initial_page);
        Ok(paginator)
    }

    pub fn current_page(&self) -> u64 {
        self.current_page
    }

    pub fn items_per_page(&self) -> u64 {
        self.items_per_page
    }

    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    pub fn total_pages(&self) -> u64 {
        self.total_items.div_ceil(self.items_per_page)
    }

    pub fn start_index(&self) -> u64 {
        (self.current_page - 1).saturating_mul(self.items_per_page)
    }

    pub fn end_index(&self) -> u64 {
        self.start_index()
            .saturating_add(self.items_per_page)
            .min(self.total_items)
    }

    pub fn has_next_page(&self) -> bool {
        self.current_page < self.total_pages()
    }

    pub fn has_previous_page(&self) -> bool {
        self.current_page > 1
    }

    /// Index range of the current page, ready for slicing local data.
    pub fn range(&self) -> Range<usize> {
        let start = usize::try_from(self.start_index()).unwrap_or(usize::MAX);
        let end = usize::try_from(self.end_index()).unwrap_or(usize::MAX);
        start..end
    }

    pub fn info(&self) -> PageInfo {
        PageInfo {
            current_page: self.current_page,
            items_per_page: self.items_per_page,
            total_items: self.total_items,
            total_pages: self.total_pages(),
            start_index: self.start_index(),
            end_index: self.end_index(),
            has_next_page: self.has_next_page(),
            has_previous_page: self.has_previous_page(),
        }
    }

    pub fn go_to_page(&mut self, page: i64) {
        let last = i64::try_from(self.last_page()).unwrap_or(i64::MAX);
        // `last >= 1`, so the clamp result is always a positive page.
        self.current_page = page.clamp(1, last) as u64;
    }

    pub fn next_page(&mut self) {
        if self.has_next_page() {
            self.current_page += 1;
        }
    }

    pub fn previous_page(&mut self) {
        if self.has_previous_page() {
            self.current_page -= 1;
        }
    }

    /// Records a new collection size, pulling the current page back inside
    /// the shrunken range when needed.
    pub fn set_total_items(&mut self, total_items: u64) {
        self.total_items = total_items;
        self.current_page = self.current_page.min(self.last_page());
    }

    /// Changes the page size, keeping the first visible item on screen.
    pub fn set_items_per_page(&mut self, items_per_page: u64) -> Result<(), PaginationError> {
        if items_per_page == 0 {
            return Err(PaginationError::ZeroPageSize);
        }
        let first_visible = self.start_index();
        self.items_per_page = items_per_page;
        self.current_page = (first_visible / items_per_page + 1).min(self.last_page());
        Ok(())
    }

    fn last_page(&self) -> u64 {
        self.total_pages().max(1)
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self {
            current_page: 1,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            total_items: 0,
        }
    }
}

#[cfg(test)]
#[path = "tests/pagination_tests.rs"]
mod tests;
