pub const DEFAULT_PAGE_LIMIT: u32 = 10;
pub const PAGE_LIMIT_OPTIONS: [u32; 3] = [10, 25, 50];

/// Number of leading page buttons shown before the ellipsis.
const LEADING_PAGE_BUTTONS: u32 = 3;

/// A page fetch the pagination controller wants issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub request_id: u64,
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    limit: u32,
    total_pages: u32,
    last_issued: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_LIMIT)
    }
}

impl Pagination {
    pub fn new(limit: u32) -> Self {
        Self {
            page: 1,
            limit: limit.max(1),
            total_pages: 1,
            last_issued: 0,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Moves to page `n`. Out-of-range and unchanged pages are ignored.
    pub fn set_page(&mut self, n: u32) -> Option<PageRequest> {
        if n < 1 || n > self.total_pages || n == self.page {
            return None;
        }
        self.page = n;
        Some(self.issue())
    }

    /// Changes the page size and always returns to page 1. A zero limit is ignored.
    pub fn set_limit(&mut self, n: u32) -> Option<PageRequest> {
        if n == 0 {
            return None;
        }
        let changed = n != self.limit || self.page != 1;
        self.limit = n;
        self.page = 1;
        changed.then(|| self.issue())
    }

    /// Re-issues the fetch for the current window.
    pub fn refresh(&mut self) -> PageRequest {
        self.issue()
    }

    /// Only the most recently issued request may be applied.
    pub fn accepts(&self, request_id: u64) -> bool {
        request_id == self.last_issued
    }

    pub fn apply_total_pages(&mut self, total_pages: u32) {
        self.total_pages = total_pages.max(1);
    }

    pub fn buttons(&self) -> PageButtons {
        let leading_end = self.total_pages.min(LEADING_PAGE_BUTTONS);
        let overflow = self.total_pages > LEADING_PAGE_BUTTONS;
        PageButtons {
            current: self.page,
            leading: (1..=leading_end).collect(),
            ellipsis: overflow,
            last: overflow.then_some(self.total_pages),
            prev_enabled: self.page > 1,
            next_enabled: self.page < self.total_pages,
        }
    }

    fn issue(&mut self) -> PageRequest {
        self.last_issued += 1;
        PageRequest {
            request_id: self.last_issued,
            page: self.page,
            limit: self.limit,
        }
    }
}

/// Hints for rendering the page selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageButtons {
    pub current: u32,
    pub leading: Vec<u32>,
    pub ellipsis: bool,
    pub last: Option<u32>,
    pub prev_enabled: bool,
    pub next_enabled: bool,
}
