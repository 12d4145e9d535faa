//! Page-number pagination for list views.

use serde::Serialize;

/// Number of posts shown per listing page.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// A requested page of a listing (1-indexed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: u64,
    pub per_page: u64,
}

impl PageRequest {
    pub fn new(number: u64, per_page: u64) -> Self {
        Self {
            number: number.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Interpret a raw `page` query value. Anything that is not a positive
    /// integer selects the first page.
    pub fn parse(raw: Option<&str>, per_page: u64) -> Self {
        let number = raw
            .and_then(|value| value.trim().parse::<u64>().ok())
            .unwrap_or(1);
        Self::new(number, per_page)
    }

    /// Clamp the request against the listing size: past the end means the last page.
    pub fn resolve(self, total_items: u64) -> Self {
        Self {
            number: self.number.min(num_pages(total_items, self.per_page)),
            per_page: self.per_page,
        }
    }

    /// Zero-based index of the first item on this page.
    pub fn offset(&self) -> u64 {
        (self.number - 1) * self.per_page
    }
}

/// Page count of a listing; an empty listing still has one (empty) page.
pub fn num_pages(total_items: u64, per_page: u64) -> u64 {
    if total_items == 0 {
        1
    } else {
        total_items.div_ceil(per_page.max(1))
    }
}

/// One page of results plus enough bookkeeping to render navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub per_page: u64,
    pub total_items: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        Self {
            items,
            number: request.number,
            per_page: request.per_page,
            total_items,
        }
    }

    /// Slice an already ordered, complete listing.
    pub fn from_vec(all: Vec<T>, request: PageRequest) -> Self {
        let total_items = all.len() as u64;
        let request = request.resolve(total_items);
        let items = all
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.per_page as usize)
            .collect();
        Self::new(items, request, total_items)
    }

    pub fn num_pages(&self) -> u64 {
        num_pages(self.total_items, self.per_page)
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            per_page: self.per_page,
            total_items: self.total_items,
        }
    }
}
