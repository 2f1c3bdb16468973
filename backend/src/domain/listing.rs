//! One window of an ordered collection plus the collection size.

use pagination::PageParams;

/// Items selected by limit/offset together with the total row count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing<T> {
    /// Rows within the requested window.
    pub items: Vec<T>,
    /// Rows across the whole collection.
    pub total: u64,
}

impl<T> Listing<T> {
    /// Slice an already ordered collection.
    pub fn from_ordered(all: Vec<T>, page: &PageParams) -> Self {
        let total = u64::try_from(all.len()).unwrap_or(u64::MAX);
        let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(page.limit()).unwrap_or(usize::MAX);
        Self {
            items: all.into_iter().skip(skip).take(take).collect(),
            total,
        }
    }

    /// Convert every item, keeping the total.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Listing<U> {
        Listing {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}
