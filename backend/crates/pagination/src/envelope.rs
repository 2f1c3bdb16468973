//! Response envelope for paginated collections.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::cursor::Cursor;
use crate::params::PageParams;
use crate::{CURSOR_PARAM, LIMIT_PARAM};

/// One page of results plus navigation links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Total number of rows across all pages.
    pub count: u64,
    /// Absolute link to the following page.
    pub next: Option<String>,
    /// Absolute link to the preceding page.
    pub previous: Option<String>,
    /// Rows in this page.
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Wrap `results` and derive navigation links from `base`.
    ///
    /// Query parameters on `base` other than the cursor and limit are kept so
    /// filters survive page navigation.
    #[must_use]
    pub fn new(results: Vec<T>, count: u64, params: &PageParams, base: &Url) -> Self {
        let next = params
            .next_cursor(count)
            .map(|cursor| link_for(base, cursor, params.limit()));
        let previous = params
            .previous_cursor()
            .map(|cursor| link_for(base, cursor, params.limit()));
        Self {
            count,
            next,
            previous,
            results,
        }
    }

    /// Convert every row while keeping the envelope intact.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

fn link_for(base: &Url, cursor: Cursor, limit: u32) -> String {
    let retained: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(key, _)| key != CURSOR_PARAM && key != LIMIT_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut url = base.clone();
    url.set_query(None);
    url.query_pairs_mut()
        .extend_pairs(retained.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .append_pair(LIMIT_PARAM, &limit.to_string())
        .append_pair(CURSOR_PARAM, &cursor.encode());
    url.into()
}
