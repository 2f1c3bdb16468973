//! Validated page request parameters.

use crate::cursor::{Cursor, CursorError};

/// Page size used when the client does not ask for one.
pub const DEFAULT_LIMIT: u32 = 20;

/// Largest page size a client may request; larger values are clamped.
pub const MAX_LIMIT: u32 = 100;

/// Largest offset a cursor may carry; SQL `OFFSET` is a signed 64-bit value.
pub const MAX_OFFSET: u64 = i64::MAX.unsigned_abs();

/// Errors raised while validating page parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    /// The requested limit was zero.
    #[error("limit must be at least 1")]
    ZeroLimit,
    /// The cursor token could not be decoded.
    #[error(transparent)]
    Cursor(#[from] CursorError),
    /// The cursor decoded to an offset beyond [`MAX_OFFSET`].
    #[error("cursor offset {offset} is out of range")]
    OffsetOutOfRange {
        /// Decoded offset.
        offset: u64,
    },
}

/// Limit and offset for one page of an ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    limit: u32,
    offset: u64,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl PageParams {
    /// Validate raw query values.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError::ZeroLimit`] for a zero limit,
    /// [`PaginationError::Cursor`] for an undecodable cursor and
    /// [`PaginationError::OffsetOutOfRange`] when the cursor points past
    /// [`MAX_OFFSET`].
    ///
    /// # Examples
    ///
    /// ```
    /// use pagination::{MAX_LIMIT, PageParams};
    ///
    /// let params = PageParams::new(Some(500), None).expect("valid params");
    /// assert_eq!(params.limit(), MAX_LIMIT);
    /// assert_eq!(params.offset(), 0);
    /// ```
    pub fn new(limit: Option<u32>, cursor: Option<&str>) -> Result<Self, PaginationError> {
        let page_size = match limit {
            Some(0) => return Err(PaginationError::ZeroLimit),
            Some(value) => value.min(MAX_LIMIT),
            None => DEFAULT_LIMIT,
        };
        let offset = match cursor {
            Some(token) if !token.trim().is_empty() => Cursor::decode(token)?.offset(),
            _ => 0,
        };
        if offset > MAX_OFFSET {
            return Err(PaginationError::OffsetOutOfRange { offset });
        }
        Ok(Self {
            limit: page_size,
            offset,
        })
    }

    /// Build parameters from a known limit and offset, clamping the limit
    /// into `1..=MAX_LIMIT`.
    #[must_use]
    pub fn from_parts(limit: u32, offset: u64) -> Self {
        Self {
            limit: limit.clamp(1, MAX_LIMIT),
            offset,
        }
    }

    /// Maximum number of rows in the page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of rows skipped before the page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Cursor for the following page, if rows remain after this one.
    #[must_use]
    pub fn next_cursor(&self, total: u64) -> Option<Cursor> {
        let next = self.offset.saturating_add(u64::from(self.limit));
        (next < total).then(|| Cursor::at(next))
    }

    /// Cursor for the preceding page, if this page is not the first.
    #[must_use]
    pub fn previous_cursor(&self) -> Option<Cursor> {
        (self.offset > 0).then(|| Cursor::at(self.offset.saturating_sub(u64::from(self.limit))))
    }
}
