//! Shared pagination primitives for list endpoints.
//!
//! Endpoints accept an optional `limit` and an opaque `cursor` token. The
//! cursor hides the underlying offset so clients treat it as a bookmark, and
//! responses wrap one page of results in a [`Page`] envelope carrying the
//! total `count` plus ready-made `next`/`previous` links.
//!
//! ```
//! use pagination::{Page, PageParams};
//! use url::Url;
//!
//! let params = PageParams::new(Some(2), None).expect("valid params");
//! let base = Url::parse("https://example.test/api/v1/events?search=rust")
//!     .expect("valid url");
//! let page = Page::new(vec!["a", "b"], 5, &params, &base);
//! assert_eq!(page.count, 5);
//! assert!(page.next.is_some());
//! assert!(page.previous.is_none());
//! ```

mod cursor;
mod envelope;
mod params;

pub use cursor::{Cursor, CursorError};
pub use envelope::Page;
pub use params::{DEFAULT_LIMIT, MAX_LIMIT, MAX_OFFSET, PageParams, PaginationError};

/// Query parameter carrying the opaque cursor token.
pub const CURSOR_PARAM: &str = "cursor";

/// Query parameter carrying the requested page size.
pub const LIMIT_PARAM: &str = "limit";
