//! Keyset pagination over a user's checks, newest activity first.
//!
//! Pages are keyed by `(activity, check_id)` descending. A cursor is the id of
//! the check at the edge of the current page; the store resolves it back to
//! its activity timestamp.

use anyhow::Result;

use crate::checks::Check;
use crate::store::CheckStore;

pub const DEFAULT_PAGE_SIZE: usize = 9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Older,
    Newer,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    /// Newest first.
    pub checks: Vec<Check>,
    /// Anchor for the next older page, `None` when exhausted.
    pub older: Option<i64>,
    /// Anchor for the next newer page, `None` on the first page.
    pub newer: Option<i64>,
}

impl Page {
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

/// Loads one page. `anchor == 0` starts from the most recent check.
pub fn fetch_page<S: CheckStore>(
    store: &S,
    user_id: i64,
    anchor: i64,
    direction: Direction,
    page_size: usize,
) -> Result<Page> {
    if anchor == 0 {
        let rows = store.list_user_checks(user_id, 0, Direction::Older, page_size + 1)?;
        return Ok(page_from_rows(rows, Direction::Older, true, page_size));
    }
    let rows = store.list_user_checks(user_id, anchor, direction, page_size + 1)?;
    if direction == Direction::Newer && rows.len() <= page_size {
        return fetch_page(store, user_id, 0, Direction::Older, page_size);
    }
    Ok(page_from_rows(rows, direction, false, page_size))
}

/// Builds a page from up to `page_size + 1` store rows. Older rows arrive
/// newest first, newer rows arrive oldest first (closest to the anchor).
pub fn page_from_rows(
    mut rows: Vec<Check>,
    direction: Direction,
    first_page: bool,
    page_size: usize,
) -> Page {
    let has_more = rows.len() > page_size;
    rows.truncate(page_size);
    match direction {
        Direction::Older => {
            let older = if has_more {
                rows.last().map(|check| check.id)
            } else {
                None
            };
            let newer = if first_page {
                None
            } else {
                rows.first().map(|check| check.id)
            };
            Page {
                checks: rows,
                older,
                newer,
            }
        }
        Direction::Newer => {
            rows.reverse();
            // Reaching here means more rows exist past the anchor on both sides.
            let older = rows.last().map(|check| check.id);
            let newer = if has_more {
                rows.first().map(|check| check.id)
            } else {
                None
            };
            Page {
                checks: rows,
                older,
                newer,
            }
        }
    }
}
