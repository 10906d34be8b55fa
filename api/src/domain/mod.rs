//! Domain models and their PostgreSQL queries
//!
//! Query functions use the generic Executor pattern, allowing them to work with
//! both `&PgPool` (for standalone queries) and `&mut PgConnection` (for transactions).

pub mod comments;
pub mod dashboard;
pub mod likes;
pub mod playlists;
pub mod subscriptions;
pub mod tweets;
pub mod users;
pub mod videos;

use crate::constants::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PageError {
    #[error("{field} must be a positive integer")]
    NotPositive { field: &'static str },

    #[error("page is out of range")]
    OutOfRange,
}

/// Page/limit pair validated from query parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Parse raw `page`/`limit` values. Missing values take the defaults and
    /// `limit` is clamped to MAX_PAGE_SIZE.
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Result<Self, PageError> {
        let page = parse_positive(page, "page")?.unwrap_or(DEFAULT_PAGE);
        let limit = parse_positive(limit, "limit")?
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);
        // The row offset must fit in an i64 for OFFSET and slicing
        (page - 1).checked_mul(limit).ok_or(PageError::OutOfRange)?;
        Ok(Self { page, limit })
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }

    /// Apply this page to an already ordered in-memory sequence
    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        items
            .iter()
            .skip(self.offset() as usize)
            .take(self.limit as usize)
            .cloned()
            .collect()
    }
}

fn parse_positive(raw: Option<&str>, field: &'static str) -> Result<Option<i64>, PageError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    match raw.parse::<i64>() {
        Ok(value) if value > 0 => Ok(Some(value)),
        _ => Err(PageError::NotPositive { field }),
    }
}

/// Resulting state of a relationship toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
}

impl ToggleOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, ToggleOutcome::Added)
    }
}

/// Parse a path/query identifier; ids are positive integers
pub fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

/// Trim a supplied text field, treating blank input as absent
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults() {
        let page = PageRequest::parse(None, None).unwrap();
        assert_eq!(page, PageRequest { page: 1, limit: 10 });
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_page_offset() {
        let page = PageRequest::parse(Some("3"), Some("25")).unwrap();
        assert_eq!(page.offset(), 50);
    }

    #[test]
    fn test_limit_is_clamped() {
        let page = PageRequest::parse(Some("1"), Some("100000")).unwrap();
        assert_eq!(page.limit, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_page_rejects_non_positive() {
        assert_eq!(
            PageRequest::parse(Some("0"), None),
            Err(PageError::NotPositive { field: "page" })
        );
        assert_eq!(
            PageRequest::parse(None, Some("-4")),
            Err(PageError::NotPositive { field: "limit" })
        );
        assert_eq!(
            PageRequest::parse(Some("two"), None),
            Err(PageError::NotPositive { field: "page" })
        );
    }

    #[test]
    fn test_page_rejects_overflowing_offset() {
        let max = i64::MAX.to_string();
        assert_eq!(
            PageRequest::parse(Some(&max), Some("10")),
            Err(PageError::OutOfRange)
        );

        // Largest page whose offset still fits
        let last = (i64::MAX / 10 + 1).to_string();
        let page = PageRequest::parse(Some(&last), Some("10")).unwrap();
        assert_eq!(page.offset(), i64::MAX / 10 * 10);
        assert!(page.slice(&[1, 2, 3]).is_empty());
    }

    #[test]
    fn test_slice_never_exceeds_limit() {
        let items: Vec<i32> = (0..23).collect();
        for page in 1..=4 {
            let request = PageRequest { page, limit: 10 };
            let slice = request.slice(&items);
            assert!(slice.len() <= 10);
            assert_eq!(slice.first().copied(), items.get(request.offset() as usize).copied());
        }
        assert_eq!(PageRequest { page: 3, limit: 10 }.slice(&items).len(), 3);
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42"), Some(42));
        assert_eq!(parse_id("0"), None);
        assert_eq!(parse_id("64f1c2e9a1"), None);
        assert_eq!(parse_id(""), None);
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  hi ".into())), Some("hi".to_string()));
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(None), None);
    }
}
