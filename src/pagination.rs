//! Page/limit parsing and skip/take windows for list endpoints.

use serde::Serialize;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 1000;

/// Parses a positive integer; anything missing, non-numeric or non-positive yields `default`.
pub fn parse_positive_int(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub skip: u64,
    pub take: u64,
}

/// Largest skip a SQL `OFFSET` (a signed 64-bit value) accepts.
pub const MAX_SKIP: u64 = i64::MAX as u64;

pub fn pagination_window(page: u64, limit: u64) -> Window {
    Window {
        skip: page.saturating_sub(1).saturating_mul(limit).min(MAX_SKIP),
        take: limit,
    }
}

pub fn total_pages(total: u64, limit: u64) -> u64 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(limit)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        Self {
            page,
            limit,
            total,
            total_pages: total_pages(total, limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_parsing() {
        assert_eq!(parse_positive_int(Some("3"), 1), 3);
        assert_eq!(parse_positive_int(Some("0"), 1), 1);
        assert_eq!(parse_positive_int(Some("-2"), 10), 10);
        assert_eq!(parse_positive_int(Some("ten"), 10), 10);
        assert_eq!(parse_positive_int(None, 10), 10);
    }

    #[test]
    fn windows() {
        assert_eq!(pagination_window(1, 10), Window { skip: 0, take: 10 });
        assert_eq!(pagination_window(3, 25), Window { skip: 50, take: 25 });
    }

    #[test]
    fn huge_pages_stay_within_offset_range() {
        let window = pagination_window(u64::MAX, 10);
        assert_eq!(window.skip, i64::MAX as u64);
        assert_eq!(window.take, 10);
        let page = parse_positive_int(Some("18446744073709551615"), DEFAULT_PAGE);
        assert_eq!(pagination_window(page, MAX_LIMIT).skip, MAX_SKIP);
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(20, 10), 2);
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(Pagination::new(2, 10, 25).total_pages, 3);
    }
}
