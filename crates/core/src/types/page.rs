//! Pagination arithmetic shared by every listing operation.

use serde::Serialize;

/// Pagination metadata reported alongside list results.
///
/// `total_pages` is `ceil(total / limit)`, floored to zero when the
/// division is undefined (`total == 0` or `limit == 0`) - never NaN or a
/// missing field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// 1-based page number that was requested.
    pub page: u64,
    /// Maximum number of items per page.
    pub limit: u64,
    /// Total number of matching items across all pages.
    pub total: u64,
    /// Total number of pages.
    pub total_pages: u64,
}

impl PageMeta {
    /// Compute pagination metadata for a listing.
    #[must_use]
    pub const fn compute(page: u64, limit: u64, total: u64) -> Self {
        let total_pages = if total == 0 || limit == 0 {
            0
        } else {
            total.div_ceil(limit)
        };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }

    /// Number of items to skip to reach `page`.
    #[must_use]
    pub const fn skip(page: u64, limit: u64) -> u64 {
        page.saturating_sub(1).saturating_mul(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_division() {
        assert_eq!(PageMeta::compute(1, 10, 20).total_pages, 2);
    }

    #[test]
    fn partial_last_page_rounds_up() {
        assert_eq!(PageMeta::compute(1, 10, 25).total_pages, 3);
    }

    #[test]
    fn empty_collection_reports_zero_pages() {
        assert_eq!(PageMeta::compute(1, 10, 0).total_pages, 0);
    }

    #[test]
    fn zero_limit_reports_zero_pages() {
        assert_eq!(PageMeta::compute(1, 0, 42).total_pages, 0);
    }

    #[test]
    fn skip_is_zero_based() {
        assert_eq!(PageMeta::skip(1, 10), 0);
        assert_eq!(PageMeta::skip(3, 10), 20);
        assert_eq!(PageMeta::skip(0, 10), 0);
    }
}
