//! Page selection shared by the listing operations.

use serde::Deserialize;

/// 1-based page selection. Out-of-range values are clamped, never rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Pagination {
    pub const MAX_PER_PAGE: u32 = 100;

    /// Zero-based page index and page size, as `Paginator::fetch_page` takes them.
    pub fn normalize(self) -> (u64, u64) {
        let page = self.page.max(1);
        let per_page = self.per_page.clamp(1, Self::MAX_PER_PAGE);
        (u64::from(page - 1), u64::from(per_page))
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, per_page: 20 } }
}

#[cfg(test)]
mod tests {
    use super::Pagination;

    #[test]
    fn zero_page_and_size_are_clamped() {
        assert_eq!(Pagination { page: 0, per_page: 0 }.normalize(), (0, 1));
    }

    #[test]
    fn size_is_capped() {
        assert_eq!(Pagination { page: 5, per_page: 1000 }.normalize(), (4, 100));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let p: Pagination = serde_json::from_str(r#"{"page": 3}"#).unwrap();
        assert_eq!(p, Pagination { page: 3, per_page: 20 });
    }
}
