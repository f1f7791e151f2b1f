use serde::{Deserialize, Serialize};

/// Pagination request. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Pageable {
    pub page: u64,
    pub limit: u64,
}

impl Default for Pageable {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}

impl Pageable {
    pub fn new(page: u64, limit: u64) -> Self {
        Self { page, limit }
    }

    /// Number of documents to skip: `(page - 1) * limit`. Page `0` is treated
    /// as page `1`.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// One page of results plus the total number of matches.
///
/// `content` and `total_elements` come from two separate store reads, so
/// they can disagree if the collection changes in between.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u64,
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, pageable: &Pageable, total_elements: u64) -> Self {
        let total_pages = if pageable.limit == 0 {
            0
        } else {
            total_elements.div_ceil(pageable.limit)
        };
        Self {
            content,
            page: pageable.page.max(1),
            size: pageable.limit,
            total_elements,
            total_pages,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Convert the content while keeping the pagination metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_one_based() {
        assert_eq!(Pageable::new(1, 10).offset(), 0);
        assert_eq!(Pageable::new(3, 10).offset(), 20);
        assert_eq!(Pageable::new(0, 10).offset(), 0);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = Page::new(vec![1, 2], &Pageable::new(2, 2), 5);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next());

        let last = Page::new(vec![5], &Pageable::new(3, 2), 5);
        assert!(!last.has_next());
    }

    #[test]
    fn zero_limit_has_no_pages() {
        let page: Page<i32> = Page::new(vec![], &Pageable::new(1, 0), 12);
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn serializes_with_metadata() {
        let page = Page::new(vec!["a"], &Pageable::new(1, 10), 1).map(str::to_uppercase);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["content"][0], "A");
        assert_eq!(json["total_elements"], 1);
        assert_eq!(json["total_pages"], 1);
    }

    #[test]
    fn pageable_defaults_missing_fields() {
        let p: Pageable = serde_json::from_str(r#"{"page": 4}"#).unwrap();
        assert_eq!(p, Pageable::new(4, 20));
    }
}
