use serde::Serialize;

/// Window of a paginated listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub item_count: u64,
    pub page_size: u64,
    pub page_count: u64,
    pub page_index: u64,
    pub offset: u64,
    pub limit: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

pub const PAGE_SIZE: u64 = 10;

impl Page {
    /// A page past the end, or of an empty listing, is the empty first page
    pub fn new(item_count: u64, page_index: u64, page_size: u64) -> Self {
        let page_size = page_size.max(1);
        let page_count = (item_count + page_size - 1) / page_size;

        let (page_index, offset, limit) = if item_count == 0 || page_index > page_count {
            (1, 0, 0)
        } else {
            (page_index, page_size * (page_index - 1), page_size)
        };

        Self {
            item_count,
            page_size,
            page_count,
            page_index,
            offset,
            limit,
            has_next: page_index < page_count,
            has_previous: page_index > 1,
        }
    }
}

/// Page number from a query value, anything unparsable or below 1 is 1
pub fn page_index(s: &str) -> u64 {
    s.trim().parse::<u64>().unwrap_or(1).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows() {
        let p = Page::new(100, 1, 10);
        assert_eq!((p.page_count, p.offset, p.limit), (10, 0, 10));
        assert!(p.has_next && !p.has_previous);

        let p = Page::new(90, 9, 10);
        assert_eq!((p.page_count, p.offset, p.limit), (9, 80, 10));
        assert!(!p.has_next && p.has_previous);

        let p = Page::new(91, 10, 10);
        assert_eq!((p.page_count, p.offset, p.limit), (10, 90, 10));
    }

    #[test]
    fn out_of_range() {
        let p = Page::new(0, 3, 10);
        assert_eq!((p.page_count, p.page_index, p.offset, p.limit), (0, 1, 0, 0));

        let p = Page::new(15, 5, 10);
        assert_eq!((p.page_index, p.limit), (1, 0));
    }

    #[test]
    fn index_parsing() {
        assert_eq!(page_index("3"), 3);
        assert_eq!(page_index("0"), 1);
        assert_eq!(page_index("-2"), 1);
        assert_eq!(page_index("abc"), 1);
    }
}
