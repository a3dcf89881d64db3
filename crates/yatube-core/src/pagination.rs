//! Page-number pagination over ordered listings.

use std::num::IntErrorKind;

use serde::Serialize;

/// Posts shown per listing page.
pub const POSTS_PER_PAGE: u64 = 10;

/// A requested page, before the size of the listing is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    number: i64,
    per_page: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

impl PageRequest {
    pub fn first() -> Self {
        Self::number(1)
    }

    pub fn number(number: i64) -> Self {
        Self {
            number,
            per_page: POSTS_PER_PAGE,
        }
    }

    /// Parse the `page` query parameter. Anything that is not an integer
    /// means the first page. Integers too large for `i64` saturate, so they
    /// still clamp like any other out-of-range number.
    pub fn from_query(raw: Option<&str>) -> Self {
        raw.and_then(parse_page_number)
            .map(Self::number)
            .unwrap_or_default()
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    /// Resolve against the listing size. Out-of-range numbers clamp to the
    /// nearest existing page; an empty listing still has one page.
    pub fn window(&self, total: u64) -> PageWindow {
        let num_pages = total.div_ceil(self.per_page).max(1);
        let number = self.number.clamp(1, num_pages as i64) as u64;

        PageWindow {
            number,
            num_pages,
            total,
            offset: (number - 1) * self.per_page,
            limit: self.per_page,
        }
    }
}

fn parse_page_number(raw: &str) -> Option<i64> {
    match raw.trim().parse::<i64>() {
        Ok(number) => Some(number),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}

/// Resolved page position within a listing of known size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

impl PageWindow {
    pub fn into_page<T>(self, items: Vec<T>) -> Page<T> {
        Page {
            items,
            number: self.number,
            num_pages: self.num_pages,
            total: self.total,
        }
    }
}

/// One page of an ordered listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        PageRequest::first().window(0).into_page(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            total: self.total,
        }
    }
}

/// Slice an already ordered, fully loaded listing.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let window = request.window(items.len() as u64);
    let page_items = items
        .into_iter()
        .skip(window.offset as usize)
        .take(window.limit as usize)
        .collect();
    window.into_page(page_items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twenty_one_items_make_three_pages() {
        let items: Vec<u32> = (0..21).collect();

        let first = paginate(items.clone(), PageRequest::number(1));
        assert_eq!(first.len(), 10);
        assert_eq!(first.num_pages, 3);
        assert!(first.has_next());
        assert!(!first.has_previous());

        assert_eq!(paginate(items.clone(), PageRequest::number(2)).len(), 10);

        let last = paginate(items, PageRequest::number(3));
        assert_eq!(last.items, vec![20]);
        assert!(!last.has_next());
    }

    #[test]
    fn out_of_range_pages_clamp() {
        let items: Vec<u32> = (0..21).collect();
        assert_eq!(paginate(items.clone(), PageRequest::number(99)).number, 3);
        assert_eq!(paginate(items.clone(), PageRequest::number(0)).number, 1);
        assert_eq!(paginate(items, PageRequest::number(-4)).number, 1);
    }

    #[test]
    fn garbage_page_parameter_means_first_page() {
        assert_eq!(PageRequest::from_query(Some("abc")), PageRequest::first());
        assert_eq!(PageRequest::from_query(None), PageRequest::first());
        assert_eq!(PageRequest::from_query(Some("2")), PageRequest::number(2));
        assert_eq!(PageRequest::from_query(Some("")), PageRequest::first());
        assert_eq!(PageRequest::from_query(Some("1.5")), PageRequest::first());
    }

    #[test]
    fn huge_page_numbers_still_clamp() {
        let items: Vec<u32> = (0..21).collect();

        let huge = PageRequest::from_query(Some("99999999999999999999"));
        assert_eq!(huge, PageRequest::number(i64::MAX));
        assert_eq!(paginate(items.clone(), huge).number, 3);

        let tiny = PageRequest::from_query(Some("-99999999999999999999"));
        assert_eq!(paginate(items, tiny).number, 1);
    }

    #[test]
    fn empty_listing_has_one_empty_page() {
        let page = paginate(Vec::<u32>::new(), PageRequest::number(5));
        assert_eq!(page.number, 1);
        assert_eq!(page.num_pages, 1);
        assert!(page.is_empty());
        assert_eq!(page, Page::empty());
    }

    #[test]
    fn window_offsets_follow_page_number() {
        let window = PageRequest::number(2).window(35);
        assert_eq!(window.offset, 10);
        assert_eq!(window.limit, 10);
        assert_eq!(window.num_pages, 4);
    }
}
