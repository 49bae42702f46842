//! Rendered views and page arithmetic.

use smallvec::SmallVec;

use super::action::{Action, ActionCodec, ActionError};

/// A labeled action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    /// Encoded action identifier
    pub action: String,
}

/// One row of buttons; navigation rows hold at most three.
pub type ButtonRow = SmallVec<[Button; 3]>;

/// Text body plus a grid of buttons
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct View {
    pub text: String,
    pub rows: Vec<ButtonRow>,
}

impl View {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: ButtonRow) {
        if !row.is_empty() {
            self.rows.push(row);
        }
    }

    /// Add a row with a single button.
    pub fn push_button(&mut self, button: Button) {
        let mut row = ButtonRow::new();
        row.push(button);
        self.rows.push(row);
    }

    /// All buttons, row by row.
    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.rows.iter().flatten()
    }

    pub fn find_button(&self, action: &str) -> Option<&Button> {
        self.buttons().find(|b| b.action == action)
    }
}

/// `ceil(count / page_size)`; zero when there is nothing to show.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1))
}

/// One page of a result list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDescriptor {
    /// Zero-based, clamped into range
    pub page: usize,
    pub total_pages: usize,
    pub page_size: usize,
    pub count: usize,
}

impl PageDescriptor {
    pub fn new(count: usize, page_size: usize, requested: usize) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total_pages(count, page_size);
        Self {
            page: requested.min(total_pages.saturating_sub(1)),
            total_pages,
            page_size,
            count,
        }
    }

    pub fn has_prev(&self) -> bool {
        self.page > 0
    }

    pub fn has_next(&self) -> bool {
        self.page + 1 < self.total_pages
    }

    /// Index of the first item on this page.
    pub fn offset(&self) -> usize {
        self.page * self.page_size
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset().min(items.len());
        let end = (start + self.page_size).min(items.len());
        &items[start..end]
    }

    /// `page+1/total_pages`
    pub fn indicator(&self) -> String {
        format!("{}/{}", self.page + 1, self.total_pages)
    }
}

/// Prev / indicator / next row, or `None` when it would hold only the indicator.
pub fn nav_row(
    desc: &PageDescriptor,
    codec: &ActionCodec,
    at_page: impl Fn(usize) -> Action,
) -> Result<Option<ButtonRow>, ActionError> {
    if !desc.has_prev() && !desc.has_next() {
        return Ok(None);
    }

    let mut row = ButtonRow::new();
    if desc.has_prev() {
        row.push(codec.button("⬅️ Prev", &at_page(desc.page - 1))?);
    }
    row.push(codec.button(desc.indicator(), &Action::Noop)?);
    if desc.has_next() {
        row.push(codec.button("Next ➡️", &at_page(desc.page + 1))?);
    }
    Ok(Some(row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::tokens::TokenCache;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn codec() -> ActionCodec {
        ActionCodec::new(Arc::new(TokenCache::new(100, 20, 16)), 64)
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 5), 0);
        assert_eq!(total_pages(1, 5), 1);
        assert_eq!(total_pages(5, 5), 1);
        assert_eq!(total_pages(6, 5), 2);
    }

    #[test]
    fn test_page_is_clamped() {
        let desc = PageDescriptor::new(12, 5, 99);
        assert_eq!(desc.page, 2);
        assert_eq!(desc.slice(&(0..12).collect::<Vec<_>>()), &[10, 11]);

        let empty = PageDescriptor::new(0, 5, 3);
        assert_eq!(empty.page, 0);
        assert!(empty.slice::<u8>(&[]).is_empty());
    }

    #[test]
    fn test_single_page_has_no_nav_row() {
        let desc = PageDescriptor::new(3, 5, 0);
        let row = nav_row(&desc, &codec(), |page| Action::ArtistsPage { page }).unwrap();
        assert!(row.is_none());
    }

    #[test]
    fn test_middle_page_nav_row() {
        let desc = PageDescriptor::new(30, 10, 1);
        let row = nav_row(&desc, &codec(), |page| Action::ArtistsPage { page })
            .unwrap()
            .unwrap();

        let actions: Vec<_> = row.iter().map(|b| b.action.as_str()).collect();
        assert_eq!(actions, vec!["artists_page:::0", "noop:::0", "artists_page:::2"]);
        assert_eq!(row[1].label, "2/3");
    }

    proptest! {
        #[test]
        fn prop_page_arithmetic(count in 0usize..500, size in 1usize..50, requested in 0usize..100) {
            let desc = PageDescriptor::new(count, size, requested);

            prop_assert_eq!(desc.total_pages, (count + size - 1) / size);
            prop_assert!(desc.total_pages == 0 || desc.page < desc.total_pages);
            prop_assert_eq!(desc.has_prev(), desc.page > 0);
            prop_assert_eq!(
                desc.has_next(),
                desc.total_pages > 0 && desc.page != desc.total_pages - 1
            );

            let items: Vec<usize> = (0..count).collect();
            let slice = desc.slice(&items);
            prop_assert!(slice.len() <= size);
            if count > 0 {
                prop_assert!(!slice.is_empty());
            }

            let row = nav_row(&desc, &codec(), |page| Action::ArtistsPage { page }).unwrap();
            prop_assert_eq!(row.is_some(), desc.total_pages > 1);
            if let Some(row) = row {
                prop_assert!(row.iter().any(|b| b.action == "noop:::0"));
            }
        }
    }
}
