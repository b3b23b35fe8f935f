use std::iter::Take;

use crate::{cursor::PageCursor, fetch::PageFetch};

#[cfg(feature = "config")]
use crate::config::PagingConfig;

#[derive(thiserror::Error, Debug)]
pub enum PagedSequenceError {
    #[error("Page size must be positive")]
    ZeroPageSize,
}

/// `total_count` elements exposed as one flat sequence, fetched `page_size` elements at a time.
/// Every [`iter`](Self::iter) starts an independent cursor.
pub struct PagedSequence<Fetch: PageFetch> {
    fetch: Fetch,
    page_size: usize,
    total_count: usize,
}

impl<Fetch: PageFetch> PagedSequence<Fetch> {
    pub fn new(fetch: Fetch, page_size: usize, total_count: usize) -> Result<Self, PagedSequenceError> {
        if page_size == 0 {
            return Err(PagedSequenceError::ZeroPageSize);
        }
        Ok(PagedSequence {
            fetch,
            page_size,
            total_count,
        })
    }

    #[cfg(feature = "config")]
    pub fn from_config(fetch: Fetch, config: &PagingConfig, total_count: usize) -> Result<Self, PagedSequenceError> {
        Self::new(fetch, config.page_size, total_count)
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn page_count(&self) -> usize {
        self.total_count.div_ceil(self.page_size)
    }

    pub fn fetch(&self) -> &Fetch {
        &self.fetch
    }

    pub fn iter(&self) -> PageCursor<'_, Fetch> {
        PageCursor::new(self)
    }

    /// Elements of the `page_index`-th fixed-size page, counted from the start of the sequence.
    pub fn page(&self, page_index: usize) -> Take<PageCursor<'_, Fetch>> {
        self.iter()
            .skip_positions(page_index.saturating_mul(self.page_size))
            .take(self.page_size)
    }
}

impl<'seq, Fetch: PageFetch> IntoIterator for &'seq PagedSequence<Fetch> {
    type Item = <PageCursor<'seq, Fetch> as Iterator>::Item;
    type IntoIter = PageCursor<'seq, Fetch>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::fetch::infallible;

    fn identity(start: usize, length: usize) -> std::ops::Range<usize> {
        start..start + length
    }

    #[test]
    fn test_page_count() {
        let cases = [(10, 4, 3), (0, 4, 0), (8, 4, 2), (1, 4, 1), (9, 1, 9), (3, 10, 1)];
        for (total_count, page_size, page_count) in cases {
            let sequence = PagedSequence::new(infallible(identity), page_size, total_count).unwrap();
            assert_eq!(sequence.page_count(), page_count, "total {} / page {}", total_count, page_size);
            assert_eq!(sequence.page_size(), page_size);
            assert_eq!(sequence.total_count(), total_count);
        }
    }

    #[test]
    fn test_zero_page_size() {
        assert!(matches!(
            PagedSequence::new(infallible(identity), 0, 10),
            Err(PagedSequenceError::ZeroPageSize)
        ));
    }

    #[test]
    fn test_construction_does_not_fetch() {
        let calls = Rc::new(RefCell::new(0));
        let fetch = {
            let calls = calls.clone();
            infallible(move |start: usize, length: usize| {
                *calls.borrow_mut() += 1;
                identity(start, length)
            })
        };

        let sequence = PagedSequence::new(fetch, 4, 10).unwrap();
        let cursor = sequence.iter();
        assert_eq!(*calls.borrow(), 0);
        drop(cursor);
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn test_for_loop() {
        let sequence = PagedSequence::new(infallible(identity), 4, 10).unwrap();

        let mut items = Vec::new();
        for item in &sequence {
            items.push(item.unwrap());
        }
        assert_eq!(items, (0..10).collect::<Vec<_>>());

        // traversal is repeatable
        let again: Vec<usize> = (&sequence).into_iter().collect::<Result<_, _>>().unwrap();
        assert_eq!(again, items);
    }

    #[test]
    fn test_pages() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let fetch = {
            let calls = calls.clone();
            infallible(move |start: usize, length: usize| {
                calls.borrow_mut().push((start, length));
                identity(start, length)
            })
        };
        let sequence = PagedSequence::new(fetch, 4, 10).unwrap();

        let pages: Vec<Vec<usize>> = (0..sequence.page_count())
            .map(|page_index| sequence.page(page_index).collect::<Result<_, _>>().unwrap())
            .collect();
        assert_eq!(pages, vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7], vec![8, 9]]);
        assert_eq!(*calls.borrow(), vec![(0, 4), (4, 4), (8, 2)]);

        assert_eq!(sequence.page(3).count(), 0);
        assert_eq!(sequence.page(usize::MAX).count(), 0);
        assert_eq!(calls.borrow().len(), 3);
    }
}
