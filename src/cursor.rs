use crate::{fetch::PageFetch, sequence::PagedSequence};

#[derive(thiserror::Error, Debug)]
pub enum PagingError<E> {
    #[error("Invalid cursor state: {0}")]
    InvalidState(&'static str),

    #[error("Page fetch failed: {0}")]
    Fetch(#[source] E),

    #[error("Page fetch returned no elements (start index {start_index}, length {length})")]
    EmptyPage { start_index: usize, length: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorPhase {
    NotStarted,
    InPage,
    Exhausted,
    Disposed,
}

struct ActivePage<P: Iterator> {
    start_index: usize,
    // `None` once the element at the cursor position was moved out by `Iterator::next`
    current: Option<P::Item>,
    rest: P,
}

enum CursorState<P: Iterator> {
    NotStarted,
    InPage {
        index: usize,
        page: Option<ActivePage<P>>,
    },
    Exhausted,
    Disposed,
}

/// Traversal over a [`PagedSequence`] holding at most one page at a time.
///
/// Pages are fetched on the first read of a position that has no page behind it, and the fetch
/// always starts at that position. A page is released as soon as its elements run out, when the
/// traversal ends, or when the cursor is reset, disposed or dropped.
pub struct PageCursor<'seq, Fetch: PageFetch> {
    sequence: &'seq PagedSequence<Fetch>,
    state: CursorState<Fetch::Page>,
}

impl<'seq, Fetch: PageFetch> PageCursor<'seq, Fetch> {
    pub(crate) fn new(sequence: &'seq PagedSequence<Fetch>) -> Self {
        log::debug!(
            "New page cursor (total count {}, page size {})",
            sequence.total_count(),
            sequence.page_size(),
        );
        PageCursor {
            sequence,
            state: CursorState::NotStarted,
        }
    }

    pub fn phase(&self) -> CursorPhase {
        match self.state {
            CursorState::NotStarted => CursorPhase::NotStarted,
            CursorState::InPage { .. } => CursorPhase::InPage,
            CursorState::Exhausted => CursorPhase::Exhausted,
            CursorState::Disposed => CursorPhase::Disposed,
        }
    }

    pub fn position(&self) -> Option<usize> {
        match self.state {
            CursorState::InPage { index, .. } => Some(index),
            _ => None,
        }
    }

    pub fn remaining(&self) -> usize {
        let total_count = self.sequence.total_count();
        match self.state {
            CursorState::NotStarted => total_count,
            CursorState::InPage { index, .. } => total_count - index - 1,
            CursorState::Exhausted | CursorState::Disposed => 0,
        }
    }

    /// Moves to the next logical position without fetching anything.
    ///
    /// Returns `false` once there is no next element; further calls keep returning `false`.
    pub fn advance(&mut self) -> Result<bool, PagingError<Fetch::Error>> {
        let total_count = self.sequence.total_count();
        let next_index = match &mut self.state {
            CursorState::Disposed => return Err(PagingError::InvalidState("cursor is disposed")),
            CursorState::Exhausted => return Ok(false),
            CursorState::NotStarted => 0,
            CursorState::InPage { index, page } => {
                if *index + 1 < total_count {
                    if let Some(active) = page.as_mut() {
                        active.current = active.rest.next();
                        if active.current.is_none() {
                            release(page);
                        }
                    }
                }
                *index + 1
            }
        };

        if next_index >= total_count {
            log::trace!("advance: exhausted after {} elements", total_count);
            self.release_into(CursorState::Exhausted);
            return Ok(false);
        }

        match &mut self.state {
            CursorState::InPage { index, .. } => *index = next_index,
            state => {
                *state = CursorState::InPage {
                    index: next_index,
                    page: None,
                }
            }
        }
        log::trace!("advance: [{}]", next_index);
        Ok(true)
    }

    /// Advances over `count` positions without fetching them, so the first page fetched afterwards
    /// starts at the position landed on.
    pub fn skip_positions(mut self, count: usize) -> Self {
        for _ in 0..count {
            match self.advance() {
                Ok(true) => {}
                Ok(false) | Err(_) => break,
            }
        }
        self
    }

    /// Element at the current position, fetching a page starting here if none is held.
    ///
    /// Repeated calls without an intervening advance return the same element and fetch at most
    /// once.
    pub fn current(&mut self) -> Result<&Fetch::Item, PagingError<Fetch::Error>> {
        let active = self.materialize()?;
        active
            .current
            .as_ref()
            .ok_or(PagingError::InvalidState("current element was already taken"))
    }

    /// Releases the active page and moves the cursor back before the first element.
    pub fn reset(&mut self) -> Result<(), PagingError<Fetch::Error>> {
        if let CursorState::Disposed = self.state {
            return Err(PagingError::InvalidState("cursor is disposed"));
        }
        log::trace!("reset");
        self.release_into(CursorState::NotStarted);
        Ok(())
    }

    /// Releases the active page and makes the cursor unusable. Safe to call more than once.
    pub fn dispose(&mut self) {
        if let CursorState::Disposed = self.state {
            return;
        }
        log::trace!("dispose");
        self.release_into(CursorState::Disposed);
    }

    fn release_into(&mut self, state: CursorState<Fetch::Page>) {
        if let CursorState::InPage { page, .. } = &mut self.state {
            release(page);
        }
        self.state = state;
    }

    fn materialize(&mut self) -> Result<&mut ActivePage<Fetch::Page>, PagingError<Fetch::Error>> {
        let (index, page) = match &mut self.state {
            CursorState::InPage { index, page } => (*index, page),
            CursorState::NotStarted => return Err(PagingError::InvalidState("cursor is not started")),
            CursorState::Exhausted => return Err(PagingError::InvalidState("cursor is exhausted")),
            CursorState::Disposed => return Err(PagingError::InvalidState("cursor is disposed")),
        };

        if page.is_none() {
            let length = self.sequence.page_size().min(self.sequence.total_count() - index);
            let mut rest = self.sequence.fetch().fetch(index, length).map_err(PagingError::Fetch)?;
            let current = rest.next();
            log::trace!("fetch({}, {}): {}", index, length, current.is_some());
            if current.is_none() {
                log::warn!("Page fetch at {} returned no elements", index);
                return Err(PagingError::EmptyPage { start_index: index, length });
            }
            *page = Some(ActivePage {
                start_index: index,
                current,
                rest,
            });
        }

        page.as_mut().ok_or(PagingError::InvalidState("page is not materialized"))
    }

    fn fail(&mut self, err: PagingError<Fetch::Error>) -> Option<<Self as Iterator>::Item> {
        self.dispose();
        Some(Err(err))
    }
}

fn release<P: Iterator>(page: &mut Option<ActivePage<P>>) {
    if let Some(active) = page.take() {
        log::trace!("release page starting at {}", active.start_index);
        drop(active);
    }
}

impl<Fetch: PageFetch> Iterator for PageCursor<'_, Fetch> {
    type Item = Result<Fetch::Item, PagingError<Fetch::Error>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.advance() {
            Ok(true) => {}
            Ok(false) | Err(_) => return None,
        }
        match self.materialize() {
            Ok(active) => active
                .current
                .take()
                .map(Ok)
                .or_else(|| Some(Err(PagingError::InvalidState("current element was already taken")))),
            Err(err) => self.fail(err),
        }
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        for _ in 0..n {
            match self.advance() {
                Ok(true) => {}
                Ok(false) | Err(_) => return None,
            }
        }
        self.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining()))
    }
}

impl<Fetch: PageFetch> Drop for PageCursor<'_, Fetch> {
    fn drop(&mut self) {
        self.dispose();
    }
}
