use std::convert::Infallible;

/// Source of pages for a [`PagedSequence`](crate::sequence::PagedSequence).
///
/// A fetch is asked for `length` elements starting at the logical `start_index`. The returned
/// page is pulled lazily, one element at a time, and dropped as soon as the cursor leaves it.
pub trait PageFetch {
    type Item;
    type Page: Iterator<Item = Self::Item>;
    type Error;

    fn fetch(&self, start_index: usize, length: usize) -> Result<Self::Page, Self::Error>;
}

impl<F, I, E> PageFetch for F
where
    F: Fn(usize, usize) -> Result<I, E>,
    I: IntoIterator,
{
    type Item = I::Item;
    type Page = I::IntoIter;
    type Error = E;

    fn fetch(&self, start_index: usize, length: usize) -> Result<Self::Page, Self::Error> {
        self(start_index, length).map(IntoIterator::into_iter)
    }
}

/// Wraps a fetch function that cannot fail.
#[derive(Clone, Copy, Debug)]
pub struct InfallibleFetch<F> {
    fetch: F,
}

pub fn infallible<F, I>(fetch: F) -> InfallibleFetch<F>
where
    F: Fn(usize, usize) -> I,
    I: IntoIterator,
{
    InfallibleFetch { fetch }
}

impl<F, I> PageFetch for InfallibleFetch<F>
where
    F: Fn(usize, usize) -> I,
    I: IntoIterator,
{
    type Item = I::Item;
    type Page = I::IntoIter;
    type Error = Infallible;

    fn fetch(&self, start_index: usize, length: usize) -> Result<Self::Page, Self::Error> {
        Ok((self.fetch)(start_index, length).into_iter())
    }
}
