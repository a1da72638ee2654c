//! Change-gated stream delivery.

use futures::{Stream, ready};
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Extension trait to suppress consecutive duplicate items on any Stream
pub trait DistinctExt: Stream {
    /// Yield an item only when it differs from the previously yielded one.
    ///
    /// The first item always passes. Useful on snapshot streams where
    /// redundant re-publications carry no information.
    fn distinct(self) -> Distinct<Self>
    where
        Self: Sized,
        Self::Item: Clone + PartialEq,
    {
        Distinct::new(self)
    }
}

impl<T: Stream> DistinctExt for T {}

pin_project! {
    /// A stream combinator that drops consecutive equal items
    pub struct Distinct<S: Stream> {
        #[pin]
        stream: S,
        last: Option<S::Item>,
    }
}

impl<S: Stream> Distinct<S> {
    pub fn new(stream: S) -> Self {
        Self { stream, last: None }
    }
}

impl<S> Stream for Distinct<S>
where
    S: Stream,
    S::Item: Clone + PartialEq,
{
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            match ready!(this.stream.as_mut().poll_next(cx)) {
                Some(item) => {
                    if this.last.as_ref() == Some(&item) {
                        // Duplicate: keep polling
                        continue;
                    }
                    *this.last = Some(item.clone());
                    return Poll::Ready(Some(item));
                }
                None => return Poll::Ready(None),
            }
        }
    }
}
