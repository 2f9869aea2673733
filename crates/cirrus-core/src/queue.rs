//! Sorted, paginated record queue abstraction.
//!
//! The merge-join driver needs lookahead over two ordered sequences without
//! loading either fully into memory. [`SortedRecordQueue`] buffers one page
//! at a time from a [`PageSource`] and exposes `peek`/`shift`; end of
//! sequence is a terminal, repeatable `None`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{CirrusError, CirrusResult};

/// One page of records from a paginated source.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Whether the source reports a further page after this one.
    pub another_page: bool,
}

impl<T> Page<T> {
    /// Terminal empty page.
    #[must_use]
    pub fn end() -> Self {
        Self {
            items: Vec::new(),
            another_page: false,
        }
    }
}

/// A paginated source of ordered records.
///
/// Implementations are expected to return records in ascending key order
/// across successive pages; `page_index` is zero-based and incremented by the
/// owning queue on every fetch.
#[async_trait]
pub trait PageSource {
    type Item: Send;

    async fn fetch_page(&mut self, page_index: usize) -> CirrusResult<Page<Self::Item>>;
}

/// Pull-based lookahead cursor over a [`PageSource`].
///
/// `peek` is idempotent and does not advance; `shift` returns the current
/// head and advances. When the internal buffer runs dry the queue issues
/// exactly one fetch for the next page. A fetch that returns zero records or
/// signals no further page marks the queue done: once `None` has been
/// observed, every subsequent call returns `None` without another fetch.
#[derive(Debug)]
pub struct SortedRecordQueue<S: PageSource> {
    source: S,
    buffer: VecDeque<S::Item>,
    page_index: usize,
    done: bool,
}

impl<S> SortedRecordQueue<S>
where
    S: PageSource + Send,
{
    pub fn new(source: S) -> Self {
        Self {
            source,
            buffer: VecDeque::new(),
            page_index: 0,
            done: false,
        }
    }

    /// View the next record without consuming it.
    pub async fn peek(&mut self) -> CirrusResult<Option<&S::Item>> {
        self.refill().await?;
        Ok(self.buffer.front())
    }

    /// Remove and return the next record.
    pub async fn shift(&mut self) -> CirrusResult<Option<S::Item>> {
        self.refill().await?;
        Ok(self.buffer.pop_front())
    }

    async fn refill(&mut self) -> CirrusResult<()> {
        if self.done || !self.buffer.is_empty() {
            return Ok(());
        }
        let page = self.source.fetch_page(self.page_index).await?;
        self.page_index += 1;
        if page.items.is_empty() || !page.another_page {
            self.done = true;
        }
        self.buffer.extend(page.items);
        Ok(())
    }
}

/// In-memory page source over a pre-sorted `Vec`.
///
/// Used to exercise the queue and the merge-join driver deterministically;
/// supports injecting a failure at a chosen page index.
#[derive(Debug)]
pub struct VecPageSource<T> {
    items: Vec<T>,
    page_size: usize,
    fail_at_page: Option<usize>,
    fetches: Arc<AtomicUsize>,
}

impl<T: Clone + Send> VecPageSource<T> {
    #[must_use]
    pub fn new(items: Vec<T>, page_size: usize) -> Self {
        Self {
            items,
            page_size: page_size.max(1),
            fail_at_page: None,
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fail the fetch for the given zero-based page index.
    #[must_use]
    pub fn with_failure_at_page(mut self, page_index: usize) -> Self {
        self.fail_at_page = Some(page_index);
        self
    }

    /// Handle on the fetch counter, valid after the source is moved into a
    /// queue.
    #[must_use]
    pub fn fetch_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.fetches)
    }

    /// Wrap this source in a queue.
    #[must_use]
    pub fn into_queue(self) -> SortedRecordQueue<Self> {
        SortedRecordQueue::new(self)
    }
}

#[async_trait]
impl<T: Clone + Send> PageSource for VecPageSource<T> {
    type Item = T;

    async fn fetch_page(&mut self, page_index: usize) -> CirrusResult<Page<T>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_at_page == Some(page_index) {
            return Err(CirrusError::Catalog {
                status: 500,
                message: format!("injected failure at page {page_index}"),
            });
        }
        let start = page_index.saturating_mul(self.page_size).min(self.items.len());
        let end = start.saturating_add(self.page_size).min(self.items.len());
        Ok(Page {
            items: self.items[start..end].to_vec(),
            another_page: end < self.items.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_peek_is_idempotent() {
        let mut queue = VecPageSource::new(vec![1, 2, 3], 2).into_queue();

        for _ in 0..3 {
            assert_eq!(queue.peek().await.unwrap(), Some(&1));
        }
        assert_eq!(queue.shift().await.unwrap(), Some(1));
        assert_eq!(queue.peek().await.unwrap(), Some(&2));
    }

    #[tokio::test]
    async fn test_shift_crosses_page_boundaries_in_order() {
        let mut queue = VecPageSource::new(vec![1, 2, 3, 4, 5], 2).into_queue();

        let mut seen = Vec::new();
        while let Some(item) = queue.shift().await.unwrap() {
            seen.push(item);
        }
        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_end_of_sequence_is_terminal() {
        let source = VecPageSource::new(vec![1], 10);
        let fetches = source.fetch_counter();
        let mut queue = source.into_queue();

        assert_eq!(queue.shift().await.unwrap(), Some(1));
        assert_eq!(queue.shift().await.unwrap(), None);
        assert_eq!(queue.peek().await.unwrap(), None);
        assert_eq!(queue.shift().await.unwrap(), None);

        // A short page marks the queue done with no follow-up fetch.
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_source_returns_none_after_one_fetch() {
        let source: VecPageSource<i32> = VecPageSource::new(vec![], 10);
        let fetches = source.fetch_counter();
        let mut queue = source.into_queue();

        assert_eq!(queue.peek().await.unwrap(), None);
        assert_eq!(queue.shift().await.unwrap(), None);
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refill_issues_one_fetch_per_exhausted_buffer() {
        let source = VecPageSource::new(vec![1, 2, 3, 4], 2);
        let fetches = source.fetch_counter();
        let mut queue = source.into_queue();

        assert_eq!(queue.shift().await.unwrap(), Some(1));
        assert_eq!(queue.shift().await.unwrap(), Some(2));
        assert_eq!(fetches.load(Ordering::SeqCst), 1);

        assert_eq!(queue.shift().await.unwrap(), Some(3));
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_injected_failure_propagates() {
        let mut queue = VecPageSource::new(vec![1, 2, 3], 2)
            .with_failure_at_page(1)
            .into_queue();

        assert_eq!(queue.shift().await.unwrap(), Some(1));
        assert_eq!(queue.shift().await.unwrap(), Some(2));
        let err = queue.shift().await.unwrap_err();
        assert!(matches!(err, CirrusError::Catalog { status: 500, .. }));
    }
}
