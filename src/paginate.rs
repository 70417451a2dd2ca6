//! paginate — разбиение упорядоченного набора offense records на страницы.
//!
//! Layout:
//! - primary page  : first `initial` records, kept on the petition itself;
//! - overflow pages: the rest, in contiguous chunks of `attachment` records,
//!                   the last chunk holds whatever remains (1..=attachment).
//!
//! Semantics:
//! - Pure and positional: boundaries depend only on the index in the input order,
//!   never on record contents (records sharing a case number may be split).
//! - Sizes <= 0 silently fall back to DEFAULT_INITIAL_PAGE_SIZE (10) and
//!   DEFAULT_ATTACHMENT_PAGE_SIZE (20); nothing here returns an error.
//! - N <= initial ⇒ zero overflow pages; empty input ⇒ empty primary page.
//!
//! Two entry points over the same rule:
//! - `partition`        — over a slice; `Partition::overflow()` can be re-run any number of times.
//! - `partition_stream` — over any iterator (streaming cursor); overflow pages are pulled lazily.

use anyhow::Result;

use crate::consts::{DEFAULT_ATTACHMENT_PAGE_SIZE, DEFAULT_INITIAL_PAGE_SIZE};
use crate::model::{OffenseRecord, PetitionId};
use crate::source::RecordSource;

/// Effective page sizes; both are always >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSizes {
    initial: usize,
    attachment: usize,
}

#[inline]
fn positive_or(size: i64, default: usize) -> usize {
    if size > 0 {
        usize::try_from(size).unwrap_or(usize::MAX)
    } else {
        default
    }
}

impl PageSizes {
    /// Apply the defaulting rule: non-positive sizes become the defaults.
    pub fn new(initial_page_size: i64, attachment_page_size: i64) -> Self {
        Self {
            initial: positive_or(initial_page_size, DEFAULT_INITIAL_PAGE_SIZE),
            attachment: positive_or(attachment_page_size, DEFAULT_ATTACHMENT_PAGE_SIZE),
        }
    }

    #[inline]
    pub fn initial(&self) -> usize {
        self.initial
    }

    #[inline]
    pub fn attachment(&self) -> usize {
        self.attachment
    }

    /// Number of overflow pages for `total` records.
    pub fn overflow_count(&self, total: usize) -> usize {
        total.saturating_sub(self.initial).div_ceil(self.attachment)
    }
}

impl Default for PageSizes {
    fn default() -> Self {
        Self {
            initial: DEFAULT_INITIAL_PAGE_SIZE,
            attachment: DEFAULT_ATTACHMENT_PAGE_SIZE,
        }
    }
}

// ---------------- slice partition ----------------

/// Borrowed partition of an ordered slice.
#[derive(Debug, Clone, Copy)]
pub struct Partition<'a, T> {
    primary: &'a [T],
    rest: &'a [T],
    chunk: usize,
}

impl<'a, T> Partition<'a, T> {
    /// Primary page (possibly empty).
    pub fn primary(&self) -> &'a [T] {
        self.primary
    }

    /// Lazy overflow pages. Each call starts over from the first page.
    pub fn overflow(&self) -> std::slice::Chunks<'a, T> {
        self.rest.chunks(self.chunk)
    }

    /// Number of overflow pages.
    pub fn overflow_len(&self) -> usize {
        self.rest.len().div_ceil(self.chunk)
    }

    /// Records left after the primary page.
    pub fn remaining(&self) -> usize {
        self.rest.len()
    }
}

pub fn partition<T>(records: &[T], sizes: PageSizes) -> Partition<'_, T> {
    let split = sizes.initial().min(records.len());
    let (primary, rest) = records.split_at(split);
    Partition {
        primary,
        rest,
        chunk: sizes.attachment(),
    }
}

// ---------------- streaming partition ----------------

/// Overflow pages pulled lazily from the underlying iterator.
#[derive(Debug)]
pub struct OverflowStream<I> {
    inner: I,
    chunk: usize,
    done: bool,
}

impl<I: Iterator> Iterator for OverflowStream<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        // capacity from what the cursor reports, not from the configured size
        let mut page = Vec::with_capacity(self.chunk.min(self.inner.size_hint().0));
        page.extend(self.inner.by_ref().take(self.chunk));
        if page.len() < self.chunk {
            // short (or empty) page means the cursor is drained
            self.done = true;
        }
        if page.is_empty() {
            None
        } else {
            Some(page)
        }
    }
}

impl<I: Iterator> std::iter::FusedIterator for OverflowStream<I> {}

/// Drain the primary page eagerly, leave overflow pages to the returned stream.
pub fn partition_stream<I>(records: I, sizes: PageSizes) -> (Vec<I::Item>, OverflowStream<I::IntoIter>)
where
    I: IntoIterator,
{
    let mut inner = records.into_iter();
    let primary: Vec<I::Item> = inner.by_ref().take(sizes.initial()).collect();
    let done = primary.len() < sizes.initial();
    (
        primary,
        OverflowStream {
            inner,
            chunk: sizes.attachment(),
            done,
        },
    )
}

// ---------------- petition-bound paginator ----------------

/// Paginator bound to one petition and a record source.
/// Every call re-reads the ordered sequence, so results are derived, not cached.
pub struct OffenseRecordPaginator<'s, S: RecordSource + ?Sized> {
    source: &'s S,
    petition: PetitionId,
    sizes: PageSizes,
}

impl<'s, S: RecordSource + ?Sized> OffenseRecordPaginator<'s, S> {
    pub fn new(
        source: &'s S,
        petition: PetitionId,
        initial_page_size: i64,
        attachment_page_size: i64,
    ) -> Self {
        Self::with_sizes(
            source,
            petition,
            PageSizes::new(initial_page_size, attachment_page_size),
        )
    }

    pub fn with_sizes(source: &'s S, petition: PetitionId, sizes: PageSizes) -> Self {
        Self {
            source,
            petition,
            sizes,
        }
    }

    pub fn petition(&self) -> PetitionId {
        self.petition
    }

    pub fn sizes(&self) -> PageSizes {
        self.sizes
    }

    pub fn initial_page_size(&self) -> usize {
        self.sizes.initial()
    }

    pub fn attachment_page_size(&self) -> usize {
        self.sizes.attachment()
    }

    /// Records for the primary page.
    pub fn petition_offense_records(&self) -> Result<Vec<OffenseRecord>> {
        let mut records = self.source.ordered_offense_records(self.petition)?;
        records.truncate(self.sizes.initial());
        Ok(records)
    }

    /// Lazy overflow pages (one per attachment).
    pub fn attachment_offense_records(
        &self,
    ) -> Result<OverflowStream<std::vec::IntoIter<OffenseRecord>>> {
        let records = self.source.ordered_offense_records(self.petition)?;
        let (_, overflow) = partition_stream(records, self.sizes);
        Ok(overflow)
    }
}
