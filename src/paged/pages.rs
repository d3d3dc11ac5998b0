//! Unlocked page storage behind a `PagedSequence`.

use crate::default_list::DefaultList;
use crate::error::{Error, Result};
use crate::paged::dirt::DirtLog;
use std::mem;
use std::ops::Range;
use tracing::{debug, trace};

/// A contiguous chunk of elements.
///
/// A page's nominal start is `number * page_size`; it's never stored.
#[derive(Clone, Debug)]
pub(crate) struct Page<T> {
    pub(crate) data: Vec<T>,
}

impl<T> Page<T> {
    fn new(data: Vec<T>) -> Self {
        Self { data }
    }

    #[inline]
    fn len(&self) -> usize {
        self.data.len()
    }
}

fn empty_page<T>(_number: usize) -> Page<T> {
    Page::new(Vec::new())
}

type PageList<T> = DefaultList<Page<T>, fn(usize) -> Page<T>>;

pub(crate) struct Pages<T> {
    pages: PageList<T>,
    dirt: DirtLog,
    page_size: usize,
}

// construction and inspection
impl<T> Pages<T> {
    pub(crate) fn new(page_size: usize) -> Self {
        Self::from_vec(Vec::new(), page_size)
    }

    /// Cut `values` into nominal-size pages.
    pub(crate) fn from_vec(values: Vec<T>, page_size: usize) -> Self {
        debug_assert!(page_size > 0);
        let mut pages = Self {
            pages: DefaultList::with_producer(empty_page as fn(usize) -> Page<T>),
            dirt: DirtLog::new(),
            page_size,
        };
        pages.pages.extend(chunk(values, page_size).map(Page::new));
        pages.recompute_dirt();
        pages
    }

    pub(crate) fn from_pages(pages: Vec<Vec<T>>, page_size: usize) -> Self {
        let mut this = Self::new(page_size);
        this.pages
            .extend(pages.into_iter().filter(|data| !data.is_empty()).map(Page::new));
        this.recompute_dirt();
        this
    }

    #[inline]
    pub(crate) fn page_size(&self) -> usize {
        self.page_size
    }

    pub(crate) fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub(crate) fn dirt(&self) -> &DirtLog {
        &self.dirt
    }

    /// The logical length, derived from the page count and the dirt log.
    pub(crate) fn len(&self) -> usize {
        let nominal = (self.pages.len() * self.page_size) as isize;
        (nominal + self.dirt.total()) as usize
    }

    /// Element references in logical order.
    pub(crate) fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.pages.iter().flat_map(|page| page.data.iter())
    }

    pub(crate) fn into_values(self) -> Vec<T> {
        self.pages
            .into_vec()
            .into_iter()
            .flat_map(|page| page.data)
            .collect()
    }

    fn recompute_dirt(&mut self) {
        self.dirt = DirtLog::recompute(self.pages.iter().map(Page::len), self.page_size);
    }

    /// Verify the dirt log against the pages.
    pub(crate) fn check_invariants(&self) -> Result<()> {
        let entries = self.dirt.entries();
        if entries.windows(2).any(|pair| pair[0].0 >= pair[1].0) {
            return Err(Error::InvariantViolation(format!(
                "dirt log is not strictly increasing: {:?}",
                self.dirt
            )));
        }
        if entries.iter().any(|&(_, delta)| delta == 0) {
            return Err(Error::InvariantViolation(format!(
                "dirt log stores a zero delta: {:?}",
                self.dirt
            )));
        }
        if let Some(number) = self.pages.iter().position(|page| page.data.is_empty()) {
            return Err(Error::InvariantViolation(format!("page {} is empty", number)));
        }
        let expected = DirtLog::recompute(self.pages.iter().map(Page::len), self.page_size);
        if self.dirt != expected {
            return Err(Error::InvariantViolation(format!(
                "dirt log {:?} does not describe the pages, expected {:?}",
                self.dirt, expected
            )));
        }
        let flattened: usize = self.pages.iter().map(Page::len).sum();
        if flattened != self.len() {
            return Err(Error::InvariantViolation(format!(
                "pages hold {} elements but length is {}",
                flattened,
                self.len()
            )));
        }
        Ok(())
    }
}

// index resolution
impl<T> Pages<T> {
    /// Resolve logical `index` to `(page, offset)`.
    ///
    /// With a clean dirt log this is a division. Otherwise the walk starts
    /// at the page the index would be on if every page were nominal and
    /// moves up or down, keeping the real start of the current page, until
    /// the offset falls inside the page.
    pub(crate) fn locate(&self, index: usize) -> Result<(usize, usize)> {
        let page_count = self.pages.len();
        let out_of_range = || Error::out_of_range(index as isize, self.len());
        if self.dirt.is_empty() {
            let location = (index / self.page_size, index % self.page_size);
            if location.0 >= page_count {
                return Err(out_of_range());
            }
            return Ok(location);
        }
        if page_count == 0 {
            return Err(out_of_range());
        }
        let mut page = (index / self.page_size).min(page_count - 1);
        let mut base = (page * self.page_size) as isize + self.dirt.offset_before(page);
        loop {
            let page_len = self.page_size as isize + self.dirt.delta(page);
            let offset = index as isize - base;
            if offset < 0 {
                page = page.checked_sub(1).ok_or_else(out_of_range)?;
                base -= self.page_size as isize + self.dirt.delta(page);
            } else if offset >= page_len {
                page += 1;
                if page >= page_count {
                    return Err(out_of_range());
                }
                base += page_len;
            } else {
                return Ok((page, offset as usize));
            }
        }
    }

    pub(crate) fn get(&self, index: usize) -> Result<&T> {
        let (page, offset) = self.locate(index)?;
        Ok(&self.pages[page].data[offset])
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        let (page, offset) = self.locate(index)?;
        Ok(&mut self.pages[page].data[offset])
    }
}

// scalar mutation
impl<T> Pages<T> {
    /// Remove the element at `index`; a page emptied this way is dropped.
    pub(crate) fn remove(&mut self, index: usize) -> Result<T> {
        let (page, offset) = self.locate(index)?;
        let value = self.pages[page].data.remove(offset);
        self.dirt.adjust(page, -1);
        if self.pages[page].data.is_empty() {
            trace!(page, "removing empty page");
            self.pages.remove(page);
            self.dirt.remove_page(page);
        }
        Ok(value)
    }

    /// Insert `value` before `index` (`index <= len`).
    ///
    /// A page grown past twice the nominal size is split in two.
    pub(crate) fn insert(&mut self, index: usize, value: T) -> Result<()> {
        if index == self.len() {
            self.push(value);
            return Ok(());
        }
        let (page, offset) = self.locate(index)?;
        self.pages[page].data.insert(offset, value);
        self.dirt.adjust(page, 1);
        if self.pages[page].len() > 2 * self.page_size {
            self.split_page(page);
        }
        Ok(())
    }

    fn split_page(&mut self, page: usize) {
        let tail = self.pages[page].data.split_off(self.page_size);
        trace!(page, tail = tail.len(), "splitting page");
        let tail_len = tail.len();
        self.pages.insert(page + 1, Page::new(tail));
        self.dirt.reset_page(page, self.page_size, self.page_size);
        self.dirt.insert_page(page + 1, tail_len, self.page_size);
    }

    /// Append `value`, opening a new page when the last one is full.
    pub(crate) fn push(&mut self, value: T) {
        let page_count = self.pages.len();
        let last = match self.pages.last() {
            Some(page) if page.len() < self.page_size => page_count - 1,
            _ => {
                // the producer supplies the empty page
                self.pages.fill_to(page_count + 1);
                page_count
            }
        };
        self.pages[last].data.push(value);
        let len = self.pages[last].len();
        self.dirt.reset_page(last, len, self.page_size);
    }

    pub(crate) fn clear(&mut self) {
        self.pages.clear();
        self.dirt.clear();
    }
}

// slices
impl<T> Pages<T> {
    /// The pieces covering `range`: the start page's tail, whole middle
    /// pages and the end page's head, in order.
    pub(crate) fn pieces(&self, range: Range<usize>) -> Result<Vec<&[T]>> {
        if range.is_empty() {
            return Ok(Vec::new());
        }
        let (first, start) = self.locate(range.start)?;
        let (last, end) = self.locate(range.end - 1)?;
        if first == last {
            return Ok(vec![&self.pages[first].data[start..=end]]);
        }
        let mut pieces = Vec::with_capacity(last - first + 1);
        pieces.push(&self.pages[first].data[start..]);
        for page in &self.pages[first + 1..last] {
            pieces.push(page.data.as_slice());
        }
        pieces.push(&self.pages[last].data[..=end]);
        Ok(pieces)
    }

    /// Replace the elements in `range` with `values`.
    pub(crate) fn splice(&mut self, range: Range<usize>, values: Vec<T>) -> Result<()> {
        let len = self.len();
        debug_assert!(range.start <= range.end && range.end <= len);
        if range.start == len {
            for value in values {
                self.push(value);
            }
            return Ok(());
        }
        let (page, start) = self.locate(range.start)?;
        let end = if range.is_empty() {
            Some(start)
        } else {
            let (last, end) = self.locate(range.end - 1)?;
            (last == page).then_some(end + 1)
        };
        let values = match end {
            Some(end) => match self.splice_in_page(page, start..end, values) {
                Ok(()) => return Ok(()),
                Err(values) => values,
            },
            None => values,
        };
        self.splice_pages(range, values)
    }

    /// Splice within one page if the page stays non-empty and within twice
    /// the nominal size; hands the values back otherwise.
    fn splice_in_page(
        &mut self,
        page: usize,
        local: Range<usize>,
        values: Vec<T>,
    ) -> std::result::Result<(), Vec<T>> {
        let removed = local.len();
        let new_len = self.pages[page].len() - removed + values.len();
        if new_len == 0 || new_len > 2 * self.page_size {
            return Err(values);
        }
        let added = values.len();
        self.pages[page].data.splice(local, values);
        self.dirt.adjust(page, added as isize - removed as isize);
        Ok(())
    }

    /// Replace `range` across page boundaries.
    ///
    /// The lower page keeps its head and is topped up to the nominal size
    /// from `values`; the rest of `values` is laid out in nominal-size
    /// pages; the upper page's surviving tail stays a page of its own.
    /// The covered pages are swapped for the new ones in one go and the dirt
    /// log is rebuilt.
    fn splice_pages(&mut self, range: Range<usize>, values: Vec<T>) -> Result<()> {
        let len = self.len();
        let (first, start) = self.locate(range.start)?;
        let (last, end) = if range.end == len {
            let last = self.pages.len() - 1;
            (last, self.pages[last].len())
        } else {
            self.locate(range.end)?
        };
        debug!(
            start = range.start,
            end = range.end,
            first_page = first,
            last_page = last,
            replacement = values.len(),
            "splicing across pages"
        );

        let rest = self.pages.split_off(last + 1);
        let mut covered = self.pages.split_off(first);
        let tail = match covered.last_mut() {
            Some(page) => page.data.split_off(end),
            None => Vec::new(),
        };
        let mut lower = match covered.first_mut() {
            Some(page) => mem::take(&mut page.data),
            None => Vec::new(),
        };
        lower.truncate(start);

        let mut values = values.into_iter();
        let room = self.page_size.saturating_sub(lower.len());
        lower.extend(values.by_ref().take(room));

        let mut replacement = vec![Page::new(lower)];
        replacement.extend(chunk(values.collect(), self.page_size).map(Page::new));
        replacement.push(Page::new(tail));
        replacement.retain(|page| !page.data.is_empty());

        self.pages.extend(replacement);
        self.pages.extend(rest);
        self.recompute_dirt();
        debug!(pages = self.pages.len(), dirt = self.dirt.entries().len(), "dirt log recomputed");
        Ok(())
    }

    /// Rebuild nominal-size pages and clear the dirt log.
    pub(crate) fn compact(&mut self) {
        let page_size = self.page_size;
        let values = mem::replace(self, Pages::new(page_size)).into_values();
        *self = Pages::from_vec(values, page_size);
        debug!(pages = self.pages.len(), "compacted pages");
    }
}

impl<T: Clone> Clone for Pages<T> {
    fn clone(&self) -> Self {
        Self {
            pages: self.pages.clone(),
            dirt: self.dirt.clone(),
            page_size: self.page_size,
        }
    }
}

/// Split `values` into chunks of `size`, the last one possibly shorter.
fn chunk<T>(values: Vec<T>, size: usize) -> impl Iterator<Item = Vec<T>> {
    let mut values = values.into_iter().peekable();
    std::iter::from_fn(move || {
        values.peek()?;
        Some(values.by_ref().take(size).collect())
    })
}
