//! The dirt log: per-page deviations from the nominal page size.
//!
//! Page `p` nominally starts at logical index `p * page_size`. Once pages
//! grow or shrink this no longer holds, and the dirt log records by how
//! much each page deviates, so the real start of a page is its nominal
//! start plus the deltas of every page before it.
//!
//! The log is sparse: it holds `(page, delta)` pairs sorted by page number,
//! with `delta = page_len - page_size`, and never stores a zero delta. The
//! last page is described like every other page.

use std::fmt;

/// A sorted, sparse log of `(page, delta)` pairs.
///
/// # Examples
///
/// ```
/// use altseq::DirtLog;
///
/// let mut dirt = DirtLog::new();
/// dirt.adjust(3, -1);
/// dirt.adjust(1, 2);
/// assert_eq!(dirt.entries(), &[(1, 2), (3, -1)]);
/// assert_eq!(dirt.offset_before(3), 2);
///
/// dirt.adjust(1, -2);
/// assert_eq!(dirt.entries(), &[(3, -1)]);
///
/// assert_eq!(DirtLog::recompute([10, 12, 10, 4], 10).entries(), &[(1, 2), (3, -6)]);
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct DirtLog {
    entries: Vec<(usize, isize)>,
}

impl DirtLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the log describing pages of the given lengths.
    ///
    /// This is a pure function of its input; it's used to resynchronize
    /// the log after a composite mutation instead of patching it
    /// incrementally.
    pub fn recompute<I>(page_lens: I, page_size: usize) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let entries = page_lens
            .into_iter()
            .enumerate()
            .filter_map(|(page, len)| {
                let delta = len as isize - page_size as isize;
                (delta != 0).then_some((page, delta))
            })
            .collect();
        Self { entries }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(usize, isize)] {
        &self.entries
    }

    /// The delta of `page`, zero when the page has no entry.
    pub fn delta(&self, page: usize) -> isize {
        match self.search(page) {
            Ok(at) => self.entries[at].1,
            Err(_) => 0,
        }
    }

    /// The sum of the deltas of every page before `page`.
    pub fn offset_before(&self, page: usize) -> isize {
        self.entries
            .iter()
            .take_while(|&&(p, _)| p < page)
            .map(|&(_, delta)| delta)
            .sum()
    }

    /// The sum of every delta.
    pub fn total(&self) -> isize {
        self.entries.iter().map(|&(_, delta)| delta).sum()
    }

    /// Adds `amount` to the delta of `page`, dropping the entry when it
    /// reaches zero.
    pub fn adjust(&mut self, page: usize, amount: isize) {
        if amount == 0 {
            return;
        }
        match self.search(page) {
            Ok(at) => {
                self.entries[at].1 += amount;
                if self.entries[at].1 == 0 {
                    self.entries.remove(at);
                }
            }
            Err(at) => self.entries.insert(at, (page, amount)),
        }
    }

    /// Sets the delta of `page` from its actual length.
    pub fn reset_page(&mut self, page: usize, actual_len: usize, page_size: usize) {
        let delta = actual_len as isize - page_size as isize;
        match (self.search(page), delta) {
            (Ok(at), 0) => {
                self.entries.remove(at);
            }
            (Ok(at), _) => self.entries[at].1 = delta,
            (Err(_), 0) => {}
            (Err(at), _) => self.entries.insert(at, (page, delta)),
        }
    }

    /// Records a page of `len` elements inserted at `page`; later pages
    /// move up by one.
    pub(crate) fn insert_page(&mut self, page: usize, len: usize, page_size: usize) {
        for entry in self.entries.iter_mut().filter(|entry| entry.0 >= page) {
            entry.0 += 1;
        }
        self.reset_page(page, len, page_size);
    }

    /// Forgets `page`; later pages move down by one.
    pub(crate) fn remove_page(&mut self, page: usize) {
        if let Ok(at) = self.search(page) {
            self.entries.remove(at);
        }
        for entry in self.entries.iter_mut().filter(|entry| entry.0 > page) {
            entry.0 -= 1;
        }
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    fn search(&self, page: usize) -> Result<usize, usize> {
        self.entries.binary_search_by_key(&page, |&(p, _)| p)
    }
}

impl fmt::Debug for DirtLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(page, delta)| (page, delta)))
            .finish()
    }
}
