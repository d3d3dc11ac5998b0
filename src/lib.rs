//! This crate provides alternative sequence containers with the full
//! mutable sequence contract: indexing from either end, insertion and
//! removal anywhere, and slicing with arbitrary steps.
//!
//! - [`LinkedSequence`] is a doubly-linked ring. Positional inserts and
//!   removals are constant-time link surgery, and the ring can be rotated in
//!   place.
//! - [`PagedSequence`] keeps its elements in pages of a nominal size and a
//!   [`DirtLog`] of how far each page has drifted from it, so a middle insert
//!   only shifts the elements of one page.
//! - [`DefaultList`] is a `Vec` that produces missing tail elements on demand.
//! - [`SlicedView`] is a window onto another sequence that reads and writes
//!   through to it without copying.
//! - [`RecordSequence`] packs fixed-width records into one byte buffer.
//!
//! Here is a quick example showing how the containers work.
//!
//! ```
//! use altseq::{LinkedSequence, PagedSequence, SliceSpec};
//!
//! let ring = LinkedSequence::from_iter([1, 2, 3, 4]);
//! ring.rotate(1);
//! assert_eq!(ring, [4, 1, 2, 3]);
//! assert_eq!(ring.get(-1), Ok(3));
//!
//! let paged = PagedSequence::with_page_size(10).unwrap();
//! paged.extend(0..100);
//! paged.remove(35).unwrap();
//! assert_eq!(paged.get(35), Ok(36));
//! assert_eq!(paged.get_slice(SliceSpec::from(..5).step_by(2)), vec![0, 2, 4]);
//! ```
//!
//! # Indices and Slices
//!
//! Scalar indices are `isize`; a negative index counts from the end, so `-1`
//! is the last element. An index outside `-len..len` is
//! [`Error::OutOfRange`]. Insertion clamps its index to the sequence instead,
//! so inserting at any index past the end appends.
//!
//! Slices are described by a [`SliceSpec`], built from Rust ranges and an
//! optional step. Slice bounds never fail: they clip against the length. With
//! a unit step, slice assignment may grow or shrink the sequence; with any
//! other step it must supply exactly one value per addressed position, or it
//! fails with [`Error::LengthMismatch`] before anything is modified.
//!
//! ```
//! use altseq::{Error, LinkedSequence, SliceSpec};
//!
//! let seq = LinkedSequence::from_iter(0..10);
//! assert_eq!(seq.get_slice(SliceSpec::from(..).step_by(-3)), [9, 6, 3, 0]);
//!
//! let evens = SliceSpec::from(..).step_by(2);
//! assert_eq!(
//!     seq.set_slice(evens, [0; 4]),
//!     Err(Error::LengthMismatch { expected: 5, actual: 4 })
//! );
//! seq.delete_slice(evens);
//! assert_eq!(seq, [1, 3, 5, 7, 9]);
//! ```
//!
//! # The Sequence Traits
//!
//! Every container implements [`Sequence`], [`MutableSequence`] and
//! [`SliceableSequence`], and so does `Vec<T>`. The slice operations have
//! default implementations in terms of the scalar ones, which is what lets
//! [`SlicedView`] wrap any of the containers, and lets tests compare every
//! container against a `Vec`.
//!
//! # Concurrency
//!
//! [`LinkedSequence`] and [`PagedSequence`] guard their state with a lock
//! and take `&self` for every operation, so they can be shared between
//! threads behind an `Arc`. Each operation locks once; iterators lock once
//! per step, so a concurrent mutation may be observed halfway through an
//! iteration, but never half-applied. The lock is reentrant, so the closure
//! given to `update` may call back into the same sequence.
//!
//! # Cargo Features
//!
//! - `checked`: check the structural invariants of the linked ring and the
//!   page table after every composite mutation, in release builds too.
//!   Debug builds always check them.
//!
//! [`LinkedSequence`]: crate::LinkedSequence
//! [`PagedSequence`]: crate::PagedSequence
//! [`DirtLog`]: crate::DirtLog
//! [`DefaultList`]: crate::DefaultList
//! [`SlicedView`]: crate::SlicedView
//! [`RecordSequence`]: crate::RecordSequence

pub mod default_list;
pub mod error;
pub mod list;
pub mod paged;
pub mod record;
pub mod sequence;
pub mod slice;
pub mod view;

#[doc(inline)]
pub use default_list::{DefaultList, Produce, Producer};
#[doc(inline)]
pub use error::{Error, Result};
#[doc(inline)]
pub use list::{Handle, LinkedSequence};
#[doc(inline)]
pub use paged::{DirtLog, PagedSequence, PagedSequenceBuilder, DEFAULT_PAGE_SIZE};
#[doc(inline)]
pub use record::{FnCodec, PodCodec, RecordCodec, RecordSequence};
#[doc(inline)]
pub use sequence::{MutableSequence, Sequence, SliceableSequence};
#[doc(inline)]
pub use slice::{ResolvedSlice, SliceSpec};
#[doc(inline)]
pub use view::SlicedView;
