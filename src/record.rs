//! Fixed-width records packed into one contiguous byte buffer.
//!
//! A [`RecordSequence`] stores each record as exactly
//! [`RecordCodec::width`] bytes. Records are packed on the way in and
//! unpacked on the way out, so reading yields an owned copy; use
//! [`RecordSequence::update`] to modify a stored record in place.
//!
//! Two codecs are provided: [`FnCodec`] pairs two closures, and
//! [`PodCodec`] stores any [`bytemuck::Pod`] type by its in-memory bytes.
//!
//! ```
//! use altseq::{FnCodec, RecordSequence};
//!
//! let codec = FnCodec::new(
//!     3,
//!     |&(id, flag): &(u16, u8)| {
//!         let [hi, lo] = id.to_be_bytes();
//!         vec![hi, lo, flag]
//!     },
//!     |bytes: &[u8]| (u16::from_be_bytes([bytes[0], bytes[1]]), bytes[2]),
//! );
//! let mut records = RecordSequence::new(codec).unwrap();
//! records.push(&(513, 1)).unwrap();
//! records.push(&(7, 0)).unwrap();
//!
//! assert_eq!(records.as_bytes(), &[2, 1, 1, 0, 7, 0]);
//! records.update(0, |record| record.1 = 9).unwrap();
//! assert_eq!(records.get(0), Ok((513, 9)));
//! ```

use crate::error::{normalize_index, Error, Result};
use crate::sequence::{check_stepped_len, MutableSequence, Sequence, SliceableSequence};
use crate::slice::SliceSpec;
use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::slice::ChunksExact;

/// Converts records to and from their fixed-width byte form.
pub trait RecordCodec {
    type Record;

    /// Bytes per record. Must not be zero.
    fn width(&self) -> usize;

    /// Packs `record`. The result must be exactly [`RecordCodec::width`]
    /// bytes long.
    fn pack(&self, record: &Self::Record) -> Vec<u8>;

    /// Unpacks a record from exactly [`RecordCodec::width`] bytes.
    fn unpack(&self, bytes: &[u8]) -> Self::Record;
}

/// A codec made of a packing and an unpacking closure.
pub struct FnCodec<R, P, U> {
    width: usize,
    pack: P,
    unpack: U,
    _record: PhantomData<fn() -> R>,
}

impl<R, P, U> FnCodec<R, P, U>
where
    P: Fn(&R) -> Vec<u8>,
    U: Fn(&[u8]) -> R,
{
    pub fn new(width: usize, pack: P, unpack: U) -> Self {
        Self {
            width,
            pack,
            unpack,
            _record: PhantomData,
        }
    }
}

impl<R, P, U> RecordCodec for FnCodec<R, P, U>
where
    P: Fn(&R) -> Vec<u8>,
    U: Fn(&[u8]) -> R,
{
    type Record = R;

    #[inline]
    fn width(&self) -> usize {
        self.width
    }

    fn pack(&self, record: &R) -> Vec<u8> {
        (self.pack)(record)
    }

    fn unpack(&self, bytes: &[u8]) -> R {
        (self.unpack)(bytes)
    }
}

impl<R, P, U> fmt::Debug for FnCodec<R, P, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCodec")
            .field("width", &self.width)
            .finish_non_exhaustive()
    }
}

/// A codec storing a [`bytemuck::Pod`] value by its in-memory bytes.
///
/// The byte layout is the platform's, so buffers are only portable between
/// machines of the same endianness.
pub struct PodCodec<T>(PhantomData<fn() -> T>);

impl<T: bytemuck::Pod> PodCodec<T> {
    pub fn new() -> Self {
        PodCodec(PhantomData)
    }
}

impl<T: bytemuck::Pod> Default for PodCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for PodCodec<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PodCodec<T> {}

impl<T> fmt::Debug for PodCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PodCodec<{}>", std::any::type_name::<T>())
    }
}

impl<T: bytemuck::Pod> RecordCodec for PodCodec<T> {
    type Record = T;

    #[inline]
    fn width(&self) -> usize {
        std::mem::size_of::<T>()
    }

    fn pack(&self, record: &T) -> Vec<u8> {
        bytemuck::bytes_of(record).to_vec()
    }

    fn unpack(&self, bytes: &[u8]) -> T {
        bytemuck::pod_read_unaligned(bytes)
    }
}

/// An append-only sequence of fixed-width records.
///
/// Records can be read, overwritten and appended, but not inserted or
/// removed: [`MutableSequence::insert`] and [`MutableSequence::remove`]
/// return [`Error::Unsupported`].
pub struct RecordSequence<C> {
    codec: C,
    bytes: Vec<u8>,
}

impl<C: RecordCodec> RecordSequence<C> {
    /// An empty sequence. A zero-width codec is [`Error::InvalidArgument`].
    pub fn new(codec: C) -> Result<Self> {
        Self::from_bytes(codec, Vec::new())
    }

    /// Wraps an existing buffer of packed records.
    ///
    /// # Examples
    ///
    /// ```
    /// use altseq::{Error, PodCodec, RecordSequence};
    ///
    /// let records = RecordSequence::from_bytes(PodCodec::<u16>::new(), vec![0; 6]).unwrap();
    /// assert_eq!(records.len(), 3);
    ///
    /// let err = RecordSequence::from_bytes(PodCodec::<u16>::new(), vec![0; 5]).unwrap_err();
    /// assert!(matches!(err, Error::InvalidArgument { name: "bytes", .. }));
    /// ```
    pub fn from_bytes(codec: C, bytes: Vec<u8>) -> Result<Self> {
        let width = codec.width();
        if width == 0 {
            return Err(Error::invalid_arg("width", "records must be at least one byte wide"));
        }
        if bytes.len() % width != 0 {
            return Err(Error::invalid_arg(
                "bytes",
                format!(
                    "buffer of {} bytes is not a whole number of {width}-byte records",
                    bytes.len()
                ),
            ));
        }
        Ok(Self { codec, bytes })
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.codec.width()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len() / self.width()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn get(&self, index: isize) -> Result<C::Record> {
        let at = normalize_index(index, self.len())?;
        Ok(self.codec.unpack(self.record_bytes(at)))
    }

    /// Overwrites the record at `index`.
    pub fn set(&mut self, index: isize, record: &C::Record) -> Result<()> {
        let at = normalize_index(index, self.len())?;
        let packed = self.pack(record)?;
        let width = self.width();
        self.bytes[at * width..(at + 1) * width].copy_from_slice(&packed);
        Ok(())
    }

    pub fn push(&mut self, record: &C::Record) -> Result<()> {
        let packed = self.pack(record)?;
        self.bytes.extend_from_slice(&packed);
        Ok(())
    }

    /// Appends every record of `records`. Nothing is appended unless all of
    /// them pack to the right width.
    pub fn extend<I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = C::Record>,
    {
        let mut packed = Vec::new();
        for record in records {
            packed.extend_from_slice(&self.pack(&record)?);
        }
        self.bytes.extend_from_slice(&packed);
        Ok(())
    }

    /// Unpacks the record at `index`, lets `f` modify it and packs it back.
    pub fn update<R>(&mut self, index: isize, f: impl FnOnce(&mut C::Record) -> R) -> Result<R> {
        let at = normalize_index(index, self.len())?;
        let mut record = self.codec.unpack(self.record_bytes(at));
        let result = f(&mut record);
        self.set(at as isize, &record)?;
        Ok(result)
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    pub fn iter(&self) -> Iter<'_, C> {
        Iter {
            codec: &self.codec,
            chunks: self.bytes.chunks_exact(self.width()),
        }
    }

    pub fn to_vec(&self) -> Vec<C::Record> {
        self.iter().collect()
    }

    fn record_bytes(&self, at: usize) -> &[u8] {
        let width = self.width();
        &self.bytes[at * width..(at + 1) * width]
    }

    fn pack(&self, record: &C::Record) -> Result<Vec<u8>> {
        let packed = self.codec.pack(record);
        check_stepped_len(self.width(), packed.len())?;
        Ok(packed)
    }
}

impl<C: RecordCodec + Clone> Clone for RecordSequence<C> {
    fn clone(&self) -> Self {
        Self {
            codec: self.codec.clone(),
            bytes: self.bytes.clone(),
        }
    }
}

impl<C> fmt::Debug for RecordSequence<C>
where
    C: RecordCodec,
    C::Record: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// An iterator over the records of a [`RecordSequence`].
pub struct Iter<'a, C> {
    codec: &'a C,
    chunks: ChunksExact<'a, u8>,
}

impl<C: RecordCodec> Iterator for Iter<'_, C> {
    type Item = C::Record;

    fn next(&mut self) -> Option<C::Record> {
        self.chunks.next().map(|bytes| self.codec.unpack(bytes))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl<C: RecordCodec> DoubleEndedIterator for Iter<'_, C> {
    fn next_back(&mut self) -> Option<C::Record> {
        self.chunks.next_back().map(|bytes| self.codec.unpack(bytes))
    }
}

impl<C: RecordCodec> ExactSizeIterator for Iter<'_, C> {}

impl<C: RecordCodec> FusedIterator for Iter<'_, C> {}

impl<'a, C: RecordCodec> IntoIterator for &'a RecordSequence<C> {
    type Item = C::Record;
    type IntoIter = Iter<'a, C>;

    fn into_iter(self) -> Iter<'a, C> {
        self.iter()
    }
}

impl<C: RecordCodec> Sequence for RecordSequence<C> {
    type Item = C::Record;

    fn len(&self) -> usize {
        RecordSequence::len(self)
    }

    fn get(&self, index: isize) -> Result<C::Record> {
        RecordSequence::get(self, index)
    }
}

impl<C: RecordCodec> MutableSequence for RecordSequence<C> {
    fn set(&mut self, index: isize, value: C::Record) -> Result<()> {
        RecordSequence::set(self, index, &value)
    }

    fn remove(&mut self, _index: isize) -> Result<C::Record> {
        Err(Error::unsupported("remove from a record sequence"))
    }

    fn insert(&mut self, _index: isize, _value: C::Record) -> Result<()> {
        Err(Error::unsupported("insert into a record sequence; use push"))
    }

    fn push(&mut self, value: C::Record) -> Result<()> {
        RecordSequence::push(self, &value)
    }
}

impl<C: RecordCodec> SliceableSequence for RecordSequence<C> {
    /// Only length-preserving assignment is supported, since records can't
    /// be inserted or removed.
    fn set_slice(&mut self, spec: SliceSpec, values: Vec<C::Record>) -> Result<()> {
        let resolved = spec.resolve(self.len());
        if resolved.step() == 1 && resolved.addressed() != values.len() {
            return Err(Error::unsupported("resizing slice assignment on a record sequence"));
        }
        check_stepped_len(resolved.addressed(), values.len())?;
        let packed = values
            .iter()
            .map(|record| self.pack(record))
            .collect::<Result<Vec<_>>>()?;
        let width = self.width();
        for (at, bytes) in resolved.zip(packed) {
            self.bytes[at * width..(at + 1) * width].copy_from_slice(&bytes);
        }
        Ok(())
    }

    fn delete_slice(&mut self, _spec: SliceSpec) -> Result<()> {
        Err(Error::unsupported("delete from a record sequence"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytemuck::{Pod, Zeroable};

    #[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
    #[repr(C)]
    struct Sample {
        id: u32,
        level: i16,
        flags: u16,
        value: f32,
    }

    fn sample(id: u32) -> Sample {
        Sample {
            id,
            level: -(id as i16),
            flags: 0b101,
            value: id as f32 * 0.5,
        }
    }

    fn le_pair() -> FnCodec<(u8, u32), impl Fn(&(u8, u32)) -> Vec<u8>, impl Fn(&[u8]) -> (u8, u32)>
    {
        FnCodec::new(
            5,
            |&(tag, n): &(u8, u32)| {
                let mut bytes = vec![tag];
                bytes.extend_from_slice(&n.to_le_bytes());
                bytes
            },
            |bytes: &[u8]| {
                let n = u32::from_le_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]);
                (bytes[0], n)
            },
        )
    }

    #[test]
    fn pod_records_round_through_the_buffer() {
        let mut records = RecordSequence::new(PodCodec::<Sample>::new()).unwrap();
        assert_eq!(records.width(), 12);
        records.extend((0..4).map(sample)).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records.as_bytes().len(), 48);
        assert_eq!(records.get(2), Ok(sample(2)));
        assert_eq!(records.get(-1), Ok(sample(3)));
        assert_eq!(records.get(4), Err(Error::OutOfRange { index: 4, len: 4 }));

        let bytes = records.clone().into_bytes();
        let reloaded = RecordSequence::from_bytes(PodCodec::<Sample>::new(), bytes).unwrap();
        assert_eq!(reloaded.to_vec(), (0..4).map(sample).collect::<Vec<_>>());
    }

    #[test]
    fn update_writes_back() {
        let mut records = RecordSequence::new(PodCodec::<Sample>::new()).unwrap();
        records.push(&sample(1)).unwrap();
        let old = records
            .update(0, |record| std::mem::replace(&mut record.flags, 0xffff))
            .unwrap();
        assert_eq!(old, 0b101);
        assert_eq!(records.get(0).unwrap().flags, 0xffff);
        assert!(records.update(1, |_| ()).is_err());
    }

    #[test]
    fn fn_codec_layout() {
        let mut records = RecordSequence::new(le_pair()).unwrap();
        records.push(&(1, 0x0403_0201)).unwrap();
        records.push(&(2, 7)).unwrap();
        assert_eq!(records.as_bytes(), &[1, 1, 2, 3, 4, 2, 7, 0, 0, 0]);
        records.set(-2, &(9, 0)).unwrap();
        assert_eq!(records.to_vec(), vec![(9, 0), (2, 7)]);
        assert_eq!(records.iter().rev().next(), Some((2, 7)));
    }

    #[test]
    fn malformed_widths_are_rejected() {
        let zero = FnCodec::new(0, |_: &()| Vec::new(), |_: &[u8]| ());
        assert!(matches!(
            RecordSequence::new(zero),
            Err(Error::InvalidArgument { name: "width", .. })
        ));
        assert!(matches!(
            RecordSequence::from_bytes(le_pair(), vec![0; 11]),
            Err(Error::InvalidArgument { name: "bytes", .. })
        ));

        let short = FnCodec::new(4, |n: &u16| n.to_le_bytes().to_vec(), |b: &[u8]| {
            u16::from_le_bytes([b[0], b[1]])
        });
        let mut records = RecordSequence::new(short).unwrap();
        assert_eq!(
            records.push(&1),
            Err(Error::LengthMismatch { expected: 4, actual: 2 })
        );
        assert_eq!(
            records.extend([1, 2]),
            Err(Error::LengthMismatch { expected: 4, actual: 2 })
        );
        assert!(records.is_empty());
    }

    #[test]
    fn structural_changes_are_unsupported() {
        let mut records = RecordSequence::new(PodCodec::<u32>::new()).unwrap();
        records.extend([1, 2, 3]).unwrap();
        assert!(matches!(
            MutableSequence::insert(&mut records, 0, 5),
            Err(Error::Unsupported { .. })
        ));
        assert!(matches!(
            MutableSequence::remove(&mut records, 0),
            Err(Error::Unsupported { .. })
        ));
        assert!(matches!(
            records.delete_slice(SliceSpec::from(0..1)),
            Err(Error::Unsupported { .. })
        ));
        assert!(matches!(
            records.set_slice(SliceSpec::from(0..1), vec![]),
            Err(Error::Unsupported { .. })
        ));
        assert_eq!(records.to_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn sequence_contract() {
        let mut records = RecordSequence::new(PodCodec::<i64>::new()).unwrap();
        MutableSequence::push(&mut records, 10).unwrap();
        MutableSequence::push(&mut records, 20).unwrap();
        MutableSequence::push(&mut records, 30).unwrap();
        MutableSequence::set(&mut records, 1, 21).unwrap();
        assert_eq!(Sequence::get(&records, 1), Ok(21));
        records
            .set_slice(SliceSpec::full().step_by(-2), vec![31, 11])
            .unwrap();
        assert_eq!(
            records.get_slice(SliceSpec::from(..)),
            Ok(vec![11, 21, 31])
        );
        assert_eq!(
            records.set_slice(SliceSpec::full().step_by(2), vec![0]),
            Err(Error::LengthMismatch { expected: 2, actual: 1 })
        );
        records
            .set_slice(SliceSpec::from(1..3), vec![-1, -2])
            .unwrap();
        assert_eq!(records.to_vec(), vec![11, -1, -2]);
    }
}
