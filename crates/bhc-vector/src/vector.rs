//! Shared numeric vectors.
//!
//! A [`Vector<T>`] is a view `(storage, offset, len)` into a reference-counted
//! [`Storage`]. Views are cheap to clone and to slice; none of
//! [`Vector::slice`], [`Vector::split`], [`Vector::as_paired`] or
//! [`Vector::as_flattened`] touch element data. [`Vector::concat`] and
//! [`Vector::deep_clone`] are the only operations that copy an existing vector.
//!
//! Zero-length vectors do not exist. Every constructor rejects a length of
//! zero with [`VectorError::InvalidLength`].
//!
//! ## Foreign Boundary
//!
//! [`Vector::with_ptr`] and [`Vector::build_raw`] hand a native routine a
//! pointer valid for exactly `len` contiguous elements starting at the view's
//! offset, for the duration of the callback.

use crate::storage::Storage;
use crate::{Element, VectorError, VectorResult};
use std::fmt;
use std::marker::PhantomData;
use std::ops::Index;
use std::sync::Arc;

/// A contiguous, immutable view of shared numeric storage.
///
/// `Clone` produces another view of the same storage. Use
/// [`Vector::deep_clone`] for an independent copy.
#[derive(Clone)]
pub struct Vector<T: Element> {
    /// Shared backing block.
    storage: Arc<Storage>,
    /// Index of the first element, in units of `T`.
    offset: usize,
    /// Number of elements, always non-zero.
    len: usize,
    _marker: PhantomData<T>,
}

// ============================================================
// Construction
// ============================================================

impl<T: Element> Vector<T> {
    /// Allocate a zero-filled vector of `len` elements.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::InvalidLength`] if `len` is zero, or
    /// [`VectorError::AllocationFailed`] if the size overflows.
    pub fn allocate(len: usize) -> VectorResult<Self> {
        Self::build(len, |_| Ok(()))
    }

    /// Allocate `len` elements and populate them before the vector escapes.
    ///
    /// The filler gets the only reference to the new buffer. If it fails,
    /// the buffer is released and the error is returned.
    ///
    /// # Errors
    ///
    /// Returns the filler's error, or an allocation error converted into `E`.
    pub fn build<E, F>(len: usize, fill: F) -> Result<Self, E>
    where
        E: From<VectorError>,
        F: FnOnce(&mut [T]) -> Result<(), E>,
    {
        if len == 0 {
            return Err(VectorError::InvalidLength {
                operation: "allocate",
                requested: 0,
            }
            .into());
        }

        let mut storage = Storage::for_elements::<T>(len)?;
        // Safety: the block was sized for exactly `len` elements of `T`.
        fill(unsafe { storage.as_mut_slice::<T>(len) })?;

        Ok(Self::from_storage(storage, len))
    }

    /// Allocate `len` elements and let a native routine write them.
    ///
    /// The callback receives a pointer valid for `len` writes of `T`.
    ///
    /// # Errors
    ///
    /// Same as [`Vector::build`].
    pub fn build_raw<E, F>(len: usize, fill: F) -> Result<Self, E>
    where
        E: From<VectorError>,
        F: FnOnce(*mut T, usize) -> Result<(), E>,
    {
        Self::build(len, |dst| fill(dst.as_mut_ptr(), dst.len()))
    }

    /// Copy a slice into a new vector.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::InvalidLength`] if `data` is empty.
    pub fn from_slice(data: &[T]) -> VectorResult<Self> {
        Self::build(data.len(), |dst| {
            dst.copy_from_slice(data);
            Ok(())
        })
    }

    /// Copy every item of an exact-size iterator into a new vector, in order.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::InvalidLength`] for an empty iterator and
    /// [`VectorError::ShapeMismatch`] if it yields fewer items than it
    /// reported.
    pub fn from_exact_iter<I>(items: I) -> VectorResult<Self>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let iter = items.into_iter();
        let len = iter.len();
        Self::build(len, |dst| fill_from(dst, iter, "from_exact_iter"))
    }

    /// Take exactly the first `len` items of a (possibly endless) iterator.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::InvalidLength`] if `len` is zero and
    /// [`VectorError::ShapeMismatch`] if the iterator runs dry early.
    pub fn from_iter_truncated<I>(len: usize, items: I) -> VectorResult<Self>
    where
        I: IntoIterator<Item = T>,
    {
        Self::build(len, |dst| fill_from(dst, items, "from_iter_truncated"))
    }

    /// Build a view over existing storage without copying or validation.
    ///
    /// # Safety
    ///
    /// `len` must be non-zero and `offset + len` must not exceed
    /// `storage.capacity_of::<T>()`.
    pub(crate) unsafe fn from_raw_view(storage: Arc<Storage>, offset: usize, len: usize) -> Self {
        debug_assert!(len > 0);
        debug_assert!(offset + len <= storage.capacity_of::<T>());
        Self {
            storage,
            offset,
            len,
            _marker: PhantomData,
        }
    }

    /// Wrap a freshly populated block sized for `len` elements.
    fn from_storage(storage: Storage, len: usize) -> Self {
        // Safety: callers allocate the block for exactly `len` elements.
        unsafe { Self::from_raw_view(Arc::new(storage), 0, len) }
    }

    /// Build a result whose length is already known to be valid.
    ///
    /// # Panics
    ///
    /// Panics on capacity overflow, as `Vec` does.
    pub(crate) fn generate<F>(len: usize, fill: F) -> Self
    where
        F: FnOnce(&mut [T]),
    {
        let built = Self::build::<VectorError, _>(len, |dst| {
            fill(dst);
            Ok(())
        });
        built.unwrap_or_else(|e| capacity_overflow(e))
    }

    /// Build two results of the same valid length in one pass.
    ///
    /// # Panics
    ///
    /// Panics on capacity overflow, as `Vec` does.
    pub(crate) fn generate_pair<U, F>(len: usize, fill: F) -> (Self, Vector<U>)
    where
        U: Element,
        F: FnOnce(&mut [T], &mut [U]),
    {
        debug_assert!(len > 0);
        let mut first = Storage::for_elements::<T>(len).unwrap_or_else(|e| capacity_overflow(e));
        let mut second = Storage::for_elements::<U>(len).unwrap_or_else(|e| capacity_overflow(e));

        // Safety: both blocks were sized for exactly `len` elements.
        unsafe { fill(first.as_mut_slice::<T>(len), second.as_mut_slice::<U>(len)) };

        (Self::from_storage(first, len), Vector::from_storage(second, len))
    }
}

fn capacity_overflow(e: VectorError) -> ! {
    panic!("capacity overflow: {e}")
}

fn fill_from<T, I>(dst: &mut [T], items: I, operation: &'static str) -> VectorResult<()>
where
    I: IntoIterator<Item = T>,
{
    let expected = dst.len();
    let mut items = items.into_iter();
    for (i, slot) in dst.iter_mut().enumerate() {
        *slot = items.next().ok_or_else(|| VectorError::ShapeMismatch {
            operation,
            expected: format!("{expected} elements"),
            actual: format!("{i} elements"),
        })?;
    }
    Ok(())
}

// ============================================================
// Views and Metadata
// ============================================================

impl<T: Element> Vector<T> {
    /// Number of elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Always `false`: zero-length vectors cannot be constructed.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Position of the first element within the storage, in elements.
    #[inline]
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// The shared backing storage.
    #[inline]
    #[must_use]
    pub fn storage(&self) -> &Arc<Storage> {
        &self.storage
    }

    /// Returns true if both views alias the same storage block.
    #[inline]
    #[must_use]
    pub fn shares_storage<U: Element>(&self, other: &Vector<U>) -> bool {
        Arc::ptr_eq(&self.storage, &other.storage)
    }

    /// Pointer to the first logical element.
    #[inline]
    #[must_use]
    pub fn as_ptr(&self) -> *const T {
        // Safety: `offset + len` is within capacity by construction.
        unsafe { self.storage.element_ptr::<T>(self.offset) }
    }

    /// The logical window as a slice.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        // Safety: the window is in bounds, initialised, and never written
        // once the storage is shared.
        unsafe { std::slice::from_raw_parts(self.as_ptr(), self.len) }
    }

    /// Iterate over the elements in index order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Copy the elements into a `Vec`.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.as_slice().to_vec()
    }

    /// Run a native routine over the view's pointer and length.
    ///
    /// The pointer is valid for `len` reads for the duration of the call.
    #[inline]
    pub fn with_ptr<F, R>(&self, f: F) -> R
    where
        F: FnOnce(*const T, usize) -> R,
    {
        f(self.as_ptr(), self.len)
    }

    /// Create a new view sharing this storage.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::InvalidLength`] if `count` is zero and
    /// [`VectorError::ShapeMismatch`] if `start + count` exceeds `len`.
    pub fn slice(&self, start: usize, count: usize) -> VectorResult<Self> {
        if count == 0 {
            return Err(VectorError::InvalidLength {
                operation: "slice",
                requested: 0,
            });
        }

        match start.checked_add(count) {
            Some(end) if end <= self.len => {
                // Safety: `[start, end)` lies inside this view's window.
                Ok(unsafe {
                    Self::from_raw_view(Arc::clone(&self.storage), self.offset + start, count)
                })
            }
            _ => Err(VectorError::ShapeMismatch {
                operation: "slice",
                expected: format!("start + count <= {}", self.len),
                actual: format!("start {start}, count {count}"),
            }),
        }
    }

    /// Partition into consecutive views of the given sizes.
    ///
    /// Sizes may sum to less than `len`; the remainder is not returned.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::InvalidLength`] for a zero size and
    /// [`VectorError::ShapeMismatch`] if the sizes sum past `len`.
    pub fn split(&self, sizes: &[usize]) -> VectorResult<Vec<Self>> {
        let total = sizes
            .iter()
            .try_fold(0usize, |acc, &n| acc.checked_add(n))
            .filter(|&total| total <= self.len)
            .ok_or_else(|| VectorError::ShapeMismatch {
                operation: "split",
                expected: format!("sizes summing to at most {}", self.len),
                actual: format!("{sizes:?}"),
            })?;
        debug_assert!(total <= self.len);

        let mut start = 0;
        let mut parts = Vec::with_capacity(sizes.len());
        for &size in sizes {
            parts.push(self.slice(start, size)?);
            start += size;
        }
        Ok(parts)
    }

    /// Join vectors into one.
    ///
    /// A single input is returned as-is, sharing its storage. Two or more
    /// are copied, in order, into a fresh buffer.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::InvalidLength`] if `parts` is empty.
    pub fn concat(parts: &[Self]) -> VectorResult<Self> {
        match parts {
            [] => Err(VectorError::InvalidLength {
                operation: "concat",
                requested: 0,
            }),
            [single] => Ok(single.clone()),
            _ => {
                let total = parts.iter().map(Self::len).sum();
                Self::build(total, |dst| {
                    let mut at = 0;
                    for part in parts {
                        dst[at..at + part.len].copy_from_slice(part.as_slice());
                        at += part.len;
                    }
                    Ok(())
                })
            }
        }
    }

    /// Copy the elements into a fresh, unshared buffer.
    #[must_use]
    pub fn deep_clone(&self) -> Self {
        Self::generate(self.len, |dst| dst.copy_from_slice(self.as_slice()))
    }
}

// ============================================================
// Trait Implementations
// ============================================================

impl<T: Element> TryFrom<Vec<T>> for Vector<T> {
    type Error = VectorError;

    fn try_from(data: Vec<T>) -> VectorResult<Self> {
        Self::from_slice(&data)
    }
}

impl<T: Element> TryFrom<&[T]> for Vector<T> {
    type Error = VectorError;

    fn try_from(data: &[T]) -> VectorResult<Self> {
        Self::from_slice(data)
    }
}

impl<T: Element> Index<usize> for Vector<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.as_slice()[index]
    }
}

impl<T: Element> AsRef<[T]> for Vector<T> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<'a, T: Element> IntoIterator for &'a Vector<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<T: Element + fmt::Debug> fmt::Debug for Vector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vector({:?})", self.as_slice())
    }
}

impl<T: Element + fmt::Display> fmt::Display for Vector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, x) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{x}")?;
        }
        write!(f, "]")
    }
}

impl<T: Element + PartialEq> PartialEq for Vector<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Element + PartialEq> PartialEq<[T]> for Vector<T> {
    fn eq(&self, other: &[T]) -> bool {
        self.as_slice() == other
    }
}

// ============================================================
// Tests
// ============================================================
