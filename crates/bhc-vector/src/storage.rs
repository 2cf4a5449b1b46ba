//! Reference-counted raw storage backing vector views.
//!
//! A [`Storage`] owns one contiguous block from the global allocator. It is
//! untyped: the element type lives in the [`Vector`](crate::Vector) view, which
//! is what lets a block of `f64` be viewed as `Complex<f64>` without copying.
//!
//! ## Lifetime
//!
//! Views hold the storage through an `Arc`. The block is deallocated when the
//! last view is dropped, never earlier.
//!
//! ## Initialisation
//!
//! Blocks are zero-filled on allocation. Every [`Element`] type accepts the
//! all-zero pattern, so a freshly allocated vector is readable before it has
//! been populated.

use crate::{Element, VectorError, VectorResult};
use std::alloc::Layout;
use std::mem;
use std::ptr::NonNull;
use tracing::trace;

/// Alignment of every storage block, in bytes.
///
/// Large enough for all [`Element`] types, including `Complex<f64>`, and for
/// 128-bit SIMD loads in native routines.
pub const STORAGE_ALIGN: usize = 16;

/// A contiguous, zero-initialised block of memory shared by vector views.
#[derive(Debug)]
pub struct Storage {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl Storage {
    /// Allocate a zero-filled block of `size_bytes` bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if `size_bytes` is zero or the layout overflows.
    pub fn zeroed(size_bytes: usize) -> VectorResult<Self> {
        if size_bytes == 0 {
            return Err(VectorError::AllocationFailed(
                "cannot allocate zero-size storage".to_string(),
            ));
        }

        let layout = Layout::from_size_align(size_bytes, STORAGE_ALIGN)
            .map_err(|e| VectorError::AllocationFailed(format!("invalid layout: {e}")))?;

        let ptr = unsafe {
            let raw = std::alloc::alloc_zeroed(layout);
            match NonNull::new(raw) {
                Some(ptr) => ptr,
                None => std::alloc::handle_alloc_error(layout),
            }
        };

        trace!(bytes = size_bytes, addr = ptr.as_ptr() as usize, "allocated vector storage");

        Ok(Self { ptr, layout })
    }

    /// Allocate a zero-filled block sized for `len` elements of `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if `len` is zero or `len * size_of::<T>()` overflows.
    pub fn for_elements<T: Element>(len: usize) -> VectorResult<Self> {
        debug_assert!(mem::align_of::<T>() <= STORAGE_ALIGN);

        let size = mem::size_of::<T>().checked_mul(len).ok_or_else(|| {
            VectorError::AllocationFailed(format!(
                "{len} elements of {} overflow the address space",
                T::C_TYPE_NAME
            ))
        })?;

        Self::zeroed(size)
    }

    /// Size of the block in bytes.
    #[inline]
    #[must_use]
    pub const fn size_bytes(&self) -> usize {
        self.layout.size()
    }

    /// Alignment of the block in bytes.
    #[inline]
    #[must_use]
    pub const fn align(&self) -> usize {
        self.layout.align()
    }

    /// Number of whole `T` elements that fit in the block.
    #[inline]
    #[must_use]
    pub const fn capacity_of<T: Element>(&self) -> usize {
        self.layout.size() / mem::size_of::<T>()
    }

    /// Raw pointer to the start of the block.
    #[inline]
    #[must_use]
    pub const fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    /// Start address of the block, for identity and alignment checks.
    #[must_use]
    pub fn address(&self) -> usize {
        self.ptr.as_ptr() as usize
    }

    /// Typed pointer to element `offset`.
    ///
    /// # Safety
    ///
    /// `offset` must not exceed [`Storage::capacity_of::<T>`].
    #[inline]
    pub(crate) unsafe fn element_ptr<T: Element>(&self, offset: usize) -> *const T {
        debug_assert!(offset <= self.capacity_of::<T>());
        unsafe { self.ptr.as_ptr().cast::<T>().add(offset) }
    }

    /// Mutable slice of the first `len` elements of `T`.
    ///
    /// Exclusive access is guaranteed by `&mut self`: the block has not yet
    /// been shared with any view.
    ///
    /// # Safety
    ///
    /// `len` must not exceed [`Storage::capacity_of::<T>`].
    #[inline]
    pub(crate) unsafe fn as_mut_slice<T: Element>(&mut self, len: usize) -> &mut [T] {
        debug_assert!(len <= self.capacity_of::<T>());
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr().cast::<T>(), len) }
    }
}

impl Drop for Storage {
    fn drop(&mut self) {
        trace!(
            bytes = self.layout.size(),
            addr = self.ptr.as_ptr() as usize,
            "released vector storage"
        );
        unsafe {
            std::alloc::dealloc(self.ptr.as_ptr(), self.layout);
        }
    }
}

// Storage is Send + Sync because:
// 1. It exclusively owns its block
// 2. The block is only written through `&mut Storage`, before it is shared
// 3. Elements are `Element` types with no thread affinity
unsafe impl Send for Storage {}
unsafe impl Sync for Storage {}
