//! Element access and the bounds-checking policy.
//!
//! Bounds checking is a value passed to [`Vector::at_with`], not a build
//! flag, so both behaviours can be exercised in one process. The checked
//! policy is the default. The unchecked policy can only be obtained through
//! an `unsafe` constructor: whoever creates it vouches for every index it is
//! used with.

use crate::vector::Vector;
use crate::{Element, VectorError, VectorResult};

/// Bounds-checking policy for element access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Bounds {
    checked: bool,
}

impl Bounds {
    /// Reject out-of-range indices with [`VectorError::IndexOutOfRange`].
    pub const CHECKED: Self = Self { checked: true };

    /// Skip bounds checks.
    ///
    /// # Safety
    ///
    /// Every index accessed under this policy must be less than the length
    /// of the vector it is used on. Out-of-range access is undefined
    /// behaviour.
    #[must_use]
    pub const unsafe fn unchecked() -> Self {
        Self { checked: false }
    }

    /// Returns true if indices are checked.
    #[inline]
    #[must_use]
    pub const fn is_checked(self) -> bool {
        self.checked
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::CHECKED
    }
}

impl<T: Element> Vector<T> {
    /// Element at `index`, checked.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IndexOutOfRange`] if `index >= len`.
    #[inline]
    pub fn at(&self, index: usize) -> VectorResult<T> {
        self.get(index).ok_or(VectorError::IndexOutOfRange {
            index,
            len: self.len(),
        })
    }

    /// Element at `index` under an explicit bounds policy.
    ///
    /// # Errors
    ///
    /// With [`Bounds::CHECKED`], returns [`VectorError::IndexOutOfRange`]
    /// if `index >= len`. The unchecked policy never errors.
    #[inline]
    pub fn at_with(&self, index: usize, bounds: Bounds) -> VectorResult<T> {
        if bounds.is_checked() {
            self.at(index)
        } else {
            // Safety: the creator of an unchecked policy guarantees `index`
            // is in range.
            Ok(unsafe { self.at_unchecked(index) })
        }
    }

    /// Element at `index`, or `None` if out of range.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.as_slice().get(index).copied()
    }

    /// Element at `index` without a bounds check.
    ///
    /// # Safety
    ///
    /// `index` must be less than `len`.
    #[inline]
    #[must_use]
    pub unsafe fn at_unchecked(&self, index: usize) -> T {
        debug_assert!(index < self.len());
        unsafe { *self.as_slice().get_unchecked(index) }
    }
}
