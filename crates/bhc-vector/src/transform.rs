//! Bulk transformations: maps, zips and folds.
//!
//! Every transformation that produces a vector allocates a fresh buffer and
//! fills it before returning; the input is never modified.
//!
//! ## Evaluation Order
//!
//! - `map`, `zip_with`, `unzip_with` and the `try_*` family visit indices in
//!   increasing order. For the `try_*` family this is part of the contract:
//!   each call completes before the next begins, and the first error stops
//!   the traversal.
//! - `fold` and `fold_indexed` run right to left. The last element is
//!   combined with the initial accumulator first. With a non-associative
//!   combining function the direction is observable.

use crate::vector::Vector;
use crate::Element;

impl<T: Element> Vector<T> {
    /// Apply `f` to every element.
    ///
    /// # Panics
    ///
    /// Panics on capacity overflow if `U` is much larger than `T`.
    #[must_use]
    pub fn map<U, F>(&self, mut f: F) -> Vector<U>
    where
        U: Element,
        F: FnMut(T) -> U,
    {
        Vector::generate(self.len(), |dst| {
            for (slot, &x) in dst.iter_mut().zip(self.as_slice()) {
                *slot = f(x);
            }
        })
    }

    /// Apply `f` to every element together with its index.
    #[must_use]
    pub fn map_indexed<U, F>(&self, mut f: F) -> Vector<U>
    where
        U: Element,
        F: FnMut(usize, T) -> U,
    {
        Vector::generate(self.len(), |dst| {
            for (i, (slot, &x)) in dst.iter_mut().zip(self.as_slice()).enumerate() {
                *slot = f(i, x);
            }
        })
    }

    /// Combine two vectors pairwise.
    ///
    /// The result has the length of the shorter input.
    #[must_use]
    pub fn zip_with<U, R, F>(&self, other: &Vector<U>, mut f: F) -> Vector<R>
    where
        U: Element,
        R: Element,
        F: FnMut(T, U) -> R,
    {
        let len = self.len().min(other.len());
        Vector::generate(len, |dst| {
            let pairs = self.as_slice().iter().zip(other.as_slice());
            for (slot, (&a, &b)) in dst.iter_mut().zip(pairs) {
                *slot = f(a, b);
            }
        })
    }

    /// Project every element two ways in a single pass.
    ///
    /// Both results have the length of `self`.
    #[must_use]
    pub fn unzip_with<C, D, F, G>(&self, mut f: F, mut g: G) -> (Vector<C>, Vector<D>)
    where
        C: Element,
        D: Element,
        F: FnMut(T) -> C,
        G: FnMut(T) -> D,
    {
        Vector::generate_pair(self.len(), |firsts, seconds| {
            let slots = firsts.iter_mut().zip(seconds.iter_mut());
            for ((first, second), &x) in slots.zip(self.as_slice()) {
                *first = f(x);
                *second = g(x);
            }
        })
    }

    /// Right-to-left fold: `f(x0, f(x1, ... f(x_{n-1}, init)))`.
    pub fn fold<A, F>(&self, init: A, mut f: F) -> A
    where
        F: FnMut(T, A) -> A,
    {
        self.as_slice()
            .iter()
            .rev()
            .fold(init, |acc, &x| f(x, acc))
    }

    /// Right-to-left fold over indices with random access to the elements.
    ///
    /// `f` receives the index (from `len - 1` down to `0`), the whole
    /// window as a slice, and the accumulator. Indexing the slice is
    /// bounds-checked like any other slice; use `get_unchecked` on it where
    /// the index is already known to be in range.
    pub fn fold_indexed<A, F>(&self, init: A, mut f: F) -> A
    where
        F: FnMut(usize, &[T], A) -> A,
    {
        let elems = self.as_slice();
        (0..elems.len()).rev().fold(init, |acc, i| f(i, elems, acc))
    }

    /// Fallible map, sequenced in increasing index order.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `f`; later elements are not
    /// visited and no vector is produced.
    pub fn try_map<U, E, F>(&self, mut f: F) -> Result<Vector<U>, E>
    where
        U: Element,
        F: FnMut(T) -> Result<U, E>,
    {
        self.try_map_indexed(|_, x| f(x))
    }

    /// Fallible indexed map, sequenced in increasing index order.
    ///
    /// # Errors
    ///
    /// Same as [`Vector::try_map`].
    pub fn try_map_indexed<U, E, F>(&self, mut f: F) -> Result<Vector<U>, E>
    where
        U: Element,
        F: FnMut(usize, T) -> Result<U, E>,
    {
        let mut failure = None;
        let mapped = Vector::generate(self.len(), |dst| {
            for (i, (slot, &x)) in dst.iter_mut().zip(self.as_slice()).enumerate() {
                match f(i, x) {
                    Ok(y) => *slot = y,
                    Err(e) => {
                        failure = Some(e);
                        break;
                    }
                }
            }
        });
        match failure {
            Some(e) => Err(e),
            None => Ok(mapped),
        }
    }

    /// Run a fallible action on every element in increasing index order.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `f`.
    pub fn try_for_each<E, F>(&self, mut f: F) -> Result<(), E>
    where
        F: FnMut(T) -> Result<(), E>,
    {
        self.try_for_each_indexed(|_, x| f(x))
    }

    /// Run a fallible action on every element and its index, in order.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `f`.
    pub fn try_for_each_indexed<E, F>(&self, mut f: F) -> Result<(), E>
    where
        F: FnMut(usize, T) -> Result<(), E>,
    {
        self.iter().enumerate().try_for_each(|(i, &x)| f(i, x))
    }
}
