//! # BHC Vector Storage
//!
//! Contiguous, typed numeric buffers shared between views. This is the
//! storage primitive underneath BHC's linear-algebra bindings: it owns the
//! memory, hands out zero-copy windows into it, and prepares pointer/length
//! pairs for native numeric routines.
//!
//! ## Overview
//!
//! Key components:
//!
//! - **Storage**: a reference-counted raw allocation. It is released when the
//!   last view referencing it is dropped.
//! - **Vector**: an `(offset, len)` view of a storage, typed by its element.
//!   Slicing, splitting and real/complex reinterpretation never copy.
//! - **VectorIo**: the foreign routine boundary for ASCII and binary files.
//!
//! ## Ownership Model
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Arc<Storage>                          │
//! │  ┌────┬────┬────┬────┬────┬────┬────┬────┬────┬────┐        │
//! │  │ f0 │ f1 │ f2 │ f3 │ f4 │ f5 │ f6 │ f7 │ f8 │ f9 │        │
//! │  └────┴────┴────┴────┴────┴────┴────┴────┴────┴────┘        │
//! └──────────────────────────────────────────────────────────────┘
//!    ▲                   ▲                   ▲
//!    │ Vector<f64>       │ slice(3, 4)       │ as_paired()
//!    │ offset 0, len 10  │ offset 3, len 4   │ Vector<Complex<f64>>
//!    │                   │                   │ offset 3, len 2  (of f6..f9)
//! ```
//!
//! Every view holds a strong reference, so the block outlives all of them.
//! Views are immutable; a buffer is only written while it is being built,
//! before any other view of it exists.
//!
//! ## Usage
//!
//! ```rust
//! use bhc_vector::Vector;
//!
//! let v = Vector::from_slice(&[1.0f64, 2.0, 3.0, 4.0]).unwrap();
//! let tail = v.slice(2, 2).unwrap();
//! assert!(tail.shares_storage(&v));
//! assert_eq!(tail.to_vec(), vec![3.0, 4.0]);
//!
//! let total = v.fold(0.0, |x, acc| acc + x);
//! assert_eq!(total, 10.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod access;
pub mod complex;
pub mod config;
pub mod format;
pub mod io;
pub mod storage;
pub mod transform;
pub mod vector;

pub use access::Bounds;
pub use complex::Real;
pub use config::{Options, Separator};
pub use format::NumericFormat;
pub use io::{
    default_provider, read_ascii, read_ascii_with, read_binary, read_binary_with, write_ascii,
    write_ascii_with, write_ascii_with_options, write_binary, write_binary_with, NativeIo,
    VectorIo,
};
pub use num_complex::Complex;
pub use storage::Storage;
pub use vector::Vector;

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by vector construction, access and file I/O.
#[derive(Debug, Error)]
pub enum VectorError {
    /// A zero-length vector was requested.
    #[error("invalid length {requested} for {operation}: vectors hold at least one element")]
    InvalidLength {
        /// The operation that was asked for the length.
        operation: &'static str,
        /// The requested length.
        requested: usize,
    },

    /// Checked element access outside `[0, len)`.
    #[error("index {index} out of range for vector of length {len}")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Length of the vector.
        len: usize,
    },

    /// Arguments inconsistent with the length or parity of the source.
    #[error("shape mismatch: {operation} requires {expected}, got {actual}")]
    ShapeMismatch {
        /// The operation being performed.
        operation: &'static str,
        /// What the operation needed.
        expected: String,
        /// What it was given.
        actual: String,
    },

    /// File open, read, write or parse failure.
    #[error("I/O failure on {}: {message}", .path.display())]
    Io {
        /// The file involved.
        path: PathBuf,
        /// Diagnostic from the I/O provider.
        message: String,
    },

    /// Malformed printf-style numeric format.
    #[error("invalid numeric format: {0}")]
    Format(String),

    /// The storage layout could not be computed.
    #[error("vector allocation failed: {0}")]
    AllocationFailed(String),

    /// Malformed options file.
    #[error("invalid vector options: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type for vector operations.
pub type VectorResult<T> = Result<T, VectorError>;

/// Marker trait for element types a [`Vector`] can hold.
///
/// # Safety
///
/// Implementors must guarantee that:
/// - The type is `Copy` with no drop glue and no pointers.
/// - Every byte pattern of `size_of::<Self>()` bytes is a valid value, so
///   memory written by a native routine (or zero-filled) can be read back.
/// - `align_of::<Self>()` does not exceed [`storage::STORAGE_ALIGN`].
pub unsafe trait Element: Copy + Send + Sync + 'static {
    /// The C-equivalent type name (for diagnostics).
    const C_TYPE_NAME: &'static str;
}

unsafe impl Element for f32 {
    const C_TYPE_NAME: &'static str = "float";
}

unsafe impl Element for f64 {
    const C_TYPE_NAME: &'static str = "double";
}

unsafe impl Element for i8 {
    const C_TYPE_NAME: &'static str = "int8_t";
}

unsafe impl Element for i16 {
    const C_TYPE_NAME: &'static str = "int16_t";
}

unsafe impl Element for i32 {
    const C_TYPE_NAME: &'static str = "int32_t";
}

unsafe impl Element for i64 {
    const C_TYPE_NAME: &'static str = "int64_t";
}

unsafe impl Element for u8 {
    const C_TYPE_NAME: &'static str = "uint8_t";
}

unsafe impl Element for u16 {
    const C_TYPE_NAME: &'static str = "uint16_t";
}

unsafe impl Element for u32 {
    const C_TYPE_NAME: &'static str = "uint32_t";
}

unsafe impl Element for u64 {
    const C_TYPE_NAME: &'static str = "uint64_t";
}

unsafe impl Element for usize {
    const C_TYPE_NAME: &'static str = "size_t";
}

unsafe impl Element for isize {
    const C_TYPE_NAME: &'static str = "ssize_t";
}

// `Complex<R>` is `#[repr(C)]` over two `R`, so it has no padding and the
// alignment of `R`.
unsafe impl<R: Real> Element for Complex<R> {
    const C_TYPE_NAME: &'static str = R::COMPLEX_C_TYPE_NAME;
}
