//! Real/complex reinterpretation.
//!
//! A `Complex<R>` is laid out as two consecutive `R` values (`re`, `im`), so a
//! real vector of even offset and length can be viewed as a complex vector of
//! half the size, and back, without touching the data.
//!
//! ```text
//! Vector<f64>           offset 2, len 4:   [ · · | r0 i0 r1 i1 ]
//! Vector<Complex<f64>>  offset 1, len 2:   [  ·  | (r0,i0) (r1,i1) ]
//! ```

use crate::vector::Vector;
use crate::{Complex, Element, VectorError, VectorResult};
use std::sync::Arc;

mod private {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// Real scalar types that pair into `Complex<Self>`.
pub trait Real: Element + private::Sealed {
    /// The C name of the matching complex type.
    const COMPLEX_C_TYPE_NAME: &'static str;
}

impl Real for f32 {
    const COMPLEX_C_TYPE_NAME: &'static str = "float _Complex";
}

impl Real for f64 {
    const COMPLEX_C_TYPE_NAME: &'static str = "double _Complex";
}

impl<R: Real> Vector<R> {
    /// View consecutive `(re, im)` pairs as complex numbers.
    ///
    /// The result shares storage; offset and length are halved.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::ShapeMismatch`] if the offset or the length is
    /// odd.
    pub fn as_paired(&self) -> VectorResult<Vector<Complex<R>>> {
        if self.offset() % 2 != 0 || self.len() % 2 != 0 {
            return Err(VectorError::ShapeMismatch {
                operation: "as_paired",
                expected: "even offset and length".to_string(),
                actual: format!("offset {}, length {}", self.offset(), self.len()),
            });
        }

        // Safety: the same bytes, counted in units twice as wide.
        Ok(unsafe {
            Vector::from_raw_view(
                Arc::clone(self.storage()),
                self.offset() / 2,
                self.len() / 2,
            )
        })
    }
}

impl<R: Real> Vector<Complex<R>> {
    /// View complex numbers as their interleaved real components.
    ///
    /// The result shares storage; offset and length are doubled.
    #[must_use]
    pub fn as_flattened(&self) -> Vector<R> {
        // Safety: the same bytes, counted in units half as wide.
        unsafe {
            Vector::from_raw_view(
                Arc::clone(self.storage()),
                self.offset() * 2,
                self.len() * 2,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_paired() {
        let v = Vector::from_slice(&[1.0f64, 2.0, 3.0, 4.0]).unwrap();
        let z = v.as_paired().unwrap();
        assert_eq!(z.len(), 2);
        assert_eq!(z.as_slice(), &[Complex::new(1.0, 2.0), Complex::new(3.0, 4.0)]);
        assert!(z.shares_storage(&v));
        assert_eq!(z.as_ptr() as usize, v.as_ptr() as usize);
    }

    #[test]
    fn test_as_paired_offset_view() {
        let v = Vector::from_exact_iter((0..8).map(|i| i as f32)).unwrap();
        let z = v.slice(2, 4).unwrap().as_paired().unwrap();
        assert_eq!(z.offset(), 1);
        assert_eq!(z.as_slice(), &[Complex::new(2.0, 3.0), Complex::new(4.0, 5.0)]);
    }

    #[test]
    fn test_as_paired_rejects_odd() {
        let v = Vector::from_slice(&[1.0f64, 2.0, 3.0, 4.0]).unwrap();
        assert!(matches!(
            v.slice(0, 3).unwrap().as_paired(),
            Err(VectorError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            v.slice(1, 2).unwrap().as_paired(),
            Err(VectorError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_as_flattened() {
        let z = Vector::from_slice(&[Complex::new(1.0f64, -1.0), Complex::new(0.5, 0.25)]).unwrap();
        let v = z.as_flattened();
        assert_eq!(v.as_slice(), &[1.0, -1.0, 0.5, 0.25]);
        assert!(v.shares_storage(&z));
    }

    #[test]
    fn test_flatten_paired_roundtrip_is_exact() {
        let v = Vector::from_slice(&[0.1f64, -0.0, f64::MIN_POSITIVE, 3.5, 1e300, -7.25]).unwrap();
        let s = v.slice(2, 4).unwrap();
        let back = s.as_paired().unwrap().as_flattened();
        assert_eq!(back.offset(), s.offset());
        assert_eq!(back.len(), s.len());
        let bits = |x: &Vector<f64>| x.iter().map(|f| f.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&back), bits(&s));
    }

    #[test]
    fn test_paired_flatten_roundtrip() {
        let z = Vector::from_slice(&[Complex::new(1.0f32, 2.0), Complex::new(3.0, 4.0)]).unwrap();
        let back = z.as_flattened().as_paired().unwrap();
        assert_eq!(back, z);
        assert!(back.shares_storage(&z));
    }
}
