//! ASCII and binary vector files.
//!
//! The actual reading and writing goes through a [`VectorIo`] provider, the
//! boundary where a native routine would take over. A provider is handed a
//! slice covering exactly the vector's logical window and a reader or
//! writer; the path-level functions in this module own file handling and
//! translate failures into [`VectorError::Io`].
//!
//! ## File Formats
//!
//! - ASCII: whitespace-separated decimal tokens, parsed independently of the
//!   process locale. Output applies a printf pattern to each element.
//! - Binary: a flat dump of native-endian IEEE-754 doubles with no header.
//!   The element count travels out of band.
//!
//! Writers stage output in a temporary file in the target's directory and
//! rename it into place once everything is flushed, so a failed write never
//! leaves a truncated file behind.

use crate::config::{Options, Separator};
use crate::format::NumericFormat;
use crate::vector::Vector;
use crate::{VectorError, VectorResult};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Width in bytes of one element in a binary file.
const RAW_ELEMENT_BYTES: usize = std::mem::size_of::<f64>();

/// Routines that move `f64` elements between buffers and byte streams.
pub trait VectorIo: Send + Sync {
    /// Provider name, for diagnostics.
    fn name(&self) -> &'static str;

    /// Fill `dst` from whitespace-separated decimal tokens.
    ///
    /// Input past the last needed token is left unread.
    fn scan_ascii(&self, reader: &mut dyn BufRead, dst: &mut [f64]) -> io::Result<()>;

    /// Write every element of `src` with `format`, separated by `separator`.
    fn print_ascii(
        &self,
        writer: &mut dyn Write,
        src: &[f64],
        format: &NumericFormat,
        separator: Separator,
    ) -> io::Result<()>;

    /// Fill `dst` from native-endian doubles.
    fn read_raw(&self, reader: &mut dyn Read, dst: &mut [f64]) -> io::Result<()>;

    /// Write `src` as native-endian doubles.
    fn write_raw(&self, writer: &mut dyn Write, src: &[f64]) -> io::Result<()>;
}

/// Pure Rust I/O provider.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeIo;

impl VectorIo for NativeIo {
    fn name(&self) -> &'static str {
        "native"
    }

    fn scan_ascii(&self, reader: &mut dyn BufRead, dst: &mut [f64]) -> io::Result<()> {
        let mut filled = 0;
        let mut line = Vec::new();

        // Lines are kept as bytes: only tokens that are consumed must be UTF-8.
        while filled < dst.len() {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("expected {} values, found {filled}", dst.len()),
                ));
            }

            let tokens = line
                .split(u8::is_ascii_whitespace)
                .filter(|token| !token.is_empty());
            for token in tokens {
                if filled == dst.len() {
                    break;
                }
                dst[filled] = parse_token(token).ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!(
                            "value {filled}: cannot parse {:?} as a number",
                            String::from_utf8_lossy(token)
                        ),
                    )
                })?;
                filled += 1;
            }
        }

        Ok(())
    }

    fn print_ascii(
        &self,
        writer: &mut dyn Write,
        src: &[f64],
        format: &NumericFormat,
        separator: Separator,
    ) -> io::Result<()> {
        for (i, &x) in src.iter().enumerate() {
            if i > 0 && separator != Separator::Newline {
                writer.write_all(separator.as_str().as_bytes())?;
            }
            writer.write_all(format.render(x).as_bytes())?;
            if separator == Separator::Newline {
                writer.write_all(b"\n")?;
            }
        }
        if separator != Separator::Newline {
            writer.write_all(b"\n")?;
        }
        Ok(())
    }

    fn read_raw(&self, reader: &mut dyn Read, dst: &mut [f64]) -> io::Result<()> {
        let expected = dst.len();
        let mut buf = [0u8; RAW_ELEMENT_BYTES];
        for (i, slot) in dst.iter_mut().enumerate() {
            reader.read_exact(&mut buf).map_err(|e| {
                if e.kind() == io::ErrorKind::UnexpectedEof {
                    io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("expected {expected} values, found {i}"),
                    )
                } else {
                    e
                }
            })?;
            *slot = f64::from_ne_bytes(buf);
        }
        Ok(())
    }

    fn write_raw(&self, writer: &mut dyn Write, src: &[f64]) -> io::Result<()> {
        for &x in src {
            writer.write_all(&x.to_ne_bytes())?;
        }
        Ok(())
    }
}

fn parse_token(token: &[u8]) -> Option<f64> {
    std::str::from_utf8(token).ok()?.parse().ok()
}

/// Get the default I/O provider.
#[must_use]
pub fn default_provider() -> Box<dyn VectorIo> {
    Box::new(NativeIo)
}

fn io_error(path: &Path, err: &io::Error) -> VectorError {
    VectorError::Io {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Write into a temporary file next to `path`, then rename it over `path`.
///
/// On any failure the temporary file is removed and `path` is untouched.
fn write_replacing<F>(path: &Path, write: F) -> VectorResult<()>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let staged = NamedTempFile::new_in(dir).map_err(|e| io_error(path, &e))?;
    let mut writer = BufWriter::new(staged);
    write(&mut writer)
        .and_then(|()| writer.flush())
        .map_err(|e| io_error(path, &e))?;

    let staged = writer.into_inner().map_err(|e| io_error(path, e.error()))?;
    staged.persist(path).map_err(|e| io_error(path, &e.error))?;
    Ok(())
}

// ============================================================
// ASCII Files
// ============================================================

/// Read `n` numbers from an ASCII file.
///
/// # Errors
///
/// Returns [`VectorError::InvalidLength`] if `n` is zero, and
/// [`VectorError::Io`] if the file cannot be opened, holds fewer than `n`
/// numbers, or holds a token that is not a number.
pub fn read_ascii(path: impl AsRef<Path>, n: usize) -> VectorResult<Vector<f64>> {
    read_ascii_with(default_provider().as_ref(), path, n)
}

/// [`read_ascii`] through an explicit provider.
///
/// # Errors
///
/// Same as [`read_ascii`].
pub fn read_ascii_with(
    io: &dyn VectorIo,
    path: impl AsRef<Path>,
    n: usize,
) -> VectorResult<Vector<f64>> {
    let path = path.as_ref();
    debug!(path = %path.display(), n, provider = io.name(), "reading ASCII vector");

    let v = Vector::build(n, |dst| {
        let file = File::open(path).map_err(|e| io_error(path, &e))?;
        let mut reader = BufReader::new(file);
        io.scan_ascii(&mut reader, dst).map_err(|e| io_error(path, &e))
    })?;

    debug!(path = %path.display(), n, "ASCII vector read");
    Ok(v)
}

/// Write `v` to an ASCII file, one element per line, formatted with the
/// printf pattern `format`.
///
/// # Errors
///
/// Returns [`VectorError::Format`] for a malformed pattern (before the file
/// is touched) and [`VectorError::Io`] if the file cannot be written.
pub fn write_ascii(path: impl AsRef<Path>, format: &str, v: &Vector<f64>) -> VectorResult<()> {
    write_ascii_with(default_provider().as_ref(), path, format, v)
}

/// [`write_ascii`] through an explicit provider.
///
/// # Errors
///
/// Same as [`write_ascii`].
pub fn write_ascii_with(
    io: &dyn VectorIo,
    path: impl AsRef<Path>,
    format: &str,
    v: &Vector<f64>,
) -> VectorResult<()> {
    let format = NumericFormat::parse(format)?;
    write_ascii_formatted(io, path.as_ref(), &format, Separator::Newline, v)
}

/// Write `v` to an ASCII file using the pattern and separator in `options`.
///
/// # Errors
///
/// Same as [`write_ascii`].
pub fn write_ascii_with_options(
    path: impl AsRef<Path>,
    v: &Vector<f64>,
    options: &Options,
) -> VectorResult<()> {
    let format = options.numeric_format()?;
    write_ascii_formatted(
        default_provider().as_ref(),
        path.as_ref(),
        &format,
        options.separator,
        v,
    )
}

fn write_ascii_formatted(
    io: &dyn VectorIo,
    path: &Path,
    format: &NumericFormat,
    separator: Separator,
    v: &Vector<f64>,
) -> VectorResult<()> {
    debug!(
        path = %path.display(),
        len = v.len(),
        format = %format,
        provider = io.name(),
        "writing ASCII vector"
    );

    write_replacing(path, |writer| {
        io.print_ascii(writer, v.as_slice(), format, separator)
    })?;

    debug!(path = %path.display(), len = v.len(), "ASCII vector written");
    Ok(())
}

// ============================================================
// Binary Files
// ============================================================

/// Read `n` native-endian doubles from a binary file.
///
/// # Errors
///
/// Returns [`VectorError::InvalidLength`] if `n` is zero, and
/// [`VectorError::Io`] if the file cannot be opened or is shorter than
/// `n` elements.
pub fn read_binary(path: impl AsRef<Path>, n: usize) -> VectorResult<Vector<f64>> {
    read_binary_with(default_provider().as_ref(), path, n)
}

/// [`read_binary`] through an explicit provider.
///
/// # Errors
///
/// Same as [`read_binary`].
pub fn read_binary_with(
    io: &dyn VectorIo,
    path: impl AsRef<Path>,
    n: usize,
) -> VectorResult<Vector<f64>> {
    let path = path.as_ref();
    debug!(path = %path.display(), n, provider = io.name(), "reading binary vector");

    let v = Vector::build(n, |dst| {
        let file = File::open(path).map_err(|e| io_error(path, &e))?;
        let mut reader = BufReader::new(file);
        io.read_raw(&mut reader, dst).map_err(|e| io_error(path, &e))
    })?;

    debug!(path = %path.display(), n, "binary vector read");
    Ok(v)
}

/// Write `v` to a binary file as native-endian doubles.
///
/// # Errors
///
/// Returns [`VectorError::Io`] if the file cannot be written.
pub fn write_binary(path: impl AsRef<Path>, v: &Vector<f64>) -> VectorResult<()> {
    write_binary_with(default_provider().as_ref(), path, v)
}

/// [`write_binary`] through an explicit provider.
///
/// # Errors
///
/// Same as [`write_binary`].
pub fn write_binary_with(
    io: &dyn VectorIo,
    path: impl AsRef<Path>,
    v: &Vector<f64>,
) -> VectorResult<()> {
    let path = path.as_ref();
    debug!(
        path = %path.display(),
        len = v.len(),
        provider = io.name(),
        "writing binary vector"
    );

    write_replacing(path, |writer| io.write_raw(writer, v.as_slice()))?;

    debug!(path = %path.display(), len = v.len(), "binary vector written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_scan_ascii() {
        let mut input = Cursor::new("1.5 -2\n\n  3e2\tinf\n");
        let mut dst = [0.0; 4];
        NativeIo.scan_ascii(&mut input, &mut dst).unwrap();
        assert_eq!(dst, [1.5, -2.0, 300.0, f64::INFINITY]);
    }

    #[test]
    fn test_scan_ascii_ignores_extra_tokens() {
        let mut input = Cursor::new("1 2 3 4\n5\n");
        let mut dst = [0.0; 2];
        NativeIo.scan_ascii(&mut input, &mut dst).unwrap();
        assert_eq!(dst, [1.0, 2.0]);
    }

    #[test]
    fn test_scan_ascii_short_input() {
        let mut input = Cursor::new("1 2\n");
        let mut dst = [0.0; 3];
        let err = NativeIo.scan_ascii(&mut input, &mut dst).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert!(err.to_string().contains("expected 3 values, found 2"));
    }

    #[test]
    fn test_scan_ascii_bad_token() {
        let mut input = Cursor::new("1 two 3\n");
        let mut dst = [0.0; 3];
        let err = NativeIo.scan_ascii(&mut input, &mut dst).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("\"two\""));
    }

    #[test]
    fn test_scan_ascii_ignores_non_utf8_after_last_value() {
        let mut input = Cursor::new(&b"1 2 3 \xff\xfe comment\n"[..]);
        let mut dst = [0.0; 3];
        NativeIo.scan_ascii(&mut input, &mut dst).unwrap();
        assert_eq!(dst, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_scan_ascii_non_utf8_value() {
        let mut input = Cursor::new(&b"1 \xff\n"[..]);
        let mut dst = [0.0; 2];
        let err = NativeIo.scan_ascii(&mut input, &mut dst).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("value 1"));
    }

    #[test]
    fn test_scan_ascii_decimal_point_only() {
        // Comma decimals are not accepted regardless of locale.
        let mut input = Cursor::new("1,5\n");
        let mut dst = [0.0; 1];
        assert!(NativeIo.scan_ascii(&mut input, &mut dst).is_err());
    }

    #[test]
    fn test_print_ascii_separators() {
        let src = [1.0, 2.5, -3.0];
        let fmt = NumericFormat::default();

        let mut out = Vec::new();
        NativeIo
            .print_ascii(&mut out, &src, &fmt, Separator::Newline)
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1\n2.5\n-3\n");

        let mut out = Vec::new();
        NativeIo
            .print_ascii(&mut out, &src, &fmt, Separator::Space)
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1 2.5 -3\n");

        let mut out = Vec::new();
        NativeIo
            .print_ascii(&mut out, &src, &fmt, Separator::Tab)
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1\t2.5\t-3\n");
    }

    #[test]
    fn test_raw_roundtrip() {
        let src = [0.1, -0.0, f64::MAX, f64::MIN_POSITIVE];
        let mut bytes = Vec::new();
        NativeIo.write_raw(&mut bytes, &src).unwrap();
        assert_eq!(bytes.len(), src.len() * RAW_ELEMENT_BYTES);

        let mut dst = [0.0; 4];
        NativeIo.read_raw(&mut Cursor::new(bytes), &mut dst).unwrap();
        assert_eq!(dst.map(f64::to_bits), src.map(f64::to_bits));
    }

    #[test]
    fn test_read_raw_short() {
        let bytes = 1.0f64.to_ne_bytes().to_vec();
        let mut dst = [0.0; 2];
        let err = NativeIo
            .read_raw(&mut Cursor::new(bytes), &mut dst)
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert!(err.to_string().contains("found 1"));
    }

    #[test]
    fn test_default_provider() {
        assert_eq!(default_provider().name(), "native");
    }
}
