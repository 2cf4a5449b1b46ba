//! printf-style numeric formats for ASCII output.
//!
//! A [`NumericFormat`] holds exactly one floating-point conversion, optionally
//! surrounded by literal text:
//!
//! ```text
//! [text] % [flags] [width] [.precision] [l|L] conversion [text]
//!
//! flags       - + space 0 #
//! conversion  f F e E g G
//! ```
//!
//! `%%` anywhere in the text is a literal percent sign. Rendering follows C
//! `printf`: the default precision is 6, exponents have at least two digits,
//! and `%g` drops trailing zeros unless `#` is given.

use crate::{VectorError, VectorResult};
use std::fmt;
use std::str::FromStr;

/// Conversion character.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Conversion {
    /// `%f`: fixed-point.
    Fixed,
    /// `%e`: scientific.
    Exponent,
    /// `%g`: shortest of fixed and scientific.
    General,
}

/// A parsed printf pattern with a single floating-point conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NumericFormat {
    pattern: String,
    prefix: String,
    suffix: String,
    conversion: Conversion,
    uppercase: bool,
    left_align: bool,
    plus_sign: bool,
    space_sign: bool,
    zero_pad: bool,
    alternate: bool,
    width: usize,
    precision: Option<usize>,
}

const DEFAULT_PRECISION: usize = 6;

impl NumericFormat {
    /// Parse a printf pattern such as `"%g"`, `"%12.4e"` or `"x=%+.3f;"`.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::Format`] unless the pattern contains exactly
    /// one well-formed `f`, `e` or `g` conversion.
    pub fn parse(pattern: &str) -> VectorResult<Self> {
        let invalid = |reason: &str| VectorError::Format(format!("{pattern:?}: {reason}"));

        let mut prefix = String::new();
        let mut suffix = String::new();
        let mut parsed: Option<Self> = None;
        let mut chars = pattern.chars().peekable();

        while let Some(c) = chars.next() {
            let literal = if c != '%' {
                Some(c)
            } else if chars.peek() == Some(&'%') {
                chars.next();
                Some('%')
            } else {
                None
            };
            if let Some(c) = literal {
                let text = if parsed.is_some() { &mut suffix } else { &mut prefix };
                text.push(c);
                continue;
            }
            if parsed.is_some() {
                return Err(invalid("more than one conversion"));
            }

            let mut fmt = Self {
                pattern: pattern.to_string(),
                prefix: String::new(),
                suffix: String::new(),
                conversion: Conversion::General,
                uppercase: false,
                left_align: false,
                plus_sign: false,
                space_sign: false,
                zero_pad: false,
                alternate: false,
                width: 0,
                precision: None,
            };

            while let Some(&flag) = chars.peek() {
                match flag {
                    '-' => fmt.left_align = true,
                    '+' => fmt.plus_sign = true,
                    ' ' => fmt.space_sign = true,
                    '0' => fmt.zero_pad = true,
                    '#' => fmt.alternate = true,
                    _ => break,
                }
                chars.next();
            }

            fmt.width = take_number(&mut chars).ok_or_else(|| invalid("width too large"))?;

            if chars.peek() == Some(&'.') {
                chars.next();
                let precision =
                    take_number(&mut chars).ok_or_else(|| invalid("precision too large"))?;
                fmt.precision = Some(precision);
            }

            if matches!(chars.peek(), Some('l' | 'L')) {
                chars.next();
            }

            let (conversion, uppercase) = match chars.next() {
                Some('f') => (Conversion::Fixed, false),
                Some('F') => (Conversion::Fixed, true),
                Some('e') => (Conversion::Exponent, false),
                Some('E') => (Conversion::Exponent, true),
                Some('g') => (Conversion::General, false),
                Some('G') => (Conversion::General, true),
                Some(other) => {
                    return Err(invalid(&format!(
                        "unsupported conversion '{other}', expected one of f F e E g G"
                    )))
                }
                None => return Err(invalid("incomplete conversion")),
            };
            fmt.conversion = conversion;
            fmt.uppercase = uppercase;
            parsed = Some(fmt);
        }

        let mut fmt = parsed.ok_or_else(|| invalid("no conversion"))?;
        fmt.prefix = prefix;
        fmt.suffix = suffix;
        Ok(fmt)
    }

    /// The pattern this format was parsed from.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Render one value, surrounding text included.
    #[must_use]
    pub fn render(&self, value: f64) -> String {
        let mut out = String::with_capacity(self.prefix.len() + self.width.max(16));
        out.push_str(&self.prefix);
        self.render_number(value, &mut out);
        out.push_str(&self.suffix);
        out
    }

    fn render_number(&self, value: f64, out: &mut String) {
        let sign = if value.is_sign_negative() {
            "-"
        } else if self.plus_sign {
            "+"
        } else if self.space_sign {
            " "
        } else {
            ""
        };

        let digits = if value.is_finite() {
            self.render_magnitude(value.abs())
        } else {
            let word = if value.is_nan() { "nan" } else { "inf" };
            if self.uppercase {
                word.to_ascii_uppercase()
            } else {
                word.to_string()
            }
        };

        let used = sign.len() + digits.len();
        let pad = self.width.saturating_sub(used);

        if self.left_align {
            out.push_str(sign);
            out.push_str(&digits);
            out.extend(std::iter::repeat(' ').take(pad));
        } else if self.zero_pad && value.is_finite() {
            out.push_str(sign);
            out.extend(std::iter::repeat('0').take(pad));
            out.push_str(&digits);
        } else {
            out.extend(std::iter::repeat(' ').take(pad));
            out.push_str(sign);
            out.push_str(&digits);
        }
    }

    /// Digits of a finite, non-negative value.
    fn render_magnitude(&self, x: f64) -> String {
        let precision = self.precision.unwrap_or(DEFAULT_PRECISION);
        match self.conversion {
            Conversion::Fixed => fixed(x, precision, self.alternate),
            Conversion::Exponent => exponent(x, precision, self.alternate, self.uppercase),
            Conversion::General => {
                let p = precision.max(1);
                let (_, exp) = split_exponent(x, p - 1);
                let text = if exp < -4 || exp >= p as i32 {
                    exponent(x, p - 1, self.alternate, self.uppercase)
                } else {
                    // 0 <= p - 1 - exp because exp < p.
                    let frac = (p as i32 - 1 - exp) as usize;
                    fixed(x, frac, self.alternate)
                };
                if self.alternate {
                    text
                } else {
                    strip_trailing_zeros(&text)
                }
            }
        }
    }
}

/// Read a run of ASCII digits; `None` on overflow. An empty run is zero.
fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<usize> {
    let mut n = 0usize;
    while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
        n = n.checked_mul(10)?.checked_add(d as usize)?;
        chars.next();
    }
    Some(n)
}

fn fixed(x: f64, precision: usize, alternate: bool) -> String {
    let mut s = format!("{x:.precision$}");
    if alternate && precision == 0 {
        s.push('.');
    }
    s
}

/// Mantissa text and decimal exponent of `x` rounded to `precision`
/// fractional digits in scientific form.
fn split_exponent(x: f64, precision: usize) -> (String, i32) {
    let s = format!("{x:.precision$e}");
    match s.split_once('e') {
        Some((mantissa, exp)) => (mantissa.to_string(), exp.parse().unwrap_or(0)),
        None => (s, 0),
    }
}

fn exponent(x: f64, precision: usize, alternate: bool, uppercase: bool) -> String {
    let (mut mantissa, exp) = split_exponent(x, precision);
    if alternate && precision == 0 {
        mantissa.push('.');
    }
    let marker = if uppercase { 'E' } else { 'e' };
    let exp_sign = if exp < 0 { '-' } else { '+' };
    format!("{mantissa}{marker}{exp_sign}{:02}", exp.unsigned_abs())
}

fn strip_trailing_zeros(text: &str) -> String {
    let (body, tail) = text.split_at(text.find(['e', 'E']).unwrap_or(text.len()));
    if !body.contains('.') {
        return text.to_string();
    }
    let body = body.trim_end_matches('0').trim_end_matches('.');
    format!("{body}{tail}")
}

impl Default for NumericFormat {
    fn default() -> Self {
        Self {
            pattern: "%g".to_string(),
            prefix: String::new(),
            suffix: String::new(),
            conversion: Conversion::General,
            uppercase: false,
            left_align: false,
            plus_sign: false,
            space_sign: false,
            zero_pad: false,
            alternate: false,
            width: 0,
            precision: None,
        }
    }
}

impl FromStr for NumericFormat {
    type Err = VectorError;

    fn from_str(s: &str) -> VectorResult<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for NumericFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}
