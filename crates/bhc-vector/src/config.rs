//! Serialisable I/O options.
//!
//! ```toml
//! ascii_format = "%.6e"
//! separator = "space"
//! ```
//!
//! Missing keys take their defaults (`"%g"`, one value per line).

use crate::format::NumericFormat;
use crate::VectorResult;
use serde::{Deserialize, Serialize};

/// Token separator for ASCII output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Separator {
    /// One value per line.
    #[default]
    Newline,
    /// Values on a single line, separated by spaces.
    Space,
    /// Values on a single line, separated by tabs.
    Tab,
}

impl Separator {
    /// The separator text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newline => "\n",
            Self::Space => " ",
            Self::Tab => "\t",
        }
    }
}

/// Options for ASCII vector files.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// printf pattern applied to every element on write.
    pub ascii_format: String,
    /// Separator between written elements.
    pub separator: Separator,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            ascii_format: "%g".to_string(),
            separator: Separator::Newline,
        }
    }
}

impl Options {
    /// Parse options from TOML content.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::Config`](crate::VectorError::Config) for
    /// malformed TOML and [`VectorError::Format`](crate::VectorError::Format)
    /// if `ascii_format` is not a valid pattern.
    pub fn from_toml_str(content: &str) -> VectorResult<Self> {
        let options: Self = toml::from_str(content)?;
        options.numeric_format()?;
        Ok(options)
    }

    /// The parsed `ascii_format`.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::Format`](crate::VectorError::Format) if the
    /// pattern is malformed.
    pub fn numeric_format(&self) -> VectorResult<NumericFormat> {
        NumericFormat::parse(&self.ascii_format)
    }
}
