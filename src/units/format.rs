//! Fixed-width byte and bit formatting with adaptive scale selection

use crate::report::error::ConfigError;
use crate::units::scale::{Quantity, ScaleLevel, ScaleTable};
use std::fmt;
use std::str::FromStr;

/// Below this a value prints as `#.##`; 9.995 would round up to `10.00`
const TWO_DECIMALS_BELOW: f64 = 9.995;
/// Below this a value prints as `##.#`; 99.95 would round up to `100.0`
const ONE_DECIMAL_BELOW: f64 = 99.95;

/// A format specifier character.
///
/// `B K M G` select a byte scale and `b k m g` a bit scale. `A`/`a` select
/// adaptive scaling. [`FormatSpec::from_char`] treats any other character as
/// adaptive, keeping the upper-case-means-bytes rule; parsing from a string
/// rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatSpec {
    pub quantity: Quantity,
    /// `None` means adaptive
    pub level: Option<ScaleLevel>,
}

impl FormatSpec {
    pub const ADAPTIVE_BYTES: FormatSpec = FormatSpec {
        quantity: Quantity::Bytes,
        level: None,
    };
    pub const ADAPTIVE_BITS: FormatSpec = FormatSpec {
        quantity: Quantity::Bits,
        level: None,
    };

    pub fn from_char(c: char) -> Self {
        let quantity = if c.is_uppercase() {
            Quantity::Bytes
        } else {
            Quantity::Bits
        };
        let level = match c.to_ascii_uppercase() {
            'B' => Some(ScaleLevel::Unit),
            'K' => Some(ScaleLevel::Kilo),
            'M' => Some(ScaleLevel::Mega),
            'G' => Some(ScaleLevel::Giga),
            _ => None,
        };
        Self { quantity, level }
    }

    /// Same scale choice, counted in bytes
    pub fn as_bytes(self) -> Self {
        Self {
            quantity: Quantity::Bytes,
            ..self
        }
    }

    /// Same scale choice, counted in bits
    pub fn as_bits(self) -> Self {
        Self {
            quantity: Quantity::Bits,
            ..self
        }
    }

    pub fn to_char(self) -> char {
        let c = match self.level {
            Some(ScaleLevel::Unit) => 'B',
            Some(ScaleLevel::Kilo) => 'K',
            Some(ScaleLevel::Mega) => 'M',
            Some(ScaleLevel::Giga) => 'G',
            None => 'A',
        };
        match self.quantity {
            Quantity::Bytes => c,
            Quantity::Bits => c.to_ascii_lowercase(),
        }
    }
}

impl From<char> for FormatSpec {
    fn from(c: char) -> Self {
        FormatSpec::from_char(c)
    }
}

const FORMAT_CHARS: &str = "BKMGAbkmga";

impl FromStr for FormatSpec {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if FORMAT_CHARS.contains(c) => Ok(FormatSpec::from_char(c)),
            _ => Err(ConfigError::InvalidFormat(s.to_string())),
        }
    }
}

impl fmt::Display for FormatSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// A formatted sample
#[derive(Debug, Clone, PartialEq)]
pub struct FormatResult {
    /// Value after bit conversion and scaling
    pub display_value: f64,
    pub quantity: Quantity,
    pub level: ScaleLevel,
    pub label: &'static str,
    /// `"<value> <label>"` with the value right-justified in four columns
    pub rendered: String,
}

/// Format `raw` bytes according to `spec`.
///
/// Negative and non-finite input is not rejected; it renders best-effort.
pub fn format_value(raw: f64, spec: FormatSpec) -> FormatResult {
    let table = ScaleTable::for_quantity(spec.quantity);
    let value = match spec.quantity {
        Quantity::Bytes => raw,
        Quantity::Bits => raw * 8.0,
    };

    let level = spec
        .level
        .unwrap_or_else(|| adaptive_level(value, table));

    let display_value = value * table.factor(level);
    let label = table.label(level);
    let rendered = format!("{} {}", render_number(display_value), label);

    FormatResult {
        display_value,
        quantity: spec.quantity,
        level,
        label,
        rendered,
    }
}

/// Smallest level whose quotient drops below the table's radix, capped at Giga
fn adaptive_level(value: f64, table: &ScaleTable) -> ScaleLevel {
    let radix = table.base().radix();
    let mut quotient = value;
    let mut level = ScaleLevel::Unit;

    while quotient >= radix {
        match level.next() {
            Some(next) => {
                quotient /= radix;
                level = next;
            }
            None => break,
        }
    }
    level
}

/// Right-justify into four columns with precision chosen by magnitude.
///
/// Values of 999.5 and above overflow the width on explicit scales.
pub fn render_number(value: f64) -> String {
    if value < TWO_DECIMALS_BELOW {
        format!("{:4.2}", value)
    } else if value < ONE_DECIMAL_BELOW {
        format!("{:4.1}", value)
    } else {
        format!("{:4.0}", value)
    }
}

/// Cut `s` so it fits a buffer of `max_len` slots, one of which is reserved
/// for a terminator.
pub fn truncate_to_buffer(s: &str, max_len: usize) -> &str {
    let limit = max_len.saturating_sub(1);
    if s.len() <= limit {
        return s;
    }
    let mut end = limit;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
