//! Scale levels and the byte/bit conversion tables

/// Order-of-magnitude bucket a value is displayed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScaleLevel {
    Unit,
    Kilo,
    Mega,
    Giga,
}

impl ScaleLevel {
    /// All levels, smallest first
    pub const ALL: [ScaleLevel; 4] = [
        ScaleLevel::Unit,
        ScaleLevel::Kilo,
        ScaleLevel::Mega,
        ScaleLevel::Giga,
    ];

    /// Index into the conversion tables
    pub fn index(self) -> usize {
        self as usize
    }

    /// The next larger level, or `None` at Giga
    pub fn next(self) -> Option<Self> {
        match self {
            ScaleLevel::Unit => Some(ScaleLevel::Kilo),
            ScaleLevel::Kilo => Some(ScaleLevel::Mega),
            ScaleLevel::Mega => Some(ScaleLevel::Giga),
            ScaleLevel::Giga => None,
        }
    }

    /// Level selected by a `k`/`m`/`g` suffix character (either case)
    pub fn from_suffix(c: char) -> Option<Self> {
        match c {
            'k' | 'K' => Some(ScaleLevel::Kilo),
            'm' | 'M' => Some(ScaleLevel::Mega),
            'g' | 'G' => Some(ScaleLevel::Giga),
            _ => None,
        }
    }
}

/// Powers-of-1024 or powers-of-1000 scaling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Base {
    Binary,
    Decimal,
}

impl Base {
    pub fn radix(self) -> f64 {
        match self {
            Base::Binary => 1024.0,
            Base::Decimal => 1000.0,
        }
    }

    /// Multiplier applied when parsing a suffixed magnitude
    pub fn multiplier(self, level: ScaleLevel) -> f64 {
        self.radix().powi(level.index() as i32)
    }
}

/// Whether a value counts bytes or bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Bytes,
    Bits,
}

/// Conversion factors and labels for one quantity.
///
/// Factors strictly decrease from `Unit` to `Giga`.
#[derive(Debug)]
pub struct ScaleTable {
    base: Base,
    factors: [f64; 4],
    labels: [&'static str; 4],
}

/// Byte table, 1024 per level
pub const BYTE_TABLE: ScaleTable = ScaleTable {
    base: Base::Binary,
    factors: [
        1.0,
        1.0 / 1024.0,
        1.0 / 1024.0 / 1024.0,
        1.0 / 1024.0 / 1024.0 / 1024.0,
    ],
    labels: ["Byte", "KByte", "MByte", "GByte"],
};

/// Bit table, 1000 per level
pub const BIT_TABLE: ScaleTable = ScaleTable {
    base: Base::Decimal,
    factors: [
        1.0,
        1.0 / 1000.0,
        1.0 / 1000.0 / 1000.0,
        1.0 / 1000.0 / 1000.0 / 1000.0,
    ],
    labels: ["bit", "Kbit", "Mbit", "Gbit"],
};

impl ScaleTable {
    pub fn for_quantity(quantity: Quantity) -> &'static ScaleTable {
        match quantity {
            Quantity::Bytes => &BYTE_TABLE,
            Quantity::Bits => &BIT_TABLE,
        }
    }

    pub fn factor(&self, level: ScaleLevel) -> f64 {
        self.factors[level.index()]
    }

    pub fn label(&self, level: ScaleLevel) -> &'static str {
        self.labels[level.index()]
    }

    /// Reverse lookup of a label produced by this table
    pub fn level_of(&self, label: &str) -> Option<ScaleLevel> {
        ScaleLevel::ALL
            .into_iter()
            .find(|level| self.labels[level.index()] == label)
    }

    /// Radix the adaptive search divides by for this table
    pub fn base(&self) -> Base {
        self.base
    }
}
