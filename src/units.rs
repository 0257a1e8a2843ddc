//! Measurement unit conversion for PDF-space values
//!
//! PDF user space is measured in points (1/72 inch). Every other unit is
//! derived from the inch value so the conversions stay consistent with
//! each other.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

pub const POINTS_PER_INCH: f64 = 72.0;
pub const CM_PER_INCH: f64 = 2.54;
pub const MM_PER_INCH: f64 = 25.4;
pub const PICAS_PER_INCH: f64 = 6.0;

/// A display unit for coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Px,
    Pt,
    #[serde(rename = "in")]
    Inch,
    Cm,
    Mm,
    Pc,
}

impl Unit {
    /// All units in display order
    pub const ALL: [Unit; 6] = [
        Unit::Px,
        Unit::Pt,
        Unit::Inch,
        Unit::Cm,
        Unit::Mm,
        Unit::Pc,
    ];

    pub fn suffix(self) -> &'static str {
        match self {
            Unit::Px => "px",
            Unit::Pt => "pt",
            Unit::Inch => "in",
            Unit::Cm => "cm",
            Unit::Mm => "mm",
            Unit::Pc => "pc",
        }
    }

    /// Number of decimals used when formatting a value in this unit
    pub fn precision(self) -> usize {
        match self {
            Unit::Px => 1,
            _ => 2,
        }
    }

    /// Convert a point value into this unit without formatting
    pub fn from_points(self, value_pt: f64) -> f64 {
        let inches = value_pt / POINTS_PER_INCH;
        match self {
            Unit::Px | Unit::Pt => value_pt,
            Unit::Inch => inches,
            Unit::Cm => inches * CM_PER_INCH,
            Unit::Mm => inches * MM_PER_INCH,
            Unit::Pc => inches * PICAS_PER_INCH,
        }
    }

    /// Format a point value in this unit at the unit's precision
    pub fn format(self, value_pt: f64) -> String {
        format!("{:.*}", self.precision(), self.from_points(value_pt))
    }

    pub fn parse(name: &str) -> Option<Unit> {
        match name.trim().to_ascii_lowercase().as_str() {
            "px" => Some(Unit::Px),
            "pt" => Some(Unit::Pt),
            "in" | "inch" => Some(Unit::Inch),
            "cm" => Some(Unit::Cm),
            "mm" => Some(Unit::Mm),
            "pc" => Some(Unit::Pc),
            _ => None,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// One value formatted in every supported unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedUnits {
    pub px: String,
    pub pt: String,
    pub inch: String,
    pub cm: String,
    pub mm: String,
    pub pc: String,
}

impl ConvertedUnits {
    pub fn get(&self, unit: Unit) -> &str {
        match unit {
            Unit::Px => &self.px,
            Unit::Pt => &self.pt,
            Unit::Inch => &self.inch,
            Unit::Cm => &self.cm,
            Unit::Mm => &self.mm,
            Unit::Pc => &self.pc,
        }
    }
}

/// Format a PDF-space value in all units.
///
/// NaN and negative inputs are formatted as-is; callers are responsible
/// for passing meaningful magnitudes.
pub fn convert_all(value_pt: f64) -> ConvertedUnits {
    ConvertedUnits {
        px: Unit::Px.format(value_pt),
        pt: Unit::Pt.format(value_pt),
        inch: Unit::Inch.format(value_pt),
        cm: Unit::Cm.format(value_pt),
        mm: Unit::Mm.format(value_pt),
        pc: Unit::Pc.format(value_pt),
    }
}

pub fn pixels_to_points(pixels: f64, scale: f64) -> f64 {
    pixels / scale
}

pub fn pixels_to_inches(pixels: f64, scale: f64) -> f64 {
    pixels_to_points(pixels, scale) / POINTS_PER_INCH
}

pub fn pixels_to_centimeters(pixels: f64, scale: f64) -> f64 {
    pixels_to_inches(pixels, scale) * CM_PER_INCH
}

pub fn pixels_to_millimeters(pixels: f64, scale: f64) -> f64 {
    pixels_to_inches(pixels, scale) * MM_PER_INCH
}

pub fn pixels_to_picas(pixels: f64, scale: f64) -> f64 {
    pixels_to_inches(pixels, scale) * PICAS_PER_INCH
}

/// The set of units enabled for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitSet(BTreeSet<Unit>);

impl Default for UnitSet {
    /// Points only
    fn default() -> Self {
        Self::from_units([Unit::Pt])
    }
}

impl UnitSet {
    pub fn empty() -> Self {
        Self(BTreeSet::new())
    }

    pub fn from_units(units: impl IntoIterator<Item = Unit>) -> Self {
        Self(units.into_iter().collect())
    }

    pub fn contains(&self, unit: Unit) -> bool {
        self.0.contains(&unit)
    }

    pub fn enable(&mut self, unit: Unit) {
        self.0.insert(unit);
    }

    pub fn disable(&mut self, unit: Unit) {
        self.0.remove(&unit);
    }

    pub fn set(&mut self, unit: Unit, enabled: bool) {
        if enabled {
            self.enable(unit);
        } else {
            self.disable(unit);
        }
    }

    pub fn toggle(&mut self, unit: Unit) {
        let enabled = self.contains(unit);
        self.set(unit, !enabled);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Enabled units in display order
    pub fn iter(&self) -> impl Iterator<Item = Unit> + '_ {
        self.0.iter().copied()
    }
}
