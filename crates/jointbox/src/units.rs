//! Display units and their conversion to internal inches.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How lengths are displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthFormat {
    /// Decimal, in [`LengthUnit`].
    #[default]
    Decimal,
    /// Feet and inches.
    Architectural,
    /// Decimal feet.
    Engineering,
    /// Fractional inches.
    Fractional,
}

impl LengthFormat {
    /// Map a host format code (0-3).
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(LengthFormat::Decimal),
            1 => Some(LengthFormat::Architectural),
            2 => Some(LengthFormat::Engineering),
            3 => Some(LengthFormat::Fractional),
            _ => None,
        }
    }
}

/// Unit for decimal lengths. Ignored by the other formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthUnit {
    /// Inches.
    #[default]
    Inches,
    /// Feet.
    Feet,
    /// Millimeters.
    Millimeter,
    /// Centimeters.
    Centimeter,
    /// Meters.
    Meter,
}

impl LengthUnit {
    /// Map a host unit code (0-4).
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(LengthUnit::Inches),
            1 => Some(LengthUnit::Feet),
            2 => Some(LengthUnit::Millimeter),
            3 => Some(LengthUnit::Centimeter),
            4 => Some(LengthUnit::Meter),
            _ => None,
        }
    }
}

/// Unit label written next to dimension attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitLabel {
    /// Imperial display.
    #[serde(rename = "INCHES")]
    Inches,
    /// Metric display.
    #[serde(rename = "CM")]
    Centimeters,
}

impl UnitLabel {
    /// The label text.
    pub fn as_str(self) -> &'static str {
        match self {
            UnitLabel::Inches => "INCHES",
            UnitLabel::Centimeters => "CM",
        }
    }
}

impl fmt::Display for UnitLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scene's unit settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnitsOptions {
    /// Display format.
    #[serde(default)]
    pub length_format: LengthFormat,
    /// Decimal unit.
    #[serde(default)]
    pub length_unit: LengthUnit,
}

impl UnitsOptions {
    /// Create unit settings.
    pub fn new(length_format: LengthFormat, length_unit: LengthUnit) -> Self {
        Self {
            length_format,
            length_unit,
        }
    }

    /// Label for dimension attributes.
    pub fn label(&self) -> UnitLabel {
        match (self.length_format, self.length_unit) {
            (LengthFormat::Decimal, LengthUnit::Millimeter)
            | (LengthFormat::Decimal, LengthUnit::Centimeter)
            | (LengthFormat::Decimal, LengthUnit::Meter) => UnitLabel::Centimeters,
            _ => UnitLabel::Inches,
        }
    }

    /// Inches per display unit.
    pub fn scale_factor(&self) -> f64 {
        match (self.length_format, self.length_unit) {
            (LengthFormat::Decimal, LengthUnit::Feet) => 12.0,
            (LengthFormat::Decimal, LengthUnit::Millimeter) => 1.0 / 25.4,
            (LengthFormat::Decimal, LengthUnit::Centimeter) => 1.0 / 2.54,
            (LengthFormat::Decimal, LengthUnit::Meter) => 1.0 / 0.0254,
            (LengthFormat::Engineering, _) => 12.0,
            _ => 1.0,
        }
    }

    /// Convert a length typed in display units to inches.
    pub fn to_internal(&self, length: f64) -> f64 {
        length * self.scale_factor()
    }
}
