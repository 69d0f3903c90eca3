// 📏 Value Types - one canonical metric value, derived imperial view
// Every physical quantity is emitted in both unit systems and every label
// in both official languages.

use serde::{Deserialize, Serialize};

use crate::element::XmlNode;
use crate::error::ElementGetValueError;

pub const FEET_PER_METRE: f64 = 3.28084;
pub const R_PER_RSI: f64 = 5.678263337;

// ============================================================================
// DISTANCE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    pub metres: f64,
}

impl Distance {
    pub fn new(metres: f64) -> Self {
        Distance { metres }
    }

    pub fn from_feet(feet: f64) -> Self {
        Distance {
            metres: feet / FEET_PER_METRE,
        }
    }

    pub fn feet(&self) -> f64 {
        self.metres * FEET_PER_METRE
    }
}

// ============================================================================
// AREA
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub square_metres: f64,
}

impl Area {
    pub fn new(square_metres: f64) -> Self {
        Area { square_metres }
    }

    pub fn from_square_feet(square_feet: f64) -> Self {
        Area {
            square_metres: square_feet / (FEET_PER_METRE * FEET_PER_METRE),
        }
    }

    /// Rectangle spanned by two distances
    pub fn from_dimensions(a: Distance, b: Distance) -> Self {
        Area::new(a.metres * b.metres)
    }

    pub fn square_feet(&self) -> f64 {
        self.square_metres * FEET_PER_METRE * FEET_PER_METRE
    }
}

// ============================================================================
// INSULATION
// ============================================================================

/// Thermal resistance, stored as RSI (m²·K/W)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Insulation {
    pub rsi: f64,
}

impl Insulation {
    pub fn new(rsi: f64) -> Self {
        Insulation { rsi }
    }

    pub fn from_r_value(r_value: f64) -> Self {
        Insulation {
            rsi: r_value / R_PER_RSI,
        }
    }

    pub fn r_value(&self) -> f64 {
        self.rsi * R_PER_RSI
    }
}

// ============================================================================
// BILINGUAL
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bilingual {
    pub english: String,
    pub french: String,
}

impl Bilingual {
    pub fn new(english: impl Into<String>, french: impl Into<String>) -> Self {
        Bilingual {
            english: english.into(),
            french: french.into(),
        }
    }

    /// Read `{path}/English` and `{path}/French` below `node`
    pub fn from_node(node: &XmlNode, path: &str) -> Result<Self, ElementGetValueError> {
        let prefix = if path.is_empty() || path == "." {
            String::new()
        } else {
            format!("{}/", path)
        };
        Ok(Bilingual {
            english: node.get_text(&format!("{}English", prefix))?,
            french: node.get_text(&format!("{}French", prefix))?,
        })
    }
}
