// 🪵 Floor
// Area and length are read as recorded; nothing is derived.

use serde_json::{json, Value};

use super::read_insulation;
use crate::element::XmlNode;
use crate::error::{ComponentContext, ComponentKind, InvalidEmbeddedDataTypeError};
use crate::units::{Area, Distance, Insulation};

/// Exposed floor (e.g. room over a garage)
#[derive(Debug, Clone, PartialEq)]
pub struct Floor {
    pub label: String,
    pub nominal_insulation: Insulation,
    pub effective_insulation: Insulation,
    pub area: Area,
    pub length: Distance,
}

impl Floor {
    pub fn from_data(node: &XmlNode) -> Result<Self, InvalidEmbeddedDataTypeError> {
        let kind = ComponentKind::Floor;
        let (nominal_insulation, effective_insulation) =
            read_insulation(node, "Construction/Type", kind)?;

        Ok(Floor {
            label: node.get_text("Label").component(kind)?,
            nominal_insulation,
            effective_insulation,
            area: Area::new(node.get_f64("Measurements/@area").component(kind)?),
            length: Distance::new(node.get_f64("Measurements/@length").component(kind)?),
        })
    }

    pub fn to_json(&self) -> Value {
        json!({
            "label": self.label,
            "insulationNominalRsi": self.nominal_insulation.rsi,
            "insulationNominalR": self.nominal_insulation.r_value(),
            "insulationEffectiveRsi": self.effective_insulation.rsi,
            "insulationEffectiveR": self.effective_insulation.r_value(),
            "areaMetres": self.area.square_metres,
            "areaFeet": self.area.square_feet(),
            "lengthMetres": self.length.metres,
            "lengthFeet": self.length.feet(),
        })
    }
}
