// 🚪 Door
// U-factor is the inverse of the door's RSI, null when RSI is zero.

use serde_json::{json, Value};

use crate::element::XmlNode;
use crate::error::{ComponentContext, ComponentKind, InvalidEmbeddedDataTypeError};
use crate::units::{Area, Bilingual, Distance, Insulation};

#[derive(Debug, Clone, PartialEq)]
pub struct Door {
    pub label: String,
    pub door_type: Bilingual,
    pub insulation: Insulation,
    pub height: Distance,
    pub width: Distance,
}

impl Door {
    pub fn from_data(node: &XmlNode) -> Result<Self, InvalidEmbeddedDataTypeError> {
        let kind = ComponentKind::Door;
        Ok(Door {
            label: node.get_text("Label").component(kind)?,
            door_type: Bilingual::from_node(node, "Construction/Type").component(kind)?,
            insulation: Insulation::new(node.get_f64("Construction/Type/@value").component(kind)?),
            height: Distance::new(node.get_f64("Measurements/@height").component(kind)?),
            width: Distance::new(node.get_f64("Measurements/@width").component(kind)?),
        })
    }

    pub fn area(&self) -> Area {
        Area::from_dimensions(self.height, self.width)
    }

    /// W/m²·K; undefined for a zero RSI
    pub fn u_factor(&self) -> Option<f64> {
        (self.insulation.rsi != 0.0).then(|| 1.0 / self.insulation.rsi)
    }

    /// BTU/h·ft²·°F
    pub fn u_factor_imperial(&self) -> Option<f64> {
        (self.insulation.rsi != 0.0).then(|| 1.0 / self.insulation.r_value())
    }

    pub fn to_json(&self) -> Value {
        let area = self.area();
        json!({
            "label": self.label,
            "typeEnglish": self.door_type.english,
            "typeFrench": self.door_type.french,
            "insulationRsi": self.insulation.rsi,
            "insulationR": self.insulation.r_value(),
            "uFactor": self.u_factor(),
            "uFactorImperial": self.u_factor_imperial(),
            "areaMetres": area.square_metres,
            "areaFeet": area.square_feet(),
        })
    }
}
