// 🧱 Wall
// Above-grade wall; area is perimeter × height. The construction code is
// looked up by idref and left null when the table lacks it.

use std::sync::Arc;

use serde_json::{json, Value};

use super::read_insulation;
use crate::codes::{Codes, WallCode};
use crate::element::XmlNode;
use crate::error::{ComponentContext, ComponentKind, InvalidEmbeddedDataTypeError};
use crate::units::{Area, Distance, Insulation};

#[derive(Debug, Clone, PartialEq)]
pub struct Wall {
    pub label: String,
    pub wall_code: Option<Arc<WallCode>>,
    pub nominal_insulation: Insulation,
    pub effective_insulation: Insulation,
    pub perimeter: Distance,
    pub height: Distance,
}

impl Wall {
    pub fn from_data(node: &XmlNode, codes: &Codes) -> Result<Self, InvalidEmbeddedDataTypeError> {
        let kind = ComponentKind::Wall;
        let (nominal_insulation, effective_insulation) =
            read_insulation(node, "Construction/Type", kind)?;
        let code_ref = node.find_text("Construction/Type/@idref");

        Ok(Wall {
            label: node.get_text("Label").component(kind)?,
            wall_code: codes.wall_code(code_ref.as_deref()),
            nominal_insulation,
            effective_insulation,
            perimeter: Distance::new(node.get_f64("Measurements/@perimeter").component(kind)?),
            height: Distance::new(node.get_f64("Measurements/@height").component(kind)?),
        })
    }

    pub fn area(&self) -> Area {
        Area::from_dimensions(self.perimeter, self.height)
    }

    pub fn to_json(&self) -> Value {
        let code = self.wall_code.as_deref();
        let area = self.area();
        json!({
            "label": self.label,
            "structureTypeEnglish": code.map(|c| c.structure_type.english.as_str()),
            "structureTypeFrench": code.map(|c| c.structure_type.french.as_str()),
            "componentTypeSizeEnglish": code.map(|c| c.component_type_size.english.as_str()),
            "componentTypeSizeFrench": code.map(|c| c.component_type_size.french.as_str()),
            "insulationNominalRsi": self.nominal_insulation.rsi,
            "insulationNominalR": self.nominal_insulation.r_value(),
            "insulationEffectiveRsi": self.effective_insulation.rsi,
            "insulationEffectiveR": self.effective_insulation.r_value(),
            "areaMetres": area.square_metres,
            "areaFeet": area.square_feet(),
            "perimeterMetres": self.perimeter.metres,
            "perimeterFeet": self.perimeter.feet(),
            "heightMetres": self.height.metres,
            "heightFeet": self.height.feet(),
        })
    }
}
