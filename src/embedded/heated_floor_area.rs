// Heated floor area, above and below grade

use serde_json::{json, Value};

use crate::element::XmlNode;
use crate::error::{ComponentContext, ComponentKind, InvalidEmbeddedDataTypeError};
use crate::units::Area;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatedFloorArea {
    pub above_grade: Area,
    pub below_grade: Area,
}

impl HeatedFloorArea {
    pub fn from_data(node: &XmlNode) -> Result<Self, InvalidEmbeddedDataTypeError> {
        let kind = ComponentKind::HeatedFloorArea;
        Ok(HeatedFloorArea {
            above_grade: Area::new(node.get_f64("@aboveGrade").component(kind)?),
            below_grade: Area::new(node.get_f64("@belowGrade").component(kind)?),
        })
    }

    pub fn to_json(&self) -> Value {
        json!({
            "areaAboveGradeMetres": self.above_grade.square_metres,
            "areaAboveGradeFeet": self.above_grade.square_feet(),
            "areaBelowGradeMetres": self.below_grade.square_metres,
            "areaBelowGradeFeet": self.below_grade.square_feet(),
        })
    }
}
