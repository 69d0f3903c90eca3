// 🏠 Ceiling

use serde_json::{json, Value};

use super::read_insulation;
use crate::element::XmlNode;
use crate::error::{ComponentContext, ComponentKind, InvalidEmbeddedDataTypeError};
use crate::units::{Area, Bilingual, Distance, Insulation};

#[derive(Debug, Clone, PartialEq)]
pub struct Ceiling {
    pub label: String,
    pub ceiling_type: Bilingual,
    pub nominal_insulation: Insulation,
    pub effective_insulation: Insulation,
    pub area: Area,
    pub length: Distance,
}

impl Ceiling {
    pub fn from_data(node: &XmlNode) -> Result<Self, InvalidEmbeddedDataTypeError> {
        let kind = ComponentKind::Ceiling;
        let (nominal_insulation, effective_insulation) =
            read_insulation(node, "Construction/CeilingType", kind)?;

        Ok(Ceiling {
            label: node.get_text("Label").component(kind)?,
            ceiling_type: Bilingual::from_node(node, "Construction/Type").component(kind)?,
            nominal_insulation,
            effective_insulation,
            area: Area::new(node.get_f64("Measurements/@area").component(kind)?),
            length: Distance::new(node.get_f64("Measurements/@length").component(kind)?),
        })
    }

    pub fn to_json(&self) -> Value {
        json!({
            "label": self.label,
            "typeEnglish": self.ceiling_type.english,
            "typeFrench": self.ceiling_type.french,
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

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const CEILING: &str = r#"
        <Ceiling id="2">
            <Label>Main attic</Label>
            <Construction>
                <Type><English>Attic/gable</English><French>Combles/pignon</French></Type>
                <CeilingType idref="Code 3" nominalInsulation="2.864" rValue="2.9463">1231000400</CeilingType>
            </Construction>
            <Measurements length="23.165" area="46.4515" heelHeight="0.1311" />
        </Ceiling>
    "#;

    #[test]
    fn test_ceiling_from_data() {
        let ceiling = Ceiling::from_data(&XmlNode::parse(CEILING).unwrap()).unwrap();
        assert_eq!(ceiling.label, "Main attic");
        assert_eq!(ceiling.ceiling_type.english, "Attic/gable");
        assert_relative_eq!(ceiling.nominal_insulation.rsi, 2.864);
        assert_relative_eq!(ceiling.effective_insulation.rsi, 2.9463);
        assert_relative_eq!(ceiling.area.square_metres, 46.4515);
        assert_relative_eq!(ceiling.length.metres, 23.165);
    }

    #[test]
    fn test_ceiling_to_json() {
        let output = Ceiling::from_data(&XmlNode::parse(CEILING).unwrap()).unwrap().to_json();
        assert_eq!(output["typeFrench"], "Combles/pignon");
        assert_relative_eq!(output["insulationNominalR"].as_f64().unwrap(), 16.262546197168, epsilon = 1e-6);
        assert_relative_eq!(output["areaFeet"].as_f64().unwrap(), 499.99982, epsilon = 1e-3);
        assert_relative_eq!(output["lengthFeet"].as_f64().unwrap(), 76.0, epsilon = 1e-2);
    }

    #[test]
    fn test_ceiling_bad_number_names_kind() {
        let broken = CEILING.replace(r#"area="46.4515""#, r#"area="large""#);
        let err = Ceiling::from_data(&XmlNode::parse(&broken).unwrap()).unwrap_err();
        assert_eq!(err.kind, ComponentKind::Ceiling);
    }
}
