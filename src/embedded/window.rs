// 🪟 Window
// Dimensions arrive in millimetres and are stored in metres.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::codes::{Codes, WindowCode};
use crate::element::XmlNode;
use crate::error::{ComponentContext, ComponentKind, InvalidEmbeddedDataTypeError};
use crate::units::{Area, Bilingual, Distance, Insulation};

/// Source window dimensions are millimetres
const MILLIMETRES_PER_METRE: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    pub label: String,
    pub window_code: Option<Arc<WindowCode>>,
    pub insulation: Insulation,
    pub width: Distance,
    pub height: Distance,
}

impl Window {
    pub fn from_data(node: &XmlNode, codes: &Codes) -> Result<Self, InvalidEmbeddedDataTypeError> {
        let kind = ComponentKind::Window;
        let code_ref = node.find_text("Construction/Type/@idref");
        let width = node.get_f64("Measurements/@width").component(kind)?;
        let height = node.get_f64("Measurements/@height").component(kind)?;

        Ok(Window {
            label: node.get_text("Label").component(kind)?,
            window_code: codes.window_code(code_ref.as_deref()),
            insulation: Insulation::new(node.get_f64("Construction/Type/@rValue").component(kind)?),
            width: Distance::new(width / MILLIMETRES_PER_METRE),
            height: Distance::new(height / MILLIMETRES_PER_METRE),
        })
    }

    pub fn area(&self) -> Area {
        Area::from_dimensions(self.width, self.height)
    }

    pub fn to_json(&self) -> Value {
        let code = self.window_code.as_deref();
        let field = |select: fn(&WindowCode) -> &Option<Bilingual>| {
            code.and_then(|c| select(c).as_ref())
        };
        let glazing = field(|c| &c.glazing_type);
        let coating = field(|c| &c.coating_tint);
        let fill = field(|c| &c.fill_type);
        let spacer = field(|c| &c.spacer_type);
        let window_type = field(|c| &c.window_code_type);
        let frame = field(|c| &c.frame_material);
        let area = self.area();

        json!({
            "label": self.label,
            "insulationRsi": self.insulation.rsi,
            "insulationR": self.insulation.r_value(),
            "glazingTypeEnglish": glazing.map(|b| b.english.as_str()),
            "glazingTypeFrench": glazing.map(|b| b.french.as_str()),
            "coatingsTintsEnglish": coating.map(|b| b.english.as_str()),
            "coatingsTintsFrench": coating.map(|b| b.french.as_str()),
            "fillTypeEnglish": fill.map(|b| b.english.as_str()),
            "fillTypeFrench": fill.map(|b| b.french.as_str()),
            "spacerTypeEnglish": spacer.map(|b| b.english.as_str()),
            "spacerTypeFrench": spacer.map(|b| b.french.as_str()),
            "typeEnglish": window_type.map(|b| b.english.as_str()),
            "typeFrench": window_type.map(|b| b.french.as_str()),
            "frameMaterialEnglish": frame.map(|b| b.english.as_str()),
            "frameMaterialFrench": frame.map(|b| b.french.as_str()),
            "areaMetres": area.square_metres,
            "areaFeet": area.square_feet(),
            "widthMetres": self.width.metres,
            "widthFeet": self.width.feet(),
            "heightMetres": self.height.metres,
            "heightFeet": self.height.feet(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::build_codes;
    use approx::assert_relative_eq;

    const WINDOW: &str = r#"
        <Window number="1" er="12.6118" shgc="0.4871" frameHeight="1311.9" id="4">
            <Label>East0001</Label>
            <Construction energyStar="false">
                <Type idref="Code 11" rValue="0.4779">234002</Type>
            </Construction>
            <Measurements height="1967.738" width="1322.0699" headerHeight="0" overhangWidth="0" />
            <FacingDirection code="1"><English>South</English><French>Sud</French></FacingDirection>
        </Window>
    "#;

    const WINDOW_CODE: &str = r#"
        <Code id="Code 11">
            <Label>234002</Label>
            <Layers>
                <GlazingTypes><English>Double/double with 1 coat</English><French>Double/double, 1 couche</French></GlazingTypes>
                <CoatingsTints><English>Clear</English><French>Transparent</French></CoatingsTints>
                <FillType><English>6 mm Air</English><French>6 mm d'air</French></FillType>
                <SpacerType><English>Metal</English><French>Métal</French></SpacerType>
                <Type><English>Picture</English><French>Fixe</French></Type>
                <FrameMaterial><English>Wood</English><French>Bois</French></FrameMaterial>
            </Layers>
        </Code>
    "#;

    fn codes() -> Codes {
        build_codes(&[], &[XmlNode::parse(WINDOW_CODE).unwrap()]).unwrap()
    }

    #[test]
    fn test_window_converts_millimetres() {
        let window = Window::from_data(&XmlNode::parse(WINDOW).unwrap(), &codes()).unwrap();
        assert_relative_eq!(window.width.metres, 1.3220699, epsilon = 1e-12);
        assert_relative_eq!(window.height.metres, 1.967738, epsilon = 1e-12);
        assert_relative_eq!(window.area().square_metres, 1.3220699 * 1.967738, epsilon = 1e-12);
    }

    #[test]
    fn test_window_to_json_with_code() {
        let output = Window::from_data(&XmlNode::parse(WINDOW).unwrap(), &codes())
            .unwrap()
            .to_json();
        assert_eq!(output["glazingTypeEnglish"], "Double/double with 1 coat");
        assert_eq!(output["spacerTypeFrench"], "Métal");
        assert_eq!(output["frameMaterialEnglish"], "Wood");
        assert_relative_eq!(output["insulationR"].as_f64().unwrap(), 0.4779 * 5.678263337, epsilon = 1e-9);
    }

    #[test]
    fn test_window_unknown_code_is_null() {
        let unknown = WINDOW.replace("Code 11", "Code 77");
        let output = Window::from_data(&XmlNode::parse(&unknown).unwrap(), &codes())
            .unwrap()
            .to_json();

        for key in [
            "glazingTypeEnglish",
            "glazingTypeFrench",
            "coatingsTintsEnglish",
            "fillTypeFrench",
            "spacerTypeEnglish",
            "typeEnglish",
            "frameMaterialFrench",
        ] {
            assert!(output[key].is_null(), "{} should be null", key);
        }
        assert_eq!(output["label"], "East0001");
    }

    #[test]
    fn test_window_missing_rsi() {
        let broken = WINDOW.replace(r#"rValue="0.4779""#, "");
        let err = Window::from_data(&XmlNode::parse(&broken).unwrap(), &codes()).unwrap_err();
        assert_eq!(err.kind, ComponentKind::Window);
    }
}
