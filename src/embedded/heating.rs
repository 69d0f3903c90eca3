// 🔥 Heating System
// The system type is whichever known tag appears first under Type1; capacity
// is normalized to kW whatever unit the audit tool recorded.

use serde_json::{json, Value};

use crate::element::XmlNode;
use crate::error::{ComponentContext, ComponentKind, InvalidEmbeddedDataTypeError};
use crate::units::Bilingual;

pub const BTU_PER_KW: f64 = 3412.142;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeatingSystemType {
    Baseboards,
    Furnace,
    Boiler,
}

impl HeatingSystemType {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "Baseboards" => Some(HeatingSystemType::Baseboards),
            "Furnace" => Some(HeatingSystemType::Furnace),
            "Boiler" => Some(HeatingSystemType::Boiler),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            HeatingSystemType::Baseboards => "Baseboards",
            HeatingSystemType::Furnace => "Furnace",
            HeatingSystemType::Boiler => "Boiler",
        }
    }

    pub fn label(&self) -> Bilingual {
        match self {
            HeatingSystemType::Baseboards => Bilingual::new(
                "Electric baseboard / space heaters",
                "Plinthe électrique / radiateurs",
            ),
            HeatingSystemType::Furnace => Bilingual::new("Furnace", "Fournaise"),
            HeatingSystemType::Boiler => Bilingual::new("Boiler", "Chaudière"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergySource {
    Electric,
    NaturalGas,
    Oil,
    Propane,
    Wood,
}

impl EnergySource {
    /// Source-code table; 5 and 6 are both wood
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(EnergySource::Electric),
            2 => Some(EnergySource::NaturalGas),
            3 => Some(EnergySource::Oil),
            4 => Some(EnergySource::Propane),
            5 | 6 => Some(EnergySource::Wood),
            _ => None,
        }
    }

    pub fn label(&self) -> Bilingual {
        match self {
            EnergySource::Electric => Bilingual::new("Electricity", "Électricité"),
            EnergySource::NaturalGas => Bilingual::new("Natural gas", "Gaz naturel"),
            EnergySource::Oil => Bilingual::new("Oil", "Mazout"),
            EnergySource::Propane => Bilingual::new("Propane", "Propane"),
            EnergySource::Wood => Bilingual::new("Wood", "Bois"),
        }
    }
}

/// Capacity in kW from a value and its recorded unit
fn capacity_kw(value: f64, units: &str) -> Result<f64, String> {
    match units.trim().to_ascii_lowercase().as_str() {
        "kw" => Ok(value),
        "btu/hr" | "btu/h" | "btuh" => Ok(value / BTU_PER_KW),
        "kbtu/hr" | "kbtu/h" => Ok(value * 1000.0 / BTU_PER_KW),
        other => Err(format!("unknown capacity unit '{}'", other)),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatingSystem {
    pub heating_system_type: HeatingSystemType,
    pub energy_source: EnergySource,
    /// kW
    pub output_size: f64,
    pub efficiency: f64,
    pub steady_state: bool,
}

impl HeatingSystem {
    pub fn from_data(node: &XmlNode) -> Result<Self, InvalidEmbeddedDataTypeError> {
        let kind = ComponentKind::HeatingSystem;

        let system = node
            .xpath("Type1/*")
            .into_iter()
            .find_map(|child| HeatingSystemType::from_tag(child.tag()).map(|t| (t, child)));
        let (heating_system_type, system_node) = system.ok_or_else(|| {
            InvalidEmbeddedDataTypeError::new(kind, "no known heating system under Type1")
        })?;

        let energy_source = match heating_system_type {
            HeatingSystemType::Baseboards => EnergySource::Electric,
            _ => {
                let code = system_node
                    .get_i64("Equipment/EnergySource/@code")
                    .component(kind)?;
                EnergySource::from_code(code).ok_or_else(|| {
                    InvalidEmbeddedDataTypeError::new(kind, format!("unknown energy source code {}", code))
                })?
            }
        };

        let value = system_node
            .get_f64("Specifications/OutputCapacity/@value")
            .component(kind)?;
        let units = system_node
            .get_text("Specifications/OutputCapacity/@uiUnits")
            .component(kind)?;
        let output_size =
            capacity_kw(value, &units).map_err(|reason| InvalidEmbeddedDataTypeError::new(kind, reason))?;

        let steady_state = match heating_system_type {
            HeatingSystemType::Baseboards => true,
            _ => system_node
                .get_bool("Specifications/@isSteadyState")
                .component(kind)?,
        };

        Ok(HeatingSystem {
            heating_system_type,
            energy_source,
            output_size,
            efficiency: system_node.get_f64("Specifications/@efficiency").component(kind)?,
            steady_state,
        })
    }

    pub fn output_size_btu(&self) -> f64 {
        self.output_size * BTU_PER_KW
    }

    pub fn to_json(&self) -> Value {
        let system_type = self.heating_system_type.label();
        let source = self.energy_source.label();
        json!({
            "heatingSystemTypeEnglish": system_type.english,
            "heatingSystemTypeFrench": system_type.french,
            "energySourceEnglish": source.english,
            "energySourceFrench": source.french,
            "outputSizeKW": self.output_size,
            "outputSizeBtu": self.output_size_btu(),
            "efficiency": self.efficiency,
            "steadyState": if self.steady_state { "Steady State" } else { "AFUE" },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn furnace(value: &str, units: &str, steady_state: &str) -> XmlNode {
        XmlNode::parse(&format!(
            r#"<HeatingCooling>
                <Label>Heating/Cooling System</Label>
                <Type1>
                    <FanAndPump hasEnhancedMotors="false" />
                    <Furnace>
                        <EquipmentInformation energystar="false" />
                        <Equipment isBiEnergy="false" switchoverTemperature="0">
                            <EnergySource code="2"><English>Natural gas</English><French>Gaz naturel</French></EnergySource>
                        </Equipment>
                        <Specifications sizingFactor="1.1" efficiency="78" isSteadyState="{}" pilotLight="0">
                            <OutputCapacity code="2" value="{}" uiUnits="{}" />
                        </Specifications>
                    </Furnace>
                </Type1>
            </HeatingCooling>"#,
            steady_state, value, units
        ))
        .unwrap()
    }

    #[test]
    fn test_heating_btu_conversion() {
        let heating = HeatingSystem::from_data(&furnace("1000", "btu/hr", "true")).unwrap();
        assert_relative_eq!(heating.output_size, 0.293071, epsilon = 1e-6);
        assert_relative_eq!(heating.output_size_btu(), 1000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_heating_furnace_json() {
        let output = HeatingSystem::from_data(&furnace("21.5", "kW", "false"))
            .unwrap()
            .to_json();
        assert_eq!(output["heatingSystemTypeEnglish"], "Furnace");
        assert_eq!(output["energySourceFrench"], "Gaz naturel");
        assert_eq!(output["outputSizeKW"], 21.5);
        assert_eq!(output["efficiency"], 78.0);
        assert_eq!(output["steadyState"], "AFUE");
    }

    #[test]
    fn test_heating_baseboards_are_electric() {
        let node = XmlNode::parse(
            r#"<HeatingCooling><Type1>
                <Baseboards>
                    <Specifications sizingFactor="1.1" efficiency="100">
                        <OutputCapacity code="2" value="12" uiUnits="kW" />
                    </Specifications>
                </Baseboards>
            </Type1></HeatingCooling>"#,
        )
        .unwrap();
        let heating = HeatingSystem::from_data(&node).unwrap();
        assert_eq!(heating.heating_system_type, HeatingSystemType::Baseboards);
        assert_eq!(heating.energy_source, EnergySource::Electric);
        assert_eq!(heating.to_json()["steadyState"], "Steady State");
    }

    #[test]
    fn test_heating_wood_codes() {
        assert_eq!(EnergySource::from_code(5), Some(EnergySource::Wood));
        assert_eq!(EnergySource::from_code(6), Some(EnergySource::Wood));
        assert_eq!(EnergySource::from_code(9), None);
    }

    #[test]
    fn test_heating_unknown_type_fails() {
        let node = XmlNode::parse("<HeatingCooling><Type1><FanAndPump /></Type1></HeatingCooling>").unwrap();
        let err = HeatingSystem::from_data(&node).unwrap_err();
        assert_eq!(err.kind, ComponentKind::HeatingSystem);
    }

    #[test]
    fn test_heating_unknown_unit_fails() {
        let err = HeatingSystem::from_data(&furnace("10", "therms", "true")).unwrap_err();
        assert_eq!(err.kind, ComponentKind::HeatingSystem);
    }
}
