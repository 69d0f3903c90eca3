// 🚿 Water Heating
// A HotWater block holds a primary heater and an optional secondary one.
// The heater type is resolved from the (energy source, tank type) pair.

use serde_json::{json, Value};

use crate::element::XmlNode;
use crate::error::{ComponentContext, ComponentKind, InvalidEmbeddedDataTypeError};
use crate::units::Bilingual;

const GALLONS_PER_LITRE: f64 = 0.219969;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaterHeaterType {
    NotApplicable,
    ElectricConventionalTank,
    ElectricConserverTank,
    ElectricInstantaneous,
    ElectricTanklessHeatPump,
    ElectricHeatPump,
    ElectricAddOnHeatPump,
    NaturalGasConventionalTank,
    NaturalGasConventionalTankPilot,
    NaturalGasTanklessCoil,
    NaturalGasTankless,
    NaturalGasInstantaneous,
    NaturalGasInstantaneousCondensing,
    NaturalGasInstantaneousPilot,
    NaturalGasInducedDraftFan,
    NaturalGasInducedDraftFanPilot,
    NaturalGasDirectVent,
    NaturalGasDirectVentPilot,
    NaturalGasCondensing,
    OilConventionalTank,
    OilTanklessCoil,
    PropaneConventionalTank,
    PropaneConventionalTankPilot,
    PropaneTanklessCoil,
    PropaneTankless,
    PropaneInstantaneous,
    PropaneInstantaneousCondensing,
    PropaneInstantaneousPilot,
    PropaneInducedDraftFan,
    PropaneInducedDraftFanPilot,
    PropaneDirectVent,
    PropaneDirectVentPilot,
    PropaneCondensing,
    WoodFireplace,
    WoodStoveWaterCoil,
    WoodIndoorBoiler,
    WoodOutdoorBoiler,
    WoodWaterHeater,
    SolarCollector,
}

fn is_wood(source: &str) -> bool {
    matches!(source, "mixed wood" | "hardwood" | "softwood" | "wood pellets")
}

impl WaterHeaterType {
    /// Case-insensitive lookup of the (energy source, tank type) pair
    pub fn resolve(energy_source: &str, tank_type: &str) -> Option<Self> {
        use WaterHeaterType::*;

        let source = energy_source.trim().to_lowercase();
        let tank = tank_type.trim().to_lowercase();

        if tank == "not applicable" {
            return Some(NotApplicable);
        }

        if is_wood(&source) {
            return match tank.as_str() {
                "fireplace" => Some(WoodFireplace),
                "wood stove water coil" => Some(WoodStoveWaterCoil),
                "indoor wood boiler" => Some(WoodIndoorBoiler),
                "outdoor wood boiler" => Some(WoodOutdoorBoiler),
                "wood-fired water heater" => Some(WoodWaterHeater),
                _ => None,
            };
        }

        let resolved = match (source.as_str(), tank.as_str()) {
            ("electricity", "conventional tank") => ElectricConventionalTank,
            ("electricity", "conserver tank") => ElectricConserverTank,
            ("electricity", "instantaneous") => ElectricInstantaneous,
            ("electricity", "tankless heat pump") => ElectricTanklessHeatPump,
            ("electricity", "heat pump") => ElectricHeatPump,
            ("electricity", "add-on heat pump") => ElectricAddOnHeatPump,

            ("natural gas", "conventional tank") => NaturalGasConventionalTank,
            ("natural gas", "conventional tank (pilot)") => NaturalGasConventionalTankPilot,
            ("natural gas", "tankless coil") => NaturalGasTanklessCoil,
            ("natural gas", "tankless") => NaturalGasTankless,
            ("natural gas", "instantaneous") => NaturalGasInstantaneous,
            ("natural gas", "instantaneous (condensing)") => NaturalGasInstantaneousCondensing,
            ("natural gas", "instantaneous (pilot)") => NaturalGasInstantaneousPilot,
            ("natural gas", "induced draft fan") => NaturalGasInducedDraftFan,
            ("natural gas", "induced draft fan (pilot)") => NaturalGasInducedDraftFanPilot,
            ("natural gas", "direct vent (sealed)") => NaturalGasDirectVent,
            ("natural gas", "direct vent (sealed, pilot)") => NaturalGasDirectVentPilot,
            ("natural gas", "condensing") => NaturalGasCondensing,

            ("oil", "conventional tank") => OilConventionalTank,
            ("oil", "tankless coil") => OilTanklessCoil,

            ("propane", "conventional tank") => PropaneConventionalTank,
            ("propane", "conventional tank (pilot)") => PropaneConventionalTankPilot,
            ("propane", "tankless coil") => PropaneTanklessCoil,
            ("propane", "tankless") => PropaneTankless,
            ("propane", "instantaneous") => PropaneInstantaneous,
            ("propane", "instantaneous (condensing)") => PropaneInstantaneousCondensing,
            ("propane", "instantaneous (pilot)") => PropaneInstantaneousPilot,
            ("propane", "induced draft fan") => PropaneInducedDraftFan,
            ("propane", "induced draft fan (pilot)") => PropaneInducedDraftFanPilot,
            ("propane", "direct vent (sealed)") => PropaneDirectVent,
            ("propane", "direct vent (sealed, pilot)") => PropaneDirectVentPilot,
            ("propane", "condensing") => PropaneCondensing,

            ("solar", "solar collector system") => SolarCollector,
            _ => return None,
        };
        Some(resolved)
    }

    pub fn label(&self) -> Bilingual {
        use WaterHeaterType::*;

        let (english, french) = match self {
            NotApplicable => ("Not applicable", "Sans objet"),
            ElectricConventionalTank => ("Electric storage tank", "Réservoir électrique"),
            ElectricConserverTank => ("Electric storage tank (conserver)", "Réservoir électrique (économiseur)"),
            ElectricInstantaneous => ("Electric tankless water heater", "Chauffe-eau électrique instantané"),
            ElectricTanklessHeatPump => ("Electric tankless heat pump", "Thermopompe électrique sans réservoir"),
            ElectricHeatPump => ("Electric heat pump", "Thermopompe électrique"),
            ElectricAddOnHeatPump => ("Electric add-on heat pump", "Thermopompe électrique d'appoint"),
            NaturalGasConventionalTank => ("Natural gas storage tank", "Réservoir au gaz naturel"),
            NaturalGasConventionalTankPilot => (
                "Natural gas storage tank with pilot",
                "Réservoir au gaz naturel avec veilleuse",
            ),
            NaturalGasTanklessCoil => ("Natural gas tankless coil", "Serpentin sans réservoir au gaz naturel"),
            NaturalGasTankless => ("Natural gas tankless", "Chauffe-eau sans réservoir au gaz naturel"),
            NaturalGasInstantaneous => ("Natural gas instantaneous", "Chauffe-eau instantané au gaz naturel"),
            NaturalGasInstantaneousCondensing => (
                "Natural gas instantaneous condensing",
                "Chauffe-eau instantané à condensation au gaz naturel",
            ),
            NaturalGasInstantaneousPilot => (
                "Natural gas instantaneous with pilot",
                "Chauffe-eau instantané au gaz naturel avec veilleuse",
            ),
            NaturalGasInducedDraftFan => ("Natural gas induced draft fan", "Gaz naturel à tirage induit"),
            NaturalGasInducedDraftFanPilot => (
                "Natural gas induced draft fan with pilot",
                "Gaz naturel à tirage induit avec veilleuse",
            ),
            NaturalGasDirectVent => ("Natural gas direct vent, sealed", "Gaz naturel à évacuation directe, scellé"),
            NaturalGasDirectVentPilot => (
                "Natural gas direct vent, sealed, with pilot",
                "Gaz naturel à évacuation directe, scellé, avec veilleuse",
            ),
            NaturalGasCondensing => ("Natural gas condensing", "Gaz naturel à condensation"),
            OilConventionalTank => ("Oil-fired storage tank", "Réservoir au mazout"),
            OilTanklessCoil => ("Oil-fired tankless coil", "Serpentin sans réservoir au mazout"),
            PropaneConventionalTank => ("Propane storage tank", "Réservoir au propane"),
            PropaneConventionalTankPilot => (
                "Propane storage tank with pilot",
                "Réservoir au propane avec veilleuse",
            ),
            PropaneTanklessCoil => ("Propane tankless coil", "Serpentin sans réservoir au propane"),
            PropaneTankless => ("Propane tankless", "Chauffe-eau sans réservoir au propane"),
            PropaneInstantaneous => ("Propane instantaneous", "Chauffe-eau instantané au propane"),
            PropaneInstantaneousCondensing => (
                "Propane instantaneous condensing",
                "Chauffe-eau instantané à condensation au propane",
            ),
            PropaneInstantaneousPilot => (
                "Propane instantaneous with pilot",
                "Chauffe-eau instantané au propane avec veilleuse",
            ),
            PropaneInducedDraftFan => ("Propane induced draft fan", "Propane à tirage induit"),
            PropaneInducedDraftFanPilot => (
                "Propane induced draft fan with pilot",
                "Propane à tirage induit avec veilleuse",
            ),
            PropaneDirectVent => ("Propane direct vent, sealed", "Propane à évacuation directe, scellé"),
            PropaneDirectVentPilot => (
                "Propane direct vent, sealed, with pilot",
                "Propane à évacuation directe, scellé, avec veilleuse",
            ),
            PropaneCondensing => ("Propane condensing", "Propane à condensation"),
            WoodFireplace => ("Wood fireplace", "Foyer au bois"),
            WoodStoveWaterCoil => ("Wood stove water coil", "Serpentin de poêle à bois"),
            WoodIndoorBoiler => ("Indoor wood boiler", "Chaudière intérieure au bois"),
            WoodOutdoorBoiler => ("Outdoor wood boiler", "Chaudière extérieure au bois"),
            WoodWaterHeater => ("Wood-fired water heater", "Chauffe-eau au bois"),
            SolarCollector => ("Solar collector system", "Système de capteurs solaires"),
        };
        Bilingual::new(english, french)
    }
}

/// How the heater's efficiency was recorded
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WaterHeaterEfficiency {
    EnergyFactor(f64),
    ThermalPercentage(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaterHeating {
    pub water_heater_type: WaterHeaterType,
    /// litres
    pub tank_volume: f64,
    pub efficiency: WaterHeaterEfficiency,
    /// percent at 9.5 L/min, when a recovery unit is fitted
    pub drain_water_heat_recovery_efficiency: Option<f64>,
}

impl WaterHeating {
    /// One heater node (`Primary` or `Secondary`)
    pub fn from_data(node: &XmlNode) -> Result<Self, InvalidEmbeddedDataTypeError> {
        let kind = ComponentKind::WaterHeating;

        let energy_source = node.get_text("EnergySource/English").component(kind)?;
        let tank_type = node.get_text("TankType/English").component(kind)?;
        let water_heater_type = WaterHeaterType::resolve(&energy_source, &tank_type).ok_or_else(|| {
            InvalidEmbeddedDataTypeError::new(
                kind,
                format!("unknown water heater '{}' / '{}'", energy_source, tank_type),
            )
        })?;

        let energy_factor = node
            .get_optional("EnergyFactor/@value", str::parse::<f64>)
            .component(kind)?;
        let thermal_efficiency = node
            .get_optional("EnergyFactor/@thermalEfficiency", str::parse::<f64>)
            .component(kind)?;
        let efficiency = match (energy_factor, thermal_efficiency) {
            (Some(value), _) => WaterHeaterEfficiency::EnergyFactor(value),
            (None, Some(value)) => WaterHeaterEfficiency::ThermalPercentage(value),
            (None, None) => {
                return Err(InvalidEmbeddedDataTypeError::new(
                    kind,
                    "neither energy factor nor thermal efficiency present",
                ))
            }
        };

        let has_recovery = node
            .get_optional("@hasDrainWaterHeatRecovery", crate::element::parse_bool)
            .component(kind)?
            .unwrap_or(false);
        let drain_water_heat_recovery_efficiency = if has_recovery {
            Some(
                node.get_f64("DrainWaterHeatRecovery/@effectivenessAt9.5")
                    .component(kind)?,
            )
        } else {
            None
        };

        Ok(WaterHeating {
            water_heater_type,
            tank_volume: node.get_f64("TankVolume/@value").component(kind)?,
            efficiency,
            drain_water_heat_recovery_efficiency,
        })
    }

    /// Every heater in a `HotWater` block, primary first
    pub fn from_block(block: &XmlNode) -> Result<Vec<Self>, InvalidEmbeddedDataTypeError> {
        let primary = block.xpath("Primary");
        if primary.is_empty() {
            return Err(InvalidEmbeddedDataTypeError::new(
                ComponentKind::WaterHeating,
                "no primary water heater",
            ));
        }

        primary
            .into_iter()
            .chain(block.xpath("Secondary"))
            .map(WaterHeating::from_data)
            .collect()
    }

    pub fn tank_volume_gallons(&self) -> f64 {
        self.tank_volume * GALLONS_PER_LITRE
    }

    pub fn to_json(&self) -> Value {
        let label = self.water_heater_type.label();
        let (ef, percentage) = match self.efficiency {
            WaterHeaterEfficiency::EnergyFactor(value) => (Some(value), None),
            WaterHeaterEfficiency::ThermalPercentage(value) => (None, Some(value)),
        };
        json!({
            "typeEnglish": label.english,
            "typeFrench": label.french,
            "tankVolumeLitres": self.tank_volume,
            "tankVolumeGallon": self.tank_volume_gallons(),
            "efficiencyEf": ef,
            "efficiencyPercentage": percentage,
            "drainWaterHeatRecoveryEfficiencyPercentage": self.drain_water_heat_recovery_efficiency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const HOT_WATER: &str = r#"
        <HotWater>
            <Label>Domestic Hot Water</Label>
            <Primary hasDrainWaterHeatRecovery="true" insulatingBlanket="0" energyStar="false">
                <EnergySource code="1"><English>Electricity</English><French>Électricité</French></EnergySource>
                <TankType code="2"><English>Conventional tank</English><French>Réservoir classique</French></TankType>
                <TankVolume code="4" value="189.3001" />
                <EnergyFactor code="1" value="0.8217" inputCapacity="0" />
                <DrainWaterHeatRecovery showerLength="5" dailyShowers="2" effectivenessAt9.5="42.6" />
            </Primary>
            <Secondary hasDrainWaterHeatRecovery="false">
                <EnergySource code="7"><English>Softwood</English><French>Bois mou</French></EnergySource>
                <TankType code="9"><English>Fireplace</English><French>Foyer</French></TankType>
                <TankVolume code="1" value="0" />
                <EnergyFactor code="1" thermalEfficiency="45" />
            </Secondary>
        </HotWater>
    "#;

    #[test]
    fn test_water_heating_block() {
        let heaters = WaterHeating::from_block(&XmlNode::parse(HOT_WATER).unwrap()).unwrap();
        assert_eq!(heaters.len(), 2);

        let primary = &heaters[0];
        assert_eq!(primary.water_heater_type, WaterHeaterType::ElectricConventionalTank);
        assert_eq!(primary.efficiency, WaterHeaterEfficiency::EnergyFactor(0.8217));
        assert_eq!(primary.drain_water_heat_recovery_efficiency, Some(42.6));

        let secondary = &heaters[1];
        assert_eq!(secondary.water_heater_type, WaterHeaterType::WoodFireplace);
        assert_eq!(secondary.efficiency, WaterHeaterEfficiency::ThermalPercentage(45.0));
        assert_eq!(secondary.drain_water_heat_recovery_efficiency, None);
    }

    #[test]
    fn test_water_heating_to_json() {
        let heaters = WaterHeating::from_block(&XmlNode::parse(HOT_WATER).unwrap()).unwrap();
        let output = heaters[0].to_json();
        assert_eq!(output["typeEnglish"], "Electric storage tank");
        assert_relative_eq!(output["tankVolumeGallon"].as_f64().unwrap(), 41.64, epsilon = 1e-3);
        assert_eq!(output["efficiencyEf"], 0.8217);
        assert!(output["efficiencyPercentage"].is_null());
    }

    #[test]
    fn test_water_heater_lookup_ignores_case() {
        assert_eq!(
            WaterHeaterType::resolve("NATURAL GAS", "Instantaneous (Condensing)"),
            Some(WaterHeaterType::NaturalGasInstantaneousCondensing)
        );
        assert_eq!(
            WaterHeaterType::resolve("Wood Pellets", "Outdoor wood boiler"),
            Some(WaterHeaterType::WoodOutdoorBoiler)
        );
        assert_eq!(WaterHeaterType::resolve("Oil", "Heat pump"), None);
    }

    #[test]
    fn test_water_heating_without_efficiency_fails() {
        let xml = HOT_WATER.replace(r#"<EnergyFactor code="1" value="0.8217" inputCapacity="0" />"#, "");
        let err = WaterHeating::from_block(&XmlNode::parse(&xml).unwrap()).unwrap_err();
        assert_eq!(err.kind, ComponentKind::WaterHeating);
    }

    #[test]
    fn test_water_heating_unmapped_pair_fails() {
        let xml = HOT_WATER.replace("<English>Conventional tank</English>", "<English>Geothermal</English>");
        let err = WaterHeating::from_block(&XmlNode::parse(&xml).unwrap()).unwrap_err();
        assert_eq!(err.kind, ComponentKind::WaterHeating);
    }
}
