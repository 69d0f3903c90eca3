// 🌬️ Ventilation
// Heat-recovery ventilators; the type comes from supply flow and the two
// certification flags.

use serde_json::{json, Value};

use crate::element::XmlNode;
use crate::error::{ComponentContext, ComponentKind, InvalidEmbeddedDataTypeError};
use crate::units::Bilingual;

const CFM_PER_LPS: f64 = 2.11888;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VentilationType {
    NotApplicable,
    EnergyStarInstituteCertified,
    EnergyStarNotInstituteCertified,
    NotEnergyStarInstituteCertified,
    NotEnergyStarNotInstituteCertified,
}

impl VentilationType {
    /// Zero supply flow means no ventilator; otherwise the two certifications decide
    pub fn classify(supply_flow: f64, energy_star: bool, institute_certified: bool) -> Self {
        if supply_flow == 0.0 {
            return VentilationType::NotApplicable;
        }
        match (energy_star, institute_certified) {
            (true, true) => VentilationType::EnergyStarInstituteCertified,
            (true, false) => VentilationType::EnergyStarNotInstituteCertified,
            (false, true) => VentilationType::NotEnergyStarInstituteCertified,
            (false, false) => VentilationType::NotEnergyStarNotInstituteCertified,
        }
    }

    pub fn label(&self) -> Bilingual {
        match self {
            VentilationType::NotApplicable => Bilingual::new("N/A", "N/A"),
            VentilationType::EnergyStarInstituteCertified => Bilingual::new(
                "Home Ventilating Institute listed ENERGY STAR certified heat recovery ventilator",
                "Ventilateur-récupérateur de chaleur répertorié par le Home Ventilating Institute et certifié ENERGY STAR",
            ),
            VentilationType::EnergyStarNotInstituteCertified => Bilingual::new(
                "ENERGY STAR certified heat recovery ventilator",
                "Ventilateur-récupérateur de chaleur certifié ENERGY STAR",
            ),
            VentilationType::NotEnergyStarInstituteCertified => Bilingual::new(
                "Heat recovery ventilator certified by the Home Ventilating Institute",
                "Ventilateur-récupérateur de chaleur certifié par le Home Ventilating Institute",
            ),
            VentilationType::NotEnergyStarNotInstituteCertified => Bilingual::new(
                "Heat recovery ventilator",
                "Ventilateur-récupérateur de chaleur",
            ),
        }
    }
}

/// Heat-recovery ventilator
#[derive(Debug, Clone, PartialEq)]
pub struct Ventilation {
    pub ventilation_type: VentilationType,
    /// L/s
    pub air_flow_rate: f64,
    /// Sensible efficiency, percent
    pub efficiency: f64,
}

impl Ventilation {
    pub fn from_data(node: &XmlNode) -> Result<Self, InvalidEmbeddedDataTypeError> {
        let kind = ComponentKind::Ventilation;
        let air_flow_rate = node.get_f64("@supplyFlowrate").component(kind)?;
        let energy_star = node.get_bool("@isEnergyStar").component(kind)?;
        let institute_certified = node
            .get_bool("@isHomeVentilatingInstituteCertified")
            .component(kind)?;

        Ok(Ventilation {
            ventilation_type: VentilationType::classify(air_flow_rate, energy_star, institute_certified),
            air_flow_rate,
            efficiency: node.get_f64("@sensibleEfficiency1").component(kind)?,
        })
    }

    pub fn air_flow_rate_cfm(&self) -> f64 {
        self.air_flow_rate * CFM_PER_LPS
    }

    pub fn to_json(&self) -> Value {
        let label = self.ventilation_type.label();
        json!({
            "typeEnglish": label.english,
            "typeFrench": label.french,
            "airFlowRateLps": self.air_flow_rate,
            "airFlowRateCfm": self.air_flow_rate_cfm(),
            "efficiency": self.efficiency,
        })
    }
}
