// 🧱 Embedded Component Parsers
// One parser per component kind. Each consumes a tree adapter node (plus the
// code registry for walls and windows) and yields an immutable record whose
// `to_json` emits both unit systems and both languages.
//
// Every failure inside a parser surfaces as InvalidEmbeddedDataTypeError
// carrying the component kind.

pub mod ceiling;
pub mod door;
pub mod floor;
pub mod foundation;
pub mod heated_floor_area;
pub mod heating;
pub mod upgrade;
pub mod ventilation;
pub mod wall;
pub mod water_heating;
pub mod window;

pub use ceiling::Ceiling;
pub use door::Door;
pub use floor::Floor;
pub use foundation::{Foundation, FoundationFloor, FoundationHeader, FoundationKind, FoundationWall};
pub use heated_floor_area::HeatedFloorArea;
pub use heating::{EnergySource, HeatingSystem, HeatingSystemType};
pub use upgrade::Upgrade;
pub use ventilation::{Ventilation, VentilationType};
pub use wall::Wall;
pub use water_heating::{WaterHeating, WaterHeaterType};
pub use window::Window;

use crate::element::XmlNode;
use crate::error::{ComponentContext, ComponentKind, InvalidEmbeddedDataTypeError};
use crate::units::Insulation;

/// Nominal and effective insulation from a node's `nominalInsulation` / `rValue`
pub(crate) fn read_insulation(
    node: &XmlNode,
    path: &str,
    kind: ComponentKind,
) -> Result<(Insulation, Insulation), InvalidEmbeddedDataTypeError> {
    let nominal = node.get_f64(&format!("{}/@nominalInsulation", path)).component(kind)?;
    let effective = node.get_f64(&format!("{}/@rValue", path)).component(kind)?;
    Ok((Insulation::new(nominal), Insulation::new(effective)))
}
