// ✂️ Snippet Extractor
// Pulls each component family out of the whole-house document and
// re-serializes it on its own, so every family is validated and parsed
// against its own schema later.

use serde_json::{Map, Value};

use crate::element::XmlNode;

pub const CEILINGS: &str = "ceilings";
pub const FLOORS: &str = "floors";
pub const WALLS: &str = "walls";
pub const DOORS: &str = "doors";
pub const WINDOWS: &str = "windows";
pub const HEATED_FLOOR_AREA: &str = "heatedFloorArea";
pub const HEATING: &str = "heating";
pub const VENTILATIONS: &str = "ventilations";
pub const WATER_HEATINGS: &str = "waterHeatings";
pub const BASEMENTS: &str = "basements";
pub const CRAWLSPACES: &str = "crawlspaces";
pub const SLABS: &str = "slabs";
pub const UPGRADES: &str = "upgrades";
pub const WALL_CODES: &str = "wallCodes";
pub const WINDOW_CODES: &str = "windowCodes";

pub const LIST_FIELDS: &[&str] = &[
    CEILINGS,
    FLOORS,
    WALLS,
    DOORS,
    WINDOWS,
    VENTILATIONS,
    BASEMENTS,
    CRAWLSPACES,
    SLABS,
    UPGRADES,
    WALL_CODES,
    WINDOW_CODES,
];

pub const SINGLETON_FIELDS: &[&str] = &[HEATED_FLOOR_AREA, HEATING, WATER_HEATINGS];

// Paths are relative to the document root (HouseFile)
const CEILING_PATH: &str = "House/Components/Ceiling";
const FLOOR_PATH: &str = "House/Components/Floor";
// Walls nested under other components' Components are left out
const WALL_PATH: &str = "House/Components/Wall";
// Doors and windows usually hang off walls, so nested ones count
const DOOR_PATH: &str = "House/Components//Door";
const WINDOW_PATH: &str = "House/Components//Window";
const HEATED_FLOOR_AREA_PATH: &str = "House/Specifications/HeatedFloorArea";
const HEATING_PATH: &str = "House/HeatingCooling";
const VENTILATION_PATH: &str = "House/Ventilation/WholeHouseVentilatorList/Hrv";
const WATER_HEATING_PATH: &str = "House/Components/HotWater";
const BASEMENT_PATH: &str = "House/Components/Basement";
const CRAWLSPACE_PATH: &str = "House/Components/Crawlspace";
const SLAB_PATH: &str = "House/Components/Slab";
const UPGRADE_PATH: &str = "EnergyUpgrades/Settings/*";
const WALL_CODE_PATH: &str = "Codes/Wall/*/Code";
const WINDOW_CODE_PATH: &str = "Codes/Window/*/Code";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snippets {
    pub ceilings: Vec<String>,
    pub floors: Vec<String>,
    pub walls: Vec<String>,
    pub doors: Vec<String>,
    pub windows: Vec<String>,
    pub heated_floor_area: Option<String>,
    pub heating: Option<String>,
    pub ventilations: Vec<String>,
    pub water_heatings: Option<String>,
    pub basements: Vec<String>,
    pub crawlspaces: Vec<String>,
    pub slabs: Vec<String>,
    pub upgrades: Vec<String>,
    pub wall_codes: Vec<String>,
    pub window_codes: Vec<String>,
}

fn extract_list(root: &XmlNode, path: &str) -> Vec<String> {
    root.xpath(path)
        .into_iter()
        .map(XmlNode::to_xml_string)
        .collect()
}

fn extract_singleton(root: &XmlNode, path: &str) -> Option<String> {
    root.xpath(path).first().map(|node| node.to_xml_string())
}

impl Snippets {
    pub fn from_document(root: &XmlNode) -> Self {
        Snippets {
            ceilings: extract_list(root, CEILING_PATH),
            floors: extract_list(root, FLOOR_PATH),
            walls: extract_list(root, WALL_PATH),
            doors: extract_list(root, DOOR_PATH),
            windows: extract_list(root, WINDOW_PATH),
            heated_floor_area: extract_singleton(root, HEATED_FLOOR_AREA_PATH),
            heating: extract_singleton(root, HEATING_PATH),
            ventilations: extract_list(root, VENTILATION_PATH),
            water_heatings: extract_singleton(root, WATER_HEATING_PATH),
            basements: extract_list(root, BASEMENT_PATH),
            crawlspaces: extract_list(root, CRAWLSPACE_PATH),
            slabs: extract_list(root, SLAB_PATH),
            upgrades: extract_list(root, UPGRADE_PATH),
            wall_codes: extract_list(root, WALL_CODE_PATH),
            window_codes: extract_list(root, WINDOW_CODE_PATH),
        }
    }

    /// Flat key-value form, merged into the extracted row
    pub fn to_fields(&self) -> Map<String, Value> {
        let lists: [(&str, &Vec<String>); 12] = [
            (CEILINGS, &self.ceilings),
            (FLOORS, &self.floors),
            (WALLS, &self.walls),
            (DOORS, &self.doors),
            (WINDOWS, &self.windows),
            (VENTILATIONS, &self.ventilations),
            (BASEMENTS, &self.basements),
            (CRAWLSPACES, &self.crawlspaces),
            (SLABS, &self.slabs),
            (UPGRADES, &self.upgrades),
            (WALL_CODES, &self.wall_codes),
            (WINDOW_CODES, &self.window_codes),
        ];
        let singletons: [(&str, &Option<String>); 3] = [
            (HEATED_FLOOR_AREA, &self.heated_floor_area),
            (HEATING, &self.heating),
            (WATER_HEATINGS, &self.water_heatings),
        ];

        let mut fields = Map::new();
        for (key, values) in lists {
            fields.insert(
                key.to_string(),
                Value::Array(values.iter().cloned().map(Value::String).collect()),
            );
        }
        for (key, value) in singletons {
            fields.insert(
                key.to_string(),
                value.clone().map(Value::String).unwrap_or(Value::Null),
            );
        }
        fields
    }
}
