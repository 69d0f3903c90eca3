// 🏗️ Foundation Dispatcher
// Basements, crawlspaces and slabs share one record shape but each tag has
// its own floor / wall / header rules:
//
//   Basement   1 slab floor, interior + exterior (+ pony) wall sections, header
//   Crawlspace slab floor + floor above, one wall section, header
//   Slab       1 slab floor, no walls, no header
//
// Absent floor subtrees still yield their floor records, zeroed and with
// null insulation.

use serde_json::{json, Value};

use super::read_insulation;
use crate::element::{parse_bool, XmlNode};
use crate::error::{ComponentContext, ComponentKind, InvalidEmbeddedDataTypeError};
use crate::units::{Area, Bilingual, Distance, Insulation};

// ============================================================================
// KINDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoundationKind {
    Basement,
    Crawlspace,
    Slab,
}

impl FoundationKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "Basement" => Some(FoundationKind::Basement),
            "Crawlspace" => Some(FoundationKind::Crawlspace),
            "Slab" => Some(FoundationKind::Slab),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FoundationKind::Basement => "basement",
            FoundationKind::Crawlspace => "crawlspace",
            FoundationKind::Slab => "slab",
        }
    }

    fn component_kind(&self) -> ComponentKind {
        match self {
            FoundationKind::Basement => ComponentKind::Basement,
            FoundationKind::Crawlspace => ComponentKind::Crawlspace,
            FoundationKind::Slab => ComponentKind::Slab,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloorType {
    Slab,
    FloorAboveCrawlspace,
}

impl FloorType {
    pub fn name(&self) -> &'static str {
        match self {
            FloorType::Slab => "slab",
            FloorType::FloorAboveCrawlspace => "floor above crawlspace",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallSectionType {
    Interior,
    Exterior,
    Pony,
    NotApplicable,
}

impl WallSectionType {
    pub fn label(&self) -> Bilingual {
        match self {
            WallSectionType::Interior => Bilingual::new("Interior", "Intérieur"),
            WallSectionType::Exterior => Bilingual::new("Exterior", "Extérieur"),
            WallSectionType::Pony => Bilingual::new("Pony", "Murs bas"),
            WallSectionType::NotApplicable => Bilingual::new("Not applicable", "Sans objet"),
        }
    }
}

/// Wall material from the second letter of the configuration type
fn material(configuration_type: &str) -> Bilingual {
    match configuration_type.chars().nth(1) {
        Some('C') => Bilingual::new("concrete", "béton"),
        Some('W') => Bilingual::new("wood", "bois"),
        Some('B') => Bilingual::new("concrete and wood", "béton et bois"),
        Some('M') => Bilingual::new("masonry", "maçonnerie"),
        _ => Bilingual::new("unknown", "inconnu"),
    }
}

// ============================================================================
// FLOORS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct FoundationFloor {
    pub floor_type: FloorType,
    pub rectangular: bool,
    pub nominal_insulation: Option<Insulation>,
    pub effective_insulation: Option<Insulation>,
    pub width: Option<Distance>,
    pub length: Option<Distance>,
    pub perimeter: Distance,
    pub area: Area,
}

impl FoundationFloor {
    fn from_data(
        node: &XmlNode,
        floor_type: FloorType,
        insulation_path: &str,
        kind: ComponentKind,
    ) -> Result<Self, InvalidEmbeddedDataTypeError> {
        let (nominal_insulation, effective_insulation) = if node.xpath(insulation_path).is_empty() {
            (None, None)
        } else {
            let (nominal, effective) = read_insulation(node, insulation_path, kind)?;
            (Some(nominal), Some(effective))
        };

        let mut floor = FoundationFloor {
            floor_type,
            rectangular: false,
            nominal_insulation,
            effective_insulation,
            width: None,
            length: None,
            perimeter: Distance::new(0.0),
            area: Area::new(0.0),
        };

        let measurements = match node.xpath("Floor/Measurements").first() {
            Some(measurements) => *measurements,
            None => return Ok(floor),
        };

        floor.rectangular = measurements.get_bool("@isRectangular").component(kind)?;
        if floor.rectangular {
            let width = Distance::new(measurements.get_f64("@width").component(kind)?);
            let length = Distance::new(measurements.get_f64("@length").component(kind)?);
            floor.perimeter = Distance::new(2.0 * (width.metres + length.metres));
            floor.area = Area::from_dimensions(width, length);
            floor.width = Some(width);
            floor.length = Some(length);
        } else {
            floor.perimeter = Distance::new(measurements.get_f64("@perimeter").component(kind)?);
            floor.area = Area::new(measurements.get_f64("@area").component(kind)?);
        }

        Ok(floor)
    }

    pub fn to_json(&self) -> Value {
        json!({
            "floorType": self.floor_type.name(),
            "insulationNominalRsi": self.nominal_insulation.map(|i| i.rsi),
            "insulationNominalR": self.nominal_insulation.map(|i| i.r_value()),
            "insulationEffectiveRsi": self.effective_insulation.map(|i| i.rsi),
            "insulationEffectiveR": self.effective_insulation.map(|i| i.r_value()),
            "areaMetres": self.area.square_metres,
            "areaFeet": self.area.square_feet(),
            "perimeterMetres": self.perimeter.metres,
            "perimeterFeet": self.perimeter.feet(),
            "widthMetres": self.width.map(|d| d.metres),
            "widthFeet": self.width.map(|d| d.feet()),
            "lengthMetres": self.length.map(|d| d.metres),
            "lengthFeet": self.length.map(|d| d.feet()),
        })
    }
}

// ============================================================================
// WALLS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct FoundationWall {
    pub wall_type: WallSectionType,
    pub nominal_insulation: Insulation,
    pub effective_insulation: Insulation,
    /// share of the total wall surface, percent
    pub percentage: f64,
    pub area: Area,
}

impl FoundationWall {
    fn from_section(
        section: &XmlNode,
        wall_type: WallSectionType,
        perimeter: Distance,
        height: Distance,
        kind: ComponentKind,
    ) -> Result<Self, InvalidEmbeddedDataTypeError> {
        let percentage = section.get_f64("@percentage").component(kind)?;
        Ok(FoundationWall {
            wall_type,
            nominal_insulation: Insulation::new(section.get_f64("@nominalRsi").component(kind)?),
            effective_insulation: Insulation::new(section.get_f64("@rsi").component(kind)?),
            percentage,
            area: Area::new(perimeter.metres * height.metres * percentage / 100.0),
        })
    }

    pub fn to_json(&self) -> Value {
        let label = self.wall_type.label();
        json!({
            "wallTypeEnglish": label.english,
            "wallTypeFrench": label.french,
            "insulationNominalRsi": self.nominal_insulation.rsi,
            "insulationNominalR": self.nominal_insulation.r_value(),
            "insulationEffectiveRsi": self.effective_insulation.rsi,
            "insulationEffectiveR": self.effective_insulation.r_value(),
            "percentage": self.percentage,
            "areaMetres": self.area.square_metres,
            "areaFeet": self.area.square_feet(),
        })
    }
}

fn basement_walls(
    node: &XmlNode,
    perimeter: Distance,
    kind: ComponentKind,
) -> Result<Vec<FoundationWall>, InvalidEmbeddedDataTypeError> {
    let wall = match node.xpath("Wall").first() {
        Some(wall) => *wall,
        None => return Ok(Vec::new()),
    };

    let mut sections = vec![
        (WallSectionType::Interior, "Construction/InteriorAddedInsulation/Composite/Section", "@height"),
        (WallSectionType::Exterior, "Construction/ExteriorAddedInsulation/Composite/Section", "@height"),
    ];
    let has_pony_wall = wall
        .get_optional("@hasPonyWall", parse_bool)
        .component(kind)?
        .unwrap_or(false);
    if has_pony_wall {
        sections.push((WallSectionType::Pony, "Construction/PonyWallType/Composite/Section", "@ponyWallHeight"));
    }

    let mut walls = Vec::new();
    for (wall_type, path, height_attribute) in sections {
        let nodes = wall.xpath(path);
        if nodes.is_empty() {
            continue;
        }
        let height = Distance::new(
            wall.get_f64(&format!("Measurements/{}", height_attribute))
                .component(kind)?,
        );
        for section in nodes {
            walls.push(FoundationWall::from_section(section, wall_type, perimeter, height, kind)?);
        }
    }
    Ok(walls)
}

fn crawlspace_walls(
    node: &XmlNode,
    perimeter: Distance,
    kind: ComponentKind,
) -> Result<Vec<FoundationWall>, InvalidEmbeddedDataTypeError> {
    if node.xpath("Wall").is_empty() {
        return Ok(Vec::new());
    }

    let (nominal_insulation, effective_insulation) =
        read_insulation(node, "Wall/Construction/Type", kind)?;
    let height = Distance::new(node.get_f64("Wall/Measurements/@height").component(kind)?);

    Ok(vec![FoundationWall {
        wall_type: WallSectionType::NotApplicable,
        nominal_insulation,
        effective_insulation,
        percentage: 100.0,
        area: Area::new(perimeter.metres * height.metres),
    }])
}

// ============================================================================
// HEADER
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct FoundationHeader {
    pub nominal_insulation: Insulation,
    pub effective_insulation: Insulation,
    pub height: Distance,
    pub perimeter: Distance,
}

impl FoundationHeader {
    fn from_data(node: &XmlNode, kind: ComponentKind) -> Result<Option<Self>, InvalidEmbeddedDataTypeError> {
        let header = match node.xpath("Components/FloorHeader").first() {
            Some(header) => *header,
            None => return Ok(None),
        };

        let (nominal_insulation, effective_insulation) =
            read_insulation(header, "Construction/Type", kind)?;
        Ok(Some(FoundationHeader {
            nominal_insulation,
            effective_insulation,
            height: Distance::new(header.get_f64("Measurements/@height").component(kind)?),
            perimeter: Distance::new(header.get_f64("Measurements/@perimeter").component(kind)?),
        }))
    }

    pub fn area(&self) -> Area {
        Area::from_dimensions(self.height, self.perimeter)
    }

    pub fn to_json(&self) -> Value {
        let area = self.area();
        json!({
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

// ============================================================================
// FOUNDATION
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Foundation {
    pub kind: FoundationKind,
    pub label: String,
    pub configuration_type: String,
    pub material: Bilingual,
    pub floors: Vec<FoundationFloor>,
    pub walls: Vec<FoundationWall>,
    pub header: Option<FoundationHeader>,
}

impl Foundation {
    /// Dispatch on the node's tag; unknown tags fail as a basement
    pub fn from_data(node: &XmlNode) -> Result<Self, InvalidEmbeddedDataTypeError> {
        let foundation_kind = FoundationKind::from_tag(node.tag()).ok_or_else(|| {
            InvalidEmbeddedDataTypeError::new(
                ComponentKind::Basement,
                format!("unknown foundation type '{}'", node.tag()),
            )
        })?;
        let kind = foundation_kind.component_kind();

        let configuration_type = node.get_text("Configuration/@type").component(kind)?;

        let (floors, walls, header) = match foundation_kind {
            FoundationKind::Basement => {
                let floor = FoundationFloor::from_data(node, FloorType::Slab, "Floor/Construction/AddedToSlab", kind)?;
                let walls = basement_walls(node, floor.perimeter, kind)?;
                (vec![floor], walls, FoundationHeader::from_data(node, kind)?)
            }
            FoundationKind::Crawlspace => {
                let slab = FoundationFloor::from_data(node, FloorType::Slab, "Floor/Construction/AddedToSlab", kind)?;
                let above = FoundationFloor::from_data(
                    node,
                    FloorType::FloorAboveCrawlspace,
                    "Floor/Construction/FloorsAbove",
                    kind,
                )?;
                let walls = crawlspace_walls(node, slab.perimeter, kind)?;
                (vec![slab, above], walls, FoundationHeader::from_data(node, kind)?)
            }
            FoundationKind::Slab => {
                let floor = FoundationFloor::from_data(node, FloorType::Slab, "Floor/Construction/AddedToSlab", kind)?;
                (vec![floor], Vec::new(), None)
            }
        };

        Ok(Foundation {
            kind: foundation_kind,
            label: node.get_text("Label").component(kind)?,
            material: material(&configuration_type),
            configuration_type,
            floors,
            walls,
            header,
        })
    }

    pub fn to_json(&self) -> Value {
        json!({
            "foundationType": self.kind.name(),
            "label": self.label,
            "configurationType": self.configuration_type,
            "materialEnglish": self.material.english,
            "materialFrench": self.material.french,
            "floors": self.floors.iter().map(FoundationFloor::to_json).collect::<Vec<_>>(),
            "walls": self.walls.iter().map(FoundationWall::to_json).collect::<Vec<_>>(),
            "header": self.header.as_ref().map(FoundationHeader::to_json),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const BASEMENT: &str = r#"
        <Basement isExposedSurface="true" exposedSurfacePerimeter="35.052" id="1">
            <Label>Basement</Label>
            <Configuration type="BCCB" subtype="4" overlap="0">BCCB_4</Configuration>
            <Floor>
                <Construction isBelowFrostline="true" hasIntegralFooting="false" heatedFloor="false">
                    <AddedToSlab rValue="0" nominalInsulation="0">User specified</AddedToSlab>
                </Construction>
                <Measurements isRectangular="true" width="9.144" length="12.192" />
            </Floor>
            <Wall hasPonyWall="true">
                <Construction corners="4">
                    <InteriorAddedInsulation nominalInsulation="1.432">
                        <Composite>
                            <Section rank="1" percentage="80" rsi="1.8016" nominalRsi="1.432" />
                            <Section rank="2" percentage="20" rsi="0" nominalRsi="0" />
                        </Composite>
                    </InteriorAddedInsulation>
                    <ExteriorAddedInsulation nominalInsulation="0">
                        <Composite>
                            <Section rank="1" percentage="100" rsi="0.5" nominalRsi="0.4" />
                        </Composite>
                    </ExteriorAddedInsulation>
                    <PonyWallType nominalInsulation="1.432">
                        <Composite>
                            <Section rank="1" percentage="100" rsi="1.8" nominalRsi="1.432" />
                        </Composite>
                    </PonyWallType>
                </Construction>
                <Measurements height="2.4384" depth="1.8288" ponyWallHeight="0.5" />
            </Wall>
            <Components>
                <FloorHeader adjacentEnclosedSpace="false" id="2">
                    <Label>BW hdr-01</Label>
                    <Construction><Type nominalInsulation="2.11" rValue="2.61">User specified</Type></Construction>
                    <Measurements height="0.23" perimeter="34.7456" />
                </FloorHeader>
            </Components>
        </Basement>
    "#;

    fn parse(xml: &str) -> Result<Foundation, InvalidEmbeddedDataTypeError> {
        Foundation::from_data(&XmlNode::parse(xml).unwrap())
    }

    #[test]
    fn test_basement_rectangular_floor() {
        let basement = parse(BASEMENT).unwrap();
        assert_eq!(basement.kind, FoundationKind::Basement);
        assert_eq!(basement.floors.len(), 1);

        let floor = &basement.floors[0];
        assert!(floor.rectangular);
        assert_relative_eq!(floor.perimeter.metres, 42.672, epsilon = 1e-9);
        assert_relative_eq!(floor.area.square_metres, 9.144 * 12.192, epsilon = 1e-9);
        assert_eq!(floor.nominal_insulation, Some(Insulation::new(0.0)));
    }

    #[test]
    fn test_basement_irregular_floor() {
        let xml = BASEMENT.replace(
            r#"isRectangular="true" width="9.144" length="12.192""#,
            r#"isRectangular="false" area="100.5" perimeter="40.2""#,
        );
        let floor = &parse(&xml).unwrap().floors[0];
        assert!(!floor.rectangular);
        assert_eq!(floor.area.square_metres, 100.5);
        assert_eq!(floor.perimeter.metres, 40.2);
        assert!(floor.to_json()["widthMetres"].is_null());
    }

    #[test]
    fn test_basement_composite_walls() {
        let basement = parse(BASEMENT).unwrap();
        let types: Vec<_> = basement.walls.iter().map(|w| w.wall_type).collect();
        assert_eq!(
            types,
            vec![
                WallSectionType::Interior,
                WallSectionType::Interior,
                WallSectionType::Exterior,
                WallSectionType::Pony,
            ]
        );

        let perimeter = 42.672;
        assert_relative_eq!(basement.walls[0].area.square_metres, perimeter * 2.4384 * 0.8, epsilon = 1e-9);
        assert_relative_eq!(basement.walls[3].area.square_metres, perimeter * 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_basement_without_pony_wall() {
        let xml = BASEMENT.replace(r#"hasPonyWall="true""#, r#"hasPonyWall="false""#);
        let basement = parse(&xml).unwrap();
        assert_eq!(basement.walls.len(), 3);
        assert!(basement.walls.iter().all(|w| w.wall_type != WallSectionType::Pony));
    }

    #[test]
    fn test_basement_header_and_material() {
        let output = parse(BASEMENT).unwrap().to_json();
        assert_eq!(output["foundationType"], "basement");
        assert_eq!(output["materialEnglish"], "concrete");
        assert_relative_eq!(output["header"]["areaMetres"].as_f64().unwrap(), 0.23 * 34.7456, epsilon = 1e-9);
    }

    #[test]
    fn test_minimal_floor_counts() {
        let basement = parse(
            r#"<Basement><Label>B</Label><Configuration type="BCCB">BCCB_4</Configuration></Basement>"#,
        )
        .unwrap();
        assert_eq!(basement.floors.len(), 1);
        assert!(basement.floors[0].nominal_insulation.is_none());
        assert!(basement.walls.is_empty());
        assert!(basement.header.is_none());

        let crawlspace = parse(
            r#"<Crawlspace><Label>C</Label><Configuration type="SCB">SCB_25</Configuration></Crawlspace>"#,
        )
        .unwrap();
        assert_eq!(crawlspace.floors.len(), 2);
        assert_eq!(crawlspace.floors[1].floor_type, FloorType::FloorAboveCrawlspace);
        assert_eq!(crawlspace.floors[1].area.square_metres, 0.0);
        assert!(crawlspace.to_json()["floors"][0]["insulationNominalRsi"].is_null());
    }

    #[test]
    fn test_crawlspace_single_wall() {
        let crawlspace = parse(
            r#"<Crawlspace>
                <Label>Crawl</Label>
                <Configuration type="SCB">SCB_25</Configuration>
                <Floor>
                    <Construction>
                        <FloorsAbove idref="Code 9" rValue="2.0" nominalInsulation="1.9" />
                    </Construction>
                    <Measurements isRectangular="false" area="30" perimeter="22" />
                </Floor>
                <Wall>
                    <Construction><Type nominalInsulation="1.432" rValue="1.6">User specified</Type></Construction>
                    <Measurements height="1.0" depth="0.5" />
                </Wall>
            </Crawlspace>"#,
        )
        .unwrap();

        assert_eq!(crawlspace.walls.len(), 1);
        assert_eq!(crawlspace.walls[0].percentage, 100.0);
        assert_relative_eq!(crawlspace.walls[0].area.square_metres, 22.0);
        assert!(crawlspace.floors[0].nominal_insulation.is_none());
        assert_eq!(crawlspace.floors[1].nominal_insulation, Some(Insulation::new(1.9)));
        assert_eq!(crawlspace.floors[1].area.square_metres, 30.0);
    }

    #[test]
    fn test_slab_has_no_walls_or_header() {
        let slab = parse(
            r#"<Slab>
                <Label>Slab</Label>
                <Configuration type="SCN">SCN_1</Configuration>
                <Wall><Measurements height="1" /></Wall>
                <Components><FloorHeader /></Components>
            </Slab>"#,
        )
        .unwrap();
        assert_eq!(slab.floors.len(), 1);
        assert!(slab.walls.is_empty());
        assert!(slab.header.is_none());
    }

    #[test]
    fn test_unknown_foundation_tag() {
        let err = parse("<Cellar><Label>x</Label></Cellar>").unwrap_err();
        assert_eq!(err.kind, ComponentKind::Basement);
    }

    #[test]
    fn test_crawlspace_error_kind() {
        let err = parse(r#"<Crawlspace><Configuration type="SCB" /></Crawlspace>"#).unwrap_err();
        assert_eq!(err.kind, ComponentKind::Crawlspace);
    }
}
