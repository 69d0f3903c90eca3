// 🧪 Shared fixtures for pipeline tests

use serde_json::{json, Value};

use crate::schema::RawRow;

/// One complete whole-house document with every component family present
pub const HOUSE_XML: &str = r#"<HouseFile>
    <House>
        <Specifications>
            <HeatedFloorArea aboveGrade="92.9" belowGrade="46.45" />
        </Specifications>
        <Components>
            <Ceiling id="1">
                <Label>Main attic</Label>
                <Construction>
                    <Type><English>Attic/gable</English><French>Combles/pignon</French></Type>
                    <CeilingType idref="Code 3" nominalInsulation="2.864" rValue="2.9463">2201</CeilingType>
                </Construction>
                <Measurements area="46.4515" length="23.875" />
            </Ceiling>
            <Floor id="2">
                <Label>Rm over garage</Label>
                <Construction>
                    <Type nominalInsulation="3.3" rValue="3.5">User specified</Type>
                </Construction>
                <Measurements area="9.2903" length="3.048" />
            </Floor>
            <Wall id="3">
                <Label>Second level</Label>
                <Construction corners="1" intersections="2">
                    <Type idref="Code 1" nominalInsulation="1.432" rValue="1.8016">1201101121</Type>
                </Construction>
                <Measurements height="2.4384" perimeter="92.96" />
                <Components>
                    <Door rValue="0.39" id="4">
                        <Label>Front door</Label>
                        <Construction>
                            <Type code="8" value="0.39"><English>Solid wood</English><French>Bois massif</French></Type>
                        </Construction>
                        <Measurements height="1.9799" width="0.8499" />
                    </Door>
                    <Window id="5">
                        <Label>East0001</Label>
                        <Construction>
                            <Type idref="Code 11" rValue="0.4779">234002</Type>
                        </Construction>
                        <Measurements height="1967.738" width="1322.0699" />
                    </Window>
                    <Window id="6">
                        <Label>West0001</Label>
                        <Construction>
                            <Type idref="Code 99" rValue="0.4779">234002</Type>
                        </Construction>
                        <Measurements height="1000" width="500" />
                    </Window>
                </Components>
            </Wall>
            <Basement id="7">
                <Label>Basement</Label>
                <Configuration type="BCCB" subtype="4" overlap="0">BCCB_4</Configuration>
                <Floor>
                    <Construction>
                        <AddedToSlab rValue="0" nominalInsulation="0">User specified</AddedToSlab>
                    </Construction>
                    <Measurements isRectangular="true" width="9.144" length="12.192" />
                </Floor>
                <Wall hasPonyWall="false">
                    <Construction>
                        <InteriorAddedInsulation nominalInsulation="1.432">
                            <Composite><Section rank="1" percentage="100" rsi="1.8016" nominalRsi="1.432" /></Composite>
                        </InteriorAddedInsulation>
                    </Construction>
                    <Measurements height="2.4384" depth="1.8288" ponyWallHeight="0" />
                </Wall>
                <Components>
                    <FloorHeader id="8">
                        <Label>BW hdr-01</Label>
                        <Construction><Type nominalInsulation="2.11" rValue="2.61">User specified</Type></Construction>
                        <Measurements height="0.23" perimeter="34.7456" />
                    </FloorHeader>
                </Components>
            </Basement>
            <HotWater>
                <Label>Domestic Hot Water</Label>
                <Primary hasDrainWaterHeatRecovery="false">
                    <EnergySource code="2"><English>Natural gas</English><French>Gaz naturel</French></EnergySource>
                    <TankType code="2"><English>Conventional tank</English><French>Réservoir classique</French></TankType>
                    <TankVolume code="4" value="151.4" />
                    <EnergyFactor code="1" value="0.57" inputCapacity="0" />
                </Primary>
            </HotWater>
        </Components>
        <HeatingCooling>
            <Label>Heating/Cooling System</Label>
            <Type1>
                <FanAndPump hasEnhancedMotors="false" />
                <Furnace>
                    <Equipment isBiEnergy="false">
                        <EnergySource code="2"><English>Natural gas</English><French>Gaz naturel</French></EnergySource>
                    </Equipment>
                    <Specifications sizingFactor="1.1" efficiency="92" isSteadyState="false">
                        <OutputCapacity code="2" value="60000" uiUnits="btu/hr" />
                    </Specifications>
                </Furnace>
            </Type1>
        </HeatingCooling>
        <Ventilation>
            <WholeHouseVentilatorList>
                <Hrv supplyFlowrate="60" exhaustFlowrate="60" isEnergyStar="true"
                     isHomeVentilatingInstituteCertified="false" sensibleEfficiency1="75" />
            </WholeHouseVentilatorList>
        </Ventilation>
    </House>
    <Codes>
        <Wall>
            <UserDefined>
                <Code id="Code 1">
                    <Label>1201101121</Label>
                    <Layers>
                        <StructureType><English>Wood frame</English><French>Ossature de bois</French></StructureType>
                        <ComponentTypeSize><English>38x89 mm (2x4 in)</English><French>38x89 (2x4)</French></ComponentTypeSize>
                    </Layers>
                </Code>
            </UserDefined>
        </Wall>
        <Window>
            <UserDefined>
                <Code id="Code 11">
                    <Label>234002</Label>
                    <Layers>
                        <GlazingTypes><English>Double/double with 1 coat</English><French>Double/double, 1 couche</French></GlazingTypes>
                        <FrameMaterial><English>Wood</English><French>Bois</French></FrameMaterial>
                    </Layers>
                </Code>
            </UserDefined>
        </Window>
    </Codes>
    <EnergyUpgrades>
        <Settings>
            <Ceilings cost="0" priority="12" />
            <MainWalls cost="2500" priority="7" />
        </Settings>
    </EnergyUpgrades>
</HouseFile>"#;

/// Raw input row for one evaluation of `house_id`
pub fn input_row(eval_id: u32, house_id: u32, eval_type: &str) -> RawRow {
    let row: Value = json!({
        "EVAL_ID": eval_id.to_string(),
        "HOUSE_ID": house_id.to_string(),
        "EVAL_TYPE": eval_type,
        "ENTRYDATE": "2011-11-18",
        "CREATIONDATE": "2012-06-09 10:20:20",
        "MODIFICATIONDATE": null,
        "YEARBUILT": "1979",
        "CLIENTCITY": "Ottawa",
        "HOUSEREGION": "Ontario",
        "CLIENTPCODE": "K1P 0A6",
        "ERSRATING": "71",
        "UGRERSRATING": null,
        "RAW_XML": HOUSE_XML,
    });
    match row {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}
