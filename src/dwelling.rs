// 🏠 Dwelling Assembler
// One validated extracted row parses into one Evaluation; a group of rows
// sharing a house id becomes one Dwelling, provided the group satisfies the
// active size policy. House-level fields come from the first row.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::attributes::{
    CLIENT_CITY, CREATION_DATE, ENTRY_DATE, ERS_RATING, EVAL_ID, EVAL_TYPE, FILE_NAME, HOUSE_ID,
    HOUSE_REGION, MODIFICATION_DATE, POSTAL_CODE, UPGRADED_ERS_RATING, YEAR_BUILT,
};
use crate::codes::build_codes;
use crate::embedded::{
    Ceiling, Door, Floor, Foundation, HeatedFloorArea, HeatingSystem, Upgrade, Ventilation, Wall,
    WaterHeating, Window,
};
use crate::error::{Error, FieldError, InvalidEmbeddedDataTypeError, Result};
use crate::schema::ValidatedRow;
use crate::snippets;

// ============================================================================
// REGION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    BritishColumbia,
    Alberta,
    Saskatchewan,
    Manitoba,
    Ontario,
    Quebec,
    NewBrunswick,
    NovaScotia,
    PrinceEdwardIsland,
    NewfoundlandAndLabrador,
    Yukon,
    NorthwestTerritories,
    Nunavut,
    Unknown,
}

const REGIONS: &[(Region, &str, &str, &str)] = &[
    (Region::BritishColumbia, "BC", "british columbia", "colombie britannique"),
    (Region::Alberta, "AB", "alberta", "alberta"),
    (Region::Saskatchewan, "SK", "saskatchewan", "saskatchewan"),
    (Region::Manitoba, "MB", "manitoba", "manitoba"),
    (Region::Ontario, "ON", "ontario", "ontario"),
    (Region::Quebec, "QC", "quebec", "quebec"),
    (Region::NewBrunswick, "NB", "new brunswick", "nouveau brunswick"),
    (Region::NovaScotia, "NS", "nova scotia", "nouvelle ecosse"),
    (Region::PrinceEdwardIsland, "PE", "prince edward island", "ile du prince edouard"),
    (Region::NewfoundlandAndLabrador, "NL", "newfoundland and labrador", "terre neuve et labrador"),
    (Region::Yukon, "YT", "yukon", "yukon"),
    (Region::NorthwestTerritories, "NT", "northwest territories", "territoires du nord ouest"),
    (Region::Nunavut, "NU", "nunavut", "nunavut"),
];

/// Decompose, drop combining marks, lowercase, treat hyphens as spaces
fn fold_name(text: &str) -> String {
    let folded: String = text
        .trim()
        .nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .collect::<String>()
        .to_lowercase()
        .replace('-', " ");
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl Region {
    /// Two-letter code or English/French name; anything else is `Unknown`
    pub fn from_data(text: &str) -> Region {
        let folded = fold_name(text);
        REGIONS
            .iter()
            .find(|(_, code, english, french)| {
                folded == code.to_lowercase() || folded == *english || folded == *french
            })
            .map(|(region, ..)| *region)
            .unwrap_or(Region::Unknown)
    }

    pub fn code(&self) -> &'static str {
        REGIONS
            .iter()
            .find(|(region, ..)| region == self)
            .map(|(_, code, ..)| *code)
            .unwrap_or("UNKNOWN")
    }
}

// ============================================================================
// EVALUATION TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationType {
    PreRetrofit,
    PostRetrofit,
    IncentiveProgram,
}

impl EvaluationType {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "D" => Some(EvaluationType::PreRetrofit),
            "E" => Some(EvaluationType::PostRetrofit),
            "F" => Some(EvaluationType::IncentiveProgram),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            EvaluationType::PreRetrofit => "D",
            EvaluationType::PostRetrofit => "E",
            EvaluationType::IncentiveProgram => "F",
        }
    }
}

// ============================================================================
// GROUP SIZE POLICY
// ============================================================================

/// How many evaluations one dwelling must have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupSizePolicy {
    Exactly(usize),
    AtLeast(usize),
}

impl Default for GroupSizePolicy {
    fn default() -> Self {
        GroupSizePolicy::Exactly(2)
    }
}

impl GroupSizePolicy {
    pub fn allows(&self, size: usize) -> bool {
        match self {
            GroupSizePolicy::Exactly(expected) => size == *expected,
            GroupSizePolicy::AtLeast(minimum) => size >= *minimum,
        }
    }

    /// Empty groups never pass
    pub fn check(&self, size: usize) -> Result<()> {
        if size > 0 && self.allows(size) {
            Ok(())
        } else {
            Err(Error::InvalidGroupSize {
                policy: *self,
                actual: size,
            })
        }
    }
}

impl fmt::Display for GroupSizePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupSizePolicy::Exactly(n) => write!(f, "exactly {}", n),
            GroupSizePolicy::AtLeast(n) => write!(f, "at least {}", n),
        }
    }
}

// ============================================================================
// PARSED ROW
// ============================================================================

/// One extracted row with every embedded component parsed
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDwellingDataRow {
    pub file_name: String,
    pub house_id: i64,
    pub eval_id: i64,
    pub eval_type: EvaluationType,
    pub entry_date: NaiveDate,
    pub creation_date: NaiveDateTime,
    pub modification_date: Option<NaiveDateTime>,
    pub year_built: i64,
    pub city: String,
    pub region: Region,
    pub forward_sortation_area: String,
    pub ers_rating: Option<i64>,
    pub upgraded_ers_rating: Option<i64>,
    pub ceilings: Vec<Ceiling>,
    pub floors: Vec<Floor>,
    pub walls: Vec<Wall>,
    pub doors: Vec<Door>,
    pub windows: Vec<Window>,
    pub heated_floor_area: Option<HeatedFloorArea>,
    pub heating_system: Option<HeatingSystem>,
    pub ventilations: Vec<Ventilation>,
    pub water_heatings: Vec<WaterHeating>,
    pub foundations: Vec<Foundation>,
    pub upgrades: Vec<Upgrade>,
}

fn parse_all<T>(
    nodes: &[crate::element::XmlNode],
    parser: impl Fn(&crate::element::XmlNode) -> std::result::Result<T, InvalidEmbeddedDataTypeError>,
) -> std::result::Result<Vec<T>, InvalidEmbeddedDataTypeError> {
    nodes.iter().map(parser).collect()
}

impl ParsedDwellingDataRow {
    /// Parse a row validated against `RowSchema::extracted_rows`
    pub fn from_row(row: &ValidatedRow) -> Result<Self> {
        let eval_type_code = row.text(EVAL_TYPE)?;
        let eval_type = EvaluationType::from_code(eval_type_code).ok_or_else(|| {
            Error::InvalidInputData(vec![FieldError::new(
                EVAL_TYPE,
                format!("unallowed value '{}'", eval_type_code),
            )])
        })?;

        let codes = build_codes(
            row.markup_list(snippets::WALL_CODES),
            row.markup_list(snippets::WINDOW_CODES),
        )?;

        let mut foundations = parse_all(row.markup_list(snippets::BASEMENTS), Foundation::from_data)?;
        foundations.extend(parse_all(row.markup_list(snippets::CRAWLSPACES), Foundation::from_data)?);
        foundations.extend(parse_all(row.markup_list(snippets::SLABS), Foundation::from_data)?);

        let water_heatings = match row.optional_markup(snippets::WATER_HEATINGS) {
            Some(block) => WaterHeating::from_block(block)?,
            None => Vec::new(),
        };

        Ok(ParsedDwellingDataRow {
            file_name: row.text(FILE_NAME)?.to_string(),
            house_id: row.integer(HOUSE_ID)?,
            eval_id: row.integer(EVAL_ID)?,
            eval_type,
            entry_date: row.date(ENTRY_DATE)?,
            creation_date: row.datetime(CREATION_DATE)?,
            modification_date: row.optional_datetime(MODIFICATION_DATE)?,
            year_built: row.integer(YEAR_BUILT)?,
            city: row.text(CLIENT_CITY)?.to_string(),
            region: Region::from_data(row.text(HOUSE_REGION)?),
            forward_sortation_area: row.text(POSTAL_CODE)?.chars().take(3).collect(),
            ers_rating: row.optional_integer(ERS_RATING)?,
            upgraded_ers_rating: row.optional_integer(UPGRADED_ERS_RATING)?,
            ceilings: parse_all(row.markup_list(snippets::CEILINGS), Ceiling::from_data)?,
            floors: parse_all(row.markup_list(snippets::FLOORS), Floor::from_data)?,
            walls: parse_all(row.markup_list(snippets::WALLS), |node| Wall::from_data(node, &codes))?,
            doors: parse_all(row.markup_list(snippets::DOORS), Door::from_data)?,
            windows: parse_all(row.markup_list(snippets::WINDOWS), |node| Window::from_data(node, &codes))?,
            heated_floor_area: row
                .optional_markup(snippets::HEATED_FLOOR_AREA)
                .map(HeatedFloorArea::from_data)
                .transpose()?,
            heating_system: row
                .optional_markup(snippets::HEATING)
                .map(HeatingSystem::from_data)
                .transpose()?,
            ventilations: parse_all(row.markup_list(snippets::VENTILATIONS), Ventilation::from_data)?,
            water_heatings,
            foundations,
            upgrades: parse_all(row.markup_list(snippets::UPGRADES), Upgrade::from_data)?,
        })
    }
}

// ============================================================================
// EVALUATION
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub evaluation_id: i64,
    pub evaluation_type: EvaluationType,
    pub entry_date: NaiveDate,
    pub creation_date: NaiveDateTime,
    pub modification_date: Option<NaiveDateTime>,
    pub ers_rating: Option<i64>,
    pub upgraded_ers_rating: Option<i64>,
    pub heated_floor_area: Option<HeatedFloorArea>,
    pub ceilings: Vec<Ceiling>,
    pub floors: Vec<Floor>,
    pub walls: Vec<Wall>,
    pub doors: Vec<Door>,
    pub windows: Vec<Window>,
    pub heating_system: Option<HeatingSystem>,
    pub ventilations: Vec<Ventilation>,
    pub water_heatings: Vec<WaterHeating>,
    pub foundations: Vec<Foundation>,
    pub upgrades: Vec<Upgrade>,
}

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

fn to_json_list<T>(items: &[T], to_json: fn(&T) -> Value) -> Value {
    Value::Array(items.iter().map(to_json).collect())
}

impl Evaluation {
    pub fn from_row(row: ParsedDwellingDataRow) -> Self {
        Evaluation {
            evaluation_id: row.eval_id,
            evaluation_type: row.eval_type,
            entry_date: row.entry_date,
            creation_date: row.creation_date,
            modification_date: row.modification_date,
            ers_rating: row.ers_rating,
            upgraded_ers_rating: row.upgraded_ers_rating,
            heated_floor_area: row.heated_floor_area,
            ceilings: row.ceilings,
            floors: row.floors,
            walls: row.walls,
            doors: row.doors,
            windows: row.windows,
            heating_system: row.heating_system,
            ventilations: row.ventilations,
            water_heatings: row.water_heatings,
            foundations: row.foundations,
            upgrades: row.upgrades,
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "evaluationId": self.evaluation_id,
            "evaluationType": self.evaluation_type.code(),
            "entryDate": self.entry_date.format("%Y-%m-%d").to_string(),
            "creationDate": self.creation_date.format(DATETIME_FORMAT).to_string(),
            "modificationDate": self
                .modification_date
                .map(|date| date.format(DATETIME_FORMAT).to_string()),
            "ersRating": self.ers_rating,
            "upgradedErsRating": self.upgraded_ers_rating,
            "heatedFloorArea": self.heated_floor_area.as_ref().map(HeatedFloorArea::to_json),
            "ceilings": to_json_list(&self.ceilings, Ceiling::to_json),
            "floors": to_json_list(&self.floors, Floor::to_json),
            "walls": to_json_list(&self.walls, Wall::to_json),
            "doors": to_json_list(&self.doors, Door::to_json),
            "windows": to_json_list(&self.windows, Window::to_json),
            "heating": self.heating_system.as_ref().map(HeatingSystem::to_json),
            "ventilations": to_json_list(&self.ventilations, Ventilation::to_json),
            "waterHeatings": to_json_list(&self.water_heatings, WaterHeating::to_json),
            "foundations": to_json_list(&self.foundations, Foundation::to_json),
            "upgrades": to_json_list(&self.upgrades, Upgrade::to_json),
        })
    }
}

// ============================================================================
// DWELLING
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Dwelling {
    pub house_id: i64,
    pub year_built: i64,
    pub city: String,
    pub region: Region,
    pub forward_sortation_area: String,
    pub evaluations: Vec<Evaluation>,
}

impl Dwelling {
    /// Assemble one group of parsed rows, in input order
    pub fn from_group(group: Vec<ParsedDwellingDataRow>, policy: GroupSizePolicy) -> Result<Self> {
        policy.check(group.len())?;

        let mut rows = group.into_iter();
        let first = match rows.next() {
            Some(first) => first,
            None => return Err(Error::InvalidGroupSize { policy, actual: 0 }),
        };

        let mut dwelling = Dwelling {
            house_id: first.house_id,
            year_built: first.year_built,
            city: first.city.clone(),
            region: first.region,
            forward_sortation_area: first.forward_sortation_area.clone(),
            evaluations: Vec::new(),
        };
        dwelling.evaluations.push(Evaluation::from_row(first));
        dwelling.evaluations.extend(rows.map(Evaluation::from_row));

        Ok(dwelling)
    }

    pub fn to_json(&self) -> Value {
        json!({
            "houseId": self.house_id,
            "yearBuilt": self.year_built,
            "city": self.city,
            "region": self.region.code(),
            "forwardSortationArea": self.forward_sortation_area,
            "evaluations": to_json_list(&self.evaluations, Evaluation::to_json),
        })
    }
}

/// Validated rows of one group to a Dwelling; the size is checked before any parsing
pub fn assemble(group: &[ValidatedRow], policy: GroupSizePolicy) -> Result<Dwelling> {
    policy.check(group.len())?;
    let parsed = group
        .iter()
        .map(ParsedDwellingDataRow::from_row)
        .collect::<Result<Vec<_>>>()?;
    Dwelling::from_group(parsed, policy)
}
