// 🏛️ Field Rules - declarative row schemas
// One rule per field: presence, nullability, allowed values, pattern and a
// coercion function. The SchemaValidator interprets these tables; nothing
// here validates by itself.

use chrono::{NaiveDate, NaiveDateTime};

use crate::element::XmlNode;
use crate::snippets;

// ============================================================================
// FIELD TYPES & VALUES
// ============================================================================

/// Shape a raw field must have before coercion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// JSON string
    Text,
    /// JSON number, or a string holding one
    Number,
    /// String holding an embedded markup document
    Markup,
    /// List of strings, each an embedded markup document
    MarkupList,
}

impl FieldType {
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Text => "string",
            FieldType::Number => "number",
            FieldType::Markup => "embedded markup",
            FieldType::MarkupList => "list of embedded markup",
        }
    }
}

/// A field value after type checks and coercion
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Markup(XmlNode),
    MarkupList(Vec<XmlNode>),
}

/// Coercion run after presence and type checks pass
pub type Coercer = fn(FieldValue) -> Result<FieldValue, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationRule {
    Required,
    Nullable,
    Allowed(Vec<String>),
    /// Full-match regular expression
    Pattern(String),
}

// ============================================================================
// FIELD RULE
// ============================================================================

#[derive(Debug, Clone)]
pub struct FieldRule {
    pub name: String,
    pub field_type: FieldType,
    pub description: String,
    pub validation_rules: Vec<ValidationRule>,
    pub coerce: Option<Coercer>,
}

impl FieldRule {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        FieldRule {
            name: name.into(),
            field_type,
            description: String::new(),
            validation_rules: Vec::new(),
            coerce: None,
        }
    }

    /// Builder: add description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Builder: add validation rule
    pub fn with_validation(mut self, rule: ValidationRule) -> Self {
        self.validation_rules.push(rule);
        self
    }

    /// Builder: set coercion
    pub fn with_coercion(mut self, coerce: Coercer) -> Self {
        self.coerce = Some(coerce);
        self
    }

    pub fn is_required(&self) -> bool {
        self.validation_rules.contains(&ValidationRule::Required)
    }

    pub fn is_nullable(&self) -> bool {
        self.validation_rules.contains(&ValidationRule::Nullable)
    }

    pub fn allowed(&self) -> Option<&[String]> {
        self.validation_rules.iter().find_map(|rule| match rule {
            ValidationRule::Allowed(values) => Some(values.as_slice()),
            _ => None,
        })
    }

    pub fn pattern(&self) -> Option<&str> {
        self.validation_rules.iter().find_map(|rule| match rule {
            ValidationRule::Pattern(pattern) => Some(pattern.as_str()),
            _ => None,
        })
    }
}

// ============================================================================
// COERCIONS
// ============================================================================

pub fn to_integer(value: FieldValue) -> Result<FieldValue, String> {
    match value {
        FieldValue::Text(text) => text
            .trim()
            .parse::<i64>()
            .map(FieldValue::Integer)
            .map_err(|_| format!("'{}' is not an integer", text)),
        FieldValue::Float(number) if number.fract() == 0.0 => Ok(FieldValue::Integer(number as i64)),
        FieldValue::Integer(_) => Ok(value),
        other => Err(format!("cannot coerce {:?} to an integer", other)),
    }
}

pub fn to_date(value: FieldValue) -> Result<FieldValue, String> {
    match value {
        FieldValue::Text(text) => {
            let trimmed = text.trim();
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .or_else(|_| parse_datetime(trimmed).map(|dt| dt.date()))
                .map(FieldValue::Date)
                .map_err(|_| format!("'{}' is not a date", text))
        }
        other => Err(format!("cannot coerce {:?} to a date", other)),
    }
}

pub fn to_datetime(value: FieldValue) -> Result<FieldValue, String> {
    match value {
        FieldValue::Text(text) => parse_datetime(text.trim())
            .map(FieldValue::DateTime)
            .map_err(|_| format!("'{}' is not a datetime", text)),
        other => Err(format!("cannot coerce {:?} to a datetime", other)),
    }
}

fn parse_datetime(text: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
}

// ============================================================================
// ROW SCHEMAS
// ============================================================================

pub const EVAL_ID: &str = "EVAL_ID";
pub const HOUSE_ID: &str = "HOUSE_ID";
pub const EVAL_TYPE: &str = "EVAL_TYPE";
pub const ENTRY_DATE: &str = "ENTRYDATE";
pub const CREATION_DATE: &str = "CREATIONDATE";
pub const MODIFICATION_DATE: &str = "MODIFICATIONDATE";
pub const YEAR_BUILT: &str = "YEARBUILT";
pub const CLIENT_CITY: &str = "CLIENTCITY";
pub const HOUSE_REGION: &str = "HOUSEREGION";
pub const POSTAL_CODE: &str = "CLIENTPCODE";
pub const ERS_RATING: &str = "ERSRATING";
pub const UPGRADED_ERS_RATING: &str = "UGRERSRATING";
pub const RAW_XML: &str = "RAW_XML";
pub const FILE_NAME: &str = "fileName";

/// Ordered field rules for one row shape
#[derive(Debug, Clone)]
pub struct RowSchema {
    pub name: String,
    fields: Vec<FieldRule>,
}

impl RowSchema {
    pub fn new(name: impl Into<String>) -> Self {
        RowSchema {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Register a field rule (replaces a rule with the same name)
    pub fn register(&mut self, rule: FieldRule) {
        self.fields.retain(|existing| existing.name != rule.name);
        self.fields.push(rule);
    }

    pub fn get(&self, name: &str) -> Option<&FieldRule> {
        self.fields.iter().find(|rule| rule.name == name)
    }

    pub fn fields(&self) -> &[FieldRule] {
        &self.fields
    }

    pub fn count(&self) -> usize {
        self.fields.len()
    }

    /// Raw audit rows as read from the capture system
    pub fn input_rows() -> Self {
        let mut schema = RowSchema::new("input row");
        schema.register_evaluation_fields();
        schema.register(
            FieldRule::new(RAW_XML, FieldType::Markup)
                .with_description("Whole-house embedded markup document")
                .with_validation(ValidationRule::Required),
        );
        schema
    }

    /// Rows produced by the extractor, carrying snippets instead of RAW_XML
    pub fn extracted_rows() -> Self {
        let mut schema = RowSchema::new("extracted row");
        schema.register_evaluation_fields();
        schema.register(
            FieldRule::new(FILE_NAME, FieldType::Text)
                .with_description("Per-row unique archive name")
                .with_validation(ValidationRule::Required),
        );

        for name in snippets::LIST_FIELDS {
            schema.register(
                FieldRule::new(*name, FieldType::MarkupList)
                    .with_description("Extracted component snippets")
                    .with_validation(ValidationRule::Required),
            );
        }

        for name in snippets::SINGLETON_FIELDS {
            schema.register(
                FieldRule::new(*name, FieldType::Markup)
                    .with_description("Extracted singleton snippet")
                    .with_validation(ValidationRule::Required)
                    .with_validation(ValidationRule::Nullable),
            );
        }

        schema
    }

    fn register_evaluation_fields(&mut self) {
        // ====================================================================
        // IDENTITY
        // ====================================================================

        self.register(
            FieldRule::new(EVAL_ID, FieldType::Text)
                .with_description("Evaluation identifier")
                .with_validation(ValidationRule::Required)
                .with_validation(ValidationRule::Pattern(r"\d+".to_string()))
                .with_coercion(to_integer),
        );

        self.register(
            FieldRule::new(HOUSE_ID, FieldType::Text)
                .with_description("Dwelling identifier; grouping key")
                .with_validation(ValidationRule::Required)
                .with_validation(ValidationRule::Pattern(r"\d+".to_string()))
                .with_coercion(to_integer),
        );

        self.register(
            FieldRule::new(EVAL_TYPE, FieldType::Text)
                .with_description("D = pre-retrofit, E = post-retrofit, F = incentive program")
                .with_validation(ValidationRule::Required)
                .with_validation(ValidationRule::Allowed(vec![
                    "D".to_string(),
                    "E".to_string(),
                    "F".to_string(),
                ])),
        );

        // ====================================================================
        // TEMPORAL
        // ====================================================================

        self.register(
            FieldRule::new(ENTRY_DATE, FieldType::Text)
                .with_description("Date the evaluation was entered")
                .with_validation(ValidationRule::Required)
                .with_coercion(to_date),
        );

        self.register(
            FieldRule::new(CREATION_DATE, FieldType::Text)
                .with_description("Record creation datetime")
                .with_validation(ValidationRule::Required)
                .with_coercion(to_datetime),
        );

        self.register(
            FieldRule::new(MODIFICATION_DATE, FieldType::Text)
                .with_description("Record modification datetime")
                .with_validation(ValidationRule::Required)
                .with_validation(ValidationRule::Nullable)
                .with_coercion(to_datetime),
        );

        // ====================================================================
        // DWELLING
        // ====================================================================

        self.register(
            FieldRule::new(YEAR_BUILT, FieldType::Number)
                .with_description("Construction year")
                .with_validation(ValidationRule::Required)
                .with_coercion(to_integer),
        );

        self.register(
            FieldRule::new(CLIENT_CITY, FieldType::Text)
                .with_validation(ValidationRule::Required),
        );

        self.register(
            FieldRule::new(HOUSE_REGION, FieldType::Text)
                .with_description("Province or territory, code or name")
                .with_validation(ValidationRule::Required),
        );

        self.register(
            FieldRule::new(POSTAL_CODE, FieldType::Text)
                .with_description("Postal code; only the first three characters are kept")
                .with_validation(ValidationRule::Required)
                .with_validation(ValidationRule::Pattern(
                    r"[A-Z][0-9][A-Z]( ?[0-9][A-Z][0-9])?".to_string(),
                )),
        );

        // ====================================================================
        // RATINGS
        // ====================================================================

        self.register(
            FieldRule::new(ERS_RATING, FieldType::Number)
                .with_validation(ValidationRule::Nullable)
                .with_coercion(to_integer),
        );

        self.register(
            FieldRule::new(UPGRADED_ERS_RATING, FieldType::Number)
                .with_validation(ValidationRule::Nullable)
                .with_coercion(to_integer),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_schema_fields() {
        let schema = RowSchema::input_rows();
        assert!(schema.get(RAW_XML).unwrap().is_required());
        assert!(schema.get(MODIFICATION_DATE).unwrap().is_nullable());
        assert_eq!(schema.get(EVAL_TYPE).unwrap().allowed().unwrap().len(), 3);
        assert!(schema.get("ceilings").is_none());
    }

    #[test]
    fn test_extracted_schema_replaces_raw_xml() {
        let schema = RowSchema::extracted_rows();
        assert!(schema.get(RAW_XML).is_none());
        assert_eq!(schema.get("ceilings").unwrap().field_type, FieldType::MarkupList);
        assert_eq!(schema.get("heating").unwrap().field_type, FieldType::Markup);
        assert!(schema.get(FILE_NAME).unwrap().is_required());
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut schema = RowSchema::new("test");
        schema.register(FieldRule::new("a", FieldType::Text));
        schema.register(FieldRule::new("a", FieldType::Number));
        assert_eq!(schema.count(), 1);
        assert_eq!(schema.get("a").unwrap().field_type, FieldType::Number);
    }

    #[test]
    fn test_to_integer() {
        assert_eq!(to_integer(FieldValue::Text(" 42 ".into())), Ok(FieldValue::Integer(42)));
        assert_eq!(to_integer(FieldValue::Float(1990.0)), Ok(FieldValue::Integer(1990)));
        assert!(to_integer(FieldValue::Text("4.2".into())).is_err());
    }

    #[test]
    fn test_to_date_and_datetime() {
        assert_eq!(
            to_date(FieldValue::Text("2011-11-18".into())),
            Ok(FieldValue::Date(NaiveDate::from_ymd_opt(2011, 11, 18).unwrap()))
        );
        assert_eq!(
            to_date(FieldValue::Text("2011-11-18 00:00:00".into())),
            Ok(FieldValue::Date(NaiveDate::from_ymd_opt(2011, 11, 18).unwrap()))
        );

        let expected = NaiveDate::from_ymd_opt(2012, 6, 9)
            .unwrap()
            .and_hms_opt(10, 20, 20)
            .unwrap();
        assert_eq!(
            to_datetime(FieldValue::Text("2012-06-09 10:20:20".into())),
            Ok(FieldValue::DateTime(expected))
        );
        assert_eq!(
            to_datetime(FieldValue::Text("2012-06-09T10:20:20".into())),
            Ok(FieldValue::DateTime(expected))
        );
        assert!(to_datetime(FieldValue::Text("June 9".into())).is_err());
    }
}
