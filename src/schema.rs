// 📐 Shape Layer - Schema Validation
// Interprets a RowSchema against one flat record. Collects every violation
// before failing; fields the schema does not declare are purged.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::{Map, Value};

use crate::attributes::{FieldRule, FieldType, FieldValue, RowSchema};
use crate::element::XmlNode;
use crate::error::{Error, FieldError, Result};

/// Raw flat record (CSV row or archived extracted row)
pub type RawRow = Map<String, Value>;

// ============================================================================
// VALIDATED ROW
// ============================================================================

/// A record that passed its schema, holding coerced values only
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedRow {
    values: BTreeMap<String, FieldValue>,
}

impl ValidatedRow {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    fn missing(name: &str, expected: &str) -> Error {
        Error::InvalidInputData(vec![FieldError::new(
            name,
            format!("expected a validated {} value", expected),
        )])
    }

    pub fn text(&self, name: &str) -> Result<&str> {
        match self.values.get(name) {
            Some(FieldValue::Text(text)) => Ok(text),
            _ => Err(Self::missing(name, "string")),
        }
    }

    pub fn integer(&self, name: &str) -> Result<i64> {
        match self.values.get(name) {
            Some(FieldValue::Integer(value)) => Ok(*value),
            _ => Err(Self::missing(name, "integer")),
        }
    }

    /// Absent and null both read as `None`
    pub fn optional_integer(&self, name: &str) -> Result<Option<i64>> {
        match self.values.get(name) {
            None | Some(FieldValue::Null) => Ok(None),
            Some(FieldValue::Integer(value)) => Ok(Some(*value)),
            _ => Err(Self::missing(name, "integer")),
        }
    }

    pub fn date(&self, name: &str) -> Result<NaiveDate> {
        match self.values.get(name) {
            Some(FieldValue::Date(value)) => Ok(*value),
            _ => Err(Self::missing(name, "date")),
        }
    }

    pub fn datetime(&self, name: &str) -> Result<NaiveDateTime> {
        match self.values.get(name) {
            Some(FieldValue::DateTime(value)) => Ok(*value),
            _ => Err(Self::missing(name, "datetime")),
        }
    }

    pub fn optional_datetime(&self, name: &str) -> Result<Option<NaiveDateTime>> {
        match self.values.get(name) {
            None | Some(FieldValue::Null) => Ok(None),
            Some(FieldValue::DateTime(value)) => Ok(Some(*value)),
            _ => Err(Self::missing(name, "datetime")),
        }
    }

    pub fn markup(&self, name: &str) -> Result<&XmlNode> {
        match self.values.get(name) {
            Some(FieldValue::Markup(node)) => Ok(node),
            _ => Err(Self::missing(name, "embedded markup")),
        }
    }

    pub fn optional_markup(&self, name: &str) -> Option<&XmlNode> {
        match self.values.get(name) {
            Some(FieldValue::Markup(node)) => Some(node),
            _ => None,
        }
    }

    /// Absent lists read as empty
    pub fn markup_list(&self, name: &str) -> &[XmlNode] {
        match self.values.get(name) {
            Some(FieldValue::MarkupList(nodes)) => nodes,
            _ => &[],
        }
    }
}

// ============================================================================
// SCHEMA VALIDATOR
// ============================================================================

pub struct SchemaValidator {
    schema: RowSchema,
    patterns: BTreeMap<String, Regex>,
}

impl SchemaValidator {
    /// Compile every pattern rule once
    pub fn new(schema: RowSchema) -> std::result::Result<Self, regex::Error> {
        let mut patterns = BTreeMap::new();
        for rule in schema.fields() {
            if let Some(pattern) = rule.pattern() {
                patterns.insert(rule.name.clone(), Regex::new(&format!("^(?:{})$", pattern))?);
            }
        }
        Ok(SchemaValidator { schema, patterns })
    }

    pub fn schema(&self) -> &RowSchema {
        &self.schema
    }

    /// Validate and coerce `row`, naming every violating field on failure
    pub fn validate(&self, row: &RawRow) -> Result<ValidatedRow> {
        let mut errors = Vec::new();
        let mut values = BTreeMap::new();

        for rule in self.schema.fields() {
            match self.validate_field(rule, row.get(&rule.name)) {
                Ok(Some(value)) => {
                    values.insert(rule.name.clone(), value);
                }
                Ok(None) => {}
                Err(message) => errors.push(FieldError::new(rule.name.clone(), message)),
            }
        }

        if errors.is_empty() {
            Ok(ValidatedRow { values })
        } else {
            Err(Error::InvalidInputData(errors))
        }
    }

    fn validate_field(
        &self,
        rule: &FieldRule,
        raw: Option<&Value>,
    ) -> std::result::Result<Option<FieldValue>, String> {
        let raw = match raw {
            None if rule.is_required() => return Err("required field".to_string()),
            None => return Ok(None),
            Some(Value::Null) if rule.is_nullable() => return Ok(Some(FieldValue::Null)),
            Some(Value::Null) => return Err("null value not allowed".to_string()),
            Some(value) => value,
        };

        let checked = check_type(rule.field_type, raw)
            .ok_or_else(|| format!("must be of {} type", rule.field_type.name()))?;

        if let Checked::Text(text) = &checked {
            if let Some(allowed) = rule.allowed() {
                if !allowed.iter().any(|candidate| candidate == text) {
                    return Err(format!("unallowed value '{}'", text));
                }
            }
            if let Some(pattern) = self.patterns.get(&rule.name) {
                if !pattern.is_match(text) {
                    return Err(format!("value '{}' does not match '{}'", text, pattern.as_str()));
                }
            }
        }

        let value = match (rule.field_type, checked) {
            (FieldType::Markup, Checked::Text(text)) => FieldValue::Markup(parse_markup(&text)?),
            (FieldType::MarkupList, Checked::TextList(texts)) => FieldValue::MarkupList(
                texts
                    .iter()
                    .map(|text| parse_markup(text))
                    .collect::<std::result::Result<Vec<_>, _>>()?,
            ),
            (_, Checked::Text(text)) => FieldValue::Text(text),
            (_, Checked::Value(value)) => value,
            (_, Checked::TextList(_)) => return Err("unexpected list value".to_string()),
        };

        match rule.coerce {
            Some(coerce) => coerce(value).map(Some),
            None => Ok(Some(value)),
        }
    }
}

/// Raw value after its type check, before markup parsing and coercion
enum Checked {
    Text(String),
    Value(FieldValue),
    TextList(Vec<String>),
}

fn check_type(field_type: FieldType, raw: &Value) -> Option<Checked> {
    match (field_type, raw) {
        (FieldType::Text, Value::String(text)) | (FieldType::Markup, Value::String(text)) => {
            Some(Checked::Text(text.clone()))
        }
        (FieldType::Number, Value::Number(number)) => Some(Checked::Value(match number.as_i64() {
            Some(integer) => FieldValue::Integer(integer),
            None => FieldValue::Float(number.as_f64()?),
        })),
        (FieldType::Number, Value::String(text)) if text.trim().parse::<f64>().is_ok() => {
            Some(Checked::Text(text.clone()))
        }
        (FieldType::MarkupList, Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .map(Checked::TextList),
        _ => None,
    }
}

fn parse_markup(text: &str) -> std::result::Result<XmlNode, String> {
    XmlNode::parse(text).map_err(|err| format!("invalid embedded markup: {}", err))
}
