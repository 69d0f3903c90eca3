// 🚨 Error taxonomy
// Row-level, component-level and group-level failures. Each one is caught
// at the row or group boundary by the pipeline and the unit is skipped.

use std::fmt;
use thiserror::Error;

use crate::dwelling::GroupSizePolicy;

/// Result type for the extraction / assembly core
pub type Result<T> = std::result::Result<T, Error>;

// ============================================================================
// COMPONENT KIND
// ============================================================================

/// Which embedded component failed to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Ceiling,
    Floor,
    Wall,
    WallCode,
    Door,
    Window,
    WindowCode,
    HeatedFloorArea,
    HeatingSystem,
    WaterHeating,
    Ventilation,
    Basement,
    Crawlspace,
    Slab,
    Upgrade,
}

impl ComponentKind {
    pub fn name(&self) -> &'static str {
        match self {
            ComponentKind::Ceiling => "Ceiling",
            ComponentKind::Floor => "Floor",
            ComponentKind::Wall => "Wall",
            ComponentKind::WallCode => "WallCode",
            ComponentKind::Door => "Door",
            ComponentKind::Window => "Window",
            ComponentKind::WindowCode => "WindowCode",
            ComponentKind::HeatedFloorArea => "HeatedFloorArea",
            ComponentKind::HeatingSystem => "HeatingSystem",
            ComponentKind::WaterHeating => "WaterHeating",
            ComponentKind::Ventilation => "Ventilation",
            ComponentKind::Basement => "Basement",
            ComponentKind::Crawlspace => "Crawlspace",
            ComponentKind::Slab => "Slab",
            ComponentKind::Upgrade => "Upgrade",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// TREE ADAPTER ERROR
// ============================================================================

/// Missing or uncoercible value inside an embedded document.
///
/// Never crosses a component boundary: parsers re-wrap it with
/// [`ComponentContext::component`].
#[derive(Debug, Clone, Error, PartialEq)]
#[error("cannot read '{path}': {reason}")]
pub struct ElementGetValueError {
    pub path: String,
    pub reason: String,
}

impl ElementGetValueError {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        ElementGetValueError {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

// ============================================================================
// EMBEDDED COMPONENT ERROR
// ============================================================================

#[derive(Debug, Clone, Error, PartialEq)]
#[error("invalid embedded {kind} data: {reason}")]
pub struct InvalidEmbeddedDataTypeError {
    pub kind: ComponentKind,
    pub reason: String,
}

impl InvalidEmbeddedDataTypeError {
    pub fn new(kind: ComponentKind, reason: impl Into<String>) -> Self {
        InvalidEmbeddedDataTypeError {
            kind,
            reason: reason.into(),
        }
    }
}

/// Attach the failing component's kind to a tree adapter error
pub trait ComponentContext<T> {
    fn component(self, kind: ComponentKind) -> std::result::Result<T, InvalidEmbeddedDataTypeError>;
}

impl<T> ComponentContext<T> for std::result::Result<T, ElementGetValueError> {
    fn component(self, kind: ComponentKind) -> std::result::Result<T, InvalidEmbeddedDataTypeError> {
        self.map_err(|err| InvalidEmbeddedDataTypeError::new(kind, err.to_string()))
    }
}

// ============================================================================
// FIELD ERROR (schema validation)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        FieldError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// PIPELINE ERROR
// ============================================================================

#[derive(Debug, Error)]
pub enum Error {
    /// Row failed its schema; lists every violating field
    #[error("invalid input data: {}", join_field_errors(.0))]
    InvalidInputData(Vec<FieldError>),

    #[error(transparent)]
    InvalidEmbeddedDataType(#[from] InvalidEmbeddedDataTypeError),

    #[error("invalid group size: expected {policy}, got {actual}")]
    InvalidGroupSize {
        policy: GroupSizePolicy,
        actual: usize,
    },
}

impl Error {
    /// Field names reported by an `InvalidInputData` error
    pub fn invalid_fields(&self) -> Vec<&str> {
        match self {
            Error::InvalidInputData(errors) => errors.iter().map(|e| e.field.as_str()).collect(),
            _ => Vec::new(),
        }
    }
}
